//! Patch Outcome Log
//!
//! One timestamped line per terminal patch outcome, appended to a plain text
//! file beside the executable. Write failures are reported via `tracing` and
//! swallowed: a broken log must never take the updater down with it.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::warn;

pub const SUCCESS_TEXT: &str = "Patch applied successfully.";
pub const FAILURE_TEXT: &str = "Patch failed to apply.";

const LOG_FILE_NAME: &str = "patch_log.txt";

/// Appends patch outcomes to an append-only log file.
pub struct PatchLogger {
    path: PathBuf,
}

impl PatchLogger {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Logger writing `patch_log.txt` next to the running binary, falling
    /// back to the current directory if the executable path is unavailable.
    #[must_use]
    pub fn beside_executable() -> Self {
        let dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join(LOG_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one outcome line, creating the file if absent.
    pub fn log(&self, success: bool) {
        let status = if success { SUCCESS_TEXT } else { FAILURE_TEXT };
        match self.append(status) {
            Ok(()) => println!("Patch status logged: {status}"),
            Err(e) => warn!(path = %self.path.display(), "failed to write patch log: {e}"),
        }
    }

    fn append(&self, status: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}: {status}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_file_and_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let logger = PatchLogger::new(dir.path().join("patch_log.txt"));

        logger.log(true);
        logger.log(false);

        let contents = std::fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(SUCCESS_TEXT));
        assert!(lines[1].ends_with(FAILURE_TEXT));
        // `<timestamp>: <status>` shape.
        assert!(lines[0].contains(": "));
    }

    #[test]
    fn unwritable_path_does_not_panic() {
        let logger = PatchLogger::new("/no/such/directory/patch_log.txt");
        logger.log(true);
    }
}
