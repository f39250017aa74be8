//! Installer Execution
//!
//! Runs the downloaded vendor installer silently with an elevation request
//! and waits for it to exit. The wait is unbounded: an unresponsive
//! installer blocks the whole run, which is accepted behavior here.

use std::path::Path;
use std::process::ExitStatus;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::{Result, UpdateError};

/// Runs an installer binary to completion. Exit code 0 is success.
#[async_trait]
pub trait InstallerRunner: Send + Sync {
    async fn install(&self, installer: &Path) -> Result<()>;
}

/// Production runner: `/silent /install`, elevated, synchronous wait.
pub struct SilentInstaller;

#[async_trait]
impl InstallerRunner for SilentInstaller {
    async fn install(&self, installer: &Path) -> Result<()> {
        let status = run_installer(installer)
            .await
            .map_err(UpdateError::InstallerLaunch)?;

        if status.success() {
            info!(installer = %installer.display(), "installer finished");
            Ok(())
        } else {
            Err(UpdateError::InstallerExit(status))
        }
    }
}

/// Start-Process -Verb RunAs triggers the UAC elevation prompt;
/// -Wait -PassThru forwards the installer's exit code.
#[cfg(windows)]
async fn run_installer(installer: &Path) -> std::io::Result<ExitStatus> {
    let script = format!(
        "$p = Start-Process -FilePath '{}' -ArgumentList '/silent','/install' \
         -Verb RunAs -Wait -PassThru; exit $p.ExitCode",
        installer.display()
    );
    Command::new("powershell")
        .args(["-NoProfile", "-Command", &script])
        .status()
        .await
}

/// No elevation verb off Windows; run the binary directly. Downloaded temp
/// files are created 0600, so the executable bit has to be set first.
#[cfg(not(windows))]
async fn run_installer(installer: &Path) -> std::io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(installer)?.permissions();
        perms.set_mode(perms.mode() | 0o755);
        std::fs::set_permissions(installer, perms)?;
    }
    Command::new(installer)
        .args(["/silent", "/install"])
        .status()
        .await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("installer.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let installer = script(dir.path(), "exit 0");
        assert!(SilentInstaller.install(&installer).await.is_ok());
    }

    #[tokio::test]
    async fn nonzero_exit_is_process_failure() {
        let dir = tempfile::tempdir().unwrap();
        let installer = script(dir.path(), "exit 3");
        let err = SilentInstaller.install(&installer).await.unwrap_err();
        assert!(matches!(err, UpdateError::InstallerExit(_)));
    }

    #[tokio::test]
    async fn non_executable_download_is_made_runnable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("installer.sh");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        // Same mode a fresh temp-file download carries.
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(&path, perms).unwrap();

        assert!(SilentInstaller.install(&path).await.is_ok());
    }

    #[tokio::test]
    async fn missing_binary_is_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = SilentInstaller
            .install(&dir.path().join("no-such-installer"))
            .await
            .unwrap_err();
        assert!(matches!(err, UpdateError::InstallerLaunch(_)));
    }
}
