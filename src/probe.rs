//! Installed Chrome Detection
//!
//! Best-effort lookup of the locally installed Chrome version. Backends are
//! queried in order and the first non-empty answer wins; every backend error
//! is absorbed — an unreadable system is reported as `NotInstalled`, never as
//! a failure.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use tracing::debug;

use crate::version::Version;

/// Registry paths that Chrome writes its version beacon under.
const BEACON_KEYS: [&str; 2] = [
    r"HKLM\SOFTWARE\Google\Chrome\BLBeacon",
    r"HKLM\SOFTWARE\WOW6432Node\Google\Chrome\BLBeacon",
];

/// Default install locations whose binary carries version metadata.
const CHROME_BINARIES: [&str; 2] = [
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

/// One way of asking the host system for an installed version string.
///
/// Implementations must be best-effort: return `None` on any error rather
/// than propagating it.
pub trait VersionLookup: Send + Sync {
    /// Short name for log output.
    fn name(&self) -> &str;

    /// The version string, if this backend can produce one.
    fn lookup(&self) -> Option<String>;
}

/// Whether Chrome is installed, and at which version if so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallationState {
    NotInstalled,
    Installed(Version),
}

impl InstallationState {
    /// The installed version, if any.
    #[must_use]
    pub fn installed_version(&self) -> Option<&Version> {
        match self {
            InstallationState::NotInstalled => None,
            InstallationState::Installed(v) => Some(v),
        }
    }
}

/// Queries an ordered list of lookup backends for the installed version.
pub struct VersionProbe {
    backends: Vec<Box<dyn VersionLookup>>,
}

impl VersionProbe {
    #[must_use]
    pub fn new(backends: Vec<Box<dyn VersionLookup>>) -> Self {
        Self { backends }
    }

    /// Probe with the standard backends: the two registry beacon keys, then
    /// file-version metadata of the two default install locations.
    #[must_use]
    pub fn with_default_backends() -> Self {
        let mut backends: Vec<Box<dyn VersionLookup>> = Vec::new();
        for key in BEACON_KEYS {
            backends.push(Box::new(RegistryLookup::new(key)));
        }
        for path in CHROME_BINARIES {
            backends.push(Box::new(FileVersionLookup::new(path)));
        }
        Self::new(backends)
    }

    /// Ask each backend in order; the first non-empty answer wins.
    #[must_use]
    pub fn probe(&self) -> InstallationState {
        for backend in &self.backends {
            if let Some(raw) = backend.lookup() {
                let raw = raw.trim();
                if !raw.is_empty() {
                    debug!(backend = backend.name(), version = raw, "probe hit");
                    return InstallationState::Installed(Version::parse(raw));
                }
            }
            debug!(backend = backend.name(), "probe miss");
        }
        InstallationState::NotInstalled
    }

    /// Repeat [`probe`](Self::probe) up to `max_attempts` times with a fixed
    /// delay between attempts, returning as soon as an installed version
    /// appears. Used after an install to absorb the window during which the
    /// installer has finished but the version beacon is not yet written.
    pub async fn retry_probe(&self, max_attempts: u32, delay: Duration) -> InstallationState {
        let mut state = InstallationState::NotInstalled;
        for attempt in 1..=max_attempts {
            state = self.probe();
            if matches!(state, InstallationState::Installed(_)) {
                return state;
            }
            println!("Retrying version check...");
            if attempt < max_attempts {
                tokio::time::sleep(delay).await;
            }
        }
        state
    }
}

/// Reads a `version` value from a registry key by shelling out to
/// `reg query` (same approach as probing default-browser state: platform
/// tools rather than native API bindings).
pub struct RegistryLookup {
    key: &'static str,
}

impl RegistryLookup {
    #[must_use]
    pub fn new(key: &'static str) -> Self {
        Self { key }
    }
}

impl VersionLookup for RegistryLookup {
    fn name(&self) -> &str {
        self.key
    }

    fn lookup(&self) -> Option<String> {
        let output = Command::new("reg")
            .args(["query", self.key, "/v", "version"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }

        // Output shape:
        //     HKEY_LOCAL_MACHINE\SOFTWARE\Google\Chrome\BLBeacon
        //         version    REG_SZ    120.0.6099.129
        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            if line.contains("REG_SZ") {
                return line.split_whitespace().last().map(str::to_string);
            }
        }
        None
    }
}

/// Reads the file-version metadata of an installed binary via PowerShell.
pub struct FileVersionLookup {
    path: PathBuf,
}

impl FileVersionLookup {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl VersionLookup for FileVersionLookup {
    fn name(&self) -> &str {
        self.path.to_str().unwrap_or("file-version")
    }

    fn lookup(&self) -> Option<String> {
        if !self.path.exists() {
            return None;
        }

        let script = format!(
            "(Get-Item '{}').VersionInfo.FileVersion",
            self.path.display()
        );
        let output = Command::new("powershell")
            .args(["-NoProfile", "-Command", &script])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!version.is_empty()).then_some(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeLookup {
        answer: Option<String>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeLookup {
        fn new(answer: Option<&str>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    answer: answer.map(str::to_string),
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl VersionLookup for FakeLookup {
        fn name(&self) -> &str {
            "fake"
        }

        fn lookup(&self) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    #[test]
    fn all_backends_empty_is_not_installed() {
        let (a, _) = FakeLookup::new(None);
        let (b, _) = FakeLookup::new(Some("   "));
        let probe = VersionProbe::new(vec![Box::new(a), Box::new(b)]);
        assert_eq!(probe.probe(), InstallationState::NotInstalled);
    }

    #[test]
    fn first_non_empty_backend_wins() {
        let (a, _) = FakeLookup::new(None);
        let (b, _) = FakeLookup::new(Some("119.0.0.0"));
        let (c, c_calls) = FakeLookup::new(Some("1.0"));
        let probe = VersionProbe::new(vec![Box::new(a), Box::new(b), Box::new(c)]);

        assert_eq!(
            probe.probe(),
            InstallationState::Installed(Version::parse("119.0.0.0"))
        );
        // The backend behind the hit is never queried.
        assert_eq!(c_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unparseable_answer_is_installed_unknown() {
        let (a, _) = FakeLookup::new(Some("not-a-version"));
        let probe = VersionProbe::new(vec![Box::new(a)]);
        assert_eq!(
            probe.probe(),
            InstallationState::Installed(Version::Unknown)
        );
    }

    #[tokio::test]
    async fn retry_probe_stops_on_first_hit() {
        let (a, calls) = FakeLookup::new(Some("120.0.0.0"));
        let probe = VersionProbe::new(vec![Box::new(a)]);

        let state = probe.retry_probe(3, Duration::ZERO).await;
        assert_eq!(
            state,
            InstallationState::Installed(Version::parse("120.0.0.0"))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_probe_exhausts_attempts() {
        let (a, calls) = FakeLookup::new(None);
        let probe = VersionProbe::new(vec![Box::new(a)]);

        let state = probe.retry_probe(3, Duration::ZERO).await;
        assert_eq!(state, InstallationState::NotInstalled);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
