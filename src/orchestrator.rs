//! Update Pipeline
//!
//! Sequences the whole run: probe → fetch → compare → confirm → download →
//! install → re-probe → log. This is the only component with real branching;
//! everything it touches sits behind a trait so the pipeline is tested with
//! fakes end to end.
//!
//! Exactly one patch-log entry is written per run that passes the
//! confirmation gate; up-to-date and cancelled runs leave no trace.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::install::InstallerRunner;
use crate::logger::PatchLogger;
use crate::probe::{InstallationState, VersionProbe};
use crate::remote::{InstallerSource, LatestVersionSource};
use crate::version::Version;

/// Post-install settle delay before the first re-probe. The installer can
/// exit before the version beacon is written.
const SETTLE_DELAY: Duration = Duration::from_secs(10);
const REPROBE_ATTEMPTS: u32 = 3;
const REPROBE_DELAY: Duration = Duration::from_secs(3);

const AFFIRMATIVE: &str = "yes";

/// What the version comparison concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateDecision {
    /// Installed and at least as new as the published release.
    UpToDate,
    /// Installed, but a newer (or unknown) release is published.
    UpdateAvailable,
    /// Not installed at all.
    InstallRequired,
}

/// Terminal state of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing to do; no log entry.
    UpToDate,
    /// Check-only mode stopped before the confirmation gate; no log entry.
    UpdateAvailable,
    /// User declined; no log entry.
    Cancelled,
    /// Install ran and the verified version checks out; Success logged.
    Patched,
    /// Download, install, or verification failed; Failure logged.
    Failed,
}

/// Asks the user a yes/no question.
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, question: &str) -> bool;
}

/// Reads one line from stdin; only a case-insensitive `yes` confirms.
pub struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        println!("{question}");
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        line.trim().eq_ignore_ascii_case(AFFIRMATIVE)
    }
}

/// Confirms everything without asking (`--yes`).
pub struct AlwaysYes;

impl ConfirmPrompt for AlwaysYes {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}

/// Derive the decision from local state and the published version.
///
/// An `Unknown` published version never counts as up-to-date: a failed fetch
/// must not silence an available update, so it falls through to the prompt
/// (which then advertises "Unknown").
#[must_use]
pub fn decide(state: &InstallationState, latest: &Version) -> UpdateDecision {
    match state {
        InstallationState::NotInstalled => UpdateDecision::InstallRequired,
        InstallationState::Installed(current) => {
            if latest.is_known() && latest <= current {
                UpdateDecision::UpToDate
            } else {
                UpdateDecision::UpdateAvailable
            }
        }
    }
}

/// Drives one full check-and-update run.
pub struct UpdateOrchestrator {
    probe: VersionProbe,
    versions: Arc<dyn LatestVersionSource>,
    installer: Arc<dyn InstallerSource>,
    runner: Arc<dyn InstallerRunner>,
    prompt: Arc<dyn ConfirmPrompt>,
    logger: PatchLogger,
    settle: Duration,
    reprobe_attempts: u32,
    reprobe_delay: Duration,
}

impl UpdateOrchestrator {
    #[must_use]
    pub fn new(
        probe: VersionProbe,
        versions: Arc<dyn LatestVersionSource>,
        installer: Arc<dyn InstallerSource>,
        runner: Arc<dyn InstallerRunner>,
        prompt: Arc<dyn ConfirmPrompt>,
        logger: PatchLogger,
    ) -> Self {
        Self {
            probe,
            versions,
            installer,
            runner,
            prompt,
            logger,
            settle: SETTLE_DELAY,
            reprobe_attempts: REPROBE_ATTEMPTS,
            reprobe_delay: REPROBE_DELAY,
        }
    }

    /// Override the settle/re-probe timings (tests run with zero delays).
    #[must_use]
    pub fn with_timings(mut self, settle: Duration, attempts: u32, delay: Duration) -> Self {
        self.settle = settle;
        self.reprobe_attempts = attempts;
        self.reprobe_delay = delay;
        self
    }

    /// Run the pipeline to a terminal outcome. With `check_only` the run
    /// stops after reporting the decision, before the confirmation gate.
    pub async fn run(&self, check_only: bool) -> RunOutcome {
        println!("Checking installed Chrome version...");
        let state = self.probe.probe();
        let installed = match &state {
            InstallationState::Installed(v) => {
                println!("Current Chrome version: {v}");
                Some(v.clone())
            }
            InstallationState::NotInstalled => {
                println!("Chrome is not installed on this system.");
                None
            }
        };

        let latest = self.versions.fetch_latest().await;
        println!("Latest Chrome version available: {latest}");

        let decision = decide(&state, &latest);
        debug!(?decision, "decision reached");

        if decision == UpdateDecision::UpToDate {
            // `UpToDate` implies a probed version exists.
            if let Some(current) = &installed {
                println!(
                    "Your Chrome version ({current}) is already up-to-date or newer \
                     than the available version ({latest})."
                );
            }
            return RunOutcome::UpToDate;
        }

        if check_only {
            match decision {
                UpdateDecision::UpdateAvailable => println!("An update to {latest} is available."),
                UpdateDecision::InstallRequired => println!("Chrome {latest} can be installed."),
                UpdateDecision::UpToDate => unreachable!(),
            }
            return RunOutcome::UpdateAvailable;
        }

        let question = match decision {
            UpdateDecision::UpdateAvailable => {
                "Would you like to update Chrome to the latest version? (yes/no)"
            }
            UpdateDecision::InstallRequired => "Would you like to install Chrome? (yes/no)",
            UpdateDecision::UpToDate => unreachable!(),
        };
        if !self.prompt.confirm(question) {
            match decision {
                UpdateDecision::UpdateAvailable => println!("Update canceled."),
                _ => println!("Installation canceled."),
            }
            return RunOutcome::Cancelled;
        }

        self.download_and_install(installed.as_ref()).await
    }

    async fn download_and_install(&self, installed: Option<&Version>) -> RunOutcome {
        let temp = match tempfile::Builder::new()
            .prefix("chrome_installer-")
            .suffix(".exe")
            .tempfile()
        {
            Ok(file) => file,
            Err(e) => {
                warn!("failed to create temp file for installer: {e}");
                println!("Failed to download Chrome installer.");
                self.logger.log(false);
                return RunOutcome::Failed;
            }
        };

        if let Err(e) = self.installer.download(temp.path()).await {
            warn!("installer download failed: {e}");
            println!("Download error: {e}");
            println!("Failed to download Chrome installer.");
            self.logger.log(false);
            return RunOutcome::Failed;
        }

        // Close the download handle before launching: the loader refuses to
        // execute a binary that is still open for writing (ETXTBSY on Linux,
        // a sharing violation on Windows). The path still deletes on drop.
        let installer_path = temp.into_temp_path();

        println!("Download complete. Installing Chrome...");
        if let Err(e) = self.runner.install(&installer_path).await {
            warn!("installer run failed: {e}");
            println!("Installation error: {e}");
            println!("Failed to install Chrome.");
            self.logger.log(false);
            return RunOutcome::Failed;
        }

        println!("Waiting for Chrome to register in the system...");
        tokio::time::sleep(self.settle).await;
        let verified = self
            .probe
            .retry_probe(self.reprobe_attempts, self.reprobe_delay)
            .await;
        let new_version = verified.installed_version();

        // Update path: success means the version actually moved.
        // Fresh install: any probed version counts.
        let success = match (installed, new_version) {
            (Some(old), Some(new)) => new != old,
            (None, Some(_)) => true,
            (_, None) => false,
        };
        self.logger.log(success);

        match (installed, new_version) {
            (Some(old), Some(new)) if success => {
                println!("Chrome successfully updated from {old} to {new}");
            }
            (None, Some(new)) => {
                println!("Chrome {new} installed successfully.");
            }
            (Some(_), Some(new)) => {
                println!("Chrome installation completed, but version remains: {new}");
                println!("The update may have failed or was unnecessary.");
            }
            (_, None) => {
                println!("Chrome installation completed, but version check failed.");
            }
        }

        if success {
            RunOutcome::Patched
        } else {
            RunOutcome::Failed
        }
    }
}
