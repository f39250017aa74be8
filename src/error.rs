//! Error taxonomy for the state-changing pipeline steps.
//!
//! Advisory steps (version probe, latest-release fetch) never surface errors;
//! they degrade to `NotInstalled` / `Version::Unknown` at the call site.
//! Only download and install return `UpdateError`, and a failure there
//! terminates the run with a Failure entry in the patch log.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("installer failed to launch: {0}")]
    InstallerLaunch(std::io::Error),

    #[error("installer exited with {0}")]
    InstallerExit(std::process::ExitStatus),
}

pub type Result<T> = std::result::Result<T, UpdateError>;
