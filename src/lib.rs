//! `chromup` - Chrome patch utility
//!
//! Checks the locally installed Chrome version against the latest published
//! release and, on explicit confirmation, downloads the vendor installer,
//! runs it silently with elevation, re-checks the version, and appends the
//! outcome to a patch log.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chromup::{
//!     PatchLogger, RemoteVersionFetcher, SilentInstaller, StdinPrompt,
//!     UpdateOrchestrator, VersionProbe,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let remote = Arc::new(RemoteVersionFetcher::stable_channel()?);
//!     let orchestrator = UpdateOrchestrator::new(
//!         VersionProbe::with_default_backends(),
//!         remote.clone(),
//!         remote,
//!         Arc::new(SilentInstaller),
//!         Arc::new(StdinPrompt),
//!         PatchLogger::beside_executable(),
//!     );
//!     orchestrator.run(false).await;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod install;
pub mod logger;
pub mod orchestrator;
pub mod probe;
pub mod remote;
pub mod version;

pub use error::UpdateError;
pub use install::{InstallerRunner, SilentInstaller};
pub use logger::PatchLogger;
pub use orchestrator::{
    decide, AlwaysYes, ConfirmPrompt, RunOutcome, StdinPrompt, UpdateDecision, UpdateOrchestrator,
};
pub use probe::{InstallationState, VersionLookup, VersionProbe};
pub use remote::{InstallerSource, LatestVersionSource, RemoteVersionFetcher};
pub use version::Version;

/// Version of chromup
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
