//! `chromup` CLI - Check and apply the latest Chrome release

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use chromup::{
    AlwaysYes, ConfirmPrompt, PatchLogger, RemoteVersionFetcher, SilentInstaller, StdinPrompt,
    UpdateOrchestrator, VersionProbe,
};

#[derive(Parser)]
#[command(name = "chromup")]
#[command(about = "Check the installed Chrome version and install the latest release on request")]
#[command(version)]
struct Cli {
    /// Report whether an update is available and exit without installing
    #[arg(long)]
    check: bool,

    /// Skip the confirmation prompt (assume "yes")
    #[arg(short = 'y', long)]
    yes: bool,

    /// Patch log location (defaults to patch_log.txt beside the executable)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Override the latest-release endpoint
    #[arg(long, value_name = "URL")]
    version_url: Option<String>,

    /// Override the installer download URL
    #[arg(long, value_name = "URL")]
    installer_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let remote = Arc::new(RemoteVersionFetcher::new(
        cli.version_url
            .unwrap_or_else(|| chromup::remote::LATEST_RELEASE_URL.to_string()),
        cli.installer_url
            .unwrap_or_else(|| chromup::remote::INSTALLER_URL.to_string()),
    )?);

    let prompt: Arc<dyn ConfirmPrompt> = if cli.yes {
        Arc::new(AlwaysYes)
    } else {
        Arc::new(StdinPrompt)
    };

    let logger = cli
        .log_file
        .map_or_else(PatchLogger::beside_executable, PatchLogger::new);

    let orchestrator = UpdateOrchestrator::new(
        VersionProbe::with_default_backends(),
        remote.clone(),
        remote,
        Arc::new(SilentInstaller),
        prompt,
        logger,
    );

    // Every terminal outcome is a normal completion; cancellation and
    // failure are reported in the output and the patch log, not the exit
    // code.
    orchestrator.run(cli.check).await;
    Ok(())
}
