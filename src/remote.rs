//! Remote Release Channel
//!
//! Latest-version lookup and installer download against the vendor's fixed
//! endpoints. The version lookup is advisory: any network, status, or parse
//! failure degrades to `Version::Unknown`. The installer download is a
//! state-changing step, so its failures are real errors.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use crate::error::Result;
use crate::version::Version;

/// Bare version string published alongside the stable channel.
pub const LATEST_RELEASE_URL: &str =
    "https://chromedriver.storage.googleapis.com/LATEST_RELEASE";

/// Always-latest stable installer.
pub const INSTALLER_URL: &str =
    "https://dl.google.com/chrome/install/latest/chrome_installer.exe";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of the latest published version. Best-effort by contract.
#[async_trait]
pub trait LatestVersionSource: Send + Sync {
    async fn fetch_latest(&self) -> Version;
}

/// Source of the installer binary.
#[async_trait]
pub trait InstallerSource: Send + Sync {
    async fn download(&self, dest: &Path) -> Result<()>;
}

/// HTTP client against the vendor endpoints.
pub struct RemoteVersionFetcher {
    client: Client,
    version_url: String,
    installer_url: String,
}

impl RemoteVersionFetcher {
    pub fn new(version_url: impl Into<String>, installer_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .use_rustls_tls()
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            version_url: version_url.into(),
            installer_url: installer_url.into(),
        })
    }

    /// Fetcher against the vendor's default endpoints.
    pub fn stable_channel() -> Result<Self> {
        Self::new(LATEST_RELEASE_URL, INSTALLER_URL)
    }

    async fn try_fetch_latest(&self) -> Result<Version> {
        let body = self
            .client
            .get(&self.version_url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(Version::parse(&body))
    }
}

#[async_trait]
impl LatestVersionSource for RemoteVersionFetcher {
    async fn fetch_latest(&self) -> Version {
        match self.try_fetch_latest().await {
            Ok(version) => version,
            Err(e) => {
                warn!("failed to fetch latest Chrome version: {e}");
                println!("Error fetching latest Chrome version: {e}");
                Version::Unknown
            }
        }
    }
}

#[async_trait]
impl InstallerSource for RemoteVersionFetcher {
    async fn download(&self, dest: &Path) -> Result<()> {
        // No per-request timeout here: the installer is large and the
        // connect timeout already bounds an unreachable host.
        let bytes = self
            .client
            .get(&self.installer_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        tokio::fs::write(dest, &bytes).await?;
        info!(bytes = bytes.len(), dest = %dest.display(), "installer downloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpdateError;

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_unknown() {
        // Nothing listens on this port; the connect fails fast.
        let fetcher =
            RemoteVersionFetcher::new("http://127.0.0.1:9/latest", "http://127.0.0.1:9/installer")
                .unwrap();
        assert_eq!(fetcher.fetch_latest().await, Version::Unknown);
    }

    #[tokio::test]
    async fn unreachable_download_is_an_error() {
        let fetcher =
            RemoteVersionFetcher::new("http://127.0.0.1:9/latest", "http://127.0.0.1:9/installer")
                .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("installer.exe");

        let err = fetcher.download(&dest).await.unwrap_err();
        assert!(matches!(err, UpdateError::Network(_)));
        assert!(!dest.exists());
    }
}
