//! HTTP implementation of IRemoteTransport
//!
//! Probes `GET {remote}/status.php` and maps the answer to a
//! [`RemoteStatus`]. A remote without a scheme is reached over HTTPS.
//!
//! # Example
//!
//! ```rust,no_run
//! use fedshare_core::config::RemoteConfig;
//! use fedshare_core::ports::IRemoteTransport;
//! use fedshare_remote::HttpRemoteTransport;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let transport = HttpRemoteTransport::new(&RemoteConfig::default())?;
//! let status = transport.probe("cloud.example.com").await?;
//! println!("available: {}", status.is_available());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use fedshare_core::config::RemoteConfig;
use fedshare_core::ports::{IRemoteTransport, RemoteStatus};

use crate::RemoteError;

/// Path of the status document relative to the remote base URL
const STATUS_PATH: &str = "status.php";

/// Body of a `status.php` response
#[derive(Debug, Deserialize)]
struct StatusResponse {
    installed: bool,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    versionstring: Option<String>,
}

/// HTTP client probing remote share endpoints
#[derive(Debug, Clone)]
pub struct HttpRemoteTransport {
    client: Client,
}

impl HttpRemoteTransport {
    /// Creates a transport using the timeout and user agent from `config`
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// Creates a transport around an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Builds the status URL for `remote`
    ///
    /// `cloud.example.com/nc` becomes `https://cloud.example.com/nc/status.php`.
    pub fn status_url(remote: &str) -> Result<Url, RemoteError> {
        let remote = remote.trim();
        let with_scheme = if remote.contains("://") {
            remote.to_string()
        } else {
            format!("https://{remote}")
        };

        let mut base = Url::parse(&with_scheme)
            .map_err(|e| RemoteError::InvalidUrl(format!("{remote}: {e}")))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidUrl(format!(
                "{remote}: unsupported scheme '{}'",
                base.scheme()
            )));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        base.join(STATUS_PATH)
            .map_err(|e| RemoteError::InvalidUrl(format!("{remote}: {e}")))
    }

    async fn fetch_status(&self, remote: &str) -> Result<RemoteStatus, RemoteError> {
        let url = Self::status_url(remote)?;
        debug!(url = %url, "Probing remote status");

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Remote did not answer");
                return Ok(RemoteStatus::unreachable());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Remote answered with error status");
            return Ok(RemoteStatus::unreachable());
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("{url}: {e}")))?;

        Ok(RemoteStatus {
            reachable: true,
            installed: body.installed,
            version: body.versionstring.or(body.version),
        })
    }
}

#[async_trait::async_trait]
impl IRemoteTransport for HttpRemoteTransport {
    async fn probe(&self, remote: &str) -> anyhow::Result<RemoteStatus> {
        Ok(self.fetch_status(remote).await?)
    }
}
