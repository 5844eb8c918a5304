//! Remote transport port (driven/secondary port)
//!
//! This module defines the interface used to check whether the remote
//! endpoint of a share is reachable. It is never called while adding,
//! accepting, declining or removing shares.

use serde::{Deserialize, Serialize};

/// Result of probing a remote endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteStatus {
    /// The endpoint answered with a success status
    pub reachable: bool,
    /// The endpoint reports a completed installation
    pub installed: bool,
    /// Version string reported by the endpoint, if any
    pub version: Option<String>,
}

impl RemoteStatus {
    /// Status for an endpoint that could not be reached
    pub fn unreachable() -> Self {
        Self::default()
    }

    /// Returns true if shares on this endpoint can be mounted
    pub fn is_available(&self) -> bool {
        self.reachable && self.installed
    }
}

/// Port trait for HTTP access to remote endpoints
#[async_trait::async_trait]
pub trait IRemoteTransport: Send + Sync {
    /// Probes the status endpoint of `remote`
    ///
    /// Connection failures and non-success statuses yield
    /// [`RemoteStatus::unreachable`]; an unparseable answer is an error.
    async fn probe(&self, remote: &str) -> anyhow::Result<RemoteStatus>;
}
