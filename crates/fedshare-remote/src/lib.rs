//! fedshare Remote - HTTP access to remote share endpoints
//!
//! Provides the [`HttpRemoteTransport`] adapter, which implements the
//! `IRemoteTransport` port from `fedshare-core` by querying a remote
//! endpoint's `status.php`.
//!
//! ## Modules
//!
//! - [`transport`] - Status probe over HTTP

pub mod transport;

pub use transport::HttpRemoteTransport;

use thiserror::Error;

/// Errors that can occur when talking to a remote endpoint
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote identifier cannot be turned into an HTTP(S) URL
    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be built or the request failed to send
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The endpoint answered with a body that is not a status document
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
