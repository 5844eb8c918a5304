//! Error types for share management

use thiserror::Error;

use crate::domain::{DomainError, ShareId};

/// Errors returned by [`ShareManager`](super::ShareManager) operations
#[derive(Debug, Error)]
pub enum ShareError {
    /// Share data failed validation
    #[error("invalid share data: {0}")]
    Validation(#[from] DomainError),

    /// No share with this id exists for the requesting user
    #[error("share not found: {0}")]
    NotFound(ShareId),

    /// The record store failed
    #[error("storage error: {0}")]
    Store(#[from] anyhow::Error),

    /// The mount registry rejected a request
    #[error("mount registry error: {0}")]
    Mount(String),

    /// The remote endpoint could not be probed
    #[error("remote error: {0}")]
    Remote(String),
}
