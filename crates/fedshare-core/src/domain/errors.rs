//! Domain error types
//!
//! This module defines error types raised while validating share data,
//! such as malformed folder names, empty tokens, or empty user identifiers.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Remote folder name is empty or resolves to the root
    #[error("Invalid share name: {0}")]
    InvalidShareName(String),

    /// Share token is empty or malformed
    #[error("Invalid share token: {0}")]
    InvalidToken(String),

    /// Local user identifier is empty or malformed
    #[error("Invalid user: {0}")]
    InvalidUser(String),

    /// Mount point string is empty
    #[error("Invalid mount point: {0}")]
    InvalidMountPoint(String),

    /// Remote endpoint identifier is empty
    #[error("Invalid remote: {0}")]
    InvalidRemote(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}
