//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for share identifiers and values.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// Store-assigned identifiers
// ============================================================================

/// Identifier of a share record, assigned by the record store
///
/// Identifiers increase monotonically with insertion order, so sorting by
/// `ShareId` yields creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareId(i64);

impl ShareId {
    /// Wrap a raw store identifier
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw store identifier
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl Display for ShareId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ShareId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid ShareId '{s}': {e}")))
    }
}

impl From<i64> for ShareId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ============================================================================
// Local user
// ============================================================================

/// Identifier of a local user that owns share records
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId
    ///
    /// # Errors
    /// Returns error if the identifier is empty or contains only whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidUser(
                "User ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

// ============================================================================
// Share token
// ============================================================================

/// Opaque credential issued by the remote system for one share
///
/// The `Debug` output is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShareToken(String);

impl ShareToken {
    /// Create a new ShareToken
    ///
    /// # Errors
    /// Returns error if the token is empty
    pub fn new(token: impl Into<String>) -> Result<Self, DomainError> {
        let token = token.into();
        if token.is_empty() {
            return Err(DomainError::InvalidToken(
                "Share token cannot be empty".to_string(),
            ));
        }
        if token.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidToken(
                "Share token contains whitespace".to_string(),
            ));
        }
        Ok(Self(token))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for ShareToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("ShareToken(<redacted>)")
    }
}

impl TryFrom<String> for ShareToken {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ShareToken> for String {
    fn from(token: ShareToken) -> Self {
        token.0
    }
}

// ============================================================================
// Remote folder name
// ============================================================================

/// Canonical remote-side folder name of a share, always starting with `/`
///
/// Construction normalizes the input: a missing leading slash is added,
/// repeated slashes and `.` segments are dropped, and a trailing slash is
/// removed. For example `SharedFolder/` and `//SharedFolder` both become
/// `/SharedFolder`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShareName(String);

impl ShareName {
    /// Create a normalized ShareName
    ///
    /// # Errors
    /// Returns error if the name is empty, resolves to the root folder,
    /// or contains a `..` segment
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();

        let mut segments = Vec::new();
        for segment in name.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(DomainError::InvalidShareName(format!(
                        "Share name contains invalid traversal: {name}"
                    )));
                }
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(DomainError::InvalidShareName(format!(
                "Share name must name a folder below the root: '{name}'"
            )));
        }

        Ok(Self(format!("/{}", segments.join("/"))))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ShareName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ShareName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ShareName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ShareName> for String {
    fn from(name: ShareName) -> Self {
        name.0
    }
}

// ============================================================================
// Mount point
// ============================================================================

/// Locally unique display name under which a share appears for its user
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MountPoint(String);

impl MountPoint {
    /// Create a new MountPoint
    ///
    /// # Errors
    /// Returns error if the mount point is empty
    pub fn new(mount_point: impl Into<String>) -> Result<Self, DomainError> {
        let mount_point = mount_point.into();
        if mount_point.is_empty() {
            return Err(DomainError::InvalidMountPoint(
                "Mount point cannot be empty".to_string(),
            ));
        }
        Ok(Self(mount_point))
    }

    /// Wraps a candidate produced by the naming resolver, which is never empty
    pub(crate) fn from_resolved(mount_point: String) -> Self {
        debug_assert!(!mount_point.is_empty());
        Self(mount_point)
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MountPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MountPoint {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for MountPoint {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<MountPoint> for String {
    fn from(mount_point: MountPoint) -> Self {
        mount_point.0
    }
}
