//! Share record domain entity
//!
//! This module defines the ShareRecord entity, one row per remote share
//! offered to a local user, together with the insert payload handed to
//! the record store.

use serde::{Deserialize, Serialize};

use super::newtypes::{MountPoint, ShareId, ShareName, ShareToken, UserId};

/// Lifecycle state of a share record
///
/// Declined shares are deleted rather than flagged, so only two states
/// are ever stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareState {
    /// Offered by the remote but not yet accepted by the user
    #[default]
    Open,
    /// Accepted by the user and eligible for mounting
    Accepted,
}

impl ShareState {
    /// Maps the stored `accepted` flag to a state
    pub fn from_accepted(accepted: bool) -> Self {
        if accepted {
            ShareState::Accepted
        } else {
            ShareState::Open
        }
    }

    /// Returns true for the accepted state
    pub fn is_accepted(&self) -> bool {
        matches!(self, ShareState::Accepted)
    }
}

impl std::fmt::Display for ShareState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShareState::Open => write!(f, "open"),
            ShareState::Accepted => write!(f, "accepted"),
        }
    }
}

/// Validated data for a record that has not been stored yet
///
/// The mount point is already resolved; the store only assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShareRecord {
    pub remote: String,
    pub share_token: ShareToken,
    pub password: String,
    pub name: ShareName,
    pub owner: String,
    pub user: UserId,
    pub mount_point: MountPoint,
    pub accepted: bool,
}

/// A federated share mirrored locally for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    /// Store-assigned identifier, stable for the record's lifetime
    id: ShareId,
    /// Remote endpoint identifier
    remote: String,
    /// Credential issued by the remote for this share
    share_token: ShareToken,
    /// Optional share password, empty when unset
    password: String,
    /// Canonical remote-side folder name
    name: ShareName,
    /// Remote user that offered the share
    owner: String,
    /// Local user the record belongs to
    user: UserId,
    /// Locally unique display name
    mount_point: MountPoint,
    /// Pending vs accepted
    accepted: bool,
}

impl ShareRecord {
    /// Reconstitutes a record from its store-assigned id and stored data
    pub fn with_id(id: ShareId, data: NewShareRecord) -> Self {
        Self {
            id,
            remote: data.remote,
            share_token: data.share_token,
            password: data.password,
            name: data.name,
            owner: data.owner,
            user: data.user,
            mount_point: data.mount_point,
            accepted: data.accepted,
        }
    }

    // --- Getters ---

    pub fn id(&self) -> ShareId {
        self.id
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn share_token(&self) -> &ShareToken {
        &self.share_token
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns true if the share is protected by a password
    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }

    pub fn name(&self) -> &ShareName {
        &self.name
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn mount_point(&self) -> &MountPoint {
        &self.mount_point
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    pub fn state(&self) -> ShareState {
        ShareState::from_accepted(self.accepted)
    }

    // --- Transitions ---

    /// Marks the share accepted under its final mount point
    ///
    /// The id is left untouched.
    pub fn accept(&mut self, mount_point: MountPoint) {
        self.accepted = true;
        self.mount_point = mount_point;
    }
}
