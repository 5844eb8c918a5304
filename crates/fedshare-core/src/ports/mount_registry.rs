//! Mount registry port (driven/secondary port)
//!
//! This module defines the interface of the subsystem that turns accepted
//! shares into live filesystem mounts. Creating the remote storage driver
//! (storage factory) is the registry's own concern.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because mount failures are adapter-specific.
//! - `MountRequest` is a port-level DTO built from an accepted
//!   `ShareRecord`; the registry never reads the record store directly.

use serde::{Deserialize, Serialize};

use crate::domain::{
    newtypes::{MountPoint, ShareName, UserId},
    ShareRecord,
};

/// Everything a mount registry needs to materialize one share
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountRequest {
    /// Remote endpoint the share lives on
    pub remote: String,
    /// Credential issued by the remote
    pub token: String,
    /// Share password, empty when unset
    pub password: String,
    /// Remote folder name
    pub name: ShareName,
    /// Remote user that offered the share
    pub owner: String,
    /// Local user the mount belongs to
    pub user: UserId,
    /// Local mount point
    pub mount_point: MountPoint,
}

impl From<&ShareRecord> for MountRequest {
    fn from(record: &ShareRecord) -> Self {
        Self {
            remote: record.remote().to_string(),
            token: record.share_token().as_str().to_string(),
            password: record.password().to_string(),
            name: record.name().clone(),
            owner: record.owner().to_string(),
            user: record.user().clone(),
            mount_point: record.mount_point().clone(),
        }
    }
}

/// Port trait for the filesystem mount registration subsystem
#[async_trait::async_trait]
pub trait IMountRegistry: Send + Sync {
    /// Registers a live mount for an accepted share
    async fn add_mount(&self, request: &MountRequest) -> anyhow::Result<()>;

    /// Removes the mount at `mount_point` for `user`, if one is registered
    async fn remove_mount(&self, user: &UserId, mount_point: &MountPoint) -> anyhow::Result<()>;
}
