//! Share repository port (driven/secondary port)
//!
//! This module defines the interface for persisting and querying
//! federated share records.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, in-memory, etc.) and don't need domain-level classification.
//! - The `ShareFilter` struct provides a composable query mechanism
//!   without exposing storage implementation details.
//! - The repository holds no business logic: mount point resolution and
//!   ownership checks belong to `ShareManager`, its only caller.

use crate::domain::{
    newtypes::{MountPoint, ShareId, UserId},
    NewShareRecord, ShareRecord,
};

/// Filter criteria for querying share records
///
/// All fields are optional; when `None`, no filtering is applied for that field.
/// Multiple filters are combined with AND logic.
///
/// # Example
///
/// ```
/// use fedshare_core::domain::UserId;
/// use fedshare_core::ports::ShareFilter;
///
/// // Open shares of a single user
/// let user = UserId::new("alice").unwrap();
/// let filter = ShareFilter::new().with_user(user).with_accepted(false);
/// assert!(!filter.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareFilter {
    /// Filter by owning local user
    pub user: Option<UserId>,
    /// Filter by accepted flag
    pub accepted: Option<bool>,
    /// Filter by exact mount point
    pub mount_point: Option<MountPoint>,
}

impl ShareFilter {
    /// Creates a new empty filter (matches all records of all users)
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the user filter
    pub fn with_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    /// Sets the accepted filter
    pub fn with_accepted(mut self, accepted: bool) -> Self {
        self.accepted = Some(accepted);
        self
    }

    /// Sets the accepted filter from a tri-valued option
    pub fn with_accepted_opt(mut self, accepted: Option<bool>) -> Self {
        self.accepted = accepted;
        self
    }

    /// Sets the mount point filter
    pub fn with_mount_point(mut self, mount_point: MountPoint) -> Self {
        self.mount_point = Some(mount_point);
        self
    }

    /// Returns true if no filters are set
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.accepted.is_none() && self.mount_point.is_none()
    }

    /// Returns true if the record satisfies every set criterion
    pub fn matches(&self, record: &ShareRecord) -> bool {
        self.user.as_ref().map_or(true, |u| record.user() == u)
            && self.accepted.map_or(true, |a| record.is_accepted() == a)
            && self
                .mount_point
                .as_ref()
                .map_or(true, |mp| record.mount_point() == mp)
    }
}

/// Port trait for persistent share storage
///
/// ## Implementation Notes
///
/// - Implementations should ensure atomicity for individual operations;
///   in particular `delete_by_user` must remove every matching row in one
///   step so concurrent listings never see a partial deletion.
/// - `query` returns records ordered by ascending id (creation order).
/// - `(user, mount_point)` must be unique; an insert or update violating
///   this returns an error.
#[async_trait::async_trait]
pub trait IShareRepository: Send + Sync {
    /// Inserts a new record and returns its store-assigned id
    async fn insert(&self, record: &NewShareRecord) -> anyhow::Result<ShareId>;

    /// Retrieves a record by id regardless of owner
    async fn get(&self, id: ShareId) -> anyhow::Result<Option<ShareRecord>>;

    /// Queries records matching the filter, ordered by ascending id
    async fn query(&self, filter: &ShareFilter) -> anyhow::Result<Vec<ShareRecord>>;

    /// Sets the accepted flag and mount point of the record `id` owned by `user`
    ///
    /// Returns `false` if no such record exists.
    async fn update_accepted(
        &self,
        id: ShareId,
        user: &UserId,
        accepted: bool,
        mount_point: &MountPoint,
    ) -> anyhow::Result<bool>;

    /// Deletes the record `id` owned by `user`
    ///
    /// Returns `false` if no such record exists.
    async fn delete_by_id(&self, id: ShareId, user: &UserId) -> anyhow::Result<bool>;

    /// Deletes every record owned by `user` and returns how many were removed
    async fn delete_by_user(&self, user: &UserId) -> anyhow::Result<u64>;
}
