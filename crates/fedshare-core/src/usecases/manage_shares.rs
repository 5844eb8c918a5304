//! Share management use case
//!
//! Orchestrates the lifecycle of federated share records for local users:
//! mount point assignment for incoming shares, acceptance, declining,
//! removal, and listing. Persistence goes through [`IShareRepository`];
//! mounting and remote checks go through the injected registry and
//! transport ports.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::domain::{
    DomainError, MountPoint, MountPointResolver, NewShareRecord, ShareId, ShareName, ShareRecord,
    ShareToken, UserId,
};
use crate::ports::{
    IMountRegistry, IRemoteTransport, IShareRepository, MountRequest, RemoteStatus, ShareFilter,
};

use super::error::ShareError;

/// Unvalidated data for a share offered by a remote system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShare {
    /// Remote endpoint identifier
    pub remote: String,
    /// Credential issued by the remote
    pub token: String,
    /// Share password, empty when unset
    pub password: String,
    /// Remote folder name; normalized to start with `/`
    pub name: String,
    /// Remote user that offered the share
    pub owner: String,
    /// Create the share already accepted (previously trusted endpoints)
    pub accepted: bool,
    /// Local user receiving the share
    pub user: String,
}

impl NewShare {
    /// Creates an open, password-less share offer
    pub fn new(
        remote: impl Into<String>,
        token: impl Into<String>,
        name: impl Into<String>,
        owner: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            remote: remote.into(),
            token: token.into(),
            password: String::new(),
            name: name.into(),
            owner: owner.into(),
            accepted: false,
            user: user.into(),
        }
    }

    /// Sets the share password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Sets the initial acceptance state
    pub fn with_accepted(mut self, accepted: bool) -> Self {
        self.accepted = accepted;
        self
    }

    fn validate(self) -> Result<(UserId, ShareName, ShareToken, Self), DomainError> {
        if self.remote.trim().is_empty() {
            return Err(DomainError::InvalidRemote(
                "Remote cannot be empty".to_string(),
            ));
        }
        let user = UserId::new(self.user.clone())?;
        let name = ShareName::new(self.name.clone())?;
        let token = ShareToken::new(self.token.clone())?;
        Ok((user, name, token, self))
    }
}

/// Use case for managing the federated shares of local users
///
/// Mount point resolution and the following write happen under a per-user
/// lock, so concurrent calls for the same user never compute the same
/// "unused" name.
pub struct ShareManager {
    repository: Arc<dyn IShareRepository>,
    mount_registry: Arc<dyn IMountRegistry>,
    remote_transport: Arc<dyn IRemoteTransport>,
    user_locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl ShareManager {
    /// Creates a new ShareManager with the required dependencies
    ///
    /// # Arguments
    ///
    /// * `repository` - Persistent storage for share records
    /// * `mount_registry` - Subsystem that materializes accepted shares as mounts
    /// * `remote_transport` - HTTP access used to probe remote endpoints
    pub fn new(
        repository: Arc<dyn IShareRepository>,
        mount_registry: Arc<dyn IMountRegistry>,
        remote_transport: Arc<dyn IRemoteTransport>,
    ) -> Self {
        Self {
            repository,
            mount_registry,
            remote_transport,
            user_locks: DashMap::new(),
        }
    }

    /// Stores a share offered by a remote system under a collision-free mount point
    ///
    /// Open shares get a placeholder mount point; shares created accepted
    /// use the bare folder name. Nothing is mounted and no remote is
    /// contacted.
    ///
    /// # Errors
    ///
    /// Returns `ShareError::Validation` for malformed input and
    /// `ShareError::Store` if the record cannot be persisted.
    pub async fn add_share(&self, share: NewShare) -> Result<ShareRecord, ShareError> {
        let (user, name, share_token, share) = share.validate()?;

        let _guard = self.lock_user(&user).await;

        let used = self.used_mount_points(&user, None).await?;
        let mount_point = MountPointResolver::resolve(&name, share.accepted, &used);

        let data = NewShareRecord {
            remote: share.remote,
            share_token,
            password: share.password,
            name,
            owner: share.owner,
            user,
            mount_point,
            accepted: share.accepted,
        };

        let id = self
            .repository
            .insert(&data)
            .await
            .context("Failed to insert share record")?;

        let record = ShareRecord::with_id(id, data);
        info!(
            user = %record.user(),
            share_id = %id,
            mount_point = %record.mount_point(),
            state = %record.state(),
            "Added federated share"
        );

        Ok(record)
    }

    /// Returns the shares of `user` matching the tri-valued acceptance filter
    ///
    /// `Some(true)` lists accepted shares, `Some(false)` open ones and
    /// `None` all of them. Results are in creation order.
    pub async fn get_shares(
        &self,
        user: &UserId,
        accepted: Option<bool>,
    ) -> Result<Vec<ShareRecord>, ShareError> {
        let filter = ShareFilter::new()
            .with_user(user.clone())
            .with_accepted_opt(accepted);

        let shares = self
            .repository
            .query(&filter)
            .await
            .context("Failed to query share records")?;

        Ok(shares)
    }

    /// Returns the shares of `user` that are not accepted yet
    pub async fn get_open_shares(&self, user: &UserId) -> Result<Vec<ShareRecord>, ShareError> {
        self.get_shares(user, Some(false)).await
    }

    /// Returns the accepted shares of `user`
    pub async fn get_accepted_shares(
        &self,
        user: &UserId,
    ) -> Result<Vec<ShareRecord>, ShareError> {
        self.get_shares(user, Some(true)).await
    }

    /// Returns the share `id` if it belongs to `user`
    pub async fn get_share(
        &self,
        user: &UserId,
        id: ShareId,
    ) -> Result<Option<ShareRecord>, ShareError> {
        let share = self
            .repository
            .get(id)
            .await
            .context("Failed to load share record")?;

        Ok(share.filter(|s| s.user() == user))
    }

    /// Accepts the share `id` of `user`
    ///
    /// The record keeps its id. Its mount point becomes the bare folder
    /// name, suffixed with `-N` if another share of the user already uses
    /// it. Other records are never renamed. Accepting an accepted share
    /// returns it unchanged. Mounting is left to the caller (see
    /// [`ShareManager::setup_mounts`]).
    ///
    /// # Errors
    ///
    /// Returns `ShareError::NotFound` if `user` has no share with this id.
    pub async fn accept_share(&self, user: &UserId, id: ShareId) -> Result<ShareRecord, ShareError> {
        let _guard = self.lock_user(user).await;

        let mut share = self
            .get_share(user, id)
            .await?
            .ok_or(ShareError::NotFound(id))?;

        if share.is_accepted() {
            debug!(user = %user, share_id = %id, "Share already accepted");
            return Ok(share);
        }

        let used = self.used_mount_points(user, Some(id)).await?;
        let mount_point = MountPointResolver::resolve(share.name(), true, &used);
        debug!(
            share_id = %id,
            from = %share.mount_point(),
            from_placeholder = MountPointResolver::is_placeholder(share.mount_point()),
            to = %mount_point,
            "Resolved accepted mount point"
        );

        let updated = self
            .repository
            .update_accepted(id, user, true, &mount_point)
            .await
            .context("Failed to mark share as accepted")?;
        if !updated {
            return Err(ShareError::NotFound(id));
        }

        share.accept(mount_point);
        info!(
            user = %user,
            share_id = %id,
            mount_point = %share.mount_point(),
            "Accepted federated share"
        );

        Ok(share)
    }

    /// Declines the share `id` of `user`, deleting the record
    ///
    /// Declining an unknown id is a no-op, so repeated calls are idempotent.
    pub async fn decline_share(&self, user: &UserId, id: ShareId) -> Result<(), ShareError> {
        let removed = self
            .repository
            .delete_by_id(id, user)
            .await
            .context("Failed to delete declined share")?;

        if removed {
            info!(user = %user, share_id = %id, "Declined federated share");
        } else {
            debug!(user = %user, share_id = %id, "Decline ignored, share not found");
        }

        Ok(())
    }

    /// Removes the share of `user` mounted at `mount_point`
    ///
    /// If the share was accepted, its mount is dropped from the registry
    /// before the record is deleted; when the registry fails the record is
    /// kept and `ShareError::Mount` is returned. Returns `false` if the user
    /// has no share at that mount point.
    pub async fn remove_share(
        &self,
        user: &UserId,
        mount_point: &MountPoint,
    ) -> Result<bool, ShareError> {
        let _guard = self.lock_user(user).await;

        let filter = ShareFilter::new()
            .with_user(user.clone())
            .with_mount_point(mount_point.clone());
        let share = self
            .repository
            .query(&filter)
            .await
            .context("Failed to look up share by mount point")?
            .into_iter()
            .next();

        let Some(share) = share else {
            debug!(user = %user, mount_point = %mount_point, "No share at mount point");
            return Ok(false);
        };

        // The row must outlive a failed unmount
        if share.is_accepted() {
            self.mount_registry
                .remove_mount(user, mount_point)
                .await
                .map_err(|e| ShareError::Mount(format!("remove {mount_point}: {e}")))?;
        }

        let removed = self
            .repository
            .delete_by_id(share.id(), user)
            .await
            .context("Failed to delete share record")?;

        info!(
            user = %user,
            share_id = %share.id(),
            mount_point = %mount_point,
            "Removed federated share"
        );
        Ok(removed)
    }

    /// Deletes every share of `user` in any state, returning the count
    ///
    /// Used when the user is deprovisioned. The store removes all rows in
    /// a single statement, and the user's lock is released for good unless
    /// another call for the same user is waiting on it.
    pub async fn remove_user_shares(&self, user: &UserId) -> Result<u64, ShareError> {
        let guard = self.lock_user(user).await;

        let removed = self
            .repository
            .delete_by_user(user)
            .await
            .context("Failed to delete shares of user");

        drop(guard);
        self.user_locks
            .remove_if(user, |_, lock| Arc::strong_count(lock) == 1);

        let removed = removed?;

        info!(user = %user, removed, "Removed all federated shares of user");
        Ok(removed)
    }

    /// Registers a mount for every accepted share of `user`
    ///
    /// A share whose mount cannot be registered is logged and skipped.
    /// Returns the number of mounts registered.
    pub async fn setup_mounts(&self, user: &UserId) -> Result<usize, ShareError> {
        let accepted = self.get_accepted_shares(user).await?;

        let mut mounted = 0;
        for share in &accepted {
            let request = MountRequest::from(share);
            match self.mount_registry.add_mount(&request).await {
                Ok(()) => mounted += 1,
                Err(e) => warn!(
                    user = %user,
                    share_id = %share.id(),
                    mount_point = %share.mount_point(),
                    error = %e,
                    "Failed to register mount"
                ),
            }
        }

        debug!(user = %user, mounted, total = accepted.len(), "Mounts set up");
        Ok(mounted)
    }

    /// Probes the remote endpoint of the share `id` of `user`
    pub async fn test_remote(&self, user: &UserId, id: ShareId) -> Result<RemoteStatus, ShareError> {
        let share = self
            .get_share(user, id)
            .await?
            .ok_or(ShareError::NotFound(id))?;

        let status = self
            .remote_transport
            .probe(share.remote())
            .await
            .map_err(|e| ShareError::Remote(format!("probe {}: {e}", share.remote())))?;

        if !status.is_available() {
            warn!(share_id = %id, remote = share.remote(), "Remote endpoint unavailable");
        }

        Ok(status)
    }

    /// Mount point strings currently used by `user`, optionally ignoring one record
    async fn used_mount_points(
        &self,
        user: &UserId,
        exclude: Option<ShareId>,
    ) -> Result<HashSet<String>, ShareError> {
        let shares = self.get_shares(user, None).await?;

        Ok(shares
            .into_iter()
            .filter(|s| Some(s.id()) != exclude)
            .map(|s| String::from(s.mount_point().clone()))
            .collect())
    }

    async fn lock_user(&self, user: &UserId) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(
            self.user_locks
                .entry(user.clone())
                .or_insert_with(Default::default)
                .value(),
        );
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;

    const PLACEHOLDER: &str = "{{TemporaryMountPointName#/SharedFolder}}";

    /// In-memory repository enforcing the (user, mount point) uniqueness rule
    #[derive(Default)]
    struct InMemoryRepo {
        rows: StdMutex<Vec<ShareRecord>>,
        next_id: StdMutex<i64>,
    }

    #[async_trait]
    impl IShareRepository for InMemoryRepo {
        async fn insert(&self, record: &NewShareRecord) -> anyhow::Result<ShareId> {
            // Give other tasks a chance to interleave between resolve and insert
            tokio::task::yield_now().await;

            let mut rows = self.rows.lock().unwrap();
            if rows
                .iter()
                .any(|r| r.user() == &record.user && r.mount_point() == &record.mount_point)
            {
                anyhow::bail!("UNIQUE constraint failed: share_external.user, mountpoint");
            }
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let id = ShareId::new(*next_id);
            rows.push(ShareRecord::with_id(id, record.clone()));
            Ok(id)
        }

        async fn get(&self, id: ShareId) -> anyhow::Result<Option<ShareRecord>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|r| r.id() == id).cloned())
        }

        async fn query(&self, filter: &ShareFilter) -> anyhow::Result<Vec<ShareRecord>> {
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<_> = rows.iter().filter(|r| filter.matches(r)).cloned().collect();
            out.sort_by_key(|r| r.id());
            Ok(out)
        }

        async fn update_accepted(
            &self,
            id: ShareId,
            user: &UserId,
            accepted: bool,
            mount_point: &MountPoint,
        ) -> anyhow::Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|r| r.id() == id && r.user() == user) {
                Some(row) if accepted => {
                    row.accept(mount_point.clone());
                    Ok(true)
                }
                Some(_) => Ok(true),
                None => Ok(false),
            }
        }

        async fn delete_by_id(&self, id: ShareId, user: &UserId) -> anyhow::Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| !(r.id() == id && r.user() == user));
            Ok(rows.len() != before)
        }

        async fn delete_by_user(&self, user: &UserId) -> anyhow::Result<u64> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.user() != user);
            Ok((before - rows.len()) as u64)
        }
    }

    /// Repository whose every call fails
    struct FailingRepo;

    #[async_trait]
    impl IShareRepository for FailingRepo {
        async fn insert(&self, _r: &NewShareRecord) -> anyhow::Result<ShareId> {
            anyhow::bail!("database is locked")
        }
        async fn get(&self, _id: ShareId) -> anyhow::Result<Option<ShareRecord>> {
            anyhow::bail!("database is locked")
        }
        async fn query(&self, _f: &ShareFilter) -> anyhow::Result<Vec<ShareRecord>> {
            anyhow::bail!("database is locked")
        }
        async fn update_accepted(
            &self,
            _id: ShareId,
            _u: &UserId,
            _a: bool,
            _mp: &MountPoint,
        ) -> anyhow::Result<bool> {
            anyhow::bail!("database is locked")
        }
        async fn delete_by_id(&self, _id: ShareId, _u: &UserId) -> anyhow::Result<bool> {
            anyhow::bail!("database is locked")
        }
        async fn delete_by_user(&self, _u: &UserId) -> anyhow::Result<u64> {
            anyhow::bail!("database is locked")
        }
    }

    /// Mount registry that records requests and can reject one mount point
    #[derive(Default)]
    struct RecordingRegistry {
        added: StdMutex<Vec<MountRequest>>,
        removed: StdMutex<Vec<(UserId, MountPoint)>>,
        reject: Option<String>,
        fail_remove: AtomicBool,
    }

    #[async_trait]
    impl IMountRegistry for RecordingRegistry {
        async fn add_mount(&self, request: &MountRequest) -> anyhow::Result<()> {
            if self.reject.as_deref() == Some(request.mount_point.as_str()) {
                anyhow::bail!("storage backend unavailable");
            }
            self.added.lock().unwrap().push(request.clone());
            Ok(())
        }

        async fn remove_mount(&self, user: &UserId, mount_point: &MountPoint) -> anyhow::Result<()> {
            if self.fail_remove.load(Ordering::SeqCst) {
                anyhow::bail!("mount is busy");
            }
            self.removed
                .lock()
                .unwrap()
                .push((user.clone(), mount_point.clone()));
            Ok(())
        }
    }

    /// Transport answering with a fixed status or error
    struct StubTransport {
        status: Option<RemoteStatus>,
        probed: StdMutex<Vec<String>>,
    }

    impl StubTransport {
        fn answering(status: Option<RemoteStatus>) -> Self {
            Self {
                status,
                probed: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl IRemoteTransport for StubTransport {
        async fn probe(&self, remote: &str) -> anyhow::Result<RemoteStatus> {
            self.probed.lock().unwrap().push(remote.to_string());
            self.status
                .clone()
                .ok_or_else(|| anyhow::anyhow!("invalid status payload"))
        }
    }

    struct Fixture {
        manager: ShareManager,
        repo: Arc<InMemoryRepo>,
        registry: Arc<RecordingRegistry>,
        transport: Arc<StubTransport>,
    }

    fn fixture_with(registry: RecordingRegistry, status: Option<RemoteStatus>) -> Fixture {
        let repo = Arc::new(InMemoryRepo::default());
        let registry = Arc::new(registry);
        let transport = Arc::new(StubTransport::answering(status));
        let manager = ShareManager::new(
            Arc::clone(&repo) as Arc<dyn IShareRepository>,
            Arc::clone(&registry) as Arc<dyn IMountRegistry>,
            Arc::clone(&transport) as Arc<dyn IRemoteTransport>,
        );
        Fixture {
            manager,
            repo,
            registry,
            transport,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingRegistry::default(), None)
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn offer(token: &str, user: &str) -> NewShare {
        NewShare::new("localhost", token, "/SharedFolder", "foobar", user)
    }

    fn mount_points(shares: &[ShareRecord]) -> Vec<&str> {
        shares.iter().map(|s| s.mount_point().as_str()).collect()
    }

    #[tokio::test]
    async fn test_full_share_lifecycle() {
        let f = fixture();
        let alice = user("alice");

        // Add a share for the user
        let a = f.manager.add_share(offer("token1", "alice")).await.unwrap();
        let open = f.manager.get_open_shares(&alice).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].mount_point().as_str(), PLACEHOLDER);
        assert_eq!(open[0].share_token().as_str(), "token1");

        // Same name again falls back to the "-1" suffix
        let b = f.manager.add_share(offer("token2", "alice")).await.unwrap();
        let open = f.manager.get_open_shares(&alice).await.unwrap();
        assert_eq!(
            mount_points(&open),
            vec![PLACEHOLDER.to_string(), format!("{PLACEHOLDER}-1")]
        );

        // Accept the first share
        f.manager.accept_share(&alice, a.id()).await.unwrap();
        let accepted = f.manager.get_accepted_shares(&alice).await.unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id(), a.id());
        assert_eq!(accepted[0].mount_point().as_str(), "/SharedFolder");
        let open = f.manager.get_open_shares(&alice).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id(), b.id());
        assert_eq!(open[0].mount_point().as_str(), format!("{PLACEHOLDER}-1"));

        // The vacated placeholder is reused
        let c = f.manager.add_share(offer("token3", "alice")).await.unwrap();
        assert_eq!(c.mount_point().as_str(), PLACEHOLDER);
        let open = f.manager.get_open_shares(&alice).await.unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[1].id(), c.id());

        // Decline the third share
        f.manager.decline_share(&alice, c.id()).await.unwrap();
        let open = f.manager.get_open_shares(&alice).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id(), b.id());
        assert_eq!(f.manager.get_accepted_shares(&alice).await.unwrap().len(), 1);

        // Deprovision the user
        let removed = f.manager.remove_user_shares(&alice).await.unwrap();
        assert_eq!(removed, 2);
        assert!(f.repo.query(&ShareFilter::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_share_pre_accepted_uses_bare_name() {
        let f = fixture();
        let share = f
            .manager
            .add_share(offer("token1", "alice").with_accepted(true))
            .await
            .unwrap();
        assert!(share.is_accepted());
        assert_eq!(share.mount_point().as_str(), "/SharedFolder");

        let again = f
            .manager
            .add_share(offer("token2", "alice").with_accepted(true))
            .await
            .unwrap();
        assert_eq!(again.mount_point().as_str(), "/SharedFolder-1");
    }

    #[tokio::test]
    async fn test_add_share_normalizes_name() {
        let f = fixture();
        let share = f
            .manager
            .add_share(NewShare::new("localhost", "t", "SharedFolder/", "bob", "alice"))
            .await
            .unwrap();
        assert_eq!(share.name().as_str(), "/SharedFolder");
        assert_eq!(share.mount_point().as_str(), PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_add_share_rejects_invalid_input() {
        let f = fixture();

        let err = f
            .manager
            .add_share(NewShare::new("localhost", "t", "/", "bob", "alice"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShareError::Validation(DomainError::InvalidShareName(_))
        ));

        let err = f
            .manager
            .add_share(NewShare::new("localhost", "", "/x", "bob", "alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::Validation(DomainError::InvalidToken(_))));

        let err = f
            .manager
            .add_share(NewShare::new("", "t", "/x", "bob", "alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::Validation(DomainError::InvalidRemote(_))));

        assert!(f.repo.query(&ShareFilter::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mount_points_are_scoped_per_user() {
        let f = fixture();
        let a = f.manager.add_share(offer("t1", "alice")).await.unwrap();
        let b = f.manager.add_share(offer("t2", "bob")).await.unwrap();
        assert_eq!(a.mount_point(), b.mount_point());
    }

    #[tokio::test]
    async fn test_accept_resolves_collision_with_bare_name() {
        let f = fixture();
        let alice = user("alice");
        let trusted = f
            .manager
            .add_share(offer("t1", "alice").with_accepted(true))
            .await
            .unwrap();
        let open = f.manager.add_share(offer("t2", "alice")).await.unwrap();

        let accepted = f.manager.accept_share(&alice, open.id()).await.unwrap();
        assert_eq!(accepted.id(), open.id());
        assert_eq!(accepted.mount_point().as_str(), "/SharedFolder-1");

        // The earlier share keeps its name
        let stored = f.manager.get_share(&alice, trusted.id()).await.unwrap().unwrap();
        assert_eq!(stored.mount_point().as_str(), "/SharedFolder");
    }

    #[tokio::test]
    async fn test_accept_is_idempotent() {
        let f = fixture();
        let alice = user("alice");
        let share = f.manager.add_share(offer("t1", "alice")).await.unwrap();

        let first = f.manager.accept_share(&alice, share.id()).await.unwrap();
        let second = f.manager.accept_share(&alice, share.id()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(f.manager.get_accepted_shares(&alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_accept_unknown_or_foreign_share_is_not_found() {
        let f = fixture();
        let share = f.manager.add_share(offer("t1", "alice")).await.unwrap();

        let err = f
            .manager
            .accept_share(&user("alice"), ShareId::new(999))
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::NotFound(id) if id == ShareId::new(999)));

        let err = f
            .manager
            .accept_share(&user("mallory"), share.id())
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::NotFound(_)));
        assert!(!f.repo.get(share.id()).await.unwrap().unwrap().is_accepted());
    }

    #[tokio::test]
    async fn test_decline_twice_is_noop() {
        let f = fixture();
        let alice = user("alice");
        let a = f.manager.add_share(offer("t1", "alice")).await.unwrap();
        let b = f.manager.add_share(offer("t2", "alice")).await.unwrap();

        f.manager.decline_share(&alice, a.id()).await.unwrap();
        f.manager.decline_share(&alice, a.id()).await.unwrap();

        let open = f.manager.get_open_shares(&alice).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id(), b.id());
    }

    #[tokio::test]
    async fn test_decline_of_other_users_share_is_ignored() {
        let f = fixture();
        let share = f.manager.add_share(offer("t1", "alice")).await.unwrap();

        f.manager.decline_share(&user("bob"), share.id()).await.unwrap();
        assert!(f.repo.get(share.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_user_shares_leaves_other_users() {
        let f = fixture();
        let alice = user("alice");
        let bob = user("bob");
        f.manager.add_share(offer("t1", "alice")).await.unwrap();
        let accepted = f.manager.add_share(offer("t2", "alice")).await.unwrap();
        f.manager.accept_share(&alice, accepted.id()).await.unwrap();
        f.manager.add_share(offer("t3", "bob")).await.unwrap();

        assert_eq!(f.manager.remove_user_shares(&alice).await.unwrap(), 2);

        for filter in [None, Some(true), Some(false)] {
            assert!(f.manager.get_shares(&alice, filter).await.unwrap().is_empty());
        }
        assert_eq!(f.manager.get_shares(&bob, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_shares_orders_by_creation() {
        let f = fixture();
        let alice = user("alice");
        let mut ids = Vec::new();
        for token in ["t1", "t2", "t3"] {
            ids.push(f.manager.add_share(offer(token, "alice")).await.unwrap().id());
        }
        f.manager.accept_share(&alice, ids[1]).await.unwrap();

        let all: Vec<_> = f
            .manager
            .get_shares(&alice, None)
            .await
            .unwrap()
            .iter()
            .map(ShareRecord::id)
            .collect();
        assert_eq!(all, ids);

        let open: Vec<_> = f
            .manager
            .get_open_shares(&alice)
            .await
            .unwrap()
            .iter()
            .map(ShareRecord::id)
            .collect();
        assert_eq!(open, vec![ids[0], ids[2]]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_get_distinct_mount_points() {
        let f = fixture();
        let manager = Arc::new(f.manager);

        let mut handles = Vec::new();
        for i in 0..16 {
            let manager = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                manager
                    .add_share(offer(&format!("token{i}"), "alice"))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let shares = manager.get_shares(&user("alice"), None).await.unwrap();
        let unique: HashSet<_> = shares.iter().map(|s| s.mount_point().clone()).collect();
        assert_eq!(shares.len(), 16);
        assert_eq!(unique.len(), 16);
    }

    #[tokio::test]
    async fn test_remove_share_by_mount_point() {
        let f = fixture();
        let alice = user("alice");
        let share = f.manager.add_share(offer("t1", "alice")).await.unwrap();
        let accepted = f.manager.accept_share(&alice, share.id()).await.unwrap();

        let removed = f
            .manager
            .remove_share(&alice, accepted.mount_point())
            .await
            .unwrap();
        assert!(removed);
        assert!(f.manager.get_shares(&alice, None).await.unwrap().is_empty());

        let dropped = f.registry.removed.lock().unwrap().clone();
        assert_eq!(dropped, vec![(alice.clone(), accepted.mount_point().clone())]);

        let again = f
            .manager
            .remove_share(&alice, accepted.mount_point())
            .await
            .unwrap();
        assert!(!again);
    }

    #[tokio::test]
    async fn test_remove_open_share_does_not_touch_registry() {
        let f = fixture();
        let alice = user("alice");
        let share = f.manager.add_share(offer("t1", "alice")).await.unwrap();

        assert!(f
            .manager
            .remove_share(&alice, share.mount_point())
            .await
            .unwrap());
        assert!(f.registry.removed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_share_keeps_record_when_unmount_fails() {
        let f = fixture();
        let alice = user("alice");
        let share = f
            .manager
            .add_share(offer("t1", "alice").with_accepted(true))
            .await
            .unwrap();

        f.registry.fail_remove.store(true, Ordering::SeqCst);
        let err = f
            .manager
            .remove_share(&alice, share.mount_point())
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::Mount(_)));
        assert!(f.manager.get_share(&alice, share.id()).await.unwrap().is_some());

        // Retry once the registry recovers
        f.registry.fail_remove.store(false, Ordering::SeqCst);
        let removed = f
            .manager
            .remove_share(&alice, share.mount_point())
            .await
            .unwrap();
        assert!(removed);
        assert!(f.manager.get_share(&alice, share.id()).await.unwrap().is_none());
        assert_eq!(f.registry.removed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_user_shares_releases_user_locks() {
        let f = fixture();
        let users: Vec<_> = (0..100).map(|i| format!("user{i}")).collect();
        for (i, id) in users.iter().enumerate() {
            f.manager
                .add_share(offer(&format!("t{i}"), id))
                .await
                .unwrap();
        }
        assert_eq!(f.manager.user_locks.len(), 100);

        for id in &users {
            f.manager.remove_user_shares(&user(id)).await.unwrap();
        }
        assert!(f.manager.user_locks.is_empty());
    }

    #[tokio::test]
    async fn test_remove_user_shares_keeps_lock_with_waiter() {
        let f = fixture();
        let alice = user("alice");
        f.manager.add_share(offer("t1", "alice")).await.unwrap();

        // A concurrent caller still holds a handle to the lock
        let waiter = Arc::clone(f.manager.user_locks.get(&alice).unwrap().value());
        f.manager.remove_user_shares(&alice).await.unwrap();
        assert!(f.manager.user_locks.contains_key(&alice));

        drop(waiter);
        f.manager.remove_user_shares(&alice).await.unwrap();
        assert!(!f.manager.user_locks.contains_key(&alice));
    }

    #[tokio::test]
    async fn test_setup_mounts_registers_accepted_only() {
        let registry = RecordingRegistry {
            reject: Some("/Broken".to_string()),
            ..Default::default()
        };
        let f = fixture_with(registry, None);
        let alice = user("alice");

        f.manager.add_share(offer("t1", "alice")).await.unwrap();
        let a = f.manager.add_share(offer("t2", "alice")).await.unwrap();
        f.manager.accept_share(&alice, a.id()).await.unwrap();
        f.manager
            .add_share(
                NewShare::new("localhost", "t3", "/Broken", "foobar", "alice").with_accepted(true),
            )
            .await
            .unwrap();

        let mounted = f.manager.setup_mounts(&alice).await.unwrap();
        assert_eq!(mounted, 1);

        let added = f.registry.added.lock().unwrap().clone();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].mount_point.as_str(), "/SharedFolder");
        assert_eq!(added[0].token, "t2");
    }

    #[tokio::test]
    async fn test_test_remote_probes_share_endpoint() {
        let status = RemoteStatus {
            reachable: true,
            installed: true,
            version: Some("8.1.0".to_string()),
        };
        let f = fixture_with(RecordingRegistry::default(), Some(status.clone()));
        let share = f.manager.add_share(offer("t1", "alice")).await.unwrap();

        let probed = f.manager.test_remote(&user("alice"), share.id()).await.unwrap();
        assert_eq!(probed, status);
        assert_eq!(f.transport.probed.lock().unwrap().as_slice(), ["localhost"]);
    }

    #[tokio::test]
    async fn test_test_remote_maps_transport_errors() {
        let f = fixture();
        let share = f.manager.add_share(offer("t1", "alice")).await.unwrap();

        let err = f
            .manager
            .test_remote(&user("alice"), share.id())
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::Remote(_)));
    }

    #[tokio::test]
    async fn test_store_failures_propagate() {
        let manager = ShareManager::new(
            Arc::new(FailingRepo),
            Arc::new(RecordingRegistry::default()),
            Arc::new(StubTransport::answering(None)),
        );

        let err = manager.add_share(offer("t1", "alice")).await.unwrap_err();
        assert!(matches!(err, ShareError::Store(_)));

        let err = manager.decline_share(&user("alice"), ShareId::new(1)).await.unwrap_err();
        assert!(matches!(err, ShareError::Store(_)));

        let err = manager.remove_user_shares(&user("alice")).await.unwrap_err();
        assert!(matches!(err, ShareError::Store(_)));
    }
}
