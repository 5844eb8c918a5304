//! SQLite implementation of IShareRepository
//!
//! This module provides the concrete SQLite-based implementation of the
//! share repository port defined in fedshare-core.
//!
//! ## Type Mapping
//!
//! | Domain Type  | Column        | SQL Type | Strategy                          |
//! |--------------|---------------|----------|-----------------------------------|
//! | ShareId      | `id`          | INTEGER  | rowid via `last_insert_rowid()`   |
//! | ShareToken   | `share_token` | TEXT     | `.as_str()` / `ShareToken::new()` |
//! | ShareName    | `name`        | TEXT     | `.as_str()` / `ShareName::new()`  |
//! | UserId       | `user`        | TEXT     | `.as_str()` / `UserId::new()`     |
//! | MountPoint   | `mountpoint`  | TEXT     | `.as_str()` / `MountPoint::new()` |
//! | bool         | `accepted`    | INTEGER  | 0 / 1                             |

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use fedshare_core::domain::{
    newtypes::{MountPoint, ShareId, ShareName, ShareToken, UserId},
    NewShareRecord, ShareRecord,
};
use fedshare_core::ports::{IShareRepository, ShareFilter};

use crate::CacheError;

const SELECT_COLUMNS: &str = "SELECT id, remote, share_token, password, name, owner, user, \
                              mountpoint, accepted FROM share_external";

/// SQLite-based implementation of the share repository port
pub struct SqliteShareRepository {
    pool: SqlitePool,
}

impl SqliteShareRepository {
    /// Creates a new repository instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Reconstruct a ShareRecord from a `share_external` row
///
/// Stored values are re-validated, so a row edited out of band surfaces as
/// `CacheError::InvalidRow` instead of an invalid domain value.
fn share_from_row(row: &SqliteRow) -> Result<ShareRecord, CacheError> {
    let id: i64 = row.try_get("id")?;
    let remote: String = row.try_get("remote")?;
    let share_token: String = row.try_get("share_token")?;
    let password: String = row.try_get("password")?;
    let name: String = row.try_get("name")?;
    let owner: String = row.try_get("owner")?;
    let user: String = row.try_get("user")?;
    let mount_point: String = row.try_get("mountpoint")?;
    let accepted: i64 = row.try_get("accepted")?;

    let data = NewShareRecord {
        remote,
        share_token: ShareToken::new(share_token)?,
        password,
        name: ShareName::new(name)?,
        owner,
        user: UserId::new(user)?,
        mount_point: MountPoint::new(mount_point)?,
        accepted: accepted != 0,
    };

    Ok(ShareRecord::with_id(ShareId::new(id), data))
}

#[async_trait::async_trait]
impl IShareRepository for SqliteShareRepository {
    async fn insert(&self, record: &NewShareRecord) -> anyhow::Result<ShareId> {
        let result = sqlx::query(
            "INSERT INTO share_external \
             (remote, share_token, password, name, owner, user, mountpoint, accepted) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.remote)
        .bind(record.share_token.as_str())
        .bind(&record.password)
        .bind(record.name.as_str())
        .bind(&record.owner)
        .bind(record.user.as_str())
        .bind(record.mount_point.as_str())
        .bind(i64::from(record.accepted))
        .execute(&self.pool)
        .await?;

        let id = ShareId::new(result.last_insert_rowid());
        tracing::trace!(share_id = %id, user = %record.user, "Inserted share row");
        Ok(id)
    }

    async fn get(&self, id: ShareId) -> anyhow::Result<Option<ShareRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(share_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn query(&self, filter: &ShareFilter) -> anyhow::Result<Vec<ShareRecord>> {
        let mut sql = format!("{SELECT_COLUMNS} WHERE 1=1");
        let mut binds: Vec<&str> = Vec::new();

        if let Some(ref user) = filter.user {
            sql.push_str(" AND user = ?");
            binds.push(user.as_str());
        }

        if let Some(accepted) = filter.accepted {
            sql.push_str(if accepted {
                " AND accepted = 1"
            } else {
                " AND accepted = 0"
            });
        }

        if let Some(ref mount_point) = filter.mount_point {
            sql.push_str(" AND mountpoint = ?");
            binds.push(mount_point.as_str());
        }

        sql.push_str(" ORDER BY id ASC");

        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = query.bind(bind);
        }

        let rows = query.fetch_all(&self.pool).await?;

        let mut shares = Vec::with_capacity(rows.len());
        for row in &rows {
            shares.push(share_from_row(row)?);
        }

        Ok(shares)
    }

    async fn update_accepted(
        &self,
        id: ShareId,
        user: &UserId,
        accepted: bool,
        mount_point: &MountPoint,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE share_external SET accepted = ?, mountpoint = ? WHERE id = ? AND user = ?",
        )
        .bind(i64::from(accepted))
        .bind(mount_point.as_str())
        .bind(id.get())
        .bind(user.as_str())
        .execute(&self.pool)
        .await?;

        let updated = result.rows_affected() > 0;
        tracing::trace!(share_id = %id, user = %user, accepted, updated, "Updated share row");
        Ok(updated)
    }

    async fn delete_by_id(&self, id: ShareId, user: &UserId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM share_external WHERE id = ? AND user = ?")
            .bind(id.get())
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        tracing::trace!(share_id = %id, user = %user, deleted, "Deleted share row");
        Ok(deleted)
    }

    async fn delete_by_user(&self, user: &UserId) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM share_external WHERE user = ?")
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected();
        tracing::trace!(user = %user, deleted, "Deleted share rows of user");
        Ok(deleted)
    }
}
