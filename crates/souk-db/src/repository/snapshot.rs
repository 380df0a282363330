//! # Snapshot Repository
//!
//! Reads and writes the whole [`StoreState`] under a named slot.
//!
//! The payload is the store serialized as JSON. Each row also records the
//! payload schema version it was written with, so a build that meets a
//! payload from a newer build refuses it instead of misreading it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use souk_core::StoreState;

/// Layout version of the JSON payload written by this build.
pub const SNAPSHOT_SCHEMA_VERSION: i64 = 1;

/// Repository for the `store_slots` table.
///
/// ## Usage
/// ```rust,ignore
/// let snapshots = db.snapshots();
/// snapshots.save("pos-store", store.state()).await?;
/// let restored = snapshots.load("pos-store").await?;
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
}

impl SnapshotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SnapshotRepository { pool }
    }

    /// Writes `state` to `slot`, replacing whatever was there.
    pub async fn save(&self, slot: &str, state: &StoreState) -> DbResult<()> {
        let payload = serde_json::to_string(state)?;
        let now = Utc::now().to_rfc3339();

        debug!(slot = %slot, bytes = payload.len(), "Saving snapshot");

        sqlx::query(
            r#"
            INSERT INTO store_slots (name, payload, schema_version, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                payload = excluded.payload,
                schema_version = excluded.schema_version,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(slot)
        .bind(&payload)
        .bind(SNAPSHOT_SCHEMA_VERSION)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reads `slot` back.
    ///
    /// ## Returns
    /// - `Ok(None)` when nothing was ever saved under `slot`
    /// - `Err(DbError::CorruptSnapshot)` when the row exists but was written
    ///   by a newer build or does not decode
    pub async fn load(&self, slot: &str) -> DbResult<Option<StoreState>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT payload, schema_version FROM store_slots WHERE name = ?")
                .bind(slot)
                .fetch_optional(&self.pool)
                .await?;

        let Some((payload, version)) = row else {
            debug!(slot = %slot, "No snapshot stored");
            return Ok(None);
        };

        if version > SNAPSHOT_SCHEMA_VERSION {
            return Err(DbError::corrupt(
                slot,
                format!("schema version {version} is newer than {SNAPSHOT_SCHEMA_VERSION}"),
            ));
        }

        let state = serde_json::from_str(&payload)
            .map_err(|e| DbError::corrupt(slot, e.to_string()))?;

        debug!(slot = %slot, version, "Snapshot loaded");
        Ok(Some(state))
    }

    pub async fn exists(&self, slot: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store_slots WHERE name = ?")
            .bind(slot)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// All slot names, sorted.
    pub async fn slot_names(&self) -> DbResult<Vec<String>> {
        let names = sqlx::query_scalar("SELECT name FROM store_slots ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(names)
    }

    /// Removes `slot`. Returns false when it did not exist.
    pub async fn delete(&self, slot: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM store_slots WHERE name = ?")
            .bind(slot)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
