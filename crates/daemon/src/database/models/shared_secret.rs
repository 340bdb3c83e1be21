use common::crypto::KeyDescriptor;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::database::types::DUuid;
use crate::database::Database;

/// A sealed secret as stored by the server
///
/// The row holds the ciphertext and the exportable key descriptor, never the
/// nonce, so nothing in this table decrypts anything. Rows are immutable
/// after insert; the only write operations are delete and the expiry sweep.
///
/// All liveness filters compare through SQLite's `datetime()` so that the
/// RFC 3339 timestamps bound from Rust and the `YYYY-MM-DD HH:MM:SS` strings
/// written by `CURRENT_TIMESTAMP` order correctly against each other. `now`
/// is always passed in by the caller; the database never consults its own
/// clock for liveness.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SharedSecret {
    pub id: DUuid,
    pub owner_id: DUuid,
    pub key_descriptor: Json<KeyDescriptor>,
    pub ciphertext: String,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl SharedSecret {
    /// Insert a sealed secret and return the stored row
    pub async fn create(
        owner_id: Uuid,
        key_descriptor: &KeyDescriptor,
        ciphertext: &str,
        expires_at: OffsetDateTime,
        db: &Database,
    ) -> Result<SharedSecret, sqlx::Error> {
        let id = DUuid::new();
        let owner_id = DUuid::from(owner_id);

        sqlx::query(
            r#"
            INSERT INTO shared_secrets (
                id, owner_id, key_descriptor, ciphertext, expires_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(Json(key_descriptor.clone()))
        .bind(ciphertext)
        .bind(expires_at)
        .execute(&**db)
        .await?;

        Self::get(*id, db).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Get a row by id regardless of expiry
    ///
    /// This is the raw accessor; anything serving reads must go through
    /// [`SharedSecret::get_live`] instead.
    pub async fn get(id: Uuid, db: &Database) -> Result<Option<SharedSecret>, sqlx::Error> {
        let id = DUuid::from(id);
        sqlx::query_as::<_, SharedSecret>(
            r#"
            SELECT
                id, owner_id, key_descriptor, ciphertext,
                expires_at, created_at, updated_at
            FROM shared_secrets
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&**db)
        .await
    }

    /// Get a row by id, treating anything at or past its expiry as absent
    pub async fn get_live(
        id: Uuid,
        now: OffsetDateTime,
        db: &Database,
    ) -> Result<Option<SharedSecret>, sqlx::Error> {
        let id = DUuid::from(id);
        sqlx::query_as::<_, SharedSecret>(
            r#"
            SELECT
                id, owner_id, key_descriptor, ciphertext,
                expires_at, created_at, updated_at
            FROM shared_secrets
            WHERE id = ?1 AND datetime(expires_at) > datetime(?2)
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&**db)
        .await
    }

    /// List an owner's live rows, newest first
    pub async fn list_live_for_owner(
        owner_id: Uuid,
        now: OffsetDateTime,
        db: &Database,
    ) -> Result<Vec<SharedSecret>, sqlx::Error> {
        let owner_id = DUuid::from(owner_id);
        sqlx::query_as::<_, SharedSecret>(
            r#"
            SELECT
                id, owner_id, key_descriptor, ciphertext,
                expires_at, created_at, updated_at
            FROM shared_secrets
            WHERE owner_id = ?1 AND datetime(expires_at) > datetime(?2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(now)
        .fetch_all(&**db)
        .await
    }

    /// Delete one of an owner's rows, live or expired
    ///
    /// Deliberately not expiry-filtered: an owner may clean up a secret that
    /// already lapsed but has not been swept yet.
    pub async fn delete_for_owner(
        id: Uuid,
        owner_id: Uuid,
        db: &Database,
    ) -> Result<bool, sqlx::Error> {
        let id = DUuid::from(id);
        let owner_id = DUuid::from(owner_id);
        let result = sqlx::query("DELETE FROM shared_secrets WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(owner_id)
            .execute(&**db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every row at or past its expiry, returning how many went
    pub async fn delete_expired(now: OffsetDateTime, db: &Database) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM shared_secrets WHERE datetime(expires_at) <= datetime(?1)",
        )
        .bind(now)
        .execute(&**db)
        .await?;

        Ok(result.rows_affected())
    }
}
