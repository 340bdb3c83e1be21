use std::sync::Arc;

use common::crypto::{DescriptorError, KeyDescriptor};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::database::models::SharedSecret;
use crate::database::Database;

/// Source of "now" for every store decision
///
/// The store reads the clock exactly once per operation and threads that
/// instant through validation and queries, so a single request can never
/// straddle an expiry boundary. Production uses [`SystemClock`]; tests
/// substitute their own to step time manually.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// How long shared secrets may live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    /// Applied when a request names no expiry
    pub default_ttl: Duration,
    /// Hard ceiling; requests beyond it are rejected outright
    pub max_ttl: Duration,
}

impl TtlPolicy {
    pub const DEFAULT_TTL: Duration = Duration::minutes(15);
    pub const MAX_TTL: Duration = Duration::minutes(90);
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            default_ttl: Self::DEFAULT_TTL,
            max_ttl: Self::MAX_TTL,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("requested expiry is more than {0} minutes in the future")]
    ExpiryTooFar(i64),
    #[error("invalid key descriptor: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("shared secret not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The server-side lifecycle of sealed secrets
///
/// Accepts ciphertext and key descriptors, never plaintext or nonces.
/// Expiry is enforced at read time: a record at or past its `expires_at` is
/// indistinguishable from one that never existed, whether or not the sweep
/// has removed the row yet. Within its lifetime a record may be read any
/// number of times; revocation before expiry is the owner's delete.
#[derive(Clone)]
pub struct SecretStore {
    database: Database,
    policy: TtlPolicy,
    clock: Arc<dyn Clock>,
}

impl SecretStore {
    pub fn new(database: Database, policy: TtlPolicy) -> Self {
        Self::with_clock(database, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(database: Database, policy: TtlPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            database,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &TtlPolicy {
        &self.policy
    }

    /// Store a sealed secret
    ///
    /// A missing `requested_expires_at` gets the default TTL. A requested
    /// expiry past `now + max_ttl` fails validation before anything is
    /// written; it is not clamped. An expiry exactly at the ceiling is
    /// allowed.
    pub async fn create(
        &self,
        owner_id: Uuid,
        descriptor: KeyDescriptor,
        ciphertext: String,
        requested_expires_at: Option<OffsetDateTime>,
    ) -> Result<SharedSecret, StoreError> {
        descriptor.validate()?;

        let now = self.clock.now();
        let ceiling = now + self.policy.max_ttl;
        let expires_at = requested_expires_at.unwrap_or(now + self.policy.default_ttl);
        if expires_at > ceiling {
            return Err(StoreError::ExpiryTooFar(self.policy.max_ttl.whole_minutes()));
        }

        let record =
            SharedSecret::create(owner_id, &descriptor, &ciphertext, expires_at, &self.database)
                .await?;
        Ok(record)
    }

    /// Fetch a live record by id
    ///
    /// Expired and nonexistent are the same [`StoreError::NotFound`]; the
    /// caller cannot tell which it was.
    pub async fn get_by_id(&self, id: Uuid) -> Result<SharedSecret, StoreError> {
        let now = self.clock.now();
        SharedSecret::get_live(id, now, &self.database)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// List an owner's live records, newest first
    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<SharedSecret>, StoreError> {
        let now = self.clock.now();
        let records = SharedSecret::list_live_for_owner(owner_id, now, &self.database).await?;
        Ok(records)
    }

    /// Delete one of the owner's records, expired or not
    ///
    /// Returns whether a row was actually removed. Deleting someone else's
    /// record reports `false` just like deleting a missing one.
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let deleted = SharedSecret::delete_for_owner(id, owner_id, &self.database).await?;
        Ok(deleted)
    }

    /// Physically remove every record past its expiry
    ///
    /// Pure hygiene; correctness never depends on this running, since every
    /// read path filters on expiry itself.
    pub async fn sweep(&self) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let removed = SharedSecret::delete_expired(now, &self.database).await?;
        Ok(removed)
    }
}
