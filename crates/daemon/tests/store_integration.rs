//! Integration tests for the shared secret store
//!
//! These run against an in-memory sqlite database with a manually stepped
//! clock, so expiry behavior is exercised without sleeping through real TTLs.

use std::sync::{Arc, Mutex};

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use common::crypto::{KeyDescriptor, SecretKey};
use sealbox_daemon::{Clock, Database, SecretStore, StoreError, TtlPolicy};

/// A clock the tests wind forward by hand
struct ManualClock(Mutex<OffsetDateTime>);

impl ManualClock {
    fn new(start: OffsetDateTime) -> Arc<Self> {
        Arc::new(Self(Mutex::new(start)))
    }

    fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.0.lock().unwrap()
    }
}

/// Create an in-memory test database
async fn setup_test_db() -> Database {
    let db_url = url::Url::parse("sqlite::memory:").unwrap();
    Database::connect(&db_url).await.unwrap()
}

async fn setup_store() -> (SecretStore, Arc<ManualClock>, Database) {
    let db = setup_test_db().await;
    let clock = ManualClock::new(OffsetDateTime::now_utc());
    let store = SecretStore::with_clock(db.clone(), TtlPolicy::default(), clock.clone());
    (store, clock, db)
}

fn descriptor() -> KeyDescriptor {
    KeyDescriptor::from_key(&SecretKey::generate())
}

/// Raw row count, unfiltered by expiry
async fn row_count(db: &Database) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM shared_secrets")
        .fetch_one(&**db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_and_fetch_round_trip() {
    let (store, clock, _db) = setup_store().await;
    let owner = Uuid::new_v4();
    let expires_at = clock.now() + Duration::minutes(30);

    let created = store
        .create(
            owner,
            descriptor(),
            "c2VhbGVk".to_string(),
            Some(expires_at),
        )
        .await
        .unwrap();
    assert_eq!(*created.owner_id, owner);

    let fetched = store.get_by_id(*created.id).await.unwrap();
    assert_eq!(*fetched.id, *created.id);
    assert_eq!(fetched.ciphertext, "c2VhbGVk");
    assert_eq!(fetched.key_descriptor.0, created.key_descriptor.0);
}

#[tokio::test]
async fn test_missing_expiry_gets_the_default_ttl() {
    let (store, clock, _db) = setup_store().await;
    let now = clock.now();

    let created = store
        .create(Uuid::new_v4(), descriptor(), "c2VhbGVk".to_string(), None)
        .await
        .unwrap();

    // Timestamps go through text storage, so allow a second of slack.
    let target = now + TtlPolicy::DEFAULT_TTL;
    assert!(created.expires_at >= target - Duration::seconds(1));
    assert!(created.expires_at <= target + Duration::seconds(1));
}

#[tokio::test]
async fn test_expiry_past_the_ceiling_is_rejected() {
    let (store, clock, db) = setup_store().await;
    let too_far = clock.now() + Duration::minutes(120);

    let result = store
        .create(
            Uuid::new_v4(),
            descriptor(),
            "c2VhbGVk".to_string(),
            Some(too_far),
        )
        .await;

    assert!(matches!(result, Err(StoreError::ExpiryTooFar(90))));
    // Rejected outright, not clamped.
    assert_eq!(row_count(&db).await, 0);
}

#[tokio::test]
async fn test_expiry_exactly_at_the_ceiling_is_allowed() {
    let (store, clock, _db) = setup_store().await;
    let at_ceiling = clock.now() + TtlPolicy::MAX_TTL;

    let created = store
        .create(
            Uuid::new_v4(),
            descriptor(),
            "c2VhbGVk".to_string(),
            Some(at_ceiling),
        )
        .await
        .unwrap();

    assert!(store.get_by_id(*created.id).await.is_ok());
}

#[tokio::test]
async fn test_expired_reads_like_missing() {
    let (store, clock, db) = setup_store().await;
    let owner = Uuid::new_v4();
    let expires_at = clock.now() + Duration::minutes(10);

    let created = store
        .create(owner, descriptor(), "c2VhbGVk".to_string(), Some(expires_at))
        .await
        .unwrap();

    clock.advance(Duration::minutes(11));

    assert!(matches!(
        store.get_by_id(*created.id).await,
        Err(StoreError::NotFound)
    ));
    assert!(store.list_for_owner(owner).await.unwrap().is_empty());

    // The row is still physically there until the sweep runs; reads just
    // refuse to see it.
    assert_eq!(row_count(&db).await, 1);
}

#[tokio::test]
async fn test_expiry_boundary_is_exclusive() {
    let (store, clock, _db) = setup_store().await;
    let expires_at = clock.now() + Duration::minutes(10);

    let created = store
        .create(
            Uuid::new_v4(),
            descriptor(),
            "c2VhbGVk".to_string(),
            Some(expires_at),
        )
        .await
        .unwrap();

    // At exactly expires_at the record is already gone.
    clock.advance(Duration::minutes(10));
    assert!(matches!(
        store.get_by_id(*created.id).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn test_delete_works_after_expiry() {
    let (store, clock, db) = setup_store().await;
    let owner = Uuid::new_v4();
    let expires_at = clock.now() + Duration::minutes(5);

    let created = store
        .create(owner, descriptor(), "c2VhbGVk".to_string(), Some(expires_at))
        .await
        .unwrap();

    clock.advance(Duration::minutes(10));

    // Reads cannot see the lapsed row but the owner can still remove it.
    let deleted = store.delete(owner, *created.id).await.unwrap();
    assert!(deleted);
    assert_eq!(row_count(&db).await, 0);
}

#[tokio::test]
async fn test_delete_is_owner_scoped() {
    let (store, _clock, _db) = setup_store().await;
    let owner = Uuid::new_v4();

    let created = store
        .create(owner, descriptor(), "c2VhbGVk".to_string(), None)
        .await
        .unwrap();

    // A different owner deleting reports false, same as a missing id.
    let deleted = store.delete(Uuid::new_v4(), *created.id).await.unwrap();
    assert!(!deleted);
    assert!(store.get_by_id(*created.id).await.is_ok());

    let deleted = store.delete(owner, *created.id).await.unwrap();
    assert!(deleted);

    // Deleting again reports false.
    let deleted_again = store.delete(owner, *created.id).await.unwrap();
    assert!(!deleted_again);
}

#[tokio::test]
async fn test_list_is_owner_scoped() {
    let (store, _clock, _db) = setup_store().await;
    let owner_a = Uuid::new_v4();
    let owner_b = Uuid::new_v4();

    for _ in 0..2 {
        store
            .create(owner_a, descriptor(), "c2VhbGVk".to_string(), None)
            .await
            .unwrap();
    }
    store
        .create(owner_b, descriptor(), "c2VhbGVk".to_string(), None)
        .await
        .unwrap();

    let listed_a = store.list_for_owner(owner_a).await.unwrap();
    assert_eq!(listed_a.len(), 2);
    for record in &listed_a {
        assert_eq!(*record.owner_id, owner_a);
    }

    let listed_b = store.list_for_owner(owner_b).await.unwrap();
    assert_eq!(listed_b.len(), 1);
    assert_eq!(*listed_b[0].owner_id, owner_b);
}

#[tokio::test]
async fn test_sweep_removes_only_lapsed_rows() {
    let (store, clock, db) = setup_store().await;
    let owner = Uuid::new_v4();

    let short = store
        .create(
            owner,
            descriptor(),
            "c2VhbGVk".to_string(),
            Some(clock.now() + Duration::minutes(5)),
        )
        .await
        .unwrap();
    let long = store
        .create(
            owner,
            descriptor(),
            "c2VhbGVk".to_string(),
            Some(clock.now() + Duration::minutes(60)),
        )
        .await
        .unwrap();

    clock.advance(Duration::minutes(10));

    let removed = store.sweep().await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(row_count(&db).await, 1);

    assert!(matches!(
        store.get_by_id(*short.id).await,
        Err(StoreError::NotFound)
    ));
    assert!(store.get_by_id(*long.id).await.is_ok());

    // Nothing left to sweep.
    assert_eq!(store.sweep().await.unwrap(), 0);
}
