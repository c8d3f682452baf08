//! Integration tests for the revocation store using in-memory SurrealDB.

use chrono::{Duration, Utc};
use gatehouse_core::repository::RevocationStore;
use gatehouse_db::repository::SurrealRevocationStore;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

async fn setup() -> SurrealRevocationStore<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    gatehouse_db::run_migrations(&db).await.unwrap();
    SurrealRevocationStore::new(db)
}

#[tokio::test]
async fn revoked_until_expiry() {
    let store = setup().await;

    store
        .revoke("fp-live", Utc::now() + Duration::minutes(15))
        .await
        .unwrap();

    assert!(store.is_revoked("fp-live").await.unwrap());
    assert!(!store.is_revoked("fp-unknown").await.unwrap());
}

#[tokio::test]
async fn revoke_is_idempotent() {
    let store = setup().await;
    let expires = Utc::now() + Duration::minutes(15);

    store.revoke("fp", expires).await.unwrap();
    store.revoke("fp", expires).await.unwrap();

    assert!(store.is_revoked("fp").await.unwrap());
}

#[tokio::test]
async fn expired_entries_are_inert() {
    let store = setup().await;

    store
        .revoke("fp-old", Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    // The token itself is already rejected on expiry, so the entry
    // must not report as revoked.
    assert!(!store.is_revoked("fp-old").await.unwrap());
}

#[tokio::test]
async fn purge_drops_only_expired_entries() {
    let store = setup().await;

    store
        .revoke("fp-old", Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    store
        .revoke("fp-live", Utc::now() + Duration::minutes(15))
        .await
        .unwrap();

    assert_eq!(store.purge_expired().await.unwrap(), 1);
    assert!(store.is_revoked("fp-live").await.unwrap());

    // Nothing left to purge.
    assert_eq!(store.purge_expired().await.unwrap(), 0);
}
