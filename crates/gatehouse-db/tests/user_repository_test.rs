//! Integration tests for the User repository using in-memory SurrealDB.

use gatehouse_core::GateError;
use gatehouse_core::models::role::Role;
use gatehouse_core::models::user::CreateUser;
use gatehouse_core::repository::UserRepository;
use gatehouse_db::repository::SurrealUserRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

/// Helper: spin up an in-memory DB and run migrations.
async fn setup() -> SurrealUserRepository<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    gatehouse_db::run_migrations(&db).await.unwrap();
    SurrealUserRepository::new(db)
}

fn input(username: &str, email: &str) -> CreateUser {
    CreateUser {
        username: username.into(),
        email: email.into(),
        // The repository stores whatever digest it is handed.
        password_hash: format!("$argon2id$fake-digest-for-{username}"),
    }
}

#[tokio::test]
async fn first_user_is_admin_later_users_are_not() {
    let repo = setup().await;

    let alice = repo.create(input("alice", "alice@example.com")).await.unwrap();
    assert_eq!(alice.role, Role::Admin);
    assert!(!alice.confirmed);
    assert!(!alice.banned);
    assert!(alice.refresh_fingerprint.is_none());

    let bob = repo.create(input("bob", "bob@example.com")).await.unwrap();
    assert_eq!(bob.role, Role::User);
}

#[tokio::test]
async fn lookups_by_username_and_email() {
    let repo = setup().await;
    let created = repo.create(input("alice", "alice@example.com")).await.unwrap();

    let by_name = repo.get_by_username("alice").await.unwrap();
    assert_eq!(by_name.id, created.id);

    let by_email = repo.get_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email.id, created.id);

    assert!(matches!(
        repo.get_by_username("ghost").await.unwrap_err(),
        GateError::NotFound { .. }
    ));
    assert!(matches!(
        repo.get_by_email("ghost@example.com").await.unwrap_err(),
        GateError::NotFound { .. }
    ));
}

#[tokio::test]
async fn duplicates_are_rejected() {
    let repo = setup().await;
    repo.create(input("alice", "alice@example.com")).await.unwrap();

    assert!(matches!(
        repo.create(input("alice", "fresh@example.com"))
            .await
            .unwrap_err(),
        GateError::AlreadyExists { .. }
    ));
    assert!(matches!(
        repo.create(input("fresh", "alice@example.com"))
            .await
            .unwrap_err(),
        GateError::AlreadyExists { .. }
    ));
}

#[tokio::test]
async fn confirm_email_is_sticky() {
    let repo = setup().await;
    repo.create(input("alice", "alice@example.com")).await.unwrap();

    let confirmed = repo.confirm_email("alice@example.com").await.unwrap();
    assert!(confirmed.confirmed);

    // Idempotent.
    let again = repo.confirm_email("alice@example.com").await.unwrap();
    assert!(again.confirmed);
}

#[tokio::test]
async fn update_email_resets_confirmation() {
    let repo = setup().await;
    let user = repo.create(input("alice", "alice@example.com")).await.unwrap();
    repo.confirm_email("alice@example.com").await.unwrap();

    let updated = repo.update_email(user.id, "new@example.com").await.unwrap();
    assert_eq!(updated.email, "new@example.com");
    assert!(!updated.confirmed);

    // The old address no longer resolves.
    assert!(matches!(
        repo.get_by_email("alice@example.com").await.unwrap_err(),
        GateError::NotFound { .. }
    ));
}

#[tokio::test]
async fn update_password_replaces_the_digest() {
    let repo = setup().await;
    let user = repo.create(input("alice", "alice@example.com")).await.unwrap();

    let updated = repo
        .update_password(user.id, "$argon2id$another-digest")
        .await
        .unwrap();
    assert_eq!(updated.password_hash, "$argon2id$another-digest");
    assert_ne!(updated.password_hash, user.password_hash);
}

#[tokio::test]
async fn fingerprint_store_and_swap() {
    let repo = setup().await;
    let user = repo.create(input("alice", "alice@example.com")).await.unwrap();

    repo.store_refresh_fingerprint(user.id, Some("fp-1".into()))
        .await
        .unwrap();
    assert_eq!(
        repo.get_by_username("alice")
            .await
            .unwrap()
            .refresh_fingerprint
            .as_deref(),
        Some("fp-1")
    );

    // CAS succeeds when the expected value matches.
    assert!(
        repo.swap_refresh_fingerprint(user.id, "fp-1", "fp-2")
            .await
            .unwrap()
    );
    assert_eq!(
        repo.get_by_username("alice")
            .await
            .unwrap()
            .refresh_fingerprint
            .as_deref(),
        Some("fp-2")
    );

    // A stale expected value loses the race and changes nothing.
    assert!(
        !repo
            .swap_refresh_fingerprint(user.id, "fp-1", "fp-3")
            .await
            .unwrap()
    );
    assert_eq!(
        repo.get_by_username("alice")
            .await
            .unwrap()
            .refresh_fingerprint
            .as_deref(),
        Some("fp-2")
    );

    // Clearing removes the credential entirely.
    repo.store_refresh_fingerprint(user.id, None).await.unwrap();
    assert!(
        repo.get_by_username("alice")
            .await
            .unwrap()
            .refresh_fingerprint
            .is_none()
    );

    // With nothing stored, no expected value can match.
    assert!(
        !repo
            .swap_refresh_fingerprint(user.id, "fp-2", "fp-4")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn toggle_ban_flips_both_ways() {
    let repo = setup().await;
    repo.create(input("alice", "alice@example.com")).await.unwrap();

    let banned = repo.toggle_ban("alice").await.unwrap();
    assert!(banned.banned);

    let unbanned = repo.toggle_ban("alice").await.unwrap();
    assert!(!unbanned.banned);

    assert!(matches!(
        repo.toggle_ban("ghost").await.unwrap_err(),
        GateError::NotFound { .. }
    ));
}
