mod common;

use cinelog::config::SecurityConfig;
use cinelog::db::Store;
use cinelog::domain::MovieId;
use cinelog::domain::validation::validate_nickname;
use cinelog::models::MovieFilter;
use cinelog::services::bootstrap::reconcile_admin;
use cinelog::services::nickname::ensure_nickname;
use cinelog::services::{AuthError, AuthService, Registration, SeaOrmAuthService};
use sea_orm::ConnectionTrait;
use std::sync::Arc;

fn cheap_security() -> SecurityConfig {
    SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    }
}

async fn insert_orphans(store: &Store, count: usize) {
    for i in 0..count {
        store
            .conn
            .execute_unprepared(&format!(
                "INSERT INTO movies (title, genre, rating, comment, watched, favorite, created_at, updated_at) \
                 VALUES ('Orphan {i}', '', 0, '', 0, 0, '2024-01-01T00:00:00.000Z', '2024-01-01T00:00:00.000Z')"
            ))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_nickname_suffixes_until_free() {
    let store = common::migrated_store().await;

    common::create_account(&store, "taken@one.com", Some("foo")).await;
    let first = common::create_account(&store, "foo@bar.com", None).await;
    let first = ensure_nickname(&store, first).await.unwrap();
    assert_eq!(first.nickname.as_deref(), Some("foo_1"));

    let second = common::create_account(&store, "foo@baz.com", None).await;
    let second = ensure_nickname(&store, second).await.unwrap();
    assert_eq!(second.nickname.as_deref(), Some("foo_2"));

    let stored = store.get_account(second.id).await.unwrap().unwrap();
    assert_eq!(stored.nickname.as_deref(), Some("foo_2"));
}

#[tokio::test]
async fn test_existing_nickname_is_kept() {
    let store = common::migrated_store().await;

    let account = common::create_account(&store, "ann@example.com", Some("annie")).await;
    let account = ensure_nickname(&store, account).await.unwrap();

    assert_eq!(account.nickname.as_deref(), Some("annie"));
}

#[tokio::test]
async fn test_unusable_local_part_falls_back_to_user() {
    let store = common::migrated_store().await;

    let account = common::create_account(&store, "+++@example.com", None).await;
    let account = ensure_nickname(&store, account).await.unwrap();

    assert_eq!(account.nickname.as_deref(), Some("user"));
}

#[tokio::test]
async fn test_first_account_becomes_admin_and_adopts_orphans() {
    let store = common::migrated_store().await;

    insert_orphans(&store, 5).await;
    let a = common::create_user_id(&store, "a@example.com").await;
    let b = common::create_user_id(&store, "b@example.com").await;
    let c = common::create_user_id(&store, "c@example.com").await;

    let outcome = reconcile_admin(&store).await.unwrap();
    assert_eq!(outcome.promoted, Some(a));
    assert_eq!(outcome.movies_adopted, 5);

    assert!(store.get_account(a).await.unwrap().unwrap().is_admin);
    assert!(!store.get_account(b).await.unwrap().unwrap().is_admin);
    assert!(!store.get_account(c).await.unwrap().unwrap().is_admin);

    let owned = store.list_movies(a, &MovieFilter::default()).await.unwrap();
    assert_eq!(owned.len(), 5);
    assert!(
        store
            .list_movies(b, &MovieFilter::default())
            .await
            .unwrap()
            .is_empty()
    );

    let again = reconcile_admin(&store).await.unwrap();
    assert_eq!(again.promoted, None);
    assert_eq!(again.movies_adopted, 0);
}

#[tokio::test]
async fn test_reconcile_without_accounts_is_a_no_op() {
    let store = common::migrated_store().await;
    insert_orphans(&store, 2).await;

    let outcome = reconcile_admin(&store).await.unwrap();

    assert_eq!(outcome.promoted, None);
    assert_eq!(outcome.movies_adopted, 0);
}

#[tokio::test]
async fn test_register_then_login() {
    let store = common::migrated_store().await;
    let auth = SeaOrmAuthService::new(store.clone(), cheap_security());

    let account = auth
        .register(Registration {
            email: "  Viewer@Example.com ".to_string(),
            password: "correct horse".to_string(),
            nickname: None,
        })
        .await
        .unwrap();

    assert_eq!(account.email, "viewer@example.com");
    assert!(account.is_admin, "first account is promoted on registration");

    let logged_in = auth
        .login("viewer@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(logged_in.id, account.id);
    assert_eq!(logged_in.nickname.as_deref(), Some("viewer"));

    let wrong = auth.login("viewer@example.com", "wrong password").await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

    let unknown = auth.login("nobody@example.com", "correct horse").await;
    assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_fields() {
    let store = common::migrated_store().await;
    let auth = SeaOrmAuthService::new(store.clone(), cheap_security());

    auth.register(Registration {
        email: "dup@example.com".to_string(),
        password: "long enough".to_string(),
        nickname: Some("dupe".to_string()),
    })
    .await
    .unwrap();

    let same_email = auth
        .register(Registration {
            email: "DUP@example.com".to_string(),
            password: "long enough".to_string(),
            nickname: None,
        })
        .await;
    assert!(matches!(
        same_email,
        Err(AuthError::Conflict { field: "email" })
    ));

    let same_nickname = auth
        .register(Registration {
            email: "other@example.com".to_string(),
            password: "long enough".to_string(),
            nickname: Some("dupe".to_string()),
        })
        .await;
    assert!(matches!(
        same_nickname,
        Err(AuthError::Conflict { field: "nickname" })
    ));

    let Err(AuthError::Validation(errors)) = auth
        .register(Registration {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            nickname: Some("x".to_string()),
        })
        .await
    else {
        panic!("expected validation errors");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["email", "password", "nickname"]);
}

#[tokio::test]
async fn test_second_registration_does_not_take_admin() {
    let store = common::migrated_store().await;
    let auth = SeaOrmAuthService::new(Arc::clone(&store), cheap_security());

    let first = auth
        .register(Registration {
            email: "first@example.com".to_string(),
            password: "long enough".to_string(),
            nickname: None,
        })
        .await
        .unwrap();
    let second = auth
        .register(Registration {
            email: "second@example.com".to_string(),
            password: "long enough".to_string(),
            nickname: None,
        })
        .await
        .unwrap();

    assert!(first.is_admin);
    assert!(!second.is_admin);
    assert!(store.get_movie(second.id, MovieId::new(1)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_short_local_part_gets_registrable_nickname() {
    let store = common::migrated_store().await;

    let first = common::create_account(&store, "jo@example.com", None).await;
    let first = ensure_nickname(&store, first).await.unwrap();
    assert_eq!(first.nickname.as_deref(), Some("user"));

    let second = common::create_account(&store, "al@example.com", None).await;
    let second = ensure_nickname(&store, second).await.unwrap();
    assert_eq!(second.nickname.as_deref(), Some("user_1"));

    for nickname in [first.nickname, second.nickname].into_iter().flatten() {
        assert!(validate_nickname(&nickname).is_ok(), "{nickname}");
    }
}
