//! Sign-up, login, logout and role resolution against the fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use layercraft_core::UserRole;
use layercraft_integration_tests::{FakeBackend, collections};
use layercraft_storefront::services::AuthError;
use layercraft_storefront::{AppError, Store, Storefront};

const PASSWORD: &str = "correct-horse";

async fn store(backend: &FakeBackend) -> Store {
    Store::new(Storefront::new(backend.config()).unwrap())
}

#[tokio::test]
async fn test_register_creates_account_session_and_profile() {
    let backend = FakeBackend::start().await;
    let mut store = store(&backend).await;

    let user = store
        .register("ada@example.com", PASSWORD, "Ada Lovelace")
        .await
        .unwrap();
    assert_eq!(user.name, "Ada Lovelace");
    assert_eq!(user.role, UserRole::User);
    let user_id = user.id.clone();

    let profiles = backend.documents(collections::USERS);
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["userId"], user_id.as_str());
    assert_eq!(profiles[0]["role"], "user");
    assert!(
        profiles[0]["avatar"]
            .as_str()
            .unwrap()
            .contains("/avatars/initials?name=Ada+Lovelace")
    );

    // The session cookie is shared by every service on the handle.
    let current = store.storefront().auth().current_user().await.unwrap();
    assert_eq!(current.id, user_id);
}

#[tokio::test]
async fn test_register_blank_name_uses_email_local_part() {
    let backend = FakeBackend::start().await;
    let mut store = store(&backend).await;

    let user = store.register("grace@example.com", PASSWORD, "  ").await.unwrap();
    assert_eq!(user.name, "grace");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let backend = FakeBackend::start().await;
    let mut first = store(&backend).await;
    first.register("ada@example.com", PASSWORD, "Ada").await.unwrap();

    let mut second = store(&backend).await;
    let err = second
        .register("ada@example.com", PASSWORD, "Ada again")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::UserAlreadyExists)));
    assert_eq!(err.user_message(), "An account with this email already exists");
    assert!(second.user().is_none());
}

#[tokio::test]
async fn test_register_rejects_weak_password_before_calling_backend() {
    let backend = FakeBackend::start().await;
    let mut store = store(&backend).await;

    let err = store.register("ada@example.com", "short", "Ada").await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::WeakPassword(_))));
    assert_eq!(backend.request_count("POST", "/v1/account"), 0);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let backend = FakeBackend::start().await;
    store(&backend)
        .await
        .register("ada@example.com", PASSWORD, "Ada")
        .await
        .unwrap();

    let mut store = store(&backend).await;
    let err = store.login("ada@example.com", "wrong-password").await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::InvalidCredentials)));
    assert!(store.user().is_none());
}

#[tokio::test]
async fn test_login_logout_and_restore() {
    let backend = FakeBackend::start().await;
    store(&backend)
        .await
        .register("ada@example.com", PASSWORD, "Ada")
        .await
        .unwrap();

    let mut store = store(&backend).await;
    assert!(store.restore_session().await.is_none());

    let user = store.login("ada@example.com", PASSWORD).await.unwrap();
    assert_eq!(user.name, "Ada");
    assert!(store.restore_session().await.is_some());

    store.logout().await.unwrap();
    assert!(store.user().is_none());
    assert!(store.restore_session().await.is_none());
}

#[tokio::test]
async fn test_logout_without_session_still_clears_user() {
    let backend = FakeBackend::start().await;
    let mut store = store(&backend).await;
    store.register("ada@example.com", PASSWORD, "Ada").await.unwrap();
    store.storefront().auth().log_out().await.unwrap();

    let err = store.logout().await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::NotLoggedIn)));
    assert!(store.user().is_none());
}

#[tokio::test]
async fn test_admin_email_is_promoted() {
    let backend = FakeBackend::start().await;
    let config = backend
        .config_with(&[("STOREFRONT_ADMIN_EMAILS", "Boss@Example.com")])
        .unwrap();
    let mut store = Store::new(Storefront::new(config).unwrap());

    let user = store.register("boss@example.com", PASSWORD, "Boss").await.unwrap();
    assert_eq!(user.role, UserRole::Admin);
}

#[tokio::test]
async fn test_profile_role_is_used() {
    let backend = FakeBackend::start().await;
    store(&backend)
        .await
        .register("ada@example.com", PASSWORD, "Ada")
        .await
        .unwrap();
    assert!(backend.set_role("ada@example.com", "admin"));

    let mut store = store(&backend).await;
    let user = store.login("ada@example.com", PASSWORD).await.unwrap();
    assert!(user.is_admin());
}

#[tokio::test]
async fn test_profile_lookup_for_unknown_user() {
    let backend = FakeBackend::start().await;
    let storefront = Storefront::new(backend.config()).unwrap();

    let err = storefront
        .auth()
        .profile_by_user_id(&layercraft_core::UserId::new("nobody"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn test_unreadable_profile_falls_back_to_user_role() {
    let backend = FakeBackend::start().await;
    store(&backend)
        .await
        .register("ada@example.com", PASSWORD, "Ada")
        .await
        .unwrap();
    assert!(backend.set_role("ada@example.com", "superuser"));

    let mut store = store(&backend).await;
    let user = store.login("ada@example.com", PASSWORD).await.unwrap();
    assert_eq!(user.role, UserRole::User);
    assert_eq!(user.name, "Ada");
    assert!(store.restore_session().await.is_some());
}
