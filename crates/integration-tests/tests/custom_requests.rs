//! Custom request submission and review against the fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use layercraft_core::{Email, ProductId, RequestStatus};
use layercraft_integration_tests::{FakeBackend, collections};
use layercraft_storefront::models::NewCustomRequest;
use layercraft_storefront::{AppError, Store, Storefront};

const PASSWORD: &str = "correct-horse";
const ADMIN: &str = "maker@layercraft.example";

fn storefront(backend: &FakeBackend) -> Storefront {
    let config = backend
        .config_with(&[("STOREFRONT_ADMIN_EMAILS", ADMIN)])
        .unwrap();
    Storefront::new(config).unwrap()
}

async fn customer(backend: &FakeBackend, email: &str) -> Store {
    let mut store = Store::new(storefront(backend));
    store.register(email, PASSWORD, "").await.unwrap();
    store
}

async fn admin(backend: &FakeBackend) -> Store {
    let mut store = Store::new(storefront(backend));
    store.register(ADMIN, PASSWORD, "Maker").await.unwrap();
    store
}

fn request_from(store: &Store, message: &str) -> NewCustomRequest {
    let user = store.user().unwrap();
    NewCustomRequest {
        user_id: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        product_id: Some(ProductId::new("dragon")),
        message: message.to_string(),
    }
}

#[tokio::test]
async fn test_submit_replaces_provisional_entry() {
    let backend = FakeBackend::start().await;
    let mut store = customer(&backend, "ada@example.com").await;

    let stored = store
        .submit_custom_request(request_from(&store, "  A dragon with longer wings  "))
        .await
        .unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);
    assert_eq!(stored.message, "A dragon with longer wings");

    assert_eq!(store.custom_requests().len(), 1);
    assert_eq!(store.custom_requests()[0].id, stored.id);

    let docs = backend.documents(collections::REQUESTS);
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["$id"], stored.id.as_str());
    assert_eq!(docs[0]["status"], "pending");
    assert_eq!(docs[0]["productId"], "dragon");
    assert!(docs[0]["requestDate"].is_string());
}

#[tokio::test]
async fn test_failed_submit_rolls_back() {
    let backend = FakeBackend::start().await;
    let mut store = customer(&backend, "ada@example.com").await;
    backend.fail_writes(collections::REQUESTS);

    let err = store
        .submit_custom_request(request_from(&store, "A dragon"))
        .await
        .unwrap_err();
    assert!(err.is_server_error());
    assert!(store.custom_requests().is_empty());
}

#[tokio::test]
async fn test_invalid_submit_rolls_back() {
    let backend = FakeBackend::start().await;
    let mut store = customer(&backend, "ada@example.com").await;

    let err = store
        .submit_custom_request(request_from(&store, "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(store.custom_requests().is_empty());
    assert!(backend.documents(collections::REQUESTS).is_empty());
}

#[tokio::test]
async fn test_customers_see_only_their_requests() {
    let backend = FakeBackend::start().await;

    let mut ada = customer(&backend, "ada@example.com").await;
    ada.submit_custom_request(request_from(&ada, "A dragon"))
        .await
        .unwrap();
    let mut grace = customer(&backend, "grace@example.com").await;
    grace
        .submit_custom_request(request_from(&grace, "A planter"))
        .await
        .unwrap();

    let mut fresh = Store::new(storefront(&backend));
    fresh.login("ada@example.com", PASSWORD).await.unwrap();
    let mine = fresh.load_custom_requests().await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].message, "A dragon");
    assert_eq!(mine[0].email, Email::parse("ada@example.com").unwrap());

    let mut admin = admin(&backend).await;
    assert_eq!(admin.load_custom_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_load_requests_requires_login() {
    let backend = FakeBackend::start().await;
    let mut store = Store::new(storefront(&backend));

    let err = store.load_custom_requests().await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn test_admin_updates_status() {
    let backend = FakeBackend::start().await;
    let mut ada = customer(&backend, "ada@example.com").await;
    let request = ada
        .submit_custom_request(request_from(&ada, "A dragon"))
        .await
        .unwrap();

    let err = ada
        .set_request_status(&request.id, RequestStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let mut admin = admin(&backend).await;
    admin.load_custom_requests().await.unwrap();

    let updated = admin
        .set_request_status(&request.id, RequestStatus::Reviewed)
        .await
        .unwrap();
    assert_eq!(updated.status, RequestStatus::Reviewed);
    assert_eq!(admin.custom_requests()[0].status, RequestStatus::Reviewed);
    assert_eq!(backend.documents(collections::REQUESTS)[0]["status"], "reviewed");

    let approved = admin
        .set_request_status(&request.id, RequestStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);

    // Decisions can be revised.
    let rejected = admin
        .set_request_status(&request.id, RequestStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(admin.custom_requests()[0].status, RequestStatus::Rejected);
    assert_eq!(backend.documents(collections::REQUESTS)[0]["status"], "rejected");
}

#[tokio::test]
async fn test_failed_status_update_rolls_back() {
    let backend = FakeBackend::start().await;
    let mut ada = customer(&backend, "ada@example.com").await;
    let request = ada
        .submit_custom_request(request_from(&ada, "A dragon"))
        .await
        .unwrap();

    let mut admin = admin(&backend).await;
    admin.load_custom_requests().await.unwrap();
    backend.fail_writes(collections::REQUESTS);

    admin
        .set_request_status(&request.id, RequestStatus::Approved)
        .await
        .unwrap_err();
    assert_eq!(admin.custom_requests()[0].status, RequestStatus::Pending);
    assert_eq!(backend.documents(collections::REQUESTS)[0]["status"], "pending");
}

#[tokio::test]
async fn test_provisional_entry_visible_before_commit() {
    let backend = FakeBackend::start().await;
    let mut store = customer(&backend, "ada@example.com").await;

    let provisional = store.begin_custom_request(request_from(&store, "A dragon"));
    let local_id = provisional.id().clone();
    assert_eq!(store.custom_requests().len(), 1);
    assert_eq!(store.custom_requests()[0].id, local_id);
    assert!(backend.documents(collections::REQUESTS).is_empty());

    let stored = store.commit_custom_request(provisional).await.unwrap();
    assert_ne!(stored.id, local_id);
    assert_eq!(store.custom_requests().len(), 1);
    assert_eq!(store.custom_requests()[0].id, stored.id);
}

#[tokio::test]
async fn test_status_change_visible_before_commit_and_rolled_back() {
    let backend = FakeBackend::start().await;
    let mut ada = customer(&backend, "ada@example.com").await;
    let request = ada
        .submit_custom_request(request_from(&ada, "A dragon"))
        .await
        .unwrap();

    let mut admin = admin(&backend).await;
    admin.load_custom_requests().await.unwrap();

    let change = admin
        .begin_request_status(&request.id, RequestStatus::Approved)
        .unwrap();
    assert_eq!(admin.custom_requests()[0].status, RequestStatus::Approved);
    assert_eq!(backend.documents(collections::REQUESTS)[0]["status"], "pending");

    backend.fail_writes(collections::REQUESTS);
    admin.commit_request_status(change).await.unwrap_err();
    assert_eq!(admin.custom_requests()[0].status, RequestStatus::Pending);
}
