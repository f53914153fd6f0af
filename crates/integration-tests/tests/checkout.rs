//! Cart checkout and order status changes against the fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use layercraft_core::{OrderId, OrderStatus};
use layercraft_integration_tests::{FakeBackend, collections};
use layercraft_storefront::{AppError, Store, Storefront};
use rust_decimal::Decimal;
use serde_json::{Value, json};

const PASSWORD: &str = "correct-horse";

/// A logged-in store with two products loaded.
async fn shopper(backend: &FakeBackend) -> Store {
    backend.insert_document(
        collections::PRODUCTS,
        json!({ "name": "Geometric Vase", "category": "Decor", "price": 20 }),
    );
    backend.insert_document(
        collections::PRODUCTS,
        json!({ "name": "Articulated Dragon", "category": "Toys", "price": 12.5 }),
    );

    let mut store = Store::new(Storefront::new(backend.config()).unwrap());
    store.register("ada@example.com", PASSWORD, "Ada").await.unwrap();
    store.load_products().await.unwrap();
    store
}

fn fill_cart(store: &mut Store) {
    let vase = store.products()[0].clone();
    let dragon = store.products()[1].clone();
    store.add_to_cart(vase.clone());
    store.add_to_cart(dragon);
    store.add_to_cart(vase);
}

#[tokio::test]
async fn test_checkout_stores_order_and_clears_cart() {
    let backend = FakeBackend::start().await;
    let mut store = shopper(&backend).await;
    fill_cart(&mut store);

    let summary = store.cart_summary();
    assert_eq!(summary.subtotal.amount, Decimal::new(525, 1));
    assert_eq!(summary.tax.amount, Decimal::new(420, 2));
    assert_eq!(summary.shipping.amount, Decimal::ZERO);
    assert_eq!(summary.total.display(), "$56.70");

    let order = store.checkout("  1 Analytical Way, London  ").await.unwrap();
    assert!(store.cart().is_empty());
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.shipping_address, "1 Analytical Way, London");
    assert_eq!(order.total_amount.amount, Decimal::new(567, 1));
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.items[0].line_total().amount, Decimal::new(40, 0));

    let stored = backend.documents(collections::ORDERS);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["userId"], store.user().unwrap().id.as_str());
    assert_eq!(stored[0]["status"], "pending");
    assert!(stored[0]["orderDate"].is_string());

    // Lines are stored as JSON-encoded strings.
    let first: Value = serde_json::from_str(stored[0]["items"][0].as_str().unwrap()).unwrap();
    assert_eq!(first["quantity"], 2);
    assert_eq!(first["price"], 20.0);
    assert_eq!(first["productId"], store.products()[0].id.as_str());
}

#[tokio::test]
async fn test_failed_checkout_keeps_cart() {
    let backend = FakeBackend::start().await;
    let mut store = shopper(&backend).await;
    fill_cart(&mut store);

    backend.fail_writes(collections::ORDERS);
    let err = store.checkout("1 Analytical Way").await.unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(store.cart().total_items(), 3);

    backend.restore_writes(collections::ORDERS);
    store.checkout("1 Analytical Way").await.unwrap();
    assert!(store.cart().is_empty());
}

#[tokio::test]
async fn test_checkout_validation() {
    let backend = FakeBackend::start().await;
    let mut store = shopper(&backend).await;

    let err = store.checkout("1 Analytical Way").await.unwrap_err();
    assert_eq!(err.user_message(), "Your cart is empty");

    fill_cart(&mut store);
    let err = store.checkout("   ").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m == "Shipping address is required"));
    assert_eq!(store.cart().total_items(), 3);
    assert!(backend.documents(collections::ORDERS).is_empty());
}

#[tokio::test]
async fn test_order_history_newest_first() {
    let backend = FakeBackend::start().await;
    let mut store = shopper(&backend).await;

    let vase = store.products()[0].clone();
    store.add_to_cart(vase);
    let first = store.checkout("1 Analytical Way").await.unwrap();
    let dragon = store.products()[1].clone();
    store.add_to_cart(dragon);
    let second = store.checkout("1 Analytical Way").await.unwrap();

    let user_id = store.user().unwrap().id.clone();
    let history = store.storefront().orders().orders_for_user(&user_id).await.unwrap();
    let ids: Vec<&OrderId> = history.iter().map(|o| &o.id).collect();
    assert_eq!(ids, [&second.id, &first.id]);
}

#[tokio::test]
async fn test_order_status_accepts_any_change() {
    let backend = FakeBackend::start().await;
    let mut store = shopper(&backend).await;
    let vase = store.products()[0].clone();
    store.add_to_cart(vase);
    let order = store.checkout("1 Analytical Way").await.unwrap();
    let orders = store.storefront().orders();

    let delivered = orders
        .update_status(&order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    // An admin can correct a mistake by moving the order back.
    let reopened = orders
        .update_status(&order.id, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(reopened.status, OrderStatus::Processing);
    assert_eq!(backend.documents(collections::ORDERS)[0]["status"], "processing");
    assert_eq!(
        backend.request_count("GET", &format!("{}/{}", FakeBackend::documents_path(collections::ORDERS), order.id)),
        0
    );

    let err = orders
        .update_status(&OrderId::new("missing"), OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
