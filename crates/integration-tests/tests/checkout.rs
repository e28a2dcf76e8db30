//! Integration tests for checkout.
//!
//! Each test drives a real storefront page against a mock backend and checks
//! both what the user was told and what reached the order endpoint.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use bookstore_core::{OrderId, ProductId};
use bookstore_integration_tests::{TestContext, book_a, can_bind_localhost, catalog_json};
use bookstore_storefront::models::SessionState;
use bookstore_storefront::notify::{Notice, Recorder};
use bookstore_storefront::services::checkout::{
    EMPTY_CART_MESSAGE, LOGIN_REQUIRED_MESSAGE, ORDER_FAILED_MESSAGE,
    SESSION_CHECK_FAILED_MESSAGE,
};
use bookstore_storefront::services::{CheckoutDetails, CheckoutOutcome};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_orders(ctx: &TestContext, response: ResponseTemplate, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(response)
        .expect(expected)
        .mount(&ctx.server)
        .await;
}

async fn order_bodies(ctx: &TestContext) -> Vec<Value> {
    ctx.server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/api/orders")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_empty_cart_sends_nothing() {
    if !can_bind_localhost() {
        return;
    }
    let ctx = TestContext::new().await;
    // Only the page-load session check may reach the backend.
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"logged_in": false})))
        .expect(1)
        .mount(&ctx.server)
        .await;
    mount_orders(&ctx, ResponseTemplate::new(200), 0).await;

    let recorder = Arc::new(Recorder::new(true));
    let mut page = ctx.open(recorder.clone()).await;

    let outcome = page.checkout(&CheckoutDetails::default()).await;

    assert_eq!(outcome, CheckoutOutcome::EmptyCart);
    assert_eq!(recorder.alerts(), vec![EMPTY_CART_MESSAGE.to_string()]);
}

#[tokio::test]
async fn test_anonymous_user_is_sent_to_login() {
    if !can_bind_localhost() {
        return;
    }
    let ctx = TestContext::new().await;
    ctx.mount_anonymous().await;
    mount_orders(&ctx, ResponseTemplate::new(200), 0).await;

    let recorder = Arc::new(Recorder::new(true));
    let mut page = ctx.open(recorder.clone()).await;
    page.add_to_cart(&book_a()).unwrap();

    let outcome = page.checkout(&CheckoutDetails::default()).await;

    assert_eq!(outcome, CheckoutOutcome::NotLoggedIn);
    assert_eq!(recorder.alerts(), vec![LOGIN_REQUIRED_MESSAGE.to_string()]);
    assert_eq!(page.session(), &SessionState::Anonymous);
    assert_eq!(page.cart().badge_count(), 1);
}

#[tokio::test]
async fn test_session_check_failure_is_reported() {
    if !can_bind_localhost() {
        return;
    }
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&ctx.server)
        .await;
    mount_orders(&ctx, ResponseTemplate::new(200), 0).await;

    let recorder = Arc::new(Recorder::new(true));
    let mut page = ctx.open(recorder.clone()).await;
    assert_eq!(page.session(), &SessionState::Unknown);
    page.add_to_cart(&book_a()).unwrap();

    let outcome = page.checkout(&CheckoutDetails::default()).await;

    assert_eq!(outcome, CheckoutOutcome::SessionCheckFailed);
    assert_eq!(
        recorder.alerts(),
        vec![SESSION_CHECK_FAILED_MESSAGE.to_string()]
    );
}

#[tokio::test]
async fn test_declined_confirmation_places_nothing() {
    if !can_bind_localhost() {
        return;
    }
    let ctx = TestContext::new().await;
    ctx.mount_signed_in("Anna", false).await;
    mount_orders(&ctx, ResponseTemplate::new(200), 0).await;

    let recorder = Arc::new(Recorder::new(false));
    let mut page = ctx.open(recorder.clone()).await;
    page.add_to_cart(&book_a()).unwrap();
    page.add_to_cart(&book_a()).unwrap();

    let outcome = page.checkout(&CheckoutDetails::default()).await;

    assert_eq!(outcome, CheckoutOutcome::Declined);
    assert_eq!(
        recorder.notices(),
        vec![Notice::Confirm("Confirm order for 20.00 руб.?".to_string())]
    );
    assert_eq!(page.cart().badge_count(), 2);
}

#[tokio::test]
async fn test_successful_order_clears_cart() {
    if !can_bind_localhost() {
        return;
    }
    let ctx = TestContext::new().await;
    ctx.mount_signed_in("Anna", false).await;
    mount_orders(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "order_id": 42,
            "message": "Order created"
        })),
        1,
    )
    .await;

    let recorder = Arc::new(Recorder::new(true));
    let mut page = ctx.open(recorder.clone()).await;
    page.add_to_cart(&book_a()).unwrap();
    page.add_to_cart(&book_a()).unwrap();

    let details = CheckoutDetails {
        customer_phone: Some("+7 900 000-00-00".to_string()),
        shipping_address: Some("Moscow, Tverskaya 1".to_string()),
        ..CheckoutDetails::default()
    };
    let outcome = page.checkout(&details).await;

    let CheckoutOutcome::Placed(receipt) = outcome else {
        panic!("expected a placed order, got {outcome:?}");
    };
    assert_eq!(receipt.order_id, OrderId::new(42));
    assert_eq!(receipt.total, Decimal::new(20, 0));
    assert_eq!(receipt.item_count, 2);
    assert!(recorder.alerts().iter().any(|a| a.contains("42")));
    assert!(page.render_receipt(&receipt).unwrap().contains("Order #42"));
    assert!(page.cart().is_empty());

    let bodies = order_bodies(&ctx).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["total_amount"], json!(20.0));
    assert_eq!(bodies[0]["items"][0]["id"], json!(1));
    assert_eq!(bodies[0]["items"][0]["quantity"], json!(2));
    assert_eq!(bodies[0]["customer_phone"], json!("+7 900 000-00-00"));
    assert!(bodies[0].get("customer_name").is_none());

    // A fresh page load sees the cleared cart.
    let reloaded = ctx.open(Arc::new(Recorder::new(true))).await;
    assert!(reloaded.cart().is_empty());
}

#[tokio::test]
async fn test_rejected_order_keeps_cart() {
    if !can_bind_localhost() {
        return;
    }
    let ctx = TestContext::new().await;
    ctx.mount_signed_in("Anna", false).await;
    mount_orders(
        &ctx,
        ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "Insufficient stock for Book A"
        })),
        1,
    )
    .await;

    let recorder = Arc::new(Recorder::new(true));
    let mut page = ctx.open(recorder.clone()).await;
    page.add_to_cart(&book_a()).unwrap();

    let outcome = page.checkout(&CheckoutDetails::default()).await;

    assert_eq!(
        outcome,
        CheckoutOutcome::Rejected("Insufficient stock for Book A".to_string())
    );
    assert_eq!(
        recorder.alerts(),
        vec![format!("{ORDER_FAILED_MESSAGE}: Insufficient stock for Book A")]
    );

    let reloaded = ctx.open(Arc::new(Recorder::new(true))).await;
    assert_eq!(
        reloaded.cart().get(ProductId::new(1)).map(|i| i.quantity),
        Some(1)
    );
}

#[tokio::test]
async fn test_transport_failure_keeps_cart() {
    if !can_bind_localhost() {
        return;
    }
    let ctx = TestContext::new().await;
    ctx.mount_signed_in("Anna", false).await;
    mount_orders(
        &ctx,
        ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"),
        1,
    )
    .await;

    let recorder = Arc::new(Recorder::new(true));
    let mut page = ctx.open(recorder.clone()).await;
    page.add_to_cart(&book_a()).unwrap();

    let outcome = page.checkout(&CheckoutDetails::default()).await;

    assert_eq!(outcome, CheckoutOutcome::Failed);
    assert_eq!(recorder.alerts(), vec![ORDER_FAILED_MESSAGE.to_string()]);
    assert_eq!(page.cart().badge_count(), 1);
}

#[tokio::test]
async fn test_success_without_order_id_is_a_failure() {
    if !can_bind_localhost() {
        return;
    }
    let ctx = TestContext::new().await;
    ctx.mount_signed_in("Anna", false).await;
    ctx.mount_products(catalog_json()).await;
    mount_orders(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({"success": true})),
        1,
    )
    .await;

    let recorder = Arc::new(Recorder::new(true));
    let mut page = ctx.open(recorder.clone()).await;
    page.load_catalog().await;
    page.add_to_cart_from_catalog(ProductId::new(2)).unwrap();

    let outcome = page.checkout(&CheckoutDetails::default()).await;

    assert_eq!(outcome, CheckoutOutcome::Failed);
    assert_eq!(page.cart().badge_count(), 1);
}
