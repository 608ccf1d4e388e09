//! Integration tests for the checkout flow.
//!
//! Browse the built-in catalog, fill the persisted cart, and place orders
//! with each payment method.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use sams_goods_core::{CustomerDetails, PaymentMethod};
use sams_goods_integration_tests::{TestContext, customer};
use sams_goods_storefront::catalog::Selection;
use sams_goods_storefront::checkout::{CheckoutError, OrderConfirmation};
use sams_goods_storefront::payment::{CardDetails, PaymentDetails, PaymentError};
use sams_goods_storefront::state::AppState;

fn card(number: &str) -> PaymentDetails {
    PaymentDetails::Card(CardDetails::new(number, "12/29", "123", "Sam Goods"))
}

/// One black tee in M: 22.99 plus 5.99 shipping.
fn add_tee(state: &AppState) {
    let selection = Selection {
        size: Some("M".to_string()),
        color: Some("Black".to_string()),
        ..Selection::default()
    };
    let (item, options) = state.catalog().cart_entry("SAMO_001", &selection).unwrap();
    state
        .open_cart()
        .unwrap()
        .add_item(&item, 1, options)
        .unwrap();
}

fn add_basic_license(state: &AppState) {
    let (item, options) = state
        .catalog()
        .cart_entry("blood-season", &Selection::default())
        .unwrap();
    state
        .open_cart()
        .unwrap()
        .add_item(&item, 1, options)
        .unwrap();
}

async fn place(
    state: &AppState,
    customer: &CustomerDetails,
    payment: PaymentDetails,
) -> Result<OrderConfirmation, CheckoutError> {
    let mut cart = state.open_cart().unwrap();
    state
        .checkout()
        .place_order(&mut cart, customer, payment)
        .await
}

// ============================================================================
// Successful Orders
// ============================================================================

#[tokio::test]
async fn test_card_order_ships_free_over_threshold() {
    let ctx = TestContext::new();
    add_tee(&ctx.state);
    add_basic_license(&ctx.state);

    let order = place(&ctx.state, &customer(), card("4242 4242 4242 4242"))
        .await
        .unwrap();

    assert!(order.order_number.as_str().starts_with("ORD-"));
    assert_eq!(order.order_number.as_str().len(), 12);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.summary.subtotal, Decimal::new(5298, 2));
    assert_eq!(order.summary.shipping, Decimal::ZERO);
    assert_eq!(order.summary.total, Decimal::new(5298, 2));
    assert_eq!(order.customer.email.as_str(), "sam@example.com");

    let payment = &order.payment;
    assert_eq!(payment.method, PaymentMethod::CreditCard);
    assert_eq!(payment.amount, order.summary.total);
    assert_eq!(payment.last4.as_deref(), Some("4242"));
    assert!(payment.payment_id.as_str().starts_with("mock_card_payment_"));

    assert!(ctx.reopen().open_cart().unwrap().is_empty());
    assert_eq!(std::fs::read_to_string(ctx.cart_file()).unwrap(), "[]");
}

#[tokio::test]
async fn test_paypal_order_opens_and_captures() {
    let ctx = TestContext::new();
    add_tee(&ctx.state);

    let order = place(&ctx.state, &customer(), PaymentDetails::PayPal { order_id: None })
        .await
        .unwrap();

    assert_eq!(order.summary.total, Decimal::new(2898, 2));
    let capture = order.payment.paypal.as_ref().unwrap();
    assert!(capture.order_id.starts_with("mock_order_"));
    assert!(capture.capture_id.starts_with("mock_capture_"));
    assert!(order.payment.last4.is_none());
    assert!(ctx.reopen().open_cart().unwrap().is_empty());
}

#[tokio::test]
async fn test_crypto_order_quotes_coin_amount() {
    let ctx = TestContext::new();
    add_tee(&ctx.state);

    let order = place(
        &ctx.state,
        &customer(),
        PaymentDetails::Crypto {
            coin: "eth".to_string(),
        },
    )
    .await
    .unwrap();

    let quote = order.payment.crypto.as_ref().unwrap();
    assert_eq!(quote.amount.to_string(), "0.01449000");
    assert_eq!(quote.fiat_amount, Decimal::new(2898, 2));
    assert_eq!(quote.expires_in, 3600);
    assert_eq!(order.payment.payment_id, quote.payment_id);
    assert!(order.payment.payment_id.as_str().starts_with("mock_crypto_payment_"));
}

// ============================================================================
// Refused Orders
// ============================================================================

#[tokio::test]
async fn test_empty_cart_is_refused() {
    let ctx = TestContext::new();
    let err = place(&ctx.state, &customer(), card("4242424242424242"))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
}

#[tokio::test]
async fn test_invalid_customer_keeps_cart() {
    let ctx = TestContext::new();
    add_tee(&ctx.state);
    let customer = CustomerDetails {
        email: "not-an-email".to_string(),
        zip_code: "303".to_string(),
        ..customer()
    };

    let err = place(&ctx.state, &customer, card("4242424242424242"))
        .await
        .unwrap_err();

    let e = match err {
        CheckoutError::Customer(e) => e,
        other => panic!("expected customer error, got {other:?}"),
    };
    let fields: Vec<&str> = e.fields.iter().map(|f| f.field).collect();
    assert_eq!(fields, ["email", "zipCode"]);
    assert_eq!(ctx.reopen().open_cart().unwrap().len(), 1);
}

#[tokio::test]
async fn test_declined_card_keeps_cart() {
    let ctx = TestContext::new();
    add_tee(&ctx.state);

    let err = place(&ctx.state, &customer(), card("4242"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Payment(PaymentError::InvalidCard(_))
    ));
    assert_eq!(ctx.reopen().open_cart().unwrap().item_count(), 1);
}

#[tokio::test]
async fn test_unsupported_coin_keeps_cart() {
    let ctx = TestContext::new();
    add_tee(&ctx.state);

    let err = place(
        &ctx.state,
        &customer(),
        PaymentDetails::Crypto {
            coin: "SHIB".to_string(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Payment(PaymentError::UnsupportedCoin(_))
    ));
    assert_eq!(ctx.reopen().open_cart().unwrap().len(), 1);
}
