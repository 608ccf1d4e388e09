//! Simulated `PayPal` orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sams_goods_core::CurrencyCode;
use serde::Serialize;
use tracing::debug;

use super::random_token;

/// An order opened with `PayPal` for the buyer to approve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPalOrder {
    pub order_id: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

/// Funds captured for an approved order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPalCapture {
    pub capture_id: String,
    pub order_id: String,
    pub captured_at: DateTime<Utc>,
}

/// Open an order for `amount`.
#[must_use]
pub fn create_order(amount: Decimal, currency: CurrencyCode) -> PayPalOrder {
    let order = PayPalOrder {
        order_id: format!("mock_order_{}", random_token(11)),
        amount,
        currency,
    };
    debug!(order_id = %order.order_id, %amount, "PayPal order created");
    order
}

/// Capture an approved order.
#[must_use]
pub fn capture(order_id: &str) -> PayPalCapture {
    PayPalCapture {
        capture_id: format!("mock_capture_{}", random_token(11)),
        order_id: order_id.to_string(),
        captured_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order() {
        let order = create_order(Decimal::new(2898, 2), CurrencyCode::USD);
        assert!(order.order_id.starts_with("mock_order_"));
        assert_eq!(order.order_id.len(), "mock_order_".len() + 11);
        assert_eq!(order.amount, Decimal::new(2898, 2));
    }

    #[test]
    fn test_capture_keeps_order_id() {
        let order = create_order(Decimal::ONE, CurrencyCode::USD);
        let capture = capture(&order.order_id);
        assert_eq!(capture.order_id, order.order_id);
        assert!(capture.capture_id.starts_with("mock_capture_"));
    }

    #[test]
    fn test_order_ids_differ() {
        let a = create_order(Decimal::ONE, CurrencyCode::USD);
        let b = create_order(Decimal::ONE, CurrencyCode::USD);
        assert_ne!(a.order_id, b.order_id);
    }
}
