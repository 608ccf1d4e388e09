//! Order placement.
//!
//! Checkout turns the cart into an order: it validates the customer, charges
//! the order total through the [`PaymentGateway`], and empties the cart. The
//! cart is left untouched unless the payment went through.

use chrono::{DateTime, Utc};
use sams_goods_core::{ContactError, CustomerDetails, OrderNumber, VerifiedCustomer};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::cart::{CartStorage, CartStore, LineItem, OrderSummary, ShippingPolicy};
use crate::payment::{PaymentDetails, PaymentError, PaymentGateway, PaymentReceipt, random_token};

/// Errors that stop an order from being placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("your cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Customer(#[from] ContactError),

    #[error("payment failed: {0}")]
    Payment(#[from] PaymentError),
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_number: OrderNumber,
    pub customer: VerifiedCustomer,
    pub items: Vec<LineItem>,
    pub summary: OrderSummary,
    pub payment: PaymentReceipt,
    pub placed_at: DateTime<Utc>,
}

/// Generate an order number: `ORD-` and 8 uppercase base-36 characters.
#[must_use]
pub fn generate_order_number() -> OrderNumber {
    OrderNumber::new(format!("ORD-{}", random_token(8).to_uppercase()))
}

/// Places orders against a cart.
#[derive(Debug, Clone, Default)]
pub struct Checkout {
    gateway: PaymentGateway,
    shipping: ShippingPolicy,
}

impl Checkout {
    #[must_use]
    pub const fn new(gateway: PaymentGateway, shipping: ShippingPolicy) -> Self {
        Self { gateway, shipping }
    }

    #[must_use]
    pub const fn gateway(&self) -> &PaymentGateway {
        &self.gateway
    }

    #[must_use]
    pub const fn shipping(&self) -> &ShippingPolicy {
        &self.shipping
    }

    /// Charge the cart total and place the order.
    ///
    /// On success the cart is cleared. If clearing cannot be persisted the
    /// order still stands; the failure is logged.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty cart,
    /// [`CheckoutError::Customer`] listing every invalid field, or
    /// [`CheckoutError::Payment`] if the payment is refused. The cart is
    /// unchanged in every error case.
    #[instrument(skip_all, fields(method = %payment.method()))]
    pub async fn place_order<S: CartStorage>(
        &self,
        cart: &mut CartStore<S>,
        customer: &CustomerDetails,
        payment: PaymentDetails,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let customer = customer.validate()?;
        let summary = cart.summary(&self.shipping);

        info!(
            total = %summary.total,
            items = summary.item_count,
            "Processing order"
        );
        let receipt = self.gateway.process(&payment, summary.total).await?;

        let confirmation = OrderConfirmation {
            order_number: generate_order_number(),
            customer,
            items: cart.items().to_vec(),
            summary,
            payment: receipt,
            placed_at: Utc::now(),
        };

        if let Err(e) = cart.clear() {
            error!(
                order_number = %confirmation.order_number,
                error = %e,
                "Order placed but cart could not be cleared"
            );
        }

        info!(order_number = %confirmation.order_number, "Order placed");
        Ok(confirmation)
    }
}
