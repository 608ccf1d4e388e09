//! Order totals derived from the cart.

use rust_decimal::Decimal;
use sams_goods_core::{CurrencyCode, Price};
use serde::Serialize;

/// Flat-rate shipping with a free-shipping threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Subtotals at or above this ship free.
    pub free_threshold: Decimal,
    /// Charged below the threshold.
    pub flat_rate: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_threshold: Decimal::new(50, 0),
            flat_rate: Decimal::new(599, 2),
        }
    }
}

impl ShippingPolicy {
    /// Shipping charged on `subtotal`. Nothing to ship costs nothing.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal.is_zero() || subtotal >= self.free_threshold {
            Decimal::ZERO
        } else {
            self.flat_rate
        }
    }

    /// How much more must be spent to ship free, if anything.
    #[must_use]
    pub fn remaining_for_free_shipping(&self, subtotal: Decimal) -> Option<Decimal> {
        (subtotal < self.free_threshold).then(|| self.free_threshold - subtotal)
    }
}

/// Totals shown on the cart and checkout pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub item_count: u64,
}

impl OrderSummary {
    #[must_use]
    pub fn new(subtotal: Decimal, item_count: u64, policy: &ShippingPolicy) -> Self {
        let shipping = policy.shipping_for(subtotal);
        Self {
            subtotal,
            shipping,
            total: subtotal.saturating_add(shipping),
            item_count,
        }
    }

    #[must_use]
    pub fn ships_free(&self) -> bool {
        self.shipping.is_zero()
    }

    /// Shipping line as displayed: `Free` or a price.
    #[must_use]
    pub fn shipping_label(&self, currency: CurrencyCode) -> String {
        if self.ships_free() {
            "Free".to_string()
        } else {
            Price::new(self.shipping, currency).display()
        }
    }
}
