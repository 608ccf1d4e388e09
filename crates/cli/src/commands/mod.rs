//! Command implementations.
//!
//! Every command renders to a caller-supplied writer so output can be
//! captured in tests.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod crypto;

use rust_decimal::Decimal;
use sams_goods_core::{CurrencyCode, Price};

/// Format an amount for display.
fn money(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).display()
}
