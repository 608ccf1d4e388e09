//! Crypto payment commands.
//!
//! # Usage
//!
//! ```bash
//! sg crypto currencies
//! sg crypto status mock_crypto_payment_k2j4h5g6f7d
//! ```

use std::io::Write;

use sams_goods_core::PaymentId;
use sams_goods_storefront::error::Result;
use sams_goods_storefront::payment::{check_crypto_payment_status, supported_currencies};

/// List the coins accepted at checkout.
pub fn currencies(out: &mut impl Write) -> Result<()> {
    for coin in supported_currencies() {
        writeln!(out, "{:<5} {}", coin.code, coin.name)?;
    }
    Ok(())
}

/// Print the current status of a crypto payment.
pub fn status(payment_id: &str, out: &mut impl Write) -> Result<()> {
    let update = check_crypto_payment_status(&PaymentId::new(payment_id));
    writeln!(
        out,
        "{}: {} (updated {})",
        update.payment_id,
        update.status,
        update.updated_at.to_rfc3339()
    )?;
    if update.status.is_terminal() {
        tracing::info!(payment_id, status = %update.status, "Crypto payment settled");
    }
    Ok(())
}
