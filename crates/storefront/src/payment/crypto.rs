//! Simulated cryptocurrency payments.
//!
//! A payment is a quote: the fiat total converted at a fixed mock rate, a
//! deposit address, and an expiry. Coins without their own rate and address
//! settle through Bitcoin.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::{Decimal, RoundingStrategy};
use sams_goods_core::{CryptoPaymentStatus, CurrencyCode, PaymentId};
use serde::Serialize;
use tracing::debug;

use super::{PaymentError, random_token};

/// Seconds a quote stays valid.
pub const QUOTE_TTL_SECS: u64 = 3600;

/// Decimal places of a quoted coin amount.
const QUOTE_DP: u32 = 8;

/// A coin accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CryptoCurrency {
    pub code: &'static str,
    pub name: &'static str,
}

const SUPPORTED: [CryptoCurrency; 6] = [
    CryptoCurrency { code: "BTC", name: "Bitcoin" },
    CryptoCurrency { code: "ETH", name: "Ethereum" },
    CryptoCurrency { code: "LTC", name: "Litecoin" },
    CryptoCurrency { code: "XRP", name: "Ripple" },
    CryptoCurrency { code: "DOGE", name: "Dogecoin" },
    CryptoCurrency { code: "USDT", name: "Tether" },
];

/// Coins accepted at checkout.
#[must_use]
pub const fn supported_currencies() -> &'static [CryptoCurrency] {
    &SUPPORTED
}

/// Look up a supported coin by code, ignoring case.
///
/// # Errors
///
/// Returns [`PaymentError::UnsupportedCoin`] for unknown codes.
pub fn find_currency(code: &str) -> Result<CryptoCurrency, PaymentError> {
    SUPPORTED
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
        .copied()
        .ok_or_else(|| PaymentError::UnsupportedCoin(code.to_string()))
}

/// Deposit address and USD rate per coin.
fn settlement(code: &str) -> (&'static str, Decimal) {
    match code {
        "ETH" => ("0x742d35Cc6634C0532925a3b844Bc454e4438f44e", Decimal::new(2000, 0)),
        "LTC" => ("LTdsVS8VDw6syvfQADdhf2PHAm3rMGJvPX", Decimal::new(100, 0)),
        _ => ("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", Decimal::new(30000, 0)),
    }
}

/// A quoted crypto payment awaiting deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoPayment {
    pub payment_id: PaymentId,
    pub payment_address: String,
    /// Coin amount, always 8 decimal places.
    pub amount: Decimal,
    /// Coin code.
    pub currency: String,
    pub fiat_amount: Decimal,
    pub fiat_currency: CurrencyCode,
    pub expires_in: u64,
    pub payment_url: String,
}

/// Quote `amount` in `coin`.
///
/// # Errors
///
/// Returns [`PaymentError::UnsupportedCoin`] if the coin is not accepted.
pub fn create_crypto_payment(
    amount: Decimal,
    fiat_currency: CurrencyCode,
    coin: &str,
) -> Result<CryptoPayment, PaymentError> {
    let coin = find_currency(coin)?;
    let (address, rate) = settlement(coin.code);

    let mut quoted =
        (amount / rate).round_dp_with_strategy(QUOTE_DP, RoundingStrategy::MidpointAwayFromZero);
    quoted.rescale(QUOTE_DP);

    let payment = CryptoPayment {
        payment_id: PaymentId::new(format!("mock_crypto_payment_{}", random_token(11))),
        payment_address: address.to_string(),
        amount: quoted,
        currency: coin.code.to_string(),
        fiat_amount: amount,
        fiat_currency,
        expires_in: QUOTE_TTL_SECS,
        payment_url: format!(
            "https://example.com/pay/{}/{address}",
            coin.code.to_lowercase()
        ),
    };
    debug!(
        payment_id = %payment.payment_id,
        coin = coin.code,
        amount = %payment.amount,
        "Crypto payment quoted"
    );
    Ok(payment)
}

/// Latest known state of a crypto payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoStatusUpdate {
    pub payment_id: PaymentId,
    pub status: CryptoPaymentStatus,
    pub updated_at: DateTime<Utc>,
}

/// Poll the status of a crypto payment.
///
/// The simulation picks a random status, finishing about a third of the
/// time or more.
#[must_use]
pub fn check_crypto_payment_status(payment_id: &PaymentId) -> CryptoStatusUpdate {
    let mut rng = rand::rng();
    let status = if rng.random::<f64>() > 0.7 {
        CryptoPaymentStatus::Finished
    } else {
        CryptoPaymentStatus::ALL
            .as_slice()
            .choose(&mut rng)
            .copied()
            .unwrap_or(CryptoPaymentStatus::Finished)
    };
    CryptoStatusUpdate {
        payment_id: payment_id.clone(),
        status,
        updated_at: Utc::now(),
    }
}
