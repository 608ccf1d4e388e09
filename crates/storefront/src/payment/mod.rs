//! Simulated payment processing.
//!
//! Three methods are offered at checkout: card, `PayPal` and crypto. None of
//! them talk to a real provider; [`PaymentGateway`] validates what it can,
//! waits out a configurable round trip and returns a [`PaymentReceipt`].

pub mod card;
pub mod crypto;
pub mod paypal;

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sams_goods_core::{CurrencyCode, PaymentId, PaymentMethod};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

pub use card::{CardDetails, CardField, validate_card_details};
pub use crypto::{
    CryptoCurrency, CryptoPayment, CryptoStatusUpdate, check_crypto_payment_status,
    create_crypto_payment, supported_currencies,
};
pub use paypal::{PayPalCapture, PayPalOrder};

/// Errors raised while taking a payment.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("invalid card details: {}", format_card_fields(.0))]
    InvalidCard(Vec<CardField>),

    #[error("unsupported cryptocurrency: {0}")]
    UnsupportedCoin(String),

    #[error("payment amount must be positive, got {0}")]
    InvalidAmount(Decimal),
}

fn format_card_fields(fields: &[CardField]) -> String {
    fields
        .iter()
        .map(|f| f.message())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Random lowercase base-36 string of `len` characters.
pub(crate) fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
        .collect()
}

/// How the customer chose to pay.
#[derive(Debug, Clone)]
pub enum PaymentDetails {
    Card(CardDetails),
    /// Pay with an approved order, or open one on the spot.
    PayPal { order_id: Option<String> },
    Crypto { coin: String },
}

impl PaymentDetails {
    #[must_use]
    pub const fn method(&self) -> PaymentMethod {
        match self {
            Self::Card(_) => PaymentMethod::CreditCard,
            Self::PayPal { .. } => PaymentMethod::PayPal,
            Self::Crypto { .. } => PaymentMethod::Crypto,
        }
    }
}

/// Proof of a successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub payment_id: PaymentId,
    pub method: PaymentMethod,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub timestamp: DateTime<Utc>,
    /// Card payments only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last4: Option<String>,
    /// `PayPal` payments only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paypal: Option<PayPalCapture>,
    /// Crypto payments only: where and how much to send.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crypto: Option<CryptoPayment>,
}

impl PaymentReceipt {
    fn new(
        payment_id: PaymentId,
        method: PaymentMethod,
        amount: Decimal,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            payment_id,
            method,
            amount,
            currency,
            timestamp: Utc::now(),
            last4: None,
            paypal: None,
            crypto: None,
        }
    }
}

/// Simulated payment provider.
#[derive(Debug, Clone)]
pub struct PaymentGateway {
    processing_delay: Duration,
    currency: CurrencyCode,
}

impl Default for PaymentGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000), CurrencyCode::USD)
    }
}

impl PaymentGateway {
    #[must_use]
    pub const fn new(processing_delay: Duration, currency: CurrencyCode) -> Self {
        Self {
            processing_delay,
            currency,
        }
    }

    /// A gateway that answers immediately.
    #[must_use]
    pub const fn instant(currency: CurrencyCode) -> Self {
        Self::new(Duration::ZERO, currency)
    }

    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Take a payment of `amount`.
    ///
    /// Details are validated before the simulated round trip, so bad input
    /// fails fast.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] for a non-positive amount, invalid card
    /// details or an unsupported coin.
    #[instrument(skip(self, details), fields(method = %details.method()))]
    pub async fn process(
        &self,
        details: &PaymentDetails,
        amount: Decimal,
    ) -> Result<PaymentReceipt, PaymentError> {
        if amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(amount));
        }
        match details {
            PaymentDetails::Card(card) => card.validate()?,
            PaymentDetails::Crypto { coin } => {
                crypto::find_currency(coin)?;
            }
            PaymentDetails::PayPal { .. } => {}
        }

        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }

        let receipt = match details {
            PaymentDetails::Card(card) => {
                let id = PaymentId::new(format!("mock_card_payment_{}", random_token(11)));
                PaymentReceipt {
                    last4: Some(card.last4()),
                    ..PaymentReceipt::new(id, PaymentMethod::CreditCard, amount, self.currency)
                }
            }
            PaymentDetails::PayPal { order_id } => {
                let order_id = order_id
                    .clone()
                    .unwrap_or_else(|| paypal::create_order(amount, self.currency).order_id);
                let id = PaymentId::new(format!("mock_paypal_payment_{}", random_token(11)));
                PaymentReceipt {
                    paypal: Some(paypal::capture(&order_id)),
                    ..PaymentReceipt::new(id, PaymentMethod::PayPal, amount, self.currency)
                }
            }
            PaymentDetails::Crypto { coin } => {
                let quote = create_crypto_payment(amount, self.currency, coin)?;
                let id = quote.payment_id.clone();
                PaymentReceipt {
                    crypto: Some(quote),
                    ..PaymentReceipt::new(id, PaymentMethod::Crypto, amount, self.currency)
                }
            }
        };

        info!(payment_id = %receipt.payment_id, %amount, "Payment processed");
        Ok(receipt)
    }
}
