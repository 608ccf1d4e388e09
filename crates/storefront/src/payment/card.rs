//! Card payment validation.
//!
//! Only the shape of the details is checked: a 16-digit number (spaces
//! allowed), an `MM/YY` expiry and a 3-4 digit CVC.

use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::PaymentError;

static CARD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{16}$").expect("Invalid regex"));

static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}$").expect("Invalid regex"));

static CVC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3,4}$").expect("Invalid regex"));

/// Card details as entered on the payment form.
#[derive(Debug, Clone)]
pub struct CardDetails {
    pub number: SecretString,
    /// `MM/YY`.
    pub expiry: String,
    pub cvc: SecretString,
    pub cardholder: String,
}

impl CardDetails {
    #[must_use]
    pub fn new(
        number: impl Into<String>,
        expiry: impl Into<String>,
        cvc: impl Into<String>,
        cardholder: impl Into<String>,
    ) -> Self {
        Self {
            number: SecretString::from(number.into()),
            expiry: expiry.into(),
            cvc: SecretString::from(cvc.into()),
            cardholder: cardholder.into(),
        }
    }

    /// Last four digits of the card number.
    #[must_use]
    pub fn last4(&self) -> String {
        let digits = normalize_number(self.number.expose_secret());
        let skip = digits.chars().count().saturating_sub(4);
        digits.chars().skip(skip).collect()
    }

    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidCard`] listing every invalid field.
    pub fn validate(&self) -> Result<(), PaymentError> {
        validate_card_details(
            self.number.expose_secret(),
            &self.expiry,
            self.cvc.expose_secret(),
        )
    }
}

/// A card field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Number,
    Expiry,
    Cvc,
}

impl CardField {
    /// Message shown next to the field.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Number => "Invalid card number",
            Self::Expiry => "Invalid expiry date (MM/YY)",
            Self::Cvc => "Invalid CVC",
        }
    }
}

fn normalize_number(number: &str) -> String {
    number.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Check card details and report every invalid field.
///
/// # Errors
///
/// Returns [`PaymentError::InvalidCard`] with the failing fields in form
/// order.
pub fn validate_card_details(number: &str, expiry: &str, cvc: &str) -> Result<(), PaymentError> {
    let checks = [
        (CardField::Number, CARD_NUMBER_RE.is_match(&normalize_number(number))),
        (CardField::Expiry, EXPIRY_RE.is_match(expiry)),
        (CardField::Cvc, CVC_RE.is_match(cvc)),
    ];
    let invalid: Vec<CardField> = checks
        .into_iter()
        .filter_map(|(field, ok)| (!ok).then_some(field))
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(PaymentError::InvalidCard(invalid))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_card() {
        assert!(validate_card_details("4242 4242 4242 4242", "12/29", "123").is_ok());
        assert!(validate_card_details("4242424242424242", "01/30", "1234").is_ok());
    }

    #[test]
    fn test_reports_every_invalid_field() {
        let err = validate_card_details("4242", "1229", "12").unwrap_err();
        let PaymentError::InvalidCard(fields) = err else {
            panic!("expected card error");
        };
        assert_eq!(
            fields,
            vec![CardField::Number, CardField::Expiry, CardField::Cvc]
        );
    }

    #[test]
    fn test_single_invalid_field() {
        let err = validate_card_details("4242 4242 4242 4242", "12/29", "abc").unwrap_err();
        assert!(matches!(err, PaymentError::InvalidCard(ref f) if f == &[CardField::Cvc]));
        assert_eq!(err.to_string(), "invalid card details: Invalid CVC");
    }

    #[test]
    fn test_seventeen_digits_rejected() {
        assert!(validate_card_details("42424242424242424", "12/29", "123").is_err());
    }

    #[test]
    fn test_last4_and_debug_redaction() {
        let card = CardDetails::new("4242 4242 4242 1881", "12/29", "123", "Sam Goods");
        assert_eq!(card.last4(), "1881");
        let debug = format!("{card:?}");
        assert!(!debug.contains("1881"));
        assert!(card.validate().is_ok());
    }
}
