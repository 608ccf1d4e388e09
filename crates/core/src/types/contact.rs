//! Checkout contact and shipping details.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::email::Email;

/// Default shipping country when none is given.
pub const DEFAULT_COUNTRY: &str = "United States";

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name, as it appears in the details file (`firstName`, ...).
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field that failed validation, in form order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid customer details: {}", format_fields(.fields))]
pub struct ContactError {
    pub fields: Vec<FieldError>,
}

fn format_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Customer details as entered on the checkout form.
///
/// Field names follow the form (`firstName`, `zipCode`, ...) so the same
/// document can be written by hand or exported from a browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

/// Customer details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl VerifiedCustomer {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl CustomerDetails {
    /// Validate every field and collect all failures.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError`] listing each field that is too short or, for
    /// the email, malformed.
    pub fn validate(&self) -> Result<VerifiedCustomer, ContactError> {
        let email = Email::parse(&self.email);

        let rules: [(&'static str, &str, usize, &str); 8] = [
            ("firstName", self.first_name.as_str(), 2, "First name must be at least 2 characters."),
            ("lastName", self.last_name.as_str(), 2, "Last name must be at least 2 characters."),
            ("phone", self.phone.as_str(), 10, "Please enter a valid phone number."),
            ("address", self.address.as_str(), 5, "Address must be at least 5 characters."),
            ("city", self.city.as_str(), 2, "City must be at least 2 characters."),
            ("state", self.state.as_str(), 2, "State must be at least 2 characters."),
            ("zipCode", self.zip_code.as_str(), 5, "Zip code must be at least 5 characters."),
            ("country", self.country.as_str(), 2, "Country must be at least 2 characters."),
        ];

        let mut fields: Vec<FieldError> = rules
            .iter()
            .filter(|(_, value, min, _)| value.trim().chars().count() < *min)
            .map(|(field, _, _, message)| FieldError {
                field: *field,
                message: (*message).to_string(),
            })
            .collect();

        if email.is_err() {
            // Form order puts email right after the names.
            let at = fields
                .iter()
                .take_while(|f| matches!(f.field, "firstName" | "lastName"))
                .count();
            fields.insert(
                at,
                FieldError {
                    field: "email",
                    message: "Please enter a valid email address.".to_string(),
                },
            );
        }

        match email {
            Ok(email) if fields.is_empty() => Ok(VerifiedCustomer {
                first_name: self.first_name.trim().to_string(),
                last_name: self.last_name.trim().to_string(),
                email,
                phone: self.phone.trim().to_string(),
                address: self.address.trim().to_string(),
                city: self.city.trim().to_string(),
                state: self.state.trim().to_string(),
                zip_code: self.zip_code.trim().to_string(),
                country: self.country.trim().to_string(),
            }),
            _ => Err(ContactError { fields }),
        }
    }
}
