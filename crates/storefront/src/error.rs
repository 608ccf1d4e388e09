//! Unified error handling.
//!
//! Provides a unified `AppError` type for everything the storefront can fail
//! at. Front ends map it to an exit status with [`AppError::exit_code`].

use thiserror::Error;

use crate::cart::{CartError, StorageError};
use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::payment::PaymentError;

/// Exit status for failures caused by the caller's input.
pub const EXIT_USER_ERROR: i32 = 2;

/// Exit status for failures of the storefront itself.
pub const EXIT_INTERNAL_ERROR: i32 = 1;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The cart could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A cart mutation could not be saved.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog lookup or variant selection failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Payment was refused.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// The order could not be placed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from the caller.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether the failure lies with the storefront rather than the caller.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Config(_) | Self::Storage(_) | Self::Io(_) => true,
            Self::Cart(err) => !err.is_user_error(),
            Self::Catalog(err) => !err.is_user_error(),
            Self::Payment(_) | Self::Checkout(_) | Self::NotFound(_) | Self::BadRequest(_) => {
                false
            }
        }
    }

    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.is_internal() {
            EXIT_INTERNAL_ERROR
        } else {
            EXIT_USER_ERROR
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
