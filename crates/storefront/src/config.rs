//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SAMS_GOODS_DATA_DIR` - Directory of the file-backed store (default: .sams-goods)
//! - `SAMS_GOODS_CART_KEY` - Storage key of the cart (default: cart)
//! - `SAMS_GOODS_CURRENCY` - Display currency code (default: USD)
//! - `SAMS_GOODS_FREE_SHIPPING_THRESHOLD` - Subtotal that ships free (default: 50.00)
//! - `SAMS_GOODS_SHIPPING_RATE` - Flat shipping below the threshold (default: 5.99)
//! - `SAMS_GOODS_PAYMENT_DELAY_MS` - Simulated payment round trip (default: 2000)
//! - `SAMS_GOODS_CATALOG` - YAML catalog replacing the built-in one

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use sams_goods_core::CurrencyCode;
use thiserror::Error;

use crate::cart::{DEFAULT_CART_KEY, ShippingPolicy};

const DEFAULT_DATA_DIR: &str = ".sams-goods";
const DEFAULT_PAYMENT_DELAY_MS: u64 = 2000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Directory holding the persisted cart
    pub data_dir: PathBuf,
    /// Key the cart is stored under
    pub cart_key: String,
    /// Currency prices are shown in
    pub currency: CurrencyCode,
    /// Shipping charged on orders
    pub shipping: ShippingPolicy,
    /// Simulated payment provider latency
    pub payment_delay: Duration,
    /// Catalog file overriding the built-in catalog
    pub catalog_path: Option<PathBuf>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cart_key: DEFAULT_CART_KEY.to_string(),
            currency: CurrencyCode::default(),
            shipping: ShippingPolicy::default(),
            payment_delay: Duration::from_millis(DEFAULT_PAYMENT_DELAY_MS),
            catalog_path: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    /// if it is set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let env = Env(&lookup);

        let data_dir = env
            .optional("SAMS_GOODS_DATA_DIR")
            .map_or(defaults.data_dir, PathBuf::from);

        let cart_key = env
            .optional("SAMS_GOODS_CART_KEY")
            .unwrap_or(defaults.cart_key);
        if cart_key.contains(['/', '\\']) {
            return Err(ConfigError::InvalidEnvVar(
                "SAMS_GOODS_CART_KEY".to_string(),
                "must be a plain name".to_string(),
            ));
        }

        let currency = env
            .parse("SAMS_GOODS_CURRENCY", CurrencyCode::from_str)?
            .unwrap_or(defaults.currency);

        let free_threshold = env
            .parse("SAMS_GOODS_FREE_SHIPPING_THRESHOLD", parse_amount)?
            .unwrap_or(defaults.shipping.free_threshold);
        let flat_rate = env
            .parse("SAMS_GOODS_SHIPPING_RATE", parse_amount)?
            .unwrap_or(defaults.shipping.flat_rate);

        let payment_delay = env
            .parse("SAMS_GOODS_PAYMENT_DELAY_MS", |v| {
                v.parse::<u64>().map_err(|e| e.to_string())
            })?
            .map_or(defaults.payment_delay, Duration::from_millis);

        let catalog_path = env.optional("SAMS_GOODS_CATALOG").map(PathBuf::from);

        Ok(Self {
            data_dir,
            cart_key,
            currency,
            shipping: ShippingPolicy {
                free_threshold,
                flat_rate,
            },
            payment_delay,
            catalog_path,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Get and parse an optional variable.
    fn parse<T>(
        &self,
        key: &str,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<Option<T>, ConfigError> {
        self.optional(key)
            .map(|value| {
                parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
            })
            .transpose()
    }
}

/// Parse a non-negative money amount.
fn parse_amount(value: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(value).map_err(|e| e.to_string())?;
    if amount.is_sign_negative() {
        return Err(format!("must not be negative (got {amount})"));
    }
    Ok(amount)
}
