//! Integration tests for the Sam's Goods storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sams-goods-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - carts written by one session and read by the next
//! - `checkout_flow` - browsing the catalog through to a placed order
//!
//! Every test runs against its own temporary data directory with the payment
//! delay switched off.

use std::path::Path;
use std::time::Duration;

use sams_goods_core::CustomerDetails;
use sams_goods_storefront::config::StorefrontConfig;
use sams_goods_storefront::state::AppState;
use tempfile::TempDir;

/// A storefront rooted in a throwaway data directory.
pub struct TestContext {
    pub state: AppState,
    pub dir: TempDir,
}

impl TestContext {
    /// Fresh storefront with the built-in catalog and instant payments.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or the built-in catalog cannot be
    /// created.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let state = AppState::new(config(dir.path())).expect("Built-in catalog should load");
        Self { state, dir }
    }

    /// A second storefront over the same data directory, as a later session
    /// would see it.
    ///
    /// # Panics
    ///
    /// Panics if the built-in catalog cannot be loaded.
    #[must_use]
    pub fn reopen(&self) -> AppState {
        AppState::new(config(self.dir.path())).expect("Built-in catalog should load")
    }

    /// Path of the persisted cart file.
    #[must_use]
    pub fn cart_file(&self) -> std::path::PathBuf {
        self.dir.path().join("cart.json")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn config(data_dir: &Path) -> StorefrontConfig {
    StorefrontConfig {
        data_dir: data_dir.to_path_buf(),
        payment_delay: Duration::ZERO,
        ..StorefrontConfig::default()
    }
}

/// Customer details that pass checkout validation.
#[must_use]
pub fn customer() -> CustomerDetails {
    CustomerDetails {
        first_name: "Sam".to_string(),
        last_name: "Goods".to_string(),
        email: "sam@example.com".to_string(),
        phone: "555-123-4567".to_string(),
        address: "1 Beat Street".to_string(),
        city: "Atlanta".to_string(),
        state: "GA".to_string(),
        zip_code: "30301".to_string(),
        country: "United States".to_string(),
    }
}
