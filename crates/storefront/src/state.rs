//! Application state shared by storefront front ends.

use std::sync::Arc;

use crate::cart::{CartStore, FileStorage, StorageError};
use crate::catalog::{Catalog, CatalogError};
use crate::checkout::Checkout;
use crate::config::StorefrontConfig;
use crate::payment::PaymentGateway;

/// Application state shared across commands.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the loaded catalog and the checkout service.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    checkout: Checkout,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Loads the catalog from `config.catalog_path` when set, otherwise uses
    /// the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn new(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::builtin()?,
        };
        Ok(Self::with_catalog(config, catalog))
    }

    /// Create a state around an already loaded catalog.
    #[must_use]
    pub fn with_catalog(config: StorefrontConfig, catalog: Catalog) -> Self {
        let gateway = PaymentGateway::new(config.payment_delay, config.currency);
        let checkout = Checkout::new(gateway, config.shipping);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn checkout(&self) -> &Checkout {
        &self.inner.checkout
    }

    /// Open the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the configured cart key is not
    /// usable as a file name.
    pub fn open_cart(&self) -> Result<CartStore<FileStorage>, StorageError> {
        let config = self.config();
        let storage = FileStorage::new(&config.data_dir, &config.cart_key)?;
        Ok(CartStore::open(storage))
    }
}
