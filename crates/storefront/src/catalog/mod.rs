//! Merch and beat catalog.
//!
//! The storefront ships a built-in catalog embedded from `data/catalog.yaml`.
//! A different YAML file with the same layout can be loaded with
//! [`Catalog::from_path`].
//!
//! The catalog also knows how to turn a product or beat selection into the
//! [`CartItem`] and [`LineOptions`] the cart stores.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use sams_goods_core::{BeatId, LicenseTier, LineOptions, ProductId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::cart::CartItem;

/// Category assigned to every beat license in the cart.
pub const BEATS_CATEGORY: &str = "Beats";

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.yaml");

/// Errors raised while loading or querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("duplicate catalog id: {0}")]
    DuplicateId(String),

    #[error("catalog has no terms for the {0} license")]
    MissingLicense(LicenseTier),

    #[error("product not found: {0}")]
    UnknownProduct(String),

    #[error("beat not found: {0}")]
    UnknownBeat(String),

    #[error("no product or beat with id {0}")]
    UnknownItem(String),

    #[error("please select a size for {product}")]
    SizeRequired { product: String },

    #[error("please select a color for {product}")]
    ColorRequired { product: String },

    #[error("{product} is not available in size {size}")]
    InvalidSize { product: String, size: String },

    #[error("{product} is not available in {color}")]
    InvalidColor { product: String, color: String },
}

impl CatalogError {
    /// Whether the error was caused by the caller's input rather than a bad
    /// catalog.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(
            self,
            Self::Parse(_) | Self::Io { .. } | Self::DuplicateId(_) | Self::MissingLicense(_)
        )
    }
}

// =============================================================================
// Catalog entries
// =============================================================================

/// Usage terms and price of one license tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseTerms {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub features: Vec<String>,
}

/// A merch product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

impl Product {
    /// Build the cart entry for this product with the chosen variant.
    ///
    /// A size and a color are required when the product offers any, and must
    /// be one of the offered values. `custom_design` is an opaque reference
    /// to an uploaded design and is stored as `null` when absent.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] naming the first missing or unavailable
    /// choice.
    pub fn select(
        &self,
        size: Option<&str>,
        color: Option<&str>,
        custom_design: Option<&str>,
    ) -> Result<(CartItem, LineOptions), CatalogError> {
        let size = pick(&self.sizes, size).map_err(|choice| match choice {
            None => CatalogError::SizeRequired {
                product: self.title.clone(),
            },
            Some(size) => CatalogError::InvalidSize {
                product: self.title.clone(),
                size,
            },
        })?;
        let color = pick(&self.colors, color).map_err(|choice| match choice {
            None => CatalogError::ColorRequired {
                product: self.title.clone(),
            },
            Some(color) => CatalogError::InvalidColor {
                product: self.title.clone(),
                color,
            },
        })?;

        let mut item = CartItem::new(self.id.as_str(), &self.title, self.price)
            .with_category(&self.category);
        if let Some(image) = self.images.first() {
            item = item.with_image(image);
        }

        let options = LineOptions::new()
            .with("size", optional(size))
            .with("color", optional(color))
            .with("customDesign", optional(custom_design.map(str::to_string)));

        Ok((item, options))
    }

    /// Whether the product is out of stock.
    #[must_use]
    pub const fn sold_out(&self) -> bool {
        self.stock == 0
    }
}

/// Match a requested choice against the offered values, case-insensitively.
///
/// `Err(None)` means a choice was required but not given; `Err(Some(v))`
/// means `v` is not offered.
fn pick(offered: &[String], requested: Option<&str>) -> Result<Option<String>, Option<String>> {
    let requested = requested.map(str::trim).filter(|s| !s.is_empty());
    match (offered.is_empty(), requested) {
        (true, _) => Ok(None),
        (false, None) => Err(None),
        (false, Some(choice)) => offered
            .iter()
            .find(|value| value.eq_ignore_ascii_case(choice))
            .map(|value| Some(value.clone()))
            .ok_or_else(|| Some(choice.to_string())),
    }
}

fn optional(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::String)
}

/// A beat for licensing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beat {
    pub id: BeatId,
    pub title: String,
    pub bpm: u32,
    #[serde(default)]
    pub description: String,
    pub audio_file: String,
    pub cover_art: String,
    pub genre: String,
    pub mood: String,
    pub key: String,
    /// Track length as displayed (`3:21`).
    pub duration: String,
    #[serde(default)]
    pub featured: bool,
}

impl Beat {
    /// Build the cart entry for a license of this beat.
    ///
    /// Each tier is its own cart line: the id is `{beat}-{tier}` and the
    /// options carry the tier, tempo and key.
    #[must_use]
    pub fn license(&self, tier: LicenseTier, terms: &LicenseTerms) -> (CartItem, LineOptions) {
        let item = CartItem::new(self.line_id(tier), &self.title, terms.price)
            .with_image(&self.cover_art)
            .with_category(BEATS_CATEGORY);
        let options = LineOptions::new()
            .with("licenseType", tier.as_str())
            .with("bpm", self.bpm)
            .with("key", self.key.as_str());
        (item, options)
    }

    /// Cart line id of a license tier of this beat.
    #[must_use]
    pub fn line_id(&self, tier: LicenseTier) -> String {
        format!("{}-{tier}", self.id)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// What the customer picked on a product or beat page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub size: Option<String>,
    pub color: Option<String>,
    pub custom_design: Option<String>,
    /// License tier for beats; defaults to [`LicenseTier::Basic`].
    pub license: Option<LicenseTier>,
}

/// The full storefront catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    licenses: BTreeMap<LicenseTier, LicenseTerms>,
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    beats: Vec<Beat>,
}

impl Catalog {
    /// The catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded YAML is invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed YAML,
    /// [`CatalogError::DuplicateId`] when two entries share an id, and
    /// [`CatalogError::MissingLicense`] when a tier has no terms.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        debug!(
            products = catalog.products.len(),
            beats = catalog.beats.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, or any error
    /// from [`Catalog::from_yaml`].
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if let Some(tier) = LicenseTier::ALL
            .into_iter()
            .find(|tier| !self.licenses.contains_key(tier))
        {
            return Err(CatalogError::MissingLicense(tier));
        }

        let mut seen = HashSet::new();
        let ids = self
            .products
            .iter()
            .map(|p| p.id.as_str())
            .chain(self.beats.iter().map(|b| b.id.as_str()));
        for id in ids {
            if !seen.insert(id) {
                return Err(CatalogError::DuplicateId(id.to_string()));
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products whose category contains `category`, ignoring case.
    ///
    /// An empty filter matches everything.
    pub fn products_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a Product> + 'a {
        let needle = category.trim().to_lowercase();
        self.products
            .iter()
            .filter(move |p| p.category.to_lowercase().contains(&needle))
    }

    pub fn featured_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.featured)
    }

    /// Distinct product categories in catalog order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.products
            .iter()
            .map(|p| p.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownProduct`] if no product has this id.
    pub fn product(&self, id: &str) -> Result<&Product, CatalogError> {
        self.products
            .iter()
            .find(|p| p.id.as_str() == id)
            .ok_or_else(|| CatalogError::UnknownProduct(id.to_string()))
    }

    // -------------------------------------------------------------------------
    // Beats and licenses
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn beats(&self) -> &[Beat] {
        &self.beats
    }

    pub fn featured_beats(&self) -> impl Iterator<Item = &Beat> {
        self.beats.iter().filter(|b| b.featured)
    }

    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownBeat`] if no beat has this id.
    pub fn beat(&self, id: &str) -> Result<&Beat, CatalogError> {
        self.beats
            .iter()
            .find(|b| b.id.as_str() == id)
            .ok_or_else(|| CatalogError::UnknownBeat(id.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`CatalogError::MissingLicense`] if the tier has no terms.
    pub fn license(&self, tier: LicenseTier) -> Result<&LicenseTerms, CatalogError> {
        self.licenses
            .get(&tier)
            .ok_or(CatalogError::MissingLicense(tier))
    }

    /// License tiers with their terms, cheapest first.
    pub fn licenses(&self) -> impl Iterator<Item = (LicenseTier, &LicenseTerms)> {
        self.licenses.iter().map(|(tier, terms)| (*tier, terms))
    }

    /// Build the cart entry for a product or beat id.
    ///
    /// Product ids take size, color and custom design from `selection`; beat
    /// ids take the license tier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownItem`] if the id names neither, or the
    /// product's variant error.
    pub fn cart_entry(
        &self,
        id: &str,
        selection: &Selection,
    ) -> Result<(CartItem, LineOptions), CatalogError> {
        if let Ok(product) = self.product(id) {
            return product.select(
                selection.size.as_deref(),
                selection.color.as_deref(),
                selection.custom_design.as_deref(),
            );
        }
        if let Ok(beat) = self.beat(id) {
            let tier = selection.license.unwrap_or_default();
            return Ok(beat.license(tier, self.license(tier)?));
        }
        Err(CatalogError::UnknownItem(id.to_string()))
    }
}
