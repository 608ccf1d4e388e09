//! Shopping cart state.
//!
//! The cart is an ordered list of [`LineItem`]s. An entry is identified by
//! its item id together with its [`LineOptions`]; adding an item that matches
//! an existing entry bumps that entry's quantity instead of appending.
//!
//! [`CartStore`] owns the list and an injected [`CartStorage`]. Every mutation
//! updates memory first and then writes the whole list back to storage.
//!
//! # Example
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use sams_goods_core::LineOptions;
//! use sams_goods_storefront::cart::{CartItem, CartStore, MemoryStorage};
//!
//! let mut cart = CartStore::open(MemoryStorage::default());
//! let tee = CartItem::new("A", "Tee", Decimal::new(10, 0));
//!
//! cart.add_item(&tee, 1, LineOptions::new().with("size", "M"))?;
//! cart.add_item(&tee, 2, LineOptions::new().with("size", "M"))?;
//! cart.add_item(&tee, 1, LineOptions::new().with("size", "L"))?;
//!
//! assert_eq!(cart.len(), 2);
//! assert_eq!(cart.subtotal(), Decimal::new(40, 0));
//! # Ok::<(), sams_goods_storefront::cart::CartError>(())
//! ```

mod storage;
mod summary;

pub use storage::{
    CartStorage, DEFAULT_CART_KEY, FileStorage, MemoryStorage, StorageError, decode, encode,
};
pub use summary::{OrderSummary, ShippingPolicy};

use rust_decimal::Decimal;
use sams_goods_core::LineOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

/// Errors returned by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The in-memory cart was updated; only the write-back failed.
    #[error("failed to persist cart: {0}")]
    Persist(#[from] StorageError),

    /// The entry's quantity would exceed `u32::MAX`. The cart is unchanged.
    #[error("quantity of '{id}' cannot exceed {max}", max = u32::MAX)]
    QuantityOverflow { id: String },

    /// The cart total would no longer be representable. The cart is unchanged.
    #[error("cart total would overflow with '{id}'")]
    TotalOverflow { id: String },
}

impl CartError {
    /// Whether the mutation was refused because of the requested change.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::QuantityOverflow { .. } | Self::TotalOverflow { .. })
    }
}

/// Catalog data needed to put something in the cart.
///
/// Built from a product or a beat license; the cart copies these fields at
/// add time and never looks them up again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: String,
    pub title: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: Option<String>,
}

impl CartItem {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            image: None,
            category: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// One cart entry.
///
/// Serialized field names and the numeric `price` match the persisted
/// layout, so a saved cart reads back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub options: LineOptions,
}

impl LineItem {
    fn from_item(item: &CartItem, quantity: u32, options: LineOptions) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            price: item.price,
            image: item.image.clone(),
            category: item.category.clone(),
            quantity,
            options,
        }
    }

    /// Whether this entry is the one identified by `id` and `options`.
    #[must_use]
    pub fn matches(&self, id: &str, options: &LineOptions) -> bool {
        self.id == id && &self.options == options
    }

    /// `price * quantity`, saturating at `Decimal::MAX`.
    ///
    /// Entries held by a [`CartStore`] never saturate.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }

    /// `price * quantity`, or `None` if it is not representable.
    #[must_use]
    pub fn checked_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// The cart: line items plus the storage they are saved to.
#[derive(Debug)]
pub struct CartStore<S: CartStorage> {
    items: Vec<LineItem>,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Hydrate a cart from `storage`.
    ///
    /// Missing data gives an empty cart. Corrupt data is logged and also
    /// gives an empty cart; it is overwritten by the next mutation.
    /// Persisted entries with a zero quantity are dropped and duplicate
    /// entries are merged.
    pub fn open(storage: S) -> Self {
        let items = match storage.load() {
            Ok(items) => normalize(items),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable saved cart");
                Vec::new()
            }
        };
        tracing::debug!(entries = items.len(), "Cart loaded");
        Self { items, storage }
    }

    /// Entries in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The entry identified by `id` and `options`, if present.
    #[must_use]
    pub fn find(&self, id: &str, options: &LineOptions) -> Option<&LineItem> {
        self.items.iter().find(|item| item.matches(id, options))
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Sum of `price * quantity` over all entries.
    ///
    /// Mutations and hydration keep this representable, so it is exact.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(LineItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Total number of units in the cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Subtotal, shipping and total under `policy`.
    #[must_use]
    pub fn summary(&self, policy: &ShippingPolicy) -> OrderSummary {
        OrderSummary::new(self.subtotal(), self.item_count(), policy)
    }

    /// Add `quantity` units of `item` with the given options.
    ///
    /// A zero quantity is treated as one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityOverflow`] or [`CartError::TotalOverflow`]
    /// without changing the cart if the merged quantity or the cart total
    /// would overflow, and [`CartError::Persist`] if the cart could not be
    /// saved.
    #[instrument(skip(self, item), fields(id = %item.id))]
    pub fn add_item(
        &mut self,
        item: &CartItem,
        quantity: u32,
        options: LineOptions,
    ) -> Result<(), CartError> {
        let quantity = if quantity == 0 {
            tracing::debug!("Zero quantity on add, using 1");
            1
        } else {
            quantity
        };

        let position = self
            .items
            .iter()
            .position(|line| line.matches(&item.id, &options));
        let (existing, price) = position
            .and_then(|i| self.items.get(i))
            .map_or((0, item.price), |line| (line.quantity, line.price));
        let merged = existing.checked_add(quantity).ok_or_else(|| {
            tracing::warn!(existing, quantity, "Refusing add that overflows the quantity");
            CartError::QuantityOverflow {
                id: item.id.clone(),
            }
        })?;
        self.check_total(position, price, merged, &item.id)?;

        if let Some(line) = position.and_then(|i| self.items.get_mut(i)) {
            line.quantity = merged;
            tracing::debug!(quantity = merged, "Merged into existing entry");
        } else {
            self.items
                .push(LineItem::from_item(item, quantity, options));
            tracing::debug!(quantity, "Appended entry");
        }

        self.persist()
    }

    /// Remove the entry identified by `id` and `options`.
    ///
    /// Returns whether an entry was removed; removing an absent entry is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persist`] if the cart could not be saved.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, id: &str, options: &LineOptions) -> Result<bool, CartError> {
        let before = self.items.len();
        self.items.retain(|line| !line.matches(id, options));
        let removed = self.items.len() != before;
        tracing::debug!(removed, "Remove entry");

        self.persist()?;
        Ok(removed)
    }

    /// Set the quantity of the entry identified by `id` and `options`.
    ///
    /// A quantity of zero removes the entry. Returns whether an entry was
    /// changed or removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::TotalOverflow`] without changing the cart if the
    /// cart total would overflow, and [`CartError::Persist`] if the cart could
    /// not be saved.
    #[instrument(skip(self))]
    pub fn update_quantity(
        &mut self,
        id: &str,
        quantity: u32,
        options: &LineOptions,
    ) -> Result<bool, CartError> {
        if quantity == 0 {
            return self.remove_item(id, options);
        }

        let position = self.items.iter().position(|line| line.matches(id, options));
        if let Some(price) = position.and_then(|i| self.items.get(i)).map(|line| line.price) {
            self.check_total(position, price, quantity, id)?;
        }

        let updated = match position.and_then(|i| self.items.get_mut(i)) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        };
        tracing::debug!(updated, "Update quantity");

        self.persist()?;
        Ok(updated)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persist`] if the cart could not be saved.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.items.clear();
        self.persist()
    }

    /// Refuse a change that would make the cart total unrepresentable.
    ///
    /// `position` is the entry being replaced, if any; the candidate entry has
    /// `price` and `quantity`.
    fn check_total(
        &self,
        position: Option<usize>,
        price: Decimal,
        quantity: u32,
        id: &str,
    ) -> Result<(), CartError> {
        let total = price
            .checked_mul(Decimal::from(quantity))
            .and_then(|candidate| {
                self.items
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| Some(*i) != position)
                    .try_fold(candidate, |acc, (_, line)| {
                        acc.checked_add(line.checked_total()?)
                    })
            });

        total.map(|_| ()).ok_or_else(|| {
            tracing::warn!(id, quantity, "Refusing change that overflows the cart total");
            CartError::TotalOverflow { id: id.to_string() }
        })
    }

    fn persist(&self) -> Result<(), CartError> {
        self.storage.save(&self.items).map_err(|e| {
            tracing::error!(error = %e, "Failed to save cart");
            CartError::from(e)
        })
    }
}

/// Restore the cart invariants on data read from storage.
///
/// Zero-quantity entries are dropped and duplicates merged. A duplicate whose
/// units would push the quantity past `u32::MAX` is dropped, as is any entry
/// that would make the cart total unrepresentable.
fn normalize(items: Vec<LineItem>) -> Vec<LineItem> {
    let loaded = items.len();
    let mut merged: Vec<LineItem> = Vec::with_capacity(loaded);

    for item in items {
        if item.quantity == 0 {
            continue;
        }
        match merged
            .iter_mut()
            .find(|line| line.matches(&item.id, &item.options))
        {
            Some(line) => match line.quantity.checked_add(item.quantity) {
                Some(quantity) => line.quantity = quantity,
                None => tracing::warn!(
                    id = %item.id,
                    dropped = item.quantity,
                    "Saved duplicate entry overflows quantity, dropping it"
                ),
            },
            None => merged.push(item),
        }
    }

    let mut total = Decimal::ZERO;
    merged.retain(|line| {
        match line.checked_total().and_then(|t| total.checked_add(t)) {
            Some(next) => {
                total = next;
                true
            }
            None => {
                tracing::warn!(id = %line.id, "Saved entry overflows the cart total, dropping it");
                false
            }
        }
    });

    if merged.len() != loaded {
        tracing::warn!(
            loaded,
            kept = merged.len(),
            "Saved cart had empty, duplicate or oversized entries"
        );
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn tee(id: &str, cents: i64) -> CartItem {
        CartItem::new(id, format!("Tee {id}"), Decimal::new(cents, 2))
            .with_category("Apparel - Men's T-Shirts")
    }

    fn size(s: &str) -> LineOptions {
        LineOptions::new().with("size", s)
    }

    #[test]
    fn test_example_scenario() {
        let mut cart = CartStore::open(MemoryStorage::default());
        let a = CartItem::new("A", "A", Decimal::new(10, 0));

        cart.add_item(&a, 1, size("M")).unwrap();
        cart.add_item(&a, 2, size("M")).unwrap();
        cart.add_item(&a, 1, size("L")).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.find("A", &size("M")).unwrap().quantity, 3);
        assert_eq!(cart.find("A", &size("L")).unwrap().quantity, 1);
        assert_eq!(cart.subtotal(), Decimal::new(40, 0));
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_options_key_order_does_not_matter() {
        let mut cart = CartStore::open(MemoryStorage::default());
        let item = tee("SAMO_001", 2299);

        let first: LineOptions = [("size", "M"), ("color", "Black")].into_iter().collect();
        let second: LineOptions = [("color", "Black"), ("size", "M")].into_iter().collect();
        cart.add_item(&item, 1, first).unwrap();
        cart.add_item(&item, 1, second).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_add_zero_quantity_counts_as_one() {
        let mut cart = CartStore::open(MemoryStorage::default());
        cart.add_item(&tee("SAMO_001", 2299), 0, LineOptions::new())
            .unwrap();
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_merge_keeps_first_snapshot() {
        let mut cart = CartStore::open(MemoryStorage::default());
        cart.add_item(&tee("SAMO_001", 2299), 1, size("M")).unwrap();

        let repriced = tee("SAMO_001", 1999);
        cart.add_item(&repriced, 1, size("M")).unwrap();

        let line = cart.find("SAMO_001", &size("M")).unwrap();
        assert_eq!(line.price, Decimal::new(2299, 2));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = CartStore::open(MemoryStorage::default());
        cart.add_item(&tee("SAMO_001", 2299), 1, size("M")).unwrap();

        assert!(cart.update_quantity("SAMO_001", 5, &size("M")).unwrap());
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.subtotal(), Decimal::new(11495, 2));
    }

    #[test]
    fn test_update_to_zero_removes_then_remove_is_noop() {
        let mut cart = CartStore::open(MemoryStorage::default());
        cart.add_item(&tee("SAMO_001", 2299), 2, size("M")).unwrap();
        cart.add_item(&tee("SAMO_001", 2299), 1, size("L")).unwrap();

        assert!(cart.update_quantity("SAMO_001", 0, &size("M")).unwrap());
        assert!(cart.find("SAMO_001", &size("M")).is_none());
        assert!(!cart.remove_item("SAMO_001", &size("M")).unwrap());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_mutations_on_absent_entry_are_noops() {
        let mut cart = CartStore::open(MemoryStorage::default());
        cart.add_item(&tee("SAMO_001", 2299), 1, size("M")).unwrap();

        assert!(!cart.update_quantity("SAMO_001", 3, &size("XL")).unwrap());
        assert!(!cart.remove_item("SAMO_999", &size("M")).unwrap());
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let storage = MemoryStorage::default();
        let mut cart = CartStore::open(storage.clone());

        cart.add_item(&tee("SAMO_001", 2299), 2, size("M")).unwrap();
        assert_eq!(storage.load().unwrap(), cart.items());

        cart.update_quantity("SAMO_001", 4, &size("M")).unwrap();
        assert_eq!(storage.load().unwrap()[0].quantity, 4);

        cart.clear().unwrap();
        assert_eq!(storage.raw().unwrap().as_deref(), Some("[]"));
        assert!(CartStore::open(storage).is_empty());
    }

    #[test]
    fn test_corrupt_storage_opens_empty() {
        let storage = MemoryStorage::with_raw(DEFAULT_CART_KEY, "[{\"id\": 12");
        let mut cart = CartStore::open(storage.clone());
        assert!(cart.is_empty());

        cart.add_item(&tee("SAMO_001", 2299), 1, size("M")).unwrap();
        assert_eq!(storage.load().unwrap().len(), 1);
    }

    #[test]
    fn test_open_reads_persisted_layout() {
        let raw = json!([
            {
                "id": "SAMO_001",
                "title": "Trump's Wall of Fame",
                "price": 22.99,
                "image": "/assets/wall-of-fame-front.png",
                "category": "Apparel - Men's T-Shirts",
                "quantity": 2,
                "options": { "size": "M", "color": "Black" }
            }
        ]);
        let storage = MemoryStorage::with_raw(DEFAULT_CART_KEY, raw.to_string());
        let cart = CartStore::open(storage);

        assert_eq!(cart.len(), 1);
        let line = &cart.items()[0];
        assert_eq!(line.price, Decimal::new(2299, 2));
        assert_eq!(line.options.get_str("color"), Some("Black"));
        assert_eq!(cart.subtotal(), Decimal::new(4598, 2));
    }

    #[test]
    fn test_open_normalizes_saved_entries() {
        let raw = json!([
            { "id": "A", "title": "A", "price": 5, "quantity": 1, "options": {"size": "M"} },
            { "id": "A", "title": "A", "price": 5, "quantity": 2, "options": {"size": "M"} },
            { "id": "B", "title": "B", "price": 7, "quantity": 0 }
        ]);
        let cart = CartStore::open(MemoryStorage::with_raw(DEFAULT_CART_KEY, raw.to_string()));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_open_drops_entries_that_overflow_total() {
        let raw = json!([
            { "id": "A", "title": "A", "price": 7.0e27, "quantity": 20, "options": {} },
            { "id": "B", "title": "B", "price": 5, "quantity": 2, "options": {} }
        ]);
        let cart = CartStore::open(MemoryStorage::with_raw(DEFAULT_CART_KEY, raw.to_string()));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].id, "B");
        assert_eq!(cart.subtotal(), Decimal::new(10, 0));
    }

    #[test]
    fn test_open_drops_entry_that_overflows_running_total() {
        let raw = json!([
            { "id": "A", "title": "A", "price": 4.0e28, "quantity": 1, "options": {} },
            { "id": "B", "title": "B", "price": 4.0e28, "quantity": 1, "options": {} }
        ]);
        let cart = CartStore::open(MemoryStorage::with_raw(DEFAULT_CART_KEY, raw.to_string()));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].id, "A");
        assert_eq!(cart.subtotal(), cart.items()[0].price);
    }

    #[test]
    fn test_open_drops_duplicate_that_overflows_quantity() {
        let raw = json!([
            { "id": "A", "title": "A", "price": 1, "quantity": u32::MAX, "options": {} },
            { "id": "A", "title": "A", "price": 1, "quantity": 5, "options": {} }
        ]);
        let cart = CartStore::open(MemoryStorage::with_raw(DEFAULT_CART_KEY, raw.to_string()));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_add_rejects_quantity_overflow() {
        let storage = MemoryStorage::default();
        let mut cart = CartStore::open(storage.clone());
        let a = CartItem::new("A", "A", Decimal::ONE);

        cart.add_item(&a, u32::MAX, LineOptions::new()).unwrap();
        let saved = storage.raw().unwrap();
        let err = cart.add_item(&a, 5, LineOptions::new()).unwrap_err();

        assert!(matches!(err, CartError::QuantityOverflow { ref id } if id == "A"));
        assert!(err.is_user_error());
        assert_eq!(cart.items()[0].quantity, u32::MAX);
        assert_eq!(storage.raw().unwrap(), saved);
    }

    #[test]
    fn test_add_rejects_total_overflow() {
        let mut cart = CartStore::open(MemoryStorage::default());
        let big = CartItem::new("BIG", "Big", Decimal::MAX);

        cart.add_item(&big, 1, LineOptions::new()).unwrap();
        let err = cart.add_item(&big, 1, LineOptions::new()).unwrap_err();
        assert!(matches!(err, CartError::TotalOverflow { .. }));

        let other = cart
            .add_item(&tee("SAMO_001", 2299), 1, size("M"))
            .unwrap_err();
        assert!(matches!(other, CartError::TotalOverflow { .. }));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.subtotal(), Decimal::MAX);
    }

    #[test]
    fn test_update_rejects_total_overflow() {
        let mut cart = CartStore::open(MemoryStorage::default());
        let big = CartItem::new("BIG", "Big", Decimal::MAX);
        cart.add_item(&big, 1, LineOptions::new()).unwrap();

        let err = cart
            .update_quantity("BIG", 2, &LineOptions::new())
            .unwrap_err();

        assert!(matches!(err, CartError::TotalOverflow { .. }));
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_line_total_saturates() {
        let line = LineItem {
            id: "BIG".to_string(),
            title: "Big".to_string(),
            price: Decimal::MAX,
            image: None,
            category: None,
            quantity: 2,
            options: LineOptions::new(),
        };
        assert_eq!(line.checked_total(), None);
        assert_eq!(line.line_total(), Decimal::MAX);
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        struct ReadOnly;

        impl CartStorage for ReadOnly {
            fn load(&self) -> Result<Vec<LineItem>, StorageError> {
                Ok(Vec::new())
            }

            fn save(&self, _items: &[LineItem]) -> Result<(), StorageError> {
                Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )))
            }
        }

        let mut cart = CartStore::open(ReadOnly);
        let err = cart
            .add_item(&tee("SAMO_001", 2299), 1, size("M"))
            .unwrap_err();
        assert!(matches!(err, CartError::Persist(StorageError::Io(_))));
        assert_eq!(cart.len(), 1);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[derive(Debug, Clone)]
    enum Op {
        Add { id: u8, size: u8, quantity: u32 },
        Remove { id: u8, size: u8 },
        Update { id: u8, size: u8, quantity: u32 },
        Clear,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0u8..4, 0u8..3, 0u32..5).prop_map(|(id, size, quantity)| Op::Add { id, size, quantity }),
            2 => (0u8..4, 0u8..3).prop_map(|(id, size)| Op::Remove { id, size }),
            2 => (0u8..4, 0u8..3, 0u32..5).prop_map(|(id, size, quantity)| Op::Update { id, size, quantity }),
            1 => Just(Op::Clear),
        ]
    }

    fn catalog_item(id: u8) -> CartItem {
        CartItem::new(
            format!("SKU_{id}"),
            format!("Item {id}"),
            Decimal::new(i64::from(id) * 1000 + 99, 2),
        )
    }

    fn size_option(size: u8) -> LineOptions {
        LineOptions::new().with("size", ["S", "M", "L"][usize::from(size % 3)])
    }

    fn apply(cart: &mut CartStore<MemoryStorage>, op: &Op) {
        match *op {
            Op::Add { id, size, quantity } => {
                cart.add_item(&catalog_item(id), quantity, size_option(size))
                    .unwrap();
            }
            Op::Remove { id, size } => {
                cart.remove_item(&format!("SKU_{id}"), &size_option(size))
                    .unwrap();
            }
            Op::Update { id, size, quantity } => {
                cart.update_quantity(&format!("SKU_{id}"), quantity, &size_option(size))
                    .unwrap();
            }
            Op::Clear => cart.clear().unwrap(),
        }
    }

    proptest! {
        /// Repeated adds of one id + options collapse into a single entry.
        #[test]
        fn prop_identical_adds_merge(quantities in prop::collection::vec(1u32..50, 1..20)) {
            let mut cart = CartStore::open(MemoryStorage::default());
            let item = catalog_item(1);
            for &q in &quantities {
                let options: LineOptions = [("color", "Black"), ("size", "M")].into_iter().collect();
                cart.add_item(&item, q, options).unwrap();
            }
            prop_assert_eq!(cart.len(), 1);
            prop_assert_eq!(cart.items()[0].quantity, quantities.iter().sum::<u32>());
        }

        /// One entry per distinct options value for a single id.
        #[test]
        fn prop_distinct_options_are_distinct_entries(sizes in prop::collection::vec(0u8..3, 1..20)) {
            let mut cart = CartStore::open(MemoryStorage::default());
            let item = catalog_item(2);
            for &s in &sizes {
                cart.add_item(&item, 1, size_option(s)).unwrap();
            }
            let distinct: std::collections::BTreeSet<_> = sizes.iter().map(|s| s % 3).collect();
            prop_assert_eq!(cart.len(), distinct.len());
        }

        /// Invariants hold and storage mirrors memory after any operation sequence.
        #[test]
        fn prop_invariants_hold(ops in prop::collection::vec(arb_op(), 0..40)) {
            let storage = MemoryStorage::default();
            let mut cart = CartStore::open(storage.clone());

            for op in &ops {
                apply(&mut cart, op);

                let expected: Decimal = cart
                    .items()
                    .iter()
                    .map(|line| line.price * Decimal::from(line.quantity))
                    .sum();
                prop_assert_eq!(cart.subtotal(), expected);
                prop_assert!(cart.items().iter().all(|line| line.quantity >= 1));

                let keys: std::collections::HashSet<_> = cart
                    .items()
                    .iter()
                    .map(|line| (line.id.clone(), line.options.canonical_json()))
                    .collect();
                prop_assert_eq!(keys.len(), cart.len());
            }

            let reloaded = CartStore::open(storage);
            prop_assert_eq!(reloaded.items(), cart.items());
        }
    }
}
