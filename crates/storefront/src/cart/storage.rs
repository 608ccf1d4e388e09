//! Key-value persistence for the cart.
//!
//! The cart is saved as a single JSON array of line items under a fixed key.
//! [`CartStorage`] is the seam the [`CartStore`](super::CartStore) is built
//! on; two backends are provided:
//!
//! - [`MemoryStorage`] - process-local map, shareable between clones (tests,
//!   embedding)
//! - [`FileStorage`] - one `<key>.json` file per key inside a data directory

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use super::LineItem;

/// Key the cart is stored under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "cart";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stored value is not a JSON array of line items.
    #[error("stored value under '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    /// Line items could not be serialized.
    #[error("failed to encode cart: {0}")]
    Encode(serde_json::Error),

    /// The key cannot be used as a storage location.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// A shared in-memory map was poisoned by a panicking writer.
    #[error("storage lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

/// Persistence dependency of the cart store.
///
/// `load` returns an empty list when nothing has been saved yet and
/// [`StorageError::Corrupt`] when the saved value cannot be decoded; the
/// store decides how to recover. `save` overwrites the previous value.
pub trait CartStorage {
    /// Read the persisted line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read or the value is corrupt.
    fn load(&self) -> Result<Vec<LineItem>, StorageError>;

    /// Replace the persisted line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the items cannot be encoded or written.
    fn save(&self, items: &[LineItem]) -> Result<(), StorageError>;
}

impl<T: CartStorage + ?Sized> CartStorage for &T {
    fn load(&self) -> Result<Vec<LineItem>, StorageError> {
        (**self).load()
    }

    fn save(&self, items: &[LineItem]) -> Result<(), StorageError> {
        (**self).save(items)
    }
}

/// Encode line items in the persisted layout.
///
/// # Errors
///
/// Returns [`StorageError::Encode`] if serialization fails.
pub fn encode(items: &[LineItem]) -> Result<String, StorageError> {
    serde_json::to_string(items).map_err(StorageError::Encode)
}

/// Decode the persisted layout.
///
/// # Errors
///
/// Returns [`StorageError::Corrupt`] if `raw` is not a JSON array of line items.
pub fn decode(key: &str, raw: &str) -> Result<Vec<LineItem>, StorageError> {
    serde_json::from_str(raw).map_err(|source| StorageError::Corrupt {
        key: key.to_string(),
        source,
    })
}

// =============================================================================
// In-memory backend
// =============================================================================

/// In-memory key-value storage.
///
/// Clones share the same map, so a test can keep a handle and inspect or
/// tamper with what a store wrote.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    key: String,
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(DEFAULT_CART_KEY)
    }
}

impl MemoryStorage {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Storage pre-seeded with a raw value under `key`.
    #[must_use]
    pub fn with_raw(key: impl Into<String>, raw: impl Into<String>) -> Self {
        let storage = Self::new(key);
        let mut values = HashMap::new();
        values.insert(storage.key.clone(), raw.into());
        Self {
            values: Arc::new(Mutex::new(values)),
            ..storage
        }
    }

    /// The raw value currently stored under this storage's key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::LockPoisoned`] if a writer panicked.
    pub fn raw(&self) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StorageError::LockPoisoned("read"))?;
        Ok(values.get(&self.key).cloned())
    }

    /// Overwrite the raw value under this storage's key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::LockPoisoned`] if a writer panicked.
    pub fn set_raw(&self, raw: impl Into<String>) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::LockPoisoned("write"))?;
        values.insert(self.key.clone(), raw.into());
        Ok(())
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<LineItem>, StorageError> {
        match self.raw()? {
            Some(raw) => decode(&self.key, &raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, items: &[LineItem]) -> Result<(), StorageError> {
        self.set_raw(encode(items)?)
    }
}

// =============================================================================
// File backend
// =============================================================================

/// File-backed key-value storage: each key is a `<key>.json` file in `dir`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous cart intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    key: String,
}

impl FileStorage {
    /// Create a file storage rooted at `dir`.
    ///
    /// The directory is created lazily on the first save.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if `key` is empty or is not a
    /// plain file name.
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        let plain = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0']);
        if !plain {
            return Err(StorageError::InvalidKey(key));
        }
        Ok(Self {
            dir: dir.into(),
            key,
        })
    }

    /// Path of the file holding this storage's key.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CartStorage for FileStorage {
    fn load(&self) -> Result<Vec<LineItem>, StorageError> {
        match fs::read_to_string(self.path()) {
            Ok(raw) => decode(&self.key, &raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, items: &[LineItem]) -> Result<(), StorageError> {
        let raw = encode(items)?;
        fs::create_dir_all(&self.dir)?;

        let path = self.path();
        let tmp = self.dir.join(format!(".{}.json.tmp", self.key));
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use sams_goods_core::LineOptions;

    use super::*;

    fn item(id: &str, quantity: u32) -> LineItem {
        LineItem {
            id: id.to_string(),
            title: format!("Item {id}"),
            price: Decimal::new(2299, 2),
            image: None,
            category: Some("Apparel - Men's T-Shirts".to_string()),
            quantity,
            options: LineOptions::new().with("size", "M"),
        }
    }

    #[test]
    fn test_memory_storage_missing_key_is_empty() {
        let storage = MemoryStorage::default();
        assert!(storage.load().unwrap().is_empty());
        assert_eq!(storage.raw().unwrap(), None);
    }

    #[test]
    fn test_memory_storage_clones_share_values() {
        let storage = MemoryStorage::default();
        let handle = storage.clone();
        storage.save(&[item("SAMO_001", 2)]).unwrap();

        let loaded = handle.load().unwrap();
        assert_eq!(loaded, vec![item("SAMO_001", 2)]);
    }

    #[test]
    fn test_memory_storage_corrupt_value() {
        let storage = MemoryStorage::with_raw("cart", "{not json");
        let err = storage.load().unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { ref key, .. } if key == "cart"));
    }

    #[test]
    fn test_encoded_layout_uses_numeric_price() {
        let raw = encode(&[item("SAMO_001", 2)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &value[0];
        assert_eq!(first["id"], "SAMO_001");
        assert!(first["price"].is_number());
        assert_eq!(first["quantity"], 2);
        assert_eq!(first["options"]["size"], "M");
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"), "cart").unwrap();

        assert!(storage.load().unwrap().is_empty());
        storage.save(&[item("SAMO_001", 1), item("SAMO_002", 3)]).unwrap();

        assert!(storage.path().ends_with("nested/cart.json"));
        let loaded = storage.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].quantity, 3);
    }

    #[test]
    fn test_file_storage_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path(), "cart").unwrap();
        storage.save(&[item("SAMO_001", 1)]).unwrap();
        storage.save(&[]).unwrap();

        assert_eq!(fs::read_to_string(storage.path()).unwrap(), "[]");
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_storage_rejects_path_like_keys() {
        assert!(matches!(
            FileStorage::new("/tmp", "../cart"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(FileStorage::new("/tmp", "").is_err());
        assert!(FileStorage::new("/tmp", "cart-v2").is_ok());
    }
}
