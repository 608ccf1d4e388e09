//! Newtype IDs for type-safe catalog and order references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing a product SKU with a beat slug or an order number.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use sams_goods_core::define_id;
/// define_id!(SkuId);
/// define_id!(ReceiptId);
///
/// let sku = SkuId::new("SAMO_001");
/// let receipt = ReceiptId::new("SAMO_001");
///
/// assert_eq!(sku.as_str(), receipt.as_str());
/// // These are different types, so this won't compile:
/// // let _: SkuId = receipt;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl ::core::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Catalog identities
define_id!(ProductId);
define_id!(BeatId);

// Checkout identities
define_id!(OrderNumber);
define_id!(PaymentId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_as_str() {
        let id = ProductId::new("SAMO_001");
        assert_eq!(id.as_str(), "SAMO_001");
        assert_eq!(id.to_string(), "SAMO_001");
        assert_eq!(format!("[{id:<10}]"), "[SAMO_001  ]");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = BeatId::from("blood-season");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"blood-season\"");

        let parsed: BeatId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_into_string() {
        let number = OrderNumber::new(String::from("ORD-1A2B3C4D"));
        let raw: String = number.into();
        assert_eq!(raw, "ORD-1A2B3C4D");
    }
}
