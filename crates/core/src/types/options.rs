//! Line options: the customization choices that, together with the item id,
//! identify a cart entry.
//!
//! Options are kept in a sorted map so that two selections with the same keys
//! and values compare equal and serialize identically, whatever order the keys
//! were inserted in. Values are arbitrary JSON so selections such as a beat's
//! `bpm` (a number) or an absent `customDesign` (`null`) survive a round trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical, order-insensitive options mapping.
///
/// ```
/// use sams_goods_core::LineOptions;
///
/// let a = LineOptions::new().with("size", "M").with("color", "Black");
/// let b = LineOptions::new().with("color", "Black").with("size", "M");
/// assert_eq!(a, b);
/// assert_eq!(a.canonical_json(), r#"{"color":"Black","size":"M"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineOptions(BTreeMap<String, Value>);

impl LineOptions {
    /// An empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a single option.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up an option value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up an option whose value is a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sorted-key JSON form of the selection.
    ///
    /// Nested objects are sorted too, so this string is a stable identity for
    /// the selection and can be used as a map key.
    #[must_use]
    pub fn canonical_json(&self) -> String {
        // `Value`'s `Display` writes compact JSON and cannot fail: every key is
        // already a string.
        canonicalize(&Value::Object(self.0.clone().into_iter().collect())).to_string()
    }

    /// Human-readable summary such as `color: Black, size: M`.
    ///
    /// `null` values are skipped.
    #[must_use]
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| match v {
                Value::String(s) => format!("{k}: {s}"),
                other => format!("{k}: {other}"),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for LineOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Rebuild a JSON value with every object's keys in sorted order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), v))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
