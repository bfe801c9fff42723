//! JSON wire formats for products and list indexes.
//!
//! # Product
//!
//! ```text
//! {"id":1,"title":"Widget","description":"A simple widget","price":9.99,"imageData":"data:..."}
//! ```
//!
//! `imageData` is omitted when absent or when the configuration excludes it.
//!
//! # List index
//!
//! ```text
//! {"name":"ShoppingCartList","items":[{"entityId":1,"quantity":2}]}
//! ```
//!
//! Only ids and quantities are stored; product bodies live under their own
//! keys. On input, `products` and `product_id` are accepted as aliases of
//! `items` and `entityId`, and numeric fields may be numbers or numeric
//! strings, matching what form inputs historically wrote.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Serialized product body.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductBlob<'a> {
    pub id: u64,
    pub title: &'a str,
    pub description: &'a str,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<&'a str>,
}

/// Product body as read back, before validation.
///
/// Every field is optional so a missing field maps to its own validation
/// error instead of a generic parse failure.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawProduct {
    #[serde(default)]
    pub id: Option<NumberLike>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<NumberLike>,
    #[serde(default)]
    pub image_data: Option<String>,
}

/// Serialized list index.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub(crate) struct ListIndex<'a> {
    pub name: &'a str,
    pub items: Vec<IndexEntry>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IndexEntry {
    pub entity_id: u64,
    pub quantity: u32,
}

/// List index as read back, before validation.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct RawListIndex {
    pub name: String,
    #[serde(default, alias = "products")]
    pub items: Vec<RawIndexEntry>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawIndexEntry {
    #[serde(default, alias = "product_id")]
    pub entity_id: Option<NumberLike>,
    #[serde(default)]
    pub quantity: Option<NumberLike>,
}

/// A number that may have been stored as a JSON number or a numeric string.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub(crate) enum NumberLike {
    Number(f64),
    Text(String),
}

impl NumberLike {
    /// Numeric value; unparsable or empty text yields NaN.
    pub fn as_f64(&self) -> f64 {
        match self {
            NumberLike::Number(n) => *n,
            NumberLike::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        }
    }
}

/// Encode a value as compact JSON.
pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::SerializationError(e.to_string()))
}

/// Decode a JSON blob.
pub(crate) fn from_json<T: DeserializeOwned>(blob: &str) -> Result<T> {
    serde_json::from_str(blob).map_err(|e| Error::DeserializationError(e.to_string()))
}
