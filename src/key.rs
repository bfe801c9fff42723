//! Storage key layout.
//!
//! All data shares one flat string keyspace:
//!
//! | Key            | Value                              |
//! |----------------|------------------------------------|
//! | `idCount`      | last issued product id             |
//! | `<productId>`  | serialized product                 |
//! | `<listName>`   | serialized list index              |

use crate::entity::ProductId;

/// Key holding the last issued product id.
pub const ID_COUNT_KEY: &str = "idCount";

/// What a storage key refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// The product id counter.
    Counter,
    /// A known list index.
    List,
    /// A product body.
    Product(ProductId),
    /// Anything else sharing the store.
    Foreign,
}

/// Builder and parser for storage keys.
pub struct StorageKey;

impl StorageKey {
    /// Key under which a product body is stored.
    pub fn product(id: ProductId) -> String {
        id.to_string()
    }

    /// Parse a product key back into its id.
    ///
    /// Only plain decimal digits naming a positive id are accepted.
    pub fn parse_product(key: &str) -> Option<ProductId> {
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        key.parse::<u64>()
            .ok()
            .filter(|raw| *raw > 0)
            .map(ProductId::from)
    }

    /// Classify a key given the names of the lists sharing the store.
    ///
    /// List names win over product ids, so a list may be named with digits.
    pub fn classify(key: &str, list_names: &[&str]) -> KeyKind {
        if key == ID_COUNT_KEY {
            KeyKind::Counter
        } else if list_names.contains(&key) {
            KeyKind::List
        } else if let Some(id) = Self::parse_product(key) {
            KeyKind::Product(id)
        } else {
            KeyKind::Foreign
        }
    }
}
