//! Error types for catalog and cart operations.

use crate::entity::ProductId;
use std::fmt;

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the catalog layer.
///
/// Every fallible operation returns `Result<T>`. Validation variants are raised
/// synchronously at the offending call and abort only that mutation; nothing is
/// retried internally. Callers are expected to fix the input and call again.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Product title is missing or its length is outside the configured bounds.
    InvalidTitle(String),

    /// Product description is missing or its length is outside the configured bounds.
    InvalidDescription(String),

    /// Product price is missing or not a usable number.
    ///
    /// Raised for `null`, `NaN` and infinite values. Infinity is rejected
    /// because it cannot be written to the JSON storage format.
    InvalidPrice(String),

    /// Quantity is missing, not a whole number, or not strictly positive.
    InvalidQuantity(String),

    /// Image data exceeds the configured size limit or is empty.
    InvalidImage(String),

    /// A serialized product carries an id that is not a positive whole number.
    InvalidId(String),

    /// A product with this id is already registered.
    ///
    /// Only produced while registering a product. `ProductRegistry::deserialize`
    /// converts it into a successful return of the registered instance, so it
    /// never escapes that path.
    AlreadyInstantiated {
        /// Id of the product that is already live
        id: ProductId,
    },

    /// The value handed to a list was not issued by the list's registry, or is
    /// a stale copy of a product whose live instance is a different handle.
    NotAnEntity {
        /// Id carried by the rejected handle
        id: ProductId,
    },

    /// Converting a product or list to its stored form failed.
    SerializationError(String),

    /// A stored blob is not valid JSON or does not have the expected shape.
    ///
    /// **Recovery:** the storage entry should be removed or rewritten.
    DeserializationError(String),

    /// The storage backend failed to read, write or enumerate keys.
    StorageError(String),

    /// Invalid catalog configuration (inverted bounds, bad percentages).
    ///
    /// **Recovery:** fix the configuration and construct the registry again.
    ConfigError(String),
}

impl Error {
    /// Short machine-readable kind of the error.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidTitle(_) => "invalid-title",
            Error::InvalidDescription(_) => "invalid-description",
            Error::InvalidPrice(_) => "invalid-price",
            Error::InvalidQuantity(_) => "invalid-quantity",
            Error::InvalidImage(_) => "invalid-image",
            Error::InvalidId(_) => "invalid-id",
            Error::AlreadyInstantiated { .. } => "already-instantiated",
            Error::NotAnEntity { .. } => "not-an-entity",
            Error::SerializationError(_) => "serialization",
            Error::DeserializationError(_) => "deserialization",
            Error::StorageError(_) => "storage",
            Error::ConfigError(_) => "config",
        }
    }

    /// True for errors caused by caller input rather than storage or encoding.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidTitle(_)
                | Error::InvalidDescription(_)
                | Error::InvalidPrice(_)
                | Error::InvalidQuantity(_)
                | Error::InvalidImage(_)
                | Error::InvalidId(_)
                | Error::NotAnEntity { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidTitle(msg) => write!(f, "Invalid title: {}", msg),
            Error::InvalidDescription(msg) => write!(f, "Invalid description: {}", msg),
            Error::InvalidPrice(msg) => write!(f, "Invalid price: {}", msg),
            Error::InvalidQuantity(msg) => write!(f, "Invalid quantity: {}", msg),
            Error::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            Error::InvalidId(msg) => write!(f, "Invalid id: {}", msg),
            Error::AlreadyInstantiated { id } => {
                write!(f, "Product {} is already instantiated", id)
            }
            Error::NotAnEntity { id } => {
                write!(f, "Value with id {} is not a product of this registry", id)
            }
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::StorageError(e.to_string())
        } else if e.is_syntax() || e.is_data() || e.is_eof() {
            Error::DeserializationError(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}
