//! Product entity and its identifier.
//!
//! A [`Product`] is a cheap-to-clone handle. Clones share one underlying
//! record, so a list holding a handle observes every change made through the
//! registry's setters. Fields are read through getters only; all mutation goes
//! through [`ProductRegistry`](crate::ProductRegistry) so it can be validated
//! and written through to storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Unique product identifier.
///
/// Issued by the registry from the persisted `idCount` counter, so ids are
/// positive and never reused within one store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ProductId {
    fn from(raw: u64) -> Self {
        ProductId(raw)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the registry that issued a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct RegistryId(pub(crate) u64);

/// Mutable product fields.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ProductState {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) price: f64,
    pub(crate) image_data: Option<String>,
    pub(crate) persistent: bool,
}

/// Read-only projection of a product for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: f64,
}

/// Shared handle to a validated product.
///
/// Created by [`ProductRegistry::create`](crate::ProductRegistry::create) or
/// [`ProductRegistry::deserialize`](crate::ProductRegistry::deserialize).
#[derive(Clone)]
pub struct Product {
    id: ProductId,
    origin: RegistryId,
    state: Arc<RwLock<ProductState>>,
}

impl Product {
    pub(crate) fn new(id: ProductId, origin: RegistryId, state: ProductState) -> Self {
        Product {
            id,
            origin,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Product id. Never changes.
    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn title(&self) -> String {
        self.read().title.clone()
    }

    pub fn description(&self) -> String {
        self.read().description.clone()
    }

    pub fn price(&self) -> f64 {
        self.read().price
    }

    /// Image data URI, if one was attached.
    pub fn image_data(&self) -> Option<String> {
        self.read().image_data.clone()
    }

    /// Whether changes are written through to storage.
    pub fn is_persistent(&self) -> bool {
        self.read().persistent
    }

    /// Snapshot of id, title, description and price.
    pub fn summary(&self) -> ProductSummary {
        let state = self.read();
        ProductSummary {
            id: self.id,
            title: state.title.clone(),
            description: state.description.clone(),
            price: state.price,
        }
    }

    /// True if both handles refer to the same live instance.
    pub fn same_instance(&self, other: &Product) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    pub(crate) fn origin(&self) -> RegistryId {
        self.origin
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ProductState> {
        // A poisoned lock still holds a fully validated record
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, ProductState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Product")
            .field("id", &self.id)
            .field("title", &state.title)
            .field("description", &state.description)
            .field("price", &state.price)
            .field("has_image", &state.image_data.is_some())
            .field("persistent", &state.persistent)
            .finish()
    }
}
