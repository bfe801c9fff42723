//! Ordered product lists with quantities (catalog, shopping cart).
//!
//! A list holds shared [`Product`] handles and a quantity per product. Its
//! persisted form is only an index of `(entityId, quantity)` pairs under the
//! list name; product bodies are stored by the registry under their own keys
//! and re-resolved through it when the list is loaded.
//!
//! # Example
//!
//! ```
//! use shop_kit::{backend::InMemoryStorage, ProductList, ProductRegistry};
//!
//! # fn main() -> shop_kit::Result<()> {
//! let registry = ProductRegistry::new(InMemoryStorage::new());
//! let mut cart = ProductList::new("ShoppingCartList", &registry, true);
//!
//! let widget = registry.create("Widget", "A simple widget", 9.99, true)?;
//! cart.add(&widget, 2)?;
//! assert_eq!(cart.quantity(widget.id()), Some(2));
//!
//! // Reload from the stored index
//! let blob = cart.serialize()?;
//! let restored = ProductList::from_serialized(&blob, &registry)?;
//! assert_eq!(restored.list(), cart.list());
//! # Ok(())
//! # }
//! ```

use crate::backend::Storage;
use crate::cost::CostSummary;
use crate::entity::{Product, ProductId, ProductSummary};
use crate::error::{Error, Result};
use crate::quantity::{IntoQuantity, Quantity};
use crate::registry::ProductRegistry;
use crate::serialization::{
    from_json, to_json, IndexEntry, ListIndex, RawIndexEntry, RawListIndex,
};
use crate::validation::parse_id;
use serde::Serialize;

/// One display row of a list: a quantity and a read-only product summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListEntry {
    pub quantity: u32,
    pub product: ProductSummary,
}

struct ListItem {
    product: Product,
    quantity: Quantity,
}

/// Ordered, id-unique list of products and quantities.
pub struct ProductList<S: Storage> {
    name: String,
    items: Vec<ListItem>,
    registry: ProductRegistry<S>,
    persistent: bool,
}

impl<S: Storage> ProductList<S> {
    /// Create an empty list.
    ///
    /// With `persistent`, every mutation rewrites the index stored under
    /// `name`. Creating the list writes nothing.
    pub fn new(name: impl Into<String>, registry: &ProductRegistry<S>, persistent: bool) -> Self {
        ProductList {
            name: name.into(),
            items: Vec::new(),
            registry: registry.clone(),
            persistent,
        }
    }

    /// Load the persistent list stored under `name`, or start an empty one.
    ///
    /// The list keeps `name` even if the stored index carries another one, so
    /// later saves go back to the key it was loaded from.
    pub fn load(name: &str, registry: &ProductRegistry<S>) -> Result<Self> {
        match registry.storage().get(name)? {
            Some(blob) => {
                let raw: RawListIndex = from_json(&blob)?;
                if raw.name != name {
                    warn!(
                        "Index under key {} is named {}, keeping {}",
                        name, raw.name, name
                    );
                }
                Self::hydrate(name.to_string(), raw.items, registry)
            }
            None => {
                debug!("No stored index for list {}, starting empty", name);
                Ok(Self::new(name, registry, true))
            }
        }
    }

    /// Rebuild a persistent list from its serialized index.
    ///
    /// Each id is resolved through [`ProductRegistry::fetch`]. Entries whose
    /// product is gone from storage are dropped as stale, as are entries with
    /// an unusable id, quantity or product body. The pruned index is written
    /// back once.
    ///
    /// # Errors
    ///
    /// - `Error::DeserializationError`: the index itself is malformed
    /// - `Error::StorageError`: storage could not be read or written
    pub fn from_serialized(blob: &str, registry: &ProductRegistry<S>) -> Result<Self> {
        let raw: RawListIndex = from_json(blob)?;
        Self::hydrate(raw.name, raw.items, registry)
    }

    fn hydrate(
        name: String,
        entries: Vec<RawIndexEntry>,
        registry: &ProductRegistry<S>,
    ) -> Result<Self> {
        let mut list = Self::new(name, registry, true);

        for entry in entries {
            let id = match entry.entity_id.map(|n| parse_id(n.as_f64())) {
                Some(Ok(id)) => id,
                Some(Err(e)) => {
                    warn!("List {}: skipping entry, {}", list.name, e);
                    continue;
                }
                None => {
                    warn!("List {}: skipping entry without id", list.name);
                    continue;
                }
            };

            let quantity = match entry.quantity.map(|n| n.as_f64()).into_quantity() {
                Ok(quantity) => quantity,
                Err(e) => {
                    warn!("List {}: skipping product {}, {}", list.name, id, e);
                    continue;
                }
            };

            let product = match registry.fetch(id) {
                Ok(Some(product)) => product,
                Ok(None) => {
                    debug!("List {}: dropping stale product {}", list.name, id);
                    continue;
                }
                Err(e) if e.is_validation() || matches!(e, Error::DeserializationError(_)) => {
                    warn!("List {}: dropping unreadable product {}, {}", list.name, id, e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if list.position(id).is_some() {
                debug!("List {}: ignoring duplicate product {}", list.name, id);
                continue;
            }
            list.items.push(ListItem { product, quantity });
        }

        list.save_state()?;
        debug!("Loaded list {} with {} products", list.name, list.items.len());
        Ok(list)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a product with a quantity.
    ///
    /// Adding a product whose id is already present is a silent no-op: the
    /// existing quantity is kept. Every mutating method leaves the list as it
    /// was when the index cannot be saved.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidQuantity`: missing, fractional or non-positive quantity
    /// - `Error::NotAnEntity`: the handle does not belong to this list's registry
    pub fn add<Q: IntoQuantity>(&mut self, product: &Product, quantity: Q) -> Result<()> {
        let quantity = quantity.into_quantity()?;
        if !self.registry.is_entity(product) {
            return Err(Error::NotAnEntity { id: product.id() });
        }

        if self.position(product.id()).is_some() {
            debug!(
                "Product with id {} already exists in {}",
                product.id(),
                self.name
            );
            return Ok(());
        }

        self.items.push(ListItem {
            product: product.clone(),
            quantity,
        });
        self.save_or_revert(|items| {
            items.pop();
        })?;
        debug!("Added product with id {} to list {}", product.id(), self.name);
        Ok(())
    }

    /// Add a product, or increase its quantity when it is already listed.
    ///
    /// Returns the resulting quantity.
    pub fn add_or_increment<Q: IntoQuantity>(
        &mut self,
        product: &Product,
        quantity: Q,
    ) -> Result<Quantity> {
        let quantity = quantity.into_quantity()?;
        if !self.registry.is_entity(product) {
            return Err(Error::NotAnEntity { id: product.id() });
        }
        match self.position(product.id()) {
            Some(index) => {
                let previous = self.items[index].quantity;
                let updated = previous.checked_add(quantity)?;
                self.items[index].quantity = updated;
                self.save_or_revert(|items| items[index].quantity = previous)?;
                debug!(
                    "Increased product with id {} to {} in list {}",
                    product.id(),
                    updated,
                    self.name
                );
                Ok(updated)
            }
            None => {
                self.add(product, quantity)?;
                Ok(quantity)
            }
        }
    }

    /// Remove a product. Returns the removed handle, or `None` if absent.
    pub fn remove(&mut self, id: ProductId) -> Result<Option<Product>> {
        match self.position(id) {
            Some(index) => {
                let item = self.items.remove(index);
                let product = item.product.clone();
                self.save_or_revert(move |items| items.insert(index, item))?;
                debug!("Removed product with id {} from list {}", id, self.name);
                Ok(Some(product))
            }
            None => {
                debug!("Could not find product with id {} in list {}", id, self.name);
                Ok(None)
            }
        }
    }

    /// Replace a product's quantity. Returns `false` if the id is absent.
    ///
    /// # Errors
    ///
    /// `Error::InvalidQuantity` under the same rule as [`add`](Self::add),
    /// checked before the lookup.
    pub fn update_quantity<Q: IntoQuantity>(&mut self, id: ProductId, quantity: Q) -> Result<bool> {
        let quantity = quantity.into_quantity()?;
        match self.position(id) {
            Some(index) => {
                let previous = std::mem::replace(&mut self.items[index].quantity, quantity);
                self.save_or_revert(|items| items[index].quantity = previous)?;
                debug!(
                    "Updated product quantity with id {} in list {}",
                    id, self.name
                );
                Ok(true)
            }
            None => {
                debug!("Could not find product with id {} in list {}", id, self.name);
                Ok(false)
            }
        }
    }

    /// Current quantity for a product.
    pub fn quantity(&self, id: ProductId) -> Option<u32> {
        self.position(id).map(|index| self.items[index].quantity.get())
    }

    /// Handle of a listed product.
    pub fn get(&self, id: ProductId) -> Option<Product> {
        self.position(id)
            .map(|index| self.items[index].product.clone())
    }

    /// Whether a product is listed.
    pub fn contains(&self, id: ProductId) -> bool {
        self.position(id).is_some()
    }

    /// Snapshot of the list in insertion order.
    pub fn list(&self) -> Vec<ListEntry> {
        self.items
            .iter()
            .map(|item| ListEntry {
                quantity: item.quantity.get(),
                product: item.product.summary(),
            })
            .collect()
    }

    /// Listed ids in insertion order.
    pub fn ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|item| item.product.id()).collect()
    }

    /// Remove every product.
    pub fn clear(&mut self) -> Result<()> {
        let previous = std::mem::take(&mut self.items);
        self.save_or_revert(move |items| *items = previous)?;
        debug!("Emptied list {}", self.name);
        Ok(())
    }

    /// Serialize the list index: name plus `(entityId, quantity)` pairs.
    pub fn serialize(&self) -> Result<String> {
        to_json(&ListIndex {
            name: &self.name,
            items: self
                .items
                .iter()
                .map(|item| IndexEntry {
                    entity_id: item.product.id().get(),
                    quantity: item.quantity.get(),
                })
                .collect(),
        })
    }

    /// Costs of the listed products using the registry's shipping tax.
    pub fn cost_summary(&self) -> CostSummary {
        CostSummary::compute(
            &self.list(),
            self.registry.config().shipping_tax_percent,
        )
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.product.id() == id)
    }

    fn save_or_revert(&mut self, revert: impl FnOnce(&mut Vec<ListItem>)) -> Result<()> {
        if let Err(e) = self.save_state() {
            revert(&mut self.items);
            warn!("List {} not saved, change reverted: {}", self.name, e);
            return Err(e);
        }
        Ok(())
    }

    fn save_state(&self) -> Result<()> {
        if !self.persistent {
            return Ok(());
        }
        debug!("Saving list with name {} to storage", self.name);
        self.registry.storage().set(&self.name, self.serialize()?)
    }
}
