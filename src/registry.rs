//! Product registry: construction, validation, identity and deduplication.
//!
//! The registry is the only place product ids are issued and the only place
//! product fields are changed. It keeps an id → instance map of every
//! persistent product it has handed out, so deserializing the same id twice
//! yields the same live handle instead of a second copy.
//!
//! # Example
//!
//! ```
//! use shop_kit::{backend::InMemoryStorage, ProductRegistry};
//!
//! # fn main() -> shop_kit::Result<()> {
//! let registry = ProductRegistry::new(InMemoryStorage::new());
//!
//! let widget = registry.create("Widget", "A simple widget", 9.99, true)?;
//! let blob = registry.serialize(&widget)?;
//!
//! // Same id already live: the registered instance comes back
//! let again = registry.deserialize(&blob)?;
//! assert!(again.same_instance(&widget));
//! # Ok(())
//! # }
//! ```

use crate::backend::Storage;
use crate::config::CatalogConfig;
use crate::entity::{Product, ProductId, ProductState, RegistryId};
use crate::error::{Error, Result};
use crate::key::{StorageKey, ID_COUNT_KEY};
use crate::serialization::{from_json, to_json, ProductBlob, RawProduct};
use crate::validation::{
    parse_id, validate_description, validate_image, validate_price, validate_title,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Issues, validates and deduplicates products.
///
/// Clones share the same instance map, storage and configuration, so a clone
/// handed to a [`ProductList`](crate::ProductList) is the same registry.
#[derive(Clone)]
pub struct ProductRegistry<S: Storage> {
    storage: S,
    config: Arc<CatalogConfig>,
    live: Arc<DashMap<ProductId, Product>>,
    origin: RegistryId,
}

impl<S: Storage> ProductRegistry<S> {
    /// Create a registry with the default configuration.
    pub fn new(storage: S) -> Self {
        Self::build(storage, CatalogConfig::default())
    }

    /// Create a registry with a custom configuration.
    ///
    /// # Errors
    ///
    /// `Error::ConfigError` if the configuration does not validate.
    pub fn with_config(storage: S, config: CatalogConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(storage, config))
    }

    fn build(storage: S, config: CatalogConfig) -> Self {
        ProductRegistry {
            storage,
            config: Arc::new(config),
            live: Arc::new(DashMap::new()),
            origin: RegistryId(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed)),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Construct a new product with a freshly issued id.
    ///
    /// Fields are validated before an id is drawn, so a rejected product does
    /// not consume one. A persistent product is registered and written to
    /// storage under its id.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidTitle` / `Error::InvalidDescription`: length out of bounds
    /// - `Error::InvalidPrice`: NaN or infinite price
    /// - `Error::StorageError`: the counter or product could not be written
    pub fn create(
        &self,
        title: &str,
        description: &str,
        price: f64,
        persistent: bool,
    ) -> Result<Product> {
        validate_title(title, &self.config)?;
        validate_description(description, &self.config)?;
        validate_price(price)?;

        let id = self.next_id()?;
        let product = Product::new(
            id,
            self.origin,
            ProductState {
                title: title.to_string(),
                description: description.to_string(),
                price,
                image_data: None,
                persistent,
            },
        );

        if persistent {
            self.register(&product)?;
            if let Err(e) = self.persist(&product) {
                self.live.remove(&id);
                return Err(e);
            }
        }

        debug!("Created product {} (persistent: {})", id, persistent);
        Ok(product)
    }

    /// Change a product's title.
    ///
    /// No-op when the title is unchanged; otherwise written through when the
    /// product is persistent. A failed write leaves the old title in place.
    pub fn set_title(&self, product: &Product, title: &str) -> Result<()> {
        validate_title(title, &self.config)?;
        self.update_field(product, title.to_string(), |state| &mut state.title)
    }

    /// Change a product's description.
    pub fn set_description(&self, product: &Product, description: &str) -> Result<()> {
        validate_description(description, &self.config)?;
        self.update_field(product, description.to_string(), |state| {
            &mut state.description
        })
    }

    /// Change a product's price.
    pub fn set_price(&self, product: &Product, price: f64) -> Result<()> {
        validate_price(price)?;
        self.update_field(product, price, |state| &mut state.price)
    }

    /// Attach, replace or (with `None`) drop a product's image.
    pub fn set_image_data(&self, product: &Product, image_data: Option<String>) -> Result<()> {
        if let Some(data) = image_data.as_deref() {
            validate_image(data, &self.config)?;
        }
        self.update_field(product, image_data, |state| &mut state.image_data)
    }

    /// Serialize a product to its stored JSON form.
    pub fn serialize(&self, product: &Product) -> Result<String> {
        let state = product.read();
        let image_data = if self.config.include_image_data {
            state.image_data.as_deref()
        } else {
            None
        };
        to_json(&ProductBlob {
            id: product.id().get(),
            title: &state.title,
            description: &state.description,
            price: state.price,
            image_data,
        })
    }

    /// Resolve a serialized product to a live instance.
    ///
    /// The blob is validated exactly as construction validates its arguments,
    /// and its id must be a positive whole number. When a product with that id
    /// is already registered, the registered instance is returned unchanged and
    /// the blob's other fields are ignored. Otherwise a persistent product is
    /// built with the blob's id and registered.
    ///
    /// # Errors
    ///
    /// - `Error::DeserializationError`: not a JSON object of the expected shape
    /// - `Error::InvalidTitle` / `InvalidDescription` / `InvalidPrice` / `InvalidImage`
    /// - `Error::InvalidId`: missing, non-positive or fractional id
    pub fn deserialize(&self, blob: &str) -> Result<Product> {
        let raw: RawProduct = from_json(blob)?;

        let title = raw
            .title
            .ok_or_else(|| Error::InvalidTitle("null title".to_string()))?;
        validate_title(&title, &self.config)?;

        let description = raw
            .description
            .ok_or_else(|| Error::InvalidDescription("null description".to_string()))?;
        validate_description(&description, &self.config)?;

        let price = raw
            .price
            .ok_or_else(|| Error::InvalidPrice("null price".to_string()))?
            .as_f64();
        validate_price(price)?;

        let id = raw
            .id
            .ok_or_else(|| Error::InvalidId("null id".to_string()))
            .and_then(|n| parse_id(n.as_f64()))?;

        if let Some(data) = raw.image_data.as_deref() {
            validate_image(data, &self.config)?;
        }

        let product = Product::new(
            id,
            self.origin,
            ProductState {
                title,
                description,
                price,
                image_data: raw.image_data,
                persistent: true,
            },
        );

        match self.register(&product) {
            Ok(()) => {}
            Err(Error::AlreadyInstantiated { id }) => {
                if let Some(existing) = self.lookup(id) {
                    debug!("Product {} already instantiated, reusing live instance", id);
                    return Ok(existing);
                }
                return Err(Error::AlreadyInstantiated { id });
            }
            Err(e) => return Err(e),
        }

        if let Err(e) = self.raise_counter(id) {
            self.live.remove(&id);
            return Err(e);
        }
        debug!("Deserialized product {}", id);
        Ok(product)
    }

    /// Registered instance for an id, if any.
    pub fn lookup(&self, id: ProductId) -> Option<Product> {
        self.live.get(&id).map(|entry| entry.value().clone())
    }

    /// Storage-backed lookup.
    ///
    /// Returns the registered instance, else deserializes the product stored
    /// under `id`. `Ok(None)` means the product is not in storage.
    pub fn fetch(&self, id: ProductId) -> Result<Option<Product>> {
        if let Some(product) = self.lookup(id) {
            return Ok(Some(product));
        }
        match self.storage.get(&StorageKey::product(id))? {
            Some(blob) => self.deserialize(&blob).map(Some),
            None => Ok(None),
        }
    }

    /// Whether a handle is a genuine product of this registry.
    ///
    /// The handle must have been issued by this registry (or one of its
    /// clones). If an instance is registered under its id, the handle must be
    /// that instance; a detached copy carrying a live id is rejected.
    pub fn is_entity(&self, product: &Product) -> bool {
        if product.origin() != self.origin {
            return false;
        }
        match self.lookup(product.id()) {
            Some(live) => live.same_instance(product),
            None => !product.is_persistent(),
        }
    }

    /// Whether a live instance is registered under `id`.
    pub fn contains(&self, id: ProductId) -> bool {
        self.live.contains_key(&id)
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn register(&self, product: &Product) -> Result<()> {
        match self.live.entry(product.id()) {
            Entry::Occupied(_) => Err(Error::AlreadyInstantiated { id: product.id() }),
            Entry::Vacant(slot) => {
                slot.insert(product.clone());
                Ok(())
            }
        }
    }

    fn update_field<T: PartialEq>(
        &self,
        product: &Product,
        value: T,
        field: impl Fn(&mut ProductState) -> &mut T,
    ) -> Result<()> {
        let previous = {
            let mut state = product.write();
            let slot = field(&mut *state);
            if *slot == value {
                return Ok(());
            }
            std::mem::replace(slot, value)
        };
        if let Err(e) = self.persist(product) {
            *field(&mut *product.write()) = previous;
            warn!("Product {} not saved, change reverted: {}", product.id(), e);
            return Err(e);
        }
        Ok(())
    }

    fn persist(&self, product: &Product) -> Result<()> {
        if !product.is_persistent() {
            return Ok(());
        }
        let blob = self.serialize(product)?;
        self.storage.set(&StorageKey::product(product.id()), blob)?;
        debug!("Saved product {} to storage", product.id());
        Ok(())
    }

    fn read_counter(&self) -> Result<u64> {
        // Missing or unreadable counter starts over at zero
        Ok(self
            .storage
            .get(ID_COUNT_KEY)?
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0))
    }

    fn next_id(&self) -> Result<ProductId> {
        let next = self.read_counter()? + 1;
        self.storage.set(ID_COUNT_KEY, next.to_string())?;
        Ok(ProductId::from(next))
    }

    fn raise_counter(&self, id: ProductId) -> Result<()> {
        if self.read_counter()? < id.get() {
            self.storage.set(ID_COUNT_KEY, id.get().to_string())?;
            debug!("Raised {} to {}", ID_COUNT_KEY, id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryStorage;

    fn registry() -> ProductRegistry<InMemoryStorage> {
        ProductRegistry::new(InMemoryStorage::new())
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        let registry = registry();

        let a = registry
            .create("Widget", "A simple widget", 9.99, false)
            .expect("Failed to create");
        let b = registry
            .create("Gadget", "A simple gadget", 5.0, false)
            .expect("Failed to create");

        assert_eq!(a.id(), ProductId::from(1));
        assert_eq!(b.id(), ProductId::from(2));
        assert_eq!(
            registry.storage().get(ID_COUNT_KEY).expect("Failed to get"),
            Some("2".to_string())
        );
    }

    #[test]
    fn test_create_continues_from_stored_counter() {
        let storage = InMemoryStorage::with_entries([(ID_COUNT_KEY, "41")]);
        let registry = ProductRegistry::new(storage);

        let product = registry
            .create("Widget", "A simple widget", 1.0, false)
            .expect("Failed to create");
        assert_eq!(product.id(), ProductId::from(42));
    }

    #[test]
    fn test_create_with_garbage_counter_starts_at_one() {
        let storage = InMemoryStorage::with_entries([(ID_COUNT_KEY, "not a number")]);
        let registry = ProductRegistry::new(storage);

        let product = registry
            .create("Widget", "A simple widget", 1.0, false)
            .expect("Failed to create");
        assert_eq!(product.id(), ProductId::from(1));
    }

    #[test]
    fn test_create_rejects_invalid_fields_without_consuming_id() {
        let registry = registry();

        assert!(matches!(
            registry.create("ab", "A simple widget", 1.0, false),
            Err(Error::InvalidTitle(_))
        ));
        assert!(matches!(
            registry.create("Widget", "tiny", 1.0, false),
            Err(Error::InvalidDescription(_))
        ));
        assert!(matches!(
            registry.create("Widget", "A simple widget", f64::NAN, false),
            Err(Error::InvalidPrice(_))
        ));

        let product = registry
            .create("Widget", "A simple widget", 1.0, false)
            .expect("Failed to create");
        assert_eq!(product.id(), ProductId::from(1));
    }

    #[test]
    fn test_persistent_create_registers_and_writes() {
        let registry = registry();

        let product = registry
            .create("Widget", "A simple widget", 9.99, true)
            .expect("Failed to create");

        let stored = registry
            .storage()
            .get("1")
            .expect("Failed to get")
            .expect("Product not stored");
        assert_eq!(
            stored,
            r#"{"id":1,"title":"Widget","description":"A simple widget","price":9.99}"#
        );
        assert!(registry
            .lookup(product.id())
            .expect("Not registered")
            .same_instance(&product));
    }

    #[test]
    fn test_transient_create_is_not_registered() {
        let registry = registry();

        let product = registry
            .create("Widget", "A simple widget", 9.99, false)
            .expect("Failed to create");

        assert!(registry.lookup(product.id()).is_none());
        assert!(registry.storage().get("1").expect("Failed to get").is_none());
    }

    #[test]
    fn test_setters_write_through() {
        let registry = registry();
        let product = registry
            .create("Widget", "A simple widget", 9.99, true)
            .expect("Failed to create");

        registry
            .set_title(&product, "Widget Pro")
            .expect("Failed to set title");
        registry
            .set_description(&product, "A better widget")
            .expect("Failed to set description");
        registry.set_price(&product, 19.5).expect("Failed to set price");

        let stored = registry
            .storage()
            .get("1")
            .expect("Failed to get")
            .expect("Product not stored");
        assert_eq!(
            stored,
            r#"{"id":1,"title":"Widget Pro","description":"A better widget","price":19.5}"#
        );
    }

    #[test]
    fn test_setter_validation_keeps_old_value() {
        let registry = registry();
        let product = registry
            .create("Widget", "A simple widget", 9.99, true)
            .expect("Failed to create");

        assert!(matches!(
            registry.set_title(&product, "x"),
            Err(Error::InvalidTitle(_))
        ));
        assert!(matches!(
            registry.set_price(&product, f64::NAN),
            Err(Error::InvalidPrice(_))
        ));
        assert_eq!(product.title(), "Widget");
        assert_eq!(product.price(), 9.99);
    }

    #[test]
    fn test_unchanged_setter_skips_write() {
        let registry = registry();
        let product = registry
            .create("Widget", "A simple widget", 9.99, true)
            .expect("Failed to create");

        // Clobber the stored body; an unchanged set must not rewrite it
        registry
            .storage()
            .set("1", "sentinel".to_string())
            .expect("Failed to set");

        registry
            .set_title(&product, "Widget")
            .expect("Failed to set title");
        registry.set_price(&product, 9.99).expect("Failed to set price");

        assert_eq!(
            registry.storage().get("1").expect("Failed to get"),
            Some("sentinel".to_string())
        );
    }

    #[test]
    fn test_transient_setter_does_not_write() {
        let registry = registry();
        let product = registry
            .create("Widget", "A simple widget", 9.99, false)
            .expect("Failed to create");

        registry
            .set_title(&product, "Widget Pro")
            .expect("Failed to set title");

        assert_eq!(product.title(), "Widget Pro");
        assert!(registry.storage().get("1").expect("Failed to get").is_none());
    }

    #[test]
    fn test_image_data() {
        let config = CatalogConfig::default().with_image_max_bytes(32);
        let registry =
            ProductRegistry::with_config(InMemoryStorage::new(), config).expect("Bad config");
        let product = registry
            .create("Widget", "A simple widget", 9.99, true)
            .expect("Failed to create");

        registry
            .set_image_data(&product, Some("data:image/png;base64,AA==".to_string()))
            .expect("Failed to set image");
        assert!(registry
            .serialize(&product)
            .expect("Failed to serialize")
            .contains("imageData"));

        assert!(matches!(
            registry.set_image_data(&product, Some("x".repeat(33))),
            Err(Error::InvalidImage(_))
        ));

        registry
            .set_image_data(&product, None)
            .expect("Failed to clear image");
        assert_eq!(product.image_data(), None);
    }

    #[test]
    fn test_serialize_can_exclude_image_data() {
        let config = CatalogConfig::default().with_image_data(false);
        let registry =
            ProductRegistry::with_config(InMemoryStorage::new(), config).expect("Bad config");
        let product = registry
            .create("Widget", "A simple widget", 9.99, false)
            .expect("Failed to create");
        registry
            .set_image_data(&product, Some("data:,x".to_string()))
            .expect("Failed to set image");

        let blob = registry.serialize(&product).expect("Failed to serialize");
        assert!(!blob.contains("imageData"));
    }

    #[test]
    fn test_deserialize_round_trip_in_fresh_registry() {
        let source = registry();
        let product = source
            .create("Widget", "A simple widget", 9.99, false)
            .expect("Failed to create");
        source
            .set_image_data(&product, Some("data:image/gif;base64,R0lG".to_string()))
            .expect("Failed to set image");
        let blob = source.serialize(&product).expect("Failed to serialize");

        let target = registry();
        let restored = target.deserialize(&blob).expect("Failed to deserialize");

        assert_eq!(restored.id(), product.id());
        assert_eq!(restored.summary(), product.summary());
        assert_eq!(restored.image_data(), product.image_data());
        assert!(restored.is_persistent());
        assert!(target.contains(product.id()));
    }

    #[test]
    fn test_deserialize_dedups_by_id() {
        let registry = registry();

        let first = registry
            .deserialize(r#"{"id":5,"title":"Widget","description":"A simple widget","price":1}"#)
            .expect("Failed to deserialize");
        let second = registry
            .deserialize(r#"{"id":5,"title":"Other","description":"Different body","price":2}"#)
            .expect("Failed to deserialize");

        assert!(first.same_instance(&second));
        assert_eq!(second.title(), "Widget");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_deserialize_returns_created_instance() {
        let registry = registry();
        let product = registry
            .create("Widget", "A simple widget", 9.99, true)
            .expect("Failed to create");
        let blob = registry.serialize(&product).expect("Failed to serialize");

        let again = registry.deserialize(&blob).expect("Failed to deserialize");
        assert!(again.same_instance(&product));
    }

    #[test]
    fn test_deserialize_validation() {
        let registry = registry();
        let cases = [
            (
                r#"{"id":1,"description":"A simple widget","price":1}"#,
                "invalid-title",
            ),
            (
                r#"{"id":1,"title":"Widget","description":"tiny","price":1}"#,
                "invalid-description",
            ),
            (
                r#"{"id":1,"title":"Widget","description":"A simple widget"}"#,
                "invalid-price",
            ),
            (
                r#"{"id":1,"title":"Widget","description":"A simple widget","price":"abc"}"#,
                "invalid-price",
            ),
            (
                r#"{"title":"Widget","description":"A simple widget","price":1}"#,
                "invalid-id",
            ),
            (
                r#"{"id":0,"title":"Widget","description":"A simple widget","price":1}"#,
                "invalid-id",
            ),
            (
                r#"{"id":-2,"title":"Widget","description":"A simple widget","price":1}"#,
                "invalid-id",
            ),
            (
                r#"{"id":"x","title":"Widget","description":"A simple widget","price":1}"#,
                "invalid-id",
            ),
            ("not json", "deserialization"),
        ];

        for (blob, kind) in cases {
            let err = registry.deserialize(blob).expect_err(blob);
            assert_eq!(err.kind(), kind, "{}", blob);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_deserialize_accepts_numeric_strings() {
        let registry = registry();
        let product = registry
            .deserialize(r#"{"id":"3","title":"Widget","description":"A simple widget","price":"12.5"}"#)
            .expect("Failed to deserialize");
        assert_eq!(product.id(), ProductId::from(3));
        assert_eq!(product.price(), 12.5);
    }

    #[test]
    fn test_deserialize_raises_counter() {
        let registry = registry();
        registry
            .deserialize(r#"{"id":10,"title":"Widget","description":"A simple widget","price":1}"#)
            .expect("Failed to deserialize");

        let fresh = registry
            .create("Gadget", "A simple gadget", 1.0, true)
            .expect("Failed to create");
        assert_eq!(fresh.id(), ProductId::from(11));
    }

    #[test]
    fn test_fetch() {
        let storage = InMemoryStorage::with_entries([(
            "4",
            r#"{"id":4,"title":"Widget","description":"A simple widget","price":2}"#,
        )]);
        let registry = ProductRegistry::new(storage);

        let fetched = registry
            .fetch(ProductId::from(4))
            .expect("Failed to fetch")
            .expect("Product missing");
        let again = registry
            .fetch(ProductId::from(4))
            .expect("Failed to fetch")
            .expect("Product missing");
        assert!(fetched.same_instance(&again));

        assert!(registry
            .fetch(ProductId::from(99))
            .expect("Failed to fetch")
            .is_none());
    }

    #[test]
    fn test_is_entity() {
        let registry = registry();
        let other = ProductRegistry::new(registry.storage().clone());

        let persistent = registry
            .create("Widget", "A simple widget", 1.0, true)
            .expect("Failed to create");
        let transient = registry
            .create("Gadget", "A simple gadget", 1.0, false)
            .expect("Failed to create");
        let foreign = other
            .create("Gizmo", "A simple gizmo", 1.0, false)
            .expect("Failed to create");

        assert!(registry.is_entity(&persistent));
        assert!(registry.is_entity(&transient));
        assert!(registry.clone().is_entity(&persistent));
        assert!(!registry.is_entity(&foreign));
        assert!(!other.is_entity(&persistent));
    }

    #[test]
    fn test_with_config_rejects_invalid_config() {
        let config = CatalogConfig::default().with_title_bounds(5, 1);
        assert!(matches!(
            ProductRegistry::with_config(InMemoryStorage::new(), config),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_custom_bounds() {
        let config = CatalogConfig::default().with_title_bounds(1, 4);
        let registry =
            ProductRegistry::with_config(InMemoryStorage::new(), config).expect("Bad config");

        assert!(registry.create("A", "A simple widget", 1.0, false).is_ok());
        assert!(registry.create("ABCD", "A simple widget", 1.0, false).is_ok());
        assert!(matches!(
            registry.create("ABCDE", "A simple widget", 1.0, false),
            Err(Error::InvalidTitle(_))
        ));
    }
}
