//! High-level shop session: catalog, cart and startup reconciliation.
//!
//! Wraps one [`ProductRegistry`] and the two persistent lists the shop works
//! with, and restores them in the required order: load every list, then
//! reconcile storage once.

use crate::backend::Storage;
use crate::config::CatalogConfig;
use crate::cost::CostSummary;
use crate::entity::{Product, ProductId};
use crate::error::Result;
use crate::list::ProductList;
use crate::quantity::{IntoQuantity, Quantity};
use crate::reconcile::{reconcile, ReconcileReport};
use crate::registry::ProductRegistry;

/// Storage key of the product catalog list.
pub const CATALOG_LIST: &str = "ProductsList";
/// Storage key of the shopping cart list.
pub const CART_LIST: &str = "ShoppingCartList";

/// A product catalog and shopping cart sharing one registry and store.
///
/// # Example
///
/// ```
/// use shop_kit::{backend::InMemoryStorage, CatalogConfig, Shop};
///
/// # fn main() -> shop_kit::Result<()> {
/// let storage = InMemoryStorage::new();
/// let mut shop = Shop::open(storage.clone(), CatalogConfig::default())?;
///
/// let widget = shop.create_product("Widget", "A simple widget", 10.0)?;
/// shop.add_to_cart(widget.id(), 2)?;
/// assert_eq!(shop.cost_summary().base, 20.0);
///
/// // Reopening restores both lists from storage
/// let reopened = Shop::open(storage, CatalogConfig::default())?;
/// assert_eq!(reopened.cart().quantity(widget.id()), Some(2));
/// # Ok(())
/// # }
/// ```
pub struct Shop<S: Storage> {
    registry: ProductRegistry<S>,
    catalog: ProductList<S>,
    cart: ProductList<S>,
    startup_report: ReconcileReport,
}

impl<S: Storage> Shop<S> {
    /// Restore the catalog and cart from storage, then reconcile.
    ///
    /// # Errors
    ///
    /// - `Error::ConfigError`: invalid configuration
    /// - `Error::DeserializationError`: a stored list index is malformed
    /// - `Error::StorageError`: storage could not be read or written
    pub fn open(storage: S, config: CatalogConfig) -> Result<Self> {
        let registry = ProductRegistry::with_config(storage, config)?;
        let catalog = ProductList::load(CATALOG_LIST, &registry)?;
        let cart = ProductList::load(CART_LIST, &registry)?;
        let startup_report = reconcile(&registry, &[CATALOG_LIST, CART_LIST])?;

        info!(
            "Opened shop: {} products in catalog, {} in cart",
            catalog.len(),
            cart.len()
        );

        Ok(Shop {
            registry,
            catalog,
            cart,
            startup_report,
        })
    }

    pub fn registry(&self) -> &ProductRegistry<S> {
        &self.registry
    }

    pub fn catalog(&self) -> &ProductList<S> {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut ProductList<S> {
        &mut self.catalog
    }

    pub fn cart(&self) -> &ProductList<S> {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut ProductList<S> {
        &mut self.cart
    }

    /// Reconciliation result from [`open`](Self::open).
    pub fn startup_report(&self) -> &ReconcileReport {
        &self.startup_report
    }

    /// Create a persistent product and list it in the catalog.
    pub fn create_product(&mut self, title: &str, description: &str, price: f64) -> Result<Product> {
        let product = self.registry.create(title, description, price, true)?;
        self.catalog.add(&product, 1)?;
        Ok(product)
    }

    /// Update all editable fields of a catalog product.
    ///
    /// Returns `None` when the id is not in the catalog. Fields are applied in
    /// order and the first invalid one aborts the rest; earlier fields stay
    /// changed.
    pub fn update_product(
        &mut self,
        id: ProductId,
        title: &str,
        description: &str,
        price: f64,
    ) -> Result<Option<Product>> {
        let Some(product) = self.catalog.get(id) else {
            debug!("Could not find product with id {} in catalog", id);
            return Ok(None);
        };
        self.registry.set_title(&product, title)?;
        self.registry.set_description(&product, description)?;
        self.registry.set_price(&product, price)?;
        Ok(Some(product))
    }

    /// Remove a product from the catalog.
    ///
    /// The cart keeps its line; the stored body goes away at the next
    /// startup reconciliation once nothing references it.
    pub fn delete_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        self.catalog.remove(id)
    }

    /// Put a catalog product in the cart, adding to any quantity already there.
    ///
    /// Returns the cart quantity, or `None` when the id is not in the catalog.
    pub fn add_to_cart<Q: IntoQuantity>(
        &mut self,
        id: ProductId,
        quantity: Q,
    ) -> Result<Option<Quantity>> {
        let quantity = quantity.into_quantity()?;
        let Some(product) = self.catalog.get(id) else {
            debug!("Could not find product with id {} in catalog", id);
            return Ok(None);
        };
        self.cart.add_or_increment(&product, quantity).map(Some)
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) -> Result<()> {
        self.cart.clear()
    }

    /// Cost of the cart contents.
    pub fn cost_summary(&self) -> CostSummary {
        self.cart.cost_summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryStorage;

    fn open(storage: &InMemoryStorage) -> Shop<InMemoryStorage> {
        Shop::open(storage.clone(), CatalogConfig::default()).expect("Failed to open shop")
    }

    #[test]
    fn test_open_empty_storage() {
        let shop = open(&InMemoryStorage::new());
        assert!(shop.catalog().is_empty());
        assert!(shop.cart().is_empty());
        assert_eq!(shop.catalog().name(), CATALOG_LIST);
        assert_eq!(shop.cart().name(), CART_LIST);
    }

    #[test]
    fn test_create_and_add_to_cart() {
        let mut shop = open(&InMemoryStorage::new());
        let widget = shop
            .create_product("Widget", "A simple widget", 10.0)
            .expect("Failed to create");

        assert_eq!(shop.catalog().quantity(widget.id()), Some(1));

        shop.add_to_cart(widget.id(), 2).expect("Failed to add");
        shop.add_to_cart(widget.id(), 1).expect("Failed to add");
        assert_eq!(shop.cart().quantity(widget.id()), Some(3));

        let summary = shop.cost_summary();
        assert!((summary.base - 30.0).abs() < 1e-9);
        assert!((summary.shipping - 1.5).abs() < 1e-9);
        assert!((summary.total - 31.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_catalog_id_is_a_miss() {
        let mut shop = open(&InMemoryStorage::new());

        assert_eq!(
            shop.add_to_cart(ProductId::from(5), 1).expect("Miss is not an error"),
            None
        );
        assert!(shop
            .update_product(ProductId::from(5), "Widget", "A simple widget", 1.0)
            .expect("Miss is not an error")
            .is_none());
        assert!(shop.cart().is_empty());

        // Quantity is still checked first
        assert!(matches!(
            shop.add_to_cart(ProductId::from(5), 0),
            Err(crate::Error::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_update_product() {
        let mut shop = open(&InMemoryStorage::new());
        let widget = shop
            .create_product("Widget", "A simple widget", 10.0)
            .expect("Failed to create");
        shop.add_to_cart(widget.id(), 1).expect("Failed to add");

        let updated = shop
            .update_product(widget.id(), "Widget Pro", "A better widget", 12.0)
            .expect("Failed to update")
            .expect("Product missing from catalog");
        assert!(updated.same_instance(&widget));

        assert_eq!(shop.cart().list()[0].product.title, "Widget Pro");
        assert_eq!(shop.cart().list()[0].product.price, 12.0);
    }

    #[test]
    fn test_reopen_restores_state() {
        let storage = InMemoryStorage::new();
        let widget_id = {
            let mut shop = open(&storage);
            let widget = shop
                .create_product("Widget", "A simple widget", 10.0)
                .expect("Failed to create");
            shop.add_to_cart(widget.id(), 4).expect("Failed to add");
            widget.id()
        };

        let shop = open(&storage);
        assert_eq!(shop.catalog().ids(), vec![widget_id]);
        assert_eq!(shop.cart().quantity(widget_id), Some(4));
        assert!(shop.startup_report().removed.is_empty());

        // Both lists resolve to the same live instance
        let in_catalog = shop.catalog().get(widget_id).expect("Missing in catalog");
        let in_cart = shop.cart().get(widget_id).expect("Missing in cart");
        assert!(in_catalog.same_instance(&in_cart));
    }

    #[test]
    fn test_deleted_product_is_reconciled_on_reopen() {
        let storage = InMemoryStorage::new();
        let widget_id = {
            let mut shop = open(&storage);
            let widget = shop
                .create_product("Widget", "A simple widget", 10.0)
                .expect("Failed to create");
            shop.delete_product(widget.id()).expect("Failed to delete");
            widget.id()
        };
        assert!(storage.contains(&widget_id.to_string()).expect("Failed to check"));

        let shop = open(&storage);
        assert!(shop.catalog().is_empty());
        assert_eq!(shop.startup_report().removed, vec![widget_id.to_string()]);
        assert!(!storage.contains(&widget_id.to_string()).expect("Failed to check"));
    }

    #[test]
    fn test_clear_cart() {
        let mut shop = open(&InMemoryStorage::new());
        let widget = shop
            .create_product("Widget", "A simple widget", 10.0)
            .expect("Failed to create");
        shop.add_to_cart(widget.id(), 1).expect("Failed to add");

        shop.clear_cart().expect("Failed to clear");

        assert!(shop.cart().is_empty());
        assert_eq!(shop.cost_summary(), CostSummary::default());
    }
}
