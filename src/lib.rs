//! # shop-kit
//!
//! Validated product catalog and shopping cart core with pluggable
//! key-value persistence.
//!
//! ## Features
//!
//! - **Validated entities:** Title, description and price are checked on
//!   construction, on every setter and on deserialization
//! - **Unique identity:** Product ids come from a counter kept in storage, so
//!   they survive restarts
//! - **Deduplication:** Deserializing an id that is already live returns the
//!   live instance, never a second copy
//! - **Backend Agnostic:** Any string key-value store implementing [`Storage`];
//!   [`InMemoryStorage`](backend::InMemoryStorage) ships by default
//! - **Write-through:** Persistent products and lists are saved on every change
//!
//! ## Quick Start
//!
//! ```
//! use shop_kit::{backend::InMemoryStorage, ProductList, ProductRegistry};
//!
//! # fn main() -> shop_kit::Result<()> {
//! // 1. One registry per session, backed by an injected store
//! let registry = ProductRegistry::new(InMemoryStorage::new());
//!
//! // 2. Create products
//! let widget = registry.create("Widget", "A simple widget", 9.99, true)?;
//!
//! // 3. Keep them in lists
//! let mut cart = ProductList::new("ShoppingCartList", &registry, true);
//! cart.add(&widget, 2)?;
//!
//! let entries = cart.list();
//! assert_eq!(entries[0].quantity, 2);
//! assert_eq!(entries[0].product.title, "Widget");
//! # Ok(())
//! # }
//! ```
//!
//! For a catalog plus cart restored from storage in one call, see [`Shop`].

#[macro_use]
extern crate log;

pub mod backend;
pub mod config;
pub mod cost;
pub mod entity;
pub mod error;
pub mod key;
pub mod list;
pub mod quantity;
pub mod reconcile;
pub mod registry;
mod serialization;
pub mod session;
pub mod validation;

// Re-exports for convenience
pub use backend::Storage;
pub use config::CatalogConfig;
pub use cost::CostSummary;
pub use entity::{Product, ProductId, ProductSummary};
pub use error::{Error, Result};
pub use list::{ListEntry, ProductList};
pub use quantity::{IntoQuantity, Quantity};
pub use reconcile::{reconcile, ReconcileReport};
pub use registry::ProductRegistry;
pub use session::Shop;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
