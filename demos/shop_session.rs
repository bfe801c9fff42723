//! Shop session walkthrough.
//!
//! Creates a catalog, fills a cart, prints its cost, then reopens the shop
//! from the same storage to show persistence and reconciliation.
//!
//! Run with: cargo run --example shop_session

use shop_kit::backend::InMemoryStorage;
use shop_kit::cost::line_costs;
use shop_kit::{CatalogConfig, Result, Shop};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .ok();

    println!("\n=== shop-kit - Shop Session ===\n");

    let storage = InMemoryStorage::new();
    let config = CatalogConfig::default();

    // 1. Fill the catalog
    println!("1. Creating catalog...");
    let mut shop = Shop::open(storage.clone(), config.clone())?;
    let widget = shop.create_product("Widget", "A simple widget", 9.99)?;
    let gadget = shop.create_product("Gadget", "A gadget with a long battery life", 24.5)?;
    let gizmo = shop.create_product("Gizmo", "Does a little bit of everything", 3.25)?;
    for entry in shop.catalog().list() {
        println!("    #{} {} (${})", entry.product.id, entry.product.title, entry.product.price);
    }

    // 2. Fill the cart
    println!("\n2. Adding to cart...");
    shop.add_to_cart(widget.id(), 2)?;
    shop.add_to_cart(gadget.id(), 1)?;
    shop.add_to_cart(widget.id(), 1)?;
    for line in line_costs(&shop.cart().list()) {
        println!("    {} x{} = ${:.2}", line.title, line.quantity, line.subtotal);
    }

    let summary = shop.cost_summary();
    println!("    Products cost: ${:.2}", summary.base);
    println!("    Shipping cost: ${:.2}", summary.shipping);
    println!("    Total cost:    ${:.2}", summary.total);

    // 3. Invalid input is rejected, state unchanged
    println!("\n3. Rejecting invalid quantity...");
    match shop.cart_mut().update_quantity(widget.id(), 0) {
        Err(e) => println!("    ✓ {} ({})", e, e.kind()),
        Ok(_) => println!("    ✗ zero quantity accepted"),
    }

    // 4. Delete from the catalog and reopen
    println!("\n4. Deleting {} from catalog and reopening...", gizmo.title());
    shop.delete_product(gizmo.id())?;
    drop(shop);

    let shop = Shop::open(storage.clone(), config)?;
    println!(
        "    Catalog: {} products, cart: {} lines",
        shop.catalog().len(),
        shop.cart().len()
    );
    println!(
        "    Reconcile removed: {:?}",
        shop.startup_report().removed
    );
    storage.log_stats();

    println!("\n=== Done ===\n");
    Ok(())
}
