//! Storage reconciliation.
//!
//! Product bodies outlive the lists that referenced them: removing a product
//! from a list never deletes its stored body. After the lists are rehydrated
//! at startup, every product still referenced is registered, so any product
//! key without a live instance is garbage and can be removed.

use crate::backend::Storage;
use crate::error::Result;
use crate::key::{KeyKind, StorageKey};
use crate::registry::ProductRegistry;

/// Outcome of a reconciliation sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Keys inspected.
    pub scanned: usize,
    /// Product keys kept because a live instance exists.
    pub kept: usize,
    /// Counter, list and foreign keys left untouched.
    pub skipped: usize,
    /// Product keys removed, ascending by id.
    pub removed: Vec<String>,
}

/// Remove stored products that have no live registered instance.
///
/// Skips the id counter, the named lists, and keys that are not product ids.
/// Run once after every list has been loaded; running it earlier deletes
/// products that an unloaded list still references.
pub fn reconcile<S: Storage>(
    registry: &ProductRegistry<S>,
    list_names: &[&str],
) -> Result<ReconcileReport> {
    let keys = registry.storage().keys()?;
    let mut report = ReconcileReport {
        scanned: keys.len(),
        ..ReconcileReport::default()
    };

    let mut orphans = Vec::new();
    for key in &keys {
        match StorageKey::classify(key, list_names) {
            KeyKind::Product(id) if registry.contains(id) => report.kept += 1,
            KeyKind::Product(id) => orphans.push(id),
            KeyKind::Counter | KeyKind::List | KeyKind::Foreign => report.skipped += 1,
        }
    }

    orphans.sort();
    report.removed = orphans.into_iter().map(StorageKey::product).collect();

    if !report.removed.is_empty() {
        let keys: Vec<&str> = report.removed.iter().map(String::as_str).collect();
        registry.storage().remove_many(&keys)?;
        warn!(
            "Reconcile removed {} orphaned products: {}",
            report.removed.len(),
            report.removed.join(", ")
        );
    }

    info!(
        "Reconcile scanned {} keys: {} kept, {} skipped, {} removed",
        report.scanned,
        report.kept,
        report.skipped,
        report.removed.len()
    );
    Ok(report)
}
