//! Cart cost computation.
//!
//! The base cost is the sum of `price × quantity` over all lines. Shipping is a
//! flat percentage of the base cost, and the total is base plus shipping.

use crate::entity::ProductId;
use crate::list::ListEntry;
use serde::Serialize;

/// Cost of a single list line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineCost {
    pub id: ProductId,
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub subtotal: f64,
}

impl LineCost {
    pub fn from_entry(entry: &ListEntry) -> Self {
        LineCost {
            id: entry.product.id,
            title: entry.product.title.clone(),
            quantity: entry.quantity,
            unit_price: entry.product.price,
            subtotal: entry.product.price * f64::from(entry.quantity),
        }
    }
}

/// Base, shipping and total cost of a list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct CostSummary {
    pub base: f64,
    pub shipping: f64,
    pub total: f64,
}

impl CostSummary {
    /// Compute costs for a list snapshot.
    ///
    /// # Example
    ///
    /// ```
    /// use shop_kit::cost::CostSummary;
    ///
    /// let empty = CostSummary::compute(&[], 5.0);
    /// assert_eq!(empty.total, 0.0);
    /// ```
    pub fn compute(entries: &[ListEntry], shipping_tax_percent: f64) -> Self {
        let base: f64 = entries
            .iter()
            .map(|entry| LineCost::from_entry(entry).subtotal)
            .sum();
        let shipping = base * shipping_tax_percent / 100.0;

        CostSummary {
            base,
            shipping,
            total: base + shipping,
        }
    }
}

/// Per-line costs in list order.
pub fn line_costs(entries: &[ListEntry]) -> Vec<LineCost> {
    entries.iter().map(LineCost::from_entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ProductSummary;

    fn entry(id: u64, price: f64, quantity: u32) -> ListEntry {
        ListEntry {
            quantity,
            product: ProductSummary {
                id: ProductId::from(id),
                title: format!("Product {}", id),
                description: "Test product".to_string(),
                price,
            },
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_cart_costs_nothing() {
        assert_eq!(CostSummary::compute(&[], 5.0), CostSummary::default());
    }

    #[test]
    fn test_cost_summary() {
        let entries = vec![entry(1, 10.0, 2), entry(2, 199.0, 1)];

        let summary = CostSummary::compute(&entries, 5.0);

        assert!(approx(summary.base, 219.0));
        assert!(approx(summary.shipping, 10.95));
        assert!(approx(summary.total, 229.95));
    }

    #[test]
    fn test_zero_shipping_tax() {
        let summary = CostSummary::compute(&[entry(1, 4.5, 2)], 0.0);
        assert!(approx(summary.base, 9.0));
        assert_eq!(summary.shipping, 0.0);
        assert!(approx(summary.total, 9.0));
    }

    #[test]
    fn test_line_costs() {
        let lines = line_costs(&[entry(1, 2.5, 4), entry(2, 1.0, 1)]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].id, ProductId::from(1));
        assert_eq!(lines[0].unit_price, 2.5);
        assert!(approx(lines[0].subtotal, 10.0));
        assert!(approx(lines[1].subtotal, 1.0));
    }
}
