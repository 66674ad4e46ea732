//! Inventory summary metrics for the dashboard.
//!
//! Everything is recomputed from the full collection on each request; there
//! is no incremental state to keep consistent.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::product::Product;

/// Fewer units than this counts as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 10;
/// Fewer units than this counts as critical stock.
pub const CRITICAL_STOCK_THRESHOLD: i64 = 5;
const TOP_LIST_LEN: usize = 5;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    pub total_products: usize,
    pub total_value: Decimal,
    pub active_products: usize,
    pub low_stock: usize,
    pub products_by_category: BTreeMap<String, usize>,
    pub stock_by_category: BTreeMap<String, i64>,
    pub top_priced: Vec<Product>,
    pub top_stock: Vec<Product>,
    pub critical_stock: Vec<Product>,
}

pub fn compute_stats(products: &[Product]) -> InventoryStats {
    let mut stats = InventoryStats {
        total_products: products.len(),
        ..InventoryStats::default()
    };

    for product in products {
        stats.total_value += product.price * Decimal::from(product.stock);
        if product.active {
            stats.active_products += 1;
        }
        if product.stock < LOW_STOCK_THRESHOLD {
            stats.low_stock += 1;
        }

        let label = product.category_label().to_string();
        *stats.products_by_category.entry(label.clone()).or_insert(0) += 1;
        *stats.stock_by_category.entry(label).or_insert(0) += product.stock;
    }

    stats.top_priced = top_by(products, |a, b| b.price.cmp(&a.price));
    stats.top_stock = top_by(products, |a, b| b.stock.cmp(&a.stock));

    let mut critical: Vec<Product> = products
        .iter()
        .filter(|p| p.stock < CRITICAL_STOCK_THRESHOLD)
        .cloned()
        .collect();
    critical.sort_by_key(|p| p.stock);
    stats.critical_stock = critical;

    stats
}

/// Top five under a stable descending order; ties keep collection order.
fn top_by(
    products: &[Product],
    compare: impl Fn(&Product, &Product) -> std::cmp::Ordering,
) -> Vec<Product> {
    let mut sorted = products.to_vec();
    sorted.sort_by(compare);
    sorted.truncate(TOP_LIST_LEN);
    sorted
}
