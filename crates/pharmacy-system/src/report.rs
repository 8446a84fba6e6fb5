//! # Reports
//!
//! Read-only summaries over drugs and purchases. Every function here is
//! pure; `Pharmacy` feeds them its in-memory state.
//!
//! Revenue is computed from the unit price stored on each purchase, so
//! repricing a drug never rewrites history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pharmacy_core::lookup::search_low_stock;
use pharmacy_core::{Drug, Purchase};

/// Sum of `unit_price × quantity` over all purchases.
pub fn total_revenue(purchases: &[Purchase]) -> f64 {
    purchases.iter().map(Purchase::total_cost).sum()
}

/// Sum of one customer's purchases. Unknown customers spent 0.
pub fn customer_total_spent(purchases: &[Purchase], customer_id: &str) -> f64 {
    purchases
        .iter()
        .filter(|p| p.customer_id == customer_id)
        .map(Purchase::total_cost)
        .sum()
}

/// Drug key → units in stock, ordered by key.
pub fn inventory_status(drugs: &[Drug]) -> BTreeMap<String, u32> {
    drugs.iter().map(|d| (d.id.clone(), d.stock)).collect()
}

/// Drugs with stock strictly below `threshold`, in catalog order.
pub fn low_stock(drugs: &[Drug], threshold: u32) -> Vec<&Drug> {
    search_low_stock(drugs, threshold)
}

/// Point-in-time inventory and sales summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryReport {
    pub generated_at: DateTime<Utc>,
    pub drug_count: usize,
    /// Units across all drugs.
    pub total_units: u64,
    /// Σ stock × current price.
    pub inventory_value: f64,
    pub low_stock_threshold: u32,
    /// Keys of low-stock drugs, catalog order.
    pub low_stock_ids: Vec<String>,
    pub purchase_count: usize,
    pub total_revenue: f64,
}

impl InventoryReport {
    pub fn build(drugs: &[Drug], purchases: &[Purchase], low_stock_threshold: u32) -> Self {
        InventoryReport {
            generated_at: Utc::now(),
            drug_count: drugs.len(),
            total_units: drugs.iter().map(|d| u64::from(d.stock)).sum(),
            inventory_value: drugs.iter().map(|d| d.price * f64::from(d.stock)).sum(),
            low_stock_threshold,
            low_stock_ids: low_stock(drugs, low_stock_threshold)
                .into_iter()
                .map(|d| d.id.clone())
                .collect(),
            purchase_count: purchases.len(),
            total_revenue: total_revenue(purchases),
        }
    }
}
