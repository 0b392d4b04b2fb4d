//! Type definitions for the distribution core

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod directory;

/// Lifecycle state shared by vendors, drivers and products.
///
/// Records never leave the store; retiring one flips it to `Inactive` so
/// history stays intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    /// In use.
    #[default]
    Active,
    /// Retired; kept for historical orders.
    Inactive,
}

impl EntityStatus {
    /// Whether the record is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Business configuration applied to new records and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErpConfig {
    /// ISO currency code for monetary fields.
    pub currency:                  String,
    /// Tax percentage applied when an order does not specify one (GST).
    pub default_tax_percent:       Decimal,
    /// Bag weight in kilograms applied to new products.
    pub default_weight_per_bag:    Decimal,
    /// Reorder level applied to new products.
    pub default_reorder_level:     u32,
    /// Stock threshold below which dashboard alerts fire.
    pub low_stock_alert_threshold: u32,
    /// Prefix for generated order numbers.
    pub order_number_prefix:       String,
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            currency:                  "INR".to_string(),
            default_tax_percent:       Decimal::new(1800, 2),
            default_weight_per_bag:    Decimal::new(5000, 2),
            default_reorder_level:     100,
            low_stock_alert_threshold: 500,
            order_number_prefix:       "ORD".to_string(),
        }
    }
}
