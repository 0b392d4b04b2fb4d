//! # Catalog Types
//!
//! Type definitions for cement products and the warehouse stock ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EntityStatus;

// ============================================================================
// IDENTIFIERS & GRADE
// ============================================================================

/// Unique product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub Uuid);

impl ProductId {
    /// Wraps an existing UUID.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a new unique product ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cement grade classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CementGrade {
    /// OPC grade 33.
    Grade33,
    /// OPC grade 43.
    Grade43,
    /// OPC grade 53.
    Grade53,
    /// Portland Pozzolana Cement.
    Ppc,
    /// Portland Slag Cement.
    Psc,
}

impl CementGrade {
    /// Short grade code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Grade33 => "33",
            Self::Grade43 => "43",
            Self::Grade53 => "53",
            Self::Ppc => "PPC",
            Self::Psc => "PSC",
        }
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Grade33 => "Grade 33",
            Self::Grade43 => "Grade 43",
            Self::Grade53 => "Grade 53",
            Self::Ppc => "Portland Pozzolana Cement",
            Self::Psc => "Portland Slag Cement",
        }
    }

    /// Parses a short grade code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "33" => Some(Self::Grade33),
            "43" => Some(Self::Grade43),
            "53" => Some(Self::Grade53),
            "PPC" => Some(Self::Ppc),
            "PSC" => Some(Self::Psc),
            _ => None,
        }
    }

    /// All known grades.
    #[must_use]
    pub fn all() -> [Self; 5] {
        [Self::Grade33, Self::Grade43, Self::Grade53, Self::Ppc, Self::Psc]
    }
}

impl std::fmt::Display for CementGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// PRODUCT
// ============================================================================

/// Cement product with its current warehouse stock level.
///
/// `stock_quantity` is only ever mutated through the warehouse ledger, so it
/// cannot go negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id:             ProductId,
    /// Product name.
    pub name:           String,
    /// Cement grade.
    pub grade:          CementGrade,
    /// Bag weight in kilograms.
    pub weight_per_bag: Decimal,
    /// Selling price per bag.
    pub price_per_bag:  Decimal,
    /// Bags currently in stock.
    pub stock_quantity: u32,
    /// Stock threshold at or below which the product is flagged low-stock.
    pub reorder_level:  u32,
    /// Lifecycle state.
    pub status:         EntityStatus,
    /// Creation timestamp.
    pub created_at:     DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at:     DateTime<Utc>,
}

impl Product {
    /// Creates a new active product with the standard 50 kg bag and a
    /// reorder level of 100 bags.
    #[must_use]
    pub fn new(name: impl Into<String>, grade: CementGrade, price_per_bag: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::generate(),
            name: name.into(),
            grade,
            weight_per_bag: Decimal::new(5000, 2),
            price_per_bag,
            stock_quantity: 0,
            reorder_level: 100,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the opening stock.
    #[must_use]
    pub fn with_initial_stock(mut self, bags: u32) -> Self {
        self.stock_quantity = bags;
        self
    }

    /// Sets the bag weight.
    #[must_use]
    pub fn with_weight_per_bag(mut self, weight: Decimal) -> Self {
        self.weight_per_bag = weight;
        self
    }

    /// Sets the reorder level.
    #[must_use]
    pub fn with_reorder_level(mut self, level: u32) -> Self {
        self.reorder_level = level;
        self
    }

    /// Whether stock is at or below the reorder level.
    #[must_use]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.reorder_level
    }

    /// Whether stock is exhausted.
    #[must_use]
    pub fn is_out_of_stock(&self) -> bool {
        self.stock_quantity == 0
    }

    /// Value of the stock on hand at the current price.
    #[must_use]
    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.stock_quantity) * self.price_per_bag
    }

    /// Updates the timestamp.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.grade.display_name())
    }
}

// ============================================================================
// STOCK LEDGER
// ============================================================================

/// Requested stock mutation for [`adjust_stock`](crate::CemErp::adjust_stock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockAdjustmentMode {
    /// Increase stock (purchase/production).
    Add,
    /// Decrease stock (damage/loss); refused if it would go negative.
    Remove,
    /// Absolute override (manual reconciliation).
    Set,
}

/// What caused a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockAdjustmentKind {
    /// Manual addition.
    Added,
    /// Manual removal.
    Removed,
    /// Manual absolute override.
    Set,
    /// Decremented when an order line item was placed.
    OrderPlaced,
    /// Restored when an order was cancelled or an item removed.
    OrderReleased,
}

/// One entry in the stock adjustment ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    /// Adjustment ID.
    pub id:                Uuid,
    /// Product adjusted.
    pub product_id:        ProductId,
    /// What caused the entry.
    pub kind:              StockAdjustmentKind,
    /// Signed quantity change in bags.
    pub quantity_delta:    i64,
    /// Stock before the change.
    pub previous_quantity: u32,
    /// Stock after the change.
    pub new_quantity:      u32,
    /// Operator-supplied reason.
    pub reason:            Option<String>,
    /// Reference (order ID, PO number, etc).
    pub reference:         Option<String>,
    /// Entry timestamp.
    pub created_at:        DateTime<Utc>,
}

impl StockAdjustment {
    /// Creates a new ledger entry.
    #[must_use]
    pub fn new(
        product_id: ProductId, kind: StockAdjustmentKind, previous_quantity: u32,
        new_quantity: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            kind,
            quantity_delta: i64::from(new_quantity) - i64::from(previous_quantity),
            previous_quantity,
            new_quantity,
            reason: None,
            reference: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

// ============================================================================
// FILTERS & STATS
// ============================================================================

/// Stock level bucket for product searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevelFilter {
    /// At or below the reorder level but not empty.
    Low,
    /// No stock at all.
    Out,
    /// At least one bag in stock.
    Available,
}

/// Product search filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive text match on name or grade code.
    pub search: Option<String>,
    /// Filter by grade.
    pub grade:  Option<CementGrade>,
    /// Filter by stock bucket.
    pub stock:  Option<StockLevelFilter>,
    /// Filter by lifecycle state.
    pub status: Option<EntityStatus>,
}

/// Warehouse-wide stock statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarehouseStats {
    /// Number of products on file.
    pub total_products:     usize,
    /// Total bags on hand across all products.
    pub total_bags:         u64,
    /// Value of all stock at current prices.
    pub total_value:        Decimal,
    /// Products flagged low-stock (excluding empty ones).
    pub low_stock_count:    usize,
    /// Products with no stock.
    pub out_of_stock_count: usize,
}
