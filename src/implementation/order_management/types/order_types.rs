//! # Order Management Types - Order Types
//!
//! Line items and payments owned by an order.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::catalog::{CementGrade, Product, ProductId};

use super::basic_types::{OrderItemId, PaymentId, PaymentType};

// ============================================================================
// ORDER LINE ITEM
// ============================================================================

/// Line item in an order.
///
/// Product name and grade are snapshotted at order time so later catalog
/// edits do not rewrite history. `total_price` is derived and recomputed on
/// every item write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Line item ID.
    pub id:           OrderItemId,
    /// Product ordered.
    pub product_id:   ProductId,
    /// Product name at order time.
    pub product_name: String,
    /// Cement grade at order time.
    pub grade:        CementGrade,
    /// Bags ordered. Always at least 1.
    pub quantity:     u32,
    /// Agreed price per bag.
    pub unit_price:   Decimal,
    /// quantity x unit_price.
    pub total_price:  Decimal,
}

impl OrderItem {
    /// Creates a line item for a product, defaulting the unit price from the
    /// catalog when no override is given.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32, unit_price: Option<Decimal>) -> Self {
        let unit_price = unit_price.unwrap_or(product.price_per_bag);
        Self {
            id: OrderItemId::generate(),
            product_id: product.id,
            product_name: product.name.clone(),
            grade: product.grade,
            quantity,
            unit_price,
            total_price: Decimal::from(quantity) * unit_price,
        }
    }

    /// Recomputes the line total.
    pub(crate) fn recalculate(&mut self) {
        self.total_price = Decimal::from(self.quantity) * self.unit_price;
    }
}

// ============================================================================
// PAYMENT
// ============================================================================

/// Payment received against an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID.
    pub id:               PaymentId,
    /// Date the money was received.
    pub payment_date:     NaiveDate,
    /// Amount received. Never negative.
    pub amount:           Decimal,
    /// How the money came in.
    pub payment_type:     PaymentType,
    /// Cheque number, UPI reference, etc.
    pub reference_number: Option<String>,
    /// Free-form notes.
    pub notes:            Option<String>,
    /// Record timestamp.
    pub created_at:       DateTime<Utc>,
}

impl Payment {
    /// Creates a payment dated today.
    #[must_use]
    pub fn new(amount: Decimal, payment_type: PaymentType) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::generate(),
            payment_date: now.date_naive(),
            amount,
            payment_type,
            reference_number: None,
            notes: None,
            created_at: now,
        }
    }

    /// Sets the payment date.
    #[must_use]
    pub fn with_payment_date(mut self, date: NaiveDate) -> Self {
        self.payment_date = date;
        self
    }

    /// Sets the reference number.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference_number = Some(reference.into());
        self
    }

    /// Sets the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
