//! Main order type for the order book.
//!
//! The `Order` struct owns its line items and payments outright; deleting an
//! order takes both with it. Vendor, driver and products are referenced by
//! ID with the deletion policies enforced at the facade.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::directory::{DriverId, VendorId};

use super::{
    basic_types::{OrderId, OrderStatus, PaymentMethod, PaymentStatus},
    order_types::{OrderItem, Payment},
};

/// Cement order.
///
/// `subtotal`, `discount_amount`, `tax_amount`, `total_amount`, `paid_amount`
/// and `payment_status` are derived fields: they are only ever written by
/// [`recalculate_totals`](Order::recalculate_totals) and
/// [`reconcile_payments`](Order::reconcile_payments), never by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id:               OrderId,
    /// Human-facing order number, `ORD-YYYYMMDD-NNNN`. Assigned exactly once
    /// when the order enters the book.
    pub order_number:     String,
    /// Buying vendor. Required.
    pub vendor_id:        VendorId,
    /// Assigned delivery driver, if any.
    pub driver_id:        Option<DriverId>,
    /// Date the order was placed.
    pub order_date:       NaiveDate,
    /// Promised delivery date.
    pub delivery_date:    Option<NaiveDate>,
    /// Site address for delivery.
    pub delivery_address: String,
    /// Fulfillment status.
    pub status:           OrderStatus,
    /// Derived payment status.
    pub payment_status:   PaymentStatus,
    /// Agreed payment method.
    pub payment_method:   PaymentMethod,
    /// Sum of line totals.
    pub subtotal:         Decimal,
    /// Discount percentage applied to the subtotal.
    pub discount_percent: Decimal,
    /// Derived discount amount, 2dp.
    pub discount_amount:  Decimal,
    /// Tax (GST) percentage applied after discount.
    pub tax_percent:      Decimal,
    /// Derived tax amount, 2dp.
    pub tax_amount:       Decimal,
    /// Grand total.
    pub total_amount:     Decimal,
    /// Sum of recorded payments.
    pub paid_amount:      Decimal,
    /// Free-form notes.
    pub notes:            Option<String>,
    /// Owned line items.
    pub items:            Vec<OrderItem>,
    /// Owned payments.
    pub payments:         Vec<Payment>,
    /// Creation timestamp.
    pub created_at:       DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at:       DateTime<Utc>,
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.order_number, self.status.display_name())
    }
}
