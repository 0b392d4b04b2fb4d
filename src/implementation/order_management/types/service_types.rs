//! Service types for the order book.
//!
//! `OrderBook` holds the orders and the per-day numbering counters;
//! `NewOrder` is the order placement request; `OrderFilter` drives searches.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::catalog::ProductId;
use crate::types::directory::{DriverId, VendorId};

use super::basic_types::{OrderId, OrderStatus, PaymentMethod, PaymentStatus};
use super::main_order_types::Order;

/// Order book service.
#[derive(Debug, Clone)]
pub struct OrderBook {
    /// Orders indexed by ID.
    pub(crate) orders:        Arc<Mutex<HashMap<OrderId, Order>>>,
    /// Next order-number sequence per calendar day.
    ///
    /// Lock discipline: always acquired after `orders`, inside the same
    /// critical section that inserts the numbered order, so two concurrent
    /// placements can never draw the same number.
    pub(crate) day_sequences: Arc<Mutex<HashMap<NaiveDate, u32>>>,
}

/// Order placement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    /// Buying vendor.
    pub vendor_id:        VendorId,
    /// Delivery driver, if already assigned.
    pub driver_id:        Option<DriverId>,
    /// Order date; defaults to today.
    pub order_date:       Option<NaiveDate>,
    /// Promised delivery date.
    pub delivery_date:    Option<NaiveDate>,
    /// Site address for delivery.
    pub delivery_address: String,
    /// Discount percentage on the subtotal.
    pub discount_percent: Decimal,
    /// Tax percentage; defaults from configuration.
    pub tax_percent:      Option<Decimal>,
    /// Agreed payment method.
    pub payment_method:   PaymentMethod,
    /// Free-form notes.
    pub notes:            Option<String>,
    /// Requested line items.
    pub items:            Vec<NewOrderItem>,
}

impl NewOrder {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(vendor_id: VendorId, delivery_address: impl Into<String>) -> Self {
        Self {
            vendor_id,
            driver_id: None,
            order_date: None,
            delivery_date: None,
            delivery_address: delivery_address.into(),
            discount_percent: Decimal::ZERO,
            tax_percent: None,
            payment_method: PaymentMethod::default(),
            notes: None,
            items: Vec::new(),
        }
    }

    /// Adds a line item at the catalog price.
    #[must_use]
    pub fn with_item(mut self, product_id: ProductId, quantity: u32) -> Self {
        self.items.push(NewOrderItem { product_id, quantity, unit_price: None });
        self
    }

    /// Adds a line item at a negotiated price.
    #[must_use]
    pub fn with_priced_item(
        mut self, product_id: ProductId, quantity: u32, unit_price: Decimal,
    ) -> Self {
        self.items.push(NewOrderItem { product_id, quantity, unit_price: Some(unit_price) });
        self
    }

    /// Assigns a driver.
    #[must_use]
    pub fn with_driver(mut self, driver_id: DriverId) -> Self {
        self.driver_id = Some(driver_id);
        self
    }

    /// Sets the delivery date.
    #[must_use]
    pub fn with_delivery_date(mut self, date: NaiveDate) -> Self {
        self.delivery_date = Some(date);
        self
    }

    /// Sets the discount percentage.
    #[must_use]
    pub fn with_discount_percent(mut self, percent: Decimal) -> Self {
        self.discount_percent = percent;
        self
    }

    /// Overrides the tax percentage.
    #[must_use]
    pub fn with_tax_percent(mut self, percent: Decimal) -> Self {
        self.tax_percent = Some(percent);
        self
    }

    /// Sets the payment method.
    #[must_use]
    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }
}

/// Requested line item in a [`NewOrder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    /// Product to order.
    pub product_id: ProductId,
    /// Bags requested.
    pub quantity:   u32,
    /// Negotiated price; `None` takes the catalog price.
    pub unit_price: Option<Decimal>,
}

/// Order search filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Filter by fulfillment status.
    pub status:         Option<OrderStatus>,
    /// Filter by payment status.
    pub payment_status: Option<PaymentStatus>,
    /// Filter by vendor.
    pub vendor_id:      Option<VendorId>,
    /// Filter by driver.
    pub driver_id:      Option<DriverId>,
    /// Earliest order date, inclusive.
    pub date_from:      Option<NaiveDate>,
    /// Latest order date, inclusive.
    pub date_to:        Option<NaiveDate>,
    /// Case-insensitive match on order number or delivery address.
    pub search:         Option<String>,
}
