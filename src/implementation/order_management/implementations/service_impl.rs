//! Order book service implementation.
//!
//! All writes to an order go through these methods so they happen under the
//! book's lock. Order numbers are drawn from the per-day counter inside the
//! same critical section that inserts the order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use crate::errors::{ErpError, ErpResult};
use crate::implementation::order_management::types::{
    Order, OrderBook, OrderFilter, OrderId, OrderItem, OrderItemId, OrderStatus, Payment,
};
use crate::types::catalog::ProductId;
use crate::types::directory::{DriverId, VendorId};

impl OrderBook {
    /// Creates an empty order book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders:        Arc::new(Mutex::new(HashMap::new())),
            day_sequences: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // ========================================================================
    // PLACEMENT & NUMBERING
    // ========================================================================

    /// Numbers and inserts an order.
    ///
    /// The sequence for the order's date is bumped and the order stored
    /// while both locks are held, so concurrent placements draw distinct
    /// numbers and the book never holds a duplicate.
    pub fn insert_order(&self, mut order: Order, prefix: &str) -> ErpResult<Order> {
        let mut orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;
        let mut sequences = self.day_sequences.lock().map_err(|_| ErpError::LockPoisoned)?;

        let sequence = sequences.entry(order.order_date).or_insert(0);
        *sequence += 1;
        order.order_number =
            format!("{}-{}-{:04}", prefix, order.order_date.format("%Y%m%d"), sequence);

        if orders.values().any(|o| o.order_number == order.order_number) {
            return Err(ErpError::ConcurrencyConflict(format!(
                "order number {} already taken",
                order.order_number
            )));
        }

        orders.insert(order.id, order.clone());
        log::info!("placed order {} for vendor {}", order.order_number, order.vendor_id);
        Ok(order)
    }

    /// Gets an order by ID.
    pub fn get_order(&self, id: &OrderId) -> ErpResult<Order> {
        let orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;
        orders.get(id).cloned().ok_or_else(|| ErpError::OrderNotFound(id.to_string()))
    }

    /// Looks an order up by its human-facing number.
    pub fn get_order_by_number(&self, number: &str) -> ErpResult<Order> {
        let orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;
        orders
            .values()
            .find(|o| o.order_number == number)
            .cloned()
            .ok_or_else(|| ErpError::OrderNotFound(number.to_string()))
    }

    // ========================================================================
    // ITEM & PAYMENT WRITES
    // ========================================================================

    /// Appends a line item to an open order and recomputes totals.
    pub fn add_item(&self, order_id: &OrderId, item: OrderItem) -> ErpResult<OrderItem> {
        let mut orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;
        let order =
            orders.get_mut(order_id).ok_or_else(|| ErpError::OrderNotFound(order_id.to_string()))?;

        if !order.status.is_open() {
            return Err(ErpError::Validation(format!(
                "order {} is {} and no longer accepts items",
                order.order_number,
                order.status.display_name()
            )));
        }

        order.add_item(item.clone());
        Ok(item)
    }

    /// Removes a line item from an open order and recomputes totals.
    /// Returns the removed item so the caller can restore its stock.
    pub fn remove_item(&self, order_id: &OrderId, item_id: &OrderItemId) -> ErpResult<OrderItem> {
        let mut orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;
        let order =
            orders.get_mut(order_id).ok_or_else(|| ErpError::OrderNotFound(order_id.to_string()))?;

        if !order.status.is_open() {
            return Err(ErpError::Validation(format!(
                "order {} is {} and no longer accepts item changes",
                order.order_number,
                order.status.display_name()
            )));
        }

        order
            .remove_item(item_id)
            .ok_or_else(|| ErpError::ItemNotFound(item_id.to_string()))
    }

    /// Records a payment and reconciles the order's payment status.
    ///
    /// Delivered orders still accept payments; cancelled ones do not.
    /// Overpayment is accepted and leaves the balance negative.
    pub fn record_payment(&self, order_id: &OrderId, payment: Payment) -> ErpResult<Payment> {
        if payment.amount < Decimal::ZERO {
            return Err(ErpError::Validation("payment amount cannot be negative".to_string()));
        }

        let mut orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;
        let order =
            orders.get_mut(order_id).ok_or_else(|| ErpError::OrderNotFound(order_id.to_string()))?;

        if order.status == OrderStatus::Cancelled {
            return Err(ErpError::Validation(format!(
                "order {} is cancelled and cannot take payments",
                order.order_number
            )));
        }

        order.add_payment(payment.clone());

        if order.balance_amount() < Decimal::ZERO {
            log::warn!(
                "order {} overpaid by {}; balance carried as credit",
                order.order_number,
                -order.balance_amount()
            );
        }
        Ok(payment)
    }

    // ========================================================================
    // STATUS
    // ========================================================================

    /// Moves an order to a new status and returns the updated order.
    ///
    /// Transitions are permissive except that the terminal states
    /// `Delivered` and `Cancelled` cannot be left.
    pub fn update_status(&self, order_id: &OrderId, status: OrderStatus) -> ErpResult<Order> {
        self.update_status_tracked(order_id, status).map(|(_, order)| order)
    }

    /// Like [`update_status`](Self::update_status) but also reports the
    /// status the order held before. The facade uses the previous status to
    /// release stock exactly once on cancellation.
    pub(crate) fn update_status_tracked(
        &self, order_id: &OrderId, status: OrderStatus,
    ) -> ErpResult<(OrderStatus, Order)> {
        let mut orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;
        let order =
            orders.get_mut(order_id).ok_or_else(|| ErpError::OrderNotFound(order_id.to_string()))?;

        if order.status.is_terminal() && status != order.status {
            return Err(ErpError::InvalidStatusTransition {
                from: order.status.display_name().to_string(),
                to:   status.display_name().to_string(),
            });
        }

        let previous = order.status;
        order.status = status;
        order.touch();

        if previous != status {
            log::info!(
                "order {} moved {} -> {}",
                order.order_number,
                previous.display_name(),
                status.display_name()
            );
        }
        Ok((previous, order.clone()))
    }

    // ========================================================================
    // REFERENCE MAINTENANCE
    // ========================================================================

    /// Whether any order references the vendor.
    pub fn vendor_has_orders(&self, vendor_id: &VendorId) -> ErpResult<bool> {
        let orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;
        Ok(orders.values().any(|o| &o.vendor_id == vendor_id))
    }

    /// Whether any order line item references the product.
    pub fn product_referenced(&self, product_id: &ProductId) -> ErpResult<bool> {
        let orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;
        Ok(orders.values().any(|o| o.items.iter().any(|i| &i.product_id == product_id)))
    }

    /// Clears the driver from every order that references them. Returns how
    /// many orders were touched.
    pub fn detach_driver(&self, driver_id: &DriverId) -> ErpResult<usize> {
        let mut orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;

        let mut detached = 0;
        for order in orders.values_mut() {
            if order.driver_id.as_ref() == Some(driver_id) {
                order.driver_id = None;
                order.touch();
                detached += 1;
            }
        }
        Ok(detached)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Orders for a vendor, newest first.
    pub fn orders_for_vendor(&self, vendor_id: &VendorId) -> ErpResult<Vec<Order>> {
        let orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;

        let mut found: Vec<Order> =
            orders.values().filter(|o| &o.vendor_id == vendor_id).cloned().collect();
        found.sort_by(|a, b| b.order_number.cmp(&a.order_number));
        Ok(found)
    }

    /// Searches orders, newest first.
    pub fn search_orders(&self, filter: &OrderFilter) -> ErpResult<Vec<Order>> {
        let orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;

        let mut found: Vec<Order> =
            orders.values().filter(|o| order_matches(o, filter)).cloned().collect();
        found.sort_by(|a, b| b.order_number.cmp(&a.order_number));
        Ok(found)
    }

    /// Snapshot of every order in the book.
    pub fn all_orders(&self) -> ErpResult<Vec<Order>> {
        let orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;
        Ok(orders.values().cloned().collect())
    }

    /// Number of orders on file.
    pub fn order_count(&self) -> ErpResult<usize> {
        let orders = self.orders.lock().map_err(|_| ErpError::LockPoisoned)?;
        Ok(orders.len())
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

fn order_matches(order: &Order, filter: &OrderFilter) -> bool {
    if let Some(status) = filter.status {
        if order.status != status {
            return false;
        }
    }

    if let Some(payment_status) = filter.payment_status {
        if order.payment_status != payment_status {
            return false;
        }
    }

    if let Some(vendor_id) = filter.vendor_id {
        if order.vendor_id != vendor_id {
            return false;
        }
    }

    if let Some(driver_id) = filter.driver_id {
        if order.driver_id != Some(driver_id) {
            return false;
        }
    }

    if let Some(from) = filter.date_from {
        if order.order_date < from {
            return false;
        }
    }

    if let Some(to) = filter.date_to {
        if order.order_date > to {
            return false;
        }
    }

    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let number_hit = order.order_number.to_lowercase().contains(&needle);
        let address_hit = order.delivery_address.to_lowercase().contains(&needle);
        if !number_hit && !address_hit {
            return false;
        }
    }

    true
}
