//! Implementation details for the cement distribution core.

pub mod catalog;
pub mod directory;
pub mod order_management;

use std::sync::{Arc, Mutex};

use crate::errors::{ErpError, ErpResult};
use crate::reporting::Reports;
use crate::types::ErpConfig;

use catalog::Warehouse;
use directory::DirectoryService;
use order_management::types::{
    NewOrder, Order, OrderBook, OrderId, OrderItem, OrderItemId, OrderStatus, Payment,
};
use order_management::OrderFilter;

use crate::types::catalog::{
    Product, ProductFilter, ProductId, StockAdjustment, StockAdjustmentMode, WarehouseStats,
};
use crate::types::directory::{Driver, DriverFilter, DriverId, Vendor, VendorFilter, VendorId};

/// Facade over the directory, warehouse and order book.
///
/// Cross-service rules live here: stock is committed and released around
/// order writes, and entity removal honors the reference policies (vendors
/// with orders are protected, drivers are detached, referenced products are
/// protected).
#[derive(Debug, Clone)]
pub struct CemErp {
    config:    Arc<Mutex<ErpConfig>>,
    directory: DirectoryService,
    warehouse: Warehouse,
    orders:    OrderBook,
}

impl CemErp {
    /// Creates a facade with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ErpConfig::default())
    }

    /// Creates a facade with the given configuration.
    #[must_use]
    pub fn with_config(config: ErpConfig) -> Self {
        Self {
            config:    Arc::new(Mutex::new(config)),
            directory: DirectoryService::new(),
            warehouse: Warehouse::new(),
            orders:    OrderBook::new(),
        }
    }

    /// Current configuration snapshot.
    #[must_use]
    pub fn config(&self) -> ErpConfig {
        self.config.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Replaces the configuration.
    pub fn set_config(&self, config: ErpConfig) {
        if let Ok(mut guard) = self.config.lock() {
            *guard = config;
        }
    }

    /// Vendor and driver registry.
    #[must_use]
    pub fn directory(&self) -> &DirectoryService {
        &self.directory
    }

    /// Product catalog and stock ledger.
    #[must_use]
    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    /// Order book.
    #[must_use]
    pub fn orders(&self) -> &OrderBook {
        &self.orders
    }

    /// Reporting over the live stores.
    #[must_use]
    pub fn reports(&self) -> Reports {
        Reports::new(
            self.directory.clone(),
            self.warehouse.clone(),
            self.orders.clone(),
            Arc::clone(&self.config),
        )
    }

    // ========================================================================
    // ORDER PLACEMENT
    // ========================================================================

    /// Places an order: validates vendor, driver and items, decrements stock
    /// for every line all-or-nothing, assigns the day-scoped order number
    /// and computes totals.
    ///
    /// Stock is released again if the order fails to enter the book.
    pub fn create_order(&self, request: NewOrder) -> ErpResult<Order> {
        let config = self.config();

        let vendor = self.directory.get_vendor(&request.vendor_id)?;
        if !vendor.status.is_active() {
            return Err(ErpError::Validation(format!(
                "vendor {} is inactive and cannot place orders",
                vendor.name
            )));
        }

        if let Some(driver_id) = &request.driver_id {
            let driver = self.directory.get_driver(driver_id)?;
            if !driver.status.is_active() {
                return Err(ErpError::Validation(format!(
                    "driver {} is inactive",
                    driver.name
                )));
            }
        }

        if request.items.is_empty() {
            return Err(ErpError::Validation("an order needs at least one item".to_string()));
        }

        let mut items = Vec::with_capacity(request.items.len());
        let mut lines = Vec::with_capacity(request.items.len());
        for requested in &request.items {
            let product = self.warehouse.get_product(&requested.product_id)?;
            items.push(OrderItem::from_product(
                &product,
                requested.quantity,
                requested.unit_price,
            ));
            lines.push((requested.product_id, requested.quantity));
        }

        let order = Order::from_request(&request, items, config.default_tax_percent);
        let reference = order.id.to_string();

        self.warehouse.commit_order(&lines, &reference)?;
        match self.orders.insert_order(order, &config.order_number_prefix) {
            Ok(order) => Ok(order),
            Err(err) => {
                self.warehouse.release_order(&lines, &reference)?;
                Err(err)
            },
        }
    }

    /// Adds a line item to an open order. Stock is decremented first and
    /// released again if the order refuses the item.
    pub fn add_order_item(
        &self, order_id: &OrderId, product_id: &ProductId, quantity: u32,
        unit_price: Option<rust_decimal::Decimal>,
    ) -> ErpResult<OrderItem> {
        let product = self.warehouse.get_product(product_id)?;
        let item = OrderItem::from_product(&product, quantity, unit_price);

        let lines = [(*product_id, quantity)];
        self.warehouse.commit_order(&lines, &order_id.to_string())?;
        match self.orders.add_item(order_id, item) {
            Ok(item) => Ok(item),
            Err(err) => {
                self.warehouse.release_order(&lines, &order_id.to_string())?;
                Err(err)
            },
        }
    }

    /// Removes a line item from an open order, restoring its stock and
    /// recomputing totals.
    pub fn remove_order_item(
        &self, order_id: &OrderId, item_id: &OrderItemId,
    ) -> ErpResult<OrderItem> {
        let removed = self.orders.remove_item(order_id, item_id)?;
        self.warehouse
            .release_order(&[(removed.product_id, removed.quantity)], &order_id.to_string())?;
        Ok(removed)
    }

    /// Records a payment against an order and reconciles its payment status.
    pub fn record_payment(&self, order_id: &OrderId, payment: Payment) -> ErpResult<Payment> {
        self.orders.record_payment(order_id, payment)
    }

    /// Moves an order to a new status. Cancelling restores the stock of
    /// every line item, exactly once.
    pub fn update_order_status(
        &self, order_id: &OrderId, status: OrderStatus,
    ) -> ErpResult<Order> {
        let (previous, order) = self.orders.update_status_tracked(order_id, status)?;

        if status == OrderStatus::Cancelled && previous != OrderStatus::Cancelled {
            let lines: Vec<(ProductId, u32)> =
                order.items.iter().map(|i| (i.product_id, i.quantity)).collect();
            self.warehouse.release_order(&lines, &order.order_number)?;
        }
        Ok(order)
    }

    /// Gets an order by ID.
    pub fn get_order(&self, order_id: &OrderId) -> ErpResult<Order> {
        self.orders.get_order(order_id)
    }

    /// Searches the order book.
    pub fn search_orders(&self, filter: &OrderFilter) -> ErpResult<Vec<Order>> {
        self.orders.search_orders(filter)
    }

    // ========================================================================
    // STOCK
    // ========================================================================

    /// Applies a manual stock adjustment.
    pub fn adjust_stock(
        &self, product_id: &ProductId, mode: StockAdjustmentMode, quantity: u32,
        reason: Option<String>,
    ) -> ErpResult<Product> {
        self.warehouse.adjust_stock(product_id, mode, quantity, reason)
    }

    /// Adjustment history for a product, most recent first.
    pub fn stock_history(
        &self, product_id: &ProductId, limit: Option<usize>,
    ) -> ErpResult<Vec<StockAdjustment>> {
        self.warehouse.adjustment_history(product_id, limit)
    }

    /// Warehouse-wide stock statistics.
    pub fn warehouse_stats(&self) -> ErpResult<WarehouseStats> {
        self.warehouse.stats()
    }

    // ========================================================================
    // ENTITY REMOVAL POLICIES
    // ========================================================================

    /// Hard-deletes a vendor. Refused while any order references them;
    /// deactivate instead to keep history.
    pub fn remove_vendor(&self, vendor_id: &VendorId) -> ErpResult<Vendor> {
        if self.orders.vendor_has_orders(vendor_id)? {
            return Err(ErpError::ReferentialIntegrity(format!(
                "vendor {vendor_id} has orders on file; deactivate instead"
            )));
        }
        self.directory.remove_vendor(vendor_id)
    }

    /// Hard-deletes a driver. Orders that referenced them keep their history
    /// with the driver cleared.
    pub fn remove_driver(&self, driver_id: &DriverId) -> ErpResult<Driver> {
        let detached = self.orders.detach_driver(driver_id)?;
        if detached > 0 {
            log::info!("cleared driver {driver_id} from {detached} order(s)");
        }
        self.directory.remove_driver(driver_id)
    }

    /// Hard-deletes a product. Refused while any order line item references
    /// it; deactivate instead to keep history.
    pub fn remove_product(&self, product_id: &ProductId) -> ErpResult<Product> {
        if self.orders.product_referenced(product_id)? {
            return Err(ErpError::ReferentialIntegrity(format!(
                "product {product_id} appears on orders; deactivate instead"
            )));
        }
        self.warehouse.remove_product(product_id)
    }

    // ========================================================================
    // SEARCH PASSTHROUGHS
    // ========================================================================

    /// Searches vendors.
    pub fn search_vendors(&self, filter: &VendorFilter) -> ErpResult<Vec<Vendor>> {
        self.directory.search_vendors(filter)
    }

    /// Searches drivers.
    pub fn search_drivers(&self, filter: &DriverFilter) -> ErpResult<Vec<Driver>> {
        self.directory.search_drivers(filter)
    }

    /// Searches products.
    pub fn search_products(&self, filter: &ProductFilter) -> ErpResult<Vec<Product>> {
        self.warehouse.search_products(filter)
    }
}

impl Default for CemErp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
