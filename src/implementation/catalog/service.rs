//! # Warehouse Service Implementation
//!
//! Product catalog management and the stock ledger. All stock mutations go
//! through this service so the on-hand quantity can never go negative and
//! every change lands in the adjustment history.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    errors::{ErpError, ErpResult},
    types::catalog::{
        Product, ProductFilter, ProductId, StockAdjustment, StockAdjustmentKind,
        StockAdjustmentMode, StockLevelFilter, WarehouseStats,
    },
    types::EntityStatus,
};

/// Product catalog and stock ledger.
#[derive(Debug, Clone)]
pub struct Warehouse {
    /// Products indexed by ID.
    products:    Arc<Mutex<HashMap<ProductId, Product>>>,
    /// Adjustment history, oldest first.
    adjustments: Arc<Mutex<Vec<StockAdjustment>>>,
}

impl Warehouse {
    /// Creates an empty warehouse.
    #[must_use]
    pub fn new() -> Self {
        Self {
            products:    Arc::new(Mutex::new(HashMap::new())),
            adjustments: Arc::new(Mutex::new(Vec::new())),
        }
    }

    // ========================================================================
    // PRODUCT OPERATIONS
    // ========================================================================

    /// Adds a product to the catalog. Opening stock, if any, is recorded in
    /// the ledger.
    ///
    /// # Errors
    /// Returns `Validation` if the price is negative or the name empty.
    pub fn add_product(&self, product: Product) -> ErpResult<Product> {
        validate_product(&product)?;

        let mut products = self.products.lock().map_err(|_| ErpError::LockPoisoned)?;
        if products.contains_key(&product.id) {
            return Err(ErpError::Validation(format!(
                "product {} is already in the catalog",
                product.id
            )));
        }
        products.insert(product.id, product.clone());
        drop(products);

        if product.stock_quantity > 0 {
            self.record_adjustment(
                StockAdjustment::new(
                    product.id,
                    StockAdjustmentKind::Added,
                    0,
                    product.stock_quantity,
                )
                .with_reason("Opening stock"),
            )?;
        }

        log::info!(
            "added product {} ({}) with {} bags",
            product.name,
            product.grade,
            product.stock_quantity
        );
        Ok(product)
    }

    /// Gets a product by ID.
    pub fn get_product(&self, id: &ProductId) -> ErpResult<Product> {
        let products = self.products.lock().map_err(|_| ErpError::LockPoisoned)?;
        products.get(id).cloned().ok_or_else(|| ErpError::ProductNotFound(id.to_string()))
    }

    /// Updates product details. The stock quantity is kept from the stored
    /// record; only the ledger may change it.
    pub fn update_product(&self, mut product: Product) -> ErpResult<Product> {
        validate_product(&product)?;

        let mut products = self.products.lock().map_err(|_| ErpError::LockPoisoned)?;
        let existing = products
            .get(&product.id)
            .ok_or_else(|| ErpError::ProductNotFound(product.id.to_string()))?;

        product.stock_quantity = existing.stock_quantity;
        product.touch();
        products.insert(product.id, product.clone());
        Ok(product)
    }

    /// Marks a product inactive.
    pub fn deactivate_product(&self, id: &ProductId) -> ErpResult<Product> {
        self.set_product_status(id, EntityStatus::Inactive)
    }

    /// Returns a product to active sale.
    pub fn reactivate_product(&self, id: &ProductId) -> ErpResult<Product> {
        self.set_product_status(id, EntityStatus::Active)
    }

    fn set_product_status(&self, id: &ProductId, status: EntityStatus) -> ErpResult<Product> {
        let mut products = self.products.lock().map_err(|_| ErpError::LockPoisoned)?;
        let product =
            products.get_mut(id).ok_or_else(|| ErpError::ProductNotFound(id.to_string()))?;
        product.status = status;
        product.touch();
        Ok(product.clone())
    }

    /// Physically removes a product.
    ///
    /// Referential checks against the order book are the caller's
    /// responsibility; see [`CemErp::remove_product`](crate::CemErp::remove_product).
    pub(crate) fn remove_product(&self, id: &ProductId) -> ErpResult<Product> {
        let mut products = self.products.lock().map_err(|_| ErpError::LockPoisoned)?;
        products.remove(id).ok_or_else(|| ErpError::ProductNotFound(id.to_string()))
    }

    /// Searches products, sorted by grade then name.
    pub fn search_products(&self, filter: &ProductFilter) -> ErpResult<Vec<Product>> {
        let products = self.products.lock().map_err(|_| ErpError::LockPoisoned)?;

        let mut matched: Vec<Product> =
            products.values().filter(|p| product_matches(p, filter)).cloned().collect();
        matched.sort_by(|a, b| a.grade.code().cmp(b.grade.code()).then(a.name.cmp(&b.name)));

        Ok(matched)
    }

    // ========================================================================
    // STOCK LEDGER
    // ========================================================================

    /// Applies a manual stock adjustment and returns the updated product.
    ///
    /// # Errors
    /// Returns `Validation` for a zero quantity (except `Set`, where zero
    /// clears the shelf) and `InsufficientStock` when a removal exceeds the
    /// bags on hand.
    pub fn adjust_stock(
        &self, id: &ProductId, mode: StockAdjustmentMode, quantity: u32,
        reason: Option<String>,
    ) -> ErpResult<Product> {
        if quantity == 0 && mode != StockAdjustmentMode::Set {
            return Err(ErpError::Validation(
                "adjustment quantity must be at least 1".to_string(),
            ));
        }

        let mut products = self.products.lock().map_err(|_| ErpError::LockPoisoned)?;
        let product =
            products.get_mut(id).ok_or_else(|| ErpError::ProductNotFound(id.to_string()))?;

        let previous = product.stock_quantity;
        let kind = match mode {
            StockAdjustmentMode::Add => {
                product.stock_quantity = previous.saturating_add(quantity);
                StockAdjustmentKind::Added
            },
            StockAdjustmentMode::Remove => {
                if quantity > previous {
                    return Err(ErpError::InsufficientStock {
                        product_id: id.to_string(),
                        available:  previous,
                        requested:  quantity,
                    });
                }
                product.stock_quantity = previous - quantity;
                StockAdjustmentKind::Removed
            },
            StockAdjustmentMode::Set => {
                product.stock_quantity = quantity;
                StockAdjustmentKind::Set
            },
        };
        product.touch();

        let updated = product.clone();
        let mut adjustment =
            StockAdjustment::new(updated.id, kind, previous, updated.stock_quantity);
        if let Some(reason) = reason {
            adjustment = adjustment.with_reason(reason);
        }

        drop(products);
        self.record_adjustment(adjustment)?;

        log::info!(
            "stock {:?} on {}: {} -> {} bags",
            mode,
            updated.name,
            previous,
            updated.stock_quantity
        );
        Ok(updated)
    }

    /// Decrements stock for a set of order lines in one critical section.
    ///
    /// Either every line passes the availability check and all decrements
    /// apply, or nothing changes. This is the only decrement path used by
    /// order placement, so two racing orders cannot over-sell a product.
    ///
    /// # Errors
    /// Returns `InsufficientStock` for the first line that exceeds
    /// availability, `Validation` for inactive products or zero quantities.
    pub fn commit_order(
        &self, lines: &[(ProductId, u32)], reference: &str,
    ) -> ErpResult<()> {
        let mut products = self.products.lock().map_err(|_| ErpError::LockPoisoned)?;

        // Verify every line before touching anything.
        for (product_id, quantity) in lines {
            let product = products
                .get(product_id)
                .ok_or_else(|| ErpError::ProductNotFound(product_id.to_string()))?;

            if !product.status.is_active() {
                return Err(ErpError::Validation(format!(
                    "product {} is inactive",
                    product.name
                )));
            }
            if *quantity == 0 {
                return Err(ErpError::Validation(
                    "order item quantity must be at least 1".to_string(),
                ));
            }
            if *quantity > product.stock_quantity {
                return Err(ErpError::InsufficientStock {
                    product_id: product_id.to_string(),
                    available:  product.stock_quantity,
                    requested:  *quantity,
                });
            }
        }

        let mut entries = Vec::with_capacity(lines.len());
        for (product_id, quantity) in lines {
            // Verified above; a missing key here means the map changed under
            // the guard we still hold, which cannot happen.
            let Some(product) = products.get_mut(product_id) else {
                return Err(ErpError::ProductNotFound(product_id.to_string()));
            };
            let previous = product.stock_quantity;
            product.stock_quantity = previous - quantity;
            product.touch();

            entries.push(
                StockAdjustment::new(
                    *product_id,
                    StockAdjustmentKind::OrderPlaced,
                    previous,
                    product.stock_quantity,
                )
                .with_reference(reference),
            );
        }

        drop(products);
        for entry in entries {
            self.record_adjustment(entry)?;
        }
        Ok(())
    }

    /// Restores stock for order lines that were committed and later
    /// cancelled or removed.
    pub fn release_order(
        &self, lines: &[(ProductId, u32)], reference: &str,
    ) -> ErpResult<()> {
        let mut products = self.products.lock().map_err(|_| ErpError::LockPoisoned)?;

        let mut entries = Vec::with_capacity(lines.len());
        for (product_id, quantity) in lines {
            let product = products
                .get_mut(product_id)
                .ok_or_else(|| ErpError::ProductNotFound(product_id.to_string()))?;

            let previous = product.stock_quantity;
            product.stock_quantity = previous.saturating_add(*quantity);
            product.touch();

            entries.push(
                StockAdjustment::new(
                    *product_id,
                    StockAdjustmentKind::OrderReleased,
                    previous,
                    product.stock_quantity,
                )
                .with_reference(reference),
            );
        }

        drop(products);
        for entry in entries {
            self.record_adjustment(entry)?;
        }
        Ok(())
    }

    // ========================================================================
    // LOW STOCK & STATS
    // ========================================================================

    /// Products at or below their reorder level (including empty ones).
    pub fn low_stock_products(&self) -> ErpResult<Vec<Product>> {
        let products = self.products.lock().map_err(|_| ErpError::LockPoisoned)?;
        let mut low: Vec<Product> =
            products.values().filter(|p| p.is_low_stock()).cloned().collect();
        low.sort_by_key(|p| p.stock_quantity);
        Ok(low)
    }

    /// Products with no stock at all.
    pub fn out_of_stock_products(&self) -> ErpResult<Vec<Product>> {
        let products = self.products.lock().map_err(|_| ErpError::LockPoisoned)?;
        Ok(products.values().filter(|p| p.is_out_of_stock()).cloned().collect())
    }

    /// Warehouse-wide stock statistics.
    pub fn stats(&self) -> ErpResult<WarehouseStats> {
        let products = self.products.lock().map_err(|_| ErpError::LockPoisoned)?;

        let mut stats = WarehouseStats { total_products: products.len(), ..Default::default() };
        for product in products.values() {
            stats.total_bags += u64::from(product.stock_quantity);
            stats.total_value += product.stock_value();
            if product.is_out_of_stock() {
                stats.out_of_stock_count += 1;
            } else if product.is_low_stock() {
                stats.low_stock_count += 1;
            }
        }

        Ok(stats)
    }

    // ========================================================================
    // ADJUSTMENT HISTORY
    // ========================================================================

    fn record_adjustment(&self, adjustment: StockAdjustment) -> ErpResult<()> {
        let mut adjustments = self.adjustments.lock().map_err(|_| ErpError::LockPoisoned)?;
        adjustments.push(adjustment);
        Ok(())
    }

    /// Adjustment history for a product, most recent first.
    pub fn adjustment_history(
        &self, product_id: &ProductId, limit: Option<usize>,
    ) -> ErpResult<Vec<StockAdjustment>> {
        let adjustments = self.adjustments.lock().map_err(|_| ErpError::LockPoisoned)?;

        // The ledger is append-only, so reverse insertion order is newest first.
        let mut history: Vec<StockAdjustment> = adjustments
            .iter()
            .rev()
            .filter(|a| &a.product_id == product_id)
            .cloned()
            .collect();

        if let Some(limit) = limit {
            history.truncate(limit);
        }
        Ok(history)
    }
}

impl Default for Warehouse {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_product(product: &Product) -> ErpResult<()> {
    if product.name.trim().is_empty() {
        return Err(ErpError::Validation("product name is required".to_string()));
    }
    if product.price_per_bag < rust_decimal::Decimal::ZERO {
        return Err(ErpError::Validation("price per bag cannot be negative".to_string()));
    }
    if product.weight_per_bag <= rust_decimal::Decimal::ZERO {
        return Err(ErpError::Validation("bag weight must be positive".to_string()));
    }
    Ok(())
}

fn product_matches(product: &Product, filter: &ProductFilter) -> bool {
    if let Some(status) = filter.status {
        if product.status != status {
            return false;
        }
    }

    if let Some(grade) = filter.grade {
        if product.grade != grade {
            return false;
        }
    }

    if let Some(stock) = filter.stock {
        let matches = match stock {
            StockLevelFilter::Low => product.is_low_stock() && !product.is_out_of_stock(),
            StockLevelFilter::Out => product.is_out_of_stock(),
            StockLevelFilter::Available => !product.is_out_of_stock(),
        };
        if !matches {
            return false;
        }
    }

    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let name_hit = product.name.to_lowercase().contains(&needle);
        let grade_hit = product.grade.code().to_lowercase().contains(&needle);
        if !name_hit && !grade_hit {
            return false;
        }
    }

    true
}
