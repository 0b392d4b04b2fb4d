//! # Reporting
//!
//! Read-only analytics over the live stores: the operations dashboard,
//! daily dispatch tracking and the finance summary.

pub mod dispatch;
pub mod finance;

pub use dispatch::{DailyDispatch, DispatchFilter, DispatchStats};
pub use finance::{
    FinanceSummary, MonthlyRevenue, PaymentBreakdown, RevenuePoint, StatusBreakdown, TopProduct,
    TopVendor,
};

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{ErpError, ErpResult};
use crate::implementation::catalog::Warehouse;
use crate::implementation::order_management::implementations::order_impl::round2;
use crate::implementation::directory::DirectoryService;
use crate::implementation::order_management::types::{OrderBook, OrderStatus};
use crate::types::ErpConfig;

/// Reporting service. Shares the underlying stores with the facade, so
/// every report reflects the current state.
#[derive(Debug, Clone)]
pub struct Reports {
    pub(crate) directory: DirectoryService,
    pub(crate) warehouse: Warehouse,
    pub(crate) orders:    OrderBook,
    pub(crate) config:    Arc<Mutex<ErpConfig>>,
}

/// Headline numbers for the operations dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Orders on file, all states.
    pub total_orders:           usize,
    /// Orders still being worked (pending, confirmed or processing).
    pub open_orders:            usize,
    /// Orders dated today that reached delivered.
    pub delivered_today:        usize,
    /// Bags on hand across the warehouse.
    pub total_stock_bags:       u64,
    /// Products below the stock alert threshold.
    pub low_stock_alerts:       usize,
    /// Undelivered orders past their promised delivery date.
    pub delayed_orders:         usize,
    /// Delivered revenue dated today.
    pub revenue_today:          Decimal,
    /// Delivered revenue dated yesterday.
    pub revenue_yesterday:      Decimal,
    /// Day-over-day revenue change in percent; zero when yesterday was zero.
    pub revenue_change_percent: Decimal,
    /// Drivers currently on active duty.
    pub active_drivers:         usize,
}

impl Reports {
    /// Creates a reporting service over the given stores.
    #[must_use]
    pub fn new(
        directory: DirectoryService, warehouse: Warehouse, orders: OrderBook,
        config: Arc<Mutex<ErpConfig>>,
    ) -> Self {
        Self { directory, warehouse, orders, config }
    }

    pub(crate) fn config(&self) -> ErpResult<ErpConfig> {
        self.config.lock().map(|c| c.clone()).map_err(|_| ErpError::LockPoisoned)
    }

    /// Computes the operations dashboard for the given day.
    pub fn dashboard_stats(&self, today: NaiveDate) -> ErpResult<DashboardStats> {
        let config = self.config()?;
        let orders = self.orders.all_orders()?;
        let yesterday = today.pred_opt().unwrap_or(today);

        let open_orders = orders
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
                )
            })
            .count();
        let delivered_today = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered && o.order_date == today)
            .count();
        let delayed_orders = orders.iter().filter(|o| o.is_delayed(today)).count();

        let revenue_on = |date: NaiveDate| -> Decimal {
            orders
                .iter()
                .filter(|o| o.status == OrderStatus::Delivered && o.order_date == date)
                .map(|o| o.total_amount)
                .sum()
        };
        let revenue_today = revenue_on(today);
        let revenue_yesterday = revenue_on(yesterday);
        let revenue_change_percent = if revenue_yesterday > Decimal::ZERO {
            round2((revenue_today - revenue_yesterday) / revenue_yesterday * Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        };

        let warehouse_stats = self.warehouse.stats()?;
        let low_stock_alerts = self
            .warehouse
            .search_products(&Default::default())?
            .iter()
            .filter(|p| p.stock_quantity < config.low_stock_alert_threshold)
            .count();

        Ok(DashboardStats {
            total_orders: orders.len(),
            open_orders,
            delivered_today,
            total_stock_bags: warehouse_stats.total_bags,
            low_stock_alerts,
            delayed_orders,
            revenue_today,
            revenue_yesterday,
            revenue_change_percent,
            active_drivers: self.directory.active_driver_count()?,
        })
    }
}
