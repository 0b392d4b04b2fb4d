//! Daily dispatch tracking.
//!
//! Supply-chain view over the orders dispatched or delivered on a given
//! date, with headline statistics for the dispatch board.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ErpResult;
use crate::implementation::order_management::types::{Order, OrderStatus};
use crate::types::directory::DriverId;

use super::Reports;

/// Filter for the dispatch board.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchFilter {
    /// Narrow to one of `Dispatched` / `Delivered`.
    pub status:    Option<OrderStatus>,
    /// Narrow to a single driver.
    pub driver_id: Option<DriverId>,
    /// Case-insensitive match on order number, vendor name, driver name or
    /// vehicle number.
    pub search:    Option<String>,
}

/// Statistics for a day's dispatches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchStats {
    /// Dispatched plus delivered orders for the day.
    pub total_dispatches: usize,
    /// Orders still on the road.
    pub dispatched_count: usize,
    /// Orders that reached the site.
    pub delivered_count:  usize,
    /// Bags across all of the day's dispatches.
    pub total_bags:       u64,
    /// Order value across all of the day's dispatches.
    pub total_value:      Decimal,
    /// Distinct drivers with an assignment that day.
    pub distinct_drivers: usize,
}

/// A day's dispatch board: the (filtered) orders plus unfiltered stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyDispatch {
    /// The date reported on.
    pub date:   NaiveDate,
    /// Matching orders, newest first.
    pub orders: Vec<Order>,
    /// Statistics over every dispatch of the day, ignoring the filter.
    pub stats:  DispatchStats,
}

impl Reports {
    /// Builds the dispatch board for a date.
    ///
    /// Only orders dated that day in `Dispatched` or `Delivered` state
    /// appear. The statistics always cover the whole day even when the
    /// filter narrows the listed orders.
    pub fn daily_dispatch(
        &self, date: NaiveDate, filter: &DispatchFilter,
    ) -> ErpResult<DailyDispatch> {
        let all = self.orders.all_orders()?;
        let day_orders: Vec<&Order> = all
            .iter()
            .filter(|o| {
                o.order_date == date
                    && matches!(o.status, OrderStatus::Dispatched | OrderStatus::Delivered)
            })
            .collect();

        let mut stats = DispatchStats {
            total_dispatches: day_orders.len(),
            ..Default::default()
        };
        let mut drivers: HashSet<DriverId> = HashSet::new();
        for order in &day_orders {
            match order.status {
                OrderStatus::Dispatched => stats.dispatched_count += 1,
                OrderStatus::Delivered => stats.delivered_count += 1,
                _ => {},
            }
            stats.total_bags += order.total_bags();
            stats.total_value += order.total_amount;
            if let Some(driver_id) = order.driver_id {
                drivers.insert(driver_id);
            }
        }
        stats.distinct_drivers = drivers.len();

        let mut orders: Vec<Order> = day_orders
            .into_iter()
            .filter(|o| self.dispatch_matches(o, filter))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.order_number.cmp(&a.order_number));

        Ok(DailyDispatch { date, orders, stats })
    }

    fn dispatch_matches(&self, order: &Order, filter: &DispatchFilter) -> bool {
        if let Some(status) = filter.status {
            if order.status != status {
                return false;
            }
        }

        if let Some(driver_id) = filter.driver_id {
            if order.driver_id != Some(driver_id) {
                return false;
            }
        }

        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let mut hit = order.order_number.to_lowercase().contains(&needle);

            if !hit {
                if let Ok(vendor) = self.directory.get_vendor(&order.vendor_id) {
                    hit = vendor.name.to_lowercase().contains(&needle);
                }
            }
            if !hit {
                if let Some(driver_id) = &order.driver_id {
                    if let Ok(driver) = self.directory.get_driver(driver_id) {
                        hit = driver.name.to_lowercase().contains(&needle)
                            || driver.vehicle_number.to_lowercase().contains(&needle);
                    }
                }
            }
            if !hit {
                return false;
            }
        }

        true
    }
}
