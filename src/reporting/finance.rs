//! Finance analytics.
//!
//! Revenue, collection and ranking reports over a date range. Revenue
//! figures count delivered orders only; pending revenue tracks everything
//! still in flight.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ErpResult;
use crate::implementation::order_management::implementations::order_impl::round2;
use crate::implementation::order_management::types::{Order, OrderStatus, PaymentStatus};
use crate::types::catalog::{CementGrade, ProductId};
use crate::types::directory::VendorId;

use super::Reports;

/// Financial overview of a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceSummary {
    /// Start of the range, inclusive.
    pub date_from:           NaiveDate,
    /// End of the range, inclusive.
    pub date_to:             NaiveDate,
    /// Orders in the range, all states.
    pub total_orders:        usize,
    /// Delivered orders in the range.
    pub delivered_orders:    usize,
    /// Total value of delivered orders.
    pub delivered_revenue:   Decimal,
    /// Value of orders still in flight (everything except delivered and
    /// cancelled).
    pub pending_revenue:     Decimal,
    /// Money received across all orders in the range.
    pub total_paid:          Decimal,
    /// Delivered revenue not yet collected.
    pub outstanding:         Decimal,
    /// Average value of a delivered order.
    pub average_order_value: Decimal,
    /// total_paid / delivered_revenue as a percentage; zero when nothing
    /// was delivered.
    pub collection_rate:     Decimal,
    /// Order counts per status, lifecycle order, empty statuses omitted.
    pub status_breakdown:    Vec<StatusBreakdown>,
    /// Counts and value per payment status, empty statuses omitted.
    pub payment_breakdown:   Vec<PaymentBreakdown>,
}

/// Order count for one status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBreakdown {
    /// Status.
    pub status: OrderStatus,
    /// Orders in that status.
    pub count:  usize,
}

/// Count and value for one payment status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    /// Payment status.
    pub status: PaymentStatus,
    /// Orders in that status.
    pub count:  usize,
    /// Total order value in that status.
    pub amount: Decimal,
}

/// Delivered revenue for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenuePoint {
    /// The day.
    pub date:    NaiveDate,
    /// Delivered revenue dated that day.
    pub revenue: Decimal,
}

/// Delivered revenue for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    /// Year.
    pub year:    i32,
    /// Month, 1-12.
    pub month:   u32,
    /// Delivered revenue dated in that month.
    pub revenue: Decimal,
}

/// Quantity and revenue ranking entry for a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProduct {
    /// Product.
    pub product_id:     ProductId,
    /// Product name as snapshotted on the orders.
    pub product_name:   String,
    /// Grade.
    pub grade:          CementGrade,
    /// Bags sold on delivered orders.
    pub total_quantity: u64,
    /// Line revenue on delivered orders.
    pub total_revenue:  Decimal,
}

/// Order count and revenue ranking entry for a vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopVendor {
    /// Vendor.
    pub vendor_id:     VendorId,
    /// Vendor name, if still on file.
    pub vendor_name:   String,
    /// Delivered orders.
    pub order_count:   usize,
    /// Delivered revenue.
    pub total_revenue: Decimal,
}

impl Reports {
    /// Computes the finance summary for a date range (inclusive).
    pub fn finance_summary(
        &self, date_from: NaiveDate, date_to: NaiveDate,
    ) -> ErpResult<FinanceSummary> {
        let in_range = self.orders_in_range(date_from, date_to)?;

        let delivered: Vec<&Order> =
            in_range.iter().filter(|o| o.status == OrderStatus::Delivered).collect();
        let delivered_revenue: Decimal = delivered.iter().map(|o| o.total_amount).sum();
        let pending_revenue: Decimal = in_range
            .iter()
            .filter(|o| o.status.is_open())
            .map(|o| o.total_amount)
            .sum();
        let total_paid: Decimal = in_range.iter().map(|o| o.paid_amount).sum();

        let average_order_value = if delivered.is_empty() {
            Decimal::ZERO
        } else {
            round2(delivered_revenue / Decimal::from(delivered.len()))
        };
        let collection_rate = if delivered_revenue > Decimal::ZERO {
            round2(total_paid / delivered_revenue * Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        };

        let mut status_breakdown = Vec::new();
        for status in OrderStatus::all() {
            let count = in_range.iter().filter(|o| o.status == status).count();
            if count > 0 {
                status_breakdown.push(StatusBreakdown { status, count });
            }
        }

        let mut payment_breakdown = Vec::new();
        for status in [PaymentStatus::Unpaid, PaymentStatus::Partial, PaymentStatus::Paid] {
            let matching: Vec<&Order> =
                in_range.iter().filter(|o| o.payment_status == status).collect();
            if !matching.is_empty() {
                payment_breakdown.push(PaymentBreakdown {
                    status,
                    count: matching.len(),
                    amount: matching.iter().map(|o| o.total_amount).sum(),
                });
            }
        }

        Ok(FinanceSummary {
            date_from,
            date_to,
            total_orders: in_range.len(),
            delivered_orders: delivered.len(),
            delivered_revenue,
            pending_revenue,
            total_paid,
            outstanding: delivered_revenue - total_paid,
            average_order_value,
            collection_rate,
            status_breakdown,
            payment_breakdown,
        })
    }

    /// Delivered revenue per day over a range (inclusive), one point per
    /// day, zero-revenue days included.
    pub fn revenue_by_day(
        &self, date_from: NaiveDate, date_to: NaiveDate,
    ) -> ErpResult<Vec<RevenuePoint>> {
        let delivered = self.delivered_in_range(date_from, date_to)?;

        let mut by_day: HashMap<NaiveDate, Decimal> = HashMap::new();
        for order in &delivered {
            *by_day.entry(order.order_date).or_insert(Decimal::ZERO) += order.total_amount;
        }

        let mut points = Vec::new();
        let mut day = date_from;
        while day <= date_to {
            points.push(RevenuePoint {
                date:    day,
                revenue: by_day.get(&day).copied().unwrap_or(Decimal::ZERO),
            });
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        Ok(points)
    }

    /// Delivered revenue per calendar month for the last `months` months,
    /// oldest first, ending with the month containing `today`.
    pub fn revenue_by_month(
        &self, months: u32, today: NaiveDate,
    ) -> ErpResult<Vec<MonthlyRevenue>> {
        let orders = self.orders.all_orders()?;

        let mut buckets = Vec::new();
        for back in (0..months).rev() {
            let month_date = today.checked_sub_months(Months::new(back)).unwrap_or(today);
            let (year, month) = (month_date.year(), month_date.month());
            let revenue = orders
                .iter()
                .filter(|o| {
                    o.status == OrderStatus::Delivered
                        && o.order_date.year() == year
                        && o.order_date.month() == month
                })
                .map(|o| o.total_amount)
                .sum();
            buckets.push(MonthlyRevenue { year, month, revenue });
        }
        Ok(buckets)
    }

    /// Top products by delivered line revenue in a range.
    pub fn top_products(
        &self, date_from: NaiveDate, date_to: NaiveDate, limit: usize,
    ) -> ErpResult<Vec<TopProduct>> {
        let delivered = self.delivered_in_range(date_from, date_to)?;

        let mut by_product: HashMap<ProductId, TopProduct> = HashMap::new();
        for order in &delivered {
            for item in &order.items {
                let entry = by_product.entry(item.product_id).or_insert_with(|| TopProduct {
                    product_id:     item.product_id,
                    product_name:   item.product_name.clone(),
                    grade:          item.grade,
                    total_quantity: 0,
                    total_revenue:  Decimal::ZERO,
                });
                entry.total_quantity += u64::from(item.quantity);
                entry.total_revenue += item.total_price;
            }
        }

        let mut ranked: Vec<TopProduct> = by_product.into_values().collect();
        ranked.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Top vendors by delivered order revenue in a range.
    pub fn top_vendors(
        &self, date_from: NaiveDate, date_to: NaiveDate, limit: usize,
    ) -> ErpResult<Vec<TopVendor>> {
        let delivered = self.delivered_in_range(date_from, date_to)?;

        let mut by_vendor: HashMap<VendorId, TopVendor> = HashMap::new();
        for order in &delivered {
            let entry = by_vendor.entry(order.vendor_id).or_insert_with(|| TopVendor {
                vendor_id:     order.vendor_id,
                vendor_name:   self
                    .directory
                    .get_vendor(&order.vendor_id)
                    .map(|v| v.name)
                    .unwrap_or_default(),
                order_count:   0,
                total_revenue: Decimal::ZERO,
            });
            entry.order_count += 1;
            entry.total_revenue += order.total_amount;
        }

        let mut ranked: Vec<TopVendor> = by_vendor.into_values().collect();
        ranked.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
        ranked.truncate(limit);
        Ok(ranked)
    }

    fn orders_in_range(&self, from: NaiveDate, to: NaiveDate) -> ErpResult<Vec<Order>> {
        let orders = self.orders.all_orders()?;
        Ok(orders.into_iter().filter(|o| o.order_date >= from && o.order_date <= to).collect())
    }

    fn delivered_in_range(&self, from: NaiveDate, to: NaiveDate) -> ErpResult<Vec<Order>> {
        let mut orders = self.orders_in_range(from, to)?;
        orders.retain(|o| o.status == OrderStatus::Delivered);
        Ok(orders)
    }
}
