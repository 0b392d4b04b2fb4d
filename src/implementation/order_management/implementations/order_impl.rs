//! Order business logic.
//!
//! The total calculator and payment reconciliation live here. Both are
//! idempotent: recomputing on an unchanged order changes nothing.

use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::implementation::order_management::types::{
    NewOrder, Order, OrderId, OrderItem, OrderItemId, OrderStatus, Payment, PaymentStatus,
};

/// Rounds a derived amount to 2 decimal places, half away from zero.
pub(crate) fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl Order {
    /// Builds an order from a placement request and its resolved line items.
    ///
    /// The order number is left empty; the book assigns it on insert.
    #[must_use]
    pub fn from_request(request: &NewOrder, items: Vec<OrderItem>, default_tax: Decimal) -> Self {
        let now = Utc::now();
        let mut order = Self {
            id: OrderId::generate(),
            order_number: String::new(),
            vendor_id: request.vendor_id,
            driver_id: request.driver_id,
            order_date: request.order_date.unwrap_or_else(|| now.date_naive()),
            delivery_date: request.delivery_date,
            delivery_address: request.delivery_address.clone(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_method: request.payment_method,
            subtotal: Decimal::ZERO,
            discount_percent: request.discount_percent,
            discount_amount: Decimal::ZERO,
            tax_percent: request.tax_percent.unwrap_or(default_tax),
            tax_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            notes: request.notes.clone(),
            items,
            payments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        order.recalculate_totals();
        order
    }

    // ========================================================================
    // TOTAL CALCULATOR
    // ========================================================================

    /// Recomputes all derived money fields from the line items.
    ///
    /// Discount applies to the subtotal, tax applies to the discounted
    /// amount. Runs after every item insert, update or delete.
    pub fn recalculate_totals(&mut self) {
        for item in &mut self.items {
            item.recalculate();
        }

        self.subtotal = round2(self.items.iter().map(|i| i.total_price).sum());
        self.discount_amount =
            round2(self.subtotal * self.discount_percent / Decimal::ONE_HUNDRED);
        let taxable = self.subtotal - self.discount_amount;
        self.tax_amount = round2(taxable * self.tax_percent / Decimal::ONE_HUNDRED);
        self.total_amount = taxable + self.tax_amount;

        // A shrunk total can flip the payment status.
        self.reconcile_payments();
    }

    // ========================================================================
    // PAYMENT RECONCILIATION
    // ========================================================================

    /// Recomputes `paid_amount` and the derived payment status from the
    /// recorded payments.
    pub fn reconcile_payments(&mut self) {
        self.paid_amount = round2(self.payments.iter().map(|p| p.amount).sum());

        self.payment_status = if self.paid_amount >= self.total_amount
            && self.total_amount > Decimal::ZERO
        {
            PaymentStatus::Paid
        } else if self.paid_amount > Decimal::ZERO {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        };
    }

    // ========================================================================
    // ITEM & PAYMENT MUTATIONS
    // ========================================================================

    /// Appends a line item and recomputes totals.
    pub(crate) fn add_item(&mut self, item: OrderItem) {
        self.items.push(item);
        self.recalculate_totals();
        self.touch();
    }

    /// Removes a line item and recomputes totals. Returns the removed item.
    pub(crate) fn remove_item(&mut self, item_id: &OrderItemId) -> Option<OrderItem> {
        let position = self.items.iter().position(|i| &i.id == item_id)?;
        let removed = self.items.remove(position);
        self.recalculate_totals();
        self.touch();
        Some(removed)
    }

    /// Appends a payment and reconciles.
    pub(crate) fn add_payment(&mut self, payment: Payment) {
        self.payments.push(payment);
        self.reconcile_payments();
        self.touch();
    }

    // ========================================================================
    // DERIVED VALUES
    // ========================================================================

    /// Amount still owed. Negative means the vendor is in credit.
    #[must_use]
    pub fn balance_amount(&self) -> Decimal {
        self.total_amount - self.paid_amount
    }

    /// Total bags across all line items.
    #[must_use]
    pub fn total_bags(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Whether the promised delivery date has passed on an undelivered order.
    #[must_use]
    pub fn is_delayed(&self, today: NaiveDate) -> bool {
        match self.delivery_date {
            Some(date) => date < today && self.status.is_open(),
            None => false,
        }
    }

    /// Updates the timestamp.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
