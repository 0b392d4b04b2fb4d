// ============================================================================
// TESTS
// ============================================================================

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::errors::ErpError;
use crate::types::catalog::{CementGrade, Product};
use crate::types::directory::{DriverId, VendorId};

use super::types::{
    NewOrder, Order, OrderBook, OrderFilter, OrderItem, OrderStatus, Payment, PaymentStatus,
    PaymentType,
};

fn tax_18() -> Decimal {
    Decimal::new(1800, 2)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn product(name: &str, price_cents: i64) -> Product {
    Product::new(name, CementGrade::Grade53, Decimal::new(price_cents, 2))
}

fn two_line_order() -> Order {
    let a = product("OPC 53", 350_00);
    let b = product("PPC", 400_00);
    let request = NewOrder::new(VendorId::generate(), "Site 4, Ring Road")
        .with_discount_percent(Decimal::new(10, 0));
    let items = vec![
        OrderItem::from_product(&a, 10, None),
        OrderItem::from_product(&b, 5, None),
    ];
    Order::from_request(&request, items, tax_18())
}

// ============================================================================
// TOTAL CALCULATOR
// ============================================================================

#[test]
fn reference_totals_scenario() {
    let order = two_line_order();

    assert_eq!(order.subtotal, Decimal::new(5500_00, 2));
    assert_eq!(order.discount_amount, Decimal::new(550_00, 2));
    assert_eq!(order.tax_amount, Decimal::new(891_00, 2));
    assert_eq!(order.total_amount, Decimal::new(5841_00, 2));
}

#[test]
fn derived_amounts_round_half_away_from_zero() {
    let p = product("Odd Price", 33_33);
    let request = NewOrder::new(VendorId::generate(), "Somewhere")
        .with_discount_percent(Decimal::new(10, 0));
    let order = Order::from_request(&request, vec![OrderItem::from_product(&p, 3, None)], tax_18());

    assert_eq!(order.subtotal, Decimal::new(99_99, 2));
    // 9.999 rounds up to 10.00
    assert_eq!(order.discount_amount, Decimal::new(10_00, 2));
    // 89.99 * 18% = 16.1982 rounds to 16.20
    assert_eq!(order.tax_amount, Decimal::new(16_20, 2));
    assert_eq!(order.total_amount, Decimal::new(106_19, 2));
}

#[test]
fn recalculation_is_idempotent() {
    let mut order = two_line_order();
    let first = order.clone();

    order.recalculate_totals();

    assert_eq!(order.subtotal, first.subtotal);
    assert_eq!(order.discount_amount, first.discount_amount);
    assert_eq!(order.tax_amount, first.tax_amount);
    assert_eq!(order.total_amount, first.total_amount);
}

#[test]
fn empty_order_totals_are_zero() {
    let request = NewOrder::new(VendorId::generate(), "Nowhere");
    let order = Order::from_request(&request, Vec::new(), tax_18());

    assert_eq!(order.subtotal, Decimal::ZERO);
    assert_eq!(order.total_amount, Decimal::ZERO);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
}

proptest! {
    #[test]
    fn totals_are_consistent(
        quantities in proptest::collection::vec(1u32..500, 1..6),
        price_cents in proptest::collection::vec(1i64..100_000, 6),
        discount in 0u32..=100,
        tax in 0u32..=40,
    ) {
        let items: Vec<OrderItem> = quantities
            .iter()
            .zip(&price_cents)
            .map(|(&qty, &cents)| {
                OrderItem::from_product(&product("Bag", cents), qty, None)
            })
            .collect();
        let request = NewOrder::new(VendorId::generate(), "Anywhere")
            .with_discount_percent(Decimal::from(discount))
            .with_tax_percent(Decimal::from(tax));
        let order = Order::from_request(&request, items, tax_18());

        // total = subtotal - discount + tax, exactly.
        prop_assert_eq!(
            order.total_amount,
            order.subtotal - order.discount_amount + order.tax_amount
        );
        // Discount never exceeds the subtotal, nothing goes negative.
        prop_assert!(order.discount_amount <= order.subtotal);
        prop_assert!(order.tax_amount >= Decimal::ZERO);
        prop_assert!(order.total_amount >= Decimal::ZERO);
        // Every persisted amount carries at most 2 decimal places.
        prop_assert!(order.subtotal.scale() <= 2);
        prop_assert!(order.discount_amount.scale() <= 2);
        prop_assert!(order.tax_amount.scale() <= 2);
        prop_assert!(order.total_amount.scale() <= 2);
    }
}

#[test]
fn order_serializes_with_snake_case_enums() {
    let order = two_line_order();
    let json = serde_json::to_value(&order).expect("serialize");

    assert_eq!(json["status"], "pending");
    assert_eq!(json["payment_status"], "unpaid");
    assert_eq!(json["items"][0]["grade"], "grade53");
}

// ============================================================================
// PAYMENT RECONCILIATION
// ============================================================================

#[test]
fn payments_drive_payment_status() {
    let book = OrderBook::new();
    let order = book.insert_order(two_line_order(), "ORD").expect("insert");
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);

    book.record_payment(&order.id, Payment::new(Decimal::new(2000_00, 2), PaymentType::Cash))
        .expect("first payment");
    let after_first = book.get_order(&order.id).expect("get");
    assert_eq!(after_first.payment_status, PaymentStatus::Partial);
    assert_eq!(after_first.paid_amount, Decimal::new(2000_00, 2));
    assert_eq!(after_first.balance_amount(), Decimal::new(3841_00, 2));

    book.record_payment(
        &order.id,
        Payment::new(Decimal::new(3841_00, 2), PaymentType::Online).with_reference("UPI-8841"),
    )
    .expect("second payment");
    let settled = book.get_order(&order.id).expect("get");
    assert_eq!(settled.payment_status, PaymentStatus::Paid);
    assert_eq!(settled.balance_amount(), Decimal::ZERO);
}

#[test]
fn overpayment_is_accepted_as_credit() {
    let book = OrderBook::new();
    let order = book.insert_order(two_line_order(), "ORD").expect("insert");

    book.record_payment(&order.id, Payment::new(Decimal::new(6000_00, 2), PaymentType::Cheque))
        .expect("overpay");

    let paid = book.get_order(&order.id).expect("get");
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert_eq!(paid.balance_amount(), Decimal::new(-159_00, 2));
}

#[test]
fn negative_payment_is_refused() {
    let book = OrderBook::new();
    let order = book.insert_order(two_line_order(), "ORD").expect("insert");

    let result =
        book.record_payment(&order.id, Payment::new(Decimal::new(-1, 2), PaymentType::Cash));
    assert!(matches!(result, Err(ErpError::Validation(_))));
}

#[test]
fn cancelled_order_refuses_payments_but_delivered_accepts() {
    let book = OrderBook::new();
    let cancelled = book.insert_order(two_line_order(), "ORD").expect("insert");
    book.update_status(&cancelled.id, OrderStatus::Cancelled).expect("cancel");

    let refused =
        book.record_payment(&cancelled.id, Payment::new(Decimal::ONE, PaymentType::Cash));
    assert!(matches!(refused, Err(ErpError::Validation(_))));

    let delivered = book.insert_order(two_line_order(), "ORD").expect("insert");
    book.update_status(&delivered.id, OrderStatus::Delivered).expect("deliver");
    book.record_payment(&delivered.id, Payment::new(Decimal::new(5841_00, 2), PaymentType::Cash))
        .expect("settling after delivery is normal");
}

// ============================================================================
// ORDER NUMBERING
// ============================================================================

fn order_dated(d: NaiveDate) -> Order {
    let mut request = NewOrder::new(VendorId::generate(), "Yard");
    request.order_date = Some(d);
    Order::from_request(&request, Vec::new(), tax_18())
}

#[test]
fn numbers_are_sequential_within_a_day() {
    let book = OrderBook::new();
    let day = date(2026, 8, 29);

    let first = book.insert_order(order_dated(day), "ORD").expect("first");
    let second = book.insert_order(order_dated(day), "ORD").expect("second");
    let third = book.insert_order(order_dated(day), "ORD").expect("third");

    assert_eq!(first.order_number, "ORD-20260829-0001");
    assert_eq!(second.order_number, "ORD-20260829-0002");
    assert_eq!(third.order_number, "ORD-20260829-0003");
}

#[test]
fn numbering_restarts_each_day() {
    let book = OrderBook::new();

    book.insert_order(order_dated(date(2026, 8, 29)), "ORD").expect("day one");
    let next_day = book.insert_order(order_dated(date(2026, 8, 30)), "ORD").expect("day two");

    assert_eq!(next_day.order_number, "ORD-20260830-0001");
}

#[test]
fn concurrent_placements_draw_distinct_numbers() {
    let book = OrderBook::new();
    let day = date(2026, 8, 29);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let book = book.clone();
            std::thread::spawn(move || book.insert_order(order_dated(day), "ORD"))
        })
        .collect();

    let mut numbers: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().expect("join").expect("insert").order_number)
        .collect();
    numbers.sort();
    numbers.dedup();

    assert_eq!(numbers.len(), 8, "every placement got its own number");
    assert_eq!(numbers[0], "ORD-20260829-0001");
    assert_eq!(numbers[7], "ORD-20260829-0008");
}

// ============================================================================
// STATUS TRANSITIONS & ITEM WRITES
// ============================================================================

#[test]
fn terminal_states_cannot_be_left() {
    let book = OrderBook::new();
    let order = book.insert_order(two_line_order(), "ORD").expect("insert");

    book.update_status(&order.id, OrderStatus::Dispatched).expect("dispatch");
    book.update_status(&order.id, OrderStatus::Delivered).expect("deliver");

    let result = book.update_status(&order.id, OrderStatus::Pending);
    assert!(matches!(result, Err(ErpError::InvalidStatusTransition { .. })));

    // Re-asserting the same terminal state is harmless.
    book.update_status(&order.id, OrderStatus::Delivered).expect("no-op");
}

#[test]
fn removing_an_item_shrinks_totals() {
    let book = OrderBook::new();
    let order = book.insert_order(two_line_order(), "ORD").expect("insert");
    let removed_id = order.items[1].id;

    let removed = book.remove_item(&order.id, &removed_id).expect("remove");
    assert_eq!(removed.quantity, 5);

    let after = book.get_order(&order.id).expect("get");
    assert_eq!(after.items.len(), 1);
    // 3500.00 - 10% = 3150.00, + 18% tax = 3717.00
    assert_eq!(after.subtotal, Decimal::new(3500_00, 2));
    assert_eq!(after.total_amount, Decimal::new(3717_00, 2));
}

#[test]
fn delivered_order_refuses_item_changes() {
    let book = OrderBook::new();
    let order = book.insert_order(two_line_order(), "ORD").expect("insert");
    book.update_status(&order.id, OrderStatus::Delivered).expect("deliver");

    let extra = OrderItem::from_product(&product("Late Addition", 300_00), 1, None);
    let result = book.add_item(&order.id, extra);
    assert!(matches!(result, Err(ErpError::Validation(_))));
}

// ============================================================================
// REFERENCE MAINTENANCE & SEARCH
// ============================================================================

#[test]
fn detach_driver_clears_references() {
    let book = OrderBook::new();
    let driver = DriverId::generate();

    let mut request = NewOrder::new(VendorId::generate(), "Yard");
    request.driver_id = Some(driver);
    let order =
        book.insert_order(Order::from_request(&request, Vec::new(), tax_18()), "ORD").expect("a");
    book.insert_order(order_dated(date(2026, 8, 29)), "ORD").expect("b");

    let detached = book.detach_driver(&driver).expect("detach");
    assert_eq!(detached, 1);
    assert_eq!(book.get_order(&order.id).expect("get").driver_id, None);
}

#[test]
fn search_by_status_and_date_range() {
    let book = OrderBook::new();
    let early = book.insert_order(order_dated(date(2026, 8, 1)), "ORD").expect("early");
    let late = book.insert_order(order_dated(date(2026, 8, 20)), "ORD").expect("late");
    book.update_status(&late.id, OrderStatus::Confirmed).expect("confirm");

    let confirmed = book
        .search_orders(&OrderFilter {
            status: Some(OrderStatus::Confirmed),
            ..Default::default()
        })
        .expect("search status");
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, late.id);

    let first_week = book
        .search_orders(&OrderFilter {
            date_from: Some(date(2026, 8, 1)),
            date_to: Some(date(2026, 8, 7)),
            ..Default::default()
        })
        .expect("search dates");
    assert_eq!(first_week.len(), 1);
    assert_eq!(first_week[0].id, early.id);

    let by_number = book
        .search_orders(&OrderFilter {
            search: Some("20260820-0001".to_string()),
            ..Default::default()
        })
        .expect("search text");
    assert_eq!(by_number.len(), 1);
    assert_eq!(by_number[0].id, late.id);
}
