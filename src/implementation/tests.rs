// ============================================================================
// TESTS
// ============================================================================

use chrono::Utc;
use rust_decimal::Decimal;

use crate::errors::ErpError;
use crate::types::catalog::{CementGrade, Product, StockAdjustmentMode};
use crate::types::directory::{Driver, Vendor};

use super::order_management::types::{NewOrder, OrderId, OrderStatus, Payment, PaymentType};
use super::CemErp;

fn setup() -> (CemErp, Vendor, Product) {
    let erp = CemErp::new();
    let vendor = erp
        .directory()
        .create_vendor(Vendor::new("Ravi Kumar", "+919876543210", "14 MG Road"))
        .expect("vendor");
    let product = erp
        .warehouse()
        .add_product(
            Product::new("OPC 53", CementGrade::Grade53, Decimal::new(350_00, 2))
                .with_initial_stock(500),
        )
        .expect("product");
    (erp, vendor, product)
}

fn stock_of(erp: &CemErp, product: &Product) -> u32 {
    erp.warehouse().get_product(&product.id).expect("product on file").stock_quantity
}

#[test]
fn create_order_numbers_prices_and_decrements() {
    let (erp, vendor, product) = setup();

    let order = erp
        .create_order(
            NewOrder::new(vendor.id, "Site 4, Ring Road")
                .with_item(product.id, 10)
                .with_discount_percent(Decimal::new(10, 0)),
        )
        .expect("create order");

    let expected_number = format!("ORD-{}-0001", Utc::now().date_naive().format("%Y%m%d"));
    assert_eq!(order.order_number, expected_number);
    assert_eq!(order.status, OrderStatus::Pending);

    // 3500.00 - 10% = 3150.00, + 18% default tax = 3717.00
    assert_eq!(order.items[0].unit_price, Decimal::new(350_00, 2));
    assert_eq!(order.subtotal, Decimal::new(3500_00, 2));
    assert_eq!(order.tax_percent, Decimal::new(1800, 2));
    assert_eq!(order.total_amount, Decimal::new(3717_00, 2));

    assert_eq!(stock_of(&erp, &product), 490);
}

#[test]
fn negotiated_unit_price_overrides_catalog() {
    let (erp, vendor, product) = setup();

    let order = erp
        .create_order(
            NewOrder::new(vendor.id, "Site 4")
                .with_priced_item(product.id, 10, Decimal::new(320_00, 2))
                .with_tax_percent(Decimal::ZERO),
        )
        .expect("create order");

    assert_eq!(order.items[0].unit_price, Decimal::new(320_00, 2));
    assert_eq!(order.total_amount, Decimal::new(3200_00, 2));
}

#[test]
fn insufficient_stock_leaves_no_trace() {
    let (erp, vendor, product) = setup();

    let result =
        erp.create_order(NewOrder::new(vendor.id, "Site 4").with_item(product.id, 501));

    assert!(matches!(
        result,
        Err(ErpError::InsufficientStock { available: 500, requested: 501, .. })
    ));
    assert_eq!(stock_of(&erp, &product), 500);
    assert_eq!(erp.orders().order_count().expect("count"), 0);
}

#[test]
fn inactive_vendor_cannot_order() {
    let (erp, vendor, product) = setup();
    erp.directory().deactivate_vendor(&vendor.id).expect("deactivate");

    let result = erp.create_order(NewOrder::new(vendor.id, "Site 4").with_item(product.id, 1));

    assert!(matches!(result, Err(ErpError::Validation(_))));
    assert_eq!(stock_of(&erp, &product), 500);
}

#[test]
fn order_needs_items() {
    let (erp, vendor, _product) = setup();

    let result = erp.create_order(NewOrder::new(vendor.id, "Site 4"));
    assert!(matches!(result, Err(ErpError::Validation(_))));
}

#[test]
fn add_item_to_missing_order_rolls_stock_back() {
    let (erp, _vendor, product) = setup();

    let result = erp.add_order_item(&OrderId::generate(), &product.id, 20, None);

    assert!(matches!(result, Err(ErpError::OrderNotFound(_))));
    assert_eq!(stock_of(&erp, &product), 500);
}

#[test]
fn add_and_remove_item_keep_stock_and_totals_in_step() {
    let (erp, vendor, product) = setup();
    let order = erp
        .create_order(
            NewOrder::new(vendor.id, "Site 4")
                .with_item(product.id, 10)
                .with_tax_percent(Decimal::ZERO),
        )
        .expect("create");
    assert_eq!(stock_of(&erp, &product), 490);

    let added = erp.add_order_item(&order.id, &product.id, 5, None).expect("add item");
    assert_eq!(stock_of(&erp, &product), 485);
    assert_eq!(
        erp.get_order(&order.id).expect("get").total_amount,
        Decimal::new(5250_00, 2)
    );

    erp.remove_order_item(&order.id, &added.id).expect("remove item");
    assert_eq!(stock_of(&erp, &product), 490);
    assert_eq!(
        erp.get_order(&order.id).expect("get").total_amount,
        Decimal::new(3500_00, 2)
    );
}

#[test]
fn cancelling_restocks_exactly_once() {
    let (erp, vendor, product) = setup();
    let order = erp
        .create_order(NewOrder::new(vendor.id, "Site 4").with_item(product.id, 120))
        .expect("create");
    assert_eq!(stock_of(&erp, &product), 380);

    erp.update_order_status(&order.id, OrderStatus::Cancelled).expect("cancel");
    assert_eq!(stock_of(&erp, &product), 500);

    // Re-asserting the terminal state must not restock again.
    erp.update_order_status(&order.id, OrderStatus::Cancelled).expect("no-op");
    assert_eq!(stock_of(&erp, &product), 500);
}

#[test]
fn vendor_with_orders_cannot_be_removed() {
    let (erp, vendor, product) = setup();
    erp.create_order(NewOrder::new(vendor.id, "Site 4").with_item(product.id, 1))
        .expect("create");

    let result = erp.remove_vendor(&vendor.id);
    assert!(matches!(result, Err(ErpError::ReferentialIntegrity(_))));

    let idle = erp
        .directory()
        .create_vendor(Vendor::new("No Orders Yet", "+919800000009", "9 Quiet St"))
        .expect("idle vendor");
    erp.remove_vendor(&idle.id).expect("removable");
}

#[test]
fn removing_a_driver_detaches_their_orders() {
    let (erp, vendor, product) = setup();
    let driver = erp
        .directory()
        .create_driver(Driver::new("Suresh", "+919812345678", "TN-09-2015-0042", "TN09AB1234", 400))
        .expect("driver");

    let order = erp
        .create_order(
            NewOrder::new(vendor.id, "Site 4").with_item(product.id, 1).with_driver(driver.id),
        )
        .expect("create");

    erp.remove_driver(&driver.id).expect("remove driver");

    assert_eq!(erp.get_order(&order.id).expect("get").driver_id, None);
    assert!(matches!(
        erp.directory().get_driver(&driver.id),
        Err(ErpError::DriverNotFound(_))
    ));
}

#[test]
fn referenced_product_cannot_be_removed() {
    let (erp, vendor, product) = setup();
    erp.create_order(NewOrder::new(vendor.id, "Site 4").with_item(product.id, 1))
        .expect("create");

    let result = erp.remove_product(&product.id);
    assert!(matches!(result, Err(ErpError::ReferentialIntegrity(_))));

    let unused = erp
        .warehouse()
        .add_product(Product::new("Unsold", CementGrade::Psc, Decimal::new(300_00, 2)))
        .expect("unused product");
    erp.remove_product(&unused.id).expect("removable");
}

#[test]
fn facade_stock_adjustment_is_audited() {
    let (erp, _vendor, product) = setup();

    erp.adjust_stock(&product.id, StockAdjustmentMode::Add, 100, Some("New delivery".into()))
        .expect("adjust");

    assert_eq!(stock_of(&erp, &product), 600);
    let history = erp.stock_history(&product.id, Some(1)).expect("history");
    assert_eq!(history[0].quantity_delta, 100);
    assert_eq!(history[0].reason.as_deref(), Some("New delivery"));
}

#[test]
fn racing_orders_cannot_oversell() {
    let erp = CemErp::new();
    let vendor = erp
        .directory()
        .create_vendor(Vendor::new("Racer", "+919800000001", "1 Fast Lane"))
        .expect("vendor");
    let product = erp
        .warehouse()
        .add_product(
            Product::new("Scarce", CementGrade::Grade43, Decimal::new(350_00, 2))
                .with_initial_stock(10),
        )
        .expect("product");

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let erp = erp.clone();
            let vendor_id = vendor.id;
            let product_id = product.id;
            std::thread::spawn(move || {
                erp.create_order(
                    NewOrder::new(vendor_id, "Either Site").with_item(product_id, 8),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().expect("join")).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();

    assert_eq!(successes, 1, "only one of the two 8-bag orders may win");
    assert_eq!(
        erp.warehouse().get_product(&product.id).expect("get").stock_quantity,
        2
    );
    assert_eq!(erp.orders().order_count().expect("count"), 1);
}

#[test]
fn payment_flows_through_the_facade() {
    let (erp, vendor, product) = setup();
    let order = erp
        .create_order(
            NewOrder::new(vendor.id, "Site 4")
                .with_item(product.id, 10)
                .with_tax_percent(Decimal::ZERO),
        )
        .expect("create");

    erp.record_payment(&order.id, Payment::new(Decimal::new(3500_00, 2), PaymentType::Cheque))
        .expect("pay");

    let settled = erp.get_order(&order.id).expect("get");
    assert_eq!(settled.balance_amount(), Decimal::ZERO);
}
