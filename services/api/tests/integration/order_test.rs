use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use gilt_api::domain::repository::CartRepository as _;
use gilt_api::domain::types::BillingAddress;
use gilt_api::error::ApiError;
use gilt_api::usecase::order::{
    CancelOrderUseCase, GetOrderUseCase, PlaceOrderInput, PlaceOrderUseCase,
};
use gilt_domain::order::{OrderStatus, PaymentMethod, PaymentStatus};

use crate::helpers::{MockCartRepo, MockOrderRepo, MockProductRepo, product};

fn billing() -> BillingAddress {
    BillingAddress {
        name: "Jane Doe".into(),
        street: "12 High St".into(),
        city: "Springfield".into(),
        postal_code: "560001".into(),
        country: "IN".into(),
    }
}

fn place_input() -> PlaceOrderInput {
    PlaceOrderInput {
        payment_method: PaymentMethod::Card,
        billing: billing(),
    }
}

async fn seed_cart(carts: &MockCartRepo, user_id: Uuid, product_id: Uuid, quantity: u32) {
    let cart = carts.create(user_id).await.unwrap();
    carts.upsert_item(cart.id, product_id, quantity).await.unwrap();
}

#[tokio::test]
async fn should_snapshot_prices_and_compute_totals() {
    let item = product(1500, 10);
    let user_id = Uuid::new_v4();
    let carts = MockCartRepo::new();
    let cart_handle = carts.handle();
    seed_cart(&carts, user_id, item.id, 2).await;

    let products = MockProductRepo::new(vec![item.clone()]);
    let product_handle = products.handle();
    let orders = MockOrderRepo::new(Arc::clone(&product_handle));
    let order_handle = orders.orders_handle();

    let uc = PlaceOrderUseCase {
        carts,
        products,
        orders,
    };
    let order = uc.execute(user_id, place_input()).await.unwrap();

    // subtotal 3000 -> tax 540, shipping 100, total 3640
    assert_eq!(order.subtotal, Decimal::from(3000));
    assert_eq!(order.tax, Decimal::new(54000, 2));
    assert_eq!(order.shipping, Decimal::from(100));
    assert_eq!(order.total_amount, Decimal::new(364000, 2));
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(order.items[0].price_at_purchase, Decimal::from(1500));
    assert_eq!(order.items[0].product_name, item.name);

    // Stock decremented, order stored, cart emptied with zero total.
    assert_eq!(product_handle.lock().unwrap()[0].stock, 8);
    assert_eq!(order_handle.lock().unwrap().len(), 1);
    let carts = cart_handle.lock().unwrap();
    assert!(carts[0].items.is_empty());
    assert_eq!(carts[0].total_amount, Decimal::ZERO);
}

#[tokio::test]
async fn should_keep_snapshot_immutable_after_price_change() {
    let item = product(1000, 5);
    let user_id = Uuid::new_v4();
    let carts = MockCartRepo::new();
    seed_cart(&carts, user_id, item.id, 1).await;

    let products = MockProductRepo::new(vec![item.clone()]);
    let product_handle = products.handle();
    let orders = MockOrderRepo::new(Arc::clone(&product_handle));
    let order_handle = orders.orders_handle();

    let uc = PlaceOrderUseCase {
        carts,
        products,
        orders,
    };
    let placed = uc.execute(user_id, place_input()).await.unwrap();

    // Catalog price doubles after placement.
    product_handle.lock().unwrap()[0].price = Decimal::from(2000);

    let stored = &order_handle.lock().unwrap()[0];
    assert_eq!(stored.id, placed.id);
    assert_eq!(stored.items[0].price_at_purchase, Decimal::from(1000));
    assert_eq!(stored.total_amount, placed.total_amount);
}

#[tokio::test]
async fn should_reject_order_when_stock_is_short() {
    let item = product(1000, 1);
    let user_id = Uuid::new_v4();
    let carts = MockCartRepo::new();
    let cart_handle = carts.handle();
    seed_cart(&carts, user_id, item.id, 2).await;

    let products = MockProductRepo::new(vec![item.clone()]);
    let orders = MockOrderRepo::new(products.handle());
    let order_handle = orders.orders_handle();

    let uc = PlaceOrderUseCase {
        carts,
        products,
        orders,
    };
    let result = uc.execute(user_id, place_input()).await;

    assert!(matches!(result, Err(ApiError::InsufficientStock { .. })));
    assert!(order_handle.lock().unwrap().is_empty());
    // Cart untouched on failure.
    assert_eq!(cart_handle.lock().unwrap()[0].items[0].quantity, 2);
}

#[tokio::test]
async fn should_reject_order_from_empty_cart() {
    let products = MockProductRepo::new(vec![]);
    let orders = MockOrderRepo::new(products.handle());
    let uc = PlaceOrderUseCase {
        carts: MockCartRepo::new(),
        products,
        orders,
    };
    let result = uc.execute(Uuid::new_v4(), place_input()).await;
    assert!(matches!(result, Err(ApiError::EmptyCart)));
}

#[tokio::test]
async fn should_reject_order_with_blank_billing_fields() {
    let products = MockProductRepo::new(vec![]);
    let orders = MockOrderRepo::new(products.handle());
    let uc = PlaceOrderUseCase {
        carts: MockCartRepo::new(),
        products,
        orders,
    };
    let mut input = place_input();
    input.billing.city = "  ".into();
    let result = uc.execute(Uuid::new_v4(), input).await;
    assert!(matches!(result, Err(ApiError::Validation { .. })));
}

#[tokio::test]
async fn should_cancel_pending_order_only() {
    let item = product(1000, 5);
    let user_id = Uuid::new_v4();
    let carts = MockCartRepo::new();
    seed_cart(&carts, user_id, item.id, 1).await;

    let products = MockProductRepo::new(vec![item.clone()]);
    let orders = MockOrderRepo::new(products.handle());
    let order_handle = orders.orders_handle();

    let uc = PlaceOrderUseCase {
        carts,
        products,
        orders,
    };
    let placed = uc.execute(user_id, place_input()).await.unwrap();

    let uc = CancelOrderUseCase {
        orders: MockOrderRepo {
            orders: Arc::clone(&order_handle),
            products: Arc::new(std::sync::Mutex::new(Vec::new())),
        },
    };
    uc.execute(user_id, placed.id).await.unwrap();
    assert_eq!(
        order_handle.lock().unwrap()[0].order_status,
        OrderStatus::Cancelled
    );

    // A second cancel finds a non-pending order.
    let uc = CancelOrderUseCase {
        orders: MockOrderRepo {
            orders: Arc::clone(&order_handle),
            products: Arc::new(std::sync::Mutex::new(Vec::new())),
        },
    };
    let result = uc.execute(user_id, placed.id).await;
    assert!(matches!(result, Err(ApiError::OrderNotCancellable)));
}

#[tokio::test]
async fn should_hide_other_users_orders() {
    let item = product(1000, 5);
    let owner = Uuid::new_v4();
    let carts = MockCartRepo::new();
    seed_cart(&carts, owner, item.id, 1).await;

    let products = MockProductRepo::new(vec![item.clone()]);
    let orders = MockOrderRepo::new(products.handle());
    let order_handle = orders.orders_handle();

    let uc = PlaceOrderUseCase {
        carts,
        products,
        orders,
    };
    let placed = uc.execute(owner, place_input()).await.unwrap();

    let uc = GetOrderUseCase {
        orders: MockOrderRepo {
            orders: order_handle,
            products: Arc::new(std::sync::Mutex::new(Vec::new())),
        },
    };
    let result = uc.execute(Uuid::new_v4(), placed.id).await;
    assert!(matches!(result, Err(ApiError::OrderNotFound)));
}
