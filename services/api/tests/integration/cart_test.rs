use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use gilt_api::error::ApiError;
use gilt_api::usecase::cart::{
    AddToCartInput, AddToCartUseCase, ClearCartUseCase, GetCartUseCase, RemoveCartItemUseCase,
    UpdateCartItemInput, UpdateCartItemUseCase,
};

use crate::helpers::{MockCartRepo, MockProductRepo, product};

#[tokio::test]
async fn should_create_cart_lazily_and_compute_totals() {
    let item = product(3000, 10);
    let carts = MockCartRepo::new();
    let cart_handle = carts.handle();
    let uc = AddToCartUseCase {
        carts,
        products: MockProductRepo::new(vec![item.clone()]),
    };

    let view = uc
        .execute(
            Uuid::new_v4(),
            AddToCartInput {
                product_id: item.id,
                quantity: 2,
            },
        )
        .await
        .unwrap();

    // subtotal 6000 -> tax 1080, free shipping, total 7080
    assert_eq!(view.totals.subtotal, Decimal::from(6000));
    assert_eq!(view.totals.tax, Decimal::new(108000, 2));
    assert_eq!(view.totals.shipping, Decimal::ZERO);
    assert_eq!(view.totals.total, Decimal::new(708000, 2));

    let carts = cart_handle.lock().unwrap();
    assert_eq!(carts.len(), 1);
    assert_eq!(carts[0].items.len(), 1);
    assert_eq!(carts[0].items[0].quantity, 2);
    assert_eq!(carts[0].total_amount, Decimal::new(708000, 2));
}

#[tokio::test]
async fn should_merge_quantities_when_adding_same_product_twice() {
    let item = product(100, 10);
    let user_id = Uuid::new_v4();
    let carts = MockCartRepo::new();
    let cart_handle = carts.handle();
    let products = MockProductRepo::new(vec![item.clone()]);
    let product_handle = products.handle();

    let uc = AddToCartUseCase { carts, products };
    uc.execute(
        user_id,
        AddToCartInput {
            product_id: item.id,
            quantity: 1,
        },
    )
    .await
    .unwrap();

    let uc = AddToCartUseCase {
        carts: MockCartRepo::shared(Arc::clone(&cart_handle)),
        products: MockProductRepo::shared(product_handle),
    };
    let view = uc
        .execute(
            user_id,
            AddToCartInput {
                product_id: item.id,
                quantity: 2,
            },
        )
        .await
        .unwrap();

    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity, 3);
    assert_eq!(cart_handle.lock().unwrap()[0].items[0].quantity, 3);
}

#[tokio::test]
async fn should_leave_cart_unchanged_when_merge_exceeds_stock() {
    let item = product(100, 3);
    let user_id = Uuid::new_v4();
    let carts = MockCartRepo::new();
    let cart_handle = carts.handle();
    let products = MockProductRepo::new(vec![item.clone()]);
    let product_handle = products.handle();

    let uc = AddToCartUseCase { carts, products };
    uc.execute(
        user_id,
        AddToCartInput {
            product_id: item.id,
            quantity: 2,
        },
    )
    .await
    .unwrap();
    let total_before = cart_handle.lock().unwrap()[0].total_amount;

    let uc = AddToCartUseCase {
        carts: MockCartRepo::shared(Arc::clone(&cart_handle)),
        products: MockProductRepo::shared(product_handle),
    };
    let result = uc
        .execute(
            user_id,
            AddToCartInput {
                product_id: item.id,
                quantity: 2,
            },
        )
        .await;

    match result {
        Err(ApiError::InsufficientStock {
            requested,
            available,
            in_cart,
        }) => {
            assert_eq!(requested, 4);
            assert_eq!(available, 3);
            assert_eq!(in_cart, 2);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    let carts = cart_handle.lock().unwrap();
    assert_eq!(carts[0].items[0].quantity, 2);
    assert_eq!(carts[0].total_amount, total_before);
}

#[tokio::test]
async fn should_replace_quantity_outright_on_update() {
    let item = product(100, 10);
    let user_id = Uuid::new_v4();
    let carts = MockCartRepo::new();
    let cart_handle = carts.handle();
    let products = MockProductRepo::new(vec![item.clone()]);
    let product_handle = products.handle();

    let uc = AddToCartUseCase { carts, products };
    uc.execute(
        user_id,
        AddToCartInput {
            product_id: item.id,
            quantity: 2,
        },
    )
    .await
    .unwrap();

    let uc = UpdateCartItemUseCase {
        carts: MockCartRepo::shared(Arc::clone(&cart_handle)),
        products: MockProductRepo::shared(product_handle),
    };
    let view = uc
        .execute(
            user_id,
            UpdateCartItemInput {
                product_id: item.id,
                quantity: 5,
            },
        )
        .await
        .unwrap();

    // 5, not 2 + 5: update replaces.
    assert_eq!(view.items[0].quantity, 5);
}

#[tokio::test]
async fn should_reject_update_below_one() {
    let item = product(100, 10);
    let uc = UpdateCartItemUseCase {
        carts: MockCartRepo::new(),
        products: MockProductRepo::new(vec![item.clone()]),
    };
    let result = uc
        .execute(
            Uuid::new_v4(),
            UpdateCartItemInput {
                product_id: item.id,
                quantity: 0,
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::InvalidQuantity)));
}

#[tokio::test]
async fn should_reject_update_of_absent_line() {
    let item = product(100, 10);
    let uc = UpdateCartItemUseCase {
        carts: MockCartRepo::new(),
        products: MockProductRepo::new(vec![item.clone()]),
    };
    let result = uc
        .execute(
            Uuid::new_v4(),
            UpdateCartItemInput {
                product_id: item.id,
                quantity: 1,
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::CartItemNotFound)));
}

#[tokio::test]
async fn should_zero_totals_when_last_item_removed() {
    let item = product(100, 10);
    let user_id = Uuid::new_v4();
    let carts = MockCartRepo::new();
    let cart_handle = carts.handle();
    let products = MockProductRepo::new(vec![item.clone()]);
    let product_handle = products.handle();

    let uc = AddToCartUseCase { carts, products };
    uc.execute(
        user_id,
        AddToCartInput {
            product_id: item.id,
            quantity: 1,
        },
    )
    .await
    .unwrap();

    let uc = RemoveCartItemUseCase {
        carts: MockCartRepo::shared(Arc::clone(&cart_handle)),
        products: MockProductRepo::shared(product_handle),
    };
    let view = uc.execute(user_id, item.id).await.unwrap();

    assert!(view.items.is_empty());
    assert_eq!(view.totals.total, Decimal::ZERO);
    // Aggregate kept, not deleted.
    let carts = cart_handle.lock().unwrap();
    assert_eq!(carts.len(), 1);
    assert_eq!(carts[0].total_amount, Decimal::ZERO);
}

#[tokio::test]
async fn should_clear_cart_to_empty_with_zero_totals() {
    let item = product(100, 10);
    let user_id = Uuid::new_v4();
    let carts = MockCartRepo::new();
    let cart_handle = carts.handle();

    let uc = AddToCartUseCase {
        carts,
        products: MockProductRepo::new(vec![item.clone()]),
    };
    uc.execute(
        user_id,
        AddToCartInput {
            product_id: item.id,
            quantity: 2,
        },
    )
    .await
    .unwrap();

    let uc = ClearCartUseCase {
        carts: MockCartRepo::shared(Arc::clone(&cart_handle)),
    };
    let view = uc.execute(user_id).await.unwrap();

    assert!(view.items.is_empty());
    assert_eq!(view.totals.total, Decimal::ZERO);
    assert!(cart_handle.lock().unwrap()[0].items.is_empty());
}

#[tokio::test]
async fn should_return_empty_view_for_absent_cart() {
    let uc = GetCartUseCase {
        carts: MockCartRepo::new(),
        products: MockProductRepo::new(vec![]),
    };
    let view = uc.execute(Uuid::new_v4()).await.unwrap();
    assert!(view.items.is_empty());
    assert_eq!(view.totals.total, Decimal::ZERO);
}

#[tokio::test]
async fn should_reject_add_for_unknown_product() {
    let uc = AddToCartUseCase {
        carts: MockCartRepo::new(),
        products: MockProductRepo::new(vec![]),
    };
    let result = uc
        .execute(
            Uuid::new_v4(),
            AddToCartInput {
                product_id: Uuid::new_v4(),
                quantity: 1,
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::ProductNotFound)));
}
