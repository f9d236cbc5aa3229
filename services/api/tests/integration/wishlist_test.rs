use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use uuid::Uuid;

use gilt_api::domain::types::StockStatus;
use gilt_api::error::ApiError;
use gilt_api::usecase::wishlist::{
    AddToWishlistUseCase, GetWishlistUseCase, MoveToCartInput, MoveToCartUseCase,
    RemoveFromWishlistUseCase,
};

use crate::helpers::{MockCartRepo, MockProductRepo, MockWishlistRepo, product};

#[tokio::test]
async fn should_add_once_and_reject_duplicate() {
    let item = product(500, 5);
    let user_id = Uuid::new_v4();
    let carts = Arc::new(Mutex::new(Vec::new()));
    let wishlist = MockWishlistRepo::new(vec![], Arc::clone(&carts));
    let entries = wishlist.entries_handle();

    let uc = AddToWishlistUseCase {
        wishlist,
        products: MockProductRepo::new(vec![item.clone()]),
    };
    uc.execute(user_id, item.id).await.unwrap();
    assert_eq!(entries.lock().unwrap().len(), 1);

    let uc = AddToWishlistUseCase {
        wishlist: MockWishlistRepo {
            entries: Arc::clone(&entries),
            carts,
        },
        products: MockProductRepo::new(vec![item.clone()]),
    };
    let result = uc.execute(user_id, item.id).await;
    assert!(matches!(result, Err(ApiError::WishlistDuplicate)));
    assert_eq!(entries.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_attach_derived_stock_view_fields() {
    let in_stock = product(500, 20);
    let low = product(300, 3);
    let gone = product(100, 0);
    let user_id = Uuid::new_v4();
    let carts = Arc::new(Mutex::new(Vec::new()));
    let wishlist = MockWishlistRepo::new(
        vec![
            (user_id, in_stock.id),
            (user_id, low.id),
            (user_id, gone.id),
        ],
        carts,
    );

    let uc = GetWishlistUseCase {
        wishlist,
        products: MockProductRepo::new(vec![in_stock.clone(), low.clone(), gone.clone()]),
    };
    let lines = uc.execute(user_id).await.unwrap();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].in_stock);
    assert_eq!(lines[0].stock_status, StockStatus::InStock);
    assert_eq!(lines[1].stock_status, StockStatus::LowStock);
    assert!(!lines[2].in_stock);
    assert_eq!(lines[2].stock_status, StockStatus::OutOfStock);
}

#[tokio::test]
async fn should_move_item_to_cart_all_or_nothing_success_path() {
    let item = product(2000, 10);
    let user_id = Uuid::new_v4();
    let carts = MockCartRepo::new();
    let cart_handle = carts.handle();
    let wishlist = MockWishlistRepo::new(vec![(user_id, item.id)], Arc::clone(&cart_handle));
    let entries = wishlist.entries_handle();

    let uc = MoveToCartUseCase {
        wishlist,
        carts,
        products: MockProductRepo::new(vec![item.clone()]),
    };
    let view = uc
        .execute(
            user_id,
            MoveToCartInput {
                product_id: item.id,
                quantity: 2,
            },
        )
        .await
        .unwrap();

    // Wishlist lost the item, cart gained it, totals recomputed.
    assert!(entries.lock().unwrap().is_empty());
    assert_eq!(view.items[0].quantity, 2);
    let carts = cart_handle.lock().unwrap();
    assert_eq!(carts[0].items[0].quantity, 2);
    // 4000 + 720 tax + 100 shipping
    assert_eq!(carts[0].total_amount, Decimal::new(482000, 2));
}

#[tokio::test]
async fn should_leave_both_collections_unchanged_when_stock_insufficient() {
    let item = product(2000, 1);
    let user_id = Uuid::new_v4();
    let carts = MockCartRepo::new();
    let cart_handle = carts.handle();
    let wishlist = MockWishlistRepo::new(vec![(user_id, item.id)], Arc::clone(&cart_handle));
    let entries = wishlist.entries_handle();

    let uc = MoveToCartUseCase {
        wishlist,
        carts,
        products: MockProductRepo::new(vec![item.clone()]),
    };
    let result = uc
        .execute(
            user_id,
            MoveToCartInput {
                product_id: item.id,
                quantity: 2,
            },
        )
        .await;

    assert!(matches!(result, Err(ApiError::InsufficientStock { .. })));
    assert_eq!(entries.lock().unwrap().len(), 1);
    // Lazily created cart exists but gained nothing.
    let carts = cart_handle.lock().unwrap();
    assert!(carts.iter().all(|c| c.items.is_empty()));
}

#[tokio::test]
async fn should_reject_move_of_item_not_in_wishlist() {
    let item = product(2000, 10);
    let carts = MockCartRepo::new();
    let cart_handle = carts.handle();
    let uc = MoveToCartUseCase {
        wishlist: MockWishlistRepo::new(vec![], cart_handle),
        carts,
        products: MockProductRepo::new(vec![item.clone()]),
    };
    let result = uc
        .execute(
            Uuid::new_v4(),
            MoveToCartInput {
                product_id: item.id,
                quantity: 1,
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::WishlistItemNotFound)));
}

#[tokio::test]
async fn should_reject_remove_of_absent_item() {
    let carts = Arc::new(Mutex::new(Vec::new()));
    let uc = RemoveFromWishlistUseCase {
        wishlist: MockWishlistRepo::new(vec![], carts),
    };
    let result = uc.execute(Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(matches!(result, Err(ApiError::WishlistItemNotFound)));
}
