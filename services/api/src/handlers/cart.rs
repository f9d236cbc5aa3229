use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gilt_auth_types::identity::Identity;
use gilt_core::response::ApiResponse;
use gilt_domain::pricing::Totals;

use crate::error::ApiError;
use crate::handlers::products::ProductResponse;
use crate::state::AppState;
use crate::usecase::cart::{
    AddToCartInput, AddToCartUseCase, CartView, ClearCartUseCase, GetCartUseCase,
    RemoveCartItemUseCase, UpdateCartItemInput, UpdateCartItemUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CartLineResponse {
    pub product: ProductResponse,
    pub quantity: u32,
    pub line_total: Decimal,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub totals: Totals,
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        Self {
            items: view
                .items
                .into_iter()
                .map(|line| CartLineResponse {
                    product: ProductResponse::from(line.product),
                    quantity: line.quantity,
                    line_total: line.line_total,
                })
                .collect(),
            totals: view.totals,
        }
    }
}

// ── GET /api/cart ────────────────────────────────────────────────────────────

pub async fn get_cart(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let uc = GetCartUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
    };
    let view = uc.execute(identity.user_id).await?;
    Ok(Json(ApiResponse::with("cart fetched", view.into())))
}

// ── POST /api/cart/add ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CartItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

pub async fn add_to_cart(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CartItemRequest>,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let uc = AddToCartUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
    };
    let view = uc
        .execute(
            identity.user_id,
            AddToCartInput {
                product_id: body.product_id,
                quantity: body.quantity,
            },
        )
        .await?;
    Ok(Json(ApiResponse::with("item added to cart", view.into())))
}

// ── PUT /api/cart/update ─────────────────────────────────────────────────────

pub async fn update_cart_item(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CartItemRequest>,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let uc = UpdateCartItemUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
    };
    let view = uc
        .execute(
            identity.user_id,
            UpdateCartItemInput {
                product_id: body.product_id,
                quantity: body.quantity,
            },
        )
        .await?;
    Ok(Json(ApiResponse::with("cart updated", view.into())))
}

// ── DELETE /api/cart/remove/{product_id} ─────────────────────────────────────

pub async fn remove_cart_item(
    identity: Identity,
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let uc = RemoveCartItemUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
    };
    let view = uc.execute(identity.user_id, product_id).await?;
    Ok(Json(ApiResponse::with("item removed from cart", view.into())))
}

// ── DELETE /api/cart/clear ───────────────────────────────────────────────────

pub async fn clear_cart(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let uc = ClearCartUseCase {
        carts: state.cart_repo(),
    };
    let view = uc.execute(identity.user_id).await?;
    Ok(Json(ApiResponse::with("cart cleared", view.into())))
}
