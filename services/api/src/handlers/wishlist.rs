use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gilt_auth_types::identity::Identity;
use gilt_core::response::ApiResponse;

use crate::domain::types::StockStatus;
use crate::error::ApiError;
use crate::handlers::cart::CartResponse;
use crate::handlers::products::ProductResponse;
use crate::state::AppState;
use crate::usecase::wishlist::{
    AddToWishlistUseCase, ClearWishlistUseCase, GetWishlistUseCase, MoveToCartInput,
    MoveToCartUseCase, RemoveFromWishlistUseCase, WishlistLineView,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct WishlistLineResponse {
    pub product: ProductResponse,
    pub in_stock: bool,
    pub stock_status: StockStatus,
}

impl From<WishlistLineView> for WishlistLineResponse {
    fn from(line: WishlistLineView) -> Self {
        Self {
            in_stock: line.in_stock,
            stock_status: line.stock_status,
            product: ProductResponse::from(line.product),
        }
    }
}

// ── GET /api/wishlist ────────────────────────────────────────────────────────

pub async fn get_wishlist(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<WishlistLineResponse>>>, ApiError> {
    let uc = GetWishlistUseCase {
        wishlist: state.wishlist_repo(),
        products: state.product_repo(),
    };
    let lines = uc.execute(identity.user_id).await?;
    let items = lines.into_iter().map(WishlistLineResponse::from).collect();
    Ok(Json(ApiResponse::with("wishlist fetched", items)))
}

// ── POST /api/wishlist/add ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct WishlistAddRequest {
    pub product_id: Uuid,
}

pub async fn add_to_wishlist(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<WishlistAddRequest>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), ApiError> {
    let uc = AddToWishlistUseCase {
        wishlist: state.wishlist_repo(),
        products: state.product_repo(),
    };
    uc.execute(identity.user_id, body.product_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("item added to wishlist")),
    ))
}

// ── DELETE /api/wishlist/remove/{product_id} ─────────────────────────────────

pub async fn remove_from_wishlist(
    identity: Identity,
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let uc = RemoveFromWishlistUseCase {
        wishlist: state.wishlist_repo(),
    };
    uc.execute(identity.user_id, product_id).await?;
    Ok(Json(ApiResponse::message("item removed from wishlist")))
}

// ── DELETE /api/wishlist/clear ───────────────────────────────────────────────

pub async fn clear_wishlist(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let uc = ClearWishlistUseCase {
        wishlist: state.wishlist_repo(),
    };
    uc.execute(identity.user_id).await?;
    Ok(Json(ApiResponse::message("wishlist cleared")))
}

// ── POST /api/wishlist/move-to-cart ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct MoveToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "default_move_quantity")]
    pub quantity: u32,
}

fn default_move_quantity() -> u32 {
    1
}

pub async fn move_to_cart(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<MoveToCartRequest>,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let uc = MoveToCartUseCase {
        wishlist: state.wishlist_repo(),
        carts: state.cart_repo(),
        products: state.product_repo(),
    };
    let view = uc
        .execute(
            identity.user_id,
            MoveToCartInput {
                product_id: body.product_id,
                quantity: body.quantity,
            },
        )
        .await?;
    Ok(Json(ApiResponse::with("item moved to cart", view.into())))
}
