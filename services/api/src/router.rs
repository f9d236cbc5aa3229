use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use gilt_core::health::{healthz, readyz};
use gilt_core::middleware::request_id_layer;

use crate::handlers::{
    admin::{
        bulk_upload, create_category, create_product, delete_category, delete_product,
        list_products_admin, update_category, update_product, upload_product_images,
    },
    auth::{
        forgot_password, get_me, login, logout, refresh_token, register, resend_otp,
        reset_password, verify_otp,
    },
    cart::{add_to_cart, clear_cart, get_cart, remove_cart_item, update_cart_item},
    categories::{get_category, list_categories},
    orders::{cancel_order, get_order, list_orders, place_order},
    products::{get_product, list_products},
    reviews::{create_review, delete_review, list_product_reviews, update_review},
    wishlist::{add_to_wishlist, clear_wishlist, get_wishlist, move_to_cart, remove_from_wishlist},
};
use crate::middleware::{RateLimitState, rate_limit};
use crate::state::AppState;

/// Rate-limit windows: global 100 req / 15 min, cart 20 req / min,
/// wishlist 30 req / min, keyed by user id or client IP.
const GLOBAL_LIMIT: (u32, Duration) = (100, Duration::from_secs(15 * 60));
const CART_LIMIT: (u32, Duration) = (20, Duration::from_secs(60));
const WISHLIST_LIMIT: (u32, Duration) = (30, Duration::from_secs(60));

pub fn build_router(state: AppState) -> Router {
    let global_limit = RateLimitState::new(GLOBAL_LIMIT.0, GLOBAL_LIMIT.1, &state.jwt_secret);
    let cart_limit = RateLimitState::new(CART_LIMIT.0, CART_LIMIT.1, &state.jwt_secret);
    let wishlist_limit =
        RateLimitState::new(WISHLIST_LIMIT.0, WISHLIST_LIMIT.1, &state.jwt_secret);

    let cart_routes = Router::new()
        .route("/api/cart", get(get_cart))
        .route("/api/cart/add", post(add_to_cart))
        .route("/api/cart/update", put(update_cart_item))
        .route("/api/cart/remove/{product_id}", delete(remove_cart_item))
        .route("/api/cart/clear", delete(clear_cart))
        .layer(middleware::from_fn_with_state(cart_limit, rate_limit));

    let wishlist_routes = Router::new()
        .route("/api/wishlist", get(get_wishlist))
        .route("/api/wishlist/add", post(add_to_wishlist))
        .route(
            "/api/wishlist/remove/{product_id}",
            delete(remove_from_wishlist),
        )
        .route("/api/wishlist/clear", delete(clear_wishlist))
        .route("/api/wishlist/move-to-cart", post(move_to_cart))
        .layer(middleware::from_fn_with_state(wishlist_limit, rate_limit));

    let api_routes = Router::new()
        // Auth
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify-otp", post(verify_otp))
        .route("/api/auth/resend-otp", post(resend_otp))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/refresh", post(refresh_token))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(get_me))
        // Catalog
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/products/{id}/reviews", get(list_product_reviews))
        .route("/api/products/{id}/reviews", post(create_review))
        .route("/api/products/{id}/reviews", put(update_review))
        .route("/api/products/{id}/reviews", delete(delete_review))
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{id}", get(get_category))
        // Orders
        .route("/api/orders", get(list_orders))
        .route("/api/orders", post(place_order))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/cancel", put(cancel_order))
        // Admin
        .route("/api/admin/products", get(list_products_admin))
        .route("/api/admin/products", post(create_product))
        .route("/api/admin/products/{id}", put(update_product))
        .route("/api/admin/products/{id}", delete(delete_product))
        .route(
            "/api/admin/products/{id}/images",
            post(upload_product_images),
        )
        .route("/api/admin/bulk-upload", post(bulk_upload))
        .route("/api/admin/categories", post(create_category))
        .route("/api/admin/categories/{id}", put(update_category))
        .route("/api/admin/categories/{id}", delete(delete_category))
        .merge(cart_routes)
        .merge(wishlist_routes)
        .layer(middleware::from_fn_with_state(global_limit, rate_limit));

    Router::new()
        // Health endpoints stay outside the rate-limit layers.
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
