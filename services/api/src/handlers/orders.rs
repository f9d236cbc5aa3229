use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gilt_auth_types::identity::Identity;
use gilt_core::response::ApiResponse;
use gilt_domain::order::{OrderStatus, PaymentMethod, PaymentStatus};
use gilt_domain::pagination::PageRequest;

use crate::domain::types::{BillingAddress, Order};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::order::{
    CancelOrderUseCase, GetOrderUseCase, ListOrdersUseCase, PlaceOrderInput, PlaceOrderUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    pub price_at_purchase: Decimal,
}

#[derive(Serialize)]
pub struct BillingAddressResponse {
    pub name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub items: Vec<OrderItemResponse>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub billing: BillingAddressResponse,
    #[serde(serialize_with = "gilt_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    price_at_purchase: item.price_at_purchase,
                })
                .collect(),
            subtotal: order.subtotal,
            tax: order.tax,
            shipping: order.shipping,
            total_amount: order.total_amount,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            order_status: order.order_status,
            billing: BillingAddressResponse {
                name: order.billing.name,
                street: order.billing.street,
                city: order.billing.city,
                postal_code: order.billing.postal_code,
                country: order.billing.country,
            },
            created_at: order.created_at,
        }
    }
}

// ── GET /api/orders ──────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct OrderListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_orders(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, ApiError> {
    let uc = ListOrdersUseCase {
        orders: state.order_repo(),
    };
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    };
    let orders = uc.execute(identity.user_id, page).await?;
    let items = orders.into_iter().map(OrderResponse::from).collect();
    Ok(Json(ApiResponse::with("orders fetched", items)))
}

// ── POST /api/orders ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct BillingAddressRequest {
    pub name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub payment_method: PaymentMethod,
    pub billing: BillingAddressRequest,
}

pub async fn place_order(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ApiError> {
    let uc = PlaceOrderUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
        orders: state.order_repo(),
    };
    let order = uc
        .execute(
            identity.user_id,
            PlaceOrderInput {
                payment_method: body.payment_method,
                billing: BillingAddress {
                    name: body.billing.name,
                    street: body.billing.street,
                    city: body.billing.city,
                    postal_code: body.billing.postal_code,
                    country: body.billing.country,
                },
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with("order placed", OrderResponse::from(order))),
    ))
}

// ── GET /api/orders/{id} ─────────────────────────────────────────────────────

pub async fn get_order(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let uc = GetOrderUseCase {
        orders: state.order_repo(),
    };
    let order = uc.execute(identity.user_id, id).await?;
    Ok(Json(ApiResponse::with(
        "order fetched",
        OrderResponse::from(order),
    )))
}

// ── PUT /api/orders/{id}/cancel ──────────────────────────────────────────────

pub async fn cancel_order(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let uc = CancelOrderUseCase {
        orders: state.order_repo(),
    };
    uc.execute(identity.user_id, id).await?;
    Ok(Json(ApiResponse::message("order cancelled")))
}
