use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gilt_core::response::ApiResponse;
use gilt_domain::pagination::PageRequest;

use crate::domain::types::{MetalType, Product, ProductFilter, ProductSortBy};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::product::{GetProductUseCase, ListProductsUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Uuid,
    pub metal_type: MetalType,
    pub images: Vec<String>,
    pub ratings_average: Decimal,
    pub ratings_count: i32,
    #[serde(serialize_with = "gilt_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            category_id: product.category_id,
            metal_type: product.metal_type,
            images: product.images,
            ratings_average: product.ratings_average,
            ratings_count: product.ratings_count,
            created_at: product.created_at,
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ProductListQuery {
    pub category_id: Option<Uuid>,
    pub metal_type: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl ProductListQuery {
    /// Turn the raw query into the typed filter, rejecting unknown enum
    /// values before anything touches the database.
    pub fn into_filter(self) -> Result<(ProductFilter, PageRequest), ApiError> {
        let metal_type = match self.metal_type.as_deref() {
            None => None,
            Some(raw) => Some(
                MetalType::from_str(raw)
                    .ok_or_else(|| ApiError::validation("metal_type", "unknown metal type"))?,
            ),
        };
        let sort_by = match self.sort_by.as_deref() {
            None => None,
            Some(raw) => Some(
                ProductSortBy::from_kebab_case(raw)
                    .ok_or_else(|| ApiError::validation("sort_by", "unknown sort option"))?,
            ),
        };
        let filter = ProductFilter {
            category_id: self.category_id,
            metal_type,
            min_price: self.min_price,
            max_price: self.max_price,
            in_stock: self.in_stock,
            search: self.search,
            sort_by,
        };
        let page = PageRequest {
            per_page: self.per_page.unwrap_or(25),
            page: self.page.unwrap_or(1),
        };
        Ok((filter, page))
    }
}

// ── GET /api/products ────────────────────────────────────────────────────────

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, ApiError> {
    let (filter, page) = query.into_filter()?;
    let uc = ListProductsUseCase {
        products: state.product_repo(),
    };
    let products = uc.execute(filter, page).await?;
    let items = products.into_iter().map(ProductResponse::from).collect();
    Ok(Json(ApiResponse::with("products fetched", items)))
}

// ── GET /api/products/{id} ───────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError> {
    let uc = GetProductUseCase {
        products: state.product_repo(),
    };
    let product = uc.execute(id).await?;
    Ok(Json(ApiResponse::with(
        "product fetched",
        ProductResponse::from(product),
    )))
}
