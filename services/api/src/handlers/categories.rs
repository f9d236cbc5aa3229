use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;

use gilt_core::response::ApiResponse;

use crate::domain::types::Category;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::category::{GetCategoryUseCase, ListCategoriesUseCase};

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    #[serde(serialize_with = "gilt_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            image_url: category.image_url,
            created_at: category.created_at,
        }
    }
}

// ── GET /api/categories ──────────────────────────────────────────────────────

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, ApiError> {
    let uc = ListCategoriesUseCase {
        categories: state.category_repo(),
    };
    let categories = uc.execute().await?;
    let items = categories.into_iter().map(CategoryResponse::from).collect();
    Ok(Json(ApiResponse::with("categories fetched", items)))
}

// ── GET /api/categories/{id} ─────────────────────────────────────────────────

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponse>>, ApiError> {
    let uc = GetCategoryUseCase {
        categories: state.category_repo(),
    };
    let category = uc.execute(id).await?;
    Ok(Json(ApiResponse::with(
        "category fetched",
        CategoryResponse::from(category),
    )))
}
