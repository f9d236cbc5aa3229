use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gilt_auth_types::identity::Identity;
use gilt_core::response::ApiResponse;
use gilt_domain::pagination::PageRequest;

use crate::domain::types::Review;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::review::{
    CreateReviewInput, CreateReviewUseCase, DeleteReviewUseCase, ListProductReviewsUseCase,
    UpdateReviewInput, UpdateReviewUseCase,
};

#[derive(Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub rating: u8,
    pub comment: String,
    #[serde(serialize_with = "gilt_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "gilt_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            product_id: review.product_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ReviewListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

// ── GET /api/products/{id}/reviews ───────────────────────────────────────────

pub async fn list_product_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<ApiResponse<Vec<ReviewResponse>>>, ApiError> {
    let uc = ListProductReviewsUseCase {
        reviews: state.review_repo(),
        products: state.product_repo(),
    };
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    };
    let reviews = uc.execute(product_id, page).await?;
    let items = reviews.into_iter().map(ReviewResponse::from).collect();
    Ok(Json(ApiResponse::with("reviews fetched", items)))
}

// ── POST /api/products/{id}/reviews ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

pub async fn create_review(
    identity: Identity,
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(body): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewResponse>>), ApiError> {
    let uc = CreateReviewUseCase {
        reviews: state.review_repo(),
        products: state.product_repo(),
    };
    let review = uc
        .execute(
            identity.user_id,
            CreateReviewInput {
                product_id,
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with(
            "review created",
            ReviewResponse::from(review),
        )),
    ))
}

// ── PUT /api/products/{id}/reviews ───────────────────────────────────────────

pub async fn update_review(
    identity: Identity,
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(body): Json<ReviewRequest>,
) -> Result<Json<ApiResponse<ReviewResponse>>, ApiError> {
    let uc = UpdateReviewUseCase {
        reviews: state.review_repo(),
        products: state.product_repo(),
    };
    let review = uc
        .execute(
            identity.user_id,
            UpdateReviewInput {
                product_id,
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;
    Ok(Json(ApiResponse::with(
        "review updated",
        ReviewResponse::from(review),
    )))
}

// ── DELETE /api/products/{id}/reviews ────────────────────────────────────────

pub async fn delete_review(
    identity: Identity,
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let uc = DeleteReviewUseCase {
        reviews: state.review_repo(),
        products: state.product_repo(),
    };
    uc.execute(identity.user_id, product_id).await?;
    Ok(Json(ApiResponse::message("review deleted")))
}
