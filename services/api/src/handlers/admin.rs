use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use gilt_auth_types::identity::Identity;
use gilt_core::response::ApiResponse;
use gilt_domain::role::UserRole;

use crate::domain::types::MetalType;
use crate::error::ApiError;
use crate::handlers::categories::CategoryResponse;
use crate::handlers::products::{ProductListQuery, ProductResponse};
use crate::state::AppState;
use crate::usecase::catalog_import::{BulkImportUseCase, ImportReport};
use crate::usecase::category::{
    CreateCategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase, UpdateCategoryInput,
    UpdateCategoryUseCase,
};
use crate::usecase::product::{
    CreateProductInput, CreateProductUseCase, DeleteProductUseCase, ImageFile,
    ListProductsUseCase, UpdateProductInput, UpdateProductUseCase, UploadProductImagesUseCase,
};

fn require_admin(identity: &Identity) -> Result<(), ApiError> {
    if !matches!(UserRole::from_u8(identity.user_role), Some(UserRole::Admin)) {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

fn parse_metal_type(raw: &str) -> Result<MetalType, ApiError> {
    MetalType::from_str(raw).ok_or_else(|| ApiError::validation("metal_type", "unknown metal type"))
}

// ── GET /api/admin/products ──────────────────────────────────────────────────

pub async fn list_products_admin(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, ApiError> {
    require_admin(&identity)?;
    let (filter, page) = query.into_filter()?;
    let uc = ListProductsUseCase {
        products: state.product_repo(),
    };
    let products = uc.execute(filter, page).await?;
    let items = products.into_iter().map(ProductResponse::from).collect();
    Ok(Json(ApiResponse::with("products fetched", items)))
}

// ── POST /api/admin/products ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Uuid,
    pub metal_type: String,
    pub images: Vec<String>,
}

pub async fn create_product(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), ApiError> {
    require_admin(&identity)?;
    let uc = CreateProductUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
    };
    let product = uc
        .execute(CreateProductInput {
            name: body.name,
            description: body.description,
            price: body.price,
            stock: body.stock,
            category_id: body.category_id,
            metal_type: parse_metal_type(&body.metal_type)?,
            images: body.images,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with(
            "product created",
            ProductResponse::from(product),
        )),
    ))
}

// ── PUT /api/admin/products/{id} ─────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category_id: Option<Uuid>,
    pub metal_type: Option<String>,
    pub images: Option<Vec<String>>,
}

pub async fn update_product(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError> {
    require_admin(&identity)?;
    let metal_type = match body.metal_type.as_deref() {
        None => None,
        Some(raw) => Some(parse_metal_type(raw)?),
    };
    let uc = UpdateProductUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
    };
    let product = uc
        .execute(
            id,
            UpdateProductInput {
                name: body.name,
                description: body.description,
                price: body.price,
                stock: body.stock,
                category_id: body.category_id,
                metal_type,
                images: body.images,
            },
        )
        .await?;
    Ok(Json(ApiResponse::with(
        "product updated",
        ProductResponse::from(product),
    )))
}

// ── DELETE /api/admin/products/{id} ──────────────────────────────────────────

pub async fn delete_product(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&identity)?;
    let uc = DeleteProductUseCase {
        products: state.product_repo(),
        images: state.image_store(),
    };
    uc.execute(id).await?;
    Ok(Json(ApiResponse::message("product deleted")))
}

// ── POST /api/admin/products/{id}/images ─────────────────────────────────────

pub async fn upload_product_images(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    require_admin(&identity)?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("images", "malformed multipart body"))?
    {
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let content_type = field
            .content_type()
            .map(str::to_owned)
            .unwrap_or_else(|| "application/octet-stream".to_owned());
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::validation("images", "failed to read upload"))?;
        files.push(ImageFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let uc = UploadProductImagesUseCase {
        products: state.product_repo(),
        images: state.image_store(),
    };
    let urls = uc.execute(id, files).await?;
    Ok(Json(ApiResponse::with("images uploaded", urls)))
}

// ── POST /api/admin/bulk-upload ──────────────────────────────────────────────

pub async fn bulk_upload(
    identity: Identity,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ImportReport>>, ApiError> {
    require_admin(&identity)?;

    let mut csv_bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("file", "malformed multipart body"))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|_| ApiError::validation("file", "failed to read upload"))?;
            csv_bytes = Some(bytes.to_vec());
        }
    }
    let csv_bytes = csv_bytes.ok_or_else(|| ApiError::validation("file", "csv file required"))?;

    let uc = BulkImportUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
    };
    let report = uc.execute(&csv_bytes).await?;
    Ok(Json(ApiResponse::with("bulk import finished", report)))
}

// ── POST /api/admin/categories ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
}

pub async fn create_category(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), ApiError> {
    require_admin(&identity)?;
    let uc = CreateCategoryUseCase {
        categories: state.category_repo(),
    };
    let category = uc
        .execute(CreateCategoryInput {
            name: body.name,
            description: body.description,
            image_url: body.image_url,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with(
            "category created",
            CategoryResponse::from(category),
        )),
    ))
}

// ── PUT /api/admin/categories/{id} ───────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

pub async fn update_category(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<CategoryResponse>>, ApiError> {
    require_admin(&identity)?;
    let uc = UpdateCategoryUseCase {
        categories: state.category_repo(),
    };
    let category = uc
        .execute(
            id,
            UpdateCategoryInput {
                name: body.name,
                description: body.description,
                image_url: body.image_url,
            },
        )
        .await?;
    Ok(Json(ApiResponse::with(
        "category updated",
        CategoryResponse::from(category),
    )))
}

// ── DELETE /api/admin/categories/{id} ────────────────────────────────────────

pub async fn delete_category(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&identity)?;
    let uc = DeleteCategoryUseCase {
        categories: state.category_repo(),
    };
    uc.execute(id).await?;
    Ok(Json(ApiResponse::message("category deleted")))
}
