use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use gilt_domain::pagination::PageRequest;

use crate::domain::repository::{CategoryRepository, ImageStorePort, ProductRepository};
use crate::domain::types::{MetalType, Product, ProductFilter};
use crate::error::ApiError;

fn validate_product_fields(
    name: &str,
    price: Decimal,
    stock: i32,
    images: &[String],
) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("name", "must not be blank"));
    }
    if price < Decimal::ZERO {
        return Err(ApiError::validation("price", "must be non-negative"));
    }
    if stock < 0 {
        return Err(ApiError::validation("stock", "must be non-negative"));
    }
    if images.is_empty() {
        return Err(ApiError::validation("images", "at least one image required"));
    }
    Ok(())
}

// ── ListProducts ─────────────────────────────────────────────────────────────

pub struct ListProductsUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> ListProductsUseCase<P> {
    /// The filter is an explicit struct validated before any query is
    /// built from it.
    pub async fn execute(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Vec<Product>, ApiError> {
        filter
            .validate()
            .map_err(|message| ApiError::validation("filter", message))?;
        self.products.list(&filter, page).await
    }
}

// ── GetProduct ───────────────────────────────────────────────────────────────

pub struct GetProductUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> GetProductUseCase<P> {
    pub async fn execute(&self, id: Uuid) -> Result<Product, ApiError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or(ApiError::ProductNotFound)
    }
}

// ── CreateProduct (admin) ────────────────────────────────────────────────────

pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Uuid,
    pub metal_type: MetalType,
    pub images: Vec<String>,
}

pub struct CreateProductUseCase<P: ProductRepository, C: CategoryRepository> {
    pub products: P,
    pub categories: C,
}

impl<P: ProductRepository, C: CategoryRepository> CreateProductUseCase<P, C> {
    pub async fn execute(&self, input: CreateProductInput) -> Result<Product, ApiError> {
        validate_product_fields(&input.name, input.price, input.stock, &input.images)?;
        if self
            .categories
            .find_by_id(input.category_id)
            .await?
            .is_none()
        {
            return Err(ApiError::CategoryNotFound);
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
            category_id: input.category_id,
            metal_type: input.metal_type,
            images: input.images,
            ratings_average: Decimal::ZERO,
            ratings_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.products.create(&product).await?;
        Ok(product)
    }
}

// ── UpdateProduct (admin) ────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category_id: Option<Uuid>,
    pub metal_type: Option<MetalType>,
    pub images: Option<Vec<String>>,
}

pub struct UpdateProductUseCase<P: ProductRepository, C: CategoryRepository> {
    pub products: P,
    pub categories: C,
}

impl<P: ProductRepository, C: CategoryRepository> UpdateProductUseCase<P, C> {
    pub async fn execute(&self, id: Uuid, input: UpdateProductInput) -> Result<Product, ApiError> {
        let mut product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(ApiError::ProductNotFound)?;

        if let Some(name) = input.name {
            product.name = name;
        }
        if let Some(description) = input.description {
            product.description = description;
        }
        if let Some(price) = input.price {
            product.price = price;
        }
        if let Some(stock) = input.stock {
            product.stock = stock;
        }
        if let Some(metal_type) = input.metal_type {
            product.metal_type = metal_type;
        }
        if let Some(images) = input.images {
            product.images = images;
        }
        if let Some(category_id) = input.category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(ApiError::CategoryNotFound);
            }
            product.category_id = category_id;
        }

        validate_product_fields(
            &product.name,
            product.price,
            product.stock,
            &product.images,
        )?;
        product.updated_at = Utc::now();
        self.products.update(&product).await?;
        Ok(product)
    }
}

// ── DeleteProduct (admin) ────────────────────────────────────────────────────

pub struct DeleteProductUseCase<P: ProductRepository, I: ImageStorePort> {
    pub products: P,
    pub images: I,
}

impl<P: ProductRepository, I: ImageStorePort> DeleteProductUseCase<P, I> {
    /// Deletes the row first, then requests image cleanup sequentially.
    /// A store failure is logged and skipped — orphaned remote objects
    /// are possible.
    pub async fn execute(&self, id: Uuid) -> Result<(), ApiError> {
        let product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(ApiError::ProductNotFound)?;
        let deleted = self.products.delete(id).await?;
        if !deleted {
            return Err(ApiError::ProductNotFound);
        }
        for url in &product.images {
            if let Err(e) = self.images.delete(url).await {
                tracing::warn!(url = %url, error = %e, "failed to delete product image");
            }
        }
        Ok(())
    }
}

// ── UploadProductImages (admin) ──────────────────────────────────────────────

pub struct ImageFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct UploadProductImagesUseCase<P: ProductRepository, I: ImageStorePort> {
    pub products: P,
    pub images: I,
}

impl<P: ProductRepository, I: ImageStorePort> UploadProductImagesUseCase<P, I> {
    /// Files upload sequentially; the first failure aborts the remaining
    /// files for this request without rolling back already-uploaded
    /// objects (they stay orphaned in the store).
    pub async fn execute(&self, product_id: Uuid, files: Vec<ImageFile>) -> Result<Vec<String>, ApiError> {
        if files.is_empty() {
            return Err(ApiError::validation("images", "at least one file required"));
        }
        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(ApiError::ProductNotFound);
        }

        let mut urls = Vec::with_capacity(files.len());
        for file in &files {
            let key = format!("products/{}/{}-{}", product_id, Uuid::new_v4(), file.filename);
            let url = self
                .images
                .upload(&key, &file.content_type, file.bytes.clone())
                .await?;
            urls.push(url);
        }

        self.products.append_images(product_id, &urls).await?;
        Ok(urls)
    }
}
