use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::CategoryRepository;
use crate::domain::types::Category;
use crate::error::ApiError;

// ── ListCategories / GetCategory ─────────────────────────────────────────────

pub struct ListCategoriesUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> ListCategoriesUseCase<C> {
    pub async fn execute(&self) -> Result<Vec<Category>, ApiError> {
        self.categories.list().await
    }
}

pub struct GetCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> GetCategoryUseCase<C> {
    pub async fn execute(&self, id: Uuid) -> Result<Category, ApiError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(ApiError::CategoryNotFound)
    }
}

// ── CreateCategory (admin) ───────────────────────────────────────────────────

pub struct CreateCategoryInput {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

pub struct CreateCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> CreateCategoryUseCase<C> {
    pub async fn execute(&self, input: CreateCategoryInput) -> Result<Category, ApiError> {
        if input.name.trim().is_empty() {
            return Err(ApiError::validation("name", "must not be blank"));
        }
        if self.categories.find_by_name(&input.name).await?.is_some() {
            return Err(ApiError::CategoryExists);
        }

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            image_url: input.image_url,
            created_at: now,
            updated_at: now,
        };
        self.categories.create(&category).await?;
        Ok(category)
    }
}

// ── UpdateCategory (admin) ───────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

pub struct UpdateCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> UpdateCategoryUseCase<C> {
    pub async fn execute(&self, id: Uuid, input: UpdateCategoryInput) -> Result<Category, ApiError> {
        let mut category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or(ApiError::CategoryNotFound)?;

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ApiError::validation("name", "must not be blank"));
            }
            if name != category.name {
                if self.categories.find_by_name(&name).await?.is_some() {
                    return Err(ApiError::CategoryExists);
                }
                category.name = name;
            }
        }
        if let Some(description) = input.description {
            category.description = description;
        }
        if let Some(image_url) = input.image_url {
            category.image_url = Some(image_url);
        }

        category.updated_at = Utc::now();
        self.categories.update(&category).await?;
        Ok(category)
    }
}

// ── DeleteCategory (admin) ───────────────────────────────────────────────────

pub struct DeleteCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> DeleteCategoryUseCase<C> {
    /// No guard against products still referencing this category — their
    /// category_id is left dangling (see DESIGN.md).
    pub async fn execute(&self, id: Uuid) -> Result<(), ApiError> {
        let deleted = self.categories.delete(id).await?;
        if !deleted {
            return Err(ApiError::CategoryNotFound);
        }
        Ok(())
    }
}
