#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use gilt_domain::order::OrderStatus;
use gilt_domain::pagination::PageRequest;

use crate::domain::types::{
    Cart, Category, Order, OutboxEvent, Product, ProductFilter, Review, User, WishlistEntry,
};
use crate::error::ApiError;

/// Repository for user accounts and their volatile OTP/reset columns.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    /// Insert a new user and an outbox event atomically (same transaction).
    async fn create_with_outbox(&self, user: &User, event: &OutboxEvent) -> Result<(), ApiError>;

    /// Replace the registration OTP and write an outbox event atomically.
    async fn set_otp(
        &self,
        id: Uuid,
        otp: &str,
        expires_at: DateTime<Utc>,
        event: &OutboxEvent,
    ) -> Result<(), ApiError>;

    /// Mark the user verified and clear the registration OTP columns.
    async fn mark_verified(&self, id: Uuid) -> Result<(), ApiError>;

    /// Replace the reset OTP+token pair and write an outbox event atomically.
    async fn set_reset_secrets(
        &self,
        id: Uuid,
        otp: &str,
        token: &str,
        expires_at: DateTime<Utc>,
        event: &OutboxEvent,
    ) -> Result<(), ApiError>;

    /// Replace the password hash and clear the reset columns.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError>;
}

/// Repository for catalog products.
pub trait ProductRepository: Send + Sync {
    async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Vec<Product>, ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ApiError>;

    /// Fetch several products at once (cart/wishlist population).
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ApiError>;

    async fn create(&self, product: &Product) -> Result<(), ApiError>;

    /// Full-row update.
    async fn update(&self, product: &Product) -> Result<(), ApiError>;

    /// Delete a product. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;

    /// Overwrite the derived rating aggregates.
    async fn set_rating(&self, id: Uuid, average: Decimal, count: i32) -> Result<(), ApiError>;

    /// Append uploaded image URLs to the product's ordered image list.
    async fn append_images(&self, id: Uuid, urls: &[String]) -> Result<(), ApiError>;
}

/// Repository for product categories.
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, ApiError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, ApiError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, ApiError>;
    async fn create(&self, category: &Category) -> Result<(), ApiError>;
    async fn update(&self, category: &Category) -> Result<(), ApiError>;

    /// Delete a category. Returns `true` if a row was deleted. No guard
    /// against referencing products — see DESIGN.md.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Repository for the cart aggregate (cart row + item lines).
pub trait CartRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, ApiError>;

    /// Create the user's empty cart (lazy, on first add).
    async fn create(&self, user_id: Uuid) -> Result<Cart, ApiError>;

    /// Insert or replace the quantity of one product line.
    async fn upsert_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: u32,
    ) -> Result<(), ApiError>;

    /// Remove one product line. Returns `true` if a row was deleted.
    async fn remove_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<bool, ApiError>;

    /// Remove every line from the cart.
    async fn clear(&self, cart_id: Uuid) -> Result<(), ApiError>;

    /// Refresh the persisted total.
    async fn set_total(&self, cart_id: Uuid, total: Decimal) -> Result<(), ApiError>;
}

/// Repository for wishlist membership.
pub trait WishlistRepository: Send + Sync {
    async fn list(&self, user_id: Uuid) -> Result<Vec<WishlistEntry>, ApiError>;

    async fn contains(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ApiError>;

    /// Add a product. Returns `false` when it was already present.
    async fn add(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ApiError>;

    /// Remove a product. Returns `true` if a row was deleted.
    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ApiError>;

    async fn clear(&self, user_id: Uuid) -> Result<(), ApiError>;

    /// Atomically (one transaction) remove the wishlist entry, upsert the
    /// cart line to `quantity` and refresh the cart total. The all-or-
    /// nothing half of move-to-cart; validation happens in the usecase.
    async fn move_to_cart(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        cart_id: Uuid,
        quantity: u32,
        new_total: Decimal,
    ) -> Result<(), ApiError>;
}

/// Repository for placed orders.
pub trait OrderRepository: Send + Sync {
    /// Insert the order, its item lines and the stock decrements in one
    /// transaction. The stock check itself happened earlier in the
    /// usecase — check and decrement are not atomic across requests.
    async fn create(&self, order: &Order) -> Result<(), ApiError>;

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Order>, ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ApiError>;

    /// Update the fulfilment status. Returns `true` if a row changed.
    async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<bool, ApiError>;
}

/// Repository for product reviews.
pub trait ReviewRepository: Send + Sync {
    async fn find(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Review>, ApiError>;
    async fn list_by_product(
        &self,
        product_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Review>, ApiError>;
    async fn create(&self, review: &Review) -> Result<(), ApiError>;
    async fn update(&self, review: &Review) -> Result<(), ApiError>;

    /// Delete a review. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;

    /// All ratings currently stored for a product, for the aggregate
    /// recompute. Full scan by design — no incremental update.
    async fn ratings_for_product(&self, product_id: Uuid) -> Result<Vec<u8>, ApiError>;
}

/// Port to the external image object store.
pub trait ImageStorePort: Send + Sync {
    /// Upload one object and return its public URL.
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError>;

    /// Best-effort delete of a previously uploaded object by its URL.
    async fn delete(&self, url: &str) -> Result<(), ApiError>;
}
