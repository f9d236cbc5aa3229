use anyhow::Context as _;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use gilt_domain::order::{OrderStatus, PaymentMethod, PaymentStatus};
use gilt_domain::pagination::{PageRequest, Sort};
use gilt_api_schema::{
    cart_items, carts, categories, order_items, orders, outbox_events, products, reviews, users,
    wishlist_items,
};

use crate::domain::repository::{
    CartRepository, CategoryRepository, OrderRepository, ProductRepository, ReviewRepository,
    UserRepository, WishlistRepository,
};
use crate::domain::types::{
    BillingAddress, Cart, CartItem, Category, MetalType, Order, OrderItem, OutboxEvent, Product,
    ProductFilter, ProductSortBy, Review, User, WishlistEntry,
};
use crate::error::ApiError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn create_with_outbox(&self, user: &User, event: &OutboxEvent) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let user = user.clone();
                let event = event.clone();
                Box::pin(async move {
                    insert_user(txn, &user).await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("create user with outbox")?;
        Ok(())
    }

    async fn set_otp(
        &self,
        id: Uuid,
        otp: &str,
        expires_at: chrono::DateTime<Utc>,
        event: &OutboxEvent,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let otp = otp.to_owned();
                let event = event.clone();
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(id),
                        otp_code: Set(Some(otp)),
                        otp_expires_at: Set(Some(expires_at)),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("set otp with outbox")?;
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            is_verified: Set(true),
            otp_code: Set(None),
            otp_expires_at: Set(None),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark user verified")?;
        Ok(())
    }

    async fn set_reset_secrets(
        &self,
        id: Uuid,
        otp: &str,
        token: &str,
        expires_at: chrono::DateTime<Utc>,
        event: &OutboxEvent,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let otp = otp.to_owned();
                let token = token.to_owned();
                let event = event.clone();
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(id),
                        reset_otp: Set(Some(otp)),
                        reset_token: Set(Some(token)),
                        reset_expires_at: Set(Some(expires_at)),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("set reset secrets with outbox")?;
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(Some(password_hash.to_owned())),
            reset_otp: Set(None),
            reset_token: Set(None),
            reset_expires_at: Set(None),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update user password")?;
        Ok(())
    }
}

async fn insert_user(txn: &DatabaseTransaction, user: &User) -> Result<(), sea_orm::DbErr> {
    users::ActiveModel {
        id: Set(user.id),
        name: Set(user.name.clone()),
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        role: Set(i16::from(user.role)),
        is_verified: Set(user.is_verified),
        otp_code: Set(user.otp_code.clone()),
        otp_expires_at: Set(user.otp_expires_at),
        reset_otp: Set(user.reset_otp.clone()),
        reset_token: Set(user.reset_token.clone()),
        reset_expires_at: Set(user.reset_expires_at),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_outbox_event(
    txn: &DatabaseTransaction,
    event: &OutboxEvent,
) -> Result<(), sea_orm::DbErr> {
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        created_at: Set(Utc::now()),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        role: model.role as u8,
        is_verified: model.is_verified,
        otp_code: model.otp_code,
        otp_expires_at: model.otp_expires_at,
        reset_otp: model.reset_otp,
        reset_token: model.reset_token,
        reset_expires_at: model.reset_expires_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Product repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

impl ProductRepository for DbProductRepository {
    async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Vec<Product>, ApiError> {
        let PageRequest { per_page, page } = page.clamped();
        let mut query = products::Entity::find();

        if let Some(category_id) = filter.category_id {
            query = query.filter(products::Column::CategoryId.eq(category_id));
        }
        if let Some(metal_type) = filter.metal_type {
            query = query.filter(products::Column::MetalType.eq(metal_type.as_str()));
        }
        if let Some(min) = filter.min_price {
            query = query.filter(products::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(products::Column::Price.lte(max));
        }
        match filter.in_stock {
            Some(true) => query = query.filter(products::Column::Stock.gt(0)),
            Some(false) => query = query.filter(products::Column::Stock.lte(0)),
            None => {}
        }
        if let Some(search) = &filter.search {
            query = query.filter(products::Column::Name.contains(search.trim()));
        }

        query = match filter.sort_by.unwrap_or_default() {
            ProductSortBy::CreatedAt(Sort::Desc) => query.order_by_desc(products::Column::CreatedAt),
            ProductSortBy::CreatedAt(Sort::Asc) => query.order_by_asc(products::Column::CreatedAt),
            ProductSortBy::Price(Sort::Desc) => query.order_by_desc(products::Column::Price),
            ProductSortBy::Price(Sort::Asc) => query.order_by_asc(products::Column::Price),
            ProductSortBy::Name(Sort::Desc) => query.order_by_desc(products::Column::Name),
            ProductSortBy::Name(Sort::Asc) => query.order_by_asc(products::Column::Name),
        };

        let models = query
            .offset(u64::from((page - 1) * per_page))
            .limit(u64::from(per_page))
            .all(&self.db)
            .await
            .context("list products")?;
        Ok(models.into_iter().map(product_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ApiError> {
        let model = products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find product by id")?;
        Ok(model.map(product_from_model))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ApiError> {
        let models = products::Entity::find()
            .filter(products::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find products by ids")?;
        Ok(models.into_iter().map(product_from_model).collect())
    }

    async fn create(&self, product: &Product) -> Result<(), ApiError> {
        product_active_model(product)
            .insert(&self.db)
            .await
            .context("create product")?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), ApiError> {
        product_active_model(product)
            .update(&self.db)
            .await
            .context("update product")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = products::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete product")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_rating(&self, id: Uuid, average: Decimal, count: i32) -> Result<(), ApiError> {
        products::ActiveModel {
            id: Set(id),
            ratings_average: Set(average),
            ratings_count: Set(count),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set product rating")?;
        Ok(())
    }

    async fn append_images(&self, id: Uuid, urls: &[String]) -> Result<(), ApiError> {
        let model = products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find product for image append")?
            .ok_or(ApiError::ProductNotFound)?;

        let mut images: Vec<String> =
            serde_json::from_value(model.images.clone()).unwrap_or_default();
        images.extend(urls.iter().cloned());

        products::ActiveModel {
            id: Set(id),
            images: Set(serde_json::json!(images)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("append product images")?;
        Ok(())
    }
}

fn product_active_model(product: &Product) -> products::ActiveModel {
    products::ActiveModel {
        id: Set(product.id),
        name: Set(product.name.clone()),
        description: Set(product.description.clone()),
        price: Set(product.price),
        stock: Set(product.stock),
        category_id: Set(product.category_id),
        metal_type: Set(product.metal_type.as_str().to_owned()),
        images: Set(serde_json::json!(product.images)),
        ratings_average: Set(product.ratings_average),
        ratings_count: Set(product.ratings_count),
        created_at: Set(product.created_at),
        updated_at: Set(product.updated_at),
    }
}

fn product_from_model(model: products::Model) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        stock: model.stock,
        category_id: model.category_id,
        metal_type: MetalType::from_str(&model.metal_type).unwrap_or(MetalType::Other),
        images: serde_json::from_value(model.images).unwrap_or_default(),
        ratings_average: model.ratings_average,
        ratings_count: model.ratings_count,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Category repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
}

impl CategoryRepository for DbCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, ApiError> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await
            .context("list categories")?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, ApiError> {
        let model = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find category by id")?;
        Ok(model.map(category_from_model))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, ApiError> {
        let model = categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .one(&self.db)
            .await
            .context("find category by name")?;
        Ok(model.map(category_from_model))
    }

    async fn create(&self, category: &Category) -> Result<(), ApiError> {
        categories::ActiveModel {
            id: Set(category.id),
            name: Set(category.name.clone()),
            description: Set(category.description.clone()),
            image_url: Set(category.image_url.clone()),
            created_at: Set(category.created_at),
            updated_at: Set(category.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create category")?;
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), ApiError> {
        categories::ActiveModel {
            id: Set(category.id),
            name: Set(category.name.clone()),
            description: Set(category.description.clone()),
            image_url: Set(category.image_url.clone()),
            updated_at: Set(category.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update category")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = categories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete category")?;
        Ok(result.rows_affected > 0)
    }
}

fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
        image_url: model.image_url,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Cart repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCartRepository {
    pub db: DatabaseConnection,
}

impl CartRepository for DbCartRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, ApiError> {
        let Some(cart) = carts::Entity::find()
            .filter(carts::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find cart by user")?
        else {
            return Ok(None);
        };

        let items = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .order_by_asc(cart_items::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list cart items")?;

        Ok(Some(Cart {
            id: cart.id,
            user_id: cart.user_id,
            items: items.into_iter().map(cart_item_from_model).collect(),
            total_amount: cart.total_amount,
        }))
    }

    async fn create(&self, user_id: Uuid) -> Result<Cart, ApiError> {
        let now = Utc::now();
        let model = carts::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            total_amount: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .context("create cart")?;
        Ok(Cart {
            id: model.id,
            user_id: model.user_id,
            items: Vec::new(),
            total_amount: model.total_amount,
        })
    }

    async fn upsert_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let item = cart_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart_id),
            product_id: Set(product_id),
            quantity: Set(quantity as i32),
            created_at: Set(Utc::now()),
        };
        cart_items::Entity::insert(item)
            .on_conflict(
                OnConflict::columns([cart_items::Column::CartId, cart_items::Column::ProductId])
                    .update_column(cart_items::Column::Quantity)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("upsert cart item")?;
        Ok(())
    }

    async fn remove_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<bool, ApiError> {
        let result = cart_items::Entity::delete_many()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .filter(cart_items::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await
            .context("remove cart item")?;
        Ok(result.rows_affected > 0)
    }

    async fn clear(&self, cart_id: Uuid) -> Result<(), ApiError> {
        cart_items::Entity::delete_many()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .exec(&self.db)
            .await
            .context("clear cart")?;
        Ok(())
    }

    async fn set_total(&self, cart_id: Uuid, total: Decimal) -> Result<(), ApiError> {
        carts::ActiveModel {
            id: Set(cart_id),
            total_amount: Set(total),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set cart total")?;
        Ok(())
    }
}

fn cart_item_from_model(model: cart_items::Model) -> CartItem {
    CartItem {
        product_id: model.product_id,
        quantity: u32::try_from(model.quantity).unwrap_or(0),
    }
}

// ── Wishlist repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbWishlistRepository {
    pub db: DatabaseConnection,
}

impl WishlistRepository for DbWishlistRepository {
    async fn list(&self, user_id: Uuid) -> Result<Vec<WishlistEntry>, ApiError> {
        let models = wishlist_items::Entity::find()
            .filter(wishlist_items::Column::UserId.eq(user_id))
            .order_by_asc(wishlist_items::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list wishlist")?;
        Ok(models
            .into_iter()
            .map(|m| WishlistEntry {
                product_id: m.product_id,
                created_at: m.created_at,
            })
            .collect())
    }

    async fn contains(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ApiError> {
        let model = wishlist_items::Entity::find_by_id((user_id, product_id))
            .one(&self.db)
            .await
            .context("check wishlist membership")?;
        Ok(model.is_some())
    }

    async fn add(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ApiError> {
        let existing = wishlist_items::Entity::find_by_id((user_id, product_id))
            .one(&self.db)
            .await
            .context("find wishlist entry for add")?;
        if existing.is_some() {
            return Ok(false);
        }
        wishlist_items::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("add wishlist entry")?;
        Ok(true)
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ApiError> {
        let result = wishlist_items::Entity::delete_many()
            .filter(wishlist_items::Column::UserId.eq(user_id))
            .filter(wishlist_items::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await
            .context("remove wishlist entry")?;
        Ok(result.rows_affected > 0)
    }

    async fn clear(&self, user_id: Uuid) -> Result<(), ApiError> {
        wishlist_items::Entity::delete_many()
            .filter(wishlist_items::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("clear wishlist")?;
        Ok(())
    }

    async fn move_to_cart(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        cart_id: Uuid,
        quantity: u32,
        new_total: Decimal,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    let deleted = wishlist_items::Entity::delete_many()
                        .filter(wishlist_items::Column::UserId.eq(user_id))
                        .filter(wishlist_items::Column::ProductId.eq(product_id))
                        .exec(txn)
                        .await?;
                    if deleted.rows_affected == 0 {
                        // Entry vanished between the usecase check and this
                        // write; roll the whole move back.
                        return Err(sea_orm::DbErr::Custom(
                            "wishlist entry no longer present".to_owned(),
                        ));
                    }

                    let item = cart_items::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        cart_id: Set(cart_id),
                        product_id: Set(product_id),
                        quantity: Set(quantity as i32),
                        created_at: Set(Utc::now()),
                    };
                    cart_items::Entity::insert(item)
                        .on_conflict(
                            OnConflict::columns([
                                cart_items::Column::CartId,
                                cart_items::Column::ProductId,
                            ])
                            .update_column(cart_items::Column::Quantity)
                            .to_owned(),
                        )
                        .exec_without_returning(txn)
                        .await?;

                    carts::ActiveModel {
                        id: Set(cart_id),
                        total_amount: Set(new_total),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("move wishlist entry to cart")?;
        Ok(())
    }
}

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl OrderRepository for DbOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let order = order.clone();
                Box::pin(async move {
                    orders::ActiveModel {
                        id: Set(order.id),
                        user_id: Set(order.user_id),
                        subtotal: Set(order.subtotal),
                        tax: Set(order.tax),
                        shipping: Set(order.shipping),
                        total_amount: Set(order.total_amount),
                        payment_method: Set(order.payment_method.as_str().to_owned()),
                        payment_status: Set(order.payment_status.as_str().to_owned()),
                        order_status: Set(order.order_status.as_str().to_owned()),
                        billing_name: Set(order.billing.name.clone()),
                        billing_street: Set(order.billing.street.clone()),
                        billing_city: Set(order.billing.city.clone()),
                        billing_postal_code: Set(order.billing.postal_code.clone()),
                        billing_country: Set(order.billing.country.clone()),
                        created_at: Set(order.created_at),
                    }
                    .insert(txn)
                    .await?;

                    for item in &order.items {
                        order_items::ActiveModel {
                            id: Set(item.id),
                            order_id: Set(order.id),
                            product_id: Set(item.product_id),
                            product_name: Set(item.product_name.clone()),
                            quantity: Set(item.quantity as i32),
                            price_at_purchase: Set(item.price_at_purchase),
                        }
                        .insert(txn)
                        .await?;

                        products::Entity::update_many()
                            .col_expr(
                                products::Column::Stock,
                                Expr::col(products::Column::Stock).sub(item.quantity as i32),
                            )
                            .filter(products::Column::Id.eq(item.product_id))
                            .exec(txn)
                            .await?;
                    }
                    Ok(())
                })
            })
            .await
            .context("create order with stock decrement")?;
        Ok(())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Order>, ApiError> {
        let PageRequest { per_page, page } = page.clamped();
        let models = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .offset(u64::from((page - 1) * per_page))
            .limit(u64::from(per_page))
            .all(&self.db)
            .await
            .context("list orders")?;

        let order_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut item_models = order_items::Entity::find()
            .filter(order_items::Column::OrderId.is_in(order_ids))
            .all(&self.db)
            .await
            .context("list order items")?;

        let mut result = Vec::with_capacity(models.len());
        for model in models {
            let items: Vec<order_items::Model> = {
                let (mine, rest): (Vec<_>, Vec<_>) = item_models
                    .drain(..)
                    .partition(|item| item.order_id == model.id);
                item_models = rest;
                mine
            };
            result.push(order_from_models(model, items)?);
        }
        Ok(result)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ApiError> {
        let Some(model) = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find order by id")?
        else {
            return Ok(None);
        };
        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(id))
            .all(&self.db)
            .await
            .context("find order items")?;
        Ok(Some(order_from_models(model, items)?))
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<bool, ApiError> {
        let result = orders::Entity::update_many()
            .col_expr(
                orders::Column::OrderStatus,
                Expr::value(status.as_str().to_owned()),
            )
            .filter(orders::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set order status")?;
        Ok(result.rows_affected > 0)
    }
}

fn order_from_models(
    model: orders::Model,
    items: Vec<order_items::Model>,
) -> Result<Order, ApiError> {
    let payment_method = PaymentMethod::from_str(&model.payment_method)
        .context("unknown payment method in orders row")?;
    let payment_status = PaymentStatus::from_str(&model.payment_status)
        .context("unknown payment status in orders row")?;
    let order_status = OrderStatus::from_str(&model.order_status)
        .context("unknown order status in orders row")?;

    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        items: items
            .into_iter()
            .map(|item| OrderItem {
                id: item.id,
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: u32::try_from(item.quantity).unwrap_or(0),
                price_at_purchase: item.price_at_purchase,
            })
            .collect(),
        subtotal: model.subtotal,
        tax: model.tax,
        shipping: model.shipping,
        total_amount: model.total_amount,
        payment_method,
        payment_status,
        order_status,
        billing: BillingAddress {
            name: model.billing_name,
            street: model.billing_street,
            city: model.billing_city,
            postal_code: model.billing_postal_code,
            country: model.billing_country,
        },
        created_at: model.created_at,
    })
}

// ── Review repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReviewRepository {
    pub db: DatabaseConnection,
}

impl ReviewRepository for DbReviewRepository {
    async fn find(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Review>, ApiError> {
        let model = reviews::Entity::find()
            .filter(reviews::Column::UserId.eq(user_id))
            .filter(reviews::Column::ProductId.eq(product_id))
            .one(&self.db)
            .await
            .context("find review")?;
        Ok(model.map(review_from_model))
    }

    async fn list_by_product(
        &self,
        product_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Review>, ApiError> {
        let PageRequest { per_page, page } = page.clamped();
        let models = reviews::Entity::find()
            .filter(reviews::Column::ProductId.eq(product_id))
            .order_by_desc(reviews::Column::CreatedAt)
            .offset(u64::from((page - 1) * per_page))
            .limit(u64::from(per_page))
            .all(&self.db)
            .await
            .context("list reviews")?;
        Ok(models.into_iter().map(review_from_model).collect())
    }

    async fn create(&self, review: &Review) -> Result<(), ApiError> {
        reviews::ActiveModel {
            id: Set(review.id),
            user_id: Set(review.user_id),
            product_id: Set(review.product_id),
            rating: Set(i16::from(review.rating)),
            comment: Set(review.comment.clone()),
            created_at: Set(review.created_at),
            updated_at: Set(review.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create review")?;
        Ok(())
    }

    async fn update(&self, review: &Review) -> Result<(), ApiError> {
        reviews::ActiveModel {
            id: Set(review.id),
            rating: Set(i16::from(review.rating)),
            comment: Set(review.comment.clone()),
            updated_at: Set(review.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update review")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = reviews::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete review")?;
        Ok(result.rows_affected > 0)
    }

    async fn ratings_for_product(&self, product_id: Uuid) -> Result<Vec<u8>, ApiError> {
        let models = reviews::Entity::find()
            .filter(reviews::Column::ProductId.eq(product_id))
            .all(&self.db)
            .await
            .context("load ratings for recompute")?;
        Ok(models
            .into_iter()
            .map(|m| u8::try_from(m.rating).unwrap_or(0))
            .collect())
    }
}

fn review_from_model(model: reviews::Model) -> Review {
    Review {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        rating: u8::try_from(model.rating).unwrap_or(0),
        comment: model.comment,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
