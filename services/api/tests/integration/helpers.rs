use std::sync::{Arc, Mutex};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use gilt_api::domain::repository::{
    CartRepository, OrderRepository, ProductRepository, UserRepository, WishlistRepository,
};
use gilt_api::domain::types::{
    Cart, CartItem, MetalType, Order, OutboxEvent, Product, ProductFilter, User, WishlistEntry,
};
use gilt_api::error::ApiError;
use gilt_domain::order::OrderStatus;
use gilt_domain::pagination::PageRequest;

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn product(price: i64, stock: i32) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: "Gold Ring".into(),
        description: "18k band".into(),
        price: Decimal::from(price),
        stock,
        category_id: Uuid::new_v4(),
        metal_type: MetalType::Gold,
        images: vec!["https://img.example.com/ring.jpg".into()],
        ratings_average: Decimal::ZERO,
        ratings_count: 0,
        created_at: now,
        updated_at: now,
    }
}

// ── MockProductRepo ──────────────────────────────────────────────────────────

pub struct MockProductRepo {
    pub products: Arc<Mutex<Vec<Product>>>,
}

impl MockProductRepo {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(Mutex::new(products)),
        }
    }

    pub fn shared(products: Arc<Mutex<Vec<Product>>>) -> Self {
        Self { products }
    }

    pub fn handle(&self) -> Arc<Mutex<Vec<Product>>> {
        Arc::clone(&self.products)
    }
}

impl ProductRepository for MockProductRepo {
    async fn list(
        &self,
        _filter: &ProductFilter,
        _page: PageRequest,
    ) -> Result<Vec<Product>, ApiError> {
        Ok(self.products.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ApiError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ApiError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn create(&self, product: &Product) -> Result<(), ApiError> {
        self.products.lock().unwrap().push(product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), ApiError> {
        let mut products = self.products.lock().unwrap();
        if let Some(existing) = products.iter_mut().find(|p| p.id == product.id) {
            *existing = product.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }

    async fn set_rating(&self, id: Uuid, average: Decimal, count: i32) -> Result<(), ApiError> {
        let mut products = self.products.lock().unwrap();
        if let Some(existing) = products.iter_mut().find(|p| p.id == id) {
            existing.ratings_average = average;
            existing.ratings_count = count;
        }
        Ok(())
    }

    async fn append_images(&self, id: Uuid, urls: &[String]) -> Result<(), ApiError> {
        let mut products = self.products.lock().unwrap();
        if let Some(existing) = products.iter_mut().find(|p| p.id == id) {
            existing.images.extend(urls.iter().cloned());
        }
        Ok(())
    }
}

// ── MockCartRepo ─────────────────────────────────────────────────────────────

pub struct MockCartRepo {
    pub carts: Arc<Mutex<Vec<Cart>>>,
}

impl MockCartRepo {
    pub fn new() -> Self {
        Self {
            carts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn shared(carts: Arc<Mutex<Vec<Cart>>>) -> Self {
        Self { carts }
    }

    pub fn handle(&self) -> Arc<Mutex<Vec<Cart>>> {
        Arc::clone(&self.carts)
    }
}

impl CartRepository for MockCartRepo {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, ApiError> {
        Ok(self
            .carts
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn create(&self, user_id: Uuid) -> Result<Cart, ApiError> {
        let cart = Cart {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            total_amount: Decimal::ZERO,
        };
        self.carts.lock().unwrap().push(cart.clone());
        Ok(cart)
    }

    async fn upsert_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let mut carts = self.carts.lock().unwrap();
        let cart = carts
            .iter_mut()
            .find(|c| c.id == cart_id)
            .expect("cart exists in mock");
        if let Some(item) = cart.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        } else {
            cart.items.push(CartItem {
                product_id,
                quantity,
            });
        }
        Ok(())
    }

    async fn remove_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<bool, ApiError> {
        let mut carts = self.carts.lock().unwrap();
        let cart = carts
            .iter_mut()
            .find(|c| c.id == cart_id)
            .expect("cart exists in mock");
        let before = cart.items.len();
        cart.items.retain(|i| i.product_id != product_id);
        Ok(cart.items.len() < before)
    }

    async fn clear(&self, cart_id: Uuid) -> Result<(), ApiError> {
        let mut carts = self.carts.lock().unwrap();
        if let Some(cart) = carts.iter_mut().find(|c| c.id == cart_id) {
            cart.items.clear();
        }
        Ok(())
    }

    async fn set_total(&self, cart_id: Uuid, total: Decimal) -> Result<(), ApiError> {
        let mut carts = self.carts.lock().unwrap();
        if let Some(cart) = carts.iter_mut().find(|c| c.id == cart_id) {
            cart.total_amount = total;
        }
        Ok(())
    }
}

// ── MockWishlistRepo ─────────────────────────────────────────────────────────

pub struct MockWishlistRepo {
    pub entries: Arc<Mutex<Vec<(Uuid, Uuid)>>>,
    pub carts: Arc<Mutex<Vec<Cart>>>,
}

impl MockWishlistRepo {
    pub fn new(entries: Vec<(Uuid, Uuid)>, carts: Arc<Mutex<Vec<Cart>>>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
            carts,
        }
    }

    pub fn entries_handle(&self) -> Arc<Mutex<Vec<(Uuid, Uuid)>>> {
        Arc::clone(&self.entries)
    }
}

impl WishlistRepository for MockWishlistRepo {
    async fn list(&self, user_id: Uuid) -> Result<Vec<WishlistEntry>, ApiError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, p)| WishlistEntry {
                product_id: *p,
                created_at: Utc::now(),
            })
            .collect())
    }

    async fn contains(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ApiError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .any(|(u, p)| *u == user_id && *p == product_id))
    }

    async fn add(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ApiError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|(u, p)| *u == user_id && *p == product_id) {
            return Ok(false);
        }
        entries.push((user_id, product_id));
        Ok(true)
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ApiError> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|(u, p)| !(*u == user_id && *p == product_id));
        Ok(entries.len() < before)
    }

    async fn clear(&self, user_id: Uuid) -> Result<(), ApiError> {
        self.entries.lock().unwrap().retain(|(u, _)| *u != user_id);
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
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|(u, p)| !(*u == user_id && *p == product_id));
        if entries.len() == before {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "wishlist entry no longer present"
            )));
        }

        let mut carts = self.carts.lock().unwrap();
        let cart = carts
            .iter_mut()
            .find(|c| c.id == cart_id)
            .expect("cart exists in mock");
        if let Some(item) = cart.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        } else {
            cart.items.push(CartItem {
                product_id,
                quantity,
            });
        }
        cart.total_amount = new_total;
        Ok(())
    }
}

// ── MockOrderRepo ────────────────────────────────────────────────────────────

pub struct MockOrderRepo {
    pub orders: Arc<Mutex<Vec<Order>>>,
    pub products: Arc<Mutex<Vec<Product>>>,
}

impl MockOrderRepo {
    pub fn new(products: Arc<Mutex<Vec<Product>>>) -> Self {
        Self {
            orders: Arc::new(Mutex::new(Vec::new())),
            products,
        }
    }

    pub fn orders_handle(&self) -> Arc<Mutex<Vec<Order>>> {
        Arc::clone(&self.orders)
    }
}

impl OrderRepository for MockOrderRepo {
    async fn create(&self, order: &Order) -> Result<(), ApiError> {
        let mut products = self.products.lock().unwrap();
        for item in &order.items {
            if let Some(product) = products.iter_mut().find(|p| p.id == item.product_id) {
                product.stock -= item.quantity as i32;
            }
        }
        self.orders.lock().unwrap().push(order.clone());
        Ok(())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        _page: PageRequest,
    ) -> Result<Vec<Order>, ApiError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ApiError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<bool, ApiError> {
        let mut orders = self.orders.lock().unwrap();
        match orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.order_status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── StatefulUserRepo ─────────────────────────────────────────────────────────

/// User repo whose writes actually mutate the stored rows, for full
/// register → verify → login flows.
pub struct StatefulUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub outbox: Arc<Mutex<Vec<OutboxEvent>>>,
}

impl StatefulUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            outbox: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn shared(users: Arc<Mutex<Vec<User>>>, outbox: Arc<Mutex<Vec<OutboxEvent>>>) -> Self {
        Self { users, outbox }
    }

    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }

    pub fn outbox_handle(&self) -> Arc<Mutex<Vec<OutboxEvent>>> {
        Arc::clone(&self.outbox)
    }
}

impl UserRepository for StatefulUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_with_outbox(&self, user: &User, event: &OutboxEvent) -> Result<(), ApiError> {
        self.users.lock().unwrap().push(user.clone());
        self.outbox.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn set_otp(
        &self,
        id: Uuid,
        otp: &str,
        expires_at: chrono::DateTime<Utc>,
        event: &OutboxEvent,
    ) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.otp_code = Some(otp.to_owned());
            user.otp_expires_at = Some(expires_at);
        }
        self.outbox.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.is_verified = true;
            user.otp_code = None;
            user.otp_expires_at = None;
        }
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
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.reset_otp = Some(otp.to_owned());
            user.reset_token = Some(token.to_owned());
            user.reset_expires_at = Some(expires_at);
        }
        self.outbox.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.password_hash = Some(password_hash.to_owned());
            user.reset_otp = None;
            user.reset_token = None;
            user.reset_expires_at = None;
        }
        Ok(())
    }
}
