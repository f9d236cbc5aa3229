use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gilt_domain::order::{OrderStatus, PaymentMethod, PaymentStatus};
use gilt_domain::pagination::Sort;

/// OTP length in digits (numeric only).
pub const OTP_LEN: usize = 6;

/// OTP time-to-live in minutes, shared by registration and reset OTPs.
pub const OTP_TTL_MINS: i64 = 10;

/// Password-reset token length in characters.
pub const RESET_TOKEN_LEN: usize = 32;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Stock level below which a wishlist entry shows "low stock".
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Account record. `password_hash` is `None` for OAuth-linked accounts.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: u8,
    pub is_verified: bool,
    pub otp_code: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub reset_otp: Option<String>,
    pub reset_token: Option<String>,
    pub reset_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether `otp` matches the stored registration OTP and is unexpired.
    pub fn otp_matches(&self, otp: &str, now: DateTime<Utc>) -> OtpCheck {
        check_otp_pair(self.otp_code.as_deref(), self.otp_expires_at, otp, now)
    }

    /// Whether `proof` matches the stored reset OTP or reset token, unexpired.
    pub fn reset_proof_matches(&self, proof: &ResetProof, now: DateTime<Utc>) -> OtpCheck {
        let otp_check = proof.otp.as_deref().map(|otp| {
            check_otp_pair(self.reset_otp.as_deref(), self.reset_expires_at, otp, now)
        });
        let token_check = proof.token.as_deref().map(|token| {
            check_otp_pair(self.reset_token.as_deref(), self.reset_expires_at, token, now)
        });
        match (otp_check, token_check) {
            (Some(OtpCheck::Valid), _) | (_, Some(OtpCheck::Valid)) => OtpCheck::Valid,
            (Some(OtpCheck::Expired), _) | (_, Some(OtpCheck::Expired)) => OtpCheck::Expired,
            _ => OtpCheck::Mismatch,
        }
    }
}

/// Outcome of comparing a presented OTP against a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    Valid,
    Expired,
    Mismatch,
}

fn check_otp_pair(
    stored: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    presented: &str,
    now: DateTime<Utc>,
) -> OtpCheck {
    match (stored, expires_at) {
        (Some(code), Some(expiry)) if code == presented => {
            if expiry > now {
                OtpCheck::Valid
            } else {
                OtpCheck::Expired
            }
        }
        _ => OtpCheck::Mismatch,
    }
}

/// Proof presented to the reset-password endpoint: the emailed OTP, the
/// reset token from the emailed link, or both.
#[derive(Debug, Clone, Default)]
pub struct ResetProof {
    pub otp: Option<String>,
    pub token: Option<String>,
}

impl ResetProof {
    pub fn is_empty(&self) -> bool {
        self.otp.is_none() && self.token.is_none()
    }
}

/// Product category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metal a product is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetalType {
    Gold,
    Silver,
    Platinum,
    Diamond,
    Other,
}

impl MetalType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Platinum => "platinum",
            Self::Diamond => "diamond",
            Self::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "gold" => Some(Self::Gold),
            "silver" => Some(Self::Silver),
            "platinum" => Some(Self::Platinum),
            "diamond" => Some(Self::Diamond),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Catalog product.
#[derive(Debug, Clone)]
pub struct Product {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derived stock view for wishlist entries (not persisted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

pub fn stock_status(stock: i32) -> StockStatus {
    if stock <= 0 {
        StockStatus::OutOfStock
    } else if stock <= LOW_STOCK_THRESHOLD {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

/// A user's cart with its item lines.
#[derive(Debug, Clone)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub total_amount: Decimal,
}

impl Cart {
    /// Quantity currently in the cart for `product_id`, 0 when absent.
    pub fn quantity_of(&self, product_id: Uuid) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| item.quantity)
            .unwrap_or(0)
    }
}

/// One product line in a cart.
#[derive(Debug, Clone, Copy)]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Wishlist membership entry.
#[derive(Debug, Clone, Copy)]
pub struct WishlistEntry {
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Billing address captured at order placement.
#[derive(Debug, Clone)]
pub struct BillingAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Placed order with immutable price snapshot.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub billing: BillingAddress,
    pub created_at: DateTime<Utc>,
}

/// One line of a placed order. Name and price are snapshots.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    pub price_at_purchase: Decimal,
}

/// Product review.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outbox event for async delivery (e.g. OTP email).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// Sort options for product list queries.
#[derive(Debug, Clone, Copy)]
pub enum ProductSortBy {
    CreatedAt(Sort),
    Price(Sort),
    Name(Sort),
}

impl Default for ProductSortBy {
    fn default() -> Self {
        Self::CreatedAt(Sort::Desc)
    }
}

impl ProductSortBy {
    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "created-at-desc" => Some(Self::CreatedAt(Sort::Desc)),
            "created-at-asc" => Some(Self::CreatedAt(Sort::Asc)),
            "price-desc" => Some(Self::Price(Sort::Desc)),
            "price-asc" => Some(Self::Price(Sort::Asc)),
            "name-desc" => Some(Self::Name(Sort::Desc)),
            "name-asc" => Some(Self::Name(Sort::Asc)),
            _ => None,
        }
    }
}

/// Explicit, validated product list filter.
///
/// Built from the query string by the handler and checked by `validate`
/// before any database query is constructed from it.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub metal_type: Option<MetalType>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub search: Option<String>,
    pub sort_by: Option<ProductSortBy>,
}

impl ProductFilter {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(min) = self.min_price {
            if min < Decimal::ZERO {
                return Err("min price must be non-negative");
            }
        }
        if let Some(max) = self.max_price {
            if max < Decimal::ZERO {
                return Err("max price must be non-negative");
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err("min price must not exceed max price");
            }
        }
        if let Some(search) = &self.search {
            if search.trim().is_empty() {
                return Err("search term must not be blank");
            }
        }
        Ok(())
    }
}

/// Crude shape check used at registration; real verification is the OTP.
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
