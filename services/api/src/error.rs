use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API domain error variants, mapped statelessly to `(status, envelope)`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation { errors: serde_json::Value },
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email not verified")]
    EmailNotVerified,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("cart item not found")]
    CartItemNotFound,
    #[error("item not in wishlist")]
    WishlistItemNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("review not found")]
    ReviewNotFound,
    #[error("email already registered")]
    EmailTaken,
    #[error("category already exists")]
    CategoryExists,
    #[error("you have already reviewed this product")]
    ReviewExists,
    #[error("item already in wishlist")]
    WishlistDuplicate,
    #[error("email already verified")]
    AlreadyVerified,
    #[error("invalid otp")]
    InvalidOtp,
    #[error("otp expired")]
    OtpExpired,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("cart is empty")]
    EmptyCart,
    #[error("insufficient stock")]
    InsufficientStock {
        requested: u32,
        available: u32,
        in_cart: u32,
    },
    #[error("order can no longer be cancelled")]
    OrderNotCancellable,
    #[error("too many requests")]
    RateLimited,
    #[error("image store unavailable")]
    ImageStore(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Build a field-level validation error.
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            errors: serde_json::json!({ field: message }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::CartItemNotFound => "CART_ITEM_NOT_FOUND",
            Self::WishlistItemNotFound => "WISHLIST_ITEM_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::ReviewNotFound => "REVIEW_NOT_FOUND",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::CategoryExists => "CATEGORY_EXISTS",
            Self::ReviewExists => "REVIEW_EXISTS",
            Self::WishlistDuplicate => "WISHLIST_DUPLICATE",
            Self::AlreadyVerified => "ALREADY_VERIFIED",
            Self::InvalidOtp => "INVALID_OTP",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::EmptyCart => "EMPTY_CART",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::OrderNotCancellable => "ORDER_NOT_CANCELLABLE",
            Self::RateLimited => "RATE_LIMITED",
            Self::ImageStore(_) => "IMAGE_STORE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::AlreadyVerified
            | Self::InvalidOtp
            | Self::OtpExpired
            | Self::InvalidQuantity
            | Self::EmptyCart
            | Self::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            Self::EmailNotVerified | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::ProductNotFound
            | Self::CategoryNotFound
            | Self::CartItemNotFound
            | Self::WishlistItemNotFound
            | Self::OrderNotFound
            | Self::ReviewNotFound => StatusCode::NOT_FOUND,
            Self::EmailTaken
            | Self::CategoryExists
            | Self::ReviewExists
            | Self::WishlistDuplicate
            | Self::OrderNotCancellable => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::ImageStore(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn errors_detail(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation { errors } => Some(errors.clone()),
            Self::InsufficientStock {
                requested,
                available,
                in_cart,
            } => Some(serde_json::json!({
                "requested": requested,
                "available": available,
                "in_cart": in_cart,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Log 500s only — tower-http TraceLayer already records method/uri/status
        // for all requests. 4xx are expected client errors; logging them here
        // would be noise. Internal errors need the anyhow chain logged so the
        // root cause is traceable.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
            }
            Self::ImageStore(e) => {
                tracing::error!(error = %e, kind = "IMAGE_STORE", "image store error");
            }
            _ => {}
        }
        let mut body = serde_json::json!({
            "success": false,
            "message": self.to_string(),
        });
        if let Some(errors) = self.errors_detail() {
            body["errors"] = errors;
        }
        (status, axum::Json(body)).into_response()
    }
}
