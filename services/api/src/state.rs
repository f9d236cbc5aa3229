use sea_orm::DatabaseConnection;

use gilt_auth_types::identity::TokenSecret;

use crate::infra::db::{
    DbCartRepository, DbCategoryRepository, DbOrderRepository, DbProductRepository,
    DbReviewRepository, DbUserRepository, DbWishlistRepository,
};
use crate::infra::images::S3ImageStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub images: S3ImageStore,
    pub jwt_secret: String,
    pub cookie_domain: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn product_repo(&self) -> DbProductRepository {
        DbProductRepository {
            db: self.db.clone(),
        }
    }

    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn cart_repo(&self) -> DbCartRepository {
        DbCartRepository {
            db: self.db.clone(),
        }
    }

    pub fn wishlist_repo(&self) -> DbWishlistRepository {
        DbWishlistRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }

    pub fn review_repo(&self) -> DbReviewRepository {
        DbReviewRepository {
            db: self.db.clone(),
        }
    }

    pub fn image_store(&self) -> S3ImageStore {
        self.images.clone()
    }
}

impl TokenSecret for AppState {
    fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}
