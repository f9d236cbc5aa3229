use uuid::Uuid;

use gilt_domain::stock::check_availability;

use crate::domain::repository::{CartRepository, ProductRepository, WishlistRepository};
use crate::domain::types::{Product, StockStatus, stock_status};
use crate::error::ApiError;
use crate::usecase::cart::{CartView, build_cart_view};

// ── Wishlist view ────────────────────────────────────────────────────────────

/// Wishlist entry populated with its product and derived stock fields.
/// `in_stock`/`stock_status` are computed on read, never persisted.
#[derive(Debug)]
pub struct WishlistLineView {
    pub product: Product,
    pub in_stock: bool,
    pub stock_status: StockStatus,
}

// ── GetWishlist ──────────────────────────────────────────────────────────────

pub struct GetWishlistUseCase<W: WishlistRepository, P: ProductRepository> {
    pub wishlist: W,
    pub products: P,
}

impl<W: WishlistRepository, P: ProductRepository> GetWishlistUseCase<W, P> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<WishlistLineView>, ApiError> {
        let entries = self.wishlist.list(user_id).await?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = entries.iter().map(|e| e.product_id).collect();
        let loaded = self.products.find_by_ids(&ids).await?;

        // Preserve wishlist insertion order; drop dangling references.
        let mut lines = Vec::with_capacity(entries.len());
        for entry in &entries {
            let Some(product) = loaded.iter().find(|p| p.id == entry.product_id) else {
                continue;
            };
            lines.push(WishlistLineView {
                in_stock: product.stock > 0,
                stock_status: stock_status(product.stock),
                product: product.clone(),
            });
        }
        Ok(lines)
    }
}

// ── AddToWishlist ────────────────────────────────────────────────────────────

pub struct AddToWishlistUseCase<W: WishlistRepository, P: ProductRepository> {
    pub wishlist: W,
    pub products: P,
}

impl<W: WishlistRepository, P: ProductRepository> AddToWishlistUseCase<W, P> {
    /// Membership is by product id equality; adding a present product is
    /// an error, not a no-op response.
    pub async fn execute(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ApiError> {
        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(ApiError::ProductNotFound);
        }
        let inserted = self.wishlist.add(user_id, product_id).await?;
        if !inserted {
            return Err(ApiError::WishlistDuplicate);
        }
        Ok(())
    }
}

// ── RemoveFromWishlist ───────────────────────────────────────────────────────

pub struct RemoveFromWishlistUseCase<W: WishlistRepository> {
    pub wishlist: W,
}

impl<W: WishlistRepository> RemoveFromWishlistUseCase<W> {
    pub async fn execute(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ApiError> {
        let removed = self.wishlist.remove(user_id, product_id).await?;
        if !removed {
            return Err(ApiError::WishlistItemNotFound);
        }
        Ok(())
    }
}

// ── ClearWishlist ────────────────────────────────────────────────────────────

pub struct ClearWishlistUseCase<W: WishlistRepository> {
    pub wishlist: W,
}

impl<W: WishlistRepository> ClearWishlistUseCase<W> {
    pub async fn execute(&self, user_id: Uuid) -> Result<(), ApiError> {
        self.wishlist.clear(user_id).await
    }
}

// ── MoveToCart ───────────────────────────────────────────────────────────────

pub struct MoveToCartInput {
    pub product_id: Uuid,
    pub quantity: u32,
}

pub struct MoveToCartUseCase<W: WishlistRepository, C: CartRepository, P: ProductRepository> {
    pub wishlist: W,
    pub carts: C,
    pub products: P,
}

impl<W: WishlistRepository, C: CartRepository, P: ProductRepository> MoveToCartUseCase<W, C, P> {
    /// All-or-nothing: every check runs before the single transactional
    /// write that removes the wishlist entry and upserts the cart line.
    /// Any failure leaves both collections untouched.
    pub async fn execute(&self, user_id: Uuid, input: MoveToCartInput) -> Result<CartView, ApiError> {
        if input.quantity < 1 {
            return Err(ApiError::InvalidQuantity);
        }
        if !self.wishlist.contains(user_id, input.product_id).await? {
            return Err(ApiError::WishlistItemNotFound);
        }
        let product = self
            .products
            .find_by_id(input.product_id)
            .await?
            .ok_or(ApiError::ProductNotFound)?;

        let cart = match self.carts.find_by_user(user_id).await? {
            Some(cart) => cart,
            None => self.carts.create(user_id).await?,
        };
        let in_cart = cart.quantity_of(input.product_id);
        let merged = in_cart + input.quantity;

        let availability = check_availability(product.stock, merged);
        if !availability.available {
            return Err(ApiError::InsufficientStock {
                requested: merged,
                available: availability.available_quantity,
                in_cart,
            });
        }

        let mut items: Vec<_> = cart
            .items
            .iter()
            .copied()
            .filter(|item| item.product_id != input.product_id)
            .collect();
        items.push(crate::domain::types::CartItem {
            product_id: input.product_id,
            quantity: merged,
        });
        let view = build_cart_view(&self.products, &items).await?;

        self.wishlist
            .move_to_cart(
                user_id,
                input.product_id,
                cart.id,
                merged,
                view.totals.total,
            )
            .await?;
        Ok(view)
    }
}
