use rust_decimal::Decimal;
use uuid::Uuid;

use gilt_domain::pricing::{PriceLine, Totals};
use gilt_domain::stock::check_availability;

use crate::domain::repository::{CartRepository, ProductRepository};
use crate::domain::types::{Cart, CartItem, Product};
use crate::error::ApiError;

// ── Cart view ────────────────────────────────────────────────────────────────

/// Cart snapshot with populated product lines and freshly computed totals.
/// Persisted totals are never trusted: every view recomputes from current
/// product prices.
#[derive(Debug)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub totals: Totals,
}

#[derive(Debug)]
pub struct CartLineView {
    pub product: Product,
    pub quantity: u32,
    pub line_total: Decimal,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            totals: Totals::zero(),
        }
    }
}

/// Resolve item lines against current products and compute totals.
///
/// Lines whose product no longer exists are dropped from the view. An
/// empty cart has zero totals (the flat shipping charge only applies to
/// carts with lines).
pub async fn build_cart_view<P: ProductRepository>(
    products: &P,
    items: &[CartItem],
) -> Result<CartView, ApiError> {
    if items.is_empty() {
        return Ok(CartView::empty());
    }
    let ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
    let loaded = products.find_by_ids(&ids).await?;

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let Some(product) = loaded.iter().find(|p| p.id == item.product_id) else {
            continue;
        };
        lines.push(CartLineView {
            product: product.clone(),
            quantity: item.quantity,
            line_total: gilt_domain::pricing::round_money(
                product.price * Decimal::from(item.quantity),
            ),
        });
    }
    if lines.is_empty() {
        return Ok(CartView::empty());
    }

    let price_lines: Vec<PriceLine> = lines
        .iter()
        .map(|line| PriceLine {
            unit_price: line.product.price,
            quantity: line.quantity,
        })
        .collect();

    Ok(CartView {
        totals: Totals::compute(&price_lines),
        items: lines,
    })
}

/// Item list after setting `product_id` to `quantity` (replace or append).
fn with_item(items: &[CartItem], product_id: Uuid, quantity: u32) -> Vec<CartItem> {
    let mut out: Vec<CartItem> = items
        .iter()
        .copied()
        .filter(|item| item.product_id != product_id)
        .collect();
    out.push(CartItem {
        product_id,
        quantity,
    });
    out
}

async fn find_or_create_cart<C: CartRepository>(
    carts: &C,
    user_id: Uuid,
) -> Result<Cart, ApiError> {
    match carts.find_by_user(user_id).await? {
        Some(cart) => Ok(cart),
        None => carts.create(user_id).await,
    }
}

// ── GetCart ──────────────────────────────────────────────────────────────────

pub struct GetCartUseCase<C: CartRepository, P: ProductRepository> {
    pub carts: C,
    pub products: P,
}

impl<C: CartRepository, P: ProductRepository> GetCartUseCase<C, P> {
    pub async fn execute(&self, user_id: Uuid) -> Result<CartView, ApiError> {
        match self.carts.find_by_user(user_id).await? {
            Some(cart) => build_cart_view(&self.products, &cart.items).await,
            None => Ok(CartView::empty()),
        }
    }
}

// ── AddToCart ────────────────────────────────────────────────────────────────

pub struct AddToCartInput {
    pub product_id: Uuid,
    pub quantity: u32,
}

pub struct AddToCartUseCase<C: CartRepository, P: ProductRepository> {
    pub carts: C,
    pub products: P,
}

impl<C: CartRepository, P: ProductRepository> AddToCartUseCase<C, P> {
    /// Add a product, merging with any existing line (quantities sum).
    /// The merged quantity is validated against current stock; on failure
    /// the cart is left exactly as it was and the error reports the
    /// in-cart quantity alongside the available stock.
    pub async fn execute(&self, user_id: Uuid, input: AddToCartInput) -> Result<CartView, ApiError> {
        if input.quantity < 1 {
            return Err(ApiError::InvalidQuantity);
        }
        let product = self
            .products
            .find_by_id(input.product_id)
            .await?
            .ok_or(ApiError::ProductNotFound)?;

        let cart = find_or_create_cart(&self.carts, user_id).await?;
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

        self.carts
            .upsert_item(cart.id, input.product_id, merged)
            .await?;

        let items = with_item(&cart.items, input.product_id, merged);
        let view = build_cart_view(&self.products, &items).await?;
        self.carts.set_total(cart.id, view.totals.total).await?;
        Ok(view)
    }
}

// ── UpdateCartItem ───────────────────────────────────────────────────────────

pub struct UpdateCartItemInput {
    pub product_id: Uuid,
    pub quantity: u32,
}

pub struct UpdateCartItemUseCase<C: CartRepository, P: ProductRepository> {
    pub carts: C,
    pub products: P,
}

impl<C: CartRepository, P: ProductRepository> UpdateCartItemUseCase<C, P> {
    /// Replace a line's quantity outright (not additive).
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: UpdateCartItemInput,
    ) -> Result<CartView, ApiError> {
        if input.quantity < 1 {
            return Err(ApiError::InvalidQuantity);
        }
        let cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(ApiError::CartItemNotFound)?;
        let in_cart = cart.quantity_of(input.product_id);
        if in_cart == 0 {
            return Err(ApiError::CartItemNotFound);
        }
        let product = self
            .products
            .find_by_id(input.product_id)
            .await?
            .ok_or(ApiError::ProductNotFound)?;

        let availability = check_availability(product.stock, input.quantity);
        if !availability.available {
            return Err(ApiError::InsufficientStock {
                requested: input.quantity,
                available: availability.available_quantity,
                in_cart,
            });
        }

        self.carts
            .upsert_item(cart.id, input.product_id, input.quantity)
            .await?;

        let items = with_item(&cart.items, input.product_id, input.quantity);
        let view = build_cart_view(&self.products, &items).await?;
        self.carts.set_total(cart.id, view.totals.total).await?;
        Ok(view)
    }
}

// ── RemoveCartItem ───────────────────────────────────────────────────────────

pub struct RemoveCartItemUseCase<C: CartRepository, P: ProductRepository> {
    pub carts: C,
    pub products: P,
}

impl<C: CartRepository, P: ProductRepository> RemoveCartItemUseCase<C, P> {
    pub async fn execute(&self, user_id: Uuid, product_id: Uuid) -> Result<CartView, ApiError> {
        let cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(ApiError::CartItemNotFound)?;
        let removed = self.carts.remove_item(cart.id, product_id).await?;
        if !removed {
            return Err(ApiError::CartItemNotFound);
        }

        let items: Vec<CartItem> = cart
            .items
            .iter()
            .copied()
            .filter(|item| item.product_id != product_id)
            .collect();
        let view = build_cart_view(&self.products, &items).await?;
        self.carts.set_total(cart.id, view.totals.total).await?;
        Ok(view)
    }
}

// ── ClearCart ────────────────────────────────────────────────────────────────

pub struct ClearCartUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> ClearCartUseCase<C> {
    /// Empty the item list; the cart aggregate itself is kept with zero
    /// totals, not deleted.
    pub async fn execute(&self, user_id: Uuid) -> Result<CartView, ApiError> {
        if let Some(cart) = self.carts.find_by_user(user_id).await? {
            self.carts.clear(cart.id).await?;
            self.carts.set_total(cart.id, Decimal::ZERO).await?;
        }
        Ok(CartView::empty())
    }
}
