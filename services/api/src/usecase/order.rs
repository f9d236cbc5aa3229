use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use gilt_domain::order::{OrderStatus, PaymentMethod, PaymentStatus};
use gilt_domain::pagination::PageRequest;
use gilt_domain::pricing::{PriceLine, Totals};
use gilt_domain::stock::check_availability;

use crate::domain::repository::{CartRepository, OrderRepository, ProductRepository};
use crate::domain::types::{BillingAddress, Order, OrderItem};
use crate::error::ApiError;

fn validate_billing(billing: &BillingAddress) -> Result<(), ApiError> {
    let fields = [
        ("billing_name", &billing.name),
        ("billing_street", &billing.street),
        ("billing_city", &billing.city),
        ("billing_postal_code", &billing.postal_code),
        ("billing_country", &billing.country),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(ApiError::validation(field, "must not be blank"));
        }
    }
    Ok(())
}

// ── PlaceOrder ───────────────────────────────────────────────────────────────

pub struct PlaceOrderInput {
    pub payment_method: PaymentMethod,
    pub billing: BillingAddress,
}

pub struct PlaceOrderUseCase<C: CartRepository, P: ProductRepository, O: OrderRepository> {
    pub carts: C,
    pub products: P,
    pub orders: O,
}

impl<C: CartRepository, P: ProductRepository, O: OrderRepository> PlaceOrderUseCase<C, P, O> {
    /// Snapshot the cart into an order at current prices, decrement stock
    /// and clear the cart. Stock is validated per line before the write;
    /// the check and the decrement are not atomic across requests, so a
    /// concurrent order can still overcommit (see DESIGN.md).
    pub async fn execute(&self, user_id: Uuid, input: PlaceOrderInput) -> Result<Order, ApiError> {
        validate_billing(&input.billing)?;

        let cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(ApiError::EmptyCart)?;
        if cart.items.is_empty() {
            return Err(ApiError::EmptyCart);
        }

        let ids: Vec<Uuid> = cart.items.iter().map(|item| item.product_id).collect();
        let products = self.products.find_by_ids(&ids).await?;

        let mut items = Vec::with_capacity(cart.items.len());
        let mut lines = Vec::with_capacity(cart.items.len());
        for cart_item in &cart.items {
            let product = products
                .iter()
                .find(|p| p.id == cart_item.product_id)
                .ok_or(ApiError::ProductNotFound)?;

            let availability = check_availability(product.stock, cart_item.quantity);
            if !availability.available {
                return Err(ApiError::InsufficientStock {
                    requested: cart_item.quantity,
                    available: availability.available_quantity,
                    in_cart: cart_item.quantity,
                });
            }

            items.push(OrderItem {
                id: Uuid::new_v4(),
                product_id: product.id,
                product_name: product.name.clone(),
                quantity: cart_item.quantity,
                price_at_purchase: product.price,
            });
            lines.push(PriceLine {
                unit_price: product.price,
                quantity: cart_item.quantity,
            });
        }

        let totals = Totals::compute(&lines);
        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            total_amount: totals.total,
            payment_method: input.payment_method,
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::Pending,
            billing: input.billing,
            created_at: Utc::now(),
        };

        self.orders.create(&order).await?;

        self.carts.clear(cart.id).await?;
        self.carts.set_total(cart.id, Decimal::ZERO).await?;
        Ok(order)
    }
}

// ── ListOrders / GetOrder ────────────────────────────────────────────────────

pub struct ListOrdersUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> ListOrdersUseCase<O> {
    pub async fn execute(&self, user_id: Uuid, page: PageRequest) -> Result<Vec<Order>, ApiError> {
        self.orders.list_by_user(user_id, page).await
    }
}

pub struct GetOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> GetOrderUseCase<O> {
    /// Another user's order reads as not-found, never as forbidden.
    pub async fn execute(&self, user_id: Uuid, order_id: Uuid) -> Result<Order, ApiError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(ApiError::OrderNotFound)?;
        if order.user_id != user_id {
            return Err(ApiError::OrderNotFound);
        }
        Ok(order)
    }
}

// ── CancelOrder ──────────────────────────────────────────────────────────────

pub struct CancelOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> CancelOrderUseCase<O> {
    /// Only pending orders cancel. Stock is not restored on cancel.
    pub async fn execute(&self, user_id: Uuid, order_id: Uuid) -> Result<(), ApiError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(ApiError::OrderNotFound)?;
        if order.user_id != user_id {
            return Err(ApiError::OrderNotFound);
        }
        if !order.order_status.can_cancel() {
            return Err(ApiError::OrderNotCancellable);
        }
        let changed = self
            .orders
            .set_status(order_id, OrderStatus::Cancelled)
            .await?;
        if !changed {
            return Err(ApiError::OrderNotFound);
        }
        Ok(())
    }
}
