//! Order and cart totals calculator.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Flat GST-style tax rate applied to every subtotal (18%).
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Subtotal above which shipping is free (strict greater-than).
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(5000, 0, 0, false, 0);

/// Flat shipping charge below the free-shipping threshold.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// One priced line of a cart or order: current unit price times quantity.
#[derive(Debug, Clone, Copy)]
pub struct PriceLine {
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// Computed totals, each rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Compute totals for a list of priced lines.
    ///
    /// tax = 18% of subtotal; shipping = 0 when subtotal > 5000, else a
    /// flat 100; total = subtotal + tax + shipping. Pure and idempotent:
    /// the same lines always produce the same totals.
    pub fn compute(lines: &[PriceLine]) -> Self {
        let subtotal = lines
            .iter()
            .map(|line| line.unit_price * Decimal::from(line.quantity))
            .sum::<Decimal>();
        let subtotal = round_money(subtotal);

        let tax = round_money(subtotal * TAX_RATE);
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING
        };
        let total = round_money(subtotal + tax + shipping);

        Self {
            subtotal,
            tax,
            shipping,
            total,
        }
    }

    pub fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            shipping: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

/// Round a money amount to 2 decimal places, midpoint away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
