//! Point-in-time stock availability check.

use serde::Serialize;

/// Result of checking a requested quantity against current stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub available: bool,
    pub available_quantity: u32,
}

/// Check whether `requested` units can be taken from `stock`.
///
/// This is a point-in-time check, not a reservation: the check and any
/// later decrement are not atomic with respect to concurrent requests.
pub fn check_availability(stock: i32, requested: u32) -> Availability {
    let available_quantity = u32::try_from(stock).unwrap_or(0);
    Availability {
        available: available_quantity >= requested,
        available_quantity,
    }
}
