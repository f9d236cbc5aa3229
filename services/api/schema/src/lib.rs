//! sea-orm entities for the Gilt API database.

pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod order_items;
pub mod orders;
pub mod outbox_events;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wishlist_items;
