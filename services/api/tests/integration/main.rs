mod helpers;

mod auth_test;
mod cart_test;
mod order_test;
mod wishlist_test;
