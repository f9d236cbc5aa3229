use sea_orm_migration::prelude::*;

mod m20260110_000001_create_users;
mod m20260110_000002_create_categories;
mod m20260110_000003_create_products;
mod m20260110_000004_create_carts;
mod m20260110_000005_create_wishlist_items;
mod m20260110_000006_create_orders;
mod m20260110_000007_create_reviews;
mod m20260110_000008_create_outbox_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_create_users::Migration),
            Box::new(m20260110_000002_create_categories::Migration),
            Box::new(m20260110_000003_create_products::Migration),
            Box::new(m20260110_000004_create_carts::Migration),
            Box::new(m20260110_000005_create_wishlist_items::Migration),
            Box::new(m20260110_000006_create_orders::Migration),
            Box::new(m20260110_000007_create_reviews::Migration),
            Box::new(m20260110_000008_create_outbox_events::Migration),
        ]
    }
}
