use sea_orm_migration::prelude::*;

mod m20240601_000001_create_users_table;
mod m20240601_000002_create_items_table;
mod m20240601_000003_create_ratings_table;
mod m20240601_000004_create_watchlists_table;
mod m20240601_000005_create_item_status_history_table;
mod m20240601_000006_add_item_category_columns;
mod m20240601_000007_add_query_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users_table::Migration),
            Box::new(m20240601_000002_create_items_table::Migration),
            Box::new(m20240601_000003_create_ratings_table::Migration),
            Box::new(m20240601_000004_create_watchlists_table::Migration),
            Box::new(m20240601_000005_create_item_status_history_table::Migration),
            Box::new(m20240601_000006_add_item_category_columns::Migration),
            Box::new(m20240601_000007_add_query_indexes::Migration),
        ]
    }
}
