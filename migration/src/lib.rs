pub use sea_orm_migration::prelude::*;

mod m20250301_000000_create_schema_and_base_db_setup;
mod m20250301_000001_create_call_tables;
mod m20250715_000000_add_linkage_and_storage_columns;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000000_create_schema_and_base_db_setup::Migration),
            Box::new(m20250301_000001_create_call_tables::Migration),
            Box::new(m20250715_000000_add_linkage_and_storage_columns::Migration),
        ]
    }
}
