use sea_orm_migration::prelude::*;

mod m20260401_000001_create_inventory;
mod m20260401_000002_create_outbox;
mod m20260401_000003_create_inbox;
mod m20260401_000004_seed_inventory;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_inventory::Migration),
            Box::new(m20260401_000002_create_outbox::Migration),
            Box::new(m20260401_000003_create_inbox::Migration),
            Box::new(m20260401_000004_seed_inventory::Migration),
        ]
    }
}
