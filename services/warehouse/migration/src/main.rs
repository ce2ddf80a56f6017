use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(orderflow_warehouse_migration::Migrator).await;
}
