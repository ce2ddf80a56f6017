use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(orderflow_order_migration::Migrator).await;
}
