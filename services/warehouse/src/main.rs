use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use orderflow_messaging::rabbit::RabbitBroker;
use orderflow_warehouse::config::WarehouseConfig;
use orderflow_warehouse::relay::start_relay;
use orderflow_warehouse::router::build_router;
use orderflow_warehouse::state::AppState;
use orderflow_warehouse_migration::Migrator;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    // Structured JSON logs to stdout, filtered by RUST_LOG.
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json())
        .init();

    let config = WarehouseConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    info!("database schema up to date");

    let state = AppState { db };

    let cancel = CancellationToken::new();
    let mut broker = None;
    if config.enable_broker {
        let url = config.rabbitmq_url.as_deref().expect("RABBITMQ_URL");
        let connected = Arc::new(
            RabbitBroker::connect(url)
                .await
                .expect("failed to connect to RabbitMQ"),
        );
        start_relay(&state, connected.clone(), config.max_retries, &cancel)
            .await
            .expect("failed to start relay");
        broker = Some(connected);
    }

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.warehouse_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("warehouse service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    info!("shutdown signal received, stopping relay workers");
    cancel.cancel();
    tokio::time::sleep(Duration::from_secs(2)).await;

    if let Some(broker) = broker {
        if let Err(e) = broker.close().await {
            error!(error = %e, "error closing broker connection");
        }
    }
    info!("service shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
