use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use orderflow_core::health::health_status;

use crate::SERVICE_NAME;
use crate::handlers::{
    inbox::list_inbox_messages,
    inventory::{get_stock, list_inventory},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(|| async { health_status(SERVICE_NAME) }))
        .route("/readyz", get(|| async { health_status(SERVICE_NAME) }))
        // Inventory
        .route("/inventory", get(list_inventory))
        .route("/inventory/{product_id}", get(get_stock))
        // Relay inspection
        .route("/inbox", get(list_inbox_messages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
