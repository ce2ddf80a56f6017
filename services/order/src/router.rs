use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use orderflow_core::health::health_status;

use crate::SERVICE_NAME;
use crate::handlers::{
    inbox::{create_inbox_message, list_inbox_messages},
    order::{cancel_order, create_order, get_order, list_orders},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(|| async { health_status(SERVICE_NAME) }))
        .route("/readyz", get(|| async { health_status(SERVICE_NAME) }))
        // Orders
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/{order_id}", get(get_order))
        .route("/orders/{order_id}/cancel", post(cancel_order))
        // Relay inspection
        .route("/inbox", post(create_inbox_message).get(list_inbox_messages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
