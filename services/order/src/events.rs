use anyhow::Context as _;
use orderflow_relay::registry::HandlerRegistry;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::repository::OrderRepository;

/// Payload shared by `inventory.reserved` and `inventory.released`.
#[derive(Debug, Deserialize)]
struct StockEventPayload {
    order_id: String,
    product_id: String,
    quantity: i32,
}

/// Payload of `inventory.updated`.
#[derive(Debug, Deserialize)]
struct StockLevelPayload {
    product_id: String,
    available: i32,
}

/// Handlers for the inventory events the order service consumes. All of them
/// are idempotent: confirming a confirmed order is a no-op update, and the
/// release/update handlers only log.
pub fn build_registry<R>(orders: R) -> HandlerRegistry
where
    R: OrderRepository + Clone + 'static,
{
    let mut registry = HandlerRegistry::new();

    let confirm_orders = orders.clone();
    registry.register("inventory.reserved", move |msg| {
        let orders = confirm_orders.clone();
        async move {
            let payload: StockEventPayload =
                serde_json::from_value(msg.payload).context("decode inventory.reserved payload")?;
            let order_id = Uuid::parse_str(&payload.order_id).context("parse order id")?;

            if orders.confirm(order_id).await? {
                info!(
                    order_id = %payload.order_id,
                    product_id = %payload.product_id,
                    quantity = payload.quantity,
                    "order confirmed after stock reservation"
                );
            } else {
                warn!(order_id = %payload.order_id, "stock reserved for unknown order");
            }
            Ok(())
        }
    });

    registry.register("inventory.released", |msg| async move {
        let payload: StockEventPayload =
            serde_json::from_value(msg.payload).context("decode inventory.released payload")?;
        info!(
            order_id = %payload.order_id,
            product_id = %payload.product_id,
            quantity = payload.quantity,
            "stock released"
        );
        Ok(())
    });

    registry.register("inventory.updated", |msg| async move {
        let payload: StockLevelPayload =
            serde_json::from_value(msg.payload).context("decode inventory.updated payload")?;
        info!(
            product_id = %payload.product_id,
            available = payload.available,
            "stock level updated"
        );
        Ok(())
    });

    registry
}
