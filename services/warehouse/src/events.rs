use anyhow::Context as _;
use orderflow_relay::registry::HandlerRegistry;
use serde::Deserialize;
use tracing::info;

use crate::domain::repository::InventoryRepository;
use crate::usecase::inventory::{ReleaseStockUseCase, ReserveStockUseCase};

/// Payload shared by `order.created` and `order.cancelled`.
#[derive(Debug, Deserialize)]
struct OrderEventPayload {
    order_id: String,
    product_id: String,
    quantity: i32,
}

/// Payload of `order.updated`.
#[derive(Debug, Deserialize)]
struct OrderStatusPayload {
    order_id: String,
    status: String,
}

/// Handlers for the order events the warehouse consumes.
///
/// `order.created` reserves stock and announces `inventory.reserved` in the
/// same transaction; a shortfall is a handler error so the bounded retry can
/// absorb a replenishment arriving in between. `order.cancelled` releases the
/// held units (clamped, so a cancel racing the reservation stays safe).
pub fn build_registry<R>(inventory: R) -> HandlerRegistry
where
    R: InventoryRepository + Clone + 'static,
{
    let mut registry = HandlerRegistry::new();

    let reserve_inventory = inventory.clone();
    registry.register("order.created", move |msg| {
        let inventory = reserve_inventory.clone();
        async move {
            let payload: OrderEventPayload =
                serde_json::from_value(msg.payload).context("decode order.created payload")?;

            let usecase = ReserveStockUseCase { inventory };
            usecase
                .execute(&payload.order_id, &payload.product_id, payload.quantity)
                .await
                .with_context(|| format!("reserve stock for order {}", payload.order_id))?;
            Ok(())
        }
    });

    let release_inventory = inventory.clone();
    registry.register("order.cancelled", move |msg| {
        let inventory = release_inventory.clone();
        async move {
            let payload: OrderEventPayload =
                serde_json::from_value(msg.payload).context("decode order.cancelled payload")?;

            let usecase = ReleaseStockUseCase { inventory };
            usecase
                .execute(&payload.order_id, &payload.product_id, payload.quantity)
                .await
                .with_context(|| format!("release stock for order {}", payload.order_id))?;
            Ok(())
        }
    });

    registry.register("order.updated", |msg| async move {
        let payload: OrderStatusPayload =
            serde_json::from_value(msg.payload).context("decode order.updated payload")?;
        info!(
            order_id = %payload.order_id,
            status = %payload.status,
            "order status changed"
        );
        Ok(())
    });

    registry
}
