use tracing::info;

use crate::broker::BrokerError;
use crate::rabbit::RabbitBroker;

/// Topic exchange the order service publishes to.
pub const ORDERS_EXCHANGE: &str = "orders";
/// Topic exchange the warehouse service publishes to.
pub const INVENTORY_EXCHANGE: &str = "inventory";

/// Queue ← exchange / routing-key bindings shared by both services.
/// Queue names double as routing keys (one queue per event type).
pub const BINDINGS: &[(&str, &str)] = &[
    ("order.created", ORDERS_EXCHANGE),
    ("order.updated", ORDERS_EXCHANGE),
    ("order.cancelled", ORDERS_EXCHANGE),
    ("inventory.reserved", INVENTORY_EXCHANGE),
    ("inventory.released", INVENTORY_EXCHANGE),
    ("inventory.updated", INVENTORY_EXCHANGE),
];

/// Declare the exchanges, queues and bindings both services rely on.
/// Every declaration is idempotent, so each service runs this at startup.
pub async fn declare_topology(broker: &RabbitBroker) -> Result<(), BrokerError> {
    for exchange in [ORDERS_EXCHANGE, INVENTORY_EXCHANGE] {
        broker.declare_exchange(exchange).await?;
        info!(exchange, "declared exchange");
    }

    for (queue, exchange) in BINDINGS.iter().copied() {
        broker.declare_queue(queue).await?;
        broker.bind_queue(queue, exchange, queue).await?;
        info!(queue, exchange, routing_key = queue, "declared and bound queue");
    }

    Ok(())
}
