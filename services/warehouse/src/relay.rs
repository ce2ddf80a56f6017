use std::sync::Arc;

use orderflow_messaging::broker::BrokerError;
use orderflow_messaging::rabbit::RabbitBroker;
use orderflow_messaging::topology::{INVENTORY_EXCHANGE, declare_topology};
use orderflow_relay::ingress::ingress_handler;
use orderflow_relay::worker::{WorkerOptions, spawn_inbox_pool, spawn_outbox_pool};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::events;
use crate::state::AppState;

/// Workers per pool.
pub const WORKER_COUNT: usize = 3;

/// Order event queues this service consumes.
const SUBSCRIBE_QUEUES: [&str; 3] = ["order.created", "order.updated", "order.cancelled"];

/// Declare the topology, wire the guarded subscriptions, and start the
/// outbox/inbox worker pools.
pub async fn start_relay(
    state: &AppState,
    broker: Arc<RabbitBroker>,
    max_retries: i32,
    cancel: &CancellationToken,
) -> Result<(), BrokerError> {
    declare_topology(&broker).await?;

    let registry = Arc::new(events::build_registry(state.inventory_repo()));
    info!(handler_count = registry.len(), "message handlers registered");

    let inbox = Arc::new(state.inbox_repo());
    for queue in SUBSCRIBE_QUEUES {
        broker
            .subscribe(queue, ingress_handler(inbox.clone(), registry.clone()))
            .await?;
    }

    let options = WorkerOptions::default();
    spawn_inbox_pool(
        WORKER_COUNT,
        inbox,
        registry,
        max_retries,
        options,
        cancel,
    );
    spawn_outbox_pool(
        WORKER_COUNT,
        Arc::new(state.outbox_repo()),
        broker,
        INVENTORY_EXCHANGE,
        options,
        cancel,
    );

    info!(
        inbox_workers = WORKER_COUNT,
        outbox_workers = WORKER_COUNT,
        "relay workers started"
    );
    Ok(())
}
