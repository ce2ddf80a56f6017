use std::sync::Arc;

use orderflow_messaging::broker::{DeliveryHandler, delivery_handler};
use tracing::{debug, error};
use uuid::Uuid;

use crate::registry::HandlerRegistry;
use crate::repository::InboxRepository;

/// Build the broker delivery handler that guards the inbox.
///
/// For each delivery: a known message_id is acknowledged without running any
/// business logic; otherwise the envelope is persisted through the idempotent
/// claimed insert (which also resolves the race between two concurrent
/// deliveries of the same message, and holds the lease while the handler runs
/// inline), dispatched through the registry, and finalized. A handler error
/// leaves the row FAILED with retry budget remaining and bubbles up so the
/// broker requeues the delivery; the redelivery then hits the duplicate path
/// while the inbox workers drive the retries.
pub fn ingress_handler<R>(repository: Arc<R>, registry: Arc<HandlerRegistry>) -> DeliveryHandler
where
    R: InboxRepository + 'static,
{
    let ingress_id = format!("ingress-{}", &Uuid::new_v4().to_string()[..8]);

    delivery_handler(move |envelope| {
        let repository = repository.clone();
        let registry = registry.clone();
        let ingress_id = ingress_id.clone();
        async move {
            if repository.message_exists(&envelope.id).await? {
                debug!(message_id = %envelope.id, "duplicate delivery acknowledged");
                return Ok(());
            }

            let Some(message) = repository
                .save_claimed(
                    &envelope.id,
                    &envelope.event_type,
                    &envelope.payload,
                    None,
                    &ingress_id,
                )
                .await?
            else {
                debug!(message_id = %envelope.id, "duplicate delivery acknowledged");
                return Ok(());
            };

            let row_id = message.id;
            match registry.dispatch(message).await {
                Ok(()) => {
                    repository.mark_processed(row_id).await?;
                    Ok(())
                }
                Err(e) => {
                    if let Err(mark_err) = repository.mark_failed(row_id, &e.to_string()).await {
                        // The row stays PROCESSING and is reclaimed once its
                        // lease ages out.
                        error!(
                            message_id = %envelope.id,
                            error = %mark_err,
                            "failed to mark inbox message as failed"
                        );
                    }
                    Err(e)
                }
            }
        }
    })
}
