use std::sync::Arc;

use orderflow_messaging::broker::EventPublisher;
use orderflow_messaging::envelope::Envelope;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::message::OutboxMessage;
use crate::repository::OutboxRepository;

use super::{WorkerOptions, worker_id};

/// Drains PENDING outbox rows to the broker.
pub struct OutboxWorker<R, P> {
    repository: Arc<R>,
    publisher: Arc<P>,
    worker_id: String,
    default_exchange: String,
    options: WorkerOptions,
}

impl<R, P> OutboxWorker<R, P>
where
    R: OutboxRepository,
    P: EventPublisher,
{
    pub fn new(
        repository: Arc<R>,
        publisher: Arc<P>,
        default_exchange: impl Into<String>,
        options: WorkerOptions,
    ) -> Self {
        Self {
            repository,
            publisher,
            worker_id: worker_id("outbox-worker"),
            default_exchange: default_exchange.into(),
            options,
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Tick loop. Recovers rows abandoned by a previous process once on
    /// start, then processes one batch per tick until cancelled. Cancellation
    /// finishes the current row but leases no further batch; anything still
    /// PROCESSING is reclaimed elsewhere after the lease TTL.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            worker_id = %self.worker_id,
            batch_size = self.options.batch_size,
            interval = ?self.options.tick_interval,
            "starting outbox worker"
        );

        match self.repository.reset_stuck(self.options.startup_reset_ttl).await {
            Ok(0) => {}
            Ok(count) => info!(count, "reset stuck outbox messages"),
            Err(e) => error!(error = %e, "failed to reset stuck outbox messages"),
        }

        let mut ticker = tokio::time::interval(self.options.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(worker_id = %self.worker_id, "outbox worker stopped");
                    return;
                }
                _ = ticker.tick() => self.process_batch().await,
            }
        }
    }

    /// One lease → publish → finalize cycle.
    pub async fn process_batch(&self) {
        let messages = match self
            .repository
            .lease_batch(&self.worker_id, self.options.batch_size)
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                // Transient lease failures skip this tick; nothing was
                // claimed, so there is nothing to unwind.
                error!(worker_id = %self.worker_id, error = %e, "failed to lease outbox batch");
                return;
            }
        };

        if messages.is_empty() {
            return;
        }

        info!(
            count = messages.len(),
            worker_id = %self.worker_id,
            "processing outbox messages"
        );

        for message in messages {
            self.process_message(message).await;
        }
    }

    async fn process_message(&self, message: OutboxMessage) {
        let envelope = Envelope::from_parts(
            message.message_id.clone(),
            message.event_type.clone(),
            message.payload.clone(),
            message.created_at,
        );

        // Older rows may predate the exchange/routing_key columns.
        let exchange = message
            .exchange
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(&self.default_exchange);
        let routing_key = message
            .routing_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(&message.event_type);

        match self.publisher.publish(exchange, routing_key, &envelope).await {
            Ok(()) => {
                if let Err(e) = self.repository.mark_published(message.id).await {
                    // Row stays PROCESSING; the lease TTL hands it to another
                    // worker, and the duplicate publish is absorbed by the
                    // consumer's inbox.
                    error!(id = message.id, error = %e, "failed to mark message as published");
                } else {
                    info!(
                        id = message.id,
                        message_id = %message.message_id,
                        event_type = %message.event_type,
                        worker_id = %self.worker_id,
                        "message published"
                    );
                }
            }
            Err(e) => {
                error!(
                    id = message.id,
                    message_id = %message.message_id,
                    event_type = %message.event_type,
                    error = %e,
                    "failed to publish message"
                );
                if let Err(mark_err) = self
                    .repository
                    .mark_failed(message.id, &e.to_string())
                    .await
                {
                    error!(id = message.id, error = %mark_err, "failed to mark message as failed");
                }
            }
        }
    }
}

/// Spawn `count` workers sharing one repository and publisher.
pub fn spawn_outbox_pool<R, P>(
    count: usize,
    repository: Arc<R>,
    publisher: Arc<P>,
    default_exchange: &str,
    options: WorkerOptions,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<()>>
where
    R: OutboxRepository + 'static,
    P: EventPublisher + 'static,
{
    (0..count)
        .map(|_| {
            let worker = OutboxWorker::new(
                repository.clone(),
                publisher.clone(),
                default_exchange,
                options,
            );
            tokio::spawn(worker.run(cancel.clone()))
        })
        .collect()
}
