use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::message::InboxMessage;
use crate::registry::HandlerRegistry;
use crate::repository::InboxRepository;

use super::{WorkerOptions, worker_id};

/// Drains PENDING inbox rows (and retryable FAILED rows) through the handler
/// registry.
pub struct InboxWorker<R> {
    repository: Arc<R>,
    registry: Arc<HandlerRegistry>,
    worker_id: String,
    max_retries: i32,
    options: WorkerOptions,
}

impl<R> InboxWorker<R>
where
    R: InboxRepository,
{
    pub fn new(
        repository: Arc<R>,
        registry: Arc<HandlerRegistry>,
        max_retries: i32,
        options: WorkerOptions,
    ) -> Self {
        Self {
            repository,
            registry,
            worker_id: worker_id("inbox-worker"),
            max_retries,
            options,
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Tick loop; see [`OutboxWorker::run`](super::OutboxWorker::run).
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            worker_id = %self.worker_id,
            batch_size = self.options.batch_size,
            max_retries = self.max_retries,
            interval = ?self.options.tick_interval,
            "starting inbox worker"
        );

        match self.repository.reset_stuck(self.options.startup_reset_ttl).await {
            Ok(0) => {}
            Ok(count) => info!(count, "reset stuck inbox messages"),
            Err(e) => error!(error = %e, "failed to reset stuck inbox messages"),
        }

        let mut ticker = tokio::time::interval(self.options.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(worker_id = %self.worker_id, "inbox worker stopped");
                    return;
                }
                _ = ticker.tick() => self.process_batch().await,
            }
        }
    }

    /// One lease → dispatch → finalize cycle.
    pub async fn process_batch(&self) {
        let messages = match self
            .repository
            .lease_batch(&self.worker_id, self.options.batch_size, self.max_retries)
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                error!(worker_id = %self.worker_id, error = %e, "failed to lease inbox batch");
                return;
            }
        };

        if messages.is_empty() {
            return;
        }

        info!(
            count = messages.len(),
            worker_id = %self.worker_id,
            "processing inbox messages"
        );

        for message in messages {
            self.process_message(message).await;
        }
    }

    async fn process_message(&self, message: InboxMessage) {
        let row_id = message.id;
        let message_id = message.message_id.clone();
        let event_type = message.event_type.clone();
        let retry_count = message.retry_count;

        match self.registry.dispatch(message).await {
            Ok(()) => {
                if let Err(e) = self.repository.mark_processed(row_id).await {
                    error!(id = row_id, error = %e, "failed to mark message as processed");
                } else {
                    info!(
                        id = row_id,
                        message_id = %message_id,
                        event_type = %event_type,
                        worker_id = %self.worker_id,
                        "message processed"
                    );
                }
            }
            Err(e) => {
                error!(
                    id = row_id,
                    message_id = %message_id,
                    event_type = %event_type,
                    retry_count,
                    error = %e,
                    "failed to process message"
                );

                if retry_count + 1 >= self.max_retries {
                    warn!(
                        id = row_id,
                        message_id = %message_id,
                        retry_count = retry_count + 1,
                        max_retries = self.max_retries,
                        "max retries exceeded, dead-lettering message"
                    );
                    if let Err(mark_err) =
                        self.repository.mark_failed(row_id, &e.to_string()).await
                    {
                        error!(id = row_id, error = %mark_err, "failed to mark message as failed");
                    }
                } else {
                    info!(
                        id = row_id,
                        message_id = %message_id,
                        retry_count = retry_count + 1,
                        max_retries = self.max_retries,
                        "scheduling message retry"
                    );
                    if let Err(mark_err) =
                        self.repository.retry_later(row_id, &e.to_string()).await
                    {
                        error!(id = row_id, error = %mark_err, "failed to schedule message retry");
                    }
                }
            }
        }
    }
}

/// Spawn `count` workers sharing one repository and registry.
pub fn spawn_inbox_pool<R>(
    count: usize,
    repository: Arc<R>,
    registry: Arc<HandlerRegistry>,
    max_retries: i32,
    options: WorkerOptions,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<()>>
where
    R: InboxRepository + 'static,
{
    (0..count)
        .map(|_| {
            let worker =
                InboxWorker::new(repository.clone(), registry.clone(), max_retries, options);
            tokio::spawn(worker.run(cancel.clone()))
        })
        .collect()
}
