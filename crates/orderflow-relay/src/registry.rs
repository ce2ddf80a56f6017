use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::message::InboxMessage;

type HandlerFuture = BoxFuture<'static, Result<(), anyhow::Error>>;

/// Handler invoked for inbox rows of one event type. Handlers must be
/// idempotent: the dedup guard stops re-entry per message_id, but
/// operator-triggered reprocessing and cross-service duplicates remain
/// possible.
pub type HandlerFunc = Arc<dyn Fn(InboxMessage) -> HandlerFuture + Send + Sync>;

/// Event type → handler mapping. Populated during startup, then shared
/// immutably behind an `Arc`, so steady-state lookups take no lock.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerFunc>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, Fut>(&mut self, event_type: impl Into<String>, handler: F)
    where
        F: Fn(InboxMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        let event_type = event_type.into();
        debug!(event_type = %event_type, "registered message handler");
        self.handlers
            .insert(event_type, Arc::new(move |message| Box::pin(handler(message))));
    }

    pub fn registered_types(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route a message to its handler. An unregistered event type is treated
    /// as success: it signals a deployment mismatch, not a transient fault,
    /// and retrying it would never converge.
    pub async fn dispatch(&self, message: InboxMessage) -> Result<(), anyhow::Error> {
        match self.handlers.get(&message.event_type) {
            Some(handler) => {
                debug!(
                    event_type = %message.event_type,
                    message_id = %message.message_id,
                    "routing message to handler"
                );
                handler(message).await
            }
            None => {
                warn!(
                    event_type = %message.event_type,
                    message_id = %message.message_id,
                    "no handler registered for event type"
                );
                Ok(())
            }
        }
    }
}
