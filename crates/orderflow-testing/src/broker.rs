use std::collections::HashSet;
use std::sync::Mutex;

use orderflow_messaging::broker::{BrokerError, EventPublisher};
use orderflow_messaging::envelope::Envelope;

/// A publish captured by [`MemoryBroker`].
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub exchange: String,
    pub routing_key: String,
    pub envelope: Envelope,
}

/// Publisher port double: records accepted publishes and can be told to
/// reject publishes to chosen exchanges.
#[derive(Default)]
pub struct MemoryBroker {
    published: Mutex<Vec<PublishedMessage>>,
    rejected_exchanges: Mutex<HashSet<String>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every publish to `exchange` fails from now on.
    pub fn reject_exchange(&self, exchange: &str) {
        self.rejected_exchanges
            .lock()
            .unwrap()
            .insert(exchange.to_owned());
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }

    pub fn published_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

impl EventPublisher for MemoryBroker {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        envelope: &Envelope,
    ) -> Result<(), BrokerError> {
        if self.rejected_exchanges.lock().unwrap().contains(exchange) {
            return Err(BrokerError::Rejected {
                exchange: exchange.to_owned(),
                routing_key: routing_key.to_owned(),
            });
        }

        self.published.lock().unwrap().push(PublishedMessage {
            exchange: exchange.to_owned(),
            routing_key: routing_key.to_owned(),
            envelope: envelope.clone(),
        });
        Ok(())
    }
}
