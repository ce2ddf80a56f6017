#![allow(async_fn_in_trait)]

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::envelope::Envelope;

/// Broker-side failures surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("broker i/o: {0}")]
    Amqp(#[from] lapin::Error),
    #[error("encode envelope: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("broker rejected publish to {exchange}/{routing_key}")]
    Rejected {
        exchange: String,
        routing_key: String,
    },
}

/// Port the outbox workers publish through. A successful return means the
/// broker has accepted the message and the outbox row may be finalized.
pub trait EventPublisher: Send + Sync {
    fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        envelope: &Envelope,
    ) -> impl Future<Output = Result<(), BrokerError>> + Send;
}

/// Callback invoked for each decoded delivery on a subscribed queue.
///
/// An `Err` return requeues the delivery; `Ok` acknowledges it.
pub type DeliveryHandler =
    Arc<dyn Fn(Envelope) -> BoxFuture<'static, Result<(), anyhow::Error>> + Send + Sync>;

/// Wrap an async closure into a [`DeliveryHandler`].
pub fn delivery_handler<F, Fut>(f: F) -> DeliveryHandler
where
    F: Fn(Envelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
{
    Arc::new(move |envelope| Box::pin(f(envelope)))
}
