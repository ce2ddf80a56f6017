use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions,
    BasicRejectOptions, ConfirmSelectOptions, ExchangeDeclareOptions, QueueBindOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use lapin::publisher_confirm::Confirmation;
use tracing::{error, info, warn};

use crate::broker::{BrokerError, DeliveryHandler, EventPublisher};
use crate::envelope::Envelope;

const REPLY_SUCCESS: u16 = 200;

/// RabbitMQ adapter owning one connection and one channel.
///
/// The channel is safe for concurrent publishes; all outbox workers of a
/// service share one instance behind an `Arc`. There is no reconnection
/// logic: a broken connection is a fatal service condition and the process
/// is expected to restart.
pub struct RabbitBroker {
    connection: Connection,
    channel: Channel,
}

impl RabbitBroker {
    /// Connect and open the channel, with publisher confirms enabled so that
    /// `publish` only returns once the broker has accepted the message.
    pub async fn connect(url: &str) -> Result<Self, BrokerError> {
        let connection = Connection::connect(url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;

        info!("connected to RabbitMQ");
        Ok(Self {
            connection,
            channel,
        })
    }

    /// Declare a durable topic exchange. Idempotent.
    pub async fn declare_exchange(&self, name: &str) -> Result<(), BrokerError> {
        self.channel
            .exchange_declare(
                name,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(())
    }

    /// Declare a durable, non-exclusive, non-auto-delete queue. Idempotent.
    pub async fn declare_queue(&self, name: &str) -> Result<(), BrokerError> {
        self.channel
            .queue_declare(
                name,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(())
    }

    /// Bind `queue` to `exchange` under `routing_key`. Idempotent.
    pub async fn bind_queue(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), BrokerError> {
        self.channel
            .queue_bind(
                queue,
                exchange,
                routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;
        Ok(())
    }

    /// Register a manual-ack consumer on `queue` and drive it on a background
    /// task. Decode failures are rejected without requeue (poison messages);
    /// handler errors are nacked with requeue; successes are acked.
    pub async fn subscribe(
        &self,
        queue: &str,
        handler: DeliveryHandler,
    ) -> Result<(), BrokerError> {
        let mut consumer = self
            .channel
            .basic_consume(
                queue,
                "",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        info!(queue, "subscribed to queue");

        let queue = queue.to_owned();
        tokio::spawn(async move {
            while let Some(delivery) = consumer.next().await {
                let delivery = match delivery {
                    Ok(delivery) => delivery,
                    Err(e) => {
                        error!(queue = %queue, error = %e, "consumer stream failed");
                        break;
                    }
                };

                let envelope: Envelope = match serde_json::from_slice(&delivery.data) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        warn!(queue = %queue, error = %e, "rejecting undecodable delivery");
                        if let Err(e) = delivery.reject(BasicRejectOptions { requeue: false }).await
                        {
                            error!(queue = %queue, error = %e, "failed to reject delivery");
                        }
                        continue;
                    }
                };

                match handler(envelope).await {
                    Ok(()) => {
                        if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                            error!(queue = %queue, error = %e, "failed to ack delivery");
                        }
                    }
                    Err(e) => {
                        warn!(queue = %queue, error = %e, "requeueing failed delivery");
                        if let Err(e) = delivery
                            .nack(BasicNackOptions {
                                requeue: true,
                                ..Default::default()
                            })
                            .await
                        {
                            error!(queue = %queue, error = %e, "failed to nack delivery");
                        }
                    }
                }
            }
        });

        Ok(())
    }

    /// Tear down the channel and the connection.
    pub async fn close(&self) -> Result<(), BrokerError> {
        self.channel.close(REPLY_SUCCESS, "shutdown").await?;
        self.connection.close(REPLY_SUCCESS, "shutdown").await?;
        Ok(())
    }
}

impl EventPublisher for RabbitBroker {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        envelope: &Envelope,
    ) -> Result<(), BrokerError> {
        let body = serde_json::to_vec(envelope)?;

        let confirmation = self
            .channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    // Persistent delivery: survive a broker restart.
                    .with_delivery_mode(2),
            )
            .await?
            .await?;

        if let Confirmation::Nack(_) = confirmation {
            return Err(BrokerError::Rejected {
                exchange: exchange.to_owned(),
                routing_key: routing_key.to_owned(),
            });
        }

        info!(exchange, routing_key, message_id = %envelope.id, "published message");
        Ok(())
    }
}
