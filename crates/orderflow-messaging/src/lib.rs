pub mod broker;
pub mod envelope;
pub mod rabbit;
pub mod topology;

pub use broker::{BrokerError, DeliveryHandler, EventPublisher};
pub use envelope::Envelope;
pub use rabbit::RabbitBroker;
