pub mod error;
pub mod ingress;
pub mod message;
pub mod pg;
pub mod registry;
pub mod repository;
pub mod schema;
pub mod worker;

pub use error::RelayError;
pub use ingress::ingress_handler;
pub use message::{InboxMessage, MessageStatus, OutboxMessage};
pub use pg::{DbInboxRepository, DbOutboxRepository};
pub use registry::HandlerRegistry;
pub use repository::{InboxRepository, OutboxRepository};
pub use worker::{InboxWorker, OutboxWorker, WorkerOptions, spawn_inbox_pool, spawn_outbox_pool};
