//! In-memory implementations of the relay and broker ports for tests.
//!
//! The memory stores reproduce the semantics the Postgres stores get from
//! SQL: the lease claim is atomic (one mutex-guarded critical section), FIFO
//! by `created_at`, skips rows locked by other holders, and re-admits rows
//! whose lease outlived the TTL.

pub mod broker;
pub mod inbox;
pub mod outbox;

pub use broker::{MemoryBroker, PublishedMessage};
pub use inbox::MemoryInbox;
pub use outbox::MemoryOutbox;
