//! Worker pools that drain the relay tables.
//!
//! Each worker owns a unique id and runs a tick loop: lease a batch, process
//! every leased row, finalize each one. Concurrency is coordinated entirely
//! through the database rows — the lease is atomic and skip-locked, so any
//! number of workers can run against the same table. Lease decisions are
//! never cached across ticks.

mod inbox;
mod outbox;

use std::time::Duration;

pub use inbox::{InboxWorker, spawn_inbox_pool};
pub use outbox::{OutboxWorker, spawn_outbox_pool};
use uuid::Uuid;

/// Tuning knobs shared by both worker kinds.
#[derive(Debug, Clone, Copy)]
pub struct WorkerOptions {
    /// Rows claimed per tick.
    pub batch_size: u32,
    /// Delay between processing cycles.
    pub tick_interval: Duration,
    /// Lease age used by the one-shot stuck reset on startup.
    pub startup_reset_ttl: Duration,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            batch_size: 3,
            tick_interval: Duration::from_secs(5),
            startup_reset_ttl: Duration::from_secs(5 * 60),
        }
    }
}

fn worker_id(prefix: &str) -> String {
    format!("{prefix}-{}", &Uuid::new_v4().to_string()[..8])
}
