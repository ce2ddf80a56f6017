//! Postgres-backed relay stores.
//!
//! Row claims run as a single `UPDATE ... WHERE id IN (SELECT ... FOR UPDATE
//! SKIP LOCKED) RETURNING` statement: the select-and-update is atomic,
//! concurrent leasers skip instead of blocking each other, and the inner
//! predicate re-admits rows whose lease outlived the TTL. Losing any of the
//! three lets two workers hold the same row or lets a crashed worker park
//! rows forever.

mod inbox;
mod outbox;

use std::time::Duration;

pub use inbox::DbInboxRepository;
pub use outbox::DbOutboxRepository;

/// Age after which a PROCESSING row is considered abandoned and re-leasable.
pub const DEFAULT_LEASE_TTL: Duration = Duration::from_secs(5 * 60);
