#![allow(async_fn_in_trait)]

use std::future::Future;
use std::time::Duration;

use crate::error::RelayError;
use crate::message::{InboxMessage, OutboxMessage};

/// Port the outbox workers drive. A leased row is held by exactly one worker
/// until it is finalized or its lease expires.
pub trait OutboxRepository: Send + Sync {
    /// Atomically claim up to `batch_size` publishable rows for `worker_id`:
    /// PENDING rows plus PROCESSING rows whose lease has expired, oldest
    /// first, skipping rows locked by concurrent leasers.
    fn lease_batch(
        &self,
        worker_id: &str,
        batch_size: u32,
    ) -> impl Future<Output = Result<Vec<OutboxMessage>, RelayError>> + Send;

    /// Terminal success: clears the lock fields.
    fn mark_published(&self, id: i64) -> impl Future<Output = Result<(), RelayError>> + Send;

    /// Terminal failure: records the error and bumps `retry_count`. Failed
    /// outbox rows are not retried automatically; re-queueing them is an
    /// operator action.
    fn mark_failed(
        &self,
        id: i64,
        error: &str,
    ) -> impl Future<Output = Result<(), RelayError>> + Send;

    /// Return PROCESSING rows whose lease is older than `older_than` to
    /// PENDING. Idempotent and safe to call at any time.
    fn reset_stuck(
        &self,
        older_than: Duration,
    ) -> impl Future<Output = Result<u64, RelayError>> + Send;
}

/// Port the inbox ingress guard and inbox workers drive.
pub trait InboxRepository: Send + Sync {
    /// Idempotent insert keyed on `message_id`. Returns the new PENDING row,
    /// or `None` when the message was already recorded. This is the only
    /// dedup primitive in the system.
    fn save(
        &self,
        message_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
        sender_id: Option<&str>,
    ) -> impl Future<Output = Result<Option<InboxMessage>, RelayError>> + Send;

    /// Same idempotent insert as [`save`](Self::save), but the row is born
    /// PROCESSING and locked by `worker_id`. Used by the broker ingress,
    /// which dispatches the message inline and must hold the lease while it
    /// does so — otherwise a concurrently ticking inbox worker could lease
    /// the new row and run the handler a second time.
    fn save_claimed(
        &self,
        message_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
        sender_id: Option<&str>,
        worker_id: &str,
    ) -> impl Future<Output = Result<Option<InboxMessage>, RelayError>> + Send;

    fn message_exists(
        &self,
        message_id: &str,
    ) -> impl Future<Output = Result<bool, RelayError>> + Send;

    /// Like the outbox lease, but also admits FAILED rows with
    /// `retry_count < max_retries` so failed deliveries retry automatically
    /// within a bounded budget.
    fn lease_batch(
        &self,
        worker_id: &str,
        batch_size: u32,
        max_retries: i32,
    ) -> impl Future<Output = Result<Vec<InboxMessage>, RelayError>> + Send;

    fn mark_processed(&self, id: i64) -> impl Future<Output = Result<(), RelayError>> + Send;

    /// Record the failure, bump `retry_count` and return the row to PENDING
    /// so a later lease cycle picks it up again.
    fn retry_later(
        &self,
        id: i64,
        error: &str,
    ) -> impl Future<Output = Result<(), RelayError>> + Send;

    /// Dead-letter in place: the row stays FAILED once `retry_count` has
    /// reached the retry budget.
    fn mark_failed(
        &self,
        id: i64,
        error: &str,
    ) -> impl Future<Output = Result<(), RelayError>> + Send;

    fn reset_stuck(
        &self,
        older_than: Duration,
    ) -> impl Future<Output = Result<u64, RelayError>> + Send;

    /// Most recent rows first; inspection endpoints only.
    fn list_recent(
        &self,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<InboxMessage>, RelayError>> + Send;
}
