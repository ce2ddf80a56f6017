use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use orderflow_relay::error::RelayError;
use orderflow_relay::message::{MessageStatus, OutboxMessage};
use orderflow_relay::repository::OutboxRepository;
use uuid::Uuid;

/// Outbox port double backed by a mutex-guarded table.
pub struct MemoryOutbox {
    rows: Mutex<Vec<OutboxMessage>>,
    next_id: AtomicI64,
    lease_ttl: Duration,
}

impl Default for MemoryOutbox {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            lease_ttl: Duration::from_secs(5 * 60),
        }
    }

    pub fn with_lease_ttl(mut self, lease_ttl: Duration) -> Self {
        self.lease_ttl = lease_ttl;
        self
    }

    /// Insert a PENDING row the way `DbOutboxRepository::save` does, with
    /// explicit exchange/routing-key values (use `None` to exercise the
    /// worker fallbacks).
    pub fn insert_pending(
        &self,
        event_type: &str,
        payload: serde_json::Value,
        exchange: Option<&str>,
        routing_key: Option<&str>,
    ) -> OutboxMessage {
        self.insert_pending_at(event_type, payload, exchange, routing_key, Utc::now())
    }

    /// Like [`insert_pending`](Self::insert_pending) with a chosen
    /// `created_at`, for FIFO assertions.
    pub fn insert_pending_at(
        &self,
        event_type: &str,
        payload: serde_json::Value,
        exchange: Option<&str>,
        routing_key: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> OutboxMessage {
        let row = OutboxMessage {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            message_id: Uuid::new_v4().to_string(),
            event_type: event_type.to_owned(),
            payload,
            status: MessageStatus::Pending,
            retry_count: 0,
            exchange: exchange.map(str::to_owned),
            routing_key: routing_key.map(str::to_owned),
            error: None,
            locked_at: None,
            locked_by: None,
            created_at,
            updated_at: created_at,
        };
        self.rows.lock().unwrap().push(row.clone());
        row
    }

    pub fn rows(&self) -> Vec<OutboxMessage> {
        self.rows.lock().unwrap().clone()
    }

    pub fn get(&self, id: i64) -> Option<OutboxMessage> {
        self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }

    /// Backdate a row's lease, simulating a holder that disappeared.
    pub fn age_lease(&self, id: i64, locked_at: DateTime<Utc>) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.locked_at = Some(locked_at);
        }
    }
}

impl OutboxRepository for MemoryOutbox {
    async fn lease_batch(
        &self,
        worker_id: &str,
        batch_size: u32,
    ) -> Result<Vec<OutboxMessage>, RelayError> {
        let now = Utc::now();
        let cutoff = now - self.lease_ttl;
        let mut rows = self.rows.lock().unwrap();

        let mut candidates: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| match row.status {
                MessageStatus::Pending => true,
                MessageStatus::Processing => {
                    row.locked_at.is_some_and(|locked_at| locked_at < cutoff)
                }
                _ => false,
            })
            .map(|(i, _)| i)
            .collect();
        candidates.sort_by_key(|&i| (rows[i].created_at, rows[i].id));
        candidates.truncate(batch_size as usize);

        let mut leased = Vec::with_capacity(candidates.len());
        for i in candidates {
            let row = &mut rows[i];
            row.status = MessageStatus::Processing;
            row.locked_at = Some(now);
            row.locked_by = Some(worker_id.to_owned());
            row.updated_at = now;
            leased.push(row.clone());
        }
        Ok(leased)
    }

    async fn mark_published(&self, id: i64) -> Result<(), RelayError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.status = MessageStatus::Published;
            row.locked_at = None;
            row.locked_by = None;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_failed(&self, id: i64, error: &str) -> Result<(), RelayError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.status = MessageStatus::Failed;
            row.retry_count += 1;
            row.error = Some(error.to_owned());
            row.locked_at = None;
            row.locked_by = None;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn reset_stuck(&self, older_than: Duration) -> Result<u64, RelayError> {
        let now = Utc::now();
        let cutoff = now - older_than;
        let mut rows = self.rows.lock().unwrap();

        let mut reset = 0;
        for row in rows.iter_mut() {
            if row.status == MessageStatus::Processing
                && row.locked_at.is_some_and(|locked_at| locked_at < cutoff)
            {
                row.status = MessageStatus::Pending;
                row.locked_at = None;
                row.locked_by = None;
                row.updated_at = now;
                reset += 1;
            }
        }
        Ok(reset)
    }
}
