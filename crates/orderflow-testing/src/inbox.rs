use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use orderflow_relay::error::RelayError;
use orderflow_relay::message::{InboxMessage, MessageStatus};
use orderflow_relay::repository::InboxRepository;

/// Inbox port double backed by a mutex-guarded table.
pub struct MemoryInbox {
    rows: Mutex<Vec<InboxMessage>>,
    next_id: AtomicI64,
    lease_ttl: Duration,
}

impl Default for MemoryInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryInbox {
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

    pub fn rows(&self) -> Vec<InboxMessage> {
        self.rows.lock().unwrap().clone()
    }

    pub fn get(&self, id: i64) -> Option<InboxMessage> {
        self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }

    pub fn get_by_message_id(&self, message_id: &str) -> Option<InboxMessage> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.message_id == message_id)
            .cloned()
    }

    /// Backdate a row's lease, simulating a holder that disappeared.
    pub fn age_lease(&self, id: i64, locked_at: DateTime<Utc>) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.locked_at = Some(locked_at);
        }
    }

    fn insert(
        &self,
        message_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
        sender_id: Option<&str>,
        status: MessageStatus,
        locked_by: Option<&str>,
    ) -> Option<InboxMessage> {
        let now = Utc::now();
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.message_id == message_id) {
            return None;
        }

        let row = InboxMessage {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            message_id: message_id.to_owned(),
            sender_id: sender_id.map(str::to_owned),
            event_type: event_type.to_owned(),
            payload: payload.clone(),
            status,
            retry_count: 0,
            exchange: None,
            routing_key: None,
            error: None,
            locked_at: locked_by.is_some().then_some(now),
            locked_by: locked_by.map(str::to_owned),
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Some(row)
    }
}

impl InboxRepository for MemoryInbox {
    async fn save(
        &self,
        message_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
        sender_id: Option<&str>,
    ) -> Result<Option<InboxMessage>, RelayError> {
        Ok(self.insert(
            message_id,
            event_type,
            payload,
            sender_id,
            MessageStatus::Pending,
            None,
        ))
    }

    async fn save_claimed(
        &self,
        message_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
        sender_id: Option<&str>,
        worker_id: &str,
    ) -> Result<Option<InboxMessage>, RelayError> {
        Ok(self.insert(
            message_id,
            event_type,
            payload,
            sender_id,
            MessageStatus::Processing,
            Some(worker_id),
        ))
    }

    async fn message_exists(&self, message_id: &str) -> Result<bool, RelayError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.message_id == message_id))
    }

    async fn lease_batch(
        &self,
        worker_id: &str,
        batch_size: u32,
        max_retries: i32,
    ) -> Result<Vec<InboxMessage>, RelayError> {
        let now = Utc::now();
        let cutoff = now - self.lease_ttl;
        let mut rows = self.rows.lock().unwrap();

        let mut candidates: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| match row.status {
                MessageStatus::Pending => true,
                MessageStatus::Failed => row.retry_count < max_retries,
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

    async fn mark_processed(&self, id: i64) -> Result<(), RelayError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.status = MessageStatus::Processed;
            row.locked_at = None;
            row.locked_by = None;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn retry_later(&self, id: i64, error: &str) -> Result<(), RelayError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.status = MessageStatus::Pending;
            row.retry_count += 1;
            row.error = Some(error.to_owned());
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

    async fn list_recent(&self, limit: u64) -> Result<Vec<InboxMessage>, RelayError> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by_key(|r| std::cmp::Reverse((r.created_at, r.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}
