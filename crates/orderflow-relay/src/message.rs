use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::RelayError;

/// Relay row status. Stored as canonical uppercase strings; parsing accepts
/// the lowercase values written by earlier schema revisions.
///
/// Outbox rows move PENDING → PROCESSING → {PUBLISHED, FAILED}; inbox rows
/// move PENDING → PROCESSING → {PROCESSED, PENDING (retry), FAILED}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Pending,
    Processing,
    Published,
    Processed,
    Failed,
}

impl MessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Published => "PUBLISHED",
            Self::Processed => "PROCESSED",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, RelayError> {
        match value {
            "PENDING" | "pending" => Ok(Self::Pending),
            "PROCESSING" | "processing" => Ok(Self::Processing),
            "PUBLISHED" | "published" => Ok(Self::Published),
            "PROCESSED" | "processed" => Ok(Self::Processed),
            "FAILED" | "failed" => Ok(Self::Failed),
            other => Err(RelayError::InvalidStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event the local service intends to publish.
#[derive(Debug, Clone)]
pub struct OutboxMessage {
    pub id: i64,
    pub message_id: String,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub status: MessageStatus,
    pub retry_count: i32,
    pub exchange: Option<String>,
    pub routing_key: Option<String>,
    pub error: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One event the local service has received. `message_id` is the dedup key.
#[derive(Debug, Clone)]
pub struct InboxMessage {
    pub id: i64,
    pub message_id: String,
    pub sender_id: Option<String>,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub status: MessageStatus,
    pub retry_count: i32,
    pub exchange: Option<String>,
    pub routing_key: Option<String>,
    pub error: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_statuses_are_uppercase() {
        assert_eq!(MessageStatus::Pending.as_str(), "PENDING");
        assert_eq!(MessageStatus::Published.as_str(), "PUBLISHED");
        assert_eq!(MessageStatus::Processed.as_str(), "PROCESSED");
    }

    #[test]
    fn parse_accepts_legacy_lowercase_values() {
        assert_eq!(
            MessageStatus::parse("processed").unwrap(),
            MessageStatus::Processed
        );
        assert_eq!(
            MessageStatus::parse("failed").unwrap(),
            MessageStatus::Failed
        );
        assert_eq!(
            MessageStatus::parse("PENDING").unwrap(),
            MessageStatus::Pending
        );
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert!(matches!(
            MessageStatus::parse("Shipped"),
            Err(RelayError::InvalidStatus(v)) if v == "Shipped"
        ));
    }
}
