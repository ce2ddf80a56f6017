use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The unit of exchange between services: the JSON body published to and
/// consumed from the broker, and the shape persisted in the outbox/inbox
/// tables. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Globally unique message id (stringified UUID v4).
    pub id: String,
    /// Dotted lowercase event type, e.g. `order.created`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Opaque JSON payload.
    pub payload: serde_json::Value,
    /// Creation instant.
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    /// Build a new envelope with a fresh message id and the current instant.
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Rehydrate an envelope from stored parts (outbox relay path).
    pub fn from_parts(
        id: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            payload,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format_uses_short_field_names() {
        let envelope = Envelope::new("order.created", json!({"order_id": "O1"}));
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["id"], envelope.id);
        assert_eq!(value["type"], "order.created");
        assert_eq!(value["payload"]["order_id"], "O1");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn round_trips_through_json() {
        let envelope = Envelope::new("inventory.reserved", json!({"qty": 3}));
        let body = serde_json::to_vec(&envelope).unwrap();
        let decoded: Envelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn fresh_envelopes_get_distinct_ids() {
        let a = Envelope::new("order.created", json!({}));
        let b = Envelope::new("order.created", json!({}));
        assert_ne!(a.id, b.id);
    }
}
