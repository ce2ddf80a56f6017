use anyhow::Context as _;
use axum::Json;
use axum::extract::State;
use orderflow_relay::message::InboxMessage;
use orderflow_relay::repository::InboxRepository as _;
use serde::Serialize;

use crate::error::WarehouseServiceError;
use crate::state::AppState;

// ── GET /inbox ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct InboxMessageResponse {
    pub id: i64,
    pub message_id: String,
    pub sender_id: Option<String>,
    pub event_type: String,
    pub status: String,
    pub retry_count: i32,
    pub error: Option<String>,
    #[serde(serialize_with = "orderflow_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<InboxMessage> for InboxMessageResponse {
    fn from(message: InboxMessage) -> Self {
        Self {
            id: message.id,
            message_id: message.message_id,
            sender_id: message.sender_id,
            event_type: message.event_type,
            status: message.status.as_str().to_owned(),
            retry_count: message.retry_count,
            error: message.error,
            created_at: message.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct InboxMessagesResponse {
    pub count: usize,
    pub messages: Vec<InboxMessageResponse>,
}

pub async fn list_inbox_messages(
    State(state): State<AppState>,
) -> Result<Json<InboxMessagesResponse>, WarehouseServiceError> {
    let messages: Vec<InboxMessageResponse> = state
        .inbox_repo()
        .list_recent(100)
        .await
        .context("list inbox messages")?
        .into_iter()
        .map(InboxMessageResponse::from)
        .collect();

    Ok(Json(InboxMessagesResponse {
        count: messages.len(),
        messages,
    }))
}
