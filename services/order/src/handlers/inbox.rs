use anyhow::Context as _;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use orderflow_relay::message::InboxMessage;
use orderflow_relay::repository::InboxRepository as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::OrderServiceError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct InboxMessageResponse {
    pub id: i64,
    pub message_id: String,
    pub sender_id: Option<String>,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub retry_count: i32,
    pub error: Option<String>,
    #[serde(serialize_with = "orderflow_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "orderflow_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<InboxMessage> for InboxMessageResponse {
    fn from(message: InboxMessage) -> Self {
        Self {
            id: message.id,
            message_id: message.message_id,
            sender_id: message.sender_id,
            event_type: message.event_type,
            payload: message.payload,
            status: message.status.as_str().to_owned(),
            retry_count: message.retry_count,
            error: message.error,
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}

// ── POST /inbox ──────────────────────────────────────────────────────────────

/// Manual injection seam: feeds an event into the inbox without the broker,
/// as if it had just been delivered. The workers pick it up on their next
/// tick.
#[derive(Deserialize)]
pub struct CreateInboxMessageRequest {
    pub event_type: String,
    pub payload: serde_json::Value,
    pub sender_id: Option<String>,
}

#[derive(Serialize)]
pub struct CreateInboxMessageResponse {
    pub message_id: String,
    pub event_type: String,
}

pub async fn create_inbox_message(
    State(state): State<AppState>,
    Json(body): Json<CreateInboxMessageRequest>,
) -> Result<(StatusCode, Json<CreateInboxMessageResponse>), OrderServiceError> {
    let message_id = Uuid::new_v4().to_string();
    state
        .inbox_repo()
        .save(
            &message_id,
            &body.event_type,
            &body.payload,
            body.sender_id.as_deref(),
        )
        .await
        .context("save inbox message")?;

    Ok((
        StatusCode::CREATED,
        Json(CreateInboxMessageResponse {
            message_id,
            event_type: body.event_type,
        }),
    ))
}

// ── GET /inbox ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct InboxMessagesResponse {
    pub count: usize,
    pub messages: Vec<InboxMessageResponse>,
}

pub async fn list_inbox_messages(
    State(state): State<AppState>,
) -> Result<Json<InboxMessagesResponse>, OrderServiceError> {
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
