use std::time::Duration;

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, Statement,
};
use uuid::Uuid;

use crate::error::RelayError;
use crate::message::{MessageStatus, OutboxMessage};
use crate::repository::OutboxRepository;
use crate::schema::outbox;

use super::DEFAULT_LEASE_TTL;

const LEASE_SQL: &str = r#"
UPDATE outbox
SET status = 'PROCESSING',
    locked_at = NOW(),
    locked_by = $1,
    updated_at = NOW()
WHERE id IN (
    SELECT id FROM outbox
    WHERE (
        status IN ('PENDING', 'pending')
        OR (status IN ('PROCESSING', 'processing')
            AND locked_at < NOW() - make_interval(secs => $3))
    )
    ORDER BY created_at ASC
    LIMIT $2
    FOR UPDATE SKIP LOCKED
)
RETURNING id, message_id, event_type, payload, status, retry_count,
          exchange, routing_key, error, locked_at, locked_by,
          created_at, updated_at
"#;

const MARK_PUBLISHED_SQL: &str = r#"
UPDATE outbox
SET status = 'PUBLISHED',
    updated_at = NOW(),
    locked_at = NULL,
    locked_by = NULL
WHERE id = $1
"#;

const MARK_FAILED_SQL: &str = r#"
UPDATE outbox
SET status = 'FAILED',
    retry_count = retry_count + 1,
    updated_at = NOW(),
    locked_at = NULL,
    locked_by = NULL,
    error = $2
WHERE id = $1
"#;

const RESET_STUCK_SQL: &str = r#"
UPDATE outbox
SET status = 'PENDING',
    locked_at = NULL,
    locked_by = NULL,
    updated_at = NOW()
WHERE status IN ('PROCESSING', 'processing')
  AND locked_at < NOW() - make_interval(secs => $1)
"#;

/// Postgres outbox store. Cheap to clone; all workers of a service share the
/// same connection pool underneath.
#[derive(Clone)]
pub struct DbOutboxRepository {
    db: DatabaseConnection,
    default_exchange: String,
    lease_ttl: Duration,
}

impl DbOutboxRepository {
    pub fn new(db: DatabaseConnection, default_exchange: impl Into<String>) -> Self {
        Self {
            db,
            default_exchange: default_exchange.into(),
            lease_ttl: DEFAULT_LEASE_TTL,
        }
    }

    pub fn with_lease_ttl(mut self, lease_ttl: Duration) -> Self {
        self.lease_ttl = lease_ttl;
        self
    }

    /// Insert a PENDING row and return its fresh message id.
    ///
    /// Generic over the connection so callers run it inside the transaction
    /// that writes their domain state: the domain mutation and the pending
    /// event commit or roll back together, which is what makes the eventual
    /// publish guaranteed.
    pub async fn save<C: ConnectionTrait>(
        &self,
        conn: &C,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<String, RelayError> {
        let message_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        outbox::ActiveModel {
            message_id: Set(message_id.clone()),
            event_type: Set(event_type.to_owned()),
            payload: Set(payload.clone()),
            status: Set(MessageStatus::Pending.as_str().to_owned()),
            retry_count: Set(0),
            exchange: Set(Some(self.default_exchange.clone())),
            routing_key: Set(Some(event_type.to_owned())),
            error: Set(None),
            locked_at: Set(None),
            locked_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        Ok(message_id)
    }
}

impl OutboxRepository for DbOutboxRepository {
    async fn lease_batch(
        &self,
        worker_id: &str,
        batch_size: u32,
    ) -> Result<Vec<OutboxMessage>, RelayError> {
        let rows = outbox::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                LEASE_SQL,
                [
                    worker_id.into(),
                    i64::from(batch_size).into(),
                    self.lease_ttl.as_secs_f64().into(),
                ],
            ))
            .all(&self.db)
            .await?;

        rows.into_iter().map(outbox_from_model).collect()
    }

    async fn mark_published(&self, id: i64) -> Result<(), RelayError> {
        self.db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                MARK_PUBLISHED_SQL,
                [id.into()],
            ))
            .await?;
        Ok(())
    }

    async fn mark_failed(&self, id: i64, error: &str) -> Result<(), RelayError> {
        self.db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                MARK_FAILED_SQL,
                [id.into(), error.into()],
            ))
            .await?;
        Ok(())
    }

    async fn reset_stuck(&self, older_than: Duration) -> Result<u64, RelayError> {
        let result = self
            .db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                RESET_STUCK_SQL,
                [older_than.as_secs_f64().into()],
            ))
            .await?;
        Ok(result.rows_affected())
    }
}

fn outbox_from_model(model: outbox::Model) -> Result<OutboxMessage, RelayError> {
    Ok(OutboxMessage {
        id: model.id,
        message_id: model.message_id,
        event_type: model.event_type,
        payload: model.payload,
        status: MessageStatus::parse(&model.status)?,
        retry_count: model.retry_count,
        exchange: model.exchange,
        routing_key: model.routing_key,
        error: model.error,
        locked_at: model.locked_at,
        locked_by: model.locked_by,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
