use std::time::Duration;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, QueryOrder, QuerySelect,
    Statement,
};

use crate::error::RelayError;
use crate::message::{InboxMessage, MessageStatus};
use crate::repository::InboxRepository;
use crate::schema::inbox;

use super::DEFAULT_LEASE_TTL;

const SAVE_SQL: &str = r#"
INSERT INTO inbox
    (message_id, sender_id, event_type, payload, status, retry_count, created_at, updated_at)
VALUES ($1, $2, $3, $4, 'PENDING', 0, NOW(), NOW())
ON CONFLICT (message_id) DO NOTHING
RETURNING id, message_id, sender_id, event_type, payload, status, retry_count,
          exchange, routing_key, error, locked_at, locked_by,
          created_at, updated_at
"#;

const SAVE_CLAIMED_SQL: &str = r#"
INSERT INTO inbox
    (message_id, sender_id, event_type, payload, status, retry_count,
     locked_at, locked_by, created_at, updated_at)
VALUES ($1, $2, $3, $4, 'PROCESSING', 0, NOW(), $5, NOW(), NOW())
ON CONFLICT (message_id) DO NOTHING
RETURNING id, message_id, sender_id, event_type, payload, status, retry_count,
          exchange, routing_key, error, locked_at, locked_by,
          created_at, updated_at
"#;

const EXISTS_SQL: &str = r#"
SELECT EXISTS(SELECT 1 FROM inbox WHERE message_id = $1) AS present
"#;

const LEASE_SQL: &str = r#"
UPDATE inbox
SET status = 'PROCESSING',
    locked_at = NOW(),
    locked_by = $1,
    updated_at = NOW()
WHERE id IN (
    SELECT id FROM inbox
    WHERE (
        status IN ('PENDING', 'pending')
        OR (status IN ('FAILED', 'failed') AND retry_count < $3)
        OR (status IN ('PROCESSING', 'processing')
            AND locked_at < NOW() - make_interval(secs => $4))
    )
    ORDER BY created_at ASC
    LIMIT $2
    FOR UPDATE SKIP LOCKED
)
RETURNING id, message_id, sender_id, event_type, payload, status, retry_count,
          exchange, routing_key, error, locked_at, locked_by,
          created_at, updated_at
"#;

const MARK_PROCESSED_SQL: &str = r#"
UPDATE inbox
SET status = 'PROCESSED',
    updated_at = NOW(),
    locked_at = NULL,
    locked_by = NULL
WHERE id = $1
"#;

const RETRY_LATER_SQL: &str = r#"
UPDATE inbox
SET status = 'PENDING',
    retry_count = retry_count + 1,
    updated_at = NOW(),
    locked_at = NULL,
    locked_by = NULL,
    error = $2
WHERE id = $1
"#;

const MARK_FAILED_SQL: &str = r#"
UPDATE inbox
SET status = 'FAILED',
    retry_count = retry_count + 1,
    updated_at = NOW(),
    locked_at = NULL,
    locked_by = NULL,
    error = $2
WHERE id = $1
"#;

const RESET_STUCK_SQL: &str = r#"
UPDATE inbox
SET status = 'PENDING',
    locked_at = NULL,
    locked_by = NULL,
    updated_at = NOW()
WHERE status IN ('PROCESSING', 'processing')
  AND locked_at < NOW() - make_interval(secs => $1)
"#;

/// Postgres inbox store.
#[derive(Clone)]
pub struct DbInboxRepository {
    db: DatabaseConnection,
    lease_ttl: Duration,
}

impl DbInboxRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            lease_ttl: DEFAULT_LEASE_TTL,
        }
    }

    pub fn with_lease_ttl(mut self, lease_ttl: Duration) -> Self {
        self.lease_ttl = lease_ttl;
        self
    }
}

impl InboxRepository for DbInboxRepository {
    async fn save(
        &self,
        message_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
        sender_id: Option<&str>,
    ) -> Result<Option<InboxMessage>, RelayError> {
        // ON CONFLICT DO NOTHING returns no row for a duplicate, so the
        // second insert of the same message_id is a no-op, not an error.
        let row = inbox::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                SAVE_SQL,
                [
                    message_id.into(),
                    sender_id.map(str::to_owned).into(),
                    event_type.into(),
                    payload.clone().into(),
                ],
            ))
            .one(&self.db)
            .await?;

        row.map(inbox_from_model).transpose()
    }

    async fn save_claimed(
        &self,
        message_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
        sender_id: Option<&str>,
        worker_id: &str,
    ) -> Result<Option<InboxMessage>, RelayError> {
        let row = inbox::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                SAVE_CLAIMED_SQL,
                [
                    message_id.into(),
                    sender_id.map(str::to_owned).into(),
                    event_type.into(),
                    payload.clone().into(),
                    worker_id.into(),
                ],
            ))
            .one(&self.db)
            .await?;

        row.map(inbox_from_model).transpose()
    }

    async fn message_exists(&self, message_id: &str) -> Result<bool, RelayError> {
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                EXISTS_SQL,
                [message_id.into()],
            ))
            .await?;

        match row {
            Some(row) => Ok(row.try_get("", "present")?),
            None => Ok(false),
        }
    }

    async fn lease_batch(
        &self,
        worker_id: &str,
        batch_size: u32,
        max_retries: i32,
    ) -> Result<Vec<InboxMessage>, RelayError> {
        let rows = inbox::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                LEASE_SQL,
                [
                    worker_id.into(),
                    i64::from(batch_size).into(),
                    max_retries.into(),
                    self.lease_ttl.as_secs_f64().into(),
                ],
            ))
            .all(&self.db)
            .await?;

        rows.into_iter().map(inbox_from_model).collect()
    }

    async fn mark_processed(&self, id: i64) -> Result<(), RelayError> {
        self.db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                MARK_PROCESSED_SQL,
                [id.into()],
            ))
            .await?;
        Ok(())
    }

    async fn retry_later(&self, id: i64, error: &str) -> Result<(), RelayError> {
        self.db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                RETRY_LATER_SQL,
                [id.into(), error.into()],
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

    async fn list_recent(&self, limit: u64) -> Result<Vec<InboxMessage>, RelayError> {
        let rows = inbox::Entity::find()
            .order_by_desc(inbox::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        rows.into_iter().map(inbox_from_model).collect()
    }
}

fn inbox_from_model(model: inbox::Model) -> Result<InboxMessage, RelayError> {
    Ok(InboxMessage {
        id: model.id,
        message_id: model.message_id,
        sender_id: model.sender_id,
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
