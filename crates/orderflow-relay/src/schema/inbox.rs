use sea_orm::entity::prelude::*;

/// Durable relay row for an event the local service has received.
/// `message_id` carries a unique constraint: it is the dedup key.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inbox")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub message_id: String,
    pub sender_id: Option<String>,
    pub event_type: String,
    pub payload: Json,
    pub status: String,
    pub retry_count: i32,
    pub exchange: Option<String>,
    pub routing_key: Option<String>,
    pub error: Option<String>,
    pub locked_at: Option<chrono::DateTime<chrono::Utc>>,
    pub locked_by: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
