use sea_orm::entity::prelude::*;

/// Customer order owned by the order service. Status moves
/// `created` → `confirmed` once the warehouse reports the reservation,
/// or → `cancelled` on customer request.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: String,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub status: String,
    pub stock_reserved: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
