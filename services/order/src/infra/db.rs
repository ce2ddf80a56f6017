use anyhow::Context as _;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use orderflow_order_schema::orders;
use orderflow_relay::pg::DbOutboxRepository;

use crate::domain::repository::OrderRepository;
use crate::domain::types::{Order, OrderStatus};
use crate::error::OrderServiceError;

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
    pub outbox: DbOutboxRepository,
}

impl OrderRepository for DbOrderRepository {
    async fn create_with_event(&self, order: &Order) -> Result<String, OrderServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .context("begin create-order transaction")?;

        orders::ActiveModel {
            id: Set(order.id),
            product_id: Set(order.product_id.clone()),
            product_name: Set(order.product_name.clone()),
            quantity: Set(order.quantity),
            status: Set(order.status.as_str().to_owned()),
            stock_reserved: Set(order.stock_reserved),
            created_at: Set(order.created_at),
            updated_at: Set(order.updated_at),
        }
        .insert(&txn)
        .await
        .context("insert order")?;

        let message_id = self
            .outbox
            .save(&txn, "order.created", &order_event_payload(order))
            .await
            .context("save order.created outbox message")?;

        txn.commit()
            .await
            .context("commit create-order transaction")?;
        Ok(message_id)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>, OrderServiceError> {
        let model = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find order")?;
        model.map(order_from_model).transpose()
    }

    async fn list(&self) -> Result<Vec<Order>, OrderServiceError> {
        let models = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list orders")?;
        models.into_iter().map(order_from_model).collect()
    }

    async fn cancel_with_event(
        &self,
        id: Uuid,
    ) -> Result<Option<(Order, String)>, OrderServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .context("begin cancel-order transaction")?;

        let Some(model) = orders::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("find order to cancel")?
        else {
            return Ok(None);
        };

        if model.status == OrderStatus::Cancelled.as_str() {
            return Err(OrderServiceError::BadRequest(
                "order is already cancelled".to_owned(),
            ));
        }

        let updated = orders::ActiveModel {
            id: Set(id),
            status: Set(OrderStatus::Cancelled.as_str().to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&txn)
        .await
        .context("cancel order")?;

        let message_id = self
            .outbox
            .save(
                &txn,
                "order.cancelled",
                &json!({
                    "order_id": model.id.to_string(),
                    "product_id": model.product_id,
                    "quantity": model.quantity,
                }),
            )
            .await
            .context("save order.cancelled outbox message")?;

        txn.commit()
            .await
            .context("commit cancel-order transaction")?;
        Ok(Some((order_from_model(updated)?, message_id)))
    }

    async fn confirm(&self, id: Uuid) -> Result<bool, OrderServiceError> {
        let result = orders::Entity::update_many()
            .col_expr(
                orders::Column::Status,
                Expr::value(OrderStatus::Confirmed.as_str()),
            )
            .col_expr(orders::Column::StockReserved, Expr::value(true))
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("confirm order")?;
        Ok(result.rows_affected > 0)
    }
}

fn order_event_payload(order: &Order) -> serde_json::Value {
    json!({
        "order_id": order.id.to_string(),
        "product_id": order.product_id,
        "quantity": order.quantity,
    })
}

fn order_from_model(model: orders::Model) -> Result<Order, OrderServiceError> {
    Ok(Order {
        id: model.id,
        product_id: model.product_id,
        product_name: model.product_name,
        quantity: model.quantity,
        status: OrderStatus::parse(&model.status)?,
        stock_reserved: model.stock_reserved,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
