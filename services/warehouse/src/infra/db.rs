use anyhow::Context as _;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde_json::json;

use orderflow_relay::pg::DbOutboxRepository;
use orderflow_warehouse_schema::inventory;

use crate::domain::repository::InventoryRepository;
use crate::domain::types::InventoryItem;
use crate::error::WarehouseServiceError;

#[derive(Clone)]
pub struct DbInventoryRepository {
    pub db: DatabaseConnection,
    pub outbox: DbOutboxRepository,
}

impl DbInventoryRepository {
    /// Row-locked read so concurrent reservations of the same product are
    /// serialized inside their transactions.
    async fn find_for_update(
        &self,
        txn: &DatabaseTransaction,
        product_id: &str,
    ) -> Result<Option<inventory::Model>, WarehouseServiceError> {
        let model = inventory::Entity::find()
            .filter(inventory::Column::ProductId.eq(product_id))
            .lock_exclusive()
            .one(txn)
            .await
            .context("lock inventory row")?;
        Ok(model)
    }
}

impl InventoryRepository for DbInventoryRepository {
    async fn list(&self) -> Result<Vec<InventoryItem>, WarehouseServiceError> {
        let models = inventory::Entity::find()
            .order_by_asc(inventory::Column::ProductId)
            .all(&self.db)
            .await
            .context("list inventory")?;
        Ok(models.into_iter().map(item_from_model).collect())
    }

    async fn find_by_product(
        &self,
        product_id: &str,
    ) -> Result<Option<InventoryItem>, WarehouseServiceError> {
        let model = inventory::Entity::find()
            .filter(inventory::Column::ProductId.eq(product_id))
            .one(&self.db)
            .await
            .context("find inventory item")?;
        Ok(model.map(item_from_model))
    }

    async fn reserve_with_event(
        &self,
        order_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> Result<(InventoryItem, String), WarehouseServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .context("begin reserve transaction")?;

        let Some(model) = self.find_for_update(&txn, product_id).await? else {
            return Err(WarehouseServiceError::NotFound);
        };

        let available = model.quantity - model.reserved;
        if available < quantity {
            return Err(WarehouseServiceError::InsufficientStock {
                requested: quantity,
                available,
            });
        }

        let updated = inventory::ActiveModel {
            id: Set(model.id),
            reserved: Set(model.reserved + quantity),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&txn)
        .await
        .context("update reserved stock")?;

        let message_id = self
            .outbox
            .save(
                &txn,
                "inventory.reserved",
                &json!({
                    "order_id": order_id,
                    "product_id": product_id,
                    "quantity": quantity,
                }),
            )
            .await
            .context("save inventory.reserved outbox message")?;

        txn.commit().await.context("commit reserve transaction")?;
        Ok((item_from_model(updated), message_id))
    }

    async fn release_with_event(
        &self,
        order_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> Result<(InventoryItem, String), WarehouseServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .context("begin release transaction")?;

        let Some(model) = self.find_for_update(&txn, product_id).await? else {
            return Err(WarehouseServiceError::NotFound);
        };

        // An order cancelled before its reservation landed has nothing to
        // give back; never drive `reserved` negative.
        let released = quantity.min(model.reserved).max(0);

        let updated = inventory::ActiveModel {
            id: Set(model.id),
            reserved: Set(model.reserved - released),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&txn)
        .await
        .context("update released stock")?;

        let message_id = self
            .outbox
            .save(
                &txn,
                "inventory.released",
                &json!({
                    "order_id": order_id,
                    "product_id": product_id,
                    "quantity": released,
                }),
            )
            .await
            .context("save inventory.released outbox message")?;

        txn.commit().await.context("commit release transaction")?;
        Ok((item_from_model(updated), message_id))
    }
}

fn item_from_model(model: inventory::Model) -> InventoryItem {
    InventoryItem {
        id: model.id,
        product_id: model.product_id,
        product_name: model.product_name,
        quantity: model.quantity,
        reserved: model.reserved,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
