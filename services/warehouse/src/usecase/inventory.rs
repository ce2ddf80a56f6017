use tracing::info;

use crate::domain::repository::InventoryRepository;
use crate::domain::types::InventoryItem;
use crate::error::WarehouseServiceError;

// ── GetStock / ListInventory ─────────────────────────────────────────────────

pub struct GetStockUseCase<R: InventoryRepository> {
    pub inventory: R,
}

impl<R: InventoryRepository> GetStockUseCase<R> {
    pub async fn execute(&self, product_id: &str) -> Result<InventoryItem, WarehouseServiceError> {
        self.inventory
            .find_by_product(product_id)
            .await?
            .ok_or(WarehouseServiceError::NotFound)
    }
}

pub struct ListInventoryUseCase<R: InventoryRepository> {
    pub inventory: R,
}

impl<R: InventoryRepository> ListInventoryUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<InventoryItem>, WarehouseServiceError> {
        self.inventory.list().await
    }
}

// ── ReserveStock ─────────────────────────────────────────────────────────────

pub struct ReserveStockUseCase<R: InventoryRepository> {
    pub inventory: R,
}

impl<R: InventoryRepository> ReserveStockUseCase<R> {
    pub async fn execute(
        &self,
        order_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> Result<InventoryItem, WarehouseServiceError> {
        if quantity <= 0 {
            return Err(WarehouseServiceError::BadRequest(
                "quantity must be positive".to_owned(),
            ));
        }

        let (item, message_id) = self
            .inventory
            .reserve_with_event(order_id, product_id, quantity)
            .await?;

        info!(
            order_id,
            product_id,
            quantity,
            available = item.available(),
            message_id = %message_id,
            "stock reserved"
        );
        Ok(item)
    }
}

// ── ReleaseStock ─────────────────────────────────────────────────────────────

pub struct ReleaseStockUseCase<R: InventoryRepository> {
    pub inventory: R,
}

impl<R: InventoryRepository> ReleaseStockUseCase<R> {
    pub async fn execute(
        &self,
        order_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> Result<InventoryItem, WarehouseServiceError> {
        let (item, message_id) = self
            .inventory
            .release_with_event(order_id, product_id, quantity)
            .await?;

        info!(
            order_id,
            product_id,
            quantity,
            available = item.available(),
            message_id = %message_id,
            "stock released"
        );
        Ok(item)
    }
}
