use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use orderflow_warehouse::domain::repository::InventoryRepository;
use orderflow_warehouse::domain::types::InventoryItem;
use orderflow_warehouse::error::WarehouseServiceError;

// ── MockInventoryRepo ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockInventoryRepo {
    pub items: Arc<Mutex<Vec<InventoryItem>>>,
    /// (event_type, payload) pairs "emitted" through the outbox.
    pub events: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl MockInventoryRepo {
    pub fn with_items(items: Vec<InventoryItem>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items)),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn emitted_events(&self) -> Vec<(String, serde_json::Value)> {
        self.events.lock().unwrap().clone()
    }

    fn emit(&self, event_type: &str, payload: serde_json::Value) -> String {
        self.events
            .lock()
            .unwrap()
            .push((event_type.to_owned(), payload));
        Uuid::new_v4().to_string()
    }
}

impl InventoryRepository for MockInventoryRepo {
    async fn list(&self) -> Result<Vec<InventoryItem>, WarehouseServiceError> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn find_by_product(
        &self,
        product_id: &str,
    ) -> Result<Option<InventoryItem>, WarehouseServiceError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.product_id == product_id)
            .cloned())
    }

    async fn reserve_with_event(
        &self,
        order_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> Result<(InventoryItem, String), WarehouseServiceError> {
        let mut items = self.items.lock().unwrap();
        let Some(item) = items.iter_mut().find(|i| i.product_id == product_id) else {
            return Err(WarehouseServiceError::NotFound);
        };

        let available = item.available();
        if available < quantity {
            return Err(WarehouseServiceError::InsufficientStock {
                requested: quantity,
                available,
            });
        }

        item.reserved += quantity;
        item.updated_at = Utc::now();
        let snapshot = item.clone();
        drop(items);

        let message_id = self.emit(
            "inventory.reserved",
            serde_json::json!({
                "order_id": order_id,
                "product_id": product_id,
                "quantity": quantity,
            }),
        );
        Ok((snapshot, message_id))
    }

    async fn release_with_event(
        &self,
        order_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> Result<(InventoryItem, String), WarehouseServiceError> {
        let mut items = self.items.lock().unwrap();
        let Some(item) = items.iter_mut().find(|i| i.product_id == product_id) else {
            return Err(WarehouseServiceError::NotFound);
        };

        let released = quantity.min(item.reserved).max(0);
        item.reserved -= released;
        item.updated_at = Utc::now();
        let snapshot = item.clone();
        drop(items);

        let message_id = self.emit(
            "inventory.released",
            serde_json::json!({
                "order_id": order_id,
                "product_id": product_id,
                "quantity": released,
            }),
        );
        Ok((snapshot, message_id))
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn inventory_item(product_id: &str, name: &str, quantity: i32, reserved: i32) -> InventoryItem {
    InventoryItem {
        id: Uuid::new_v4(),
        product_id: product_id.to_owned(),
        product_name: name.to_owned(),
        quantity,
        reserved,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
