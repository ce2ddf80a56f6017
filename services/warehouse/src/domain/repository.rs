#![allow(async_fn_in_trait)]

use std::future::Future;

use crate::domain::types::InventoryItem;
use crate::error::WarehouseServiceError;

/// Repository for warehouse stock. The mutating operations write the stock
/// change and the announcing outbox row in one transaction, and return the
/// updated item together with the outbox message id.
pub trait InventoryRepository: Send + Sync {
    fn list(&self) -> impl Future<Output = Result<Vec<InventoryItem>, WarehouseServiceError>> + Send;

    fn find_by_product(
        &self,
        product_id: &str,
    ) -> impl Future<Output = Result<Option<InventoryItem>, WarehouseServiceError>> + Send;

    /// Hold `quantity` units for `order_id` and emit `inventory.reserved`.
    /// Fails with `NotFound` for an unknown product and `InsufficientStock`
    /// when fewer than `quantity` units are available.
    fn reserve_with_event(
        &self,
        order_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> impl Future<Output = Result<(InventoryItem, String), WarehouseServiceError>> + Send;

    /// Return up to `quantity` reserved units and emit `inventory.released`.
    /// The release is clamped to the currently reserved count so a cancel
    /// for a never-reserved order cannot corrupt the stock figures.
    fn release_with_event(
        &self,
        order_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> impl Future<Output = Result<(InventoryItem, String), WarehouseServiceError>> + Send;
}
