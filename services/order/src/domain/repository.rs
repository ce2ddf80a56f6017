#![allow(async_fn_in_trait)]

use std::future::Future;

use uuid::Uuid;

use crate::domain::types::{Order, StockLevel};
use crate::error::OrderServiceError;

/// Repository for customer orders.
pub trait OrderRepository: Send + Sync {
    /// Insert the order and an `order.created` outbox row in the same
    /// transaction; returns the outbox message id.
    fn create_with_event(
        &self,
        order: &Order,
    ) -> impl Future<Output = Result<String, OrderServiceError>> + Send;

    fn find(&self, id: Uuid) -> impl Future<Output = Result<Option<Order>, OrderServiceError>> + Send;

    /// Most recent orders first.
    fn list(&self) -> impl Future<Output = Result<Vec<Order>, OrderServiceError>> + Send;

    /// Mark the order cancelled and emit `order.cancelled` atomically.
    /// Returns the updated order and the outbox message id, or `None` when
    /// the order is unknown.
    fn cancel_with_event(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<(Order, String)>, OrderServiceError>> + Send;

    /// Mark the order confirmed with its stock reserved (driven by the
    /// `inventory.reserved` event). Returns `false` when the order is
    /// unknown.
    fn confirm(&self, id: Uuid) -> impl Future<Output = Result<bool, OrderServiceError>> + Send;
}

/// Port for the synchronous availability check against the warehouse.
pub trait WarehousePort: Send + Sync {
    /// `None` when the warehouse does not know the product.
    fn stock_level(
        &self,
        product_id: &str,
    ) -> impl Future<Output = Result<Option<StockLevel>, OrderServiceError>> + Send;
}
