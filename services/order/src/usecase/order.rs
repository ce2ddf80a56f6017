use tracing::info;
use uuid::Uuid;

use crate::domain::repository::{OrderRepository, WarehousePort};
use crate::domain::types::Order;
use crate::error::OrderServiceError;

// ── CreateOrder ──────────────────────────────────────────────────────────────

pub struct CreateOrderInput {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug)]
pub struct CreatedOrder {
    pub order: Order,
    pub message_id: String,
}

pub struct CreateOrderUseCase<R, W>
where
    R: OrderRepository,
    W: WarehousePort,
{
    pub orders: R,
    pub warehouse: W,
}

impl<R, W> CreateOrderUseCase<R, W>
where
    R: OrderRepository,
    W: WarehousePort,
{
    /// Availability is checked synchronously so obviously unfulfillable
    /// orders are rejected up front; the reservation itself travels through
    /// the outbox as `order.created` and is confirmed asynchronously by
    /// `inventory.reserved`.
    pub async fn execute(&self, input: CreateOrderInput) -> Result<CreatedOrder, OrderServiceError> {
        if input.quantity <= 0 {
            return Err(OrderServiceError::BadRequest(
                "quantity must be positive".to_owned(),
            ));
        }

        let stock = self
            .warehouse
            .stock_level(&input.product_id)
            .await?
            .ok_or_else(|| OrderServiceError::UnknownProduct(input.product_id.clone()))?;

        if stock.available < input.quantity {
            return Err(OrderServiceError::InsufficientStock {
                requested: input.quantity,
                available: stock.available,
            });
        }

        let order = Order::new(
            input.product_id,
            Some(stock.product_name),
            input.quantity,
        );
        let message_id = self.orders.create_with_event(&order).await?;

        info!(
            order_id = %order.id,
            product_id = %order.product_id,
            quantity = order.quantity,
            message_id = %message_id,
            "order created"
        );
        Ok(CreatedOrder { order, message_id })
    }
}

// ── GetOrder / ListOrders ────────────────────────────────────────────────────

pub struct GetOrderUseCase<R: OrderRepository> {
    pub orders: R,
}

impl<R: OrderRepository> GetOrderUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Order, OrderServiceError> {
        self.orders
            .find(id)
            .await?
            .ok_or(OrderServiceError::NotFound)
    }
}

pub struct ListOrdersUseCase<R: OrderRepository> {
    pub orders: R,
}

impl<R: OrderRepository> ListOrdersUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Order>, OrderServiceError> {
        self.orders.list().await
    }
}

// ── CancelOrder ──────────────────────────────────────────────────────────────

pub struct CancelOrderUseCase<R: OrderRepository> {
    pub orders: R,
}

impl<R: OrderRepository> CancelOrderUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(Order, String), OrderServiceError> {
        let (order, message_id) = self
            .orders
            .cancel_with_event(id)
            .await?
            .ok_or(OrderServiceError::NotFound)?;

        info!(order_id = %order.id, message_id = %message_id, "order cancelled");
        Ok((order, message_id))
    }
}
