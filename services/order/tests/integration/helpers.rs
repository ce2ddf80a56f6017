use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use orderflow_order::domain::repository::{OrderRepository, WarehousePort};
use orderflow_order::domain::types::{Order, OrderStatus, StockLevel};
use orderflow_order::error::OrderServiceError;

// ── MockOrderRepo ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockOrderRepo {
    pub orders: Arc<Mutex<Vec<Order>>>,
    /// Event types "emitted" through the outbox by the repository methods.
    pub events: Arc<Mutex<Vec<String>>>,
}

impl MockOrderRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self {
            orders: Arc::new(Mutex::new(orders)),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn emitted_events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl OrderRepository for MockOrderRepo {
    async fn create_with_event(&self, order: &Order) -> Result<String, OrderServiceError> {
        self.orders.lock().unwrap().push(order.clone());
        self.events.lock().unwrap().push("order.created".to_owned());
        Ok(Uuid::new_v4().to_string())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>, OrderServiceError> {
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>, OrderServiceError> {
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn cancel_with_event(
        &self,
        id: Uuid,
    ) -> Result<Option<(Order, String)>, OrderServiceError> {
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        if order.status == OrderStatus::Cancelled {
            return Err(OrderServiceError::BadRequest(
                "order is already cancelled".to_owned(),
            ));
        }
        order.status = OrderStatus::Cancelled;
        order.updated_at = Utc::now();
        self.events
            .lock()
            .unwrap()
            .push("order.cancelled".to_owned());
        Ok(Some((order.clone(), Uuid::new_v4().to_string())))
    }

    async fn confirm(&self, id: Uuid) -> Result<bool, OrderServiceError> {
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Ok(false);
        };
        order.status = OrderStatus::Confirmed;
        order.stock_reserved = true;
        order.updated_at = Utc::now();
        Ok(true)
    }
}

// ── MockWarehouse ────────────────────────────────────────────────────────────

pub struct MockWarehouse {
    pub stock: Vec<StockLevel>,
    pub unavailable: bool,
}

impl MockWarehouse {
    pub fn with_stock(stock: Vec<StockLevel>) -> Self {
        Self {
            stock,
            unavailable: false,
        }
    }

    pub fn down() -> Self {
        Self {
            stock: Vec::new(),
            unavailable: true,
        }
    }
}

impl WarehousePort for MockWarehouse {
    async fn stock_level(
        &self,
        product_id: &str,
    ) -> Result<Option<StockLevel>, OrderServiceError> {
        if self.unavailable {
            return Err(OrderServiceError::WarehouseUnavailable(
                "connection refused".to_owned(),
            ));
        }
        Ok(self
            .stock
            .iter()
            .find(|s| s.product_id == product_id)
            .cloned())
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn stock_level(product_id: &str, product_name: &str, available: i32) -> StockLevel {
    StockLevel {
        product_id: product_id.to_owned(),
        product_name: product_name.to_owned(),
        quantity: available,
        reserved: 0,
        available,
    }
}

pub fn test_order(product_id: &str) -> Order {
    Order::new(product_id.to_owned(), Some("Laptop".to_owned()), 2)
}
