use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::OrderServiceError;

/// Order lifecycle: `created` until the warehouse confirms the reservation,
/// then `confirmed`; `cancelled` on customer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Created,
    Confirmed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, OrderServiceError> {
        match value {
            "created" => Ok(Self::Created),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(OrderServiceError::Internal(anyhow::anyhow!(
                "invalid order status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub product_id: String,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub status: OrderStatus,
    pub stock_reserved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(product_id: String, product_name: Option<String>, quantity: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            product_id,
            product_name,
            quantity,
            status: OrderStatus::Created,
            stock_reserved: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Stock snapshot returned by the warehouse availability check.
#[derive(Debug, Clone)]
pub struct StockLevel {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub reserved: i32,
    pub available: i32,
}
