use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::Order;
use crate::error::OrderServiceError;
use crate::state::AppState;
use crate::usecase::order::{
    CancelOrderUseCase, CreateOrderInput, CreateOrderUseCase, GetOrderUseCase, ListOrdersUseCase,
};

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub product_id: String,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub status: String,
    pub stock_reserved: bool,
    #[serde(serialize_with = "orderflow_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "orderflow_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            product_id: order.product_id,
            product_name: order.product_name,
            quantity: order.quantity,
            status: order.status.as_str().to_owned(),
            stock_reserved: order.stock_reserved,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

// ── POST /orders ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub order: OrderResponse,
    /// Outbox message id of the emitted `order.created` event.
    pub message_id: String,
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), OrderServiceError> {
    let usecase = CreateOrderUseCase {
        orders: state.order_repo(),
        warehouse: state.warehouse.clone(),
    };
    let created = usecase
        .execute(CreateOrderInput {
            product_id: body.product_id,
            quantity: body.quantity,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order: created.order.into(),
            message_id: created.message_id,
        }),
    ))
}

// ── GET /orders/{order_id} ───────────────────────────────────────────────────

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, OrderServiceError> {
    let usecase = GetOrderUseCase {
        orders: state.order_repo(),
    };
    let order = usecase.execute(order_id).await?;
    Ok(Json(order.into()))
}

// ── GET /orders ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct OrdersResponse {
    pub count: usize,
    pub orders: Vec<OrderResponse>,
}

pub async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<OrdersResponse>, OrderServiceError> {
    let usecase = ListOrdersUseCase {
        orders: state.order_repo(),
    };
    let orders: Vec<OrderResponse> = usecase
        .execute()
        .await?
        .into_iter()
        .map(OrderResponse::from)
        .collect();
    Ok(Json(OrdersResponse {
        count: orders.len(),
        orders,
    }))
}

// ── POST /orders/{order_id}/cancel ───────────────────────────────────────────

#[derive(Serialize)]
pub struct CancelOrderResponse {
    pub order: OrderResponse,
    /// Outbox message id of the emitted `order.cancelled` event.
    pub message_id: String,
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<CancelOrderResponse>, OrderServiceError> {
    let usecase = CancelOrderUseCase {
        orders: state.order_repo(),
    };
    let (order, message_id) = usecase.execute(order_id).await?;
    Ok(Json(CancelOrderResponse {
        order: order.into(),
        message_id,
    }))
}
