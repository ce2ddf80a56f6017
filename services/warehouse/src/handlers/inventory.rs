use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use crate::domain::types::InventoryItem;
use crate::error::WarehouseServiceError;
use crate::state::AppState;
use crate::usecase::inventory::{GetStockUseCase, ListInventoryUseCase};

#[derive(Serialize)]
pub struct StockResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub reserved: i32,
    pub available: i32,
    #[serde(serialize_with = "orderflow_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<InventoryItem> for StockResponse {
    fn from(item: InventoryItem) -> Self {
        Self {
            available: item.available(),
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            reserved: item.reserved,
            updated_at: item.updated_at,
        }
    }
}

// ── GET /inventory ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct InventoryResponse {
    pub count: usize,
    pub items: Vec<StockResponse>,
}

pub async fn list_inventory(
    State(state): State<AppState>,
) -> Result<Json<InventoryResponse>, WarehouseServiceError> {
    let usecase = ListInventoryUseCase {
        inventory: state.inventory_repo(),
    };
    let items: Vec<StockResponse> = usecase
        .execute()
        .await?
        .into_iter()
        .map(StockResponse::from)
        .collect();
    Ok(Json(InventoryResponse {
        count: items.len(),
        items,
    }))
}

// ── GET /inventory/{product_id} ──────────────────────────────────────────────

/// Availability check consumed by the order service before it accepts an
/// order.
pub async fn get_stock(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<StockResponse>, WarehouseServiceError> {
    let usecase = GetStockUseCase {
        inventory: state.inventory_repo(),
    };
    let item = usecase.execute(&product_id).await?;
    Ok(Json(item.into()))
}
