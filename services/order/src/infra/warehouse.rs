use serde::Deserialize;

use crate::domain::repository::WarehousePort;
use crate::domain::types::StockLevel;
use crate::error::OrderServiceError;

/// HTTP client implementing [`WarehousePort`] against the warehouse service.
#[derive(Clone)]
pub struct HttpWarehouseClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWarehouseClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[derive(Deserialize)]
struct StockResponse {
    product_id: String,
    product_name: String,
    quantity: i32,
    reserved: i32,
    available: i32,
}

impl WarehousePort for HttpWarehouseClient {
    async fn stock_level(
        &self,
        product_id: &str,
    ) -> Result<Option<StockLevel>, OrderServiceError> {
        let url = format!("{}/inventory/{product_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| OrderServiceError::WarehouseUnavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(OrderServiceError::WarehouseUnavailable(format!(
                "warehouse returned status {}",
                response.status()
            )));
        }

        let body: StockResponse = response
            .json()
            .await
            .map_err(|e| OrderServiceError::WarehouseUnavailable(e.to_string()))?;

        Ok(Some(StockLevel {
            product_id: body.product_id,
            product_name: body.product_name,
            quantity: body.quantity,
            reserved: body.reserved,
            available: body.available,
        }))
    }
}
