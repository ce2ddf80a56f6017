use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Order service error variants mapped to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum OrderServiceError {
    #[error("order not found")]
    NotFound,
    #[error("unknown product: {0}")]
    UnknownProduct(String),
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i32, available: i32 },
    #[error("warehouse unavailable: {0}")]
    WarehouseUnavailable(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl OrderServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::UnknownProduct(_) => "UNKNOWN_PRODUCT",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::WarehouseUnavailable(_) => "WAREHOUSE_UNAVAILABLE",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for OrderServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UnknownProduct(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InsufficientStock { .. } => StatusCode::CONFLICT,
            Self::WarehouseUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/
        // status for all requests, and 4xx are expected client errors.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_returns_409() {
        let err = OrderServiceError::InsufficientStock {
            requested: 5,
            available: 2,
        };
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn warehouse_unavailable_returns_503() {
        let err = OrderServiceError::WarehouseUnavailable("connection refused".to_owned());
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(
            OrderServiceError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_returns_500() {
        let err = OrderServiceError::Internal(anyhow::anyhow!("db down"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
