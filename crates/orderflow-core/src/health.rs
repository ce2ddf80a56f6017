use axum::Json;
use serde::Serialize;

/// Payload for `GET /healthz` and `GET /readyz`.
#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
}

/// Liveness/readiness payload carrying the service name.
pub fn health_status(service: &'static str) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "OK",
        service,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_status_names_the_service() {
        let Json(body) = health_status("order-service");
        assert_eq!(body.status, "OK");
        assert_eq!(body.service, "order-service");
    }
}
