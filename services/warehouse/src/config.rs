/// Warehouse service configuration loaded from environment variables.
#[derive(Debug)]
pub struct WarehouseConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// RabbitMQ connection URL. Required when `enable_broker` is set.
    pub rabbitmq_url: Option<String>,
    /// Start the broker connection and the relay worker pools. Env var:
    /// `ENABLE_BROKER` ("true"/"1").
    pub enable_broker: bool,
    /// Inbox retry budget (default 3). Env var: `MAX_RETRIES`.
    pub max_retries: i32,
    /// TCP port to listen on (default 3002). Env var: `WAREHOUSE_PORT`.
    pub warehouse_port: u16,
}

impl WarehouseConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            rabbitmq_url: std::env::var("RABBITMQ_URL").ok(),
            enable_broker: std::env::var("ENABLE_BROKER")
                .map(|v| matches!(v.as_str(), "true" | "1"))
                .unwrap_or(false),
            max_retries: std::env::var("MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            warehouse_port: std::env::var("WAREHOUSE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3002),
        }
    }
}
