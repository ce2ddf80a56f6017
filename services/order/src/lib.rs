pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod handlers;
pub mod infra;
pub mod relay;
pub mod router;
pub mod state;
pub mod usecase;

pub const SERVICE_NAME: &str = "order-service";
