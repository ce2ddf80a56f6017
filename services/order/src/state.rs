use orderflow_messaging::topology::ORDERS_EXCHANGE;
use orderflow_relay::pg::{DbInboxRepository, DbOutboxRepository};
use sea_orm::DatabaseConnection;

use crate::infra::db::DbOrderRepository;
use crate::infra::warehouse::HttpWarehouseClient;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub warehouse: HttpWarehouseClient,
}

impl AppState {
    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
            outbox: self.outbox_repo(),
        }
    }

    pub fn outbox_repo(&self) -> DbOutboxRepository {
        DbOutboxRepository::new(self.db.clone(), ORDERS_EXCHANGE)
    }

    pub fn inbox_repo(&self) -> DbInboxRepository {
        DbInboxRepository::new(self.db.clone())
    }
}
