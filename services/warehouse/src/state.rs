use orderflow_messaging::topology::INVENTORY_EXCHANGE;
use orderflow_relay::pg::{DbInboxRepository, DbOutboxRepository};
use sea_orm::DatabaseConnection;

use crate::infra::db::DbInventoryRepository;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn inventory_repo(&self) -> DbInventoryRepository {
        DbInventoryRepository {
            db: self.db.clone(),
            outbox: self.outbox_repo(),
        }
    }

    pub fn outbox_repo(&self) -> DbOutboxRepository {
        DbOutboxRepository::new(self.db.clone(), INVENTORY_EXCHANGE)
    }

    pub fn inbox_repo(&self) -> DbInboxRepository {
        DbInboxRepository::new(self.db.clone())
    }
}
