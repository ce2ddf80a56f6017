/// Failures surfaced by the relay stores and workers.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("invalid status value: {0}")]
    InvalidStatus(String),
}
