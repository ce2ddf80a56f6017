//! sea-orm entities for the relay tables. Both services own identically
//! shaped `outbox`/`inbox` tables in their own databases; the creating
//! migrations live in each service's migration crate.

pub mod inbox;
pub mod outbox;
