// src/repositories/mod.rs

pub mod catalog;
pub mod responses;
pub mod users;

pub use catalog::{CatalogRepository, PgCatalogRepository};
pub use responses::{PgResponseRepository, ResponseRepository};
pub use users::{PgUserRepository, UserRepository};

/// True when a database error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
