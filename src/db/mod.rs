//! Almacenamiento SQLite (rusqlite).
//!
//! - `pool`: pool r2d2 de conexiones (busy_timeout y foreign_keys por conexión)
//! - `schema`: creación de tablas
//! - `catalog`: cursos, turmas y UCs
//! - `lessons`, `events`: agenda
//! - `dashboard`: agregados del panel

pub mod pool;
pub mod schema;
pub mod catalog;
pub mod lessons;
pub mod events;
pub mod dashboard;

pub use pool::{DbPool, PooledConn};
pub use schema::init_schema;

use chrono::NaiveDate;
use rusqlite::ErrorCode;

use crate::error::AppError;

/// Traduce violaciones de restricción (UNIQUE, FK) a `AppError::Conflict`.
pub(crate) fn map_constraint(e: rusqlite::Error, message: String) -> AppError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
            AppError::Conflict(message)
        }
        _ => AppError::Database(e),
    }
}

pub(crate) fn validate_iso_date(s: &str) -> Result<NaiveDate, AppError> {
    // las fechas se comparan como texto: exigir la forma con ceros
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .filter(|d| d.format("%Y-%m-%d").to_string() == s)
        .ok_or_else(|| AppError::Validation(format!("invalid date '{}': expected YYYY-MM-DD", s)))
}
