//! Error types for the access layer.

use thiserror::Error;

use crate::dialect::DialectMode;

/// Errors surfaced by the access layer.
///
/// Driver failures are carried unchanged in [`DbError::Database`]; the layer
/// never classifies or retries them.
#[derive(Debug, Error)]
pub enum DbError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No connection pool was configured for the active engine.
    #[error("database connection not configured")]
    NotConfigured,

    /// A dialect override does not match the engine the handle is bound to.
    #[error("dialect mismatch: requested {requested}, handle is bound to {active}")]
    DialectMismatch {
        /// Dialect requested by the caller.
        requested: DialectMode,
        /// Dialect of the database handle.
        active: DialectMode,
    },

    /// Unknown dialect name.
    #[error("invalid database mode: {0}")]
    InvalidDialect(String),

    /// The number of bound parameters differs from the placeholders in the SQL.
    #[error("statement has {placeholders} placeholders but {params} parameters were bound")]
    ParamCount {
        /// Placeholders found in the SQL text.
        placeholders: usize,
        /// Parameters supplied with the statement.
        params: usize,
    },

    /// Malformed connection settings.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Returns the underlying driver error, if any.
    #[must_use]
    pub fn as_driver(&self) -> Option<&sqlx::Error> {
        match self {
            Self::Database(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for access layer operations.
pub type Result<T> = std::result::Result<T, DbError>;
