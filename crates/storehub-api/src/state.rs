//! Shared handler state.

use std::sync::Arc;

use storehub_db::{Database, DbError, DialectMode};

/// State handed to every route handler.
///
/// The database handle is optional: the server still starts when the active
/// engine is not configured, and each request then fails with
/// [`DbError::NotConfigured`].
#[derive(Clone, Default)]
pub struct AppState {
    db: Option<Arc<dyn Database>>,
}

impl AppState {
    /// Creates state around a configured database.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db: Some(db) }
    }

    /// Creates state without a database.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Returns the database handle.
    pub fn db(&self) -> Result<&dyn Database, DbError> {
        self.db.as_deref().ok_or(DbError::NotConfigured)
    }

    /// Returns the engine of the configured database, if any.
    #[must_use]
    pub fn dialect(&self) -> Option<DialectMode> {
        self.db.as_ref().map(|db| db.dialect())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("dialect", &self.dialect())
            .finish()
    }
}
