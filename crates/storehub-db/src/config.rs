//! Connection settings and engine construction.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::backend::{Database, MySqlDatabase, PostgresDatabase, SqliteDatabase};
use crate::dialect::DialectMode;
use crate::error::{DbError, Result};
use crate::placeholder::PlaceholderMode;

/// Default MySQL port.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Default pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// MySQL connection settings, taken from discrete `DB_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlSettings {
    /// Server host. The MySQL engine is unavailable without it.
    pub host: Option<String>,
    /// Server port.
    pub port: u16,
    /// User name.
    pub user: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Database name.
    pub database: Option<String>,
}

impl Default for MySqlSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_MYSQL_PORT,
            user: None,
            password: None,
            database: None,
        }
    }
}

/// Typed database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Active engine.
    pub mode: DialectMode,
    /// Connection URL for PostgreSQL or SQLite.
    pub url: Option<String>,
    /// MySQL settings.
    pub mysql: MySqlSettings,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// How long to wait for a pooled connection.
    pub acquire_timeout: Duration,
    /// TLS mode for PostgreSQL.
    pub pg_ssl_mode: PgSslMode,
    /// Placeholder scanning used by PostgreSQL.
    pub placeholders: PlaceholderMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            mode: DialectMode::default(),
            url: None,
            mysql: MySqlSettings::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(30),
            pg_ssl_mode: PgSslMode::Prefer,
            placeholders: PlaceholderMode::default(),
        }
    }
}

impl DatabaseConfig {
    /// Creates a configuration for `mode` with default pool settings.
    #[must_use]
    pub fn new(mode: DialectMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Sets the PostgreSQL or SQLite connection URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the MySQL settings.
    #[must_use]
    pub fn mysql(mut self, settings: MySqlSettings) -> Self {
        self.mysql = settings;
        self
    }

    /// Sets the pool size.
    #[must_use]
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Parses and sets the PostgreSQL TLS mode.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] for an unknown mode.
    pub fn pg_ssl_mode(mut self, mode: &str) -> Result<Self> {
        self.pg_ssl_mode = PgSslMode::from_str(mode)
            .map_err(|err| DbError::Config(format!("pg ssl mode {mode:?}: {err}")))?;
        Ok(self)
    }

    /// Builds the handle for the configured engine.
    ///
    /// Pools connect lazily, so unreachable servers surface as errors on first
    /// use. Returns [`DbError::NotConfigured`] when the settings the engine
    /// needs are missing. Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotConfigured`] for missing settings and
    /// [`DbError::Database`] for a malformed URL.
    pub fn connect(&self) -> Result<Arc<dyn Database>> {
        let db: Arc<dyn Database> = match self.mode {
            DialectMode::MySql => Arc::new(self.connect_mysql()?),
            DialectMode::Postgres => Arc::new(self.connect_postgres()?),
            DialectMode::Sqlite => Arc::new(self.connect_sqlite()?),
        };
        info!(
            mode = %self.mode,
            max_connections = self.max_connections,
            "Database pool created"
        );
        Ok(db)
    }

    fn required_url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(DbError::NotConfigured)
    }

    fn connect_mysql(&self) -> Result<MySqlDatabase> {
        let settings = &self.mysql;
        let host = settings.host.as_deref().ok_or(DbError::NotConfigured)?;

        let mut options = MySqlConnectOptions::new().host(host).port(settings.port);
        if let Some(user) = &settings.user {
            options = options.username(user);
        }
        if let Some(password) = &settings.password {
            options = options.password(password);
        }
        if let Some(database) = &settings.database {
            options = options.database(database);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect_lazy_with(options);
        Ok(MySqlDatabase::new(pool))
    }

    fn connect_postgres(&self) -> Result<PostgresDatabase> {
        let options =
            PgConnectOptions::from_str(self.required_url()?)?.ssl_mode(self.pg_ssl_mode);
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect_lazy_with(options);
        Ok(PostgresDatabase::new(pool).with_placeholder_mode(self.placeholders))
    }

    fn connect_sqlite(&self) -> Result<SqliteDatabase> {
        let url = self.required_url()?;
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if url.contains(":memory:") {
            // Every in-memory connection is a separate database.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_lazy_with(options)
        } else {
            SqlitePoolOptions::new()
                .max_connections(self.max_connections)
                .acquire_timeout(self.acquire_timeout)
                .connect_lazy_with(options)
        };
        Ok(SqliteDatabase::new(pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mysql_requires_host() {
        let result = DatabaseConfig::new(DialectMode::MySql).connect();
        assert!(matches!(result, Err(DbError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_postgres_requires_url() {
        let result = DatabaseConfig::new(DialectMode::Postgres).url("  ").connect();
        assert!(matches!(result, Err(DbError::NotConfigured)));

        let result = DatabaseConfig::new(DialectMode::Sqlite).connect();
        assert!(matches!(result, Err(DbError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_postgres_placeholder_mode_is_applied() {
        let mut config =
            DatabaseConfig::new(DialectMode::Postgres).url("postgres://db.invalid/app");
        config.placeholders = PlaceholderMode::SkipLiterals;
        let db = config.connect().unwrap();
        assert_eq!(db.dialect(), DialectMode::Postgres);
        assert_eq!(db.placeholder_mode(), PlaceholderMode::SkipLiterals);
    }

    #[tokio::test]
    async fn test_mysql_pool_is_lazy() {
        let settings = MySqlSettings {
            host: Some("db.invalid".to_string()),
            ..MySqlSettings::default()
        };
        let db = DatabaseConfig::new(DialectMode::MySql)
            .mysql(settings)
            .connect()
            .unwrap();
        assert_eq!(db.dialect(), DialectMode::MySql);
    }

    #[tokio::test]
    async fn test_sqlite_memory_url() {
        let db = DatabaseConfig::new(DialectMode::Sqlite)
            .url("sqlite::memory:")
            .connect()
            .unwrap();
        db.ping().await.unwrap();
        assert_eq!(db.dialect(), DialectMode::Sqlite);
    }

    #[test]
    fn test_pg_ssl_mode_parse() {
        let config = DatabaseConfig::default().pg_ssl_mode("require").unwrap();
        assert!(matches!(config.pg_ssl_mode, PgSslMode::Require));
        assert!(matches!(
            DatabaseConfig::default().pg_ssl_mode("sometimes"),
            Err(DbError::Config(_))
        ));
    }
}
