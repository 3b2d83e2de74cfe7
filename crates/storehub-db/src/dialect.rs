//! SQL dialect selection.
//!
//! Exactly one [`DialectMode`] is active per process. It is read once from the
//! `DATABASE_MODE` environment variable and cached for the lifetime of the
//! process; see [`active_dialect`].

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use tracing::warn;

use crate::error::DbError;

/// Environment variable selecting the active engine.
pub const DATABASE_MODE_ENV: &str = "DATABASE_MODE";

/// The SQL engines the access layer can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DialectMode {
    /// MySQL: `?` placeholders, auto-increment ids reported by the driver.
    MySql,
    /// PostgreSQL: `$1..$n` placeholders, ids retrieved with `RETURNING id`.
    #[default]
    Postgres,
    /// SQLite: `?` placeholders, ids from `last_insert_rowid()`.
    Sqlite,
}

impl DialectMode {
    /// Resolves a mode from an optional configuration value.
    ///
    /// Unset means [`DialectMode::Postgres`]. Unrecognized values are logged
    /// and also fall back to the default.
    #[must_use]
    pub fn resolve(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Self::default(),
            Some(raw) => raw.parse().unwrap_or_else(|err: DbError| {
                warn!(value = %raw, error = %err, "Unrecognized database mode, using default");
                Self::default()
            }),
        }
    }

    /// Returns the canonical configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgresql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Returns the dialect description for this mode.
    #[must_use]
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Self::MySql => &MySqlDialect,
            Self::Postgres => &PostgresDialect,
            Self::Sqlite => &SqliteDialect,
        }
    }

    /// Returns the `SET` fragment that refreshes `updated_at` on update.
    ///
    /// MySQL tables declare `ON UPDATE CURRENT_TIMESTAMP`, so nothing is
    /// needed there. The fragment starts with a comma so it can be appended
    /// to an existing assignment list.
    #[must_use]
    pub const fn updated_at_assignment(self) -> &'static str {
        match self {
            Self::MySql => "",
            Self::Postgres | Self::Sqlite => ", updated_at = CURRENT_TIMESTAMP",
        }
    }
}

impl fmt::Display for DialectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectMode {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Self::Postgres),
            "mysql" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(DbError::InvalidDialect(other.to_string())),
        }
    }
}

/// Returns the process-wide active dialect.
///
/// The value is read from `DATABASE_MODE` on first call and never changes
/// afterwards.
#[must_use]
pub fn active_dialect() -> DialectMode {
    static ACTIVE: OnceLock<DialectMode> = OnceLock::new();
    *ACTIVE.get_or_init(|| {
        DialectMode::resolve(std::env::var(DATABASE_MODE_ENV).ok().as_deref())
    })
}

/// Dialect-specific SQL surface.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Returns whether generated ids must be read through `RETURNING`.
    fn supports_returning(&self) -> bool {
        false
    }
}

/// MySQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }
}

/// PostgreSQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn supports_returning(&self) -> bool {
        true
    }
}

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_to_postgres() {
        assert_eq!(DialectMode::resolve(None), DialectMode::Postgres);
        assert_eq!(DialectMode::resolve(Some("")), DialectMode::Postgres);
        assert_eq!(DialectMode::resolve(Some("  ")), DialectMode::Postgres);
    }

    #[test]
    fn test_resolve_known_values() {
        assert_eq!(DialectMode::resolve(Some("mysql")), DialectMode::MySql);
        assert_eq!(DialectMode::resolve(Some("PostgreSQL")), DialectMode::Postgres);
        assert_eq!(DialectMode::resolve(Some("pg")), DialectMode::Postgres);
        assert_eq!(DialectMode::resolve(Some("sqlite")), DialectMode::Sqlite);
    }

    #[test]
    fn test_resolve_unknown_falls_back() {
        assert_eq!(DialectMode::resolve(Some("oracle")), DialectMode::Postgres);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "mssql".parse::<DialectMode>().unwrap_err();
        assert!(matches!(err, DbError::InvalidDialect(ref s) if s == "mssql"));
    }

    #[test]
    fn test_active_dialect_is_stable() {
        assert_eq!(active_dialect(), active_dialect());
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(DialectMode::MySql.dialect().placeholder(3), "?");
        assert_eq!(DialectMode::Postgres.dialect().placeholder(3), "$3");
        assert!(DialectMode::Postgres.dialect().supports_returning());
        assert!(!DialectMode::MySql.dialect().supports_returning());
        assert!(!DialectMode::Sqlite.dialect().supports_returning());
        assert_eq!(DialectMode::Sqlite.dialect().name(), DialectMode::Sqlite.as_str());
    }

    #[test]
    fn test_updated_at_assignment() {
        assert_eq!(DialectMode::MySql.updated_at_assignment(), "");
        assert!(DialectMode::Postgres
            .updated_at_assignment()
            .contains("updated_at = CURRENT_TIMESTAMP"));
    }
}
