//! Engine backends.
//!
//! Callers depend on the [`Database`] trait and never on a concrete engine.
//! Each backend wraps one sqlx pool and owns the conventions of its engine:
//! placeholder style, how generated ids are read back, and transaction
//! vocabulary. Adding an engine means adding one implementation here.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlDatabase;
pub use postgres::{returning_id_sql, PostgresDatabase};
pub use sqlite::SqliteDatabase;

use std::borrow::Cow;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::dialect::{Dialect, DialectMode};
use crate::error::Result;
use crate::placeholder::PlaceholderMode;
use crate::query::{InsertOutput, LogicalQuery, QueryOutput};
use crate::value::SqlValue;

/// A boxed future for the object-safe [`Database`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The capability set every engine provides.
///
/// Implementations take SQL in `?` placeholder style and perform any
/// translation their engine needs. Errors are returned unchanged from the
/// driver; logging happens in the [`executor`](crate::executor) functions.
///
/// # Example
///
/// ```ignore
/// let db: Arc<dyn Database> = config.connect()?;
/// let out = db.query(&LogicalQuery::new("SELECT id FROM stores")).await?;
/// ```
pub trait Database: Debug + Send + Sync {
    /// Returns the engine this handle is bound to.
    fn dialect(&self) -> DialectMode;

    /// Returns how `?` placeholders are located in this engine's SQL.
    ///
    /// MySQL and SQLite parse the SQL themselves, so a `?` inside a literal is
    /// never a parameter there.
    fn placeholder_mode(&self) -> PlaceholderMode {
        PlaceholderMode::SkipLiterals
    }

    /// Executes one statement on a pooled connection.
    fn query<'a>(&'a self, query: &'a LogicalQuery) -> BoxFuture<'a, Result<QueryOutput>>;

    /// Executes a single-row INSERT and reports the generated identity.
    fn insert<'a>(&'a self, query: &'a LogicalQuery) -> BoxFuture<'a, Result<InsertOutput>>;

    /// Executes `batch` in order on one dedicated connection inside a
    /// transaction. Either every statement is committed or none is.
    fn transaction<'a>(
        &'a self,
        batch: &'a [LogicalQuery],
    ) -> BoxFuture<'a, Result<Vec<QueryOutput>>>;

    /// Checks out and returns one connection.
    fn ping(&self) -> BoxFuture<'_, Result<()>>;

    /// Closes the pool.
    fn close(&self) -> BoxFuture<'_, ()>;
}

/// Returns the SQL to run for a single-row INSERT on `dialect`.
///
/// Dialects that read generated ids through `RETURNING` get the clause
/// appended; the others run the statement as written.
fn insert_sql<'a>(dialect: &dyn Dialect, sql: &'a str) -> Cow<'a, str> {
    if dialect.supports_returning() {
        Cow::Owned(returning_id_sql(sql))
    } else {
        Cow::Borrowed(sql)
    }
}

/// Rolls back a failed batch.
///
/// A rollback failure is logged on its own; the caller still returns the
/// statement error that triggered it.
async fn rollback<DB: sqlx::Database>(
    tx: sqlx::Transaction<'_, DB>,
    failed_at: usize,
    cause: &sqlx::Error,
) {
    match tx.rollback().await {
        Ok(()) => debug!(statement = failed_at, cause = %cause, "Transaction rolled back"),
        Err(err) => warn!(
            statement = failed_at,
            cause = %cause,
            error = %err,
            "Transaction rollback failed"
        ),
    }
}

/// NUMERIC/DECIMAL values are normalized to floats.
fn decimal_value(value: Decimal) -> SqlValue {
    value
        .to_f64()
        .map_or_else(|| SqlValue::Text(value.to_string()), SqlValue::Float)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_insert_sql_per_dialect() {
        let sql = "INSERT INTO stores (name) VALUES (?)";
        for mode in [DialectMode::MySql, DialectMode::Sqlite] {
            assert_eq!(insert_sql(mode.dialect(), sql), sql);
        }
        assert_eq!(
            insert_sql(DialectMode::Postgres.dialect(), sql),
            "INSERT INTO stores (name) VALUES (?) RETURNING id"
        );
    }

    #[test]
    fn test_decimal_value() {
        let price = Decimal::from_str("85.50").unwrap();
        assert_eq!(decimal_value(price), SqlValue::Float(85.5));
    }
}
