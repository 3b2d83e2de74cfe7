//! Dual-dialect database access layer for the storehub dashboard.
//!
//! Route handlers write SQL once, with positional `?` placeholders, and run it
//! against whichever engine the process is configured for:
//!
//! - **MySQL** runs the SQL as written and reports generated ids through the
//!   driver's `last_insert_id`.
//! - **PostgreSQL** gets `?` rewritten to `$1..$n`, and inserts gain a
//!   `RETURNING id` clause.
//! - **SQLite** runs the SQL as written; it backs local development and tests.
//!
//! Every engine returns the same normalized shape: a list of [`Row`]s plus
//! optional [`WriteMeta`].
//!
//! # Example
//!
//! ```rust,ignore
//! use storehub_db::prelude::*;
//!
//! let db = DatabaseConfig::new(active_dialect())
//!     .url(std::env::var("DATABASE_URL")?)
//!     .connect()?;
//!
//! let created = execute_insert(
//!     db.as_ref(),
//!     &LogicalQuery::new("INSERT INTO menu_items (name, price, store_id) VALUES (?, ?, ?)")
//!         .with_params(params!["Pancit", 85.5, 1]),
//!     None,
//! )
//! .await?;
//!
//! let items = execute_query(
//!     db.as_ref(),
//!     &LogicalQuery::new("SELECT * FROM menu_items WHERE id = ?").bind(created.insert_id),
//!     None,
//! )
//! .await?;
//! ```

pub mod backend;
pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod placeholder;
pub mod query;
pub mod row;
pub mod value;

pub use backend::{
    returning_id_sql, BoxFuture, Database, MySqlDatabase, PostgresDatabase, SqliteDatabase,
};
pub use config::{DatabaseConfig, MySqlSettings};
pub use dialect::{active_dialect, Dialect, DialectMode, DATABASE_MODE_ENV};
pub use error::{DbError, Result};
pub use executor::{execute_insert, execute_query, execute_transaction};
pub use placeholder::{to_numbered_placeholders, PlaceholderMode};
pub use query::{InsertOutput, LogicalQuery, QueryOutput, WriteMeta};
pub use row::Row;
pub use value::{SqlValue, ToSqlValue};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::params;
    pub use crate::{
        active_dialect, execute_insert, execute_query, execute_transaction, Database,
        DatabaseConfig, DbError, DialectMode, InsertOutput, LogicalQuery, QueryOutput, Row,
        SqlValue, ToSqlValue,
    };
}

/// Builds a parameter list from values implementing [`ToSqlValue`].
///
/// ```
/// use storehub_db::{params, SqlValue};
///
/// let params = params!["Pancit", 85.5, None::<String>];
/// assert_eq!(params[2], SqlValue::Null);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::SqlValue>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::ToSqlValue::to_sql_value($value)),+]
    };
}
