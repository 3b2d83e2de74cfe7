//! SQLite backend.
//!
//! Used for local development and as the engine behind the test suites.

use std::str::FromStr;

use futures::TryStreamExt;
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Either, Executor, Row as _, TypeInfo, ValueRef};
use tracing::{debug, info};

use super::{insert_sql, rollback, BoxFuture, Database};
use crate::dialect::{Dialect, DialectMode, SqliteDialect};
use crate::error::Result;
use crate::query::{InsertOutput, LogicalQuery, QueryOutput, WriteMeta};
use crate::row::Row;
use crate::value::SqlValue;

/// SQLite-backed [`Database`].
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl std::fmt::Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDatabase").finish_non_exhaustive()
    }
}

impl SqliteDatabase {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a private in-memory database.
    ///
    /// The pool holds a single connection that is never recycled, since each
    /// in-memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the connection cannot be opened.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Database for SqliteDatabase {
    fn dialect(&self) -> DialectMode {
        DialectMode::Sqlite
    }

    fn query<'a>(&'a self, query: &'a LogicalQuery) -> BoxFuture<'a, Result<QueryOutput>> {
        Box::pin(async move { Ok(run(&self.pool, &query.sql, &query.params).await?) })
    }

    fn insert<'a>(&'a self, query: &'a LogicalQuery) -> BoxFuture<'a, Result<InsertOutput>> {
        Box::pin(async move {
            let sql = insert_sql(&SqliteDialect, &query.sql);
            let out = run(&self.pool, &sql, &query.params).await?;
            let meta = out.meta.unwrap_or_default();
            Ok(InsertOutput {
                insert_id: meta.insert_id,
                affected_rows: meta.affected_rows,
                rows: Vec::new(),
            })
        })
    }

    fn transaction<'a>(
        &'a self,
        batch: &'a [LogicalQuery],
    ) -> BoxFuture<'a, Result<Vec<QueryOutput>>> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await?;
            let mut results = Vec::with_capacity(batch.len());

            for (index, statement) in batch.iter().enumerate() {
                match run(&mut *tx, &statement.sql, &statement.params).await {
                    Ok(out) => results.push(out),
                    Err(err) => {
                        rollback(tx, index, &err).await;
                        return Err(err.into());
                    }
                }
            }

            tx.commit().await?;
            Ok(results)
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let conn = self.pool.acquire().await?;
            drop(conn);
            info!(dialect = SqliteDialect.name(), "Database connected successfully");
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move { self.pool.close().await })
    }
}

fn is_insert(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("insert"))
}

async fn run<'c, E>(
    executor: E,
    sql: &str,
    params: &[SqlValue],
) -> std::result::Result<QueryOutput, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    debug!(
        dialect = SqliteDialect.name(),
        sql = %sql,
        params = params.len(),
        "Executing statement"
    );

    let mut query = sqlx::query(sql);
    for value in params {
        query = bind_value(query, value);
    }

    // last_insert_rowid is connection-scoped and survives across statements,
    // so it is only meaningful right after an INSERT that wrote a row.
    let inserting = is_insert(sql);
    let mut rows = Vec::new();
    let mut meta = WriteMeta::default();
    let mut stream = executor.fetch_many(query);
    while let Some(item) = stream.try_next().await? {
        match item {
            Either::Left(done) => {
                meta.affected_rows += done.rows_affected();
                if inserting && done.rows_affected() > 0 {
                    meta.insert_id = Some(done.last_insert_rowid());
                }
            }
            Either::Right(row) => rows.push(decode_row(&row)?),
        }
    }

    Ok(QueryOutput {
        rows,
        meta: Some(meta),
    })
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<String>::None),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.as_str()),
        SqlValue::DateTime(dt) => query.bind(*dt),
        SqlValue::Json(v) => query.bind(sqlx::types::Json(v)),
    }
}

/// Decodes by the storage class of each value, since SQLite columns are
/// dynamically typed.
fn decode_row(row: &SqliteRow) -> std::result::Result<Row, sqlx::Error> {
    let mut out = Row::with_capacity(row.columns().len());

    for column in row.columns() {
        let idx = column.ordinal();
        let raw = row.try_get_raw(idx)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            let storage = raw.type_info();
            match storage.name() {
                "INTEGER" => SqlValue::Int(row.try_get_unchecked(idx)?),
                "REAL" => SqlValue::Float(row.try_get_unchecked(idx)?),
                "BLOB" => {
                    let bytes: Vec<u8> = row.try_get_unchecked(idx)?;
                    SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())
                }
                _ => SqlValue::Text(row.try_get_unchecked(idx)?),
            }
        };
        out.push(column.name(), value);
    }

    Ok(out)
}
