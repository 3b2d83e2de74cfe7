//! MySQL backend.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::TryStreamExt;
use rust_decimal::Decimal;
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Either, Executor, Row as _, TypeInfo, ValueRef};
use tracing::{debug, info, warn};

use super::{decimal_value, insert_sql, rollback, BoxFuture, Database};
use crate::dialect::{Dialect, DialectMode, MySqlDialect};
use crate::error::Result;
use crate::query::{InsertOutput, LogicalQuery, QueryOutput, WriteMeta};
use crate::row::Row;
use crate::value::SqlValue;

/// MySQL-backed [`Database`].
///
/// SQL runs untranslated; generated ids come from the driver's
/// `last_insert_id`.
#[derive(Clone)]
pub struct MySqlDatabase {
    pool: MySqlPool,
}

impl std::fmt::Debug for MySqlDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlDatabase").finish_non_exhaustive()
    }
}

impl MySqlDatabase {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

impl Database for MySqlDatabase {
    fn dialect(&self) -> DialectMode {
        DialectMode::MySql
    }

    fn query<'a>(&'a self, query: &'a LogicalQuery) -> BoxFuture<'a, Result<QueryOutput>> {
        Box::pin(async move { Ok(run(&self.pool, &query.sql, &query.params).await?) })
    }

    fn insert<'a>(&'a self, query: &'a LogicalQuery) -> BoxFuture<'a, Result<InsertOutput>> {
        Box::pin(async move {
            let sql = insert_sql(&MySqlDialect, &query.sql);
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
            // The transaction owns one connection until commit, rollback or drop.
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
            info!(dialect = MySqlDialect.name(), "Database connected successfully");
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move { self.pool.close().await })
    }
}

/// Runs one statement, collecting rows and the driver's write summary.
async fn run<'c, E>(
    executor: E,
    sql: &str,
    params: &[SqlValue],
) -> std::result::Result<QueryOutput, sqlx::Error>
where
    E: Executor<'c, Database = MySql>,
{
    debug!(
        dialect = MySqlDialect.name(),
        sql = %sql,
        params = params.len(),
        "Executing statement"
    );

    let mut query = sqlx::query(sql);
    for value in params {
        query = bind_value(query, value);
    }

    let mut rows = Vec::new();
    let mut meta = WriteMeta::default();
    let mut stream = executor.fetch_many(query);
    while let Some(item) = stream.try_next().await? {
        match item {
            Either::Left(done) => {
                meta.affected_rows += done.rows_affected();
                if done.last_insert_id() != 0 {
                    meta.insert_id = i64::try_from(done.last_insert_id()).ok();
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

/// Binds a SqlValue parameter to a query.
fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &'q SqlValue,
) -> Query<'q, MySql, MySqlArguments> {
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

fn decode_row(row: &MySqlRow) -> std::result::Result<Row, sqlx::Error> {
    let mut out = Row::with_capacity(row.columns().len());

    for column in row.columns() {
        let idx = column.ordinal();
        let value = if row.try_get_raw(idx)?.is_null() {
            SqlValue::Null
        } else {
            match column.type_info().name() {
                "BOOLEAN" => SqlValue::Bool(row.try_get(idx)?),
                "TINYINT" => SqlValue::Int(i64::from(row.try_get::<i8, _>(idx)?)),
                "SMALLINT" => SqlValue::Int(i64::from(row.try_get::<i16, _>(idx)?)),
                "INT" | "MEDIUMINT" => {
                    SqlValue::Int(i64::from(row.try_get::<i32, _>(idx)?))
                }
                "BIGINT" => SqlValue::Int(row.try_get(idx)?),
                "TINYINT UNSIGNED" => SqlValue::Int(i64::from(row.try_get::<u8, _>(idx)?)),
                "SMALLINT UNSIGNED" => SqlValue::Int(i64::from(row.try_get::<u16, _>(idx)?)),
                "INT UNSIGNED" | "MEDIUMINT UNSIGNED" => {
                    SqlValue::Int(i64::from(row.try_get::<u32, _>(idx)?))
                }
                "BIGINT UNSIGNED" => {
                    let v: u64 = row.try_get(idx)?;
                    i64::try_from(v)
                        .map_or_else(|_| SqlValue::Text(v.to_string()), SqlValue::Int)
                }
                "FLOAT" => SqlValue::Float(f64::from(row.try_get::<f32, _>(idx)?)),
                "DOUBLE" => SqlValue::Float(row.try_get(idx)?),
                "DECIMAL" => decimal_value(row.try_get::<Decimal, _>(idx)?),
                "TIMESTAMP" => SqlValue::DateTime(row.try_get::<DateTime<Utc>, _>(idx)?),
                "DATETIME" => {
                    SqlValue::DateTime(row.try_get::<NaiveDateTime, _>(idx)?.and_utc())
                }
                "DATE" => SqlValue::Text(row.try_get::<NaiveDate, _>(idx)?.to_string()),
                "JSON" => SqlValue::Json(row.try_get::<serde_json::Value, _>(idx)?),
                other => match row.try_get::<String, _>(idx) {
                    Ok(text) => SqlValue::Text(text),
                    Err(err) => {
                        warn!(
                            column = column.name(),
                            column_type = other,
                            error = %err,
                            "Unsupported column type, returning null"
                        );
                        SqlValue::Null
                    }
                },
            }
        };
        out.push(column.name(), value);
    }

    Ok(out)
}
