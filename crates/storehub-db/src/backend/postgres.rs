//! PostgreSQL backend.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgArgumentBuffer, PgArguments, PgPool, PgRow, PgTypeInfo, Postgres};
use sqlx::query::Query;
use sqlx::{Column, Encode, Executor, Row as _, Type, TypeInfo, ValueRef};
use tracing::{debug, info, warn};

use super::{decimal_value, insert_sql, rollback, BoxFuture, Database};
use crate::dialect::{Dialect, DialectMode, PostgresDialect};
use crate::error::Result;
use crate::placeholder::PlaceholderMode;
use crate::query::{InsertOutput, LogicalQuery, QueryOutput};
use crate::row::Row;
use crate::value::SqlValue;

/// PostgreSQL-backed [`Database`].
///
/// `?` placeholders are rewritten to `$n` before execution. Results carry no
/// write metadata; generated ids are read through `RETURNING id`.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    placeholders: PlaceholderMode,
}

impl std::fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("placeholders", &self.placeholders)
            .finish_non_exhaustive()
    }
}

impl PostgresDatabase {
    /// Wraps an existing pool using naive placeholder translation.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            placeholders: PlaceholderMode::Naive,
        }
    }

    /// Selects how `?` placeholders are located.
    #[must_use]
    pub fn with_placeholder_mode(mut self, mode: PlaceholderMode) -> Self {
        self.placeholders = mode;
        self
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Appends `RETURNING id` to an INSERT statement.
///
/// The statement must not already carry a `RETURNING` clause.
///
/// ```
/// use storehub_db::returning_id_sql;
///
/// assert_eq!(
///     returning_id_sql("INSERT INTO t (name) VALUES (?)"),
///     "INSERT INTO t (name) VALUES (?) RETURNING id"
/// );
/// ```
#[must_use]
pub fn returning_id_sql(sql: &str) -> String {
    let trimmed = sql.trim_end();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    format!("{trimmed} RETURNING id")
}

impl Database for PostgresDatabase {
    fn dialect(&self) -> DialectMode {
        DialectMode::Postgres
    }

    fn placeholder_mode(&self) -> PlaceholderMode {
        self.placeholders
    }

    fn query<'a>(&'a self, query: &'a LogicalQuery) -> BoxFuture<'a, Result<QueryOutput>> {
        Box::pin(async move {
            let sql = self.placeholders.rewrite(&query.sql, &PostgresDialect);
            let rows = run(&self.pool, &sql, &query.params).await?;
            Ok(QueryOutput { rows, meta: None })
        })
    }

    fn insert<'a>(&'a self, query: &'a LogicalQuery) -> BoxFuture<'a, Result<InsertOutput>> {
        Box::pin(async move {
            let sql = insert_sql(&PostgresDialect, &query.sql);
            let sql = self.placeholders.rewrite(&sql, &PostgresDialect);
            let rows = run(&self.pool, &sql, &query.params).await?;
            Ok(InsertOutput {
                insert_id: rows.first().and_then(|row| row.get_i64("id")),
                affected_rows: rows.len() as u64,
                rows,
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
                let sql = self.placeholders.rewrite(&statement.sql, &PostgresDialect);
                match run(&mut *tx, &sql, &statement.params).await {
                    Ok(rows) => results.push(QueryOutput { rows, meta: None }),
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
            info!(dialect = PostgresDialect.name(), "Database connected successfully");
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move { self.pool.close().await })
    }
}

/// Runs one already-translated statement.
async fn run<'c, E>(
    executor: E,
    sql: &str,
    params: &[SqlValue],
) -> std::result::Result<Vec<Row>, sqlx::Error>
where
    E: Executor<'c, Database = Postgres>,
{
    debug!(
        dialect = PostgresDialect.name(),
        sql = %sql,
        params = params.len(),
        "Executing statement"
    );

    let mut query = sqlx::query(sql);
    for value in params {
        query = bind_value(query, value);
    }

    let rows = query.fetch_all(executor).await?;
    rows.iter().map(decode_row).collect()
}

/// A NULL parameter sent with type OID 0.
///
/// The server infers the type from the placeholder's context, so the same
/// value fits text, integer, numeric and timestamp columns.
#[derive(Debug, Clone, Copy)]
struct UntypedNull;

impl Type<Postgres> for UntypedNull {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(0))
    }
}

impl Encode<'_, Postgres> for UntypedNull {
    fn encode_by_ref(
        &self,
        _buf: &mut PgArgumentBuffer,
    ) -> std::result::Result<IsNull, BoxDynError> {
        Ok(IsNull::Yes)
    }
}

/// Binds a SqlValue parameter to a query.
///
/// Text is sent typed as `TEXT`, so identifiers and other integers must be
/// bound as [`SqlValue::Int`].
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null => query.bind(UntypedNull),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.as_str()),
        SqlValue::DateTime(dt) => query.bind(*dt),
        SqlValue::Json(v) => query.bind(sqlx::types::Json(v)),
    }
}

fn decode_row(row: &PgRow) -> std::result::Result<Row, sqlx::Error> {
    let mut out = Row::with_capacity(row.columns().len());

    for column in row.columns() {
        let idx = column.ordinal();
        let value = if row.try_get_raw(idx)?.is_null() {
            SqlValue::Null
        } else {
            match column.type_info().name() {
                "BOOL" => SqlValue::Bool(row.try_get(idx)?),
                "INT2" => SqlValue::Int(i64::from(row.try_get::<i16, _>(idx)?)),
                "INT4" => SqlValue::Int(i64::from(row.try_get::<i32, _>(idx)?)),
                "INT8" => SqlValue::Int(row.try_get(idx)?),
                "FLOAT4" => SqlValue::Float(f64::from(row.try_get::<f32, _>(idx)?)),
                "FLOAT8" => SqlValue::Float(row.try_get(idx)?),
                "NUMERIC" => decimal_value(row.try_get::<Decimal, _>(idx)?),
                "TIMESTAMPTZ" => SqlValue::DateTime(row.try_get::<DateTime<Utc>, _>(idx)?),
                "TIMESTAMP" => {
                    SqlValue::DateTime(row.try_get::<NaiveDateTime, _>(idx)?.and_utc())
                }
                "DATE" => SqlValue::Text(row.try_get::<NaiveDate, _>(idx)?.to_string()),
                "JSON" | "JSONB" => {
                    SqlValue::Json(row.try_get::<serde_json::Value, _>(idx)?)
                }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::to_numbered_placeholders;

    #[test]
    fn test_returning_id_sql() {
        assert_eq!(
            returning_id_sql("INSERT INTO menu_items (name) VALUES (?);  "),
            "INSERT INTO menu_items (name) VALUES (?) RETURNING id"
        );
    }

    #[test]
    fn test_insert_translation() {
        let sql = insert_sql(&PostgresDialect, "INSERT INTO t (name, price) VALUES (?, ?)");
        let sql = to_numbered_placeholders(&sql);
        assert_eq!(sql, "INSERT INTO t (name, price) VALUES ($1, $2) RETURNING id");
    }

    #[test]
    fn test_null_parameter_is_untyped() {
        assert_eq!(<UntypedNull as Type<Postgres>>::type_info().oid(), Some(Oid(0)));
    }
}
