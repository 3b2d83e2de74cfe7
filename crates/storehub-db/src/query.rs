//! Logical queries and normalized results.

use serde::Serialize;

use crate::row::Row;
use crate::value::{SqlValue, ToSqlValue};

/// A query template in `?` placeholder style with its positional parameters.
///
/// The parameter count must match the placeholder count; the engine reports
/// a mismatch as a driver error.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalQuery {
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Parameters in placeholder order.
    pub params: Vec<SqlValue>,
}

impl LogicalQuery {
    /// Creates a query with no parameters.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn bind(mut self, value: impl ToSqlValue) -> Self {
        self.params.push(value.to_sql_value());
        self
    }

    /// Replaces the parameter list.
    #[must_use]
    pub fn with_params(mut self, params: Vec<SqlValue>) -> Self {
        self.params = params;
        self
    }
}

/// Write metadata reported by engines that expose it natively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteMeta {
    /// Rows changed by the statement.
    pub affected_rows: u64,
    /// Auto-increment value generated by the statement, if any.
    pub insert_id: Option<i64>,
}

/// Result of [`execute_query`](crate::execute_query).
///
/// `meta` is `None` on PostgreSQL.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOutput {
    /// Rows in the order the engine returned them.
    pub rows: Vec<Row>,
    /// Engine write metadata.
    pub meta: Option<WriteMeta>,
}

impl QueryOutput {
    /// Returns the first row, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Consumes the output, returning the rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Rows affected, when the engine reports it.
    #[must_use]
    pub fn affected_rows(&self) -> Option<u64> {
        self.meta.map(|m| m.affected_rows)
    }
}

/// Result of [`execute_insert`](crate::execute_insert).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutput {
    /// Identity assigned to the new row.
    pub insert_id: Option<i64>,
    /// Rows affected by the insert.
    pub affected_rows: u64,
    /// Rows returned by `RETURNING` (PostgreSQL only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Row>,
}
