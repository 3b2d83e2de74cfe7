//! Entry points used by route handlers.
//!
//! Each function takes the injected [`Database`] handle and an optional
//! dialect override. Failures are logged before being returned unchanged.

use tracing::{debug, error};

use crate::backend::Database;
use crate::dialect::DialectMode;
use crate::error::{DbError, Result};
use crate::query::{InsertOutput, LogicalQuery, QueryOutput};

/// Checks an explicit dialect override against the handle's engine.
fn check_dialect<D: Database + ?Sized>(db: &D, requested: Option<DialectMode>) -> Result<()> {
    match requested {
        Some(requested) if requested != db.dialect() => Err(DbError::DialectMismatch {
            requested,
            active: db.dialect(),
        }),
        _ => Ok(()),
    }
}

/// Checks that `query` binds one parameter per placeholder.
fn check_params<D: Database + ?Sized>(db: &D, query: &LogicalQuery) -> Result<()> {
    let placeholders = db.placeholder_mode().count(&query.sql);
    if placeholders == query.params.len() {
        return Ok(());
    }
    let err = DbError::ParamCount {
        placeholders,
        params: query.params.len(),
    };
    error!(sql = %query.sql, error = %err, "Parameter count mismatch");
    Err(err)
}

/// Executes one statement and returns its rows plus write metadata.
///
/// Metadata is `None` on PostgreSQL.
///
/// # Errors
///
/// Fails with [`DbError::DialectMismatch`] or [`DbError::ParamCount`] before
/// anything runs, or with the driver error.
pub async fn execute_query<D: Database + ?Sized>(
    db: &D,
    query: &LogicalQuery,
    dialect: Option<DialectMode>,
) -> Result<QueryOutput> {
    check_dialect(db, dialect)?;
    check_params(db, query)?;
    db.query(query).await.inspect_err(|err| {
        error!(sql = %query.sql, error = %err, "Database query error");
    })
}

/// Executes a single-row INSERT and returns the generated identity.
///
/// The SQL must not carry its own `RETURNING` clause.
///
/// # Errors
///
/// Same as [`execute_query`].
pub async fn execute_insert<D: Database + ?Sized>(
    db: &D,
    query: &LogicalQuery,
    dialect: Option<DialectMode>,
) -> Result<InsertOutput> {
    check_dialect(db, dialect)?;
    check_params(db, query)?;
    let out = db.insert(query).await.inspect_err(|err| {
        error!(sql = %query.sql, error = %err, "Database insert error");
    })?;
    debug!(insert_id = ?out.insert_id, "Row inserted");
    Ok(out)
}

/// Executes `batch` atomically, returning one result per statement in order.
///
/// Every statement's parameter count is checked before the transaction
/// begins. On failure the transaction is rolled back and the statement's
/// original error is returned.
///
/// # Errors
///
/// Same as [`execute_query`], for the first statement that fails.
pub async fn execute_transaction<D: Database + ?Sized>(
    db: &D,
    batch: &[LogicalQuery],
    dialect: Option<DialectMode>,
) -> Result<Vec<QueryOutput>> {
    check_dialect(db, dialect)?;
    for statement in batch {
        check_params(db, statement)?;
    }
    let results = db.transaction(batch).await.inspect_err(|err| {
        error!(statements = batch.len(), error = %err, "Transaction failed");
    })?;
    debug!(statements = batch.len(), "Transaction committed");
    Ok(results)
}
