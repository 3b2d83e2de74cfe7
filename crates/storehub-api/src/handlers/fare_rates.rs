//! `/api/fare-rates/{id}` handlers.

use serde_json::json;
use storehub_db::{execute_query, Database, LogicalQuery, Row, SqlValue};

use super::{path_id, respond, Payload};
use crate::error::{ApiError, Result};
use crate::http::{Request, Response};
use crate::state::AppState;

const DETAIL_SQL: &str = "SELECT id, base_fare, rate_per_km, other_charges, created_at, \
     updated_at FROM fare_rates WHERE id = ?";

const NOT_FOUND: &str = "Fare rate not found";

/// `GET /api/fare-rates/{id}`
pub async fn get(req: Request, state: AppState) -> Response {
    respond(get_rate(&req, &state).await)
}

/// `PUT /api/fare-rates/{id}`
pub async fn update(req: Request, state: AppState) -> Response {
    respond(update_rate(&req, &state).await)
}

async fn find_rate(db: &dyn Database, id: i64) -> Result<Option<Row>> {
    let out = execute_query(db, &LogicalQuery::new(DETAIL_SQL).bind(id), None).await?;
    Ok(out.rows.into_iter().next())
}

async fn get_rate(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let id = path_id(req, NOT_FOUND)?;
    let rate = find_rate(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    Ok(Response::json(&json!({ "fareRate": rate })))
}

async fn update_rate(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let id = path_id(req, NOT_FOUND)?;
    let payload = Payload::from_request(req)?;

    if !payload.all_defined(&["base_fare", "rate_per_km", "other_charges"]) {
        return Err(ApiError::BadRequest(
            "All fields are required: base_fare, rate_per_km, other_charges".to_string(),
        ));
    }
    let params = vec![
        payload.numeric_param("base_fare")?,
        payload.numeric_param("rate_per_km")?,
        payload.numeric_param("other_charges")?,
        SqlValue::Int(id),
    ];

    let existing = execute_query(
        db,
        &LogicalQuery::new("SELECT id FROM fare_rates WHERE id = ?").bind(id),
        None,
    )
    .await?;
    if existing.rows.is_empty() {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }

    let sql = format!(
        "UPDATE fare_rates SET base_fare = ?, rate_per_km = ?, other_charges = ?{} WHERE id = ?",
        db.dialect().updated_at_assignment()
    );
    execute_query(db, &LogicalQuery::new(sql).with_params(params), None).await?;

    let rate = find_rate(db, id).await?;
    Ok(Response::json(&json!({
        "message": "Fare rate updated successfully",
        "fareRate": rate,
    })))
}
