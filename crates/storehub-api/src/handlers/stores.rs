//! `/api/stores` handlers.

use serde_json::json;
use storehub_db::{execute_insert, execute_query, Database, LogicalQuery, Row, SqlValue};

use super::{path_id, respond, Payload};
use crate::error::{ApiError, Result};
use crate::http::{Request, Response};
use crate::state::AppState;

const LIST_SQL: &str = "SELECT id, name, category, email, phone_number, logo_url, location, \
     longitude, latitude, created_at, updated_at FROM stores ORDER BY name ASC";

const DETAIL_SQL: &str = "SELECT id, name, logo_url, location, category, latitude, longitude, \
     email, phone_number, created_at, updated_at FROM stores WHERE id = ?";

const REQUIRED: &str =
    "All fields are required: name, category, logo_url, location, longitude, latitude";

const NOT_FOUND: &str = "Store not found";

/// `GET /api/stores`
pub async fn list(_req: Request, state: AppState) -> Response {
    list_stores(&state)
        .await
        .unwrap_or_else(|err| err.to_response(true))
}

/// `POST /api/stores`
pub async fn create(req: Request, state: AppState) -> Response {
    create_store(&req, &state)
        .await
        .unwrap_or_else(|err| err.to_response(true))
}

/// `GET /api/stores/{id}`
pub async fn get(req: Request, state: AppState) -> Response {
    respond(get_store(&req, &state).await)
}

/// `PUT /api/stores/{id}`
pub async fn update(req: Request, state: AppState) -> Response {
    respond(update_store(&req, &state).await)
}

/// `DELETE /api/stores/{id}`
pub async fn delete(req: Request, state: AppState) -> Response {
    respond(delete_store(&req, &state).await)
}

async fn list_stores(state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let out = execute_query(db, &LogicalQuery::new(LIST_SQL), None).await?;
    Ok(Response::json(&json!({ "stores": out.rows })))
}

/// Validated store fields, in column order for both INSERT and UPDATE.
struct StoreFields(Vec<SqlValue>);

impl StoreFields {
    fn from_payload(payload: &Payload) -> Result<Self> {
        if !payload.all_truthy(&["name", "category", "logo_url", "location"])
            || !payload.all_defined(&["longitude", "latitude"])
        {
            return Err(ApiError::BadRequest(REQUIRED.to_string()));
        }

        Ok(Self(vec![
            payload.param("name"),
            payload.param("category"),
            payload.param("logo_url"),
            payload.param("location"),
            payload.numeric_param("longitude")?,
            payload.numeric_param("latitude")?,
            payload.param("email"),
            payload.param("phone_number"),
        ]))
    }
}

async fn create_store(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let fields = StoreFields::from_payload(&Payload::from_request(req)?)?;

    let created = execute_insert(
        db,
        &LogicalQuery::new(
            "INSERT INTO stores (name, category, logo_url, location, longitude, latitude, \
             email, phone_number) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .with_params(fields.0),
        None,
    )
    .await?;

    Ok(Response::json(&json!({
        "message": "Store created successfully",
        "store": created,
    }))
    .status(201))
}

async fn find_store(db: &dyn Database, id: i64) -> Result<Option<Row>> {
    let out = execute_query(db, &LogicalQuery::new(DETAIL_SQL).bind(id), None).await?;
    Ok(out.rows.into_iter().next())
}

async fn exists(db: &dyn Database, id: i64) -> Result<bool> {
    let out = execute_query(
        db,
        &LogicalQuery::new("SELECT id FROM stores WHERE id = ?").bind(id),
        None,
    )
    .await?;
    Ok(!out.rows.is_empty())
}

async fn get_store(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let id = path_id(req, NOT_FOUND)?;
    let store = find_store(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    Ok(Response::json(&json!({ "store": store })))
}

async fn update_store(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let id = path_id(req, NOT_FOUND)?;
    let mut fields = StoreFields::from_payload(&Payload::from_request(req)?)?;

    if !exists(db, id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }

    let sql = format!(
        "UPDATE stores SET name = ?, category = ?, logo_url = ?, location = ?, longitude = ?, \
         latitude = ?, email = ?, phone_number = ?{} WHERE id = ?",
        db.dialect().updated_at_assignment()
    );
    fields.0.push(SqlValue::Int(id));
    execute_query(db, &LogicalQuery::new(sql).with_params(fields.0), None).await?;

    let store = find_store(db, id).await?;
    Ok(Response::json(&json!({
        "message": "Store updated successfully",
        "store": store,
    })))
}

async fn delete_store(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let id = path_id(req, NOT_FOUND)?;

    if !exists(db, id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }

    execute_query(
        db,
        &LogicalQuery::new("DELETE FROM stores WHERE id = ?").bind(id),
        None,
    )
    .await?;
    Ok(Response::json(&json!({ "message": "Store deleted successfully" })))
}
