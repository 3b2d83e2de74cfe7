//! `/api/menu-photos` handlers.

use serde_json::{json, Value};
use storehub_db::{execute_insert, execute_query, LogicalQuery, SqlValue};

use super::{id_value, path_id, respond, Payload};
use crate::error::{ApiError, Result};
use crate::http::{Request, Response};
use crate::state::AppState;

const NOT_FOUND: &str = "Menu photo not found";

/// `GET /api/menu-photos?store_id=`
pub async fn list(req: Request, state: AppState) -> Response {
    respond(list_photos(&req, &state).await)
}

/// `POST /api/menu-photos`
pub async fn create(req: Request, state: AppState) -> Response {
    respond(create_photo(&req, &state).await)
}

/// `GET /api/menu-photos/{id}`
pub async fn get(req: Request, state: AppState) -> Response {
    respond(get_photo(&req, &state).await)
}

/// `DELETE /api/menu-photos/{id}`
pub async fn delete(req: Request, state: AppState) -> Response {
    respond(delete_photo(&req, &state).await)
}

async fn list_photos(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let store_id = req
        .get_query("store_id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Store ID is required".to_string()))?;

    let out = execute_query(
        db,
        &LogicalQuery::new("SELECT * FROM menu_photos WHERE store_id = ?")
            .bind(id_value(&Value::String(store_id.to_string()))),
        None,
    )
    .await?;

    if out.rows.is_empty() {
        return Ok(
            Response::json(&json!({ "message": "No menu photos found for this store" }))
                .status(404),
        );
    }

    Ok(Response::json(&json!({
        "message": "Menu photos fetched successfully",
        "menuPhotos": out.rows,
    })))
}

async fn create_photo(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let payload = Payload::from_request(req)?;

    if !payload.all_truthy(&["photo_url", "store_id"]) {
        return Err(ApiError::BadRequest(
            "All fields are required: photo_url, store_id".to_string(),
        ));
    }

    let store_id = payload.defined("store_id").map_or(SqlValue::Null, id_value);
    let created = execute_insert(
        db,
        &LogicalQuery::new("INSERT INTO menu_photos (photo_url, store_id) VALUES (?, ?)")
            .bind(payload.param("photo_url"))
            .bind(store_id),
        None,
    )
    .await?;

    Ok(Response::json(&json!({
        "message": "Menu photo created successfully",
        "menuPhoto": created,
    }))
    .status(201))
}

async fn get_photo(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let id = path_id(req, NOT_FOUND)?;

    let out = execute_query(
        db,
        &LogicalQuery::new("SELECT * FROM menu_photos WHERE id = ?").bind(id),
        None,
    )
    .await?;

    let photo = out
        .rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    Ok(Response::json(&json!({
        "message": "Menu photo fetched successfully",
        "menuPhoto": photo,
    })))
}

/// Deleting a photo that does not exist still succeeds.
async fn delete_photo(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let id = path_id(req, NOT_FOUND)?;

    execute_query(
        db,
        &LogicalQuery::new("DELETE FROM menu_photos WHERE id = ?").bind(id),
        None,
    )
    .await?;

    Ok(Response::json(&json!({ "message": "Menu photo deleted successfully" })))
}
