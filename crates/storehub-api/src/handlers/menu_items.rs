//! `/api/menu-items` handlers, including bulk import.

use serde::Deserialize;
use serde_json::{json, Value};
use storehub_db::{
    execute_insert, execute_query, execute_transaction, params, Database, LogicalQuery, Row,
    SqlValue,
};
use tracing::info;

use super::{id_value, is_truthy, normalize_price, path_id, respond, Payload};
use crate::error::{ApiError, Result};
use crate::http::{Request, Response};
use crate::state::AppState;

const DETAIL_SQL: &str =
    "SELECT id, name, price, store_id, created_at, updated_at FROM menu_items WHERE id = ?";

const INSERT_SQL: &str = "INSERT INTO menu_items (name, price, store_id) VALUES (?, ?, ?)";

const REQUIRED: &str = "All fields are required: name, price, store_id";

const NOT_FOUND: &str = "Menu item not found";

/// `GET /api/menu-items?store_id=`
pub async fn list(req: Request, state: AppState) -> Response {
    respond(list_items(&req, &state).await)
}

/// `POST /api/menu-items`
pub async fn create(req: Request, state: AppState) -> Response {
    respond(create_item(&req, &state).await)
}

/// `GET /api/menu-items/{id}`
pub async fn get(req: Request, state: AppState) -> Response {
    respond(get_item(&req, &state).await)
}

/// `PUT /api/menu-items/{id}`
pub async fn update(req: Request, state: AppState) -> Response {
    respond(update_item(&req, &state).await)
}

/// `DELETE /api/menu-items/{id}`
pub async fn delete(req: Request, state: AppState) -> Response {
    respond(delete_item(&req, &state).await)
}

/// `POST /api/menu-items/bulk`
///
/// Reports errors as `{success: false, ...}` rather than the plain
/// `{error}` shape of the other endpoints.
pub async fn bulk_create(req: Request, state: AppState) -> Response {
    match bulk_import(&req, &state).await {
        Ok(res) => res,
        Err(err) if err.status() < 500 => Response::json(&json!({
            "success": false,
            "message": err.to_string(),
        }))
        .status(err.status()),
        Err(err) => {
            tracing::error!(error = %err, "Bulk import failed");
            Response::json(&json!({ "success": false, "error": "Internal server error" }))
                .status(500)
        }
    }
}

async fn list_items(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let store_id = req
        .get_query("store_id")
        .map_or(SqlValue::Null, |raw| id_value(&Value::String(raw.to_string())));

    let out = execute_query(
        db,
        &LogicalQuery::new("SELECT * FROM menu_items WHERE store_id = ?").bind(store_id),
        None,
    )
    .await?;

    if out.rows.is_empty() {
        return Ok(Response::json(&json!({ "message": "No menu items found" })).status(404));
    }

    let items: Vec<Row> = out.rows.into_iter().map(normalize_price).collect();
    Ok(Response::json(&json!({
        "message": "Menu items fetched successfully",
        "menuItems": items,
    })))
}

/// Validated `(name, price, store_id)` parameters.
fn item_params(payload: &Payload) -> Result<Vec<SqlValue>> {
    if payload.truthy("name").is_none()
        || payload.defined("price").is_none()
        || payload.truthy("store_id").is_none()
    {
        return Err(ApiError::BadRequest(REQUIRED.to_string()));
    }

    let price = payload
        .number("price")
        .ok_or_else(|| ApiError::BadRequest("Price must be a number".to_string()))?;
    if price <= 0.0 {
        return Err(ApiError::BadRequest("Price must be greater than 0".to_string()));
    }

    Ok(vec![
        payload.param("name"),
        SqlValue::Float(price),
        payload.defined("store_id").map_or(SqlValue::Null, id_value),
    ])
}

async fn create_item(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let params = item_params(&Payload::from_request(req)?)?;

    let created = execute_insert(db, &LogicalQuery::new(INSERT_SQL).with_params(params), None)
        .await?;

    Ok(Response::json(&json!({
        "message": "Menu item created successfully",
        "menuItem": created,
    }))
    .status(201))
}

async fn find_item(db: &dyn Database, id: i64) -> Result<Option<Row>> {
    let out = execute_query(db, &LogicalQuery::new(DETAIL_SQL).bind(id), None).await?;
    Ok(out.rows.into_iter().next().map(normalize_price))
}

async fn exists(db: &dyn Database, id: i64) -> Result<bool> {
    let out = execute_query(
        db,
        &LogicalQuery::new("SELECT id FROM menu_items WHERE id = ?").bind(id),
        None,
    )
    .await?;
    Ok(!out.rows.is_empty())
}

async fn get_item(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let id = path_id(req, NOT_FOUND)?;
    let item = find_item(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    Ok(Response::json(&json!({ "menuItem": item })))
}

async fn update_item(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let id = path_id(req, NOT_FOUND)?;
    let mut params = item_params(&Payload::from_request(req)?)?;

    if !exists(db, id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }

    let sql = format!(
        "UPDATE menu_items SET name = ?, price = ?, store_id = ?{} WHERE id = ?",
        db.dialect().updated_at_assignment()
    );
    params.push(SqlValue::Int(id));
    execute_query(db, &LogicalQuery::new(sql).with_params(params), None).await?;

    let item = find_item(db, id).await?;
    Ok(Response::json(&json!({
        "message": "Menu item updated successfully",
        "menuItem": item,
    })))
}

async fn delete_item(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let id = path_id(req, NOT_FOUND)?;

    if !exists(db, id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }

    execute_query(
        db,
        &LogicalQuery::new("DELETE FROM menu_items WHERE id = ?").bind(id),
        None,
    )
    .await?;
    Ok(Response::json(&json!({ "message": "Menu item deleted successfully" })))
}

#[derive(Debug, Deserialize)]
struct BulkRequest {
    #[serde(default)]
    products: Option<Value>,
    #[serde(default)]
    store_id: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct BulkProduct {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    price: Option<Value>,
}

impl BulkProduct {
    /// Returns `(name, price)` when the product is importable: a non-empty
    /// name and a positive JSON number for the price.
    fn validated(&self) -> Option<(String, f64)> {
        let name = match &self.name {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return None,
        };
        let price = match &self.price {
            Some(Value::Number(n)) => n.as_f64()?,
            _ => return None,
        };
        (price > 0.0).then_some((name, price))
    }
}

async fn bulk_import(req: &Request, state: &AppState) -> Result<Response> {
    let db = state.db()?;
    let body: BulkRequest = req.json()?;

    let products: Vec<BulkProduct> = match body.products {
        Some(Value::Array(items)) if !items.is_empty() => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => return Err(ApiError::BadRequest("No products provided".to_string())),
    };

    let store_id = body
        .store_id
        .filter(is_truthy)
        .ok_or_else(|| ApiError::BadRequest("Store ID is required".to_string()))?;

    let products = products_validated(&products)?;
    import(db, &products, id_value(&store_id)).await
}

fn products_validated(products: &[BulkProduct]) -> Result<Vec<(String, f64)>> {
    let valid: Vec<(String, f64)> = products.iter().filter_map(BulkProduct::validated).collect();
    let invalid = products.len() - valid.len();
    if invalid > 0 {
        return Err(ApiError::BadRequest(format!("{invalid} invalid products found")));
    }
    Ok(valid)
}

async fn import(
    db: &dyn Database,
    products: &[(String, f64)],
    store_id: SqlValue,
) -> Result<Response> {
    let batch: Vec<LogicalQuery> = products
        .iter()
        .map(|(name, price)| {
            LogicalQuery::new(INSERT_SQL).with_params(params![
                name.as_str(),
                *price,
                store_id.clone()
            ])
        })
        .collect();

    let results = execute_transaction(db, &batch, None).await?;
    info!(count = products.len(), "Menu items imported");

    Ok(Response::json(&json!({
        "success": true,
        "message": "Products imported successfully",
        "importedCount": products.len(),
        "results": results,
    }))
    .status(201))
}
