//! End-to-end tests through the router against in-memory SQLite.

use std::sync::Arc;

use serde_json::{json, Value};
use storehub_api::{build_router, init_schema, AppState, Method, Request, Response, Router};
use storehub_db::{execute_query, LogicalQuery, SqliteDatabase};

/// Builds the app and also returns a handle to its database.
async fn app_with_db() -> (Router<AppState>, SqliteDatabase) {
    let db = SqliteDatabase::in_memory()
        .await
        .unwrap_or_else(|e| panic!("Failed to open in-memory database: {e}"));
    init_schema(&db)
        .await
        .unwrap_or_else(|e| panic!("Failed to create schema: {e}"));
    let router = build_router(AppState::new(Arc::new(db.clone()))).unwrap();
    (router, db)
}

async fn app() -> Router<AppState> {
    app_with_db().await.0
}

async fn send(router: &Router<AppState>, req: Request) -> (u16, Value) {
    let res: Response = router.handle(req).await;
    let body = res.json_body().unwrap_or(Value::Null);
    (res.status, body)
}

fn store() -> Value {
    json!({
        "name": "Kusina ni Aling Nena",
        "category": "Filipino",
        "logo_url": "https://img.example/logo.png",
        "location": "Poblacion",
        "longitude": 121.05,
        "latitude": 14.55,
        "email": "nena@example.com"
    })
}

async fn create_store(router: &Router<AppState>) -> i64 {
    let (status, body) = send(router, Request::post("/api/stores").json_body(&store())).await;
    assert_eq!(status, 201, "{body}");
    body["store"]["insertId"].as_i64().unwrap()
}

#[tokio::test]
async fn test_preflight_and_cors_headers() {
    let router = app().await;

    let res = router
        .handle(Request::new(Method::Options, "/api/anything"))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json_body().unwrap(), json!({}));

    let res = router.handle(Request::get("/api/stores")).await;
    assert_eq!(res.get_header("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(
        res.get_header("Access-Control-Allow-Headers"),
        Some("Content-Type, Authorization")
    );
}

#[tokio::test]
async fn test_store_lifecycle() {
    let router = app().await;
    let id = create_store(&router).await;
    assert_eq!(id, 1);

    let (status, body) = send(&router, Request::get("/api/stores")).await;
    assert_eq!(status, 200);
    assert_eq!(body["stores"].as_array().unwrap().len(), 1);
    assert_eq!(body["stores"][0]["name"], "Kusina ni Aling Nena");
    assert_eq!(body["stores"][0]["phone_number"], Value::Null);

    let mut changed = store();
    changed["name"] = json!("Kusina 2");
    let (status, body) = send(
        &router,
        Request::put(format!("/api/stores/{id}")).json_body(&changed),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Store updated successfully");
    assert_eq!(body["store"]["name"], "Kusina 2");
    assert_eq!(body["store"]["latitude"], json!(14.55));

    let (status, body) = send(&router, Request::delete(format!("/api/stores/{id}"))).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Store deleted successfully");

    let (status, body) = send(&router, Request::get(format!("/api/stores/{id}"))).await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({"error": "Store not found"}));
}

#[tokio::test]
async fn test_store_validation() {
    let router = app().await;
    let mut missing = store();
    missing["name"] = json!("");

    let (status, body) = send(&router, Request::post("/api/stores").json_body(&missing)).await;
    assert_eq!(status, 400);
    assert_eq!(
        body["error"],
        "All fields are required: name, category, logo_url, location, longitude, latitude"
    );

    let (status, _) = send(
        &router,
        Request::put("/api/stores/99").json_body(&store()),
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_menu_items() {
    let router = app().await;
    let store_id = create_store(&router).await;

    let (status, body) = send(
        &router,
        Request::get(format!("/api/menu-items?store_id={store_id}")),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "No menu items found");

    // No store_id binds NULL, which matches nothing.
    let (status, body) = send(&router, Request::get("/api/menu-items")).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "No menu items found");

    let (status, body) = send(
        &router,
        Request::post("/api/menu-items")
            .json_body(&json!({"name": "Adobo", "price": "0", "store_id": store_id})),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Price must be greater than 0");

    let (status, body) = send(
        &router,
        Request::post("/api/menu-items").json_body(&json!({
            "name": "Adobo",
            "price": "120.50",
            "store_id": store_id.to_string()
        })),
    )
    .await;
    assert_eq!(status, 201);
    let item_id = body["menuItem"]["insertId"].as_i64().unwrap();

    let (status, body) = send(
        &router,
        Request::get(format!("/api/menu-items?store_id={store_id}")),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["menuItems"][0]["price"], json!(120.5));

    let (status, body) = send(
        &router,
        Request::put(format!("/api/menu-items/{item_id}"))
            .json_body(&json!({"name": "Adobo Special", "price": 150, "store_id": store_id})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["menuItem"]["name"], "Adobo Special");
    assert_eq!(body["menuItem"]["price"], json!(150.0));

    let (status, _) = send(&router, Request::delete(format!("/api/menu-items/{item_id}"))).await;
    assert_eq!(status, 200);
    let (status, body) = send(&router, Request::get(format!("/api/menu-items/{item_id}"))).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Menu item not found");
}

#[tokio::test]
async fn test_bulk_import_commits_every_product() {
    let router = app().await;
    let store_id = create_store(&router).await;

    let (status, body) = send(
        &router,
        Request::post("/api/menu-items/bulk").json_body(&json!({
            "store_id": store_id,
            "products": [
                {"name": "Sinigang", "price": 180},
                {"name": "Lumpia", "price": 60.5}
            ]
        })),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["importedCount"], 2);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    let (_, body) = send(
        &router,
        Request::get(format!("/api/menu-items?store_id={store_id}")),
    )
    .await;
    let names: Vec<&str> = body["menuItems"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect();
    assert_eq!(names, ["Sinigang", "Lumpia"]);
}

#[tokio::test]
async fn test_bulk_import_validation() {
    let router = app().await;

    let cases = [
        (json!({"store_id": 1, "products": []}), "No products provided"),
        (json!({"products": [{"name": "A", "price": 1}]}), "Store ID is required"),
        (
            json!({"store_id": 1, "products": [
                {"name": "A", "price": 1},
                {"name": "", "price": 1},
                {"name": "B", "price": "12"}
            ]}),
            "2 invalid products found",
        ),
    ];

    for (payload, message) in cases {
        let (status, body) =
            send(&router, Request::post("/api/menu-items/bulk").json_body(&payload)).await;
        assert_eq!(status, 400, "{payload}");
        assert_eq!(body, json!({"success": false, "message": message}));
    }
}

#[tokio::test]
async fn test_bulk_import_rolls_back_on_failure() {
    let (router, db) = app_with_db().await;
    let store_id = create_store(&router).await;

    // The second product fails after the first one was inserted.
    execute_query(
        &db,
        &LogicalQuery::new(
            "CREATE TRIGGER reject_lumpia BEFORE INSERT ON menu_items \
             WHEN NEW.name = 'Lumpia' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        ),
        None,
    )
    .await
    .unwrap();

    let (status, body) = send(
        &router,
        Request::post("/api/menu-items/bulk").json_body(&json!({
            "store_id": store_id,
            "products": [{"name": "Sinigang", "price": 180}, {"name": "Lumpia", "price": 60}]
        })),
    )
    .await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({"success": false, "error": "Internal server error"}));

    let (status, body) = send(
        &router,
        Request::get(format!("/api/menu-items?store_id={store_id}")),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "No menu items found");
}

#[tokio::test]
async fn test_bulk_import_for_missing_store_fails() {
    let router = app().await;

    let (status, body) = send(
        &router,
        Request::post("/api/menu-items/bulk").json_body(&json!({
            "store_id": 42,
            "products": [{"name": "Sinigang", "price": 180}]
        })),
    )
    .await;
    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_menu_photos() {
    let router = app().await;
    let store_id = create_store(&router).await;

    let (status, body) = send(&router, Request::get("/api/menu-photos")).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Store ID is required");

    let (status, body) = send(
        &router,
        Request::post("/api/menu-photos")
            .json_body(&json!({"photo_url": "https://img.example/m.jpg"})),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "All fields are required: photo_url, store_id");

    let (status, body) = send(
        &router,
        Request::post("/api/menu-photos")
            .json_body(&json!({"photo_url": "https://img.example/m.jpg", "store_id": store_id})),
    )
    .await;
    assert_eq!(status, 201);
    let photo_id = body["menuPhoto"]["insertId"].as_i64().unwrap();

    let (status, body) = send(
        &router,
        Request::get(format!("/api/menu-photos?store_id={store_id}")),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["menuPhotos"].as_array().unwrap().len(), 1);

    let (status, _) = send(&router, Request::delete(format!("/api/menu-photos/{photo_id}"))).await;
    assert_eq!(status, 200);
    let (status, body) = send(&router, Request::get(format!("/api/menu-photos/{photo_id}"))).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Menu photo not found");

    // Deleting again still reports success.
    let (status, _) = send(&router, Request::delete(format!("/api/menu-photos/{photo_id}"))).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_fare_rates() {
    let router = app().await;

    let (status, body) = send(&router, Request::get("/api/fare-rates/1")).await;
    assert_eq!(status, 200);
    assert_eq!(body["fareRate"]["base_fare"], json!(0.0));

    let (status, body) = send(
        &router,
        Request::put("/api/fare-rates/1").json_body(&json!({"base_fare": 40, "rate_per_km": 12.5})),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(
        body["error"],
        "All fields are required: base_fare, rate_per_km, other_charges"
    );

    let (status, body) = send(
        &router,
        Request::put("/api/fare-rates/1")
            .json_body(&json!({"base_fare": 40, "rate_per_km": 12.5, "other_charges": 0})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Fare rate updated successfully");
    assert_eq!(body["fareRate"]["rate_per_km"], json!(12.5));

    let (status, body) = send(
        &router,
        Request::put("/api/fare-rates/7")
            .json_body(&json!({"base_fare": 40, "rate_per_km": 12.5, "other_charges": 0})),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Fare rate not found");
}

#[tokio::test]
async fn test_unconfigured_database() {
    let router = build_router(AppState::unconfigured()).unwrap();

    let (status, body) = send(&router, Request::get("/api/stores")).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["details"], "database connection not configured");

    let (status, body) = send(&router, Request::get("/api/fare-rates/1")).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_wrong_method_on_known_path() {
    let router = app().await;
    let (status, body) = send(&router, Request::delete("/api/stores")).await;
    assert_eq!(status, 405);
    assert_eq!(body["error"], "Method not allowed");
}
