//! Route table for the dashboard API.

use crate::error::Result;
use crate::handlers::{fare_rates, menu_items, menu_photos, stores};
use crate::http::{CorsMiddleware, LoggingMiddleware, Router};
use crate::state::AppState;

/// Builds the API router with logging and CORS applied to every request.
///
/// # Errors
///
/// Returns an error if a route pattern fails to compile.
pub fn build_router(state: AppState) -> Result<Router<AppState>> {
    Ok(Router::new(state)
        .middleware(LoggingMiddleware)
        .middleware(CorsMiddleware::permissive())
        .get("/api/stores", stores::list)?
        .post("/api/stores", stores::create)?
        .get("/api/stores/{id}", stores::get)?
        .put("/api/stores/{id}", stores::update)?
        .delete("/api/stores/{id}", stores::delete)?
        .get("/api/menu-items", menu_items::list)?
        .post("/api/menu-items", menu_items::create)?
        .post("/api/menu-items/bulk", menu_items::bulk_create)?
        .get("/api/menu-items/{id}", menu_items::get)?
        .put("/api/menu-items/{id}", menu_items::update)?
        .delete("/api/menu-items/{id}", menu_items::delete)?
        .get("/api/menu-photos", menu_photos::list)?
        .post("/api/menu-photos", menu_photos::create)?
        .get("/api/menu-photos/{id}", menu_photos::get)?
        .delete("/api/menu-photos/{id}", menu_photos::delete)?
        .get("/api/fare-rates/{id}", fare_rates::get)?
        .put("/api/fare-rates/{id}", fare_rates::update)?)
}
