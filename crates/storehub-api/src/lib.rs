//! # storehub-api
//!
//! JSON API behind the store and menu dashboard.
//!
//! This crate provides:
//! - A small router with path parameters and before/after middleware
//! - Handlers for stores, menu items (including bulk import), menu photos
//!   and fare rates
//! - Per-engine table definitions
//! - A hyper server loop
//!
//! Handlers only see the [`AppState`], which carries the injected
//! [`storehub_db::Database`] handle.
//!
//! ## Quick Start
//!
//! ```ignore
//! use storehub_api::{build_router, AppState, Request};
//! use storehub_db::SqliteDatabase;
//!
//! let db = Arc::new(SqliteDatabase::in_memory().await?);
//! storehub_api::init_schema(db.as_ref()).await?;
//!
//! let router = build_router(AppState::new(db))?;
//! let res = router.handle(Request::get("/api/stores")).await;
//! assert_eq!(res.status, 200);
//! ```

pub mod error;
pub mod handlers;
pub mod http;
pub mod routes;
pub mod schema;
pub mod server;
pub mod state;

pub use error::{ApiError, Result};
pub use http::{Method, Request, Response, Router};
pub use routes::build_router;
pub use schema::init_schema;
pub use server::serve;
pub use state::AppState;
