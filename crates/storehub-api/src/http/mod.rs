//! Minimal HTTP layer: requests, responses, path patterns, middleware and a
//! state-carrying router. Transport lives in [`crate::server`].

mod middleware;
mod path;
mod request;
mod response;
mod router;

pub use middleware::{CorsMiddleware, LoggingMiddleware, Middleware, MiddlewareResult};
pub use path::PathPattern;
pub use request::{Method, PathParams, Request};
pub use response::Response;
pub use router::{Handler, Route, Router};
