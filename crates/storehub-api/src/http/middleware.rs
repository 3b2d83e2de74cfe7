//! Middleware support for request/response processing.

use futures::future::BoxFuture;
use tracing::info;

use crate::http::request::{Method, Request};
use crate::http::response::Response;

/// Result of middleware processing.
pub enum MiddlewareResult {
    /// Continue to the next middleware/handler.
    Continue(Request),
    /// Stop processing and return this response.
    Response(Response),
}

/// Trait for middleware that processes requests and responses.
///
/// Middleware can short-circuit a request with its own response or adjust
/// the response after the handler runs. `after` also runs for short-circuited
/// responses.
pub trait Middleware: Send + Sync {
    /// Called before the request handler.
    fn before<'a>(&'a self, req: Request) -> BoxFuture<'a, MiddlewareResult>;

    /// Called after the request handler.
    fn after<'a>(&'a self, res: Response) -> BoxFuture<'a, Response>;
}

/// Middleware that logs requests and response statuses.
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn before<'a>(&'a self, req: Request) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            info!(method = %req.method, path = %req.path, "Request");
            MiddlewareResult::Continue(req)
        })
    }

    fn after<'a>(&'a self, res: Response) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            info!(status = res.status, "Response");
            res
        })
    }
}

/// Middleware that adds CORS headers to every response and answers
/// preflight requests.
pub struct CorsMiddleware {
    /// Allowed origin.
    pub allowed_origin: String,
    /// Allowed methods.
    pub allowed_methods: Vec<Method>,
    /// Allowed request headers.
    pub allowed_headers: Vec<String>,
}

impl Default for CorsMiddleware {
    fn default() -> Self {
        Self::permissive()
    }
}

impl CorsMiddleware {
    /// Allows any origin for the dashboard's methods and headers.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            allowed_origin: "*".to_string(),
            allowed_methods: vec![
                Method::Get,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Options,
            ],
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
        }
    }

    fn apply(&self, res: Response) -> Response {
        let methods = self
            .allowed_methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        res.header("Access-Control-Allow-Origin", self.allowed_origin.as_str())
            .header("Access-Control-Allow-Methods", methods)
            .header("Access-Control-Allow-Headers", self.allowed_headers.join(", "))
    }
}

impl Middleware for CorsMiddleware {
    fn before<'a>(&'a self, req: Request) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            if req.method == Method::Options {
                return MiddlewareResult::Response(Response::json(&serde_json::json!({})));
            }
            MiddlewareResult::Continue(req)
        })
    }

    fn after<'a>(&'a self, res: Response) -> BoxFuture<'a, Response> {
        Box::pin(async move { self.apply(res) })
    }
}
