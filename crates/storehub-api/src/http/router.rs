//! Request routing.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::http::middleware::{Middleware, MiddlewareResult};
use crate::http::path::PathPattern;
use crate::http::request::{Method, PathParams, Request};
use crate::http::response::Response;

/// A boxed async handler receiving the request and shared state.
pub type Handler<S> = Arc<dyn Fn(Request, S) -> BoxFuture<'static, Response> + Send + Sync>;

/// A single route definition.
pub struct Route<S> {
    /// HTTP method.
    pub method: Method,
    /// Path pattern.
    pub pattern: PathPattern,
    /// Request handler.
    pub handler: Handler<S>,
}

enum RouteMatch<'a, S> {
    Found(&'a Route<S>, PathParams),
    MethodNotAllowed,
    NotFound,
}

/// Routes requests to handlers, passing each a clone of the shared state.
///
/// Routes are tried in registration order; the first whose pattern and
/// method both match wins.
pub struct Router<S> {
    state: S,
    routes: Vec<Route<S>>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl<S> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates a router with no routes.
    #[must_use]
    pub fn new(state: S) -> Self {
        Self {
            state,
            routes: Vec::new(),
            middleware: Vec::new(),
        }
    }

    /// Adds a GET route.
    pub fn get<F, Fut>(self, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request, S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Get, path, handler)
    }

    /// Adds a POST route.
    pub fn post<F, Fut>(self, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request, S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Post, path, handler)
    }

    /// Adds a PUT route.
    pub fn put<F, Fut>(self, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request, S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Put, path, handler)
    }

    /// Adds a DELETE route.
    pub fn delete<F, Fut>(self, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request, S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Delete, path, handler)
    }

    /// Adds a route with any method.
    pub fn route<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request, S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            pattern: PathPattern::new(path)?,
            handler: Arc::new(move |req, state| Box::pin(handler(req, state))),
        });
        Ok(self)
    }

    /// Adds global middleware. Middleware runs in registration order before
    /// the handler and in reverse order after it.
    #[must_use]
    pub fn middleware(mut self, mw: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(mw));
        self
    }

    /// Returns the shared state.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Handles an incoming request.
    pub fn handle(&self, request: Request) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            let mut response = 'chain: {
                let mut request = request;
                for mw in &self.middleware {
                    match mw.before(request).await {
                        MiddlewareResult::Continue(req) => request = req,
                        MiddlewareResult::Response(res) => break 'chain res,
                    }
                }
                self.dispatch(request).await
            };

            for mw in self.middleware.iter().rev() {
                response = mw.after(response).await;
            }

            response
        })
    }

    async fn dispatch(&self, mut request: Request) -> Response {
        match self.find_route(&request) {
            RouteMatch::Found(route, params) => {
                request.params = params;
                (route.handler)(request, self.state.clone()).await
            }
            RouteMatch::MethodNotAllowed => Response::method_not_allowed(),
            RouteMatch::NotFound => Response::not_found(),
        }
    }

    fn find_route(&self, request: &Request) -> RouteMatch<'_, S> {
        let mut path_matched = false;

        for route in &self.routes {
            if let Some(params) = route.pattern.match_path(&request.path) {
                path_matched = true;
                if route.method == request.method {
                    return RouteMatch::Found(route, params);
                }
            }
        }

        if path_matched {
            RouteMatch::MethodNotAllowed
        } else {
            RouteMatch::NotFound
        }
    }
}
