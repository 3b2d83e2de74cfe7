//! HTTP response type.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a new response with the given status.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a 200 response with a JSON body.
    #[must_use]
    pub fn json<T: Serialize>(data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self::new(200)
                .header("Content-Type", "application/json")
                .body(body),
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize response");
                Self::error(500, "Internal server error")
            }
        }
    }

    /// Creates a JSON `{"error": message}` response.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(&json!({ "error": message })).status(status)
    }

    /// Creates a 404 response for unrouted paths.
    #[must_use]
    pub fn not_found() -> Self {
        Self::error(404, "Not found")
    }

    /// Creates a 405 response.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::error(405, "Method not allowed")
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Gets a header value, ignoring case.
    #[must_use]
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Parses the body as JSON.
    pub fn json_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_json() {
        let res = Response::json(&json!({"stores": []}));
        assert_eq!(res.status, 200);
        assert_eq!(res.get_header("content-type"), Some("application/json"));
        assert_eq!(res.json_body().unwrap(), json!({"stores": []}));
    }

    #[test]
    fn test_response_error() {
        let res = Response::error(404, "Store not found");
        assert_eq!(res.status, 404);
        assert_eq!(res.json_body().unwrap(), json!({"error": "Store not found"}));
    }
}
