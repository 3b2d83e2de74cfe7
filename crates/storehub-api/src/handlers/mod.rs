//! Route handlers.
//!
//! Each public handler has the router's `(Request, AppState) -> Response`
//! shape and delegates to a private function returning [`Result`], so
//! failures funnel through [`ApiError::to_response`].

pub mod fare_rates;
pub mod menu_items;
pub mod menu_photos;
pub mod stores;

use serde_json::{Map, Value};
use storehub_db::{Row, SqlValue};

use crate::error::{ApiError, Result};
use crate::http::{Request, Response};

/// Converts a handler result into a response.
pub(crate) fn respond(result: Result<Response>) -> Response {
    result.unwrap_or_else(|err| err.to_response(false))
}

/// A JSON object request body.
///
/// Field checks follow the dashboard's client contract: "required" fields
/// must be truthy, while some numeric fields only need to be present.
#[derive(Debug, Default)]
pub(crate) struct Payload(Map<String, Value>);

impl Payload {
    /// Parses the request body as a JSON object.
    pub(crate) fn from_request(req: &Request) -> Result<Self> {
        match req.json::<Value>()? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ApiError::BadRequest("Request body must be a JSON object".to_string())),
        }
    }

    /// Returns the field when it is present, even if null.
    pub(crate) fn defined(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the field when it is truthy: not null, false, zero or empty.
    pub(crate) fn truthy(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| is_truthy(v))
    }

    /// Returns whether every key is truthy.
    pub(crate) fn all_truthy(&self, keys: &[&str]) -> bool {
        keys.iter().all(|key| self.truthy(key).is_some())
    }

    /// Returns whether every key is present.
    pub(crate) fn all_defined(&self, keys: &[&str]) -> bool {
        keys.iter().all(|key| self.defined(key).is_some())
    }

    /// Returns the field as a bind parameter; absent fields bind NULL.
    pub(crate) fn param(&self, key: &str) -> SqlValue {
        self.0
            .get(key)
            .cloned()
            .map_or(SqlValue::Null, SqlValue::from_json)
    }

    /// Returns the field as a number, accepting numeric strings.
    pub(crate) fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(number)
    }

    /// Returns a numeric field as a bind parameter.
    ///
    /// Absent and null fields bind NULL; anything else must be numeric.
    pub(crate) fn numeric_param(&self, key: &str) -> Result<SqlValue> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(SqlValue::Null),
            Some(value) => number(value)
                .map(SqlValue::Float)
                .ok_or_else(|| ApiError::BadRequest(format!("{key} must be a number"))),
        }
    }
}

/// JavaScript-style truthiness of a JSON value.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads a JSON number or numeric string.
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Converts an id from a body or query string into a bind parameter.
///
/// Integer strings bind as integers so they compare cleanly against integer
/// columns on every engine.
pub(crate) fn id_value(value: &Value) -> SqlValue {
    match value {
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_or_else(|_| SqlValue::Text(s.clone()), SqlValue::Int),
        other => SqlValue::from_json(other.clone()),
    }
}

/// Reads the numeric `{id}` path parameter.
///
/// A non-numeric id cannot name a record, so it is reported with the same
/// message as a missing one.
pub(crate) fn path_id(req: &Request, not_found: &str) -> Result<i64> {
    req.params
        .parse("id")
        .ok_or_else(|| ApiError::NotFound(not_found.to_string()))
}

/// Rewrites a textual `price` column as a number.
pub(crate) fn normalize_price(mut row: Row) -> Row {
    let parsed = row
        .get_str("price")
        .and_then(|text| text.trim().parse::<f64>().ok());
    if let Some(price) = parsed {
        row.set("price", SqlValue::Float(price));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        let req = Request::post("/").json_body(&value);
        Payload::from_request(&req).unwrap()
    }

    #[test]
    fn test_truthiness() {
        let p = payload(json!({
            "name": "Cafe", "empty": "", "zero": 0, "null": null, "no": false, "n": 2.5
        }));
        assert!(p.truthy("name").is_some());
        assert!(p.truthy("n").is_some());
        for key in ["empty", "zero", "null", "no", "missing"] {
            assert!(p.truthy(key).is_none(), "{key} should be falsy");
        }
        assert!(p.defined("null").is_some());
        assert!(p.defined("missing").is_none());
    }

    #[test]
    fn test_param_and_number() {
        let p = payload(json!({"price": "85.50", "store_id": 3}));
        assert_eq!(p.number("price"), Some(85.5));
        assert_eq!(p.param("store_id"), SqlValue::Int(3));
        assert_eq!(p.param("email"), SqlValue::Null);
        assert_eq!(p.numeric_param("price").unwrap(), SqlValue::Float(85.5));
        assert_eq!(p.numeric_param("missing").unwrap(), SqlValue::Null);
    }

    #[test]
    fn test_numeric_param_rejects_text() {
        let p = payload(json!({"base_fare": "forty"}));
        assert!(matches!(
            p.numeric_param("base_fare"),
            Err(ApiError::BadRequest(msg)) if msg == "base_fare must be a number"
        ));
    }

    #[test]
    fn test_non_object_body_rejected() {
        let req = Request::post("/").body("[1, 2]");
        assert!(matches!(
            Payload::from_request(&req),
            Err(ApiError::BadRequest(_))
        ));
        let req = Request::post("/").body("{not json");
        assert!(matches!(
            Payload::from_request(&req),
            Err(ApiError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_id_value() {
        assert_eq!(id_value(&json!("12")), SqlValue::Int(12));
        assert_eq!(id_value(&json!(12)), SqlValue::Int(12));
        assert_eq!(id_value(&json!("abc")), SqlValue::Text("abc".to_string()));
    }

    #[test]
    fn test_normalize_price() {
        let row = Row::new().with("price", SqlValue::Text("85.50".to_string()));
        assert_eq!(normalize_price(row).get("price"), Some(&SqlValue::Float(85.5)));
    }
}
