//! Dialect-independent row records.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::SqlValue;

/// A row record with columns in projection order.
///
/// The same SQL projection yields the same field names on every engine.
/// Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty row with room for `capacity` columns.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Appends a column.
    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        self.columns.push(column.into());
        self.values.push(value);
    }

    /// Builder form of [`Row::push`].
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: SqlValue) -> Self {
        self.push(column, value);
        self
    }

    /// Gets a column value by name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Gets a column as an integer.
    #[must_use]
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(SqlValue::as_i64)
    }

    /// Gets a column as a float.
    #[must_use]
    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(SqlValue::as_f64)
    }

    /// Gets a text column.
    #[must_use]
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(SqlValue::as_str)
    }

    /// Replaces the value of an existing column. Returns false if absent.
    pub fn set(&mut self, column: &str, value: SqlValue) -> bool {
        match self.columns.iter().position(|c| c == column) {
            Some(idx) => {
                self.values[idx] = value;
                true
            }
            None => false,
        }
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over `(column, value)` pairs.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn menu_item() -> Row {
        Row::new()
            .with("id", SqlValue::Int(1))
            .with("name", SqlValue::Text("Pancit".to_string()))
            .with("price", SqlValue::Text("85.50".to_string()))
            .with("image_url", SqlValue::Null)
    }

    #[test]
    fn test_accessors() {
        let row = menu_item();
        assert_eq!(row.len(), 4);
        assert_eq!(row.get_i64("id"), Some(1));
        assert_eq!(row.get_str("name"), Some("Pancit"));
        assert_eq!(row.get_f64("price"), Some(85.5));
        assert_eq!(row.get("image_url"), Some(&SqlValue::Null));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_set_existing_column() {
        let mut row = menu_item();
        assert!(row.set("price", SqlValue::Float(85.5)));
        assert!(!row.set("nope", SqlValue::Null));
        assert_eq!(row.get("price"), Some(&SqlValue::Float(85.5)));
    }

    #[test]
    fn test_serializes_in_column_order() {
        let row = menu_item();
        let text = serde_json::to_string(&row).unwrap();
        assert_eq!(
            text,
            r#"{"id":1,"name":"Pancit","price":"85.50","image_url":null}"#
        );
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({"id": 1, "name": "Pancit", "price": "85.50", "image_url": null})
        );
    }
}
