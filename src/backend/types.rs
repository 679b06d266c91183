//! Core data types for the document backend
//!
//! - `DocumentSnapshot`: one document as read from a collection
//! - `QuerySnapshot`: the full, ordered result of a query at one point in time
//! - `Query`: an ordered, limited query over a single numeric field
//! - `FieldValue`: a field write, either a plain value or a transform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{BackendError, BackendResult};

/// Schemaless document payload
pub type Fields = Map<String, Value>;

/// A document as read from a collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSnapshot {
    /// Identifier, unique within its collection
    pub id: String,
    /// Document payload
    pub fields: Fields,
}

impl DocumentSnapshot {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Read a field as a number, `None` if absent or not numeric
    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Value::as_f64)
    }

    /// The document payload as a plain value
    pub fn data(&self) -> &Fields {
        &self.fields
    }
}

/// A full point-in-time result set pushed by a query
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuerySnapshot {
    /// Matching documents in query order
    pub docs: Vec<DocumentSnapshot>,
    /// Position of this snapshot in its listener's stream (starts at 1)
    pub sequence: u64,
    /// When the result was computed
    pub read_time: DateTime<Utc>,
}

impl QuerySnapshot {
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Sort direction for `Query::order_by`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    #[default]
    Descending,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Ascending),
            "desc" | "descending" => Ok(Direction::Descending),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// What to do with documents that lack the ordering field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    /// Keep them, after every document that has the field
    #[default]
    SortLast,
    /// Leave them out of the result
    Exclude,
}

/// An ordered, limited query over one collection
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub order_by: String,
    pub direction: Direction,
    pub limit: usize,
    pub missing: MissingField,
}

impl Query {
    /// Default result window when no limit is set
    pub const DEFAULT_LIMIT: usize = 36;

    pub fn order_by(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            order_by: field.into(),
            direction,
            limit: Self::DEFAULT_LIMIT,
            missing: MissingField::default(),
        }
    }

    /// Builder method: set the result limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Builder method: set the missing-field policy
    pub fn missing(mut self, missing: MissingField) -> Self {
        self.missing = missing;
        self
    }

    pub fn validate(&self) -> BackendResult<()> {
        if self.order_by.trim().is_empty() {
            return Err(BackendError::InvalidQuery(
                "order_by field cannot be empty".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(BackendError::InvalidQuery(
                "limit must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// A single field write
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Replace the field with this value
    Value(Value),
    /// Add to the numeric field, treating a missing or non-numeric field as 0
    Increment(i64),
    /// Remove the field
    Delete,
}

impl FieldValue {
    pub fn increment(by: i64) -> Self {
        FieldValue::Increment(by)
    }

    /// Apply this write to `fields[name]`
    pub(crate) fn apply(&self, fields: &mut Fields, name: &str) {
        match self {
            FieldValue::Value(value) => {
                fields.insert(name.to_string(), value.clone());
            }
            FieldValue::Increment(by) => {
                let next = match fields.get(name) {
                    Some(Value::Number(n)) => match n.as_i64() {
                        Some(current) => Value::from(current.saturating_add(*by)),
                        None => n
                            .as_f64()
                            .map(|current| Value::from(current + *by as f64))
                            .unwrap_or_else(|| Value::from(*by)),
                    },
                    _ => Value::from(*by),
                };
                fields.insert(name.to_string(), next);
            }
            FieldValue::Delete => {
                fields.remove(name);
            }
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

/// Check that a document id is usable as a key
pub fn validate_document_id(id: &str) -> BackendResult<()> {
    if id.is_empty() || id.contains('/') || id.len() > 1500 {
        return Err(BackendError::InvalidDocumentId(id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_builder_defaults() {
        let query = Query::order_by("value", Direction::Descending);
        assert_eq!(query.limit, 36);
        assert_eq!(query.missing, MissingField::SortLast);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_query_validation() {
        let zero = Query::order_by("value", Direction::Descending).limit(0);
        assert!(matches!(zero.validate(), Err(BackendError::InvalidQuery(_))));

        let blank = Query::order_by(" ", Direction::Ascending);
        assert!(matches!(blank.validate(), Err(BackendError::InvalidQuery(_))));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("desc".parse::<Direction>().unwrap(), Direction::Descending);
        assert_eq!("Ascending".parse::<Direction>().unwrap(), Direction::Ascending);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_increment_integer_and_missing() {
        let mut fields = Fields::new();
        fields.insert("value".to_string(), json!(4));

        FieldValue::increment(3).apply(&mut fields, "value");
        FieldValue::increment(2).apply(&mut fields, "java_value");

        assert_eq!(fields["value"], json!(7));
        assert_eq!(fields["java_value"], json!(2));
    }

    #[test]
    fn test_increment_float_and_non_numeric() {
        let mut fields = Fields::new();
        fields.insert("value".to_string(), json!(1.5));
        fields.insert("name".to_string(), json!("get"));

        FieldValue::increment(1).apply(&mut fields, "value");
        FieldValue::increment(5).apply(&mut fields, "name");

        assert_eq!(fields["value"], json!(2.5));
        assert_eq!(fields["name"], json!(5));
    }

    #[test]
    fn test_document_id_validation() {
        assert!(validate_document_id("get").is_ok());
        assert!(validate_document_id("").is_err());
        assert!(validate_document_id("a/b").is_err());
    }

    #[test]
    fn test_snapshot_number() {
        let mut fields = Fields::new();
        fields.insert("value".to_string(), json!(12));
        fields.insert("name".to_string(), json!("set"));
        let doc = DocumentSnapshot::new("set", fields);

        assert_eq!(doc.number("value"), Some(12.0));
        assert_eq!(doc.number("name"), None);
        assert_eq!(doc.number("missing"), None);
    }
}
