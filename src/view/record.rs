//! Typed word record
//!
//! The shape the chart consumes: the numeric `value` the query orders by,
//! read out of the document, next to the document payload exactly as stored.

use serde::{Deserialize, Serialize};

use crate::backend::{DocumentSnapshot, Fields};

/// Field the chart plots and the dashboard orders by
pub const VALUE_FIELD: &str = "value";

/// One word document as rendered by the dashboard
///
/// Serialized as `{"id": .., "value": .., "data": {..}}`. The payload is
/// nested, so a payload key can never shadow the document id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordRecord {
    /// Document identifier
    pub id: String,
    /// Ordering value; `None` when the document lacks a numeric `value`
    pub value: Option<f64>,
    /// Untouched document payload (`name`, `value`, per-language counters, ...)
    pub data: Fields,
}

impl WordRecord {
    pub fn from_document(doc: &DocumentSnapshot) -> Self {
        Self {
            id: doc.id.clone(),
            value: doc.number(VALUE_FIELD),
            data: doc.data().clone(),
        }
    }

    /// Display label: the `name` field, falling back to the id
    pub fn label(&self) -> &str {
        self.data
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or(self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(id: &str, payload: serde_json::Value) -> DocumentSnapshot {
        match payload {
            serde_json::Value::Object(fields) => DocumentSnapshot::new(id, fields),
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_from_document_passes_payload_through() {
        let payload = json!({"name": "get", "value": 42, "python_value": 30, "java_value": 12});
        let record = WordRecord::from_document(&snapshot("get", payload.clone()));

        assert_eq!(record.id, "get");
        assert_eq!(record.value, Some(42.0));
        assert_eq!(record.label(), "get");
        assert_eq!(serde_json::Value::Object(record.data), payload);
    }

    #[test]
    fn test_non_numeric_value_is_kept_in_payload() {
        let record = WordRecord::from_document(&snapshot("orphan", json!({"value": "n/a"})));
        assert_eq!(record.value, None);
        assert_eq!(record.data["value"], json!("n/a"));
        assert_eq!(record.label(), "orphan");
    }

    #[test]
    fn test_payload_id_does_not_collide_with_document_id() {
        let record = WordRecord::from_document(&snapshot(
            "get",
            json!({"name": "get", "value": "n/a", "id": "payload-id"}),
        ));

        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text.matches("\"id\"").count(), 2);

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["id"], "get");
        assert_eq!(json["value"], serde_json::Value::Null);
        assert_eq!(json["data"]["id"], "payload-id");
        assert_eq!(json["data"]["value"], "n/a");
    }

    #[test]
    fn test_serialized_shape() {
        let record = WordRecord::from_document(&snapshot("set", json!({"name": "set", "value": 7})));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            json!({"id": "set", "value": 7.0, "data": {"name": "set", "value": 7}})
        );
    }
}
