use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A computing-equipment record as stored in the `computacion` collection.
///
/// The collection carries no schema, so every field is read as whatever the
/// document holds. Missing fields are left out of responses. The store's own
/// `_id` is ignored on read and never written back.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "codigo", default, skip_serializing_if = "Value::is_null")]
    pub code: Value,
    #[serde(rename = "nombre", default, skip_serializing_if = "Value::is_null")]
    pub name: Value,
    #[serde(rename = "precio", default, skip_serializing_if = "Value::is_null")]
    pub price: Value,
    #[serde(rename = "categoria", default, skip_serializing_if = "Value::is_null")]
    pub category: Value,
}

impl Item {
    /// The item code, when the document holds an integral number.
    pub fn code(&self) -> Option<i64> {
        code_from_json(&self.code)
    }
}

fn code_from_json(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Presence check for write paths: `null`, `false`, `0`, NaN and `""` count
/// as absent. Any other value is stored as sent.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// An item that passed write-path validation but has no code yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: Value,
    pub price: Value,
    pub category: Value,
}

impl NewItem {
    pub fn with_code(self, code: i64) -> Item {
        Item {
            code: Value::from(code),
            name: self.name,
            price: self.price,
            category: self.category,
        }
    }
}

/// Which text field a case-insensitive search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Category,
}

impl SearchField {
    pub fn document_key(self) -> &'static str {
        match self {
            SearchField::Name => "nombre",
            SearchField::Category => "categoria",
        }
    }
}
