//! Document types for the search index.
//!
//! A [`Document`] is the searchable projection of one entity: its string id
//! and a list of typed fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::value::{GeoPoint, Value};

/// Typed value of an indexed field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    GeoPoint(GeoPoint),
}

impl FieldValue {
    /// Converts back to an entity property value.
    pub fn to_value(&self) -> Value {
        match self {
            FieldValue::Text(text) => Value::Text(text.clone()),
            FieldValue::Number(number) => Value::Float(*number),
            FieldValue::Date(date) => Value::Date(*date),
            FieldValue::GeoPoint(point) => Value::GeoPoint(*point),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentField {
    pub name: String,
    pub value: FieldValue,
}

/// Document representation for the search index.
///
/// # Example
///
/// ```
/// use entity_search_shared::{Document, FieldValue};
///
/// let doc = Document::new("42")
///     .with_field("name", FieldValue::Text("Lamp".to_string()))
///     .with_field("price", FieldValue::Number(15.5));
///
/// assert_eq!(doc.field("price"), Some(&FieldValue::Number(15.5)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub fields: Vec<DocumentField>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.push(DocumentField {
            name: name.into(),
            value,
        });
    }

    /// First field with the given name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    /// Field names and values in document order, as entity property values.
    pub fn to_values(&self) -> Vec<(String, Value)> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.value.to_value()))
            .collect()
    }
}
