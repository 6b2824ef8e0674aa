//! Projection of entities into search documents.

use entity_search_shared::{encode_field_name, Document, Entity, FieldValue, Value};

use crate::errors::SearchError;

/// Maps an entity property value onto an indexed field type.
///
/// Dates are tried first, then numbers, collections (flattened to
/// space-separated text), geo points and finally the text rendering of the
/// value. `Null` yields `None`. Non-finite numbers cannot be indexed.
pub fn to_field_value(value: &Value) -> Result<Option<FieldValue>, String> {
    let field_value = match value {
        Value::Null => return Ok(None),
        Value::Date(date) => FieldValue::Date(*date),
        Value::Timestamp(ts) => FieldValue::Date(ts.date_naive()),
        Value::Integer(i) => FieldValue::Number(*i as f64),
        Value::Float(f) if f.is_finite() => FieldValue::Number(*f),
        Value::Float(_) => return Err("value is not a finite number".to_string()),
        Value::List(_) => FieldValue::Text(value.to_string()),
        Value::GeoPoint(point) => FieldValue::GeoPoint(*point),
        Value::Text(text) => FieldValue::Text(text.clone()),
        Value::Bool(b) => FieldValue::Text(b.to_string()),
    };
    Ok(Some(field_value))
}

/// Builds the document for one entity from the named fields.
///
/// Unknown field names read as null and are left out, as are null values.
/// Field names are stored in their encoded form.
pub fn build_document<E: Entity>(
    entity: &E,
    id: &str,
    fields: &[String],
) -> Result<Document, SearchError> {
    let accessors = E::accessors();
    let mut document = Document::new(id);
    for name in fields {
        let value = accessors.read(entity, name).unwrap_or(Value::Null);
        match to_field_value(&value) {
            Ok(Some(field_value)) => document.push(encode_field_name(name), field_value),
            Ok(None) => {}
            Err(reason) => {
                return Err(SearchError::document_build(
                    E::kind(),
                    id,
                    name.as_str(),
                    value.to_string(),
                    reason,
                ))
            }
        }
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fields, Product};
    use chrono::NaiveDate;
    use entity_search_shared::GeoPoint;

    #[test]
    fn test_field_value_selection() {
        let date = NaiveDate::from_ymd_opt(2013, 1, 1).unwrap();
        assert_eq!(to_field_value(&Value::Null), Ok(None));
        assert_eq!(
            to_field_value(&Value::Date(date)),
            Ok(Some(FieldValue::Date(date)))
        );
        assert_eq!(
            to_field_value(&Value::Integer(3)),
            Ok(Some(FieldValue::Number(3.0)))
        );
        assert_eq!(
            to_field_value(&Value::from(vec!["a", "b"])),
            Ok(Some(FieldValue::Text("a b".to_string())))
        );
        assert_eq!(
            to_field_value(&Value::GeoPoint(GeoPoint::new(1.0, 2.0))),
            Ok(Some(FieldValue::GeoPoint(GeoPoint::new(1.0, 2.0))))
        );
        assert_eq!(
            to_field_value(&Value::Bool(true)),
            Ok(Some(FieldValue::Text("true".to_string())))
        );
        assert!(to_field_value(&Value::Float(f64::NAN)).is_err());
        assert!(to_field_value(&Value::Float(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_build_document() {
        let product = Product::new("Lamp", 15.5).with_tags(&["light", "home"]);
        let doc = build_document(
            &product,
            "9",
            &fields(&["name", "price", "tags", "released", "unknown", "dimensions.weight"]),
        )
        .unwrap();

        assert_eq!(doc.id, "9");
        assert_eq!(doc.field("name"), Some(&FieldValue::Text("Lamp".into())));
        assert_eq!(doc.field("price"), Some(&FieldValue::Number(15.5)));
        assert_eq!(doc.field("tags"), Some(&FieldValue::Text("light home".into())));
        assert_eq!(doc.field("dimensions_weight"), Some(&FieldValue::Number(0.0)));
        assert_eq!(doc.field("released"), None);
        assert_eq!(doc.field("unknown"), None);
        assert_eq!(doc.fields.len(), 4);
    }

    #[test]
    fn test_build_document_rejects_non_finite() {
        let product = Product::new("Broken", f64::NAN);
        let err = build_document(&product, "1", &fields(&["name", "price"])).unwrap_err();

        match err {
            SearchError::DocumentBuild {
                kind, id, field, ..
            } => {
                assert_eq!(kind, "Product");
                assert_eq!(id, "1");
                assert_eq!(field, "price");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
