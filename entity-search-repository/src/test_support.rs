//! Entity fixture shared by unit tests.

use std::sync::LazyLock;

use chrono::NaiveDate;
use entity_search_shared::{Entity, FieldAccessors, FieldKind, GeoPoint, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dimensions {
    pub weight: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    pub id: Option<i64>,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub tags: Vec<String>,
    pub released: Option<NaiveDate>,
    pub location: Option<GeoPoint>,
    pub dimensions: Dimensions,
}

impl Product {
    pub fn new(name: &str, price: f64) -> Self {
        Self {
            name: name.to_string(),
            price,
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

static PRODUCT_FIELDS: LazyLock<FieldAccessors<Product>> = LazyLock::new(|| {
    FieldAccessors::new()
        .field_with_setter(
            "id",
            FieldKind::Integer,
            |p: &Product| Value::from(p.id),
            |p: &mut Product, v| p.id = v.as_i64(),
        )
        .field_with_setter(
            "name",
            FieldKind::Text,
            |p: &Product| Value::from(&p.name),
            |p: &mut Product, v| p.name = v.to_string(),
        )
        .field_with_setter(
            "price",
            FieldKind::Float,
            |p: &Product| Value::from(p.price),
            |p: &mut Product, v| p.price = v.as_f64().unwrap_or_default(),
        )
        .field_with_setter(
            "quantity",
            FieldKind::Integer,
            |p: &Product| Value::from(p.quantity),
            |p: &mut Product, v| p.quantity = v.as_i64().unwrap_or_default(),
        )
        .field_with_setter(
            "tags",
            FieldKind::List,
            |p: &Product| Value::from(p.tags.clone()),
            |p: &mut Product, v| p.tags = v.to_text_list(),
        )
        .field_with_setter(
            "released",
            FieldKind::Date,
            |p: &Product| Value::from(p.released),
            |p: &mut Product, v| p.released = v.as_date(),
        )
        .field(
            "location",
            FieldKind::GeoPoint,
            |p: &Product| Value::from(p.location),
        )
        .field_with_setter(
            "dimensions.weight",
            FieldKind::Integer,
            |p: &Product| Value::from(p.dimensions.weight),
            |p: &mut Product, v| p.dimensions.weight = v.as_i64().unwrap_or_default(),
        )
});

impl Entity for Product {
    fn kind() -> &'static str {
        "Product"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn accessors() -> &'static FieldAccessors<Self> {
        &PRODUCT_FIELDS
    }
}

pub fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
