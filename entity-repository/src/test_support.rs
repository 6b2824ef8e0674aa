//! Entity fixture shared by unit tests.

use std::sync::LazyLock;

use entity_search_shared::{Entity, FieldAccessors, FieldKind, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Note {
    pub id: Option<i64>,
    pub title: String,
    pub views: i64,
    pub tags: Vec<String>,
}

impl Note {
    pub fn new(title: &str, views: i64) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            views,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

static NOTE_FIELDS: LazyLock<FieldAccessors<Note>> = LazyLock::new(|| {
    FieldAccessors::new()
        .field_with_setter(
            "title",
            FieldKind::Text,
            |n: &Note| Value::from(&n.title),
            |n: &mut Note, v| n.title = v.to_string(),
        )
        .field_with_setter(
            "views",
            FieldKind::Integer,
            |n: &Note| Value::from(n.views),
            |n: &mut Note, v| n.views = v.as_i64().unwrap_or_default(),
        )
        .field_with_setter(
            "tags",
            FieldKind::List,
            |n: &Note| Value::from(n.tags.clone()),
            |n: &mut Note, v| n.tags = v.to_text_list(),
        )
});

impl Entity for Note {
    fn kind() -> &'static str {
        "Note"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn accessors() -> &'static FieldAccessors<Self> {
        &NOTE_FIELDS
    }
}

/// Entity with a float reading, which cannot be indexed when non-finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gauge {
    pub id: Option<i64>,
    pub reading: f64,
}

static GAUGE_FIELDS: LazyLock<FieldAccessors<Gauge>> = LazyLock::new(|| {
    FieldAccessors::new().field("reading", FieldKind::Float, |g: &Gauge| {
        Value::from(g.reading)
    })
});

impl Entity for Gauge {
    fn kind() -> &'static str {
        "Gauge"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn accessors() -> &'static FieldAccessors<Self> {
        &GAUGE_FIELDS
    }
}
