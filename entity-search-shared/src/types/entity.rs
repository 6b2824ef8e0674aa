//! The entity contract and its field accessor registry.
//!
//! Repositories and the search layer never inspect entity structs directly.
//! Each entity type registers its searchable properties once, as a list of
//! named getters (and optional setters) over [`Value`].

use std::fmt;

use tracing::warn;

use super::search_query::encode_field_name;
use super::value::Value;

/// A record stored by the repository and projected into the search index.
///
/// # Example
///
/// ```
/// use std::sync::LazyLock;
/// use entity_search_shared::{Entity, FieldAccessors, FieldKind, Value};
///
/// #[derive(Clone, Default)]
/// struct Note {
///     id: Option<i64>,
///     title: String,
/// }
///
/// static NOTE_FIELDS: LazyLock<FieldAccessors<Note>> = LazyLock::new(|| {
///     FieldAccessors::new().field_with_setter(
///         "title",
///         FieldKind::Text,
///         |n: &Note| Value::from(&n.title),
///         |n: &mut Note, v| n.title = v.to_string(),
///     )
/// });
///
/// impl Entity for Note {
///     fn kind() -> &'static str {
///         "Note"
///     }
///     fn id(&self) -> Option<i64> {
///         self.id
///     }
///     fn set_id(&mut self, id: i64) {
///         self.id = Some(id);
///     }
///     fn accessors() -> &'static FieldAccessors<Self> {
///         &NOTE_FIELDS
///     }
/// }
/// ```
pub trait Entity: Clone + Default + Send + Sync + 'static {
    /// Name of the entity type. It also names the type's search index.
    fn kind() -> &'static str;

    /// The store-assigned surrogate id, if the entity has been saved.
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    /// The property registry for this type, built once.
    fn accessors() -> &'static FieldAccessors<Self>;
}

/// Declared type of a registered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Bool,
    Date,
    Timestamp,
    GeoPoint,
    List,
}

impl FieldKind {
    /// Numeric fields sort with a numeric default instead of an empty string.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Float)
    }
}

type Getter<E> = Box<dyn Fn(&E) -> Value + Send + Sync>;
type Setter<E> = Box<dyn Fn(&mut E, Value) + Send + Sync>;

/// One named property of an entity type.
pub struct FieldAccessor<E> {
    name: String,
    encoded_name: String,
    kind: FieldKind,
    getter: Getter<E>,
    setter: Option<Setter<E>>,
}

impl<E> FieldAccessor<E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name as it appears in the search index.
    pub fn encoded_name(&self) -> &str {
        &self.encoded_name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub fn read(&self, entity: &E) -> Value {
        (self.getter)(entity)
    }

    /// Assigns the value and returns `false` if the field has no setter.
    pub fn write(&self, entity: &mut E, value: Value) -> bool {
        match &self.setter {
            Some(setter) => {
                setter(entity, value);
                true
            }
            None => false,
        }
    }
}

impl<E> fmt::Debug for FieldAccessor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("name", &self.name)
            .field("encoded_name", &self.encoded_name)
            .field("kind", &self.kind)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Registry of an entity type's properties, looked up by name.
///
/// Names may be dotted paths into nested values (`dimensions.weight`). A
/// lookup accepts either the registered name or its index form with `.`
/// replaced by `_`. When two registrations share an index form, the first one
/// wins.
pub struct FieldAccessors<E> {
    fields: Vec<FieldAccessor<E>>,
}

impl<E> FieldAccessors<E> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Registers a read-only field.
    pub fn field<G>(self, name: &str, kind: FieldKind, getter: G) -> Self
    where
        G: Fn(&E) -> Value + Send + Sync + 'static,
    {
        self.register(name, kind, Box::new(getter), None)
    }

    /// Registers a field that search results can write back.
    pub fn field_with_setter<G, S>(self, name: &str, kind: FieldKind, getter: G, setter: S) -> Self
    where
        G: Fn(&E) -> Value + Send + Sync + 'static,
        S: Fn(&mut E, Value) + Send + Sync + 'static,
    {
        self.register(name, kind, Box::new(getter), Some(Box::new(setter)))
    }

    fn register(
        mut self,
        name: &str,
        kind: FieldKind,
        getter: Getter<E>,
        setter: Option<Setter<E>>,
    ) -> Self {
        let encoded_name = encode_field_name(name);
        if let Some(existing) = self
            .fields
            .iter()
            .find(|f| f.name == name || f.encoded_name == encoded_name)
        {
            warn!(
                field = %name,
                existing = %existing.name,
                encoded = %encoded_name,
                "Field collides with an earlier registration; keeping the first"
            );
        }
        self.fields.push(FieldAccessor {
            name: name.to_string(),
            encoded_name,
            kind,
            getter,
            setter,
        });
        self
    }

    /// Finds a field by registered name first, then by its encoded form.
    pub fn get(&self, name: &str) -> Option<&FieldAccessor<E>> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.fields.iter().find(|f| f.encoded_name == name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.get(name).map(FieldAccessor::kind)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldAccessor<E>> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reads a field; unknown names yield `None`.
    pub fn read(&self, entity: &E, name: &str) -> Option<Value> {
        self.get(name).map(|f| f.read(entity))
    }

    /// Writes a field; unknown or read-only names are skipped and return `false`.
    pub fn write(&self, entity: &mut E, name: &str, value: Value) -> bool {
        self.get(name).is_some_and(|f| f.write(entity, value))
    }
}

impl<E> Default for FieldAccessors<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for FieldAccessors<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.iter()).finish()
    }
}
