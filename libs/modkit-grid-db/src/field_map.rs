use std::collections::HashMap;

use modkit_grid::{convert_field_name, Error};
use sea_orm::EntityTrait;

use crate::FieldKind;

#[derive(Clone)]
pub struct Field<E: EntityTrait> {
    pub col: E::Column,
    pub kind: FieldKind,
}

/// Grid-visible fields of an entity.
///
/// Names are stored in ORM path form and matched case-insensitively, so
/// `eventType.name`, `eventtype__name` and `EVENTTYPE.NAME` all resolve to
/// the same entry.
///
/// ```ignore
/// let fmap = FieldMap::<event::Entity>::new()
///     .insert("id", event::Column::Id, FieldKind::I64)
///     .insert("event_type.name", event::Column::TypeName, FieldKind::String)
///     .insert("created_at", event::Column::CreatedAt, FieldKind::DateTimeUtc);
/// ```
#[derive(Clone)]
#[must_use]
pub struct FieldMap<E: EntityTrait> {
    map: HashMap<String, Field<E>>,
}

impl<E: EntityTrait> Default for FieldMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, api_name: impl AsRef<str>, col: E::Column, kind: FieldKind) -> Self {
        self.map.insert(key(api_name.as_ref()), Field { col, kind });
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field<E>> {
        self.map.get(&key(name))
    }

    /// # Errors
    /// Returns `Error::UnknownField` if `name` is not mapped.
    pub fn resolve(&self, name: &str) -> Result<&Field<E>, Error> {
        self.get(name)
            .ok_or_else(|| Error::UnknownField(name.to_owned()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn key(name: &str) -> String {
    convert_field_name(name).to_lowercase()
}
