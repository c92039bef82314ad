//! Per-column filter hooks that bypass the standard translation.
//!
//! A hook owns its column: it receives the undecoded condition and returns
//! the query with whatever restriction it wants applied.
//!
//! ```ignore
//! let custom = CustomFilters::<event::Entity>::new().on("tag", |ctx, select| {
//!     let wanted = ctx.condition["filter"].as_str().unwrap_or_default().to_owned();
//!     Ok(select.filter(event::Column::Tags.contains(wanted)))
//! });
//! ```

use std::collections::HashMap;
use std::fmt;

use modkit_grid::{convert_field_name, Error, GridQuery};
use sea_orm::{EntityTrait, Select};
use serde_json::Value;

/// What a hook gets to see.
pub struct CustomFilterCtx<'a> {
    /// Column id in ORM path form (`event_type__name`).
    pub field: String,
    /// The raw column condition from the filter model.
    pub condition: &'a Value,
    /// The whole parsed request.
    pub query: &'a GridQuery,
}

type Hook<E> =
    Box<dyn Fn(&CustomFilterCtx<'_>, Select<E>) -> Result<Select<E>, Error> + Send + Sync>;

#[must_use]
pub struct CustomFilters<E: EntityTrait> {
    hooks: HashMap<String, Hook<E>>,
}

impl<E: EntityTrait> Default for CustomFilters<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> fmt::Debug for CustomFilters<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFilters")
            .field("columns", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<E: EntityTrait> CustomFilters<E> {
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    /// Register a hook for a column. `column` may be the grid id
    /// (`event_type.name`) or the ORM path (`event_type__name`).
    pub fn on<F>(mut self, column: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&CustomFilterCtx<'_>, Select<E>) -> Result<Select<E>, Error> + Send + Sync + 'static,
    {
        self.hooks.insert(column.into(), Box::new(hook));
        self
    }

    /// Exact grid id first, then the ORM path.
    fn hook(&self, column: &str) -> Option<&Hook<E>> {
        self.hooks
            .get(column)
            .or_else(|| self.hooks.get(&convert_field_name(column)))
    }

    #[must_use]
    pub fn handles(&self, column: &str) -> bool {
        self.hook(column).is_some()
    }

    /// Run the hook registered for `column`, if any.
    ///
    /// # Errors
    /// Whatever the hook returns.
    pub fn apply(
        &self,
        column: &str,
        condition: &Value,
        query: &GridQuery,
        select: Select<E>,
    ) -> Result<Select<E>, Error> {
        match self.hook(column) {
            Some(hook) => {
                let ctx = CustomFilterCtx {
                    field: convert_field_name(column),
                    condition,
                    query,
                };
                tracing::trace!(column, "applying custom grid filter");
                hook(&ctx, select)
            }
            None => Ok(select),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    mod ent {
        use sea_orm::entity::prelude::*;

        #[derive(Debug, Clone, PartialEq, DeriveEntityModel)]
        #[sea_orm(table_name = "items")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i64,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    #[test]
    fn lookup_by_grid_id_or_orm_path() {
        let custom = CustomFilters::<ent::Entity>::new()
            .on("owner__name", |_, s| Ok(s))
            .on("tag", |_, s| Ok(s));
        assert!(custom.handles("owner.name"));
        assert!(custom.handles("owner__name"));
        assert!(custom.handles("tag"));
        assert!(!custom.handles("other"));
    }

    #[test]
    fn hook_sees_orm_field_and_raw_condition() {
        use std::sync::{Arc, Mutex};

        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let custom = CustomFilters::<ent::Entity>::new().on("owner.name", move |ctx, s| {
            *sink.lock().unwrap() = Some((ctx.field.clone(), ctx.condition.clone()));
            Ok(s)
        });

        let cond = serde_json::json!({"filterType": "text", "type": "equals", "filter": "x"});
        custom
            .apply("owner.name", &cond, &GridQuery::new(), ent::Entity::find())
            .unwrap();

        let (field, raw) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(field, "owner__name");
        assert_eq!(raw, cond);
    }

    #[test]
    fn hook_errors_propagate() {
        let custom = CustomFilters::<ent::Entity>::new()
            .on("tag", |_, _| Err(Error::InvalidFilter("bad tag".to_owned())));
        let err = custom
            .apply("tag", &Value::Null, &GridQuery::new(), ent::Entity::find())
            .unwrap_err();
        assert_eq!(err, Error::InvalidFilter("bad tag".to_owned()));
    }
}
