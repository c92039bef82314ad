use modkit_grid::{Error, GridQuery, SortDir, SortKey};
use sea_orm::{ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect};

use crate::condition::filter_to_condition;
use crate::{CustomFilters, FieldMap};

pub trait GridFilterExt<E: EntityTrait>: Sized {
    /// Apply the grid filter model of `query`.
    ///
    /// Columns with a custom hook go through the hook; all others are
    /// translated with [`filter_to_condition`] and AND-ed. When a standard
    /// restriction was added the select is made `DISTINCT`, since mapped
    /// columns may come from joined tables.
    ///
    /// # Errors
    /// Returns `Error::UnknownField` / `Error::TypeMismatch` for standard
    /// columns, or whatever a custom hook returns.
    fn apply_grid_filter(
        self,
        query: &GridQuery,
        fmap: &FieldMap<E>,
        custom: &CustomFilters<E>,
    ) -> Result<Self, Error>;
}

impl<E> GridFilterExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn apply_grid_filter(
        self,
        query: &GridQuery,
        fmap: &FieldMap<E>,
        custom: &CustomFilters<E>,
    ) -> Result<Self, Error> {
        let Some(model) = query.filter.as_ref() else {
            return Ok(self);
        };

        let mut s = self;
        for entry in model.iter().filter(|e| custom.handles(&e.column)) {
            s = custom.apply(&entry.column, &entry.raw, query, s)?;
        }

        match filter_to_condition(model, fmap, |column| custom.handles(column))? {
            Some(cond) => Ok(s.filter(cond).distinct()),
            None => Ok(s),
        }
    }
}

pub trait GridOrderExt<E: EntityTrait>: Sized {
    /// Apply sort keys in order.
    ///
    /// # Errors
    /// Returns `Error::UnknownField` if a key is not mapped.
    fn apply_grid_order(self, keys: &[SortKey], fmap: &FieldMap<E>) -> Result<Self, Error>;
}

impl<E> GridOrderExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn apply_grid_order(self, keys: &[SortKey], fmap: &FieldMap<E>) -> Result<Self, Error> {
        let mut s = self;
        for key in keys {
            let col = fmap.resolve(&key.field)?.col;
            let ord = match key.dir {
                SortDir::Asc => Order::Asc,
                SortDir::Desc => Order::Desc,
            };
            s = s.order_by(col, ord);
        }
        Ok(s)
    }
}
