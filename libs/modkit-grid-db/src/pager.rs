//! Count, filter, order and window a select for one grid request.
//!
//! ```ignore
//! use modkit_grid::{GridLimits, GridQuery};
//! use modkit_grid_db::{FieldKind, FieldMap, GridPager};
//!
//! fn event_fields() -> FieldMap<event::Entity> {
//!     FieldMap::new()
//!         .insert("id", event::Column::Id, FieldKind::I64)
//!         .insert("name", event::Column::Name, FieldKind::String)
//!         .insert("created_at", event::Column::CreatedAt, FieldKind::DateTimeUtc)
//! }
//!
//! pub async fn list_events(
//!     conn: &DatabaseConnection,
//!     q: &GridQuery,
//! ) -> Result<GridPage<EventDto>, modkit_grid::Error> {
//!     GridPager::<event::Entity, _>::new(conn, &event_fields())
//!         .limits(GridLimits::default().with_default_page_size(50))
//!         .fetch(q, EventDto::from)
//!         .await
//! }
//! ```
//!
//! `totalCount` is taken from the base select, before any grid filter;
//! `rowCount` after the filters. A row range starting at or past the
//! filtered count yields an empty page without touching the rows; the sort
//! model is still checked against the field map first.

use modkit_grid::{Error, GridCounts, GridLimits, GridPage, GridQuery, PageRequest};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, PaginatorTrait,
    QuerySelect, Select,
};

use crate::ext::{GridFilterExt, GridOrderExt};
use crate::{CustomFilters, FieldMap};

fn db_err(e: DbErr) -> Error {
    Error::Db(e.to_string())
}

/// Run a grid request against `select`.
///
/// # Errors
/// Returns query-building errors from the filter and sort model, or
/// `Error::Db` when the database fails.
pub async fn paginate_grid<E, D, F, C>(
    select: Select<E>,
    conn: &C,
    q: &GridQuery,
    fmap: &FieldMap<E>,
    custom: &CustomFilters<E>,
    limits: &GridLimits,
    model_to_domain: F,
) -> Result<GridPage<D>, Error>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    E::Model: FromQueryResult + Send + Sync,
    F: Fn(E::Model) -> D,
    C: ConnectionTrait + Send + Sync,
{
    let total = select.clone().count(conn).await.map_err(db_err)?;

    let filtered_select = select.apply_grid_filter(q, fmap, custom)?;
    let ordered = filtered_select.clone().apply_grid_order(&q.sort, fmap)?;
    let filtered = if q.filter.is_some() {
        filtered_select.count(conn).await.map_err(db_err)?
    } else {
        total
    };
    let counts = GridCounts::new(total, filtered);

    let range = match (q.range, q.page) {
        (Some(range), _) => range,
        (None, Some(page)) => page.as_range(),
        (None, None) => PageRequest::new(1, limits.default_page_size).as_range(),
    };
    let Some((start, end)) = range.bounds(filtered) else {
        tracing::debug!(
            total,
            filtered,
            start = range.start,
            "grid window past end of data"
        );
        return Ok(GridPage::empty(counts));
    };

    let rows = ordered
        .offset(start)
        .limit(end - start)
        .all(conn)
        .await
        .map_err(db_err)?;

    tracing::debug!(total, filtered, start, end, rows = rows.len(), "grid page fetched");

    Ok(GridPage::new(
        rows.into_iter().map(model_to_domain).collect(),
        counts,
    ))
}

/// Fluent front-end for [`paginate_grid`].
///
/// Defaults: base select `E::find()`, no custom filters, `GridLimits::default()`.
#[must_use]
pub struct GridPager<'a, E, C>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    C: ConnectionTrait + Send + Sync,
{
    conn: &'a C,
    fmap: &'a FieldMap<E>,
    select: Option<Select<E>>,
    custom: Option<&'a CustomFilters<E>>,
    limits: GridLimits,
}

impl<'a, E, C> GridPager<'a, E, C>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: &'a C, fmap: &'a FieldMap<E>) -> Self {
        Self {
            conn,
            fmap,
            select: None,
            custom: None,
            limits: GridLimits::default(),
        }
    }

    /// Start from a pre-scoped select instead of `E::find()`.
    pub fn select(mut self, select: Select<E>) -> Self {
        self.select = Some(select);
        self
    }

    pub fn custom_filters(mut self, custom: &'a CustomFilters<E>) -> Self {
        self.custom = Some(custom);
        self
    }

    pub fn limits(mut self, limits: GridLimits) -> Self {
        self.limits = limits;
        self
    }

    /// # Errors
    /// See [`paginate_grid`].
    pub async fn fetch<D, F>(self, q: &GridQuery, map: F) -> Result<GridPage<D>, Error>
    where
        E::Model: FromQueryResult + Send + Sync,
        F: Fn(E::Model) -> D,
    {
        let none = CustomFilters::new();
        let select = self.select.unwrap_or_else(E::find);
        paginate_grid(
            select,
            self.conn,
            q,
            self.fmap,
            self.custom.unwrap_or(&none),
            &self.limits,
            map,
        )
        .await
    }
}
