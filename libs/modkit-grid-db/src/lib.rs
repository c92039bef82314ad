#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Data-grid queries on top of `SeaORM`.
//!
//! This crate consumes an already parsed [`modkit_grid::GridQuery`] and
//! turns it into `SeaORM` calls:
//! - `condition`: filter model → `sea_orm::Condition`
//! - `ext`: extension traits applying filters (with custom hooks) and ordering to a `Select<E>`
//! - `pager`: count → filter → count → order → window, returning a [`modkit_grid::GridPage`]
//!
//! Columns are exposed through a [`FieldMap`]; anything not mapped cannot be
//! filtered or sorted on.

pub mod coerce;
pub mod condition;
pub mod custom;
pub mod ext;
pub mod field_map;
pub mod kind;
pub mod pager;

pub use condition::{column_condition, filter_to_condition};
pub use custom::{CustomFilterCtx, CustomFilters};
pub use ext::{GridFilterExt, GridOrderExt};
pub use field_map::{Field, FieldMap};
pub use kind::FieldKind;
pub use pager::{paginate_grid, GridPager};
