#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Transport- and ORM-agnostic model of data-grid queries.
//!
//! A grid client describes what it wants through four query parameters:
//! `filter` (JSON filter model), `sort` (JSON sort model) and the
//! `startRow` / `endRow` pair. Responses go back in a fixed envelope
//! `{ "rowCount", "totalCount", "rows" }`.
//!
//! This crate parses those parameters into [`GridQuery`], describes the
//! envelope ([`GridResponse`]) and reshapes arbitrary JSON payloads into it
//! ([`render::render`]). Translation into SQL lives in `modkit-grid-db`, the
//! axum glue in `modkit-grid-http`.

pub mod error;
pub mod filter;
pub mod limits;
pub mod page;
pub mod params;
pub mod problem;
pub mod render;
pub mod response;
pub mod sort;

pub use error::{Error, Result};
pub use filter::{
    BooleanCondition, ColumnFilter, DateCondition, DateOp, FilterEntry, FilterModel,
    JoinOperator, NumberCondition, NumberOp, SetCondition, TextCondition, TextOp,
};
pub use limits::GridLimits;
pub use page::{GridCounts, GridPage, PageRequest, RowRange};
pub use params::{convert_field_name, GridParams, GridQuery, FORMAT_AGGRID};
pub use problem::Problem;
pub use render::RenderContext;
pub use response::{paginated_response, GridResponse, PaginatedResponse};
pub use sort::{SortDir, SortKey};
