#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! axum glue for data-grid endpoints.
//!
//! ```ignore
//! async fn list_events(
//!     State(db): State<DatabaseConnection>,
//!     AgGrid(q): AgGrid,
//! ) -> Result<GridJson<EventDto>, Problem> {
//!     let page = GridPager::<event::Entity, _>::new(&db, &event_fields())
//!         .fetch(&q, EventDto::from)
//!         .await
//!         .map_err(|e| grid_error_to_problem(&e, "/events", None))?;
//!     Ok(GridJson::new(page, &q))
//! }
//!
//! let app = Router::new()
//!     .route("/events", get(list_events))
//!     .layer(Extension(GridLimits::default().strict(true)));
//! ```

pub mod error;
pub mod extract;
pub mod response;

pub use error::grid_error_to_problem;
pub use extract::{extract_grid_query, AgGrid};
pub use response::{GridJson, Rendered};
