use std::ops::Deref;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::StatusCode;
use modkit_grid::{GridLimits, GridParams, GridQuery, Problem};

use crate::grid_error_to_problem;

/// Parse grid parameters from the query string.
///
/// Limits come from a `GridLimits` request extension
/// (`.layer(Extension(limits))`), defaulting to `GridLimits::default()`.
/// A key given more than once keeps its last value. An undecodable query
/// string counts as "no grid parameters" unless the limits are strict.
///
/// # Errors
/// Returns a 422 `Problem` for malformed parameters when the limits are strict.
pub async fn extract_grid_query<S>(parts: &mut Parts, state: &S) -> Result<GridQuery, Problem>
where
    S: Send + Sync,
{
    let limits = parts
        .extensions
        .get::<GridLimits>()
        .cloned()
        .unwrap_or_default();

    let params = match Query::<Vec<(String, String)>>::from_request_parts(parts, state).await {
        Ok(Query(pairs)) => GridParams::from_pairs(pairs),
        Err(rejection) if limits.strict => {
            return Err(Problem::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid Query",
                rejection.body_text(),
            )
            .with_code("grid.invalid_query")
            .with_instance(parts.uri.path()));
        }
        Err(rejection) => {
            tracing::warn!(error = %rejection, "ignoring undecodable grid query string");
            GridParams::default()
        }
    };

    GridQuery::from_params(&params, &limits)
        .map_err(|e| grid_error_to_problem(&e, parts.uri.path(), None))
}

/// Extractor for grid query parameters.
///
/// ```ignore
/// async fn list(AgGrid(q): AgGrid) -> impl IntoResponse { /* ... */ }
/// ```
#[derive(Debug, Clone)]
pub struct AgGrid(pub GridQuery);

impl AgGrid {
    #[inline]
    pub fn into_inner(self) -> GridQuery {
        self.0
    }
}

impl Deref for AgGrid {
    type Target = GridQuery;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<GridQuery> for AgGrid {
    #[inline]
    fn as_ref(&self) -> &GridQuery {
        &self.0
    }
}

impl From<AgGrid> for GridQuery {
    #[inline]
    fn from(x: AgGrid) -> Self {
        x.0
    }
}

impl<S> FromRequestParts<S> for AgGrid
where
    S: Send + Sync,
{
    type Rejection = Problem;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let query = extract_grid_query(parts, state).await?;
            Ok(AgGrid(query))
        }
    }
}
