//! Responders producing the `{ rowCount, totalCount, rows }` envelope.

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use modkit_grid::render::{render, RenderContext};
use modkit_grid::{paginated_response, GridPage, GridQuery, PaginatedResponse, Problem};
use serde::Serialize;
use serde_json::Value;

/// A fetched grid page, answered as the envelope.
///
/// With `format=aggrid` the rows are handed to the renderer (already
/// windowed, so it only wraps them); otherwise they are wrapped directly.
/// Either way the client receives the same envelope.
#[derive(Debug, Clone)]
pub struct GridJson<T> {
    pub page: GridPage<T>,
    pub grid_format: bool,
}

impl<T> GridJson<T> {
    pub fn new(page: GridPage<T>, query: &GridQuery) -> Self {
        Self {
            page,
            grid_format: query.grid_format,
        }
    }
}

impl<T: Serialize> IntoResponse for GridJson<T> {
    fn into_response(self) -> Response {
        let counts = self.page.counts;
        match paginated_response(self.page.items, counts, self.grid_format) {
            PaginatedResponse::Envelope(env) => Json(env).into_response(),
            PaginatedResponse::Raw(rows) => match serde_json::to_value(rows) {
                Ok(payload) => {
                    let ctx = RenderContext::new().with_counts(counts).paginated(true);
                    Json(render(payload, &ctx)).into_response()
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize grid rows");
                    Problem::new(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error",
                        "Failed to serialize response",
                    )
                    .with_code("grid.internal")
                    .into_response()
                }
            },
        }
    }
}

/// An arbitrary JSON payload passed through the envelope renderer.
///
/// For endpoints that produce a bare list or a `{ count, results }` page.
/// Without `paginated`, a row range from the query windows list payloads.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub payload: Value,
    pub ctx: RenderContext,
}

impl Rendered {
    pub fn new(payload: Value, query: &GridQuery) -> Self {
        let mut ctx = RenderContext::new();
        if let Some(range) = query.range {
            ctx = ctx.with_range(range);
        }
        Self { payload, ctx }
    }

    #[must_use]
    pub fn with_context(mut self, ctx: RenderContext) -> Self {
        self.ctx = ctx;
        self
    }
}

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        Json(render(self.payload, &self.ctx)).into_response()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use modkit_grid::{GridCounts, RowRange};
    use serde_json::json;

    async fn body(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn both_paths_produce_the_envelope() {
        let expected = json!({"rowCount": 7, "totalCount": 9, "rows": ["a", "b"]});
        for grid_format in [true, false] {
            let page = GridPage::new(vec!["a", "b"], GridCounts::new(9, 7));
            let resp = GridJson { page, grid_format }.into_response();
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(body(resp).await, expected, "grid_format={grid_format}");
        }
    }

    #[tokio::test]
    async fn rendered_windows_unpaginated_lists() {
        let q = GridQuery::new().with_range(RowRange::new(1, 3));
        let resp = Rendered::new(json!([1, 2, 3, 4, 5]), &q).into_response();
        assert_eq!(
            body(resp).await,
            json!({"rowCount": 5, "totalCount": 0, "rows": [2, 3]})
        );
    }

    #[tokio::test]
    async fn rendered_passes_envelopes_through() {
        let env = json!({"rows": [], "rowCount": 3, "totalCount": 4});
        let resp = Rendered::new(env.clone(), &GridQuery::new()).into_response();
        assert_eq!(body(resp).await, env);
    }
}
