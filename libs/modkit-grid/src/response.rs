use serde::{Deserialize, Serialize};

use crate::page::GridCounts;

/// The envelope grid clients expect from a server-side data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse<T> {
    /// Rows matching the filters (not just the rows in this window).
    pub row_count: u64,
    /// Rows in the unfiltered base query.
    pub total_count: u64,
    pub rows: Vec<T>,
}

impl<T> GridResponse<T> {
    #[must_use]
    pub fn new(rows: Vec<T>, counts: GridCounts) -> Self {
        Self {
            row_count: counts.filtered,
            total_count: counts.total,
            rows,
        }
    }

    #[must_use]
    pub fn counts(&self) -> GridCounts {
        GridCounts::new(self.total_count, self.row_count)
    }
}

/// Result of the paginated-response step.
///
/// With `format=aggrid` the renderer owns the envelope, so the rows go out
/// untouched; otherwise they are wrapped here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PaginatedResponse<T> {
    Raw(Vec<T>),
    Envelope(GridResponse<T>),
}

pub fn paginated_response<T>(
    rows: Vec<T>,
    counts: GridCounts,
    grid_format: bool,
) -> PaginatedResponse<T> {
    if grid_format {
        PaginatedResponse::Raw(rows)
    } else {
        PaginatedResponse::Envelope(GridResponse::new(rows, counts))
    }
}
