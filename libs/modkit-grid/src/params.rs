//! Raw grid query parameters and the parsed [`GridQuery`].

use serde::Deserialize;

use crate::filter::FilterModel;
use crate::limits::GridLimits;
use crate::page::{PageRequest, RowRange};
use crate::sort::{parse_sort_model, SortKey};
use crate::Error;

/// Value of the `format` parameter that selects the grid envelope renderer.
pub const FORMAT_AGGRID: &str = "aggrid";

/// Query-string parameters understood by the grid adapter.
///
/// Numbers are kept as strings so a malformed `startRow` degrades to the
/// fallback pagination instead of failing the whole request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridParams {
    pub format: Option<String>,
    pub filter: Option<String>,
    pub sort: Option<String>,
    #[serde(rename = "startRow")]
    pub start_row: Option<String>,
    #[serde(rename = "endRow")]
    pub end_row: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl GridParams {
    /// Collect from raw query pairs. A repeated key keeps its last value;
    /// unrelated keys are ignored.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "format" => &mut params.format,
                "filter" => &mut params.filter,
                "sort" => &mut params.sort,
                "startRow" => &mut params.start_row,
                "endRow" => &mut params.end_row,
                "page" => &mut params.page,
                "page_size" => &mut params.page_size,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        params
    }

    /// `format=aggrid` (case-insensitive).
    #[must_use]
    pub fn wants_grid_format(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case(FORMAT_AGGRID))
    }

    /// The request targets the grid adapter: either the grid format was
    /// asked for or any grid parameter is present.
    #[must_use]
    pub fn is_grid_request(&self) -> bool {
        self.wants_grid_format()
            || self.filter.is_some()
            || self.sort.is_some()
            || self.start_row.is_some()
            || self.end_row.is_some()
    }

    /// `startRow`/`endRow` window; both must be present and parse as
    /// non-negative integers.
    ///
    /// # Errors
    /// Returns `Error::InvalidRange` when a bound is present but unparsable.
    pub fn try_row_range(&self) -> Result<Option<RowRange>, Error> {
        let (Some(start), Some(end)) = (self.start_row.as_deref(), self.end_row.as_deref()) else {
            return Ok(None);
        };
        let start = parse_u64("startRow", start)?;
        let end = parse_u64("endRow", end)?;
        Ok(Some(RowRange::new(start, end)))
    }

    /// Lenient form of [`GridParams::try_row_range`]: unparsable bounds mean no range.
    #[must_use]
    pub fn row_range(&self) -> Option<RowRange> {
        self.try_row_range().ok().flatten()
    }

    /// Page-number fallback: `page` defaults to 1, `page_size` to the configured default.
    #[must_use]
    pub fn page_request(&self, limits: &GridLimits) -> PageRequest {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u64>().ok())
            .unwrap_or(1);
        let size = self
            .page_size
            .as_deref()
            .and_then(|s| s.trim().parse::<u64>().ok());
        PageRequest::new(page, limits.clamp_page_size(size))
    }
}

fn parse_u64(name: &str, raw: &str) -> Result<u64, Error> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| Error::InvalidRange(format!("{name} must be a non-negative integer, got '{raw}'")))
}

/// Grid column ids use dots for related fields (`event_type.name`); ORM
/// paths use double underscores (`event_type__name`).
#[must_use]
pub fn convert_field_name(name: &str) -> String {
    name.replace('.', "__")
}

/// Parsed grid query.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct GridQuery {
    /// `format=aggrid` was requested: the renderer builds the envelope.
    pub grid_format: bool,
    /// Any grid parameter was present.
    pub grid_request: bool,
    pub filter: Option<FilterModel>,
    pub sort: Vec<SortKey>,
    pub range: Option<RowRange>,
    /// Used only when `range` is absent.
    pub page: Option<PageRequest>,
}

impl GridQuery {
    pub fn new() -> Self {
        Self {
            grid_request: true,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: FilterModel) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_sort(mut self, sort: Vec<SortKey>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_range(mut self, range: RowRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_grid_format(mut self, on: bool) -> Self {
        self.grid_format = on;
        self
    }

    /// Parse all grid parameters.
    ///
    /// In lenient mode (the default) malformed `filter` / `sort` JSON and
    /// unparsable row bounds are logged and ignored. With `limits.strict`
    /// they are returned as errors.
    ///
    /// # Errors
    /// Returns `Error::InvalidFilter`, `Error::InvalidSort` or
    /// `Error::InvalidRange` in strict mode.
    pub fn from_params(params: &GridParams, limits: &GridLimits) -> Result<Self, Error> {
        let mut query = GridQuery {
            grid_format: params.wants_grid_format(),
            grid_request: params.is_grid_request(),
            ..GridQuery::default()
        };
        if !query.grid_request {
            return Ok(query);
        }

        if let Some(raw) = params.filter.as_deref() {
            query.filter = lenient(limits, "filter", parse_filter(raw, limits))?.flatten();
        }

        if let Some(raw) = params.sort.as_deref() {
            let mut keys = lenient(limits, "sort", parse_sort_model(raw))?
                .flatten()
                .unwrap_or_default();
            if keys.len() > limits.max_sort_fields {
                if limits.strict {
                    return Err(Error::InvalidSort(format!(
                        "at most {} sort fields are allowed",
                        limits.max_sort_fields
                    )));
                }
                tracing::warn!(
                    requested = keys.len(),
                    max = limits.max_sort_fields,
                    "truncating grid sort model"
                );
                keys.truncate(limits.max_sort_fields);
            }
            query.sort = keys;
        }

        query.range = lenient(limits, "row range", params.try_row_range())?.flatten();
        if query.range.is_none() {
            query.page = Some(params.page_request(limits));
        }

        tracing::debug!(
            grid_format = query.grid_format,
            filters = query.filter.as_ref().map_or(0, FilterModel::len),
            sort_keys = query.sort.len(),
            range = ?query.range,
            "parsed grid query"
        );

        Ok(query)
    }
}

fn parse_filter(raw: &str, limits: &GridLimits) -> Result<Option<FilterModel>, Error> {
    limits.validate_filter(raw)?;
    FilterModel::parse(raw)
}

/// Strict mode propagates, lenient mode logs and yields `None`.
fn lenient<T>(limits: &GridLimits, what: &str, res: Result<T, Error>) -> Result<Option<T>, Error> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(e) if limits.strict => Err(e),
        Err(e) => {
            tracing::warn!(param = what, error = %e, "ignoring malformed grid parameter");
            Ok(None)
        }
    }
}
