//! Reshape arbitrary JSON payloads into the grid envelope.
//!
//! Handlers that already return a [`GridResponse`](crate::GridResponse) need
//! none of this. The renderer exists for endpoints that hand back a bare list
//! or a `{ "count", "results" }` page and are asked for `format=aggrid`.

use serde_json::{json, Value};

use crate::page::{GridCounts, RowRange};

const ENVELOPE_KEYS: [&str; 3] = ["rows", "rowCount", "totalCount"];

/// What the renderer knows about the request that produced the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// Counts recorded by the filtering step, if it ran.
    pub counts: Option<GridCounts>,
    /// `startRow`/`endRow` from the request.
    pub range: Option<RowRange>,
    /// A pager already windowed the rows; do not slice again.
    pub paginated: bool,
}

impl RenderContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_counts(mut self, counts: GridCounts) -> Self {
        self.counts = Some(counts);
        self
    }

    #[must_use]
    pub fn with_range(mut self, range: RowRange) -> Self {
        self.range = Some(range);
        self
    }

    #[must_use]
    pub fn paginated(mut self, paginated: bool) -> Self {
        self.paginated = paginated;
        self
    }
}

/// `true` if the payload already is a grid envelope.
#[must_use]
pub fn is_envelope(payload: &Value) -> bool {
    payload
        .as_object()
        .is_some_and(|obj| ENVELOPE_KEYS.iter().all(|k| obj.contains_key(*k)))
}

/// Wrap `payload` into `{ rowCount, totalCount, rows }`.
///
/// * an existing envelope passes through untouched;
/// * a list becomes `rows`, its length the row count when none was recorded;
/// * a `{ "results": [...] }` page takes its counts from `count` /
///   `total_count`;
/// * anything else is used as `rows` verbatim.
///
/// When no pager ran and the request carried a row range, array rows are
/// windowed here; strings, objects and scalars are never sliced. A start
/// past the end leaves the rows as they are.
#[must_use]
pub fn render(payload: Value, ctx: &RenderContext) -> Value {
    if is_envelope(&payload) {
        return payload;
    }

    let counts = ctx.counts.unwrap_or_default();
    let mut total = counts.total;
    let mut filtered = counts.filtered;

    let mut rows = match payload {
        Value::Object(mut obj) if obj.contains_key("results") => {
            let results = obj.remove("results").unwrap_or(Value::Null);
            if let Some(count) = obj.get("count").and_then(Value::as_u64) {
                filtered = count;
                total = obj
                    .get("total_count")
                    .and_then(Value::as_u64)
                    .unwrap_or(count);
            }
            results
        }
        other => {
            if filtered == 0 {
                filtered = value_len(&other);
            }
            other
        }
    };

    if !ctx.paginated {
        if let (Some(range), Value::Array(items)) = (ctx.range, &mut rows) {
            let len = items.len() as u64;
            if range.start < len {
                tracing::debug!(
                    start = range.start,
                    end = range.end,
                    rows = len,
                    "renderer windowing rows"
                );
                let window = range.slice(items).to_vec();
                *items = window;
            }
        }
    }

    tracing::debug!(total, filtered, "rendered grid envelope");

    json!({
        "rowCount": filtered,
        "totalCount": total,
        "rows": rows,
    })
}

/// Length of a JSON value the way a generic collection would report it.
fn value_len(v: &Value) -> u64 {
    let len = match v {
        Value::Array(a) => a.len(),
        Value::Object(o) => o.len(),
        Value::String(s) => s.chars().count(),
        Value::Null | Value::Bool(_) | Value::Number(_) => 0,
    };
    len as u64
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn items() -> Value {
        json!(["item1", "item2", "item3", "item4", "item5"])
    }

    #[test]
    fn existing_envelope_passes_through() {
        let data = json!({"rows": ["a"], "rowCount": 3, "totalCount": 10, "extra": true});
        assert_eq!(render(data.clone(), &RenderContext::new()), data);
    }

    #[test]
    fn empty_list() {
        assert_eq!(
            render(json!([]), &RenderContext::new()),
            json!({"rowCount": 0, "totalCount": 0, "rows": []})
        );
    }

    #[test]
    fn list_uses_recorded_counts() {
        let ctx = RenderContext::new().with_counts(GridCounts::new(10, 3));
        let out = render(json!(["a", "b", "c"]), &ctx);
        assert_eq!(out["rowCount"], 3);
        assert_eq!(out["totalCount"], 10);
    }

    #[test]
    fn list_without_counts_reports_its_length() {
        let out = render(json!(["a", "b", "c"]), &RenderContext::new());
        assert_eq!(out["rowCount"], 3);
        assert_eq!(out["totalCount"], 0);
    }

    #[test]
    fn string_payload_reports_char_length() {
        let out = render(json!("test"), &RenderContext::new());
        assert_eq!(out, json!({"rowCount": 4, "totalCount": 0, "rows": "test"}));
    }

    #[test]
    fn results_page_takes_its_counts() {
        let out = render(
            json!({"count": 5, "total_count": 10, "results": [1, 2, 3, 4, 5]}),
            &RenderContext::new(),
        );
        assert_eq!(out, json!({"rowCount": 5, "totalCount": 10, "rows": [1, 2, 3, 4, 5]}));

        let out = render(json!({"count": 2, "results": [1, 2]}), &RenderContext::new());
        assert_eq!(out["totalCount"], 2);
    }

    #[test]
    fn object_without_results_is_used_verbatim() {
        let data = json!({"count": 5, "total_count": 10, "items": [1, 2]});
        let out = render(data.clone(), &RenderContext::new());
        assert_eq!(out["rows"], data);
        assert_eq!(out["rowCount"], 3);
    }

    #[test]
    fn windows_rows_without_a_pager() {
        let ctx = RenderContext::new().with_range(RowRange::new(1, 3));
        let out = render(items(), &ctx);
        assert_eq!(out["rows"], json!(["item2", "item3"]));
        assert_eq!(out["rowCount"], 5);
        assert_eq!(out["totalCount"], 0);
    }

    #[test]
    fn paginated_rows_are_not_windowed_again() {
        let ctx = RenderContext::new()
            .with_range(RowRange::new(1, 3))
            .paginated(true);
        let out = render(items(), &ctx);
        assert_eq!(out["rows"], items());
    }

    #[test]
    fn only_array_rows_are_windowed() {
        let ctx = RenderContext::new().with_range(RowRange::new(1, 2));
        let out = render(json!("abcdef"), &ctx);
        assert_eq!(out["rows"], json!("abcdef"));
        assert_eq!(out["rowCount"], 6);

        let data = json!({"a": 1, "b": 2, "c": 3});
        let out = render(data.clone(), &ctx);
        assert_eq!(out["rows"], data);
    }

    #[test]
    fn start_past_end_keeps_rows() {
        let ctx = RenderContext::new().with_range(RowRange::new(10, 20));
        let out = render(items(), &ctx);
        assert_eq!(out["rows"], items());
    }
}
