//! Sort model: `[{"colId": "event_type.name", "sort": "desc"}, ...]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::convert_field_name;
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

/// One ordering key, field name already in ORM path form (`a__b`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub dir: SortDir,
}

impl SortKey {
    pub fn new(field: impl Into<String>, dir: SortDir) -> Self {
        Self {
            field: field.into(),
            dir,
        }
    }

    /// Render as an ordering token: `field` or `-field`.
    #[must_use]
    pub fn to_token(&self) -> String {
        match self.dir {
            SortDir::Asc => self.field.clone(),
            SortDir::Desc => format!("-{}", self.field),
        }
    }
}

/// Parse the raw `sort` parameter.
///
/// Blank input, `null` and non-array JSON mean "no sort".
///
/// # Errors
/// Returns `Error::InvalidSort` when the parameter is not valid JSON.
pub fn parse_sort_model(raw: &str) -> Result<Option<Vec<SortKey>>, Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: Value =
        serde_json::from_str(raw).map_err(|e| Error::InvalidSort(e.to_string()))?;
    let keys = build_ordering(&value);
    Ok((!keys.is_empty()).then_some(keys))
}

/// Build ordering keys from a decoded sort model.
///
/// `"desc"` sorts descending, any other non-empty direction ascending.
/// Items without a `colId` or `sort` are skipped.
#[must_use]
pub fn build_ordering(model: &Value) -> Vec<SortKey> {
    let Some(items) = model.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let col_id = item.get("colId").and_then(Value::as_str)?;
            let sort = item.get("sort").and_then(Value::as_str)?;
            if col_id.is_empty() || sort.is_empty() {
                return None;
            }
            let dir = if sort == "desc" {
                SortDir::Desc
            } else {
                SortDir::Asc
            };
            Some(SortKey::new(convert_field_name(col_id), dir))
        })
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_tokens_in_order() {
        let keys = build_ordering(&json!([
            {"colId": "name", "sort": "asc"},
            {"colId": "event_type.name", "sort": "desc"}
        ]));
        let tokens: Vec<String> = keys.iter().map(SortKey::to_token).collect();
        assert_eq!(tokens, vec!["name", "-event_type__name"]);
    }

    #[test]
    fn skips_incomplete_items() {
        let keys = build_ordering(&json!([
            {"colId": "name"},
            {"sort": "desc"},
            {"colId": "", "sort": "asc"},
            {"colId": "age", "sort": ""},
            {"colId": "id", "sort": "sideways"}
        ]));
        assert_eq!(keys, vec![SortKey::new("id", SortDir::Asc)]);
    }

    #[test]
    fn blank_null_and_empty_mean_no_sort() {
        assert_eq!(parse_sort_model("").unwrap(), None);
        assert_eq!(parse_sort_model("null").unwrap(), None);
        assert_eq!(parse_sort_model("[]").unwrap(), None);
        assert_eq!(parse_sort_model("{\"colId\":\"a\"}").unwrap(), None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            parse_sort_model("[{\"colId\":"),
            Err(Error::InvalidSort(_))
        ));
    }
}
