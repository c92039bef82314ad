//! Filter model: a JSON object mapping column ids to filter conditions.
//!
//! ```json
//! {
//!   "name":            {"filterType": "text",   "type": "contains", "filter": "ali"},
//!   "age":             {"filterType": "number", "type": "inRange",  "filter": 18, "filterTo": 65},
//!   "created_at":      {"filterType": "date",   "type": "lessThan", "dateFrom": "2024-01-01 00:00:00"},
//!   "event_type.name": {"filterType": "set",    "values": ["login", "logout"]},
//!   "is_active":       {"filterType": "boolean", "filter": true}
//! }
//! ```
//!
//! Parsing is forgiving in the same places the grid is: an unknown
//! `filterType` drops the column, an unknown `type` or a missing value turns
//! the condition into "match everything". Columns are combined with AND.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::params::convert_field_name;
use crate::Error;

/// How the sub-conditions of a combined column filter are joined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinOperator {
    And,
    Or,
}

impl JoinOperator {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("or") {
            JoinOperator::Or
        } else {
            JoinOperator::And
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextOp {
    Equals,
    NotEqual,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Blank,
    NotBlank,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberOp {
    Equals,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    InRange,
    Blank,
    NotBlank,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateOp {
    Equals,
    NotEqual,
    LessThan,
    GreaterThan,
    InRange,
    Blank,
    NotBlank,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TextCondition {
    #[serde(rename = "type", default)]
    pub op: Option<TextOp>,
    #[serde(default)]
    pub filter: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NumberCondition {
    #[serde(rename = "type", default)]
    pub op: Option<NumberOp>,
    #[serde(default)]
    pub filter: Option<Value>,
    #[serde(rename = "filterTo", default)]
    pub filter_to: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DateCondition {
    #[serde(rename = "type", default)]
    pub op: Option<DateOp>,
    #[serde(rename = "dateFrom", default)]
    pub date_from: Option<String>,
    #[serde(rename = "dateTo", default)]
    pub date_to: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SetCondition {
    #[serde(default)]
    pub values: Option<Vec<Value>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BooleanCondition {
    #[serde(default)]
    pub filter: Option<Value>,
}

/// A decoded column condition.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnFilter {
    Text(TextCondition),
    Number(NumberCondition),
    Date(DateCondition),
    Set(SetCondition),
    Boolean(BooleanCondition),
    /// Multi-condition column filter (`operator` + `conditions`).
    Combined {
        operator: JoinOperator,
        conditions: Vec<ColumnFilter>,
    },
}

impl ColumnFilter {
    /// Decode a single column condition. `None` means the column is ignored.
    #[must_use]
    pub fn from_json(raw: &Value) -> Option<Self> {
        Self::decode(raw, None)
    }

    fn decode(raw: &Value, inherited_kind: Option<&str>) -> Option<Self> {
        let obj = raw.as_object()?;
        let kind = obj
            .get("filterType")
            .and_then(Value::as_str)
            .or(inherited_kind)?;

        if let Some(combined) = Self::decode_combined(obj, kind) {
            return Some(combined);
        }

        let decoded = match kind {
            "text" => serde_json::from_value(raw.clone()).map(ColumnFilter::Text),
            "number" => serde_json::from_value(raw.clone()).map(ColumnFilter::Number),
            "date" => serde_json::from_value(raw.clone()).map(ColumnFilter::Date),
            "set" => serde_json::from_value(raw.clone()).map(ColumnFilter::Set),
            "boolean" => serde_json::from_value(raw.clone()).map(ColumnFilter::Boolean),
            other => {
                tracing::debug!(filter_type = other, "ignoring unsupported filterType");
                return None;
            }
        };

        match decoded {
            Ok(filter) => Some(filter),
            Err(e) => {
                tracing::warn!(filter_type = kind, error = %e, "ignoring malformed column filter");
                None
            }
        }
    }

    fn decode_combined(obj: &Map<String, Value>, kind: &str) -> Option<Self> {
        let operator = obj.get("operator").and_then(Value::as_str)?;
        let parts: Vec<&Value> = match obj.get("conditions").and_then(Value::as_array) {
            Some(list) => list.iter().collect(),
            None => ["condition1", "condition2"]
                .iter()
                .filter_map(|k| obj.get(*k))
                .collect(),
        };
        if parts.is_empty() {
            return None;
        }
        let conditions = parts
            .into_iter()
            .filter_map(|part| Self::decode(part, Some(kind)))
            .collect();
        Some(ColumnFilter::Combined {
            operator: JoinOperator::parse(operator),
            conditions,
        })
    }
}

/// One entry of the filter model.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterEntry {
    /// Column id as sent by the grid (`event_type.name`).
    pub column: String,
    /// The undecoded condition, handed to custom filter hooks.
    pub raw: Value,
    /// `None` when the condition has an unsupported `filterType`.
    pub filter: Option<ColumnFilter>,
}

impl FilterEntry {
    /// Column id in ORM path form (`event_type__name`).
    #[must_use]
    pub fn field(&self) -> String {
        convert_field_name(&self.column)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterModel {
    entries: Vec<FilterEntry>,
}

impl FilterModel {
    /// Parse the raw `filter` parameter.
    ///
    /// Blank input, `null`, `{}` and non-object JSON all mean "no filter".
    ///
    /// # Errors
    /// Returns `Error::InvalidFilter` when the parameter is not valid JSON.
    pub fn parse(raw: &str) -> Result<Option<Self>, Error> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let value: Value =
            serde_json::from_str(raw).map_err(|e| Error::InvalidFilter(e.to_string()))?;
        Ok(Self::from_value(value))
    }

    /// Build from an already decoded JSON value.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(map) = value else {
            return None;
        };
        if map.is_empty() {
            return None;
        }
        let entries = map
            .into_iter()
            .map(|(column, raw)| {
                let filter = ColumnFilter::from_json(&raw);
                FilterEntry {
                    column,
                    raw,
                    filter,
                }
            })
            .collect();
        Some(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a FilterModel {
    type Item = &'a FilterEntry;
    type IntoIter = std::slice::Iter<'a, FilterEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Truthiness used for text and date values: `null`, `false`, `0`, `""`,
/// `[]` and `{}` count as "no value".
#[must_use]
pub fn is_blank_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
