//! JSON filter values → `sea_orm::Value`, driven by [`FieldKind`].
//!
//! Grid clients are loose about types: numbers arrive as numbers or numeric
//! strings, dates as `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use modkit_grid::Error;
use rust_decimal::Decimal;
use serde_json::Value as Json;

use crate::FieldKind;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

fn json_type(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn mismatch(field: &str, kind: FieldKind, got: &Json) -> Error {
    Error::TypeMismatch {
        field: field.to_owned(),
        expected: kind.to_string(),
        got: json_type(got).to_owned(),
    }
}

/// Parse a calendar date, ignoring any time part.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

/// Parse a timestamp; naive values are taken as UTC, a bare date as midnight.
#[must_use]
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        })
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Text form of a scalar, used for string columns and text filters.
#[must_use]
pub fn json_to_text(v: &Json) -> Option<String> {
    match v {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        Json::Null | Json::Array(_) | Json::Object(_) => None,
    }
}

/// Coerce one JSON value for a column of the given kind.
///
/// # Errors
/// Returns `Error::TypeMismatch` when the value cannot represent `kind`.
pub fn coerce(field: &str, kind: FieldKind, v: &Json) -> Result<sea_orm::Value, Error> {
    use sea_orm::Value as V;

    let text = || json_to_text(v);
    let value = match kind {
        FieldKind::String => text().map(|s| V::String(Some(Box::new(s)))),
        FieldKind::I64 => match v {
            Json::Number(n) => n.as_i64(),
            Json::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .map(|i| V::BigInt(Some(i))),
        FieldKind::F64 => match v {
            Json::Number(n) => n.as_f64(),
            Json::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .map(|f| V::Double(Some(f))),
        FieldKind::Decimal => match v {
            Json::Number(_) | Json::String(_) => {
                text().and_then(|s| Decimal::from_str(s.trim()).ok())
            }
            _ => None,
        }
        .map(|d| V::Decimal(Some(Box::new(d)))),
        FieldKind::Bool => match v {
            Json::Bool(b) => Some(*b),
            Json::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Json::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
        .map(|b| V::Bool(Some(b))),
        FieldKind::Uuid => v
            .as_str()
            .and_then(|s| s.trim().parse::<uuid::Uuid>().ok())
            .map(|u| V::Uuid(Some(Box::new(u)))),
        FieldKind::DateTimeUtc => v
            .as_str()
            .and_then(parse_datetime)
            .map(|dt| V::ChronoDateTimeUtc(Some(Box::new(dt)))),
        FieldKind::Date => v
            .as_str()
            .and_then(parse_date)
            .map(|d| V::ChronoDate(Some(Box::new(d)))),
        FieldKind::Time => v
            .as_str()
            .and_then(parse_time)
            .map(|t| V::ChronoTime(Some(Box::new(t)))),
    };

    value.ok_or_else(|| mismatch(field, kind, v))
}

/// Coerce a list of values, e.g. the members of a set filter.
///
/// # Errors
/// Returns `Error::TypeMismatch` on the first value that does not fit.
pub fn coerce_many<'a>(
    field: &str,
    kind: FieldKind,
    items: impl IntoIterator<Item = &'a Json>,
) -> Result<Vec<sea_orm::Value>, Error> {
    items.into_iter().map(|v| coerce(field, kind, v)).collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_accept_numeric_strings() {
        assert_eq!(
            coerce("age", FieldKind::I64, &json!("42")).unwrap(),
            sea_orm::Value::BigInt(Some(42))
        );
        assert_eq!(
            coerce("age", FieldKind::I64, &json!(42)).unwrap(),
            sea_orm::Value::BigInt(Some(42))
        );
        assert_eq!(
            coerce("score", FieldKind::F64, &json!(1.5)).unwrap(),
            sea_orm::Value::Double(Some(1.5))
        );
    }

    #[test]
    fn mismatches_name_the_field() {
        let err = coerce("age", FieldKind::I64, &json!("abc")).unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                field: "age".to_owned(),
                expected: "I64".to_owned(),
                got: "string".to_owned(),
            }
        );
    }

    #[test]
    fn decimals_keep_precision() {
        let v = coerce("amount", FieldKind::Decimal, &json!("10.015")).unwrap();
        assert_eq!(
            v,
            sea_orm::Value::Decimal(Some(Box::new(Decimal::from_str("10.015").unwrap())))
        );
    }

    #[test]
    fn grid_date_formats() {
        let midnight = parse_datetime("2024-03-01").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        let spaced = parse_datetime("2024-03-01 13:45:00").unwrap();
        assert_eq!(spaced.to_rfc3339(), "2024-03-01T13:45:00+00:00");
        let zoned = parse_datetime("2024-03-01T13:45:00+02:00").unwrap();
        assert_eq!(zoned.to_rfc3339(), "2024-03-01T11:45:00+00:00");
        assert_eq!(
            parse_date("2024-03-01 13:45:00"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn text_from_scalars() {
        assert_eq!(json_to_text(&json!(5)), Some("5".to_owned()));
        assert_eq!(json_to_text(&json!(true)), Some("true".to_owned()));
        assert_eq!(json_to_text(&json!(null)), None);
    }

    #[test]
    fn coerce_many_stops_on_first_bad_value() {
        let items = [json!(1), json!("x"), json!(3)];
        assert!(coerce_many("id", FieldKind::I64, items.iter()).is_err());
        let items = [json!(1), json!("2")];
        assert_eq!(coerce_many("id", FieldKind::I64, items.iter()).unwrap().len(), 2);
    }
}
