//! Grid filter model → `sea_orm::Condition`.
//!
//! Every column filter compiles to `Option<Condition>`; `None` means "no
//! restriction" (missing value, unknown operator). Negations keep NULL rows,
//! the way `NOT (col = x)` would not.

use chrono::{Duration, NaiveTime};
use modkit_grid::filter::is_blank_value;
use modkit_grid::{
    BooleanCondition, ColumnFilter, DateCondition, DateOp, Error, FilterModel, JoinOperator,
    NumberCondition, NumberOp, SetCondition, TextCondition, TextOp,
};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait};
use serde_json::Value as Json;

use crate::coerce::{coerce, coerce_many, json_to_text, parse_date, parse_datetime};
use crate::{Field, FieldKind, FieldMap};

type CondResult = Result<Option<Condition>, Error>;

/* ---------- LIKE helpers ---------- */

const LIKE_ESCAPE: char = '!';

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(ch);
    }
    out
}

fn ilike<C: ColumnTrait>(col: C, pattern: String) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col)))
        .like(LikeExpr::new(pattern.to_lowercase()).escape(LIKE_ESCAPE))
}

/* ---------- small builders ---------- */

fn one(expr: SimpleExpr) -> Option<Condition> {
    Some(Condition::all().add(expr))
}

/// `NOT expr`, keeping rows where the column is NULL.
fn negate<C: ColumnTrait>(col: C, cond: Condition) -> Option<Condition> {
    Some(
        Condition::any()
            .add(cond.not())
            .add(Expr::col(col).is_null()),
    )
}

fn blank<E: EntityTrait>(field: &Field<E>) -> Option<Condition>
where
    E::Column: ColumnTrait + Copy,
{
    let mut cond = Condition::any().add(Expr::col(field.col).is_null());
    if field.kind == FieldKind::String {
        cond = cond.add(Expr::col(field.col).eq(""));
    }
    Some(cond)
}

fn not_blank<E: EntityTrait>(field: &Field<E>) -> Option<Condition>
where
    E::Column: ColumnTrait + Copy,
{
    let mut cond = Condition::all().add(Expr::col(field.col).is_not_null());
    if field.kind == FieldKind::String {
        cond = cond.add(Expr::col(field.col).ne(""));
    }
    Some(cond)
}

fn ensure_string<E: EntityTrait>(name: &str, field: &Field<E>) -> Result<(), Error> {
    if field.kind == FieldKind::String {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            field: name.to_owned(),
            expected: FieldKind::String.to_string(),
            got: field.kind.to_string(),
        })
    }
}

fn ensure_ordered<E: EntityTrait>(name: &str, field: &Field<E>) -> Result<(), Error> {
    if field.kind.is_ordered() {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            field: name.to_owned(),
            expected: "an ordered type".to_owned(),
            got: field.kind.to_string(),
        })
    }
}

/* ---------- per filter type ---------- */

fn text_condition<E: EntityTrait>(name: &str, field: &Field<E>, c: &TextCondition) -> CondResult
where
    E::Column: ColumnTrait + Copy,
{
    let Some(op) = c.op else {
        return Ok(None);
    };
    match op {
        TextOp::Blank => return Ok(blank(field)),
        TextOp::NotBlank => return Ok(not_blank(field)),
        TextOp::Unknown => return Ok(None),
        _ => {}
    }

    let Some(raw) = c.filter.as_ref().filter(|v| !is_blank_value(v)) else {
        return Ok(None);
    };
    let col = field.col;

    Ok(match op {
        TextOp::Equals => one(Expr::col(col).eq(coerce(name, field.kind, raw)?)),
        TextOp::NotEqual => negate(
            col,
            Condition::all().add(Expr::col(col).eq(coerce(name, field.kind, raw)?)),
        ),
        TextOp::Contains | TextOp::NotContains | TextOp::StartsWith | TextOp::EndsWith => {
            ensure_string(name, field)?;
            let text = json_to_text(raw).ok_or_else(|| Error::TypeMismatch {
                field: name.to_owned(),
                expected: FieldKind::String.to_string(),
                got: raw.to_string(),
            })?;
            let escaped = like_escape(&text);
            match op {
                TextOp::Contains => one(ilike(col, format!("%{escaped}%"))),
                TextOp::NotContains => {
                    negate(col, Condition::all().add(ilike(col, format!("%{escaped}%"))))
                }
                TextOp::StartsWith => one(ilike(col, format!("{escaped}%"))),
                _ => one(ilike(col, format!("%{escaped}"))),
            }
        }
        TextOp::Blank | TextOp::NotBlank | TextOp::Unknown => None,
    })
}

fn number_condition<E: EntityTrait>(
    name: &str,
    field: &Field<E>,
    c: &NumberCondition,
) -> CondResult
where
    E::Column: ColumnTrait + Copy,
{
    let Some(op) = c.op else {
        return Ok(None);
    };
    match op {
        NumberOp::Blank => return Ok(blank(field)),
        NumberOp::NotBlank => return Ok(not_blank(field)),
        NumberOp::Unknown => return Ok(None),
        _ => {}
    }

    let Some(raw) = c.filter.as_ref().filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    if op != NumberOp::Equals && op != NumberOp::NotEqual {
        ensure_ordered(name, field)?;
    }
    let col = field.col;
    let value = coerce(name, field.kind, raw)?;

    Ok(match op {
        NumberOp::Equals => one(Expr::col(col).eq(value)),
        NumberOp::NotEqual => negate(col, Condition::all().add(Expr::col(col).eq(value))),
        NumberOp::LessThan => one(Expr::col(col).lt(value)),
        NumberOp::LessThanOrEqual => one(Expr::col(col).lte(value)),
        NumberOp::GreaterThan => one(Expr::col(col).gt(value)),
        NumberOp::GreaterThanOrEqual => one(Expr::col(col).gte(value)),
        NumberOp::InRange => match c.filter_to.as_ref().filter(|v| !v.is_null()) {
            Some(to) => Some(
                Condition::all()
                    .add(Expr::col(col).gte(value))
                    .add(Expr::col(col).lte(coerce(name, field.kind, to)?)),
            ),
            None => None,
        },
        NumberOp::Blank | NumberOp::NotBlank | NumberOp::Unknown => None,
    })
}

/// Same-calendar-day predicate for the column.
fn same_day<E: EntityTrait>(name: &str, field: &Field<E>, raw: &str) -> Result<Condition, Error>
where
    E::Column: ColumnTrait + Copy,
{
    let bad = || Error::TypeMismatch {
        field: name.to_owned(),
        expected: field.kind.to_string(),
        got: raw.to_owned(),
    };
    let day = parse_date(raw).ok_or_else(bad)?;
    let col = field.col;
    match field.kind {
        FieldKind::DateTimeUtc => {
            let start = day.and_time(NaiveTime::MIN).and_utc();
            let end = start + Duration::days(1);
            Ok(Condition::all()
                .add(Expr::col(col).gte(sea_orm::Value::ChronoDateTimeUtc(Some(Box::new(start)))))
                .add(Expr::col(col).lt(sea_orm::Value::ChronoDateTimeUtc(Some(Box::new(end))))))
        }
        FieldKind::Date => {
            Ok(Condition::all().add(Expr::col(col).eq(sea_orm::Value::ChronoDate(Some(Box::new(day))))))
        }
        _ => Err(bad()),
    }
}

fn date_value<E: EntityTrait>(name: &str, field: &Field<E>, raw: &str) -> Result<sea_orm::Value, Error> {
    let bad = || Error::TypeMismatch {
        field: name.to_owned(),
        expected: field.kind.to_string(),
        got: raw.to_owned(),
    };
    match field.kind {
        FieldKind::DateTimeUtc => parse_datetime(raw)
            .map(|dt| sea_orm::Value::ChronoDateTimeUtc(Some(Box::new(dt))))
            .ok_or_else(bad),
        FieldKind::Date => parse_date(raw)
            .map(|d| sea_orm::Value::ChronoDate(Some(Box::new(d))))
            .ok_or_else(bad),
        _ => Err(bad()),
    }
}

fn date_condition<E: EntityTrait>(name: &str, field: &Field<E>, c: &DateCondition) -> CondResult
where
    E::Column: ColumnTrait + Copy,
{
    let Some(op) = c.op else {
        return Ok(None);
    };
    match op {
        DateOp::Blank => return Ok(blank(field)),
        DateOp::NotBlank => return Ok(not_blank(field)),
        DateOp::Unknown => return Ok(None),
        _ => {}
    }

    let Some(from) = c.date_from.as_deref().filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let col = field.col;

    Ok(match op {
        DateOp::Equals => Some(same_day(name, field, from)?),
        DateOp::NotEqual => negate(col, same_day(name, field, from)?),
        DateOp::LessThan => one(Expr::col(col).lt(date_value(name, field, from)?)),
        DateOp::GreaterThan => one(Expr::col(col).gt(date_value(name, field, from)?)),
        DateOp::InRange => match c.date_to.as_deref().filter(|s| !s.is_empty()) {
            Some(to) => Some(
                Condition::all()
                    .add(Expr::col(col).gte(date_value(name, field, from)?))
                    .add(Expr::col(col).lte(date_value(name, field, to)?)),
            ),
            None => None,
        },
        DateOp::Blank | DateOp::NotBlank | DateOp::Unknown => None,
    })
}

fn set_condition<E: EntityTrait>(name: &str, field: &Field<E>, c: &SetCondition) -> CondResult
where
    E::Column: ColumnTrait + Copy,
{
    let Some(values) = c.values.as_ref().filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let col = field.col;
    let with_null = values.iter().any(Json::is_null);
    let vals = coerce_many(name, field.kind, values.iter().filter(|v| !v.is_null()))?;

    let mut cond = Condition::any();
    if !vals.is_empty() {
        cond = cond.add(Expr::col(col).is_in(vals));
    }
    if with_null {
        cond = cond.add(Expr::col(col).is_null());
    }
    Ok(Some(cond))
}

fn boolean_condition<E: EntityTrait>(
    name: &str,
    field: &Field<E>,
    c: &BooleanCondition,
) -> CondResult
where
    E::Column: ColumnTrait + Copy,
{
    match c.filter.as_ref().filter(|v| !v.is_null()) {
        Some(raw) => Ok(one(Expr::col(field.col).eq(coerce(name, field.kind, raw)?))),
        None => Ok(None),
    }
}

/// Compile one column filter.
///
/// # Errors
/// Returns `Error::TypeMismatch` when a value does not fit the column kind
/// or the operator does not apply to it.
pub fn column_condition<E: EntityTrait>(
    name: &str,
    field: &Field<E>,
    filter: &ColumnFilter,
) -> CondResult
where
    E::Column: ColumnTrait + Copy,
{
    match filter {
        ColumnFilter::Text(c) => text_condition(name, field, c),
        ColumnFilter::Number(c) => number_condition(name, field, c),
        ColumnFilter::Date(c) => date_condition(name, field, c),
        ColumnFilter::Set(c) => set_condition(name, field, c),
        ColumnFilter::Boolean(c) => boolean_condition(name, field, c),
        ColumnFilter::Combined {
            operator,
            conditions,
        } => {
            let mut parts = Vec::with_capacity(conditions.len());
            for sub in conditions {
                match column_condition(name, field, sub)? {
                    Some(c) => parts.push(c),
                    // An unrestricted branch makes the whole OR unrestricted.
                    None if *operator == JoinOperator::Or => return Ok(None),
                    None => {}
                }
            }
            if parts.is_empty() {
                return Ok(None);
            }
            let root = match operator {
                JoinOperator::And => Condition::all(),
                JoinOperator::Or => Condition::any(),
            };
            Ok(Some(parts.into_iter().fold(root, Condition::add)))
        }
    }
}

/// Compile the standard (non-custom) part of a filter model, AND-ing columns.
///
/// Columns with an unsupported `filterType` are skipped; `skip` lets callers
/// route columns elsewhere (custom hooks). Returns `None` when no column
/// produced a restriction.
///
/// # Errors
/// Returns `Error::UnknownField` for columns missing from `fmap`, or a
/// coercion error from [`column_condition`].
pub fn filter_to_condition<E: EntityTrait>(
    model: &FilterModel,
    fmap: &FieldMap<E>,
    skip: impl Fn(&str) -> bool,
) -> CondResult
where
    E::Column: ColumnTrait + Copy,
{
    let mut root = Condition::all();
    let mut restricted = false;

    for entry in model {
        if skip(&entry.column) {
            continue;
        }
        let Some(filter) = entry.filter.as_ref() else {
            continue;
        };
        let name = entry.field();
        let field = fmap.resolve(&name)?;
        if let Some(cond) = column_condition(&name, field, filter)? {
            root = root.add(cond);
            restricted = true;
        }
    }

    Ok(restricted.then_some(root))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryFilter, QueryTrait};
    use serde_json::json;

    mod ent {
        use sea_orm::entity::prelude::*;

        #[derive(Debug, Clone, PartialEq, DeriveEntityModel)]
        #[sea_orm(table_name = "events")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i64,
            pub name: String,
            pub score: f64,
            pub active: bool,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    fn fmap() -> FieldMap<ent::Entity> {
        FieldMap::<ent::Entity>::new()
            .insert("id", ent::Column::Id, FieldKind::I64)
            .insert("name", ent::Column::Name, FieldKind::String)
            .insert("score", ent::Column::Score, FieldKind::F64)
            .insert("active", ent::Column::Active, FieldKind::Bool)
    }

    fn sql(model: serde_json::Value) -> String {
        let model = FilterModel::from_value(model).unwrap();
        let cond = filter_to_condition(&model, &fmap(), |_| false)
            .unwrap()
            .unwrap();
        ent::Entity::find()
            .filter(cond)
            .build(DbBackend::Sqlite)
            .to_string()
    }

    fn compile(model: serde_json::Value) -> CondResult {
        let model = FilterModel::from_value(model).unwrap();
        filter_to_condition(&model, &fmap(), |_| false)
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(like_escape("50%_off!"), "50!%!_off!!");
    }

    #[test]
    fn contains_is_case_insensitive() {
        let s = sql(json!({"name": {"filterType": "text", "type": "contains", "filter": "AbC"}}));
        assert!(s.contains("LOWER(\"name\") LIKE '%abc%'"), "{s}");
    }

    #[test]
    fn not_equal_keeps_nulls() {
        let s = sql(json!({"name": {"filterType": "text", "type": "notEqual", "filter": "x"}}));
        assert!(s.contains("IS NULL"), "{s}");
        assert!(s.contains("NOT"), "{s}");
    }

    #[test]
    fn number_in_range_is_inclusive() {
        let s = sql(json!({"score": {"filterType": "number", "type": "inRange", "filter": 1, "filterTo": 5}}));
        assert!(s.contains("\"score\" >= 1"), "{s}");
        assert!(s.contains("\"score\" <= 5"), "{s}");
    }

    #[test]
    fn missing_values_mean_no_restriction() {
        for model in [
            json!({"name": {"filterType": "text", "type": "contains", "filter": ""}}),
            json!({"name": {"filterType": "text", "type": "contains"}}),
            json!({"score": {"filterType": "number", "type": "equals", "filter": null}}),
            json!({"score": {"filterType": "number", "type": "inRange", "filter": 1}}),
            json!({"id": {"filterType": "set", "values": []}}),
            json!({"active": {"filterType": "boolean"}}),
            json!({"name": {"filterType": "text", "type": "soundsLike", "filter": "x"}}),
            json!({"name": {"filterType": "text", "filter": "x"}}),
        ] {
            assert!(compile(model.clone()).unwrap().is_none(), "{model}");
        }
    }

    #[test]
    fn unsupported_filter_type_is_skipped_even_for_unknown_columns() {
        assert!(compile(json!({"nope": {"filterType": "geo", "filter": 1}}))
            .unwrap()
            .is_none());
    }

    #[test]
    fn unknown_column_is_an_error() {
        assert_eq!(
            compile(json!({"nope": {"filterType": "text", "type": "equals", "filter": "x"}}))
                .unwrap_err(),
            Error::UnknownField("nope".to_owned())
        );
    }

    #[test]
    fn like_ops_need_string_columns() {
        assert!(matches!(
            compile(json!({"score": {"filterType": "text", "type": "contains", "filter": "1"}})),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn or_with_unrestricted_branch_is_unrestricted() {
        let model = json!({"score": {
            "filterType": "number",
            "operator": "OR",
            "conditions": [
                {"type": "lessThan", "filter": 1},
                {"type": "greaterThan", "filter": null}
            ]
        }});
        assert!(compile(model).unwrap().is_none());
    }

    #[test]
    fn set_with_null_matches_null() {
        let s = sql(json!({"id": {"filterType": "set", "values": [1, 2, null]}}));
        assert!(s.contains("\"id\" IN (1, 2)"), "{s}");
        assert!(s.contains("\"id\" IS NULL"), "{s}");
    }
}
