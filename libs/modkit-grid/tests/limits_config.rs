#![allow(clippy::unwrap_used, clippy::expect_used)]

use figment::{providers::Serialized, Figment};
use modkit_grid::{GridLimits, GridParams, GridQuery, PageRequest};

#[test]
fn limits_extract_from_figment_with_defaults() {
    let figment = Figment::new().merge(Serialized::defaults(serde_json::json!({
        "max_page_size": 250,
        "strict": true
    })));

    let limits: GridLimits = figment.extract().unwrap();
    assert_eq!(limits.max_page_size, 250);
    assert!(limits.strict);
    assert_eq!(limits.default_page_size, 100);
    assert_eq!(limits.max_sort_fields, 10);
}

#[test]
fn unknown_limit_keys_are_rejected() {
    let figment = Figment::new().merge(Serialized::defaults(serde_json::json!({
        "max_rows": 10
    })));

    assert!(figment.extract::<GridLimits>().is_err());
}

#[test]
fn configured_limits_drive_fallback_pagination() {
    let limits: GridLimits = Figment::new()
        .merge(Serialized::defaults(serde_json::json!({
            "default_page_size": 25,
            "max_page_size": 50
        })))
        .extract()
        .unwrap();

    let params: GridParams =
        serde_json::from_value(serde_json::json!({"format": "aggrid", "page": "2"})).unwrap();
    let q = GridQuery::from_params(&params, &limits).unwrap();
    assert_eq!(q.page, Some(PageRequest::new(2, 25)));
}
