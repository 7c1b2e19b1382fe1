//! Form parameter maps.
//!
//! `PostMap` is what the model mapper produces: one JSON value per Canvas
//! form key. `RequestParams` is what the transport sends: every key carries
//! a list of string values and is encoded as repeated `key=value` pairs.

use std::collections::BTreeMap;

use serde_json::Value;

/// Form key to field value, as produced by `CanvasModel::to_post_map`.
pub type PostMap = BTreeMap<String, Value>;

/// Form key to one or more values, as sent by the transport.
pub type RequestParams = BTreeMap<String, Vec<String>>;

/// Flatten a post map into request parameters.
///
/// `null` values are left out so unset fields do not overwrite server state.
/// Arrays become repeated values; nested objects are sent as JSON text.
pub fn to_request_params(post_map: &PostMap) -> RequestParams {
    let mut params = RequestParams::new();
    for (key, value) in post_map {
        let values = form_values(value);
        if !values.is_empty() {
            params.insert(key.clone(), values);
        }
    }
    params
}

/// Append every value of `extra` to `base`.
pub fn merge_params(base: &mut RequestParams, extra: RequestParams) {
    for (key, mut values) in extra {
        base.entry(key).or_default().append(&mut values);
    }
}

fn form_values(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}
