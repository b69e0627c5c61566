//! JSON value model shared by every stage of the preview pipeline.
//!
//! APL documents and datasources are carried as [`serde_json::Value`]. This
//! module adds the runtime shape guards the pipeline relies on and the deep
//! merge used when local packages are folded into a document.

use serde_json::{Map, Value};

/// A JSON object: the shape of an APL document, its datasources, and every
/// component's property bag.
pub type JsonType = Map<String, Value>;

/// Returns `true` when `value` is a JSON value as APL understands it:
/// a string, number, boolean, an array of such values, or an object.
///
/// `null` is rejected on its own and as an array element. Objects are
/// checked by shape only; their keys are strings by construction and member
/// values are not inspected, so a property bag holding `null` deep inside a
/// binding still qualifies.
pub fn is_json_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Object(_) => true,
        Value::Array(items) => items.iter().all(is_json_value),
    }
}

/// Returns `true` when `value` is an object.
pub fn is_json_type(value: &Value) -> bool {
    value.is_object() && is_json_value(value)
}

/// Take `value` as a [`JsonType`] when it passes [`is_json_type`].
pub fn into_json_type(value: Value) -> Option<JsonType> {
    if !is_json_type(&value) {
        return None;
    }
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Deep-merge `overlay` on top of `base`, returning a new value.
///
/// Objects are merged key by key, recursively. Any other pairing (arrays,
/// scalars, or an object against a non-object) resolves to a clone of
/// `overlay`: arrays are leaves and are never merged element-wise.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_maps(base_map, overlay_map))
        }
        _ => overlay.clone(),
    }
}

fn merge_maps(base: &JsonType, overlay: &JsonType) -> JsonType {
    let mut merged = base.clone();
    for (key, overlay_value) in overlay {
        let value = match base.get(key) {
            Some(base_value) => deep_merge(base_value, overlay_value),
            None => overlay_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

/// Render `value` the way a property panel shows it: strings verbatim,
/// everything else as compact JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_are_json_values() {
        assert!(is_json_value(&json!("text")));
        assert!(is_json_value(&json!(42)));
        assert!(is_json_value(&json!(true)));
    }

    #[test]
    fn null_is_rejected_alone_and_in_arrays() {
        assert!(!is_json_value(&Value::Null));
        assert!(!is_json_value(&json!([1, null])));
        assert!(!is_json_value(&json!([[null]])));
    }

    #[test]
    fn object_members_are_not_inspected() {
        assert!(is_json_value(&json!({ "a": { "b": null } })));
        assert!(is_json_type(&json!({ "bind": [{ "name": "x", "value": null }] })));
    }

    #[test]
    fn is_json_type_requires_an_object() {
        assert!(is_json_type(&json!({ "type": "Text" })));
        assert!(!is_json_type(&json!(["Text"])));
        assert!(!is_json_type(&json!("Text")));
    }

    #[test]
    fn into_json_type_takes_any_object() {
        assert!(into_json_type(json!({ "type": "Text" })).is_some());
        let bag = into_json_type(json!({ "type": null })).expect("object");
        assert_eq!(bag["type"], Value::Null);
        assert!(into_json_type(json!(1)).is_none());
        assert!(into_json_type(Value::Null).is_none());
    }

    #[test]
    fn deep_merge_overlay_wins_on_conflicting_leaves() {
        let base = json!({ "a": 1, "nested": { "x": "base", "y": "base" } });
        let overlay = json!({ "a": 2, "nested": { "x": "overlay" } });
        assert_eq!(
            deep_merge(&base, &overlay),
            json!({ "a": 2, "nested": { "x": "overlay", "y": "base" } })
        );
    }

    #[test]
    fn deep_merge_replaces_arrays_wholesale() {
        let base = json!({ "items": [{ "type": "Container" }, { "type": "Image" }] });
        let overlay = json!({ "items": [{ "type": "Text" }] });
        assert_eq!(deep_merge(&base, &overlay), overlay);
    }

    #[test]
    fn deep_merge_keeps_overlay_scalar_against_base_object() {
        let base = json!({ "styles": { "a": {} } });
        let overlay = json!({ "styles": "none" });
        assert_eq!(deep_merge(&base, &overlay), json!({ "styles": "none" }));
    }

    #[test]
    fn deep_merge_does_not_alias_inputs() {
        let base = json!({ "a": { "b": 1 } });
        let overlay = json!({ "c": 2 });
        let mut merged = deep_merge(&base, &overlay);
        merged["a"]["b"] = json!(99);
        assert_eq!(base["a"]["b"], json!(1));
    }

    #[test]
    fn display_value_shows_strings_verbatim() {
        assert_eq!(display_value(&json!("hello")), "hello");
        assert_eq!(display_value(&json!(10)), "10");
        assert_eq!(display_value(&json!({ "a": 1 })), r#"{"a":1}"#);
    }
}
