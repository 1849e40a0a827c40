//! Canonical JSON serialization
//!
//! Object keys are emitted in sorted order at every level, so two
//! structurally equal values always serialize to the same string no matter
//! the insertion order of their maps. The canonical string is what key
//! equality and hashing are defined over.

use serde_json::Value as JsonValue;

/// Serialize a JSON value canonically (sorted object keys, no whitespace)
#[must_use]
pub fn canonical_json(value: &JsonValue) -> String {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();

            let mut parts = Vec::with_capacity(keys.len());
            for key in keys {
                if let Some(val) = map.get(key) {
                    parts.push(format!("{}:{}", escape_string(key), canonical_json(val)));
                }
            }
            format!("{{{}}}", parts.join(","))
        }
        JsonValue::Array(arr) => {
            let parts: Vec<_> = arr.iter().map(canonical_json).collect();
            format!("[{}]", parts.join(","))
        }
        JsonValue::String(s) => escape_string(s),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => "null".to_string(),
    }
}

/// Nesting depth of a value; scalars are depth 1
#[must_use]
pub fn value_depth(value: &JsonValue) -> usize {
    match value {
        JsonValue::Object(map) => {
            1 + map.values().map(value_depth).max().unwrap_or(0)
        }
        JsonValue::Array(arr) => 1 + arr.iter().map(value_depth).max().unwrap_or(0),
        _ => 1,
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn object_keys_are_sorted_at_every_level() {
        let a = json!({"b": {"y": 1, "x": 2}, "a": 3});
        assert_eq!(canonical_json(&a), r#"{"a":3,"b":{"x":2,"y":1}}"#);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let first: serde_json::Value =
            serde_json::from_str(r#"{"workspace":"w1","search":"rev"}"#).unwrap();
        let second: serde_json::Value =
            serde_json::from_str(r#"{"search":"rev","workspace":"w1"}"#).unwrap();
        assert_eq!(canonical_json(&first), canonical_json(&second));
    }

    #[test]
    fn arrays_keep_their_order() {
        assert_ne!(canonical_json(&json!([1, 2])), canonical_json(&json!([2, 1])));
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(canonical_json(&json!("a\"b\\c\n")), r#""a\"b\\c\n""#);
    }

    #[test]
    fn depth_counts_nested_containers() {
        assert_eq!(value_depth(&json!(1)), 1);
        assert_eq!(value_depth(&json!({"a": 1})), 2);
        assert_eq!(value_depth(&json!({"a": {"b": [1]}})), 4);
    }

    proptest::proptest! {
        #[test]
        fn canonical_form_ignores_entry_order(
            entries in proptest::collection::btree_map("[a-z]{1,8}", 0i64..1000, 1..6)
        ) {
            let forward: Vec<_> = entries.iter().collect();
            let mut reversed = forward.clone();
            reversed.reverse();

            let render = |pairs: &[(&String, &i64)]| {
                let body: Vec<_> =
                    pairs.iter().map(|(k, v)| format!("\"{k}\":{v}")).collect();
                format!("{{{}}}", body.join(","))
            };

            let a: serde_json::Value = serde_json::from_str(&render(&forward)).unwrap();
            let b: serde_json::Value = serde_json::from_str(&render(&reversed)).unwrap();
            proptest::prop_assert_eq!(canonical_json(&a), canonical_json(&b));
        }
    }
}
