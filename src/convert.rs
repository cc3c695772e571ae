//! Shared helpers for tool argument extraction.
//!
//! Tool arguments arrive as a JSON object; the per-tool dispatch functions use
//! these helpers to pull out typed values, mapping absence and shape errors to
//! [`McpError::MissingArg`] / [`McpError::InvalidArg`].

use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};

/// Get a required string argument.
pub fn get_string_arg(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Err(McpError::MissingArg(name.to_string())),
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(_) => Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: "expected a string".to_string(),
        }),
    }
}

/// Get an optional string argument.
pub fn get_optional_string(args: &Map<String, JsonValue>, name: &str) -> Option<String> {
    args.get(name).and_then(|v| v.as_str()).map(str::to_string)
}

/// Get an optional u64 argument.
pub fn get_optional_u64(args: &Map<String, JsonValue>, name: &str) -> Option<u64> {
    args.get(name).and_then(|v| v.as_u64())
}

/// Read a string field out of a JSON value by key, defaulting to "".
///
/// Registry responses omit fields freely; formatters use this to keep
/// markdown assembly total.
pub fn str_field<'a>(value: &'a JsonValue, key: &str) -> &'a str {
    value.get(key).and_then(|v| v.as_str()).unwrap_or_default()
}

/// Read a u64 field out of a JSON value by key, defaulting to 0.
pub fn u64_field(value: &JsonValue, key: &str) -> u64 {
    value.get(key).and_then(|v| v.as_u64()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn string_arg_present() {
        let a = args(json!({"name": "aws"}));
        assert_eq!(get_string_arg(&a, "name").unwrap(), "aws");
    }

    #[test]
    fn string_arg_missing() {
        let a = args(json!({}));
        assert!(matches!(
            get_string_arg(&a, "name"),
            Err(McpError::MissingArg(n)) if n == "name"
        ));
    }

    #[test]
    fn string_arg_wrong_type() {
        let a = args(json!({"name": 7}));
        assert!(matches!(
            get_string_arg(&a, "name"),
            Err(McpError::InvalidArg { .. })
        ));
    }

    #[test]
    fn optional_args() {
        let a = args(json!({"offset": 15, "q": "vpc"}));
        assert_eq!(get_optional_u64(&a, "offset"), Some(15));
        assert_eq!(get_optional_u64(&a, "missing"), None);
        assert_eq!(get_optional_string(&a, "q").as_deref(), Some("vpc"));
    }

    #[test]
    fn json_field_helpers_default() {
        let v = json!({"description": "d", "downloads": 3});
        assert_eq!(str_field(&v, "description"), "d");
        assert_eq!(str_field(&v, "missing"), "");
        assert_eq!(u64_field(&v, "downloads"), 3);
        assert_eq!(u64_field(&v, "missing"), 0);
    }
}
