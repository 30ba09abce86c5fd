pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of a computation envelope, or the value itself.
fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// First field of `map` holding a non-empty array of objects (per-line rows).
fn row_array(map: &Map<String, Value>) -> Option<(&str, &Vec<Value>)> {
    map.iter().find_map(|(key, val)| match val {
        Value::Array(arr) if matches!(arr.first(), Some(Value::Object(_))) => {
            Some((key.as_str(), arr))
        }
        _ => None,
    })
}

/// Scalar leaves of `map`, descending into nested objects as `parent.child`.
fn scalar_fields(map: &Map<String, Value>, prefix: &str) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => out.extend(scalar_fields(inner, &name)),
            Value::Array(arr) if arr.iter().any(|v| v.is_object() || v.is_array()) => {}
            _ => out.push((name, val.clone())),
        }
    }
    out
}

/// Render a value for humans: decimal strings rounded to `dp` places.
fn display_value(value: &Value, dp: u32) -> String {
    match value {
        Value::String(s) => match Decimal::from_str(s) {
            Ok(d) => d.round_dp(dp).normalize().to_string(),
            Err(_) => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr
            .iter()
            .map(|v| display_value(v, dp))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_rounds_decimal_strings() {
        assert_eq!(display_value(&json!("333.33333333333333"), 4), "333.3333");
        assert_eq!(display_value(&json!("1560.000000"), 4), "1560");
        assert_eq!(display_value(&json!("8471.30.12"), 4), "8471.30.12");
    }

    #[test]
    fn test_scalar_fields_flatten_nested_objects() {
        let v = json!({"a": "1", "totals": {"b": "2"}, "lines": [{"id": "x"}]});
        let fields = scalar_fields(v.as_object().unwrap(), "");
        let names: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["a", "totals.b"]);
    }

    #[test]
    fn test_row_array_finds_lines() {
        let v = json!({"totals": {}, "lines": [{"id": "x"}], "tags": ["a"]});
        let (key, rows) = row_array(v.as_object().unwrap()).unwrap();
        assert_eq!(key, "lines");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_result_of_envelope() {
        let v = json!({"result": {"x": 1}, "warnings": []});
        assert_eq!(result_of(&v), &json!({"x": 1}));
    }
}
