use serde_json::Value;

use super::{display_value, result_of};

/// Print just the key answer value from the output.
///
/// Looks for the headline figure of each command in order of priority
/// (inside `totals` for simulations), then falls back to the first field.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(result_of(value)));
}

const PRIORITY_KEYS: [&str; 5] = [
    "total_landed_cost_local",
    "allocated_sum",
    "base_case_value",
    "total_landed_cost_spread",
    "import_multiplier",
];

fn headline(result: &Value) -> String {
    let Value::Object(map) = result else {
        return display_value(result, 2);
    };
    let totals = map.get("totals").and_then(Value::as_object);

    for key in PRIORITY_KEYS {
        let found = map
            .get(key)
            .or_else(|| totals.and_then(|t| t.get(key)))
            .filter(|v| !v.is_null());
        if let Some(val) = found {
            return display_value(val, 2);
        }
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, display_value(val, 2)),
        None => String::new(),
    }
}
