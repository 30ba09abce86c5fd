use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{display_value, result_of, row_array, scalar_fields};

/// Decimal places shown in tables; full precision stays in JSON/CSV.
const TABLE_DP: u32 = 4;

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(result) => print_result(result),
        other => println!("{}", display_value(other, TABLE_DP)),
    }

    if let Value::Object(envelope) = value {
        print_envelope_notes(envelope);
    }
}

fn print_result(result: &Map<String, Value>) {
    if let Some((name, rows)) = row_array(result) {
        println!("{name}:");
        print_rows(rows);
        println!();
    }

    if let Some(Value::Array(matrix)) = result.get("matrix") {
        print_matrix(result, matrix);
        println!();
    }

    let fields = scalar_fields(result, "");
    if !fields.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in &fields {
            builder.push_record([key.clone(), display_value(val, TABLE_DP)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| {
                    map.get(h.as_str())
                        .map(|v| display_value(v, TABLE_DP))
                        .unwrap_or_default()
                })
                .collect();
            builder.push_record(row);
        }
    }

    println!("{}", Table::from(builder));
}

/// Sensitivity grid: variable_1 down the side, variable_2 across the top.
fn print_matrix(result: &Map<String, Value>, matrix: &[Value]) {
    let labels = |key: &str| -> Vec<String> {
        match result.get(key) {
            Some(Value::Array(vals)) => vals.iter().map(|v| display_value(v, TABLE_DP)).collect(),
            _ => Vec::new(),
        }
    };
    let row_labels = labels("variable_1_values");
    let col_labels = labels("variable_2_values");

    let corner = format!(
        "{} \\ {}",
        display_value(result.get("variable_1").unwrap_or(&Value::Null), TABLE_DP),
        display_value(result.get("variable_2").unwrap_or(&Value::Null), TABLE_DP)
    );
    let mut builder = Builder::default();
    builder.push_record(std::iter::once(corner).chain(col_labels));

    for (i, row) in matrix.iter().enumerate() {
        let label = row_labels.get(i).cloned().unwrap_or_default();
        let cells: Vec<String> = match row {
            Value::Array(cells) => cells.iter().map(|c| display_value(c, TABLE_DP)).collect(),
            other => vec![display_value(other, TABLE_DP)],
        };
        builder.push_record(std::iter::once(label).chain(cells));
    }

    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
