use serde_json::{Map, Value};
use std::io;

use super::{result_of, row_array, scalar_fields};

/// Write output as CSV to stdout, at full precision.
///
/// Per-line rows when the result has them (simulation lines, allocations,
/// method outcomes); otherwise a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Err(e) = write_result(&mut wtr, result_of(value)) {
        eprintln!("CSV write error: {}", e);
    }
    let _ = wtr.flush();
}

fn write_result<W: io::Write>(wtr: &mut csv::Writer<W>, result: &Value) -> csv::Result<()> {
    match result {
        Value::Object(map) => {
            if let Some((_, rows)) = row_array(map) {
                write_rows(wtr, rows)
            } else {
                write_fields(wtr, map)
            }
        }
        other => wtr.write_record([format_csv_value(other)]),
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            wtr.write_record(&row)?;
        }
    }
    Ok(())
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in scalar_fields(map, "") {
        wtr.write_record([key, format_csv_value(&val)])?;
    }
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_result(&mut wtr, result_of(value)).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_lines_written_as_rows() {
        let v = json!({"result": {
            "lines": [{"id": "A", "total_landed_cost_local": "1560.0"}],
            "totals": {"total_landed_cost_local": "1560.0"}
        }});
        assert_eq!(render(&v), "id,total_landed_cost_local\nA,1560.0\n");
    }

    #[test]
    fn test_fields_without_rows() {
        let v = json!({"result": {"base_case_value": "3744", "matrix": [["1"]]}});
        assert_eq!(render(&v), "field,value\nbase_case_value,3744\n");
    }
}
