use import_cost_core::engine::intake::ProductLineDraft;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Read a JSON or YAML file (by extension) and deserialise into a typed struct.
pub fn read_document<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = if is_yaml(&canonical) {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };
    Ok(value)
}

/// Read product lines from a CSV file with a header row.
pub fn read_lines_csv(path: &str) -> Result<Vec<ProductLineDraft>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let file = fs::File::open(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    parse_lines_csv(file).map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e).into())
}

/// Columns: id, quantity, unit_price_source, unit_weight_kg, and optionally
/// description and ncm_code.
fn parse_lines_csv<R: Read>(reader: R) -> Result<Vec<ProductLineDraft>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.deserialize().collect()
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Resolve and validate the path.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_csv_lines() {
        let data = "id,description,ncm_code,quantity,unit_price_source,unit_weight_kg\n\
                    A,Widget,8471.30.12,10,10.00,2\n\
                    B,,,5,20,8.5\n";
        let lines = parse_lines_csv(data.as_bytes()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].id, "A");
        assert_eq!(lines[0].ncm_code.as_deref(), Some("8471.30.12"));
        assert_eq!(lines[0].quantity, dec!(10));
        assert_eq!(lines[1].description, None);
        assert_eq!(lines[1].unit_weight_kg, dec!(8.5));
    }

    #[test]
    fn test_parse_csv_without_optional_columns() {
        let data = "id,quantity,unit_price_source,unit_weight_kg\nA,3,1.5,0.2\n";
        let lines = parse_lines_csv(data.as_bytes()).unwrap();
        assert_eq!(lines[0].unit_price_source, dec!(1.5));
        assert_eq!(lines[0].description, None);
    }

    #[test]
    fn test_parse_csv_missing_numeric_column_fails() {
        let data = "id,quantity\nA,3\n";
        assert!(parse_lines_csv(data.as_bytes()).is_err());
    }

    #[test]
    fn test_yaml_extension_detection() {
        assert!(is_yaml(Path::new("sim.yaml")));
        assert!(is_yaml(Path::new("sim.yml")));
        assert!(!is_yaml(Path::new("sim.json")));
    }

    #[test]
    fn test_missing_file_reported() {
        let err = read_document::<serde_json::Value>("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
