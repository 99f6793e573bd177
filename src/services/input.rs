//! Domain list loading.
//!
//! Supports:
//! - CSV files with a header row and a named domain column
//! - JSON files with an array of domain strings, or of objects carrying the column
//!
//! Values are trimmed, empty entries dropped and duplicates removed, keeping
//! the order of first appearance.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const DEFAULT_COLUMN: &str = "domain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("csv") => Some(Self::Csv),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn load_domains(path: &Path, column: &str) -> Result<Vec<String>> {
    let format = InputFormat::from_path(path).with_context(|| {
        format!(
            "Cannot determine input format from file extension. Expected .csv or .json: {}",
            path.display()
        )
    })?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {:?}", path))?;

    let raw = match format {
        InputFormat::Csv => parse_csv_column(&content, column),
        InputFormat::Json => parse_json_column(&content, column),
    }
    .with_context(|| format!("Failed to parse {:?}", path))?;

    Ok(unique_domains(raw))
}

pub fn parse_csv_column(content: &str, column: &str) -> Result<Vec<Option<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let Some(index) = headers.iter().position(|h| h.trim() == column) else {
        bail!("Column {:?} not found; available: {:?}", column, headers);
    };

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        values.push(record.get(index).map(str::to_string));
    }
    Ok(values)
}

pub fn parse_json_column(content: &str, column: &str) -> Result<Vec<Option<String>>> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(items) = value else {
        bail!("Expected a JSON array of domains");
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(Some(s)),
            Value::Null => Ok(None),
            Value::Object(mut map) => match map.remove(column) {
                Some(Value::String(s)) => Ok(Some(s)),
                Some(Value::Null) | None => Ok(None),
                Some(other) => bail!("Field {:?} is not a string: {}", column, other),
            },
            other => bail!("Unsupported JSON entry: {}", other),
        })
        .collect()
}

/// Drop empty values and duplicates, preserving first-seen order.
pub fn unique_domains(raw: Vec<Option<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .flatten()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .filter(|d| seen.insert(d.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_csv_named_column() {
        let content = "id,domain,name\n1,acme.com,Acme\n2,globex.com,Globex\n";
        let values = parse_csv_column(content, "domain").unwrap();
        assert_eq!(
            unique_domains(values),
            vec!["acme.com".to_string(), "globex.com".to_string()]
        );
    }

    #[test]
    fn test_csv_missing_column() {
        let err = parse_csv_column("id,site\n1,acme.com\n", "domain").unwrap_err();
        assert!(err.to_string().contains("domain"));
    }

    #[test]
    fn test_csv_drops_empty_and_duplicates() {
        let content = "domain\nacme.com\n\n  \nglobex.com\nacme.com\n initech.com \n";
        let values = parse_csv_column(content, "domain").unwrap();
        assert_eq!(
            unique_domains(values),
            vec!["acme.com", "globex.com", "initech.com"]
        );
    }

    #[test]
    fn test_json_strings_and_objects() {
        let strings = r#"["a.com", null, "b.com", "a.com"]"#;
        assert_eq!(
            unique_domains(parse_json_column(strings, "domain").unwrap()),
            vec!["a.com", "b.com"]
        );

        let objects = r#"[{"domain": "a.com"}, {"domain": null}, {"other": 1}, {"domain": "c.com"}]"#;
        assert_eq!(
            unique_domains(parse_json_column(objects, "domain").unwrap()),
            vec!["a.com", "c.com"]
        );
    }

    #[test]
    fn test_json_rejects_non_array() {
        assert!(parse_json_column(r#"{"domain": "a.com"}"#, "domain").is_err());
        assert!(parse_json_column(r#"[1, 2]"#, "domain").is_err());
    }

    #[test]
    fn test_load_domains_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = temp_dir.path().join("logos.csv");
        fs::write(&csv_path, "domain\nz.com\ny.com\n").unwrap();
        assert_eq!(load_domains(&csv_path, DEFAULT_COLUMN).unwrap(), vec!["z.com", "y.com"]);

        let json_path = temp_dir.path().join("logos.JSON");
        fs::write(&json_path, r#"["x.com"]"#).unwrap();
        assert_eq!(load_domains(&json_path, DEFAULT_COLUMN).unwrap(), vec!["x.com"]);

        let other = temp_dir.path().join("logos.parquet");
        fs::write(&other, "").unwrap();
        assert!(load_domains(&other, DEFAULT_COLUMN).is_err());
    }

    #[test]
    fn test_empty_csv_yields_no_domains() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.csv");
        fs::write(&path, "domain\n").unwrap();
        assert!(load_domains(&path, DEFAULT_COLUMN).unwrap().is_empty());
    }
}
