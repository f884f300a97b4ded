use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::io::Read;

/// Flat tabular records as fetched from an open-data resource.
/// Cells are kept as strings; numeric coercion happens per aggregation rule.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Create a Dataset from CSV text. The first row is the header.
    pub fn from_csv(input: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(input.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .context("Failed to read CSV header row")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        if headers.is_empty() {
            return Err(anyhow!("CSV input has no header row"));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context("Failed to read CSV record")?;
            let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            // Ragged rows pad out to the header width
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(anyhow!("CSV input must contain at least one data row"));
        }

        Ok(Self { headers, rows })
    }

    /// Create a Dataset from a JSON array of flat objects, or from the
    /// `{ "records": [...] }` envelope the open-data API returns.
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = match value {
            Value::Array(items) => items.as_slice(),
            Value::Object(map) => map
                .get("records")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .ok_or_else(|| anyhow!("JSON object input must carry a 'records' array"))?,
            _ => return Err(anyhow!("Input data must be a JSON array of objects")),
        };

        if array.is_empty() {
            return Ok(Self {
                headers: Vec::new(),
                rows: Vec::new(),
            });
        }

        // Headers come from the first object; later objects may omit fields
        let first_obj = array[0]
            .as_object()
            .ok_or_else(|| anyhow!("Items in records array must be objects"))?;
        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in records array must be objects"))?;

            let mut row = Vec::new();
            for header in &headers {
                let val_str = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => String::new(),
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", header)),
                };
                row.push(val_str);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input).context("Failed to parse JSON input")?;
        Self::from_json(&value)
    }
}

/// Read a Dataset from a reader (stdin in the CLI) in the given format.
pub fn read_dataset<R: Read>(mut reader: R, format: InputFormat) -> Result<Dataset> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .context("Failed to read input data")?;

    match format {
        InputFormat::Csv => Dataset::from_csv(&input),
        InputFormat::Json => Dataset::from_json_str(&input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv() {
        let data = Dataset::from_csv("state,production\nPunjab,10\nKerala,5\n").unwrap();
        assert_eq!(data.headers, vec!["state", "production"]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[0], vec!["Punjab", "10"]);
    }

    #[test]
    fn test_from_csv_ragged_row() {
        let data = Dataset::from_csv("a,b,c\n1,2\n").unwrap();
        assert_eq!(data.rows[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_from_csv_empty_fails() {
        assert!(Dataset::from_csv("a,b\n").is_err());
    }

    #[test]
    fn test_from_json_array() {
        let data = Dataset::from_json_str(
            r#"[{"state": "Punjab", "production": 10, "irrigated": true, "note": null}]"#,
        )
        .unwrap();
        assert_eq!(data.headers.len(), 4);
        let row = &data.rows[0];
        assert!(row.contains(&"Punjab".to_string()));
        assert!(row.contains(&"10".to_string()));
        assert!(row.contains(&"true".to_string()));
        assert!(row.contains(&String::new()));
    }

    #[test]
    fn test_from_json_records_envelope() {
        let data =
            Dataset::from_json_str(r#"{"records": [{"state": "Punjab"}, {"state": "Kerala"}]}"#)
                .unwrap();
        assert_eq!(data.headers, vec!["state"]);
        assert_eq!(data.rows.len(), 2);
    }

    #[test]
    fn test_from_json_empty_array_is_valid() {
        let data = Dataset::from_json_str("[]").unwrap();
        assert!(data.headers.is_empty());
        assert!(data.rows.is_empty());
    }

    #[test]
    fn test_from_json_missing_field_is_empty() {
        let data =
            Dataset::from_json_str(r#"[{"state": "Punjab", "crop": "wheat"}, {"state": "Kerala"}]"#)
                .unwrap();
        assert_eq!(data.rows[1], vec!["Kerala", ""]);
    }

    #[test]
    fn test_from_json_nested_rejected() {
        assert!(Dataset::from_json_str(r#"[{"state": {"name": "Punjab"}}]"#).is_err());
    }

    #[test]
    fn test_from_json_scalar_rejected() {
        assert!(Dataset::from_json_str("42").is_err());
    }
}
