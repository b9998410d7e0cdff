//! Table I/O adapters.
//!
//! Decodes CSV and JSON files into [`Table`]s for the core pipeline and
//! encodes tables back out. The format is chosen by file extension:
//! `.json` is an array of flat objects, anything else is read as CSV.
//!
//! CSV input may carry a UTF-8 byte-order mark (spreadsheet exports
//! usually do); it is stripped before parsing. Empty cells become
//! missing values.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

use call_reconcile_core::table::Table;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TableFormat::Json,
            _ => TableFormat::Csv,
        }
    }
}

pub async fn read_table(path: &Path) -> Result<Table> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read table: {}", path.display()))?;
    let table = match TableFormat::from_path(path) {
        TableFormat::Csv => parse_csv(&bytes),
        TableFormat::Json => parse_json(&bytes),
    }
    .with_context(|| format!("Failed to parse table: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "table loaded"
    );
    Ok(table)
}

pub async fn write_table(path: &Path, table: &Table, bom: bool) -> Result<()> {
    let bytes = match TableFormat::from_path(path) {
        TableFormat::Csv => encode_csv(table, bom)?,
        TableFormat::Json => encode_json(table)?,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write table: {}", path.display()))?;
    Ok(())
}

pub fn parse_csv(bytes: &[u8]) -> Result<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record?;
        table.push_row(
            record
                .iter()
                .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                .collect(),
        );
    }
    Ok(table)
}

pub fn encode_csv(table: &Table, bom: bool) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if bom {
        out.extend_from_slice(UTF8_BOM);
    }
    {
        let mut writer = csv::Writer::from_writer(&mut out);
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
        }
        writer.flush()?;
    }
    Ok(out)
}

pub fn parse_json(bytes: &[u8]) -> Result<Table> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Array(items) = value else {
        bail!("expected a JSON array of objects");
    };

    // Column order: first appearance across all objects.
    let mut columns: Vec<String> = Vec::new();
    for item in &items {
        let Value::Object(obj) = item else {
            bail!("expected a JSON array of objects");
        };
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(columns.clone());
    for item in &items {
        if let Value::Object(obj) = item {
            table.push_row(columns.iter().map(|c| json_cell(obj.get(c))).collect());
        }
    }
    Ok(table)
}

fn json_cell(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn encode_json(table: &Table) -> Result<Vec<u8>> {
    let rows: Vec<Value> = table
        .rows()
        .iter()
        .map(|row| {
            let mut obj = Map::new();
            for (col, cell) in table.columns().iter().zip(row) {
                let v = cell.clone().map(Value::String).unwrap_or(Value::Null);
                obj.insert(col.clone(), v);
            }
            Value::Object(obj)
        })
        .collect();
    Ok(serde_json::to_vec_pretty(&rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_strips_bom_and_reads_blanks_as_missing() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("社名,電話番号\nA社,\nB社,0311112222\n".as_bytes());
        let t = parse_csv(&bytes).unwrap();
        assert_eq!(t.columns()[0], "社名");
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(0, "電話番号"), None);
        assert_eq!(t.get(1, "電話番号"), Some("0311112222"));
    }

    #[test]
    fn test_csv_short_rows_are_padded() {
        let t = parse_csv("a,b,c\n1,2\n".as_bytes()).unwrap();
        assert_eq!(t.get(0, "b"), Some("2"));
        assert_eq!(t.get(0, "c"), None);
    }

    #[test]
    fn test_csv_encode_with_bom() {
        let t = Table::from_rows(&["社名", "要約"], &[&["A社", "a, b"]]);
        let bytes = encode_csv(&t, true).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let back = parse_csv(&bytes).unwrap();
        assert_eq!(back.get(0, "要約"), Some("a, b"));
    }

    #[test]
    fn test_json_tables() {
        let json = r#"[{"社名": "A社", "通話時間": 45}, {"社名": "B社", "架電結果": null}]"#;
        let t = parse_json(json.as_bytes()).unwrap();
        assert_eq!(t.columns().len(), 3);
        assert_eq!(t.get(0, "通話時間"), Some("45"));
        assert_eq!(t.get(1, "通話時間"), None);
        assert_eq!(t.get(1, "架電結果"), None);

        let encoded = encode_json(&t).unwrap();
        let back = parse_json(&encoded).unwrap();
        assert_eq!(back.get(1, "社名"), Some("B社"));
    }

    #[test]
    fn test_json_rejects_non_array() {
        assert!(parse_json(br#"{"a": 1}"#).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(TableFormat::from_path(Path::new("x.JSON")), TableFormat::Json);
        assert_eq!(TableFormat::from_path(Path::new("x.csv")), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(Path::new("x")), TableFormat::Csv);
    }
}
