//! Minimal tabular input: named columns over string cells

use serde_json::Value;
use std::io::Read;
use std::path::Path;

use crate::error::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
  Csv,
  Json,
}

impl TableFormat {
  /// Guess the format from a file extension, defaulting to CSV
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|ext| ext.to_str()).map(|ext| ext.to_ascii_lowercase()) {
      Some(ext) if ext == "json" => TableFormat::Json,
      _ => TableFormat::Csv,
    }
  }
}

impl std::str::FromStr for TableFormat {
  type Err = TableError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "csv" => Ok(TableFormat::Csv),
      "json" => Ok(TableFormat::Json),
      other => Err(TableError::unsupported_format(other)),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
  headers: Vec<String>,
  rows: Vec<Vec<String>>,
}

impl Table {
  pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
    let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();
    Self { headers, rows }
  }

  /// Build a table from string literals, mostly for tests and fixtures
  pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
    Self::new(
      headers.iter().map(|h| h.to_string()).collect(),
      rows.iter().map(|row| row.iter().map(|cell| cell.to_string()).collect()).collect(),
    )
  }

  pub fn load(path: &Path, format: TableFormat) -> Result<Self, TableError> {
    let file = std::fs::File::open(path)
      .map_err(|e| TableError::read(format!("{}: {e}", path.display())))?;
    match format {
      TableFormat::Csv => Self::from_csv_reader(file),
      TableFormat::Json => Self::from_json_reader(file),
    }
  }

  pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TableError> {
    let mut reader =
      csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::Headers).from_reader(reader);

    let headers = reader
      .headers()
      .map_err(|e| TableError::parse(e.to_string()))?
      .iter()
      .map(str::to_string)
      .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
      let record = record.map_err(|e| TableError::parse(e.to_string()))?;
      rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Self::new(headers, rows))
  }

  /// Parse a JSON array of flat objects; columns are the union of keys across all objects
  pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, TableError> {
    let value: Value = serde_json::from_reader(reader).map_err(|e| TableError::parse(e.to_string()))?;
    let objects = value
      .as_array()
      .ok_or_else(|| TableError::parse("expected a JSON array of objects"))?;

    let mut headers: Vec<String> = Vec::new();
    for object in objects {
      let object = object
        .as_object()
        .ok_or_else(|| TableError::parse("every array element must be an object"))?;
      for key in object.keys() {
        if !headers.contains(key) {
          headers.push(key.clone());
        }
      }
    }

    let rows = objects
      .iter()
      .filter_map(Value::as_object)
      .map(|object| headers.iter().map(|h| object.get(h).map(cell_text).unwrap_or_default()).collect())
      .collect();

    Ok(Self::new(headers, rows))
  }

  pub fn headers(&self) -> &[String] {
    &self.headers
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  /// Trimmed, case-insensitive header lookup
  pub fn column(&self, name: &str) -> Option<usize> {
    self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
  }

  pub fn has_column(&self, name: &str) -> bool {
    self.column(name).is_some()
  }

  pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
    self.rows.iter().enumerate().map(move |(index, cells)| Row { table: self, index, cells })
  }
}

fn cell_text(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
  table: &'a Table,
  index: usize,
  cells: &'a [String],
}

impl<'a> Row<'a> {
  pub fn index(&self) -> usize {
    self.index
  }

  /// 1-based data row number, as a user counts rows below the header
  pub fn number(&self) -> usize {
    self.index + 1
  }

  /// Trimmed cell value; blank cells and missing columns are both `None`
  pub fn get(&self, column: &str) -> Option<&'a str> {
    let value = self.raw(column)?.trim();
    (!value.is_empty()).then_some(value)
  }

  /// Cell text exactly as read; only empty cells and missing columns are `None`
  pub fn raw(&self, column: &str) -> Option<&'a str> {
    let position = self.table.column(column)?;
    let value = self.cells.get(position)?.as_str();
    (!value.is_empty()).then_some(value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_csv_headers_are_trimmed_and_case_insensitive() {
    let csv = " Latitude , LONGITUDE,description\n52.5,13.4,Depot\n";
    let table = Table::from_csv_reader(csv.as_bytes()).unwrap();

    assert!(table.has_column("latitude"));
    assert!(table.has_column("longitude"));
    let row = table.rows().next().unwrap();
    assert_eq!(row.get("latitude"), Some("52.5"));
    assert_eq!(row.get("description"), Some("Depot"));
  }

  #[test]
  fn test_csv_short_rows_read_as_missing_cells() {
    let csv = "address,description,type\nAddr1\nAddr2,B,Erstbestellung\n";
    let table = Table::from_csv_reader(csv.as_bytes()).unwrap();

    let rows: Vec<_> = table.rows().collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("description"), None);
    assert_eq!(rows[1].get("type"), Some("Erstbestellung"));
  }

  #[test]
  fn test_empty_cells_are_absent() {
    let table = Table::from_rows(&["address", "type"], &[&["  ", ""]]);
    let row = table.rows().next().unwrap();
    assert_eq!(row.get("address"), None);
    assert_eq!(row.get("type"), None);
    assert_eq!(row.get("unknown"), None);
    assert_eq!(row.raw("address"), Some("  "));
    assert_eq!(row.raw("type"), None);
  }

  #[test]
  fn test_csv_cells_keep_their_whitespace() {
    let csv = "address, description\n Addr1 ,  Depot am See \n";
    let table = Table::from_csv_reader(csv.as_bytes()).unwrap();
    let row = table.rows().next().unwrap();

    assert_eq!(row.get("address"), Some("Addr1"));
    assert_eq!(row.raw("description"), Some("  Depot am See "));
    assert_eq!(row.number(), 1);
  }

  #[test]
  fn test_json_rows_union_keys_and_stringify_numbers() {
    let json = r#"[
      {"latitude": 52.1, "longitude": 13.1, "description": "A"},
      {"address": "Addr2", "type": null}
    ]"#;
    let table = Table::from_json_reader(json.as_bytes()).unwrap();

    // serde_json objects iterate keys in sorted order
    assert_eq!(table.headers(), ["description", "latitude", "longitude", "address", "type"]);
    let rows: Vec<_> = table.rows().collect();
    assert_eq!(rows[0].get("latitude"), Some("52.1"));
    assert_eq!(rows[0].get("address"), None);
    assert_eq!(rows[1].get("address"), Some("Addr2"));
    assert_eq!(rows[1].get("type"), None);
  }

  #[test]
  fn test_json_must_be_array_of_objects() {
    assert!(matches!(
      Table::from_json_reader(r#"{"address": "x"}"#.as_bytes()),
      Err(TableError::Parse { .. })
    ));
    assert!(matches!(Table::from_json_reader("[1, 2]".as_bytes()), Err(TableError::Parse { .. })));
  }

  #[test]
  fn test_format_detection() {
    assert_eq!(TableFormat::from_path(Path::new("stops.JSON")), TableFormat::Json);
    assert_eq!(TableFormat::from_path(Path::new("stops.csv")), TableFormat::Csv);
    assert_eq!(TableFormat::from_path(Path::new("stops")), TableFormat::Csv);
    assert!("xlsx".parse::<TableFormat>().is_err());
  }
}
