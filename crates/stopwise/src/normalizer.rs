//! Turns table rows into `LocationRecord`s. Pure: no network, no I/O.

use crate::error::{PipelineError, Result};
use crate::record::{Coordinates, LocationRecord, DEFAULT_CATEGORY, DEFAULT_DESCRIPTION};
use crate::table::{Row, Table};

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const ADDRESS: &str = "address";
pub const DESCRIPTION: &str = "description";
pub const TYPE: &str = "type";

const COORDINATE_GROUP: &str = "latitude+longitude";

pub fn normalize(table: &Table) -> Result<Vec<LocationRecord>> {
  let has_coordinates = table.has_column(LATITUDE) && table.has_column(LONGITUDE);
  let has_address = table.has_column(ADDRESS);

  if !has_coordinates && !has_address {
    return Err(PipelineError::missing_location_columns(vec![
      COORDINATE_GROUP.to_string(),
      ADDRESS.to_string(),
    ]));
  }

  table.rows().map(|row| normalize_row(&row)).collect()
}

fn normalize_row(row: &Row<'_>) -> Result<LocationRecord> {
  // Description and type are copied verbatim; location cells are trimmed
  let description = row.raw(DESCRIPTION).unwrap_or(DEFAULT_DESCRIPTION).to_string();
  let category_label = row.raw(TYPE).unwrap_or(DEFAULT_CATEGORY).to_string();

  let (coordinates, address) = match parse_coordinates(row)? {
    Some(coordinates) => (Some(coordinates), None),
    None => match row.get(ADDRESS) {
      Some(address) => (None, Some(address.to_string())),
      None => return Err(PipelineError::missing_row_location(row.number(), absent_groups(row))),
    },
  };

  Ok(LocationRecord { description, category_label, address, coordinates })
}

/// Coordinates when both cells are filled; a half-filled pair is invalid input
fn parse_coordinates(row: &Row<'_>) -> Result<Option<Coordinates>> {
  match (row.get(LATITUDE), row.get(LONGITUDE)) {
    (Some(latitude), Some(longitude)) => {
      let latitude = parse_degrees(row, LATITUDE, latitude, 90.0)?;
      let longitude = parse_degrees(row, LONGITUDE, longitude, 180.0)?;
      Ok(Some(Coordinates::new(latitude, longitude)))
    }
    (Some(_), None) if row.get(ADDRESS).is_none() => {
      Err(PipelineError::invalid_coordinate(row.number(), LONGITUDE, ""))
    }
    (None, Some(_)) if row.get(ADDRESS).is_none() => {
      Err(PipelineError::invalid_coordinate(row.number(), LATITUDE, ""))
    }
    _ => Ok(None),
  }
}

fn parse_degrees(row: &Row<'_>, column: &str, raw: &str, limit: f64) -> Result<f64> {
  match raw.parse::<f64>() {
    Ok(value) if value.is_finite() && value.abs() <= limit => Ok(value),
    _ => Err(PipelineError::invalid_coordinate(row.number(), column, raw)),
  }
}

fn absent_groups(row: &Row<'_>) -> Vec<String> {
  let mut missing = Vec::new();
  if row.get(LATITUDE).is_none() || row.get(LONGITUDE).is_none() {
    missing.push(COORDINATE_GROUP.to_string());
  }
  if row.get(ADDRESS).is_none() {
    missing.push(ADDRESS.to_string());
  }
  missing
}
