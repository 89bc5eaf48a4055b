//! Encoded polyline decoding (Google's algorithm, 1e5 precision)

use thiserror::Error;

use crate::record::Coordinates;

const PRECISION: f64 = 1e5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolylineError {
  #[error("invalid polyline byte {byte:#04x} at offset {offset}")]
  InvalidByte { byte: u8, offset: usize },

  #[error("polyline truncated at offset {offset}")]
  Truncated { offset: usize },

  #[error("polyline value overflows at offset {offset}")]
  Overflow { offset: usize },
}

pub fn decode(encoded: &str) -> Result<Vec<Coordinates>, PolylineError> {
  let bytes = encoded.as_bytes();
  let mut points = Vec::new();
  let mut offset = 0;
  let (mut latitude, mut longitude) = (0_i64, 0_i64);

  while offset < bytes.len() {
    latitude += next_value(bytes, &mut offset)?;
    longitude += next_value(bytes, &mut offset)?;
    points.push(Coordinates::new(latitude as f64 / PRECISION, longitude as f64 / PRECISION));
  }

  Ok(points)
}

/// Read one zig-zag encoded, 5-bit chunked delta
fn next_value(bytes: &[u8], offset: &mut usize) -> Result<i64, PolylineError> {
  let mut result = 0_i64;
  let mut shift = 0;

  loop {
    let byte = *bytes.get(*offset).ok_or(PolylineError::Truncated { offset: *offset })?;
    if !(63..127).contains(&byte) {
      return Err(PolylineError::InvalidByte { byte, offset: *offset });
    }
    if shift > 30 {
      return Err(PolylineError::Overflow { offset: *offset });
    }

    let chunk = i64::from(byte - 63);
    result |= (chunk & 0x1f) << shift;
    shift += 5;
    *offset += 1;

    if chunk < 0x20 {
      break;
    }
  }

  Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}
