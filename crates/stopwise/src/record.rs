use serde::{Deserialize, Serialize};

pub const DEFAULT_DESCRIPTION: &str = "No Description";
pub const DEFAULT_CATEGORY: &str = "Default";

/// A WGS84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude: f64,
  pub longitude: f64,
}

impl Coordinates {
  pub fn new(latitude: f64, longitude: f64) -> Self {
    Self { latitude, longitude }
  }

  pub fn is_valid(&self) -> bool {
    self.latitude.is_finite()
      && self.longitude.is_finite()
      && (-90.0..=90.0).contains(&self.latitude)
      && (-180.0..=180.0).contains(&self.longitude)
  }

  /// Great-circle distance in meters
  pub fn haversine_meters(&self, other: &Coordinates) -> f64 {
    let r = 6_371_000.0_f64;
    let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
    let dlat = (other.latitude - self.latitude).to_radians();
    let dlng = (other.longitude - self.longitude).to_radians();
    let s1 = (dlat / 2.0).sin();
    let s2 = (dlng / 2.0).sin();
    let h = s1 * s1 + lat1.cos() * lat2.cos() * s2 * s2;
    2.0 * r * h.sqrt().asin()
  }

  /// `lat,lng` as routing and geocoding APIs expect it
  pub fn to_query(&self) -> String {
    format!("{},{}", self.latitude, self.longitude)
  }
}

/// One input row after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
  pub description: String,
  pub category_label: String,
  pub address: Option<String>,
  pub coordinates: Option<Coordinates>,
}

impl LocationRecord {
  pub fn with_coordinates(coordinates: Coordinates) -> Self {
    Self {
      description: DEFAULT_DESCRIPTION.to_string(),
      category_label: DEFAULT_CATEGORY.to_string(),
      address: None,
      coordinates: Some(coordinates),
    }
  }

  pub fn with_address(address: impl Into<String>) -> Self {
    Self {
      description: DEFAULT_DESCRIPTION.to_string(),
      category_label: DEFAULT_CATEGORY.to_string(),
      address: Some(address.into()),
      coordinates: None,
    }
  }

  pub fn described(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  pub fn labelled(mut self, category_label: impl Into<String>) -> Self {
    self.category_label = category_label.into();
    self
  }

  /// Attach resolved coordinates, consuming the unresolved record
  pub fn resolve(self, coordinates: Coordinates) -> ResolvedLocation {
    ResolvedLocation {
      description: self.description,
      category_label: self.category_label,
      address: self.address,
      coordinates,
    }
  }

  /// Records that already carry coordinates need no provider lookup
  pub fn into_resolved(self) -> Result<ResolvedLocation, LocationRecord> {
    match self.coordinates {
      Some(coordinates) => Ok(self.resolve(coordinates)),
      None => Err(self),
    }
  }
}

/// A record that survived resolution; coordinates are guaranteed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
  pub description: String,
  pub category_label: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address: Option<String>,
  pub coordinates: Coordinates,
}
