//! Configuration management for stopwise
//!
//! Provider endpoints, timeouts, concurrency and the category color table.
//! Credentials are never part of the file; callers pass them to the
//! provider constructors.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::categorizer::CategoryTable;
use crate::error::ConfigError;

pub const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const GOOGLE_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

const CONFIG_PATHS: [&str; 3] = [".stopwise.json", "stopwise.json", ".stopwise/config.json"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopwiseConfig {
  #[serde(default)]
  pub geocoding: GeocodingConfig,
  #[serde(default)]
  pub routing: RoutingConfig,
  #[serde(default)]
  pub categories: CategoryTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderKind {
  Google,
  None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterKind {
  Google,
  Heuristic,
  None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingConfig {
  #[serde(default = "default_geocoder")]
  pub provider: GeocoderKind,
  #[serde(default = "default_geocode_url")]
  pub base_url: String,
  #[serde(default = "default_geocode_timeout")]
  pub timeout_secs: u64,
  /// Distinct addresses resolved at once
  #[serde(default = "default_concurrency")]
  pub concurrency: usize,
  /// Region bias hint, e.g. "de"
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
  #[serde(default = "default_router")]
  pub provider: RouterKind,
  #[serde(default = "default_directions_url")]
  pub base_url: String,
  #[serde(default = "default_routing_timeout")]
  pub timeout_secs: u64,
  #[serde(default = "default_mode")]
  pub mode: String,
}

fn default_geocoder() -> GeocoderKind {
  GeocoderKind::Google
}
fn default_geocode_url() -> String {
  GOOGLE_GEOCODE_URL.to_string()
}
fn default_geocode_timeout() -> u64 {
  10
}
fn default_concurrency() -> usize {
  4
}
fn default_router() -> RouterKind {
  RouterKind::Google
}
fn default_directions_url() -> String {
  GOOGLE_DIRECTIONS_URL.to_string()
}
fn default_routing_timeout() -> u64 {
  20
}
fn default_mode() -> String {
  "driving".to_string()
}

impl Default for GeocodingConfig {
  fn default() -> Self {
    Self {
      provider: default_geocoder(),
      base_url: default_geocode_url(),
      timeout_secs: default_geocode_timeout(),
      concurrency: default_concurrency(),
      region: None,
    }
  }
}

impl Default for RoutingConfig {
  fn default() -> Self {
    Self {
      provider: default_router(),
      base_url: default_directions_url(),
      timeout_secs: default_routing_timeout(),
      mode: default_mode(),
    }
  }
}

impl GeocodingConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  pub fn concurrency(&self) -> usize {
    self.concurrency.max(1)
  }
}

impl RoutingConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

impl StopwiseConfig {
  /// Load configuration from a file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let content =
      std::fs::read_to_string(path).map_err(|e| ConfigError::read(&display, e.to_string()))?;
    let config: StopwiseConfig =
      serde_json::from_str(&content).map_err(|e| ConfigError::read(&display, e.to_string()))?;
    config.validate()?;
    Ok(config)
  }

  /// Load from an explicit path, the first config file in `dir`, or defaults
  pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
    if let Some(path) = explicit {
      return Self::load_from_file(path);
    }

    match Self::find(dir) {
      Some(path) => Self::load_from_file(path),
      None => Ok(Self::default()),
    }
  }

  fn find(dir: &Path) -> Option<PathBuf> {
    CONFIG_PATHS.iter().map(|candidate| dir.join(candidate)).find(|path| path.exists())
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.geocoding.timeout_secs == 0 {
      return Err(ConfigError::invalid("geocoding.timeout_secs must be greater than zero"));
    }
    if self.routing.timeout_secs == 0 {
      return Err(ConfigError::invalid("routing.timeout_secs must be greater than zero"));
    }
    if self.categories.default_color.trim().is_empty() {
      return Err(ConfigError::invalid("categories.default_color must not be empty"));
    }
    Ok(())
  }
}
