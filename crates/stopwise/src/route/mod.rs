use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::Coordinates;

pub mod heuristic;
pub mod instructions;
pub mod optimizer;
pub mod polyline;

pub use optimizer::{Optimization, RouteOptimizer, RouteStrategy};

/// One step between two consecutive stops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
  pub instruction_text: String,
  pub distance_meters: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub steps: Vec<RouteStep>,
}

/// One turn-by-turn instruction within a leg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
  pub instruction: String,
  pub distance_meters: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration: Option<String>,
}

/// Where a route's order and geometry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
  Provider,
  Heuristic,
  #[default]
  None,
}

/// Round trip from `origin` through `waypoints` and back
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
  pub origin: Coordinates,
  pub waypoints: Vec<Coordinates>,
  pub optimize_waypoints: bool,
}

/// Path geometry as the provider delivered it
#[derive(Debug, Clone, PartialEq)]
pub enum PathGeometry {
  Points(Vec<Coordinates>),
  /// Google encoded polyline, precision 5
  Encoded(String),
  Absent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderStep {
  /// Raw instruction, may contain HTML markup and entities
  pub html_instruction: String,
  pub distance_meters: f64,
  pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderLeg {
  pub distance_meters: f64,
  pub duration: Option<String>,
  pub steps: Vec<ProviderStep>,
}

/// Provider answer before decoding and validation
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
  /// Visiting order over `waypoints` as the provider reports it
  pub waypoint_order: Vec<usize>,
  pub legs: Vec<ProviderLeg>,
  pub geometry: PathGeometry,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
  #[error("routing provider unavailable: {reason}")]
  Unavailable { reason: String },

  #[error("routing provider returned no route: {reason}")]
  Empty { reason: String },

  #[error("routing response rejected: {reason}")]
  InvalidResponse { reason: String },
}

impl RoutingError {
  pub fn unavailable(reason: impl Into<String>) -> Self {
    Self::Unavailable { reason: reason.into() }
  }

  pub fn empty(reason: impl Into<String>) -> Self {
    Self::Empty { reason: reason.into() }
  }

  pub fn invalid_response(reason: impl Into<String>) -> Self {
    Self::InvalidResponse { reason: reason.into() }
  }
}

/// External service computing an optimized round trip
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoutingProvider: Send + Sync {
  async fn plan(&self, request: &RouteRequest) -> Result<RoutePlan, RoutingError>;
}
