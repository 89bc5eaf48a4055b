//! Renderer-agnostic result of one pipeline run

use serde::Serialize;

use crate::categorizer::CategoryTable;
use crate::record::{Coordinates, ResolvedLocation, DEFAULT_DESCRIPTION};
use crate::route::{Optimization, RouteLeg, RouteSource};

/// One marker on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
  #[serde(flatten)]
  pub location: ResolvedLocation,
  pub color: String,
  /// 1-based position in visiting order
  pub stop_index: usize,
}

impl Stop {
  /// Marker popup text
  pub fn popup(&self) -> &str {
    if self.location.description.is_empty() {
      DEFAULT_DESCRIPTION
    } else {
      &self.location.description
    }
  }

  pub fn coordinates(&self) -> Coordinates {
    self.location.coordinates
  }
}

/// Stops in visiting order, with legs and path only when a route was found.
///
/// `legs` and `path` are empty together; when present, `legs` has one
/// entry fewer than `stops` and the trip back is `return_leg`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RouteView {
  pub stops: Vec<Stop>,
  pub legs: Vec<RouteLeg>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub return_leg: Option<RouteLeg>,
  pub path: Vec<Coordinates>,
  pub source: RouteSource,
}

impl RouteView {
  /// Where a map should centre: the first stop
  pub fn center(&self) -> Option<Coordinates> {
    self.stops.first().map(Stop::coordinates)
  }

  pub fn is_routed(&self) -> bool {
    !self.legs.is_empty()
  }

  /// Whole round trip including the return leg
  pub fn total_distance_meters(&self) -> f64 {
    self.legs.iter().chain(self.return_leg.iter()).map(|leg| leg.distance_meters).sum()
  }
}

/// Merge resolved locations, colors and the optimizer result.
///
/// An optimization that does not match `locations` is ignored and the stops
/// keep their input order.
pub fn assemble(
  locations: Vec<ResolvedLocation>,
  categories: &CategoryTable,
  optimization: Optimization,
) -> RouteView {
  let routed = !optimization.is_empty() && fits(&optimization, locations.len());
  if !optimization.is_empty() && !routed {
    tracing::warn!(stops = locations.len(), "discarding route that does not match the stops");
  }

  let order: Vec<usize> = if routed {
    std::iter::once(0).chain(optimization.visiting_order.iter().copied()).collect()
  } else {
    (0..locations.len()).collect()
  };

  let mut slots: Vec<Option<ResolvedLocation>> = locations.into_iter().map(Some).collect();
  let stops = order
    .into_iter()
    .filter_map(|index| slots.get_mut(index).and_then(Option::take))
    .enumerate()
    .map(|(position, location)| Stop {
      color: categories.color_for(&location.category_label).to_string(),
      location,
      stop_index: position + 1,
    })
    .collect();

  if routed {
    RouteView {
      stops,
      legs: optimization.legs,
      return_leg: optimization.return_leg,
      path: optimization.path,
      source: optimization.source,
    }
  } else {
    RouteView { stops, ..RouteView::default() }
  }
}

/// Visiting order is a permutation of 1..n-1 with one leg per hop
fn fits(optimization: &Optimization, stops: usize) -> bool {
  if stops < 2 || optimization.visiting_order.len() != stops - 1 {
    return false;
  }
  if optimization.legs.len() != stops - 1 || optimization.path.is_empty() {
    return false;
  }
  let mut seen = vec![false; stops];
  optimization.visiting_order.iter().all(|&index| {
    let fresh = index > 0 && index < stops && !seen[index];
    if fresh {
      seen[index] = true;
    }
    fresh
  })
}
