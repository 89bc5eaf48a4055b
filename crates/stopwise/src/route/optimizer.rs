use std::sync::Arc;
use std::time::Duration;

use super::instructions::to_plain_text;
use super::{
  heuristic, polyline, PathGeometry, ProviderLeg, RouteLeg, RoutePlan, RouteRequest, RouteSource,
  RouteStep, RoutingError, RoutingProvider,
};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::record::Coordinates;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Optimizer result. Either fully populated or empty; never partial.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Optimization {
  /// Permutation of input indices 1..n-1; the origin (0) is implied first
  pub visiting_order: Vec<usize>,
  /// Travel between consecutive stops in visiting order
  pub legs: Vec<RouteLeg>,
  /// Last stop back to the origin
  pub return_leg: Option<RouteLeg>,
  pub path: Vec<Coordinates>,
  pub source: RouteSource,
}

impl Optimization {
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.visiting_order.is_empty()
  }

  /// Split a full round trip (n legs) into stop-to-stop legs and the return leg
  fn from_round_trip(
    visiting_order: Vec<usize>,
    mut legs: Vec<RouteLeg>,
    path: Vec<Coordinates>,
    source: RouteSource,
  ) -> Self {
    let return_leg = legs.pop();
    Self { visiting_order, legs, return_leg, path, source }
  }
}

pub enum RouteStrategy {
  Provider(Arc<dyn RoutingProvider>),
  Heuristic,
  Disabled,
}

pub struct RouteOptimizer {
  strategy: RouteStrategy,
  timeout: Duration,
}

impl RouteOptimizer {
  pub fn new(strategy: RouteStrategy) -> Self {
    Self { strategy, timeout: DEFAULT_TIMEOUT }
  }

  pub fn with_provider(provider: Arc<dyn RoutingProvider>) -> Self {
    Self::new(RouteStrategy::Provider(provider))
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Order `locations[1..]` for a round trip from `locations[0]`.
  ///
  /// Failures degrade to an empty result plus one warning in `diagnostics`.
  pub async fn optimize(
    &self,
    locations: &[Coordinates],
    diagnostics: &mut Diagnostics,
  ) -> Optimization {
    if locations.len() < 2 {
      return Optimization::empty();
    }

    match &self.strategy {
      RouteStrategy::Disabled => Optimization::empty(),
      RouteStrategy::Heuristic => {
        diagnostics.push(Diagnostic::warning(
          DiagnosticKind::RouteHeuristic,
          "No routing provider configured; stop order is a nearest-neighbour estimate with straight-line legs",
        ));
        let route = heuristic::plan(locations);
        Optimization::from_round_trip(
          route.visiting_order,
          route.legs,
          route.path,
          RouteSource::Heuristic,
        )
      }
      RouteStrategy::Provider(provider) => match self.request(provider.as_ref(), locations).await {
        Ok(optimization) => optimization,
        Err(error) => {
          let kind = match error {
            RoutingError::Unavailable { .. } => DiagnosticKind::RoutingUnavailable,
            _ => DiagnosticKind::RoutingEmpty,
          };
          diagnostics.push(Diagnostic::warning(
            kind,
            format!("Route could not be optimized, showing stops without a route: {error}"),
          ));
          Optimization::empty()
        }
      },
    }
  }

  async fn request(
    &self,
    provider: &dyn RoutingProvider,
    locations: &[Coordinates],
  ) -> Result<Optimization, RoutingError> {
    let request = RouteRequest {
      origin: locations[0],
      waypoints: locations[1..].to_vec(),
      optimize_waypoints: true,
    };
    tracing::debug!(waypoints = request.waypoints.len(), "requesting optimized route");

    let plan = tokio::time::timeout(self.timeout, provider.plan(&request))
      .await
      .map_err(|_| RoutingError::unavailable("request timed out"))??;

    apply_plan(plan, request.waypoints.len())
  }
}

/// Validate a provider plan and convert it into input-index order
fn apply_plan(plan: RoutePlan, waypoint_count: usize) -> Result<Optimization, RoutingError> {
  let order = normalize_order(&plan.waypoint_order, waypoint_count)?;

  if plan.legs.len() != waypoint_count + 1 {
    return Err(RoutingError::empty(format!(
      "expected {} legs for the round trip, got {}",
      waypoint_count + 1,
      plan.legs.len()
    )));
  }

  let path = match plan.geometry {
    PathGeometry::Points(points) => points,
    PathGeometry::Encoded(encoded) => polyline::decode(&encoded)
      .map_err(|e| RoutingError::invalid_response(format!("undecodable path: {e}")))?,
    PathGeometry::Absent => Vec::new(),
  };
  if path.is_empty() {
    return Err(RoutingError::empty("route has no path geometry"));
  }

  let visiting_order = order.into_iter().map(|waypoint| waypoint + 1).collect();
  let legs = plan.legs.into_iter().map(plain_leg).collect();
  Ok(Optimization::from_round_trip(visiting_order, legs, path, RouteSource::Provider))
}

/// Accept a zero-based permutation of the waypoints, or a one-based one.
/// An empty order means the provider kept the input order.
fn normalize_order(order: &[usize], waypoint_count: usize) -> Result<Vec<usize>, RoutingError> {
  if order.is_empty() {
    return Ok((0..waypoint_count).collect());
  }
  if is_permutation(order, 0, waypoint_count) {
    return Ok(order.to_vec());
  }
  if is_permutation(order, 1, waypoint_count) {
    return Ok(order.iter().map(|index| index - 1).collect());
  }
  Err(RoutingError::empty(format!(
    "waypoint order {order:?} is not a permutation of {waypoint_count} stops"
  )))
}

fn is_permutation(order: &[usize], base: usize, count: usize) -> bool {
  if order.len() != count {
    return false;
  }
  let mut seen = vec![false; count];
  for &index in order {
    match index.checked_sub(base) {
      Some(slot) if slot < count && !seen[slot] => seen[slot] = true,
      _ => return false,
    }
  }
  true
}

fn plain_leg(leg: ProviderLeg) -> RouteLeg {
  let steps: Vec<RouteStep> = leg
    .steps
    .into_iter()
    .map(|step| RouteStep {
      instruction: to_plain_text(&step.html_instruction),
      distance_meters: step.distance_meters,
      duration: step.duration,
    })
    .collect();

  let instruction_text = steps
    .iter()
    .map(|step| step.instruction.as_str())
    .filter(|text| !text.is_empty())
    .collect::<Vec<_>>()
    .join("\n");

  RouteLeg { instruction_text, distance_meters: leg.distance_meters, duration: leg.duration, steps }
}
