//! Local nearest-neighbour ordering, used when no routing provider is configured

use super::{RouteLeg, RouteStep};
use crate::record::Coordinates;

/// Straight-line round trip in greedy nearest-neighbour order
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicRoute {
  /// Input indices 1..n in visiting order
  pub visiting_order: Vec<usize>,
  /// Origin to first stop, ..., last stop back to origin
  pub legs: Vec<RouteLeg>,
  pub path: Vec<Coordinates>,
}

/// Visit the closest unvisited location next, starting at `locations[0]`.
/// Ties go to the lower input index.
pub fn nearest_neighbor_order(locations: &[Coordinates]) -> Vec<usize> {
  let mut remaining: Vec<usize> = (1..locations.len()).collect();
  let mut order = Vec::with_capacity(remaining.len());
  let mut current = 0;

  while !remaining.is_empty() {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (position, &candidate) in remaining.iter().enumerate() {
      let distance = locations[current].haversine_meters(&locations[candidate]);
      if distance < best_distance {
        best = position;
        best_distance = distance;
      }
    }
    current = remaining.remove(best);
    order.push(current);
  }

  order
}

pub fn plan(locations: &[Coordinates]) -> HeuristicRoute {
  let visiting_order = nearest_neighbor_order(locations);

  let mut sequence = Vec::with_capacity(visiting_order.len() + 2);
  sequence.push(0);
  sequence.extend(visiting_order.iter().copied());
  sequence.push(0);

  let legs = sequence
    .windows(2)
    .enumerate()
    .map(|(position, pair)| {
      let instruction = if pair[1] == 0 {
        "Return to the starting point".to_string()
      } else {
        format!("Continue to stop {}", position + 2)
      };
      straight_leg(&locations[pair[0]], &locations[pair[1]], instruction)
    })
    .collect();

  let path = sequence.iter().map(|&index| locations[index]).collect();

  HeuristicRoute { visiting_order, legs, path }
}

fn straight_leg(from: &Coordinates, to: &Coordinates, instruction: String) -> RouteLeg {
  let distance_meters = from.haversine_meters(to).round();
  RouteLeg {
    instruction_text: instruction.clone(),
    distance_meters,
    duration: None,
    steps: vec![RouteStep { instruction, distance_meters, duration: None }],
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn line() -> Vec<Coordinates> {
    // Origin at 0, stops listed out of order along one meridian
    vec![
      Coordinates::new(0.0, 0.0),
      Coordinates::new(0.3, 0.0),
      Coordinates::new(0.1, 0.0),
      Coordinates::new(0.2, 0.0),
    ]
  }

  #[test]
  fn test_nearest_neighbor_walks_outward() {
    assert_eq!(nearest_neighbor_order(&line()), vec![2, 3, 1]);
  }

  #[test]
  fn test_ties_prefer_lower_index() {
    let locations = vec![
      Coordinates::new(0.0, 0.0),
      Coordinates::new(0.0, 0.1),
      Coordinates::new(0.0, -0.1),
    ];
    assert_eq!(nearest_neighbor_order(&locations)[0], 1);
  }

  #[test]
  fn test_plan_builds_closed_straight_line_route() {
    let route = plan(&line());

    assert_eq!(route.legs.len(), 4);
    assert_eq!(route.path.len(), 5);
    assert_eq!(route.path.first(), route.path.last());
    assert_eq!(route.legs[0].instruction_text, "Continue to stop 2");
    assert_eq!(route.legs[2].instruction_text, "Continue to stop 4");
    assert_eq!(route.legs[3].instruction_text, "Return to the starting point");
    assert!(route.legs.iter().all(|leg| leg.distance_meters > 0.0 && leg.duration.is_none()));
  }

  #[test]
  fn test_single_location_has_only_an_empty_round_trip() {
    let route = plan(&[Coordinates::new(1.0, 1.0)]);
    assert!(route.visiting_order.is_empty());
    assert_eq!(route.legs.len(), 1);
  }
}
