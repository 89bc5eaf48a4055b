use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::geocoding::LatLng;
use super::{build_client, parse_endpoint, STATUS_OK, STATUS_ZERO_RESULTS};
use crate::config::RoutingConfig;
use crate::record::Coordinates;
use crate::route::{
  PathGeometry, ProviderLeg, ProviderStep, RoutePlan, RouteRequest, RoutingError, RoutingProvider,
};

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
  status: String,
  #[serde(default)]
  routes: Vec<Route>,
  #[serde(default)]
  error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Route {
  #[serde(default)]
  waypoint_order: Vec<usize>,
  #[serde(default)]
  legs: Vec<Leg>,
  #[serde(default)]
  overview_polyline: Option<Polyline>,
}

#[derive(Debug, Deserialize)]
struct Polyline {
  #[serde(default)]
  points: String,
}

#[derive(Debug, Deserialize)]
struct Leg {
  #[serde(default)]
  distance: Option<Distance>,
  #[serde(default)]
  duration: Option<TextValue>,
  #[serde(default)]
  steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
  #[serde(default)]
  html_instructions: String,
  #[serde(default)]
  distance: Option<Distance>,
  #[serde(default)]
  duration: Option<TextValue>,
  #[serde(default)]
  start_location: Option<LatLng>,
  #[serde(default)]
  end_location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct Distance {
  value: f64,
}

#[derive(Debug, Deserialize)]
struct TextValue {
  text: String,
}

/// Google Directions API client, requesting optimized round trips
pub struct GoogleDirections {
  client: Client,
  endpoint: Url,
  api_key: String,
  mode: String,
}

impl GoogleDirections {
  pub fn new(api_key: impl Into<String>, config: &RoutingConfig) -> Result<Self, RoutingError> {
    let endpoint = parse_endpoint(&config.base_url).map_err(RoutingError::unavailable)?;
    let client = build_client(config.timeout()).map_err(RoutingError::unavailable)?;
    Ok(Self { client, endpoint, api_key: api_key.into(), mode: config.mode.clone() })
  }
}

#[async_trait]
impl RoutingProvider for GoogleDirections {
  async fn plan(&self, request: &RouteRequest) -> Result<RoutePlan, RoutingError> {
    let origin = request.origin.to_query();
    let waypoints = waypoints_param(request);

    let mut params = vec![
      ("origin", origin.as_str()),
      ("destination", origin.as_str()),
      ("mode", self.mode.as_str()),
      ("key", self.api_key.as_str()),
    ];
    if let Some(waypoints) = &waypoints {
      params.push(("waypoints", waypoints.as_str()));
    }

    let response = self
      .client
      .get(self.endpoint.clone())
      .query(&params)
      .send()
      .await
      .map_err(|e| RoutingError::unavailable(format!("cannot reach directions service: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      return Err(RoutingError::unavailable(format!("HTTP {status}")));
    }

    let body = response
      .json::<DirectionsResponse>()
      .await
      .map_err(|e| RoutingError::invalid_response(format!("malformed directions response: {e}")))?;

    interpret(body)
  }
}

/// `optimize:true|lat,lng|lat,lng`
fn waypoints_param(request: &RouteRequest) -> Option<String> {
  if request.waypoints.is_empty() {
    return None;
  }
  let mut parts = Vec::with_capacity(request.waypoints.len() + 1);
  if request.optimize_waypoints {
    parts.push("optimize:true".to_string());
  }
  parts.extend(request.waypoints.iter().map(Coordinates::to_query));
  Some(parts.join("|"))
}

fn interpret(response: DirectionsResponse) -> Result<RoutePlan, RoutingError> {
  match response.status.as_str() {
    STATUS_OK => {}
    STATUS_ZERO_RESULTS => return Err(RoutingError::empty(STATUS_ZERO_RESULTS)),
    status => {
      let reason = match response.error_message {
        Some(detail) => format!("{status}: {detail}"),
        None => status.to_string(),
      };
      return Err(RoutingError::unavailable(reason));
    }
  }

  let route = response
    .routes
    .into_iter()
    .next()
    .ok_or_else(|| RoutingError::empty("response contains no routes"))?;

  let geometry = geometry_of(&route);
  let legs = route.legs.into_iter().map(convert_leg).collect();

  Ok(RoutePlan { waypoint_order: route.waypoint_order, legs, geometry })
}

/// Prefer the overview polyline; fall back to the step endpoints
fn geometry_of(route: &Route) -> PathGeometry {
  if let Some(polyline) = route.overview_polyline.as_ref().filter(|p| !p.points.is_empty()) {
    return PathGeometry::Encoded(polyline.points.clone());
  }

  let steps = route.legs.iter().flat_map(|leg| leg.steps.iter());
  let mut points: Vec<Coordinates> = Vec::new();
  for step in steps {
    if points.is_empty() {
      if let Some(start) = &step.start_location {
        points.push(start.into());
      }
    }
    if let Some(end) = &step.end_location {
      points.push(end.into());
    }
  }

  if points.is_empty() {
    PathGeometry::Absent
  } else {
    PathGeometry::Points(points)
  }
}

fn convert_leg(leg: Leg) -> ProviderLeg {
  ProviderLeg {
    distance_meters: leg.distance.map(|d| d.value).unwrap_or_default(),
    duration: leg.duration.map(|d| d.text),
    steps: leg
      .steps
      .into_iter()
      .map(|step| ProviderStep {
        html_instruction: step.html_instructions,
        distance_meters: step.distance.map(|d| d.value).unwrap_or_default(),
        duration: step.duration.map(|d| d.text),
      })
      .collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn response(json: &str) -> DirectionsResponse {
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn test_waypoints_param_requests_optimization() {
    let request = RouteRequest {
      origin: Coordinates::new(52.0, 13.0),
      waypoints: vec![Coordinates::new(52.1, 13.1), Coordinates::new(52.2, 13.2)],
      optimize_waypoints: true,
    };
    assert_eq!(
      waypoints_param(&request).as_deref(),
      Some("optimize:true|52.1,13.1|52.2,13.2")
    );
  }

  #[test]
  fn test_ok_response_maps_order_legs_and_polyline() {
    let plan = interpret(response(
      r#"{"status":"OK","routes":[{
        "waypoint_order":[1,0],
        "overview_polyline":{"points":"_p~iF~ps|U"},
        "legs":[{
          "distance":{"value":1200,"text":"1.2 km"},
          "duration":{"value":180,"text":"3 mins"},
          "steps":[{"html_instructions":"Head <b>north</b>","distance":{"value":1200},"duration":{"text":"3 mins"}}]
        }]
      }]}"#,
    ))
    .unwrap();

    assert_eq!(plan.waypoint_order, vec![1, 0]);
    assert_eq!(plan.legs[0].distance_meters, 1200.0);
    assert_eq!(plan.legs[0].duration.as_deref(), Some("3 mins"));
    assert_eq!(plan.legs[0].steps[0].html_instruction, "Head <b>north</b>");
    assert_eq!(plan.geometry, PathGeometry::Encoded("_p~iF~ps|U".to_string()));
  }

  #[test]
  fn test_missing_polyline_falls_back_to_step_locations() {
    let plan = interpret(response(
      r#"{"status":"OK","routes":[{"legs":[{"steps":[
        {"html_instructions":"a","start_location":{"lat":1.0,"lng":2.0},"end_location":{"lat":3.0,"lng":4.0}},
        {"html_instructions":"b","start_location":{"lat":3.0,"lng":4.0},"end_location":{"lat":5.0,"lng":6.0}}
      ]}]}]}"#,
    ))
    .unwrap();

    assert_eq!(
      plan.geometry,
      PathGeometry::Points(vec![
        Coordinates::new(1.0, 2.0),
        Coordinates::new(3.0, 4.0),
        Coordinates::new(5.0, 6.0)
      ])
    );
  }

  #[test]
  fn test_no_route_statuses() {
    assert_eq!(
      interpret(response(r#"{"status":"ZERO_RESULTS","routes":[]}"#)),
      Err(RoutingError::empty("ZERO_RESULTS"))
    );
    assert!(matches!(
      interpret(response(r#"{"status":"OK","routes":[]}"#)),
      Err(RoutingError::Empty { .. })
    ));
    assert_eq!(
      interpret(response(r#"{"status":"REQUEST_DENIED","error_message":"bad key"}"#)),
      Err(RoutingError::unavailable("REQUEST_DENIED: bad key"))
    );
  }
}
