use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use super::{build_client, parse_endpoint, STATUS_OK, STATUS_ZERO_RESULTS};
use crate::config::GeocodingConfig;
use crate::geocode::{GeocodeError, GeocodingProvider};
use crate::record::Coordinates;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
  status: String,
  #[serde(default)]
  results: Vec<GeocodeResult>,
  #[serde(default)]
  error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
  geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
  location: LatLng,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatLng {
  pub lat: f64,
  pub lng: f64,
}

impl From<&LatLng> for Coordinates {
  fn from(location: &LatLng) -> Self {
    Coordinates::new(location.lat, location.lng)
  }
}

/// Google Geocoding API client
pub struct GoogleGeocoder {
  client: Client,
  endpoint: Url,
  api_key: String,
  region: Option<String>,
}

impl GoogleGeocoder {
  pub fn new(api_key: impl Into<String>, config: &GeocodingConfig) -> Result<Self, GeocodeError> {
    let endpoint = parse_endpoint(&config.base_url).map_err(GeocodeError::unavailable)?;
    let client = build_client(config.timeout()).map_err(GeocodeError::unavailable)?;
    Ok(Self { client, endpoint, api_key: api_key.into(), region: config.region.clone() })
  }

  async fn fetch(&self, address: &str) -> Result<GeocodeResponse, GeocodeError> {
    let mut params = vec![("address", address), ("key", self.api_key.as_str())];
    if let Some(region) = &self.region {
      params.push(("region", region.as_str()));
    }

    let response = self
      .client
      .get(self.endpoint.clone())
      .query(&params)
      .send()
      .await
      .map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
      return Err(http_error(status));
    }

    response
      .json::<GeocodeResponse>()
      .await
      .map_err(|e| GeocodeError::provider(format!("malformed geocoding response: {e}")))
  }
}

#[async_trait]
impl GeocodingProvider for GoogleGeocoder {
  async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
    let response = self.fetch(address).await?;
    interpret(response)
  }
}

fn interpret(response: GeocodeResponse) -> Result<Coordinates, GeocodeError> {
  let detail = response.error_message.unwrap_or_default();
  match response.status.as_str() {
    STATUS_OK => response
      .results
      .first()
      .map(|result| Coordinates::from(&result.geometry.location))
      .ok_or(GeocodeError::NotFound),
    STATUS_ZERO_RESULTS => Err(GeocodeError::NotFound),
    "OVER_QUERY_LIMIT" => Err(GeocodeError::RateLimited),
    "REQUEST_DENIED" | "OVER_DAILY_LIMIT" => {
      Err(GeocodeError::unavailable(with_detail(&response.status, &detail)))
    }
    "INVALID_REQUEST" if mentions_key(&detail) => {
      Err(GeocodeError::unavailable(with_detail(&response.status, &detail)))
    }
    status => Err(GeocodeError::provider(with_detail(status, &detail))),
  }
}

fn mentions_key(detail: &str) -> bool {
  detail.to_ascii_lowercase().contains("key")
}

fn with_detail(status: &str, detail: &str) -> String {
  if detail.is_empty() {
    status.to_string()
  } else {
    format!("{status}: {detail}")
  }
}

fn http_error(status: StatusCode) -> GeocodeError {
  match status {
    StatusCode::TOO_MANY_REQUESTS => GeocodeError::RateLimited,
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
      GeocodeError::unavailable(format!("HTTP {status}"))
    }
    _ => GeocodeError::provider(format!("HTTP {status}")),
  }
}

/// Only a host that cannot be resolved means no address can resolve;
/// refused or reset connections fail the one lookup.
fn transport_error(error: reqwest::Error) -> GeocodeError {
  if error.is_timeout() {
    GeocodeError::Timeout
  } else if error.is_connect() && is_dns_failure(&error) {
    GeocodeError::unavailable(format!("cannot resolve geocoding service host: {error}"))
  } else {
    GeocodeError::provider(format!("network error: {}", error_chain(&error)))
  }
}

/// hyper's connector reports resolver failures as "dns error" in the source chain
fn is_dns_failure(error: &(dyn std::error::Error + 'static)) -> bool {
  let mut current = Some(error);
  while let Some(error) = current {
    if is_dns_message(&error.to_string()) {
      return true;
    }
    current = error.source();
  }
  false
}

fn is_dns_message(message: &str) -> bool {
  let message = message.to_ascii_lowercase();
  message.contains("dns error") || message.contains("failed to lookup address")
}

fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
  let mut parts = vec![error.to_string()];
  let mut current = error.source();
  while let Some(source) = current {
    parts.push(source.to_string());
    current = source.source();
  }
  parts.join(": ")
}
