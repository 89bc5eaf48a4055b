//! Google Maps Platform adapters for the provider traits

use reqwest::Client;
use std::time::Duration;
use url::Url;

pub mod directions;
pub mod geocoding;

pub use directions::GoogleDirections;
pub use geocoding::GoogleGeocoder;

const USER_AGENT: &str = concat!("stopwise/", env!("CARGO_PKG_VERSION"));

/// Status values shared by the geocoding and directions APIs
pub(crate) const STATUS_OK: &str = "OK";
pub(crate) const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

fn build_client(timeout: Duration) -> Result<Client, String> {
  Client::builder()
    .timeout(timeout)
    .user_agent(USER_AGENT)
    .build()
    .map_err(|e| format!("failed to create HTTP client: {e}"))
}

fn parse_endpoint(base_url: &str) -> Result<Url, String> {
  let url = Url::parse(base_url).map_err(|e| format!("invalid endpoint '{base_url}': {e}"))?;
  match url.scheme() {
    "http" | "https" => Ok(url),
    scheme => Err(format!("unsupported endpoint scheme '{scheme}' in '{base_url}'")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_endpoint() {
    assert!(parse_endpoint("https://maps.googleapis.com/maps/api/geocode/json").is_ok());
    assert!(parse_endpoint("http://127.0.0.1:1234/geocode").is_ok());
    assert!(parse_endpoint("not a url").is_err());
    assert!(parse_endpoint("ftp://example.com/geocode").unwrap_err().contains("ftp"));
  }
}
