use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;

use super::cache::GeocodeCache;
use super::{normalize_address, GeocodeError, GeocodingProvider};
use crate::error::{PipelineError, Result};
use crate::record::{LocationRecord, ResolvedLocation};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Output of the resolution stage
#[derive(Debug, Clone, Default)]
pub struct Resolution {
  /// Surviving records, in input order
  pub locations: Vec<ResolvedLocation>,
  /// Records dropped because their address failed
  pub dropped: usize,
  /// One entry per distinct failed address, in first-seen order
  pub failures: Vec<(String, GeocodeError)>,
  /// Outbound provider requests issued
  pub requests: usize,
}

enum Outcome {
  Resolved(ResolvedLocation),
  Dropped { address: String, reason: GeocodeError },
}

/// Fills in coordinates for address-only records.
///
/// Fail-soft per record: a failed address drops its records. Fail-hard only
/// when the provider is globally unavailable.
pub struct GeocodeResolver {
  provider: Option<Arc<dyn GeocodingProvider>>,
  missing_reason: String,
  concurrency: usize,
  timeout: Duration,
}

impl GeocodeResolver {
  pub fn new(provider: Arc<dyn GeocodingProvider>) -> Self {
    Self {
      provider: Some(provider),
      missing_reason: String::new(),
      concurrency: 1,
      timeout: DEFAULT_TIMEOUT,
    }
  }

  /// A resolver that can only pass through records with coordinates
  pub fn unavailable(reason: impl Into<String>) -> Self {
    Self { provider: None, missing_reason: reason.into(), concurrency: 1, timeout: DEFAULT_TIMEOUT }
  }

  pub fn with_concurrency(mut self, concurrency: usize) -> Self {
    self.concurrency = concurrency.max(1);
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub async fn resolve(&self, records: Vec<LocationRecord>) -> Result<Resolution> {
    let cache = GeocodeCache::new();

    // buffered() keeps input order while up to `concurrency` lookups run
    let outcomes: Vec<Outcome> = stream::iter(records)
      .map(|record| self.resolve_record(&cache, record))
      .buffered(self.concurrency)
      .try_collect()
      .await?;

    let mut resolution = Resolution { requests: cache.requests(), ..Resolution::default() };
    for outcome in outcomes {
      match outcome {
        Outcome::Resolved(location) => resolution.locations.push(location),
        Outcome::Dropped { address, reason } => {
          resolution.dropped += 1;
          if !resolution.failures.iter().any(|(seen, _)| *seen == address) {
            resolution.failures.push((address, reason));
          }
        }
      }
    }

    tracing::debug!(
      resolved = resolution.locations.len(),
      dropped = resolution.dropped,
      requests = resolution.requests,
      "geocoding finished"
    );
    Ok(resolution)
  }

  async fn resolve_record(&self, cache: &GeocodeCache, record: LocationRecord) -> Result<Outcome> {
    let record = match record.into_resolved() {
      Ok(location) => return Ok(Outcome::Resolved(location)),
      Err(record) => record,
    };

    let address = normalize_address(record.address.as_deref().unwrap_or_default());
    if address.is_empty() {
      return Ok(Outcome::Dropped { address, reason: GeocodeError::NotFound });
    }

    let provider = match &self.provider {
      Some(provider) => provider,
      None => return Err(PipelineError::resolver_unavailable(&self.missing_reason)),
    };

    let lookup = cache.get_or_resolve(&address, || self.lookup(provider.as_ref(), &address)).await;
    if lookup.hit {
      tracing::debug!(address = %address, "geocode cache hit");
    }

    match lookup.entry {
      Ok(coordinates) => Ok(Outcome::Resolved(record.resolve(coordinates))),
      Err(reason) if reason.is_global() => {
        Err(PipelineError::resolver_unavailable(reason.to_string()))
      }
      Err(reason) => Ok(Outcome::Dropped { address, reason }),
    }
  }

  async fn lookup(
    &self,
    provider: &dyn GeocodingProvider,
    address: &str,
  ) -> std::result::Result<crate::record::Coordinates, GeocodeError> {
    tracing::debug!(address = %address, "geocoding address");
    match tokio::time::timeout(self.timeout, provider.geocode(address)).await {
      Ok(Ok(coordinates)) if coordinates.is_valid() => Ok(coordinates),
      Ok(Ok(coordinates)) => Err(GeocodeError::provider(format!(
        "provider returned out-of-range coordinates ({}, {})",
        coordinates.latitude, coordinates.longitude
      ))),
      Ok(Err(error)) => Err(error),
      Err(_) => Err(GeocodeError::Timeout),
    }
  }
}
