//! One batch run: normalize, resolve, categorize, optimize, assemble

use serde::Serialize;
use std::sync::Arc;

use crate::categorizer::CategoryTable;
use crate::config::{GeocoderKind, RouterKind, StopwiseConfig};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ConfigError, Result};
use crate::geocode::GeocodeResolver;
use crate::google::{GoogleDirections, GoogleGeocoder};
use crate::normalizer::normalize;
use crate::record::Coordinates;
use crate::route::{RouteOptimizer, RouteStrategy};
use crate::submission::Ticket;
use crate::table::Table;
use crate::view::{assemble, RouteView};

/// Everything a run hands to the presentation side
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
  pub route: RouteView,
  pub diagnostics: Vec<Diagnostic>,
  /// Records dropped because their address could not be resolved
  pub dropped: usize,
  pub geocode_requests: usize,
}

pub struct Pipeline {
  resolver: GeocodeResolver,
  optimizer: RouteOptimizer,
  categories: CategoryTable,
}

impl Pipeline {
  pub fn new(
    resolver: GeocodeResolver,
    optimizer: RouteOptimizer,
    categories: CategoryTable,
  ) -> Self {
    Self { resolver, optimizer, categories }
  }

  /// Wire the configured providers. `route = false` skips routing entirely.
  pub fn from_config(
    config: &StopwiseConfig,
    api_key: Option<&str>,
    route: bool,
  ) -> Result<Self, ConfigError> {
    let api_key = api_key.map(str::trim).filter(|key| !key.is_empty());

    let resolver = match (config.geocoding.provider, api_key) {
      (GeocoderKind::None, _) => {
        GeocodeResolver::unavailable("geocoding is disabled in the configuration")
      }
      (GeocoderKind::Google, None) => GeocodeResolver::unavailable("no API key configured"),
      (GeocoderKind::Google, Some(key)) => {
        let geocoder = GoogleGeocoder::new(key, &config.geocoding)
          .map_err(|e| ConfigError::invalid(format!("geocoding: {e}")))?;
        GeocodeResolver::new(Arc::new(geocoder))
          .with_concurrency(config.geocoding.concurrency())
          .with_timeout(config.geocoding.timeout())
      }
    };

    let strategy = match (route, config.routing.provider, api_key) {
      (false, _, _) | (true, RouterKind::None, _) => RouteStrategy::Disabled,
      (true, RouterKind::Heuristic, _) => RouteStrategy::Heuristic,
      (true, RouterKind::Google, None) => {
        tracing::warn!("no API key for the routing provider, using the local heuristic");
        RouteStrategy::Heuristic
      }
      (true, RouterKind::Google, Some(key)) => {
        let directions = GoogleDirections::new(key, &config.routing)
          .map_err(|e| ConfigError::invalid(format!("routing: {e}")))?;
        RouteStrategy::Provider(Arc::new(directions))
      }
    };
    let optimizer = RouteOptimizer::new(strategy).with_timeout(config.routing.timeout());

    Ok(Self::new(resolver, optimizer, config.categories.clone()))
  }

  pub fn categories(&self) -> &CategoryTable {
    &self.categories
  }

  /// Run the whole table. Either a (possibly degraded) report or one fatal error.
  pub async fn run(&self, table: &Table) -> Result<RunReport> {
    self.run_checked(table, || Ok(())).await
  }

  /// Like `run`, but discards the result once a newer submission exists
  pub async fn run_submission(&self, ticket: &Ticket, table: &Table) -> Result<RunReport> {
    ticket.ensure_current()?;
    let report = self.run_checked(table, || ticket.ensure_current()).await?;
    ticket.ensure_current()?;
    Ok(report)
  }

  async fn run_checked<F>(&self, table: &Table, still_wanted: F) -> Result<RunReport>
  where
    F: Fn() -> Result<()>,
  {
    let records = normalize(table)?;
    tracing::info!(records = records.len(), "normalized input table");

    let resolution = self.resolver.resolve(records).await?;
    still_wanted()?;

    let mut diagnostics = Diagnostics::new();
    for (address, reason) in &resolution.failures {
      diagnostics.push(Diagnostic::geocode_failure(address, reason));
    }

    let coordinates: Vec<Coordinates> =
      resolution.locations.iter().map(|location| location.coordinates).collect();
    let optimization = self.optimizer.optimize(&coordinates, &mut diagnostics).await;

    let route = assemble(resolution.locations, &self.categories, optimization);
    tracing::info!(
      stops = route.stops.len(),
      legs = route.legs.len(),
      dropped = resolution.dropped,
      "route assembled"
    );

    Ok(RunReport {
      route,
      diagnostics: diagnostics.into_vec(),
      dropped: resolution.dropped,
      geocode_requests: resolution.requests,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::diagnostics::DiagnosticKind;
  use crate::error::PipelineError;
  use crate::geocode::{GeocodeError, MockGeocodingProvider};
  use crate::route::{MockRoutingProvider, RouteSource};
  use crate::submission::Submissions;
  use mockall::predicate::*;

  fn scenario_table() -> Table {
    Table::from_rows(
      &["description", "address", "type"],
      &[&["A", "Addr1", "Registrierung"], &["B", "Addr2", "Erstbestellung"]],
    )
  }

  fn scenario_pipeline() -> Pipeline {
    let mut geocoder = MockGeocodingProvider::new();
    geocoder.expect_geocode().with(eq("Addr1")).returning(|_| Ok(Coordinates::new(52.1, 13.1)));
    geocoder.expect_geocode().with(eq("Addr2")).returning(|_| Err(GeocodeError::NotFound));

    let mut router = MockRoutingProvider::new();
    router.expect_plan().times(0);

    Pipeline::new(
      GeocodeResolver::new(Arc::new(geocoder)),
      RouteOptimizer::with_provider(Arc::new(router)),
      CategoryTable::default(),
    )
  }

  #[tokio::test]
  async fn test_failed_address_scenario() {
    let report = scenario_pipeline().run(&scenario_table()).await.unwrap();

    assert_eq!(report.route.stops.len(), 1);
    let stop = &report.route.stops[0];
    assert_eq!(stop.location.description, "A");
    assert_eq!(stop.location.coordinates, Coordinates::new(52.1, 13.1));
    assert_eq!(stop.color, "red");
    assert!(report.route.legs.is_empty());
    assert_eq!(report.dropped, 1);

    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::GeocodeFailure);
    assert_eq!(report.diagnostics[0].address(), Some("Addr2"));
  }

  #[tokio::test]
  async fn test_superseded_submission_is_discarded() {
    let submissions = Submissions::new();
    let stale = submissions.submit();
    let _newer = submissions.submit();

    let result = scenario_pipeline().run_submission(&stale, &scenario_table()).await;
    assert!(matches!(result, Err(PipelineError::Superseded { ticket: 1, latest: 2 })));
  }

  #[tokio::test]
  async fn test_current_submission_completes() {
    let submissions = Submissions::new();
    let ticket = submissions.submit();

    let report = scenario_pipeline().run_submission(&ticket, &scenario_table()).await.unwrap();
    assert_eq!(report.route.stops.len(), 1);
  }

  #[tokio::test]
  async fn test_from_config_without_key_uses_heuristic_routing() {
    let pipeline = Pipeline::from_config(&StopwiseConfig::default(), None, true).unwrap();
    let table = Table::from_rows(
      &["latitude", "longitude"],
      &[&["52.0", "13.0"], &["52.2", "13.0"], &["52.1", "13.0"]],
    );

    let report = pipeline.run(&table).await.unwrap();

    assert_eq!(report.route.source, RouteSource::Heuristic);
    assert_eq!(report.route.legs.len(), 2);
    assert_eq!(report.route.stops[1].location.coordinates, Coordinates::new(52.1, 13.0));
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::RouteHeuristic);
  }

  #[tokio::test]
  async fn test_from_config_without_key_rejects_addresses() {
    let pipeline = Pipeline::from_config(&StopwiseConfig::default(), None, false).unwrap();
    let result = pipeline.run(&scenario_table()).await;
    assert!(matches!(result, Err(PipelineError::ResolverUnavailable { .. })));
  }

  #[test]
  fn test_from_config_rejects_bad_endpoint() {
    let mut config = StopwiseConfig::default();
    config.routing.base_url = "::not-a-url".to_string();
    assert!(matches!(
      Pipeline::from_config(&config, Some("key"), true),
      Err(ConfigError::Invalid { .. })
    ));
  }
}
