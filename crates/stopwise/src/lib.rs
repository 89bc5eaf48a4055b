//! Location resolution and round-trip route planning for tabular stop lists.
//!
//! A run flows through five stages: the normalizer turns table rows into
//! records, the geocode resolver fills in coordinates for addresses, the
//! categorizer picks marker colors, the route optimizer orders the stops
//! and the assembler produces one `RouteView` for rendering.

pub mod categorizer;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod geocode;
pub mod google;
pub mod normalizer;
pub mod pipeline;
pub mod record;
pub mod route;
pub mod submission;
pub mod table;
pub mod view;

pub use categorizer::CategoryTable;
pub use config::StopwiseConfig;
pub use diagnostics::{Diagnostic, DiagnosticContext, DiagnosticKind, Diagnostics, Severity};
pub use error::{ConfigError, PipelineError, TableError};
pub use geocode::{GeocodeError, GeocodeResolver, GeocodingProvider};
pub use pipeline::{Pipeline, RunReport};
pub use record::{Coordinates, LocationRecord, ResolvedLocation};
pub use route::{
  Optimization, RouteLeg, RouteOptimizer, RouteSource, RouteStrategy, RoutingError, RoutingProvider,
};
pub use submission::{Submissions, Ticket};
pub use table::{Table, TableFormat};
pub use view::{RouteView, Stop};
