use async_trait::async_trait;
use thiserror::Error;

use crate::record::Coordinates;

pub mod cache;
pub mod resolver;

pub use cache::GeocodeCache;
pub use resolver::{GeocodeResolver, Resolution};

/// Why one address could not be resolved
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
  #[error("address not found")]
  NotFound,

  #[error("rate limited by provider")]
  RateLimited,

  #[error("request timed out")]
  Timeout,

  #[error("provider error: {message}")]
  Provider { message: String },

  /// No address can resolve: bad credentials, DNS failure, provider down
  #[error("provider unreachable: {reason}")]
  Unavailable { reason: String },
}

impl GeocodeError {
  pub fn provider(message: impl Into<String>) -> Self {
    Self::Provider { message: message.into() }
  }

  pub fn unavailable(reason: impl Into<String>) -> Self {
    Self::Unavailable { reason: reason.into() }
  }

  /// Global failures abort the run instead of dropping one record
  pub fn is_global(&self) -> bool {
    matches!(self, GeocodeError::Unavailable { .. })
  }
}

/// External address resolution service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
  async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}

/// Cache key for an address: trimmed, inner whitespace collapsed, case kept
pub fn normalize_address(address: &str) -> String {
  address.split_whitespace().collect::<Vec<_>>().join(" ")
}
