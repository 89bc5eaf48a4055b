use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Fatal errors: a run that fails with one of these produces no `RouteView`
#[derive(Error, Debug)]
pub enum PipelineError {
  #[error("{}", describe_missing(.row, .missing))]
  MissingLocationColumns { row: Option<usize>, missing: Vec<String> },

  #[error("Row {row}: '{value}' is not a valid {column}")]
  InvalidCoordinate { row: usize, column: String, value: String },

  #[error("Geocoding provider unavailable: {reason}")]
  ResolverUnavailable { reason: String },

  #[error("Run discarded: submission #{ticket} was superseded by #{latest}")]
  Superseded { ticket: u64, latest: u64 },

  #[error(transparent)]
  Table(#[from] TableError),
}

impl PipelineError {
  /// The table itself lacks every location column group
  pub fn missing_location_columns(missing: Vec<String>) -> Self {
    Self::MissingLocationColumns { row: None, missing }
  }

  /// The columns exist but this row leaves all of them empty
  pub fn missing_row_location(row: usize, missing: Vec<String>) -> Self {
    Self::MissingLocationColumns { row: Some(row), missing }
  }

  pub fn invalid_coordinate(
    row: usize,
    column: impl Into<String>,
    value: impl Into<String>,
  ) -> Self {
    Self::InvalidCoordinate { row, column: column.into(), value: value.into() }
  }

  pub fn resolver_unavailable(reason: impl Into<String>) -> Self {
    Self::ResolverUnavailable { reason: reason.into() }
  }

  /// The single fatal event reported in place of a result
  pub fn to_diagnostic(&self) -> Diagnostic {
    let kind = match self {
      PipelineError::ResolverUnavailable { .. } => DiagnosticKind::ResolverUnavailable,
      _ => DiagnosticKind::InvalidInput,
    };
    Diagnostic::fatal(kind, self.to_string())
  }
}

#[derive(Error, Debug)]
pub enum TableError {
  #[error("Failed to read table: {message}")]
  Read { message: String },

  #[error("Failed to parse table: {message}")]
  Parse { message: String },

  #[error("Unsupported table format '{format}'")]
  UnsupportedFormat { format: String },
}

impl TableError {
  pub fn read(message: impl Into<String>) -> Self {
    Self::Read { message: message.into() }
  }

  pub fn parse(message: impl Into<String>) -> Self {
    Self::Parse { message: message.into() }
  }

  pub fn unsupported_format(format: impl Into<String>) -> Self {
    Self::UnsupportedFormat { format: format.into() }
  }
}

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to read config {path}: {message}")]
  Read { path: String, message: String },

  #[error("Invalid config: {message}")]
  Invalid { message: String },
}

impl ConfigError {
  pub fn read(path: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Read { path: path.into(), message: message.into() }
  }

  pub fn invalid(message: impl Into<String>) -> Self {
    Self::Invalid { message: message.into() }
  }
}

fn describe_missing(row: &Option<usize>, missing: &[String]) -> String {
  let missing = missing.iter().map(|group| format!("'{group}'")).collect::<Vec<_>>().join(" or ");
  match row {
    Some(row) => format!("Row {row} has no usable location: {missing} is empty"),
    None => format!("Table must contain {missing} columns"),
  }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use crate::diagnostics::{DiagnosticContext, Severity};

  #[test]
  fn test_missing_columns_message_names_both_groups() {
    let error = PipelineError::missing_location_columns(vec![
      "latitude+longitude".to_string(),
      "address".to_string(),
    ]);
    assert_eq!(error.to_string(), "Table must contain 'latitude+longitude' or 'address' columns");
  }

  #[test]
  fn test_missing_row_location_names_the_row() {
    let error = PipelineError::missing_row_location(3, vec!["address".to_string()]);
    assert_eq!(error.to_string(), "Row 3 has no usable location: 'address' is empty");
  }

  #[test]
  fn test_resolver_unavailable_becomes_global_fatal_diagnostic() {
    let diagnostic = PipelineError::resolver_unavailable("REQUEST_DENIED").to_diagnostic();
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.kind, DiagnosticKind::ResolverUnavailable);
    assert_eq!(diagnostic.context, DiagnosticContext::Global);
    assert!(diagnostic.message.contains("REQUEST_DENIED"));
  }
}
