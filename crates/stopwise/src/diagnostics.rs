//! Run diagnostics handed to the UI collaborator alongside a `RouteView`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Warning,
  Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
  GeocodeFailure,
  ResolverUnavailable,
  RoutingUnavailable,
  RoutingEmpty,
  RouteHeuristic,
  InvalidInput,
}

/// What a diagnostic is about: one address or the run as a whole
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "address", rename_all = "lowercase")]
pub enum DiagnosticContext {
  Address(String),
  Global,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
  pub severity: Severity,
  pub kind: DiagnosticKind,
  pub message: String,
  pub context: DiagnosticContext,
}

impl Diagnostic {
  pub fn geocode_failure(address: impl Into<String>, reason: impl std::fmt::Display) -> Self {
    let address = address.into();
    Self {
      severity: Severity::Warning,
      kind: DiagnosticKind::GeocodeFailure,
      message: format!("Could not resolve address '{address}': {reason}"),
      context: DiagnosticContext::Address(address),
    }
  }

  pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
    Self {
      severity: Severity::Warning,
      kind,
      message: message.into(),
      context: DiagnosticContext::Global,
    }
  }

  pub fn fatal(kind: DiagnosticKind, message: impl Into<String>) -> Self {
    Self { severity: Severity::Error, kind, message: message.into(), context: DiagnosticContext::Global }
  }

  pub fn address(&self) -> Option<&str> {
    match &self.context {
      DiagnosticContext::Address(address) => Some(address),
      DiagnosticContext::Global => None,
    }
  }
}

/// Ordered sink for the diagnostics of one run
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
  events: Vec<Diagnostic>,
}

impl Diagnostics {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, diagnostic: Diagnostic) {
    tracing::debug!(kind = ?diagnostic.kind, "{}", diagnostic.message);
    self.events.push(diagnostic);
  }

  pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
    for diagnostic in diagnostics {
      self.push(diagnostic);
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
    self.events.iter()
  }

  pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<&Diagnostic> {
    self.events.iter().filter(|d| d.kind == kind).collect()
  }

  pub fn len(&self) -> usize {
    self.events.len()
  }

  pub fn is_empty(&self) -> bool {
    self.events.is_empty()
  }

  pub fn into_vec(self) -> Vec<Diagnostic> {
    self.events
  }
}
