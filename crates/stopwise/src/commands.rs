//! CLI command implementations

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::StopwiseConfig;
use crate::diagnostics::{Diagnostic, Severity};
use crate::error::PipelineError;
use crate::pipeline::{Pipeline, RunReport};
use crate::table::{Table, TableFormat};

/// Options for `stopwise plan`
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
  pub table: PathBuf,
  pub format: Option<TableFormat>,
  pub config: Option<PathBuf>,
  pub api_key: Option<String>,
  pub no_route: bool,
  pub output: Option<PathBuf>,
  pub pretty: bool,
  /// List every stop on stderr
  pub verbose: bool,
}

/// What a failed run writes in place of a report
#[derive(Serialize)]
struct FatalReport<'a> {
  route: Option<()>,
  diagnostics: &'a [Diagnostic],
}

fn load_config(explicit: Option<&Path>) -> Result<StopwiseConfig> {
  let cwd = std::env::current_dir().context("Failed to determine working directory")?;
  StopwiseConfig::load(explicit, &cwd).context("Failed to load configuration")
}

/// Run the pipeline over a table file and emit the report as JSON
pub async fn plan(options: &PlanOptions) -> Result<()> {
  let config = load_config(options.config.as_deref())?;
  let pipeline = Pipeline::from_config(&config, options.api_key.as_deref(), !options.no_route)
    .context("Failed to set up providers")?;

  match run(&pipeline, options).await {
    Ok(report) => {
      print_diagnostics(&report.diagnostics);
      if options.verbose {
        print_stops(&report);
      }
      print_summary(&report);
      emit(&report, options)
    }
    Err(error) => {
      let fatal = [error.to_diagnostic()];
      emit(&FatalReport { route: None, diagnostics: &fatal }, options)?;
      Err(error.into())
    }
  }
}

/// Load the table and run it; an unreadable table is as fatal as a bad one
async fn run(pipeline: &Pipeline, options: &PlanOptions) -> Result<RunReport, PipelineError> {
  let format = options.format.unwrap_or_else(|| TableFormat::from_path(&options.table));
  let table = Table::load(&options.table, format)?;
  herald::info!(&format!("Loaded {} rows from {}", table.len(), options.table.display()));

  herald::event!(&format!("Planning route for {} rows", table.len()));
  pipeline.run(&table).await
}

/// Print the effective category table
pub fn colors(config: Option<&Path>) -> Result<()> {
  let config = load_config(config)?;
  let categories = &config.categories;

  let width = categories.colors.keys().map(String::len).max().unwrap_or(0).max("(default)".len());
  for (label, color) in &categories.colors {
    println!("{label:<width$}  {color}");
  }
  println!("{:<width$}  {}", "(default)", categories.default_color);
  Ok(())
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
  for diagnostic in diagnostics {
    let level = match diagnostic.severity {
      Severity::Warning => herald::Level::Warning,
      Severity::Error => herald::Level::Error,
    };
    herald::notice(level, diagnostic.address(), &diagnostic.message);
  }
}

fn print_stops(report: &RunReport) {
  for stop in &report.route.stops {
    let coordinates = stop.coordinates();
    herald::verbose!(&format!(
      "{:>3}. {} ({}, {}) [{}]",
      stop.stop_index,
      stop.popup(),
      coordinates.latitude,
      coordinates.longitude,
      stop.color
    ));
  }
}

fn print_summary(report: &RunReport) {
  let route = &report.route;
  let mut lines = vec![
    format!("Stops: {}", route.stops.len()),
    format!("Dropped records: {}", report.dropped),
    format!("Geocoding requests: {}", report.geocode_requests),
  ];
  if route.is_routed() {
    lines.push(format!("Legs: {} (+ return)", route.legs.len()));
    lines.push(format!("Round trip: {:.1} km", route.total_distance_meters() / 1000.0));
  } else {
    lines.push("Route: none".to_string());
  }
  herald::summary("Route planned", &lines);
}

fn emit<T: Serialize>(value: &T, options: &PlanOptions) -> Result<()> {
  let json = if options.pretty {
    serde_json::to_string_pretty(value)
  } else {
    serde_json::to_string(value)
  }
  .context("Failed to serialize report")?;

  match &options.output {
    Some(path) => {
      fs::write(path, format!("{json}\n"))
        .with_context(|| format!("Failed to write {}", path.display()))?;
      herald::success!(&format!("Report written to {}", path.display()));
    }
    None => println!("{json}"),
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[tokio::test]
  async fn test_plan_writes_report_file() {
    let temp_dir = TempDir::new().unwrap();
    let table = temp_dir.path().join("stops.csv");
    fs::write(&table, "description,latitude,longitude,type\nA,52.1,13.1,Registrierung\n").unwrap();
    let output = temp_dir.path().join("route.json");

    let options = PlanOptions {
      table,
      no_route: true,
      output: Some(output.clone()),
      ..PlanOptions::default()
    };
    plan(&options).await.unwrap();

    let report: serde_json::Value =
      serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(report["route"]["stops"][0]["color"], "red");
    assert_eq!(report["diagnostics"], serde_json::json!([]));
  }

  #[tokio::test]
  async fn test_unreadable_table_is_a_fatal_diagnostic() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("route.json");
    let options = PlanOptions {
      table: temp_dir.path().join("absent.csv"),
      output: Some(output.clone()),
      verbose: true,
      ..PlanOptions::default()
    };

    let error = plan(&options).await.unwrap_err();
    assert!(matches!(error.downcast_ref::<PipelineError>(), Some(PipelineError::Table(_))));

    let report: serde_json::Value =
      serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(report["diagnostics"][0]["kind"], "invalid_input");
    assert!(report["diagnostics"][0]["message"].as_str().unwrap().contains("absent.csv"));
  }

  #[tokio::test]
  async fn test_fatal_run_writes_single_diagnostic() {
    let temp_dir = TempDir::new().unwrap();
    let table = temp_dir.path().join("stops.csv");
    fs::write(&table, "description,type\nA,Registrierung\n").unwrap();
    let output = temp_dir.path().join("route.json");

    let options = PlanOptions { table, output: Some(output.clone()), ..PlanOptions::default() };
    assert!(plan(&options).await.is_err());

    let report: serde_json::Value =
      serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert!(report["route"].is_null());
    assert_eq!(report["diagnostics"].as_array().unwrap().len(), 1);
    assert_eq!(report["diagnostics"][0]["severity"], "error");
  }
}
