//! ## Features
//!
//! - Standard logging levels (info, warn, error, success, verbose)
//! - Multi-line message support with consistent prefixes
//! - Timestamped run events for long batch runs
//! - Banner displays for run summaries
//! - Diagnostic notices scoped to an address or to the whole run
//! - All output to stderr so stdout stays free for machine-readable results
//!
//! ## Usage
//!
//! Standard logging functions: `info()`, `warn()`, `error()`, `success()`, `verbose()`
//!
//! Run-scoped output: `event()`, `notice()`, `summary()`
//!
//! Tracing setup for binaries: `init_tracing()`

use chrono::Local;
use colored::*;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

const PREFIX_WIDTH: usize = 7;
const DEFAULT_BANNER_WIDTH: usize = 50;

/// Disable colors when stderr is not attended by a user (pipes, CI logs)
pub fn init() {
  if !console::user_attended_stderr() {
    colored::control::set_override(false);
  }
}

/// Install the global tracing subscriber used by binaries.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects between debug output
/// for the given crate and a quiet warn-only default.
pub fn init_tracing(crate_name: &str, verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new(format!("{crate_name}=debug,reqwest=info,warn"))
    } else {
      EnvFilter::new(format!("{crate_name}=info,warn"))
    }
  });

  // try_init: a second call (tests, embedding) keeps the first subscriber
  let _ = tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .try_init();
}

/// Core logging function that handles the actual output
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

fn format_prefix(color: Color, prefix: &str) -> String {
  let pad = PREFIX_WIDTH.saturating_sub(prefix.len() + 2);
  format!("[{}]{:<pad$}", prefix.color(color).bold(), "")
}

fn log_prefixed(color: Color, prefix: &str, message: &str) {
  let prefix = format_prefix(color, prefix);
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

pub fn banner_line(length: usize, char: char) -> String {
  char.to_string().repeat(length)
}

/// Banner width, shrunk to fit narrow terminals
fn banner_width() -> usize {
  let (_, columns) = console::Term::stderr().size();
  DEFAULT_BANNER_WIDTH.min(columns as usize).max(10)
}

pub fn verbose(message: &str) {
  log_prefixed(Color::Cyan, "verb", message);
}

/// Info level logging - general information
pub fn info(message: &str) {
  log_prefixed(Color::Blue, "info", message);
}

/// Warning level logging - something needs attention
pub fn warn(message: &str) {
  log_prefixed(Color::Yellow, "warn", message);
}

/// Error level logging - something went wrong
pub fn error(message: &str) {
  log_prefixed(Color::Red, "error", message);
}

pub fn success(message: &str) {
  log_prefixed(Color::Green, "sccs", message);
}

/// Timestamped event, for progress lines during a batch run
pub fn event(message: &str) {
  let timestamp = Local::now().format("%H:%M:%S").to_string();
  let prefix = format!("[{}] [{}]", "event".blue().bold(), timestamp.cyan());
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

/// Severity of a notice printed for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Warning,
  Error,
}

/// Format a notice line; `scope` names the address it concerns, `None` means the whole run
pub fn format_notice(level: Level, scope: Option<&str>, message: &str) -> String {
  let color = match level {
    Level::Warning => Color::Cyan,
    Level::Error => Color::BrightRed,
  };
  let scope = match scope {
    Some(address) => format!("{} ", format!("<{address}>").color(color)),
    None => String::new(),
  };
  format!("{scope}{message}")
}

/// Print a diagnostic notice at the given level
pub fn notice(level: Level, scope: Option<&str>, message: &str) {
  let line = format_notice(level, scope, message);
  match level {
    Level::Warning => warn(&line),
    Level::Error => error(&line),
  }
}

/// Print a run summary inside a banner
pub fn summary(title: &str, lines: &[String]) {
  let width = banner_width();
  let banner = banner_line(width, '-');
  log(&banner.green().to_string());
  log(&title.green().bold().to_string());
  for line in lines {
    log(&format!("  {line}"));
  }
  log(&banner.green().to_string());
}

/// Fatal announcement - the run produced no result
pub fn showstopper(message: &str) {
  let width = banner_width();
  let banner = banner_line(width, '*');
  log(&banner.bright_red().bold().to_string());
  log(&message.bright_red().bold().to_string());
  log(&banner.bright_red().bold().to_string());
}

/// Macros for coverage-excluded logging - these expand with LCOV_EXCL_LINE at call sites
#[macro_export]
macro_rules! info {
  ($msg:expr) => {
    $crate::info($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! verbose {
  ($msg:expr) => {
    $crate::verbose($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($msg:expr) => {
    $crate::success($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! event {
  ($msg:expr) => {
    $crate::event($msg); // LCOV_EXCL_LINE
  };
}
