//! Maps free-text record types to marker colors

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_COLOR: &str = "gray";

/// Label to color lookup with a neutral fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
  #[serde(default = "default_colors")]
  pub colors: BTreeMap<String, String>,
  #[serde(default = "default_color")]
  pub default_color: String,
}

fn default_colors() -> BTreeMap<String, String> {
  BTreeMap::from([
    ("Registrierung".to_string(), "red".to_string()),
    ("Erstbestellung".to_string(), "green".to_string()),
  ])
}

fn default_color() -> String {
  DEFAULT_COLOR.to_string()
}

impl Default for CategoryTable {
  fn default() -> Self {
    Self { colors: default_colors(), default_color: default_color() }
  }
}

impl CategoryTable {
  pub fn new(colors: BTreeMap<String, String>, default_color: impl Into<String>) -> Self {
    Self { colors, default_color: default_color.into() }
  }

  /// Exact label match; anything unknown (including "Default") gets the neutral color
  pub fn color_for(&self, label: &str) -> &str {
    self.colors.get(label).map(String::as_str).unwrap_or(&self.default_color)
  }

  pub fn is_known(&self, label: &str) -> bool {
    self.colors.contains_key(label)
  }
}
