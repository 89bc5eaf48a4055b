//! Plain-text rendering of provider turn instructions

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BLOCK_TAG: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)<\s*/?\s*(div|br|p)\b[^>]*>").expect("valid block tag regex"));
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static ENTITY: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid entity regex"));

/// Strip markup, decode entities and collapse whitespace
pub fn to_plain_text(html: &str) -> String {
  let spaced = BLOCK_TAG.replace_all(html, " ");
  let stripped = ANY_TAG.replace_all(&spaced, "");
  let decoded = ENTITY.replace_all(&stripped, |caps: &Captures| decode_entity(caps));
  decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entity(caps: &Captures) -> String {
  let body = &caps[1];
  let decoded = match body.strip_prefix('#') {
    Some(numeric) => numeric_entity(numeric),
    None => named_entity(body).map(str::to_string),
  };
  decoded.unwrap_or_else(|| caps[0].to_string())
}

fn numeric_entity(numeric: &str) -> Option<String> {
  let code = match numeric.strip_prefix(['x', 'X']) {
    Some(hex) => u32::from_str_radix(hex, 16).ok()?,
    None => numeric.parse::<u32>().ok()?,
  };
  char::from_u32(code).map(String::from)
}

fn named_entity(name: &str) -> Option<&'static str> {
  match name {
    "amp" => Some("&"),
    "lt" => Some("<"),
    "gt" => Some(">"),
    "quot" => Some("\""),
    "apos" => Some("'"),
    "nbsp" => Some(" "),
    _ => None,
  }
}
