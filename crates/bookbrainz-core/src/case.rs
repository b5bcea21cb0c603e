//! Identifier case translation between storage (snake_case) and the external
//! wire format (camelCase).
//!
//! The rules are generic; no column is special-cased.

use serde_json::{Map, Value};

/// Split an identifier into words at `_`, `-`, whitespace and case
/// boundaries: `XMLHttpRequest` → `XML`, `Http`, `Request`.
fn words(name: &str) -> Vec<String> {
  let mut words = Vec::new();
  for part in name.split(|c: char| c == '_' || c == '-' || c.is_whitespace()) {
    let chars: Vec<char> = part.chars().collect();
    let mut start = 0;
    for i in 1..chars.len() {
      let (prev, c) = (chars[i - 1], chars[i]);
      let acronym_end = prev.is_uppercase() && chars.get(i + 1).is_some_and(|n| n.is_lowercase());
      if c.is_uppercase() && (prev.is_lowercase() || prev.is_numeric() || acronym_end) {
        words.push(chars[start..i].iter().collect());
        start = i;
      }
    }
    if start < chars.len() {
      words.push(chars[start..].iter().collect());
    }
  }
  words
}

/// `sort_name` → `sortName`, `LANGUAGE_ID` → `languageId`. Names already in
/// camelCase come back unchanged.
pub fn camel_case(name: &str) -> String {
  let mut out = String::with_capacity(name.len());
  for (i, word) in words(name).iter().enumerate() {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
      if i == 0 {
        out.extend(first.to_lowercase());
      } else {
        out.extend(first.to_uppercase());
      }
      out.extend(chars.flat_map(char::to_lowercase));
    }
  }
  out
}

/// `languageSetId` → `language_set_id`, `EditionGroup` → `edition_group`.
pub fn snake_case(name: &str) -> String {
  words(name)
    .iter()
    .map(|word| word.to_lowercase())
    .collect::<Vec<_>>()
    .join("_")
}

/// Rename every key of a result row to camelCase.
pub fn camelize_keys(row: Map<String, Value>) -> Map<String, Value> {
  row
    .into_iter()
    .map(|(key, value)| (camel_case(&key), value))
    .collect()
}
