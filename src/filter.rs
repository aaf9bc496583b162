//! Pure filtering over the loaded catalog.
//!
//! `filter` applies the four-field query (text, category, level, format);
//! `filter_by_tags` is the separate track-shortcut predicate. Both preserve
//! catalog order and never error on an empty catalog.

use std::collections::BTreeSet;

use crate::catalog::types::Resource;

/// Wildcard value for the category/level/format constraints.
pub const ALL: &str = "all";

/// The user's current filter constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
  pub text: String,
  pub category: String,
  pub level: String,
  pub format: String,
}

impl Default for QueryState {
  fn default() -> Self {
    Self {
      text: String::new(),
      category: ALL.to_string(),
      level: ALL.to_string(),
      format: ALL.to_string(),
    }
  }
}

impl QueryState {
  /// Back to empty text and "all" on every selector.
  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

/// Apply the four-field query to the catalog, preserving order.
pub fn filter(catalog: &[Resource], query: &QueryState) -> Vec<Resource> {
  let needle = query.text.trim().to_lowercase();

  catalog
    .iter()
    .filter(|r| {
      matches_text(r, &needle)
        && matches_field(&query.category, &r.category)
        && matches_field(&query.level, &r.level)
        && matches_field(&query.format, &r.format)
    })
    .cloned()
    .collect()
}

/// Track-shortcut predicate: keep resources with at least one tag in `tags`
/// (case-folded on both sides). Supersedes the four-field query for that
/// invocation; the caller resets the query state before applying.
pub fn filter_by_tags(catalog: &[Resource], tags: &[String]) -> Vec<Resource> {
  let wanted: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();

  catalog
    .iter()
    .filter(|r| r.tags.iter().any(|t| wanted.contains(&t.to_lowercase())))
    .cloned()
    .collect()
}

fn matches_text(resource: &Resource, needle: &str) -> bool {
  if needle.is_empty() {
    return true;
  }

  resource.title.to_lowercase().contains(needle)
    || resource.provider.to_lowercase().contains(needle)
    || resource.tags.join(" ").to_lowercase().contains(needle)
    || resource.description.to_lowercase().contains(needle)
}

fn matches_field(selected: &str, value: &str) -> bool {
  selected == ALL || selected == value
}

/// Enumerated selector fields of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
  Category,
  Level,
  Format,
}

impl QueryField {
  fn extract<'a>(&self, resource: &'a Resource) -> &'a str {
    match self {
      QueryField::Category => &resource.category,
      QueryField::Level => &resource.level,
      QueryField::Format => &resource.format,
    }
  }
}

/// Distinct values present in the catalog for a selector field, sorted.
pub fn field_values(catalog: &[Resource], field: QueryField) -> Vec<String> {
  let values: BTreeSet<&str> = catalog.iter().map(|r| field.extract(r)).collect();
  values.into_iter().map(String::from).collect()
}

/// Step a selector to its next value, wrapping through "all".
pub fn cycle_value(current: &str, values: &[String]) -> String {
  if values.is_empty() {
    return ALL.to_string();
  }

  match values.iter().position(|v| v == current) {
    // Last value wraps back to "all"
    Some(i) if i + 1 == values.len() => ALL.to_string(),
    Some(i) => values[i + 1].clone(),
    // "all" (or a value no longer present) starts at the first value
    None => values[0].clone(),
  }
}
