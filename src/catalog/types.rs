use serde::{Deserialize, Serialize};

/// A single entry in the learning-resource catalog.
///
/// Resources are immutable once loaded. `category`, `level` and `format` are
/// open string domains matched by equality; unknown values are fine and only
/// matter when a non-"all" constraint is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
  pub title: String,
  pub provider: String,
  pub description: String,
  pub category: String,
  pub level: String,
  pub format: String,
  pub tags: Vec<String>,
  pub free: bool,
  pub verified: bool,
  #[serde(default)]
  pub duration: Option<String>,
  #[serde(default)]
  pub language: Option<String>,
  pub url: String,
}

/// A predefined tag-based shortcut published by the directory server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
  pub name: String,
  /// Comma-separated tag list, e.g. "ai, python, data"
  pub tags: String,
}

impl Track {
  /// Parse the tag list: split on commas, trim, fold to lowercase.
  pub fn tag_list(&self) -> Vec<String> {
    self
      .tags
      .split(',')
      .map(|t| t.trim().to_lowercase())
      .filter(|t| !t.is_empty())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tag_list_splits_trims_and_folds() {
    let track = Track {
      name: "AI & Data".to_string(),
      tags: " AI, Python , data".to_string(),
    };
    assert_eq!(track.tag_list(), vec!["ai", "python", "data"]);
  }

  #[test]
  fn test_tag_list_skips_empty_segments() {
    let track = Track {
      name: "Web".to_string(),
      tags: "web,,css,".to_string(),
    };
    assert_eq!(track.tag_list(), vec!["web", "css"]);
  }

  #[test]
  fn test_resource_optional_fields_may_be_absent() {
    let json = r#"{
      "title": "Intro to Rust",
      "provider": "Rustacean Academy",
      "description": "Ownership from scratch",
      "category": "Tech",
      "level": "Beginner",
      "format": "Course",
      "tags": ["rust", "systems"],
      "free": true,
      "verified": false,
      "url": "https://example.com/rust"
    }"#;

    let resource: Resource = serde_json::from_str(json).unwrap();
    assert_eq!(resource.duration, None);
    assert_eq!(resource.language, None);
  }

  #[test]
  fn test_resource_missing_required_field_fails() {
    // No title: the whole object is rejected rather than patched up
    let json = r#"{
      "provider": "Somewhere",
      "description": "",
      "category": "Tech",
      "level": "Beginner",
      "format": "Course",
      "tags": [],
      "free": true,
      "verified": false,
      "url": "https://example.com"
    }"#;

    assert!(serde_json::from_str::<Resource>(json).is_err());
  }
}
