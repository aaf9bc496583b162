//! Pure projection of filtered resources into renderable cards.
//!
//! `project` turns a result set into a `RenderOutput` (summary line plus one
//! `Card` per resource); the ui module maps that onto ratatui widgets. All
//! freeform fields are sanitized here so catalog data cannot smuggle control
//! sequences into the terminal.

use crate::catalog::types::Resource;

/// Shown in place of the result count when nothing matches.
pub const NO_RESULTS: &str = "No results. Try a different search or track.";

/// Category icons, with a sprout for anything unmapped.
const ICONS: &[(&str, &str)] = &[
  ("Tech", "🧑🏽‍💻"),
  ("Business", "📈"),
  ("Creative", "🎨"),
  ("Trades", "🛠️"),
  ("Academic", "📚"),
];

const FALLBACK_ICON: &str = "🌱";

/// How many tags a card shows.
const MAX_CARD_TAGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
  Neutral,
  Ok,
  Warn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
  pub label: String,
  pub tone: BadgeTone,
}

impl Badge {
  fn neutral(label: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      tone: BadgeTone::Neutral,
    }
  }
}

/// One rendered resource card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
  pub icon: &'static str,
  pub title: String,
  pub badges: Vec<Badge>,
  pub description: String,
  pub provider: String,
  /// First few tags, each '#'-prefixed
  pub tags: Vec<String>,
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
  pub summary: String,
  pub cards: Vec<Card>,
}

/// Project a result set into its visual representation.
pub fn project(results: &[Resource]) -> RenderOutput {
  let summary = if results.is_empty() {
    NO_RESULTS.to_string()
  } else {
    format!("{} resources found", results.len())
  };

  RenderOutput {
    summary,
    cards: results.iter().map(card).collect(),
  }
}

pub fn icon_for_category(category: &str) -> &'static str {
  ICONS
    .iter()
    .find(|(name, _)| *name == category)
    .map(|(_, icon)| *icon)
    .unwrap_or(FALLBACK_ICON)
}

fn card(resource: &Resource) -> Card {
  let mut badges = vec![
    Badge::neutral(sanitize(&resource.category)),
    Badge::neutral(sanitize(&resource.level)),
    Badge::neutral(sanitize(&resource.format)),
  ];

  if resource.free {
    badges.push(Badge::neutral("Free"));
  } else {
    badges.push(Badge {
      label: "Low-cost".to_string(),
      tone: BadgeTone::Warn,
    });
  }

  if resource.verified {
    badges.push(Badge {
      label: "Verified".to_string(),
      tone: BadgeTone::Ok,
    });
  }

  if let Some(duration) = &resource.duration {
    badges.push(Badge::neutral(sanitize(duration)));
  }
  if let Some(language) = &resource.language {
    badges.push(Badge::neutral(sanitize(language)));
  }

  Card {
    icon: icon_for_category(&resource.category),
    title: sanitize(&resource.title),
    badges,
    description: sanitize(&resource.description),
    provider: sanitize(&resource.provider),
    tags: resource
      .tags
      .iter()
      .take(MAX_CARD_TAGS)
      .map(|t| format!("#{}", sanitize(t)))
      .collect(),
    url: sanitize(&resource.url),
  }
}

/// Neutralize control characters (escape sequences, newlines, tabs) so
/// semi-trusted catalog text cannot break the card layout or drive the
/// terminal.
pub fn sanitize(text: &str) -> String {
  text
    .chars()
    .map(|c| if c.is_control() { ' ' } else { c })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn resource() -> Resource {
    Resource {
      title: "Intro to Rust".to_string(),
      provider: "Rustacean Academy".to_string(),
      description: "Ownership from scratch".to_string(),
      category: "Tech".to_string(),
      level: "Beginner".to_string(),
      format: "Course".to_string(),
      tags: vec![
        "rust".to_string(),
        "systems".to_string(),
        "memory".to_string(),
        "extra".to_string(),
      ],
      free: true,
      verified: true,
      duration: Some("6 weeks".to_string()),
      language: None,
      url: "https://example.com/rust".to_string(),
    }
  }

  #[test]
  fn test_empty_results_use_fixed_message() {
    let output = project(&[]);
    assert_eq!(output.summary, NO_RESULTS);
    assert!(output.cards.is_empty());
  }

  #[test]
  fn test_summary_counts_results() {
    let output = project(&[resource(), resource()]);
    assert_eq!(output.summary, "2 resources found");
    assert_eq!(output.cards.len(), 2);
  }

  #[test]
  fn test_badge_order_and_tones() {
    let output = project(&[resource()]);
    let labels: Vec<&str> = output.cards[0]
      .badges
      .iter()
      .map(|b| b.label.as_str())
      .collect();

    assert_eq!(
      labels,
      vec!["Tech", "Beginner", "Course", "Free", "Verified", "6 weeks"]
    );
    assert_eq!(output.cards[0].badges[4].tone, BadgeTone::Ok);
  }

  #[test]
  fn test_paid_resource_gets_low_cost_warn_badge() {
    let mut r = resource();
    r.free = false;
    r.verified = false;

    let output = project(&[r]);
    let badge = &output.cards[0].badges[3];
    assert_eq!(badge.label, "Low-cost");
    assert_eq!(badge.tone, BadgeTone::Warn);
    assert!(!output.cards[0].badges.iter().any(|b| b.label == "Verified"));
  }

  #[test]
  fn test_absent_duration_and_language_show_no_badge() {
    let mut r = resource();
    r.duration = None;
    r.language = None;

    let output = project(&[r]);
    assert_eq!(output.cards[0].badges.len(), 5);
  }

  #[test]
  fn test_tags_truncate_to_three_with_marker() {
    let output = project(&[resource()]);
    assert_eq!(output.cards[0].tags, vec!["#rust", "#systems", "#memory"]);
  }

  #[test]
  fn test_icon_lookup_with_fallback() {
    assert_eq!(icon_for_category("Creative"), "🎨");
    assert_eq!(icon_for_category("Underwater Basketweaving"), FALLBACK_ICON);
  }

  #[test]
  fn test_freeform_text_is_sanitized() {
    let mut r = resource();
    r.title = "Evil\x1b[2Jtitle".to_string();
    r.description = "line\nbreak\tand bell\x07".to_string();

    let card = &project(&[r]).cards[0];
    assert_eq!(card.title, "Evil [2Jtitle");
    assert_eq!(card.description, "line break and bell ");
  }
}
