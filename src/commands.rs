/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "resources",
    aliases: &["res", "all"],
    description: "Reset filters and show the full catalog",
  },
  Command {
    name: "install",
    aliases: &["i"],
    description: "Pre-populate the offline cache",
  },
  Command {
    name: "refresh",
    aliases: &["reload"],
    description: "Drop all cached assets and reload",
  },
  Command {
    name: "lowdata",
    aliases: &["ld"],
    description: "Toggle low-data mode",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit skillsprout",
  },
];

/// Get autocomplete suggestions for a given input, best match first
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();

  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| score(cmd, &input).map(|s| (cmd, s)))
    .collect();

  matches.sort_by_key(|(_, priority)| *priority);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Match priority for one command, lower is better; None means no match
fn score(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    return Some(0);
  }
  if cmd.aliases.contains(&input) {
    return Some(1);
  }
  if cmd.name.starts_with(input) {
    return Some(2);
  }
  if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    return Some(3);
  }
  if cmd.name.contains(input) {
    return Some(4);
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match_wins() {
    let suggestions = get_suggestions("refresh");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "refresh");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("ld");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "lowdata");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("ref");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "refresh");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("stall");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "install");
  }

  #[test]
  fn test_unknown_input_matches_nothing() {
    assert!(get_suggestions("zzz").is_empty());
  }
}
