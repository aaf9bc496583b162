use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub catalog: CatalogConfig,
  /// Custom title for the header (defaults to "SkillSprout" if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
  /// Base URL of the directory server
  pub url: String,
  /// Server path of the catalog data resource
  #[serde(default = "default_data_path")]
  pub data_path: String,
  /// Server path of the track-shortcut definitions
  #[serde(default = "default_tracks_path")]
  pub tracks_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Deployed cache version; bumping it installs a fresh generation
  #[serde(default = "default_cache_version")]
  pub version: u32,
  /// Extra server assets to mirror for offline use
  #[serde(default)]
  pub assets: Vec<String>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      version: default_cache_version(),
      assets: Vec::new(),
    }
  }
}

fn default_data_path() -> String {
  "data/resources.json".to_string()
}

fn default_tracks_path() -> String {
  "data/tracks.json".to_string()
}

fn default_cache_version() -> u32 {
  1
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./skillsprout.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/skillsprout/config.yaml
  /// 4. ~/.config/skillsprout/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/skillsprout/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("skillsprout.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("skillsprout").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// The fixed asset list an install pre-populates: catalog data, tracks,
  /// and any config-declared extras, deduplicated in order.
  pub fn manifest(&self) -> Vec<String> {
    let mut manifest = vec![
      self.catalog.data_path.clone(),
      self.catalog.tracks_path.clone(),
    ];

    for asset in &self.cache.assets {
      if !manifest.contains(asset) {
        manifest.push(asset.clone());
      }
    }

    manifest
  }
}
