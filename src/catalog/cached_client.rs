//! Catalog client with transparent offline caching.

use color_eyre::{eyre::eyre, Result};
use url::Url;

use crate::cache::{generation_name, FetchSource, OfflineCache, SqliteAssetStore};
use crate::config::Config;

use super::client::DirectoryClient;
use super::types::{Resource, Track};

/// Directory client routed through the offline cache.
///
/// Catalog loads take the network-first path; every other asset (tracks,
/// config-declared extras) is served cache-first.
#[derive(Clone)]
pub struct CachedCatalogClient {
  cache: OfflineCache<SqliteAssetStore>,
  data_path: String,
  tracks_path: String,
}

/// A loaded catalog with the provenance of its bytes.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
  pub resources: Vec<Resource>,
  pub source: FetchSource,
}

impl CachedCatalogClient {
  pub fn new(config: &Config) -> Result<Self> {
    let mut base = Url::parse(&config.catalog.url)
      .map_err(|e| eyre!("Invalid server URL {}: {}", config.catalog.url, e))?;

    // Relative asset paths resolve against the base, so it must be a directory
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }

    let transport = DirectoryClient::new(base);
    let storage = SqliteAssetStore::open()?;
    let cache = OfflineCache::new(
      storage,
      transport,
      generation_name(config.cache.version),
      config.manifest(),
      config.catalog.data_path.clone(),
    );

    Ok(Self {
      cache,
      data_path: config.catalog.data_path.clone(),
      tracks_path: config.catalog.tracks_path.clone(),
    })
  }

  /// Install the current generation if needed, then evict stale ones.
  pub async fn bootstrap(&self) -> Result<()> {
    self.cache.bootstrap().await
  }

  /// Load the catalog. One fetch, no retries; a parse failure fails the
  /// whole load.
  pub async fn load(&self) -> Result<LoadedCatalog> {
    let fetched = self.cache.fetch(&self.data_path).await?;

    let resources: Vec<Resource> = serde_json::from_slice(&fetched.body)
      .map_err(|e| eyre!("Failed to parse catalog: {}", e))?;

    Ok(LoadedCatalog {
      resources,
      source: fetched.source,
    })
  }

  /// Load the track shortcuts published alongside the catalog.
  pub async fn tracks(&self) -> Result<Vec<Track>> {
    let fetched = self.cache.fetch(&self.tracks_path).await?;

    serde_json::from_slice(&fetched.body).map_err(|e| eyre!("Failed to parse tracks: {}", e))
  }

  /// Manual refresh: drop every cache generation. The caller re-runs
  /// bootstrap and reloads.
  pub fn refresh(&self) -> Result<()> {
    self.cache.purge_all()
  }
}
