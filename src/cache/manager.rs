//! Offline cache manager: generation lifecycle and fetch strategies.
//!
//! The manager keeps one named cache generation current at a time. Install
//! populates a new generation from the asset manifest, activate evicts every
//! other generation, and per-request fetches pick a strategy by target:
//! network-first for the catalog data resource, cache-first for everything
//! else.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use futures::future;
use std::sync::Arc;

use super::storage::AssetStore;
use crate::catalog::client::DirectoryClient;

/// Prefix for cache generation names.
pub const GENERATION_PREFIX: &str = "skillsprout";

/// Name of the cache generation for a deployed version.
pub fn generation_name(version: u32) -> String {
  format!("{}-v{}", GENERATION_PREFIX, version)
}

/// Where a fetched body came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchSource {
  /// Fresh bytes from the network
  Network,
  /// Cached copy from the current generation
  Cache { stored_at: DateTime<Utc> },
}

/// A fetched response body with its provenance.
#[derive(Debug, Clone)]
pub struct Fetched {
  pub body: Vec<u8>,
  pub source: FetchSource,
}

pub struct OfflineCache<S: AssetStore> {
  storage: Arc<S>,
  transport: DirectoryClient,
  generation: String,
  manifest: Vec<String>,
  data_path: String,
}

impl<S: AssetStore + 'static> OfflineCache<S> {
  /// Create a cache manager for one generation and asset manifest.
  pub fn new(
    storage: S,
    transport: DirectoryClient,
    generation: String,
    manifest: Vec<String>,
    data_path: String,
  ) -> Self {
    Self {
      storage: Arc::new(storage),
      transport,
      generation,
      manifest,
      data_path,
    }
  }

  pub fn generation(&self) -> &str {
    &self.generation
  }

  /// Whether the current generation already holds assets.
  pub fn is_installed(&self) -> Result<bool> {
    Ok(
      self
        .storage
        .generations()?
        .iter()
        .any(|g| g == &self.generation),
    )
  }

  /// Populate the current generation with every manifest asset.
  ///
  /// All fetches must succeed before anything is stored; a single failure
  /// aborts the install and leaves existing generations untouched.
  pub async fn install(&self) -> Result<()> {
    let fetches = self.manifest.iter().map(|path| async move {
      let body = self.transport.get(path).await?;
      Ok::<_, color_eyre::Report>((self.transport.request_key(path)?, body))
    });

    let entries = future::try_join_all(fetches)
      .await
      .map_err(|e| eyre!("Install of {} aborted: {}", self.generation, e))?;

    self.storage.put_all(&self.generation, &entries)?;
    tracing::info!(
      generation = %self.generation,
      assets = entries.len(),
      "offline cache installed"
    );

    Ok(())
  }

  /// Evict every generation except the current one. Best-effort: individual
  /// delete failures are logged and do not block the takeover.
  pub fn activate(&self) -> Result<()> {
    let stale: Vec<String> = self
      .storage
      .generations()?
      .into_iter()
      .filter(|g| g != &self.generation)
      .collect();

    for generation in stale {
      if let Err(e) = self.storage.delete_generation(&generation) {
        tracing::warn!(generation = %generation, error = %e, "failed to evict stale generation");
      } else {
        tracing::debug!(generation = %generation, "evicted stale generation");
      }
    }

    Ok(())
  }

  /// Startup lifecycle: install the current generation if absent, then take
  /// over by evicting the rest.
  pub async fn bootstrap(&self) -> Result<()> {
    if !self.is_installed()? {
      self.install().await?;
    }
    self.activate()
  }

  /// Fetch an asset with the strategy its target calls for.
  pub async fn fetch(&self, path: &str) -> Result<Fetched> {
    if path == self.data_path {
      self.network_first(path).await
    } else {
      self.cache_first(path).await
    }
  }

  /// Network first: return fresh bytes and write them back to the current
  /// generation without blocking the response; fall back to the cached copy
  /// only when the network fails.
  async fn network_first(&self, path: &str) -> Result<Fetched> {
    let key = self.transport.request_key(path)?;

    match self.transport.get(path).await {
      Ok(body) => {
        let storage = Arc::clone(&self.storage);
        let generation = self.generation.clone();
        let write_key = key.clone();
        let copy = body.clone();

        // Fire-and-forget write-back; the next fetch retries on failure
        tokio::spawn(async move {
          if let Err(e) = storage.put(&generation, &write_key, &copy) {
            tracing::warn!(request = %write_key.describe(), error = %e, "cache write-back failed");
          }
        });

        Ok(Fetched {
          body,
          source: FetchSource::Network,
        })
      }
      Err(network_err) => match self.storage.get(&self.generation, &key)? {
        Some(cached) => {
          tracing::debug!(request = %key.describe(), "network failed, serving cached copy");
          Ok(Fetched {
            body: cached.body,
            source: FetchSource::Cache {
              stored_at: cached.stored_at,
            },
          })
        }
        None => Err(network_err),
      },
    }
  }

  /// Cache first: a cached copy is returned without touching the network;
  /// misses go to the network and are not written back (cache-first assets
  /// are only populated during install).
  async fn cache_first(&self, path: &str) -> Result<Fetched> {
    let key = self.transport.request_key(path)?;

    if let Some(cached) = self.storage.get(&self.generation, &key)? {
      return Ok(Fetched {
        body: cached.body,
        source: FetchSource::Cache {
          stored_at: cached.stored_at,
        },
      });
    }

    let body = self.transport.get(path).await?;
    Ok(Fetched {
      body,
      source: FetchSource::Network,
    })
  }

  /// Manual refresh: delete every generation unconditionally. The caller
  /// re-runs bootstrap to repopulate.
  pub fn purge_all(&self) -> Result<()> {
    tracing::info!("purging all cache generations");
    self.storage.delete_all()
  }
}

impl<S: AssetStore> Clone for OfflineCache<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      transport: self.transport.clone(),
      generation: self.generation.clone(),
      manifest: self.manifest.clone(),
      data_path: self.data_path.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_generation_names_are_versioned() {
    assert_eq!(generation_name(1), "skillsprout-v1");
    assert_ne!(generation_name(2), generation_name(3));
  }
}
