//! Asset storage trait and SQLite implementation.
//!
//! Cached response bodies live in named cache generations, keyed by request
//! identity (method + absolute URL). Keys are stored as a SHA-256 hash with
//! the readable request alongside.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use url::Url;

/// Identity of a cached request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestKey {
  method: String,
  url: String,
}

impl RequestKey {
  /// Key for a GET of the given URL.
  pub fn get(url: &Url) -> Self {
    Self {
      method: "GET".to_string(),
      url: url.to_string(),
    }
  }

  /// Stable fixed-length storage key.
  pub fn hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.method.as_bytes());
    hasher.update(b" ");
    hasher.update(self.url.as_bytes());
    hex::encode(hasher.finalize())
  }

  /// Readable form, e.g. "GET https://example.com/data/resources.json".
  pub fn describe(&self) -> String {
    format!("{} {}", self.method, self.url)
  }
}

/// A cached response body with its storage timestamp.
#[derive(Debug, Clone)]
pub struct CachedAsset {
  pub body: Vec<u8>,
  pub stored_at: DateTime<Utc>,
}

/// Trait for cache-generation storage backends.
pub trait AssetStore: Send + Sync {
  /// Store one asset in a generation (last write wins).
  fn put(&self, generation: &str, key: &RequestKey, body: &[u8]) -> Result<()>;

  /// Store a full set of assets in a generation, atomically.
  fn put_all(&self, generation: &str, entries: &[(RequestKey, Vec<u8>)]) -> Result<()>;

  /// Look up an asset in a generation. A miss is `Ok(None)`, never an error.
  fn get(&self, generation: &str, key: &RequestKey) -> Result<Option<CachedAsset>>;

  /// Names of all generations currently holding assets.
  fn generations(&self) -> Result<Vec<String>>;

  /// Delete one generation and everything in it.
  fn delete_generation(&self, generation: &str) -> Result<()>;

  /// Delete every generation.
  fn delete_all(&self) -> Result<()>;
}

const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS asset_cache (
    generation TEXT NOT NULL,
    request_hash TEXT NOT NULL,
    request TEXT NOT NULL,
    body BLOB NOT NULL,
    stored_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (generation, request_hash)
);

CREATE INDEX IF NOT EXISTS idx_asset_cache_generation ON asset_cache(generation);
"#;

/// SQLite-backed generation store.
pub struct SqliteAssetStore {
  conn: Mutex<Connection>,
}

impl SqliteAssetStore {
  /// Open the store at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open (or create) the store at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("skillsprout").join("cache.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

impl AssetStore for SqliteAssetStore {
  fn put(&self, generation: &str, key: &RequestKey, body: &[u8]) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO asset_cache (generation, request_hash, request, body, stored_at)
         VALUES (?, ?, ?, ?, datetime('now'))",
        params![generation, key.hash(), key.describe(), body],
      )
      .map_err(|e| eyre!("Failed to store asset: {}", e))?;

    Ok(())
  }

  fn put_all(&self, generation: &str, entries: &[(RequestKey, Vec<u8>)]) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute("BEGIN TRANSACTION", [])
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    for (key, body) in entries {
      conn
        .execute(
          "INSERT OR REPLACE INTO asset_cache (generation, request_hash, request, body, stored_at)
           VALUES (?, ?, ?, ?, datetime('now'))",
          params![generation, key.hash(), key.describe(), body],
        )
        .map_err(|e| eyre!("Failed to store asset: {}", e))?;
    }

    conn
      .execute("COMMIT", [])
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    Ok(())
  }

  fn get(&self, generation: &str, key: &RequestKey) -> Result<Option<CachedAsset>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT body, stored_at FROM asset_cache WHERE generation = ? AND request_hash = ?",
        params![generation, key.hash()],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read asset: {}", e))?;

    match row {
      Some((body, stored_at)) => Ok(Some(CachedAsset {
        body,
        stored_at: parse_datetime(&stored_at)?,
      })),
      None => Ok(None),
    }
  }

  fn generations(&self) -> Result<Vec<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT DISTINCT generation FROM asset_cache ORDER BY generation")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let names = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list generations: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    Ok(names)
  }

  fn delete_generation(&self, generation: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "DELETE FROM asset_cache WHERE generation = ?",
        params![generation],
      )
      .map_err(|e| eyre!("Failed to delete generation {}: {}", generation, e))?;

    Ok(())
  }

  fn delete_all(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute("DELETE FROM asset_cache", [])
      .map_err(|e| eyre!("Failed to clear cache: {}", e))?;

    Ok(())
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}
