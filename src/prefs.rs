//! Persisted user preferences.
//!
//! A single low-data flag survives restarts in a small SQLite key-value
//! table. Anything other than a stored "1" reads as off.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const LOW_DATA_KEY: &str = "low_data";

const PREFS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS prefs (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

pub struct PrefStore {
  conn: Mutex<Connection>,
}

impl PrefStore {
  /// Open the preference store at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open (or create) the preference store at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create preferences directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open preferences at {}: {}", path.display(), e))?;
    conn
      .execute_batch(PREFS_SCHEMA)
      .map_err(|e| eyre!("Failed to run preference migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("skillsprout").join("prefs.db"))
  }

  /// Whether low-data mode is on. Absent or unrecognized values are off.
  pub fn get_low_data(&self) -> Result<bool> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let value: Option<String> = conn
      .query_row(
        "SELECT value FROM prefs WHERE key = ?",
        params![LOW_DATA_KEY],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read preference: {}", e))?;

    Ok(value.as_deref() == Some("1"))
  }

  /// Persist the low-data flag as "1"/"0".
  pub fn set_low_data(&self, enabled: bool) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO prefs (key, value) VALUES (?, ?)",
        params![LOW_DATA_KEY, if enabled { "1" } else { "0" }],
      )
      .map_err(|e| eyre!("Failed to store preference: {}", e))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_to_off_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    let store = PrefStore::open_at(&dir.path().join("prefs.db")).unwrap();
    assert!(!store.get_low_data().unwrap());
  }

  #[test]
  fn test_round_trip_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.db");

    let store = PrefStore::open_at(&path).unwrap();
    store.set_low_data(true).unwrap();
    assert!(store.get_low_data().unwrap());
    drop(store);

    // Simulated restart
    let store = PrefStore::open_at(&path).unwrap();
    assert!(store.get_low_data().unwrap());

    store.set_low_data(false).unwrap();
    assert!(!store.get_low_data().unwrap());
  }

  #[test]
  fn test_unrecognized_stored_value_reads_as_off() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.db");

    let store = PrefStore::open_at(&path).unwrap();
    {
      let conn = store.conn.lock().unwrap();
      conn
        .execute(
          "INSERT OR REPLACE INTO prefs (key, value) VALUES (?, ?)",
          params![LOW_DATA_KEY, "maybe"],
        )
        .unwrap();
    }

    assert!(!store.get_low_data().unwrap());
  }
}
