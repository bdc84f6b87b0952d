//! The persistent key-value storage area.
//!
//! A single `SQLite` file holds one serialized value per key, much like a
//! browser's local storage. Several processes may open the same file; each
//! write replaces a whole value and the last writer wins.
//!
//! The area also owns the [`ChangeBus`] that views use to tell each other
//! about writes. Publishing is explicit (see [`Storage::notify`]); plain
//! [`Storage::set_item`] calls are silent, except for [`Storage::clear`].

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::notify::{ChangeBus, StorageEvent, Subscription};

/// Default quota in bytes, matching what browsers grant an origin.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// How long a write waits for another process holding the file lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage engine for serialized values.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
    /// Maximum bytes held across all keys and values.
    quota_bytes: u64,
    /// Change notifications for views sharing this area.
    bus: ChangeBus,
}

impl Storage {
    /// Open or create a storage area at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening storage at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::StorageOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrations::initialize_schema(&conn)?;

        info!("Storage opened at {}", path.display());
        Ok(Self::from_parts(path, conn))
    }

    /// Create an in-memory storage area for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::StorageOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self::from_parts(PathBuf::from(":memory:"), conn))
    }

    fn from_parts(path: PathBuf, conn: Connection) -> Self {
        Self {
            path,
            conn: Mutex::new(conn),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            bus: ChangeBus::new(),
        }
    }

    /// Replace the byte quota.
    #[must_use]
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the configured quota in bytes.
    #[must_use]
    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()?
            .query_row("SELECT value FROM items WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// The write is refused if the area would then hold more than the quota;
    /// the previous value is left in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuotaExceeded`] when over quota, or an error if the
    /// database operation fails.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;

        let others: i64 = conn.query_row(
            r"
            SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
            FROM items WHERE key != ?1
            ",
            [key],
            |row| row.get(0),
        )?;
        let required = u64::try_from(others).unwrap_or(0) + (key.len() + value.len()) as u64;
        if required > self.quota_bytes {
            return Err(Error::QuotaExceeded {
                key: key.to_string(),
                required,
                quota: self.quota_bytes,
            });
        }

        conn.execute(
            r"
            INSERT INTO items (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value],
        )?;
        debug!(key, bytes = value.len(), "stored item");
        Ok(())
    }

    /// Delete the value stored under `key`.
    ///
    /// Returns `true` if a value was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let affected = self.conn()?.execute("DELETE FROM items WHERE key = ?1", [key])?;
        debug!(key, removed = affected > 0, "removed item");
        Ok(affected > 0)
    }

    /// Delete every key in the area and publish a keyless change event.
    ///
    /// Returns the number of keys deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear(&self) -> Result<usize> {
        let affected = self.conn()?.execute("DELETE FROM items", [])?;
        info!("Cleared storage area ({} keys)", affected);
        self.bus.publish(StorageEvent::cleared());
        Ok(affected)
    }

    /// List every key, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM items ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    /// Count stored keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Check whether the area holds no keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Get storage statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let (total_keys, used): (i64, i64) = self.conn()?.query_row(
            r"
            SELECT COUNT(*),
                   COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
            FROM items
            ",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_keys: usize::try_from(total_keys).unwrap_or(0),
            used_bytes: u64::try_from(used).unwrap_or(0),
            quota_bytes: self.quota_bytes,
            db_size_bytes,
        })
    }

    /// Publish a change event for `key` to every subscribed view.
    pub fn notify(&self, key: &str, new_value: Option<String>) {
        let delivered = self.bus.publish(StorageEvent::changed(key, new_value));
        debug!(key, delivered, "notified views");
    }

    /// Subscribe to change events published through this area.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }
}

/// Statistics about the storage area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Number of stored keys.
    pub total_keys: usize,
    /// Bytes counted against the quota.
    pub used_bytes: u64,
    /// Configured quota in bytes.
    pub quota_bytes: u64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
