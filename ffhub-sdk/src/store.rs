//! Local key-value storage backed by SQLite.
//!
//! Values are JSON documents under fixed key names, one row each. A value
//! that no longer parses is logged and treated as absent.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::github::GitHubConfig;
use crate::model::{JoinedHistory, UserProfile};

pub const PROFILE_KEY: &str = "UserProfile";
pub const HISTORY_KEY: &str = "JoinedHistory";
pub const GITHUB_KEY: &str = "gh_config";

/// Default store location: `~/.config/ffhub/store.db`.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ffhub")
        .join("store.db")
}

pub struct Store {
    db: Mutex<Connection>,
}

impl Store {
    /// Open or create the store, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(Self { db: Mutex::new(conn) })
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let db = self.db.lock();
        let value = db
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring unreadable stored value");
                Ok(None)
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock();
        db.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, json, now],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let db = self.db.lock();
        db.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn profile(&self) -> Result<Option<UserProfile>> {
        self.get(PROFILE_KEY)
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.set(PROFILE_KEY, profile)
    }

    /// Join history, newest first.
    pub fn history(&self) -> Result<Vec<JoinedHistory>> {
        Ok(self.get(HISTORY_KEY)?.unwrap_or_default())
    }

    /// Prepend `entry` and return the updated history.
    pub fn record_join(&self, entry: JoinedHistory) -> Result<Vec<JoinedHistory>> {
        let mut history = self.history()?;
        history.insert(0, entry);
        self.set(HISTORY_KEY, &history)?;
        Ok(history)
    }

    pub fn github_config(&self) -> Result<Option<GitHubConfig>> {
        self.get(GITHUB_KEY)
    }

    pub fn save_github_config(&self, config: &GitHubConfig) -> Result<()> {
        self.set(GITHUB_KEY, config)
    }
}
