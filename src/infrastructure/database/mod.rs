//! SQLite state storage

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Mutex;

use crate::domain::traits::StateStore;
use crate::domain::entities::{ConversationState, UserProfile};
use crate::application::errors::StorageError;

const KIND_CONVERSATION: &str = "conversation";
const KIND_PROFILE: &str = "profile";

/// Stores conversation state and profiles as JSON rows
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let store = Self { conn: Mutex::new(conn) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS state (
                kind TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (kind, key)
            )",
            [],
        )?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, kind: &str, key: &str) -> Result<Option<T>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM state WHERE kind = ?1 AND key = ?2",
                rusqlite::params![kind, key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(&self, kind: &str, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "INSERT INTO state (kind, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(kind, key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
            rusqlite::params![kind, key, raw],
        )?;
        Ok(())
    }

    fn remove(&self, kind: &str, key: &str) -> Result<bool, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let rows = conn.execute(
            "DELETE FROM state WHERE kind = ?1 AND key = ?2",
            rusqlite::params![kind, key],
        )?;
        Ok(rows > 0)
    }

    /// Number of stored conversations
    pub fn conversation_count(&self) -> Result<usize, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM state WHERE kind = ?1",
            [KIND_CONVERSATION],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn load_conversation(&self, key: &str) -> Result<Option<ConversationState>, StorageError> {
        self.get(KIND_CONVERSATION, key)
    }

    async fn save_conversation(&self, key: &str, state: &ConversationState) -> Result<(), StorageError> {
        self.put(KIND_CONVERSATION, key, state)
    }

    async fn delete_conversation(&self, key: &str) -> Result<(), StorageError> {
        if !self.remove(KIND_CONVERSATION, key)? {
            tracing::debug!("No stored conversation {}", key);
        }
        Ok(())
    }

    async fn load_profile(&self, key: &str) -> Result<Option<UserProfile>, StorageError> {
        self.get(KIND_PROFILE, key)
    }

    async fn save_profile(&self, key: &str, profile: &UserProfile) -> Result<(), StorageError> {
        self.put(KIND_PROFILE, key, profile)
    }
}
