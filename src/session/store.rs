// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable client-side storage for session fields.
//!
//! Keys are independent string slots. A store is fully loaded once its
//! constructor returns; session hydration must not run before that point.

use super::SessionError;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Storage keys used by the session manager.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const TOKEN_EXPIRES: &str = "token_expires";
    pub const USER: &str = "user";
}

/// Durable key/value storage for session state.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON-file-backed store.
///
/// All keys are read in [`FileStore::open`]; writes go through a temp file
/// and rename so a crash never leaves a half-written session behind.
pub struct FileStore {
    path: PathBuf,
    entries: DashMap<String, String>,
}

impl FileStore {
    /// Open (or create) the store at `path`, loading any existing entries.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let entries = DashMap::new();

        if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| SessionError::Storage(format!("read {}: {}", path.display(), e)))?;
            let parsed: BTreeMap<String, String> = serde_json::from_str(&raw)
                .map_err(|e| SessionError::Storage(format!("parse {}: {}", path.display(), e)))?;
            for (key, value) in parsed {
                entries.insert(key, value);
            }
        }

        Ok(Self { path, entries })
    }

    fn persist(&self) -> Result<(), SessionError> {
        // BTreeMap for a stable on-disk order
        let snapshot: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let raw = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| SessionError::Storage(format!("serialize session: {}", e)))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)
            .map_err(|e| SessionError::Storage(format!("write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| SessionError::Storage(format!("rename {}: {}", tmp.display(), e)))?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}
