// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Theme preference keyed by user id.
//!
//! Deliberately independent of the session profile: a profile may or may
//! not carry a theme hint, and the preference must survive logout.

use super::{SessionError, SessionStore};
use crate::models::Theme;
use std::sync::Arc;

pub struct ThemePreferences {
    store: Arc<dyn SessionStore>,
}

impl ThemePreferences {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    fn key(user_id: u64) -> String {
        format!("theme:{}", user_id)
    }

    pub fn get(&self, user_id: u64) -> Option<Theme> {
        self.store
            .get(&Self::key(user_id))
            .and_then(|raw| raw.parse().ok())
    }

    pub fn set(&self, user_id: u64, theme: Theme) -> Result<(), SessionError> {
        self.store.set(&Self::key(user_id), theme.as_str())
    }
}
