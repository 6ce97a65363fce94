// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side session management.
//!
//! Owns the access/refresh token pair and the user profile, persists them
//! through a pluggable durable store, and exposes an authorization-aware
//! request helper that renews an expired access token at most once per
//! call. Refresh is single-flight: concurrent callers converge on one
//! refresh attempt instead of each rotating the refresh token.

pub mod manager;
pub mod store;
pub mod theme;

pub use manager::{SessionManager, SessionPhase, SessionSnapshot, TokenGrant};
pub use store::{FileStore, MemoryStore, SessionStore};
pub use theme::ThemePreferences;

/// Session-layer errors.
///
/// The refresh path (`MissingRefreshToken`, `RefreshRejected`,
/// `SessionExpired`) always resolves to a clean logged-out state before the
/// error is returned. `Request` failures outside the refresh path leave the
/// session untouched.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No refresh token held; nothing to renew.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The backend rejected the refresh token (revoked or already rotated).
    #[error("token refresh rejected: {0}")]
    RefreshRejected(String),

    /// The session could not be renewed; the caller must log in again.
    #[error("session expired")]
    SessionExpired,

    /// No session is active.
    #[error("not logged in")]
    NotLoggedIn,

    /// Request-level failure outside the refresh path.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Durable store failure.
    #[error("session storage error: {0}")]
    Storage(String),
}
