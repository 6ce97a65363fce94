// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session manager: token lifecycle and authenticated requests.
//!
//! Handles:
//! - Login/logout with durable persistence of tokens and profile
//! - Token refresh, single-flight (one attempt in flight at a time)
//! - Startup hydration from the durable store
//! - Authenticated requests with a one-shot refresh-and-retry on 401

use super::store::{keys, SessionStore};
use super::theme::ThemePreferences;
use super::SessionError;
use crate::models::{ProfileUpdate, UserProfile};
use crate::time_utils::now_epoch_ms;
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};

/// Tokens issued by a login or refresh response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Refresh endpoint response body.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    tokens: TokenGrant,
}

/// Session lifecycle phase, observable through
/// [`SessionManager::watch_phase`]. The transition to `Unauthenticated` is
/// the signal to navigate to the login entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Durable storage has not been inspected yet.
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// In-memory session fields.
///
/// Invariant: `access_token` and `expires_at_ms` are set and cleared
/// together. All mutation goes through the manager's methods.
#[derive(Debug, Clone, Default)]
struct SessionState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at_ms: Option<i64>,
    user: Option<UserProfile>,
    /// Bumped on every completed refresh. A caller that waited for the
    /// refresh lock and observes a bumped generation knows another task
    /// already rotated the tokens.
    refresh_generation: u64,
}

/// Read-only view of the current session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub user: Option<UserProfile>,
    pub access_token: Option<String>,
    pub expires_at_ms: Option<i64>,
}

/// Client-side session manager (see module docs).
pub struct SessionManager {
    http: reqwest::Client,
    /// Absolute URL of the token refresh endpoint.
    refresh_url: String,
    store: Arc<dyn SessionStore>,
    themes: ThemePreferences,
    state: RwLock<SessionState>,
    /// Serializes refresh attempts; see [`SessionManager::refresh`].
    refresh_lock: Mutex<()>,
    phase_tx: watch::Sender<SessionPhase>,
}

impl SessionManager {
    /// Create a manager over an already-loaded store. For a file-backed
    /// store, opening it is the load; hydration via
    /// [`check_auth`](Self::check_auth) is safe as soon as this returns.
    pub fn new(refresh_url: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        let (phase_tx, _) = watch::channel(SessionPhase::Unknown);
        Self {
            http: reqwest::Client::new(),
            refresh_url: refresh_url.into(),
            themes: ThemePreferences::new(store.clone()),
            store,
            state: RwLock::new(SessionState::default()),
            refresh_lock: Mutex::new(()),
            phase_tx,
        }
    }

    /// Subscribe to session phase changes.
    pub fn watch_phase(&self) -> watch::Receiver<SessionPhase> {
        self.phase_tx.subscribe()
    }

    /// Current phase without subscribing.
    pub fn phase(&self) -> SessionPhase {
        *self.phase_tx.borrow()
    }

    /// Theme preferences, shared with the session's durable store.
    pub fn themes(&self) -> &ThemePreferences {
        &self.themes
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            user: state.user.clone(),
            access_token: state.access_token.clone(),
            expires_at_ms: state.expires_at_ms,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.user.is_some()
    }

    // ─── Login / Logout ──────────────────────────────────────────────────

    /// Store the profile and, when provided, the token grant.
    pub async fn login(
        &self,
        profile: UserProfile,
        tokens: Option<TokenGrant>,
    ) -> Result<(), SessionError> {
        if let Some(theme) = profile.theme_selected {
            self.themes.set(profile.id, theme)?;
        }

        self.store.set(
            keys::USER,
            &serde_json::to_string(&profile)
                .map_err(|e| SessionError::Storage(format!("serialize profile: {}", e)))?,
        )?;

        let mut state = self.state.write().await;
        state.user = Some(profile);

        if let Some(grant) = tokens {
            let expires_at = now_epoch_ms() + grant.expires_in * 1000;
            self.store.set(keys::ACCESS_TOKEN, &grant.access_token)?;
            self.store.set(keys::REFRESH_TOKEN, &grant.refresh_token)?;
            self.store.set(keys::TOKEN_EXPIRES, &expires_at.to_string())?;

            state.access_token = Some(grant.access_token);
            state.refresh_token = Some(grant.refresh_token);
            state.expires_at_ms = Some(expires_at);
        }
        drop(state);

        self.phase_tx.send_replace(SessionPhase::Authenticated);
        Ok(())
    }

    /// Merge edited fields into the stored profile. All profile mutation
    /// goes through here so persistence and theme sync stay in one place.
    pub async fn update_profile(&self, changes: ProfileUpdate) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        let user = state.user.as_mut().ok_or(SessionError::NotLoggedIn)?;

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(theme) = changes.theme_selected {
            user.theme_selected = Some(theme);
            self.themes.set(user.id, theme)?;
        }

        let raw = serde_json::to_string(&*user)
            .map_err(|e| SessionError::Storage(format!("serialize profile: {}", e)))?;
        self.store.set(keys::USER, &raw)?;
        Ok(())
    }

    /// Clear the session from memory and durable storage. Safe to call
    /// repeatedly.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.store.remove(keys::USER)?;
        self.store.remove(keys::ACCESS_TOKEN)?;
        self.store.remove(keys::REFRESH_TOKEN)?;
        self.store.remove(keys::TOKEN_EXPIRES)?;

        let mut state = self.state.write().await;
        state.user = None;
        state.access_token = None;
        state.refresh_token = None;
        state.expires_at_ms = None;
        drop(state);

        self.phase_tx.send_replace(SessionPhase::Unauthenticated);
        Ok(())
    }

    // ─── Refresh ─────────────────────────────────────────────────────────

    /// Exchange the refresh token for a new token pair.
    ///
    /// Single-flight: callers serialize on `refresh_lock`, and a caller
    /// that waited while another task completed a refresh returns that
    /// task's result instead of rotating the now-stale refresh token a
    /// second time. Any failure on this path forces a clean logout.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let entry_generation = self.state.read().await.refresh_generation;
        let _guard = self.refresh_lock.lock().await;

        let refresh_token = {
            let state = self.state.read().await;
            if state.refresh_generation != entry_generation {
                // Another caller refreshed while we waited for the lock.
                return Ok(());
            }
            state.refresh_token.clone()
        };

        let Some(refresh_token) = refresh_token else {
            self.logout().await?;
            return Err(SessionError::MissingRefreshToken);
        };

        let response = match self
            .http
            .post(&self.refresh_url)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // Network failure during refresh counts as a rejection.
                tracing::warn!(error = %e, "Token refresh request failed");
                self.logout().await?;
                return Err(SessionError::SessionExpired);
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            tracing::warn!(status = status.as_u16(), message, "Refresh token rejected");
            self.logout().await?;
            return Err(SessionError::RefreshRejected(message));
        }

        let body: RefreshResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                self.logout().await?;
                return Err(SessionError::RefreshRejected(format!(
                    "malformed refresh response: {}",
                    e
                )));
            }
        };

        let grant = body.tokens;
        let expires_at = now_epoch_ms() + grant.expires_in * 1000;
        self.store.set(keys::ACCESS_TOKEN, &grant.access_token)?;
        self.store.set(keys::REFRESH_TOKEN, &grant.refresh_token)?;
        self.store.set(keys::TOKEN_EXPIRES, &expires_at.to_string())?;

        // Re-hydrate the profile from storage; refresh can run before the
        // in-memory profile is set (first call after a restart).
        let stored_user = self
            .store
            .get(keys::USER)
            .and_then(|raw| serde_json::from_str::<UserProfile>(&raw).ok());

        let mut state = self.state.write().await;
        state.access_token = Some(grant.access_token);
        state.refresh_token = Some(grant.refresh_token);
        state.expires_at_ms = Some(expires_at);
        if let Some(user) = stored_user {
            state.user = Some(user);
        }
        state.refresh_generation += 1;
        drop(state);

        self.phase_tx.send_replace(SessionPhase::Authenticated);
        tracing::debug!("Access token refreshed");
        Ok(())
    }

    // ─── Hydration ───────────────────────────────────────────────────────

    /// Hydrate the session from durable storage. Call once at startup.
    ///
    /// A stored profile is only trusted together with a non-expired access
    /// token; an expired token with a refresh token triggers exactly one
    /// refresh before this returns.
    pub async fn check_auth(&self) -> Result<(), SessionError> {
        let stored_user = self
            .store
            .get(keys::USER)
            .and_then(|raw| serde_json::from_str::<UserProfile>(&raw).ok());
        let access_token = self.store.get(keys::ACCESS_TOKEN);
        let refresh_token = self.store.get(keys::REFRESH_TOKEN);
        let expires_at_ms = self
            .store
            .get(keys::TOKEN_EXPIRES)
            .and_then(|raw| raw.parse::<i64>().ok());

        // Seed the refresh token so an expired-token hydration can renew.
        self.state.write().await.refresh_token = refresh_token;

        match (stored_user, access_token, expires_at_ms) {
            (Some(user), Some(token), Some(expires_at)) => {
                if now_epoch_ms() < expires_at {
                    if let Some(theme) = user.theme_selected {
                        if self.themes.get(user.id).is_none() {
                            self.themes.set(user.id, theme)?;
                        }
                    }

                    let mut state = self.state.write().await;
                    state.user = Some(user);
                    state.access_token = Some(token);
                    state.expires_at_ms = Some(expires_at);
                    drop(state);

                    self.phase_tx.send_replace(SessionPhase::Authenticated);
                    Ok(())
                } else {
                    self.refresh().await
                }
            }
            _ => {
                let mut state = self.state.write().await;
                state.user = None;
                state.access_token = None;
                state.expires_at_ms = None;
                drop(state);

                self.phase_tx.send_replace(SessionPhase::Unauthenticated);
                Ok(())
            }
        }
    }

    // ─── Authenticated requests ──────────────────────────────────────────

    /// Issue a request with a Bearer token, renewing the token at most once.
    ///
    /// Protocol: attempt → on 401 → refresh (single-flight) → retry once →
    /// return. Non-401 responses, including errors, are returned to the
    /// caller untouched; a failed renewal surfaces as
    /// [`SessionError::SessionExpired`] after the session is cleared.
    pub async fn authenticated_fetch(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response, SessionError> {
        let access_token = self
            .state
            .read()
            .await
            .access_token
            .clone()
            .ok_or(SessionError::NotLoggedIn)?;

        let response = self
            .send_with_token(method.clone(), url, body, &access_token)
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // Only refresh if no one beat us to it: a concurrent call may have
        // already rotated the tokens while our 401 was in flight.
        let current = self.state.read().await.access_token.clone();
        if current.as_deref() == Some(access_token.as_str()) {
            if let Err(e) = self.refresh().await {
                tracing::warn!(error = %e, "Session renewal failed");
                return Err(SessionError::SessionExpired);
            }
        }

        let new_token = self
            .state
            .read()
            .await
            .access_token
            .clone()
            .ok_or(SessionError::SessionExpired)?;

        // Exactly one retry; a second 401 goes back to the caller.
        self.send_with_token(method, url, body, &new_token).await
    }

    async fn send_with_token(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: &str,
    ) -> Result<Response, SessionError> {
        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }
}
