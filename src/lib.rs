// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal-Tracker: meal logging gateway and session client.
//!
//! This crate provides the HTTP gateway that fronts the external meal
//! backend API (attaching the server-held API key to every proxied call)
//! and the session-management library used by clients: durable token
//! storage, single-flight refresh, and authenticated requests that renew
//! an expired access token at most once per call.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod time_utils;

use config::Config;
use services::BackendClient;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub backend: BackendClient,
}
