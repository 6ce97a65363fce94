// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication proxy routes (login and token refresh).

use crate::error::{AppError, Result};
use crate::routes::check_payload;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
}

#[derive(Deserialize, Validate)]
struct LoginRequest {
    #[validate(email(message = "invalid email address"))]
    email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    password: String,
}

/// Exchange credentials for a profile and token grant.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>> {
    check_payload(&body)?;

    let credentials = serde_json::json!({
        "email": body.email,
        "password": body.password,
    });
    let data = state.backend.login(&credentials).await?;
    Ok(Json(data))
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh_token: Option<String>,
}

/// Exchange a refresh token for a new token pair.
///
/// Success bodies (`{ tokens: { access_token, refresh_token, expires_in } }`)
/// and backend rejections are both relayed as-is.
async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<Value>> {
    let refresh_token = body
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("refresh_token is required".to_string()))?;

    let data = state.backend.refresh_token(&refresh_token).await?;
    Ok(Json(data))
}
