// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile proxy routes.

use crate::error::Result;
use crate::models::EditUserRequest;
use crate::routes::check_payload;
use crate::AppState;
use axum::{extract::State, routing::put, Json, Router};
use serde_json::Value;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/users/edit", put(edit_user))
}

/// Update the user's display name and theme preference.
async fn edit_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EditUserRequest>,
) -> Result<Json<Value>> {
    check_payload(&body)?;

    tracing::debug!(user_id = body.user_id, "Editing user profile");

    let data = state.backend.edit_user(&body).await?;
    Ok(Json(data))
}
