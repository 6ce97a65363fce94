// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal proxy routes: CRUD, dashboard, date filter, catalogs.

use crate::error::{AppError, Result};
use crate::models::dashboard::{group_by_user, DashboardResponse};
use crate::models::meal::meal_type_catalog;
use crate::models::{CreateMealRequest, MealType, MealUpdateRequest, Unit};
use crate::routes::check_payload;
use crate::time_utils::parse_filter_date;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/meals", post(create_meal))
        .route(
            "/api/meals/{id}",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
        .route("/api/meals/dashboard", get(dashboard))
        .route("/api/meals/filter-by-date", get(filter_by_date))
        .route("/api/meals/types", get(meal_types))
        .route("/api/meals/units", get(units))
}

/// Parse a meal id path segment.
fn parse_meal_id(raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid meal id".to_string()))
}

// ─── CRUD ────────────────────────────────────────────────────

/// Create a meal. Shape is validated here; persistence rules live in the
/// backend.
async fn create_meal(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateMealRequest>,
) -> Result<Json<Value>> {
    check_payload(&body)?;

    tracing::debug!(
        user_id = body.user_id,
        type_id = body.type_id,
        items = body.items.len(),
        "Creating meal"
    );

    let data = state.backend.create_meal(&body).await?;
    Ok(Json(data))
}

async fn get_meal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let meal_id = parse_meal_id(&id)?;
    let data = state.backend.get_meal(meal_id).await?;
    Ok(Json(data))
}

/// Update a meal. Only fields present in the payload are forwarded.
async fn update_meal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<MealUpdateRequest>,
) -> Result<Json<Value>> {
    let meal_id = parse_meal_id(&id)?;
    check_payload(&body)?;

    let data = state.backend.update_meal(meal_id, &body).await?;
    Ok(Json(data))
}

async fn delete_meal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let meal_id = parse_meal_id(&id)?;
    let data = state.backend.delete_meal(meal_id).await?;
    Ok(Json(data))
}

// ─── Dashboard ───────────────────────────────────────────────

/// Dashboard view: flat backend rows grouped per user.
async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<DashboardResponse>> {
    let upstream = state.backend.dashboard().await?;
    let total_meals = upstream
        .data
        .iter()
        .map(|row| row.id)
        .collect::<std::collections::HashSet<_>>()
        .len() as u32;
    let users = group_by_user(upstream.data);

    Ok(Json(DashboardResponse { total_meals, users }))
}

#[derive(Deserialize)]
struct DateFilterQuery {
    date: Option<String>,
}

/// Meals logged on a given date (`YYYY-MM-DD`).
async fn filter_by_date(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DateFilterQuery>,
) -> Result<Json<Value>> {
    let date = params
        .date
        .ok_or_else(|| AppError::BadRequest("date parameter is required".to_string()))?;

    if parse_filter_date(&date).is_none() {
        return Err(AppError::BadRequest(
            "Invalid 'date' parameter: must be YYYY-MM-DD".to_string(),
        ));
    }

    let data = state.backend.meals_by_date(&date).await?;
    Ok(Json(data))
}

// ─── Catalogs ────────────────────────────────────────────────

/// Meal type catalog (served locally; the backend has no such endpoint).
async fn meal_types() -> Json<Vec<MealType>> {
    Json(meal_type_catalog())
}

/// Measurement units, unwrapped from the backend envelope.
async fn units(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Unit>>> {
    let units = state.backend.measurement_units().await?;
    Ok(Json(units))
}
