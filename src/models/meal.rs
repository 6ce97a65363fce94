// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal payloads validated by the gateway before forwarding.
//!
//! The backend owns persistence; we only reject obviously malformed
//! requests so they never leave this service.

use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One ingredient line of a meal.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MealItem {
    #[validate(length(min = 1, message = "item name must not be empty"))]
    pub item_name: String,
    #[validate(range(exclusive_min = 0.0, message = "quantity must be positive"))]
    pub quantity: f64,
    #[validate(range(min = 1, message = "unit_id must be set"))]
    pub unit_id: u32,
}

/// Payload for `POST /api/meals`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMealRequest {
    pub user_id: u64,
    pub type_id: u32,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    /// Meal timestamp (RFC3339, backend-validated)
    pub date_time: String,
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<MealItem>,
}

/// Payload for `PUT /api/meals/{id}`. Only provided fields are forwarded.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MealUpdateRequest {
    pub user_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Option<Vec<MealItem>>,
}

/// Meal type catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MealType {
    pub id: u32,
    pub name: String,
}

/// Measurement unit as served by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Unit {
    pub id: u32,
    pub name: String,
    pub abbreviation: String,
}

/// Static meal type catalog; the backend does not serve one.
pub fn meal_type_catalog() -> Vec<MealType> {
    [
        "Breakfast",
        "Morning snack",
        "Lunch",
        "Afternoon snack",
        "Dinner",
        "Supper",
        "Quick snack",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| MealType {
        id: i as u32 + 1,
        name: (*name).to_string(),
    })
    .collect()
}
