// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard aggregation.
//!
//! The backend returns flat rows, one per ingredient line; the dashboard
//! view groups them per user.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One flat dashboard row from the backend (one ingredient line of a meal).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MealRow {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub user_name: String,
    pub description: String,
    pub date_time: String,
    pub meal_type: String,
    pub item_name: String,
    pub quantity: f64,
    pub unit: String,
}

/// Backend dashboard payload.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardUpstream {
    #[serde(default)]
    pub message: String,
    pub data: Vec<MealRow>,
}

/// One user's dashboard section.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserMeals {
    pub user_name: String,
    pub meals: Vec<MealRow>,
    /// Distinct meal count (rows repeat the meal per ingredient line).
    pub total: u32,
}

/// Grouped dashboard response.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardResponse {
    pub total_meals: u32,
    pub users: Vec<UserMeals>,
}

/// Group flat rows per user, preserving first-seen user order and row order
/// within each user.
pub fn group_by_user(rows: Vec<MealRow>) -> Vec<UserMeals> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<MealRow>> = HashMap::new();

    for row in rows {
        if !buckets.contains_key(&row.user_name) {
            order.push(row.user_name.clone());
        }
        buckets.entry(row.user_name.clone()).or_default().push(row);
    }

    order
        .into_iter()
        .map(|user_name| {
            let meals = buckets.remove(&user_name).unwrap_or_default();
            let total = meals.iter().map(|m| m.id).collect::<HashSet<_>>().len() as u32;
            UserMeals {
                user_name,
                meals,
                total,
            }
        })
        .collect()
}
