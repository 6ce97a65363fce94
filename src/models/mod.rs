// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod dashboard;
pub mod meal;
pub mod user;

pub use dashboard::{group_by_user, DashboardResponse, MealRow, UserMeals};
pub use meal::{CreateMealRequest, MealItem, MealType, MealUpdateRequest, Unit};
pub use user::{EditUserRequest, ProfileUpdate, Theme, UserProfile};
