// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the external meal backend API.
//!
//! Every outbound request carries the server-held API key in an
//! `x-api-key` header. Non-2xx responses are turned into
//! [`AppError::BackendRejected`] with the backend's own message so the
//! gateway can relay them.

use crate::error::AppError;
use crate::models::dashboard::DashboardUpstream;
use crate::models::{CreateMealRequest, EditUserRequest, MealUpdateRequest, Unit};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const API_KEY_HEADER: &str = "x-api-key";

/// Meal backend API client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BackendClient {
    /// Create a new backend client for the given base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    // ─── Auth ────────────────────────────────────────────────────────────

    /// Exchange credentials for a profile and token grant.
    pub async fn login(&self, credentials: &Value) -> Result<Value, AppError> {
        self.send_json(Method::POST, "/api/users/login", Some(credentials), &[])
            .await
    }

    /// Exchange a refresh token for a new token pair.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Value, AppError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        self.send_json(Method::POST, "/api/users/refresh-token", Some(&body), &[])
            .await
    }

    // ─── Users ───────────────────────────────────────────────────────────

    /// Update a user's name and theme preference.
    pub async fn edit_user(&self, payload: &EditUserRequest) -> Result<Value, AppError> {
        self.send_json(Method::PUT, "/api/users/edit", Some(payload), &[])
            .await
    }

    // ─── Meals ───────────────────────────────────────────────────────────

    pub async fn create_meal(&self, payload: &CreateMealRequest) -> Result<Value, AppError> {
        self.send_json(Method::POST, "/api/meals", Some(payload), &[])
            .await
    }

    pub async fn get_meal(&self, meal_id: u64) -> Result<Value, AppError> {
        self.send_json::<(), Value>(Method::GET, &format!("/api/meals/{}", meal_id), None, &[])
            .await
    }

    pub async fn update_meal(
        &self,
        meal_id: u64,
        payload: &MealUpdateRequest,
    ) -> Result<Value, AppError> {
        self.send_json(
            Method::PUT,
            &format!("/api/meals/{}", meal_id),
            Some(payload),
            &[],
        )
        .await
    }

    pub async fn delete_meal(&self, meal_id: u64) -> Result<Value, AppError> {
        self.send_json::<(), Value>(
            Method::DELETE,
            &format!("/api/meals/{}", meal_id),
            None,
            &[],
        )
        .await
    }

    /// Fetch the flat dashboard rows for all users.
    pub async fn dashboard(&self) -> Result<DashboardUpstream, AppError> {
        self.send_json::<(), DashboardUpstream>(Method::GET, "/api/meals/dashboard", None, &[])
            .await
    }

    /// Fetch meals logged on a given date (`YYYY-MM-DD`).
    pub async fn meals_by_date(&self, date: &str) -> Result<Value, AppError> {
        self.send_json::<(), Value>(
            Method::GET,
            "/api/meals/filter-by-date",
            None,
            &[("date", date)],
        )
        .await
    }

    /// Fetch measurement units, unwrapping the backend's `{ data }` envelope.
    pub async fn measurement_units(&self) -> Result<Vec<Unit>, AppError> {
        #[derive(serde::Deserialize)]
        struct Envelope {
            data: Vec<Unit>,
        }

        let envelope: Envelope = self
            .send_json::<(), Envelope>(Method::GET, "/api/measurement-units", None, &[])
            .await?;
        Ok(envelope.data)
    }

    // ─── Plumbing ────────────────────────────────────────────────────────

    /// Issue a request with the API key attached and parse the JSON reply.
    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http
            .request(method, &url)
            .header(API_KEY_HEADER, &self.api_key);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Backend request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_message(&body)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            tracing::warn!(status = status.as_u16(), message, "Backend rejected request");
            return Err(AppError::BackendRejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))
    }
}

/// Pull a human-readable message out of a backend error body.
/// The backend is inconsistent about the field name.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}
