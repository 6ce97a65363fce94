// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gateway route tests: validation at the edge, API key attachment,
//! relay of backend rejections, and the dashboard grouping.

use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::{
    body::Body,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

mod common;
use common::{body_json, create_offline_app, create_test_app, spawn_backend};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// ─── Validation before the backend is contacted ──────────────

#[tokio::test]
async fn test_create_meal_with_empty_items_is_rejected_locally() {
    // Offline backend: if validation let this through, the proxy would 502.
    let app = create_offline_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/meals",
            json!({
                "user_id": 1,
                "type_id": 3,
                "description": "Lunch",
                "date_time": "2026-08-30T12:30:00Z",
                "items": []
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_login_with_malformed_email_is_rejected_locally() {
    let app = create_offline_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": "not-an-email", "password": "secret" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_without_token_is_rejected_locally() {
    let app = create_offline_app();

    let response = app
        .oneshot(json_request("POST", "/api/auth/refresh", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["details"], "refresh_token is required");
}

#[tokio::test]
async fn test_empty_refresh_token_is_rejected_locally() {
    let app = create_offline_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            json!({ "refresh_token": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_meal_id_is_rejected() {
    let app = create_offline_app();

    let response = app
        .oneshot(get_request("/api/meals/abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["details"], "Invalid meal id");
}

#[tokio::test]
async fn test_filter_by_date_requires_well_formed_date() {
    let app = create_offline_app();

    let missing = create_offline_app()
        .oneshot(get_request("/api/meals/filter-by-date"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let malformed = app
        .oneshot(get_request("/api/meals/filter-by-date?date=30-08-2026"))
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}

// ─── Forwarding ──────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_forwards_api_key_and_relays_tokens() {
    let seen_keys = Arc::new(Mutex::new(Vec::new()));
    let keys_c = seen_keys.clone();

    let stub = Router::new().route(
        "/api/users/refresh-token",
        post(move |request_headers: HeaderMap, Json(body): Json<Value>| {
            let seen_keys = keys_c.clone();
            async move {
                let key = request_headers
                    .get("x-api-key")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                seen_keys.lock().unwrap().push(key);
                assert_eq!(body["refresh_token"], "R1");
                Json(json!({
                    "tokens": {
                        "access_token": "A2",
                        "refresh_token": "R2",
                        "expires_in": 3600
                    }
                }))
            }
        }),
    );
    let backend_url = spawn_backend(stub).await;
    let app = create_test_app(&backend_url);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            json!({ "refresh_token": "R1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["tokens"]["access_token"], "A2");
    assert_eq!(body["tokens"]["refresh_token"], "R2");

    // The server-held key never comes from the client request
    let keys = seen_keys.lock().unwrap().clone();
    assert_eq!(keys, vec!["test_api_key"]);
}

#[tokio::test]
async fn test_backend_rejection_is_relayed_with_status_and_message() {
    let stub = Router::new().route(
        "/api/meals/{id}",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "meal not found" })),
            )
        }),
    );
    let backend_url = spawn_backend(stub).await;
    let app = create_test_app(&backend_url);

    let response = app.oneshot(get_request("/api/meals/42")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["details"], "meal not found");
}

#[tokio::test]
async fn test_unreachable_backend_maps_to_bad_gateway() {
    let app = create_offline_app();

    let response = app
        .oneshot(get_request("/api/meals/dashboard"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_update_meal_forwards_only_provided_fields() {
    let forwarded = Arc::new(Mutex::new(None));
    let forwarded_c = forwarded.clone();

    let stub = Router::new().route(
        "/api/meals/{id}",
        put(move |Json(body): Json<Value>| {
            let forwarded = forwarded_c.clone();
            async move {
                *forwarded.lock().unwrap() = Some(body);
                Json(json!({ "updated": true }))
            }
        }),
    );
    let backend_url = spawn_backend(stub).await;
    let app = create_test_app(&backend_url);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/meals/7",
            json!({ "user_id": 1, "description": "Late dinner" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = forwarded.lock().unwrap().clone().unwrap();
    assert_eq!(
        body,
        json!({ "user_id": 1, "description": "Late dinner" })
    );
}

// ─── Dashboard grouping ──────────────────────────────────────

#[tokio::test]
async fn test_dashboard_groups_rows_per_user() {
    let stub = Router::new().route(
        "/api/meals/dashboard",
        get(|| async {
            // Meal 10 has two item rows; it must count once.
            Json(json!({
                "message": "ok",
                "data": [
                    { "id": 10, "user_name": "Ana", "description": "Lunch",
                      "date_time": "2026-08-30T12:30:00Z", "meal_type": "Lunch",
                      "item_name": "Rice", "quantity": 150.0, "unit": "g" },
                    { "id": 10, "user_name": "Ana", "description": "Lunch",
                      "date_time": "2026-08-30T12:30:00Z", "meal_type": "Lunch",
                      "item_name": "Beans", "quantity": 100.0, "unit": "g" },
                    { "id": 11, "user_name": "Bruno", "description": "Breakfast",
                      "date_time": "2026-08-30T08:00:00Z", "meal_type": "Breakfast",
                      "item_name": "Oats", "quantity": 50.0, "unit": "g" }
                ]
            }))
        }),
    );
    let backend_url = spawn_backend(stub).await;
    let app = create_test_app(&backend_url);

    let response = app
        .oneshot(get_request("/api/meals/dashboard"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["total_meals"], 2);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    // First-seen order is preserved
    assert_eq!(users[0]["user_name"], "Ana");
    assert_eq!(users[0]["total"], 1);
    assert_eq!(users[0]["meals"].as_array().unwrap().len(), 2);
    assert_eq!(users[1]["user_name"], "Bruno");
    assert_eq!(users[1]["total"], 1);
}

// ─── Catalogs ────────────────────────────────────────────────

#[tokio::test]
async fn test_meal_types_are_served_without_a_backend() {
    let app = create_offline_app();

    let response = app.oneshot(get_request("/api/meals/types")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let types = body.as_array().unwrap();
    assert_eq!(types.len(), 7);
    assert_eq!(types[0], json!({ "id": 1, "name": "Breakfast" }));
}

#[tokio::test]
async fn test_units_are_unwrapped_from_backend_envelope() {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_c = hits.clone();

    let stub = Router::new().route(
        "/api/measurement-units",
        get(move || {
            let hits = hits_c.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({
                    "data": [
                        { "id": 1, "name": "gram", "abbreviation": "g" },
                        { "id": 2, "name": "milliliter", "abbreviation": "ml" }
                    ]
                }))
            }
        }),
    );
    let backend_url = spawn_backend(stub).await;
    let app = create_test_app(&backend_url);

    let response = app.oneshot(get_request("/api/meals/units")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // The `{ data }` envelope is gone
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["abbreviation"], "g");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// ─── Health and edge layers ──────────────────────────────────

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_offline_app();

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let app = create_offline_app();

    let response = app.oneshot(get_request("/health")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.contains_key("content-security-policy"));
    assert_eq!(headers.get("referrer-policy").unwrap(), "no-referrer");
}

#[tokio::test]
async fn test_cors_preflight_allows_local_frontend() {
    let app = create_offline_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/meals/dashboard")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_cors_preflight_rejects_foreign_origin() {
    let app = create_offline_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/meals/dashboard")
                .header(header::ORIGIN, "https://evil.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
