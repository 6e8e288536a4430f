//! Pass-through HTTP proxy in front of the upstream nutrition API.
//!
//! Holds the API credential server-side so clients only ever send the query.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::api_connection::endpoints::{
    ProxyErrorBody, API_KEY_HEADER, FETCH_NUTRITION_PATH, NUTRITION_PATH,
};

#[derive(Clone)]
pub struct ProxyState {
    pub http: Client,
    pub upstream_url: String,
    pub api_key: Option<String>,
}

impl ProxyState {
    pub fn new(upstream_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            upstream_url: upstream_url.into(),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NutritionParams {
    pub query: Option<String>,
}

pub fn build_proxy(state: ProxyState) -> Router {
    if state.api_key.is_none() {
        tracing::warn!("no upstream API key configured; lookups will fail with 500");
    }
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(NUTRITION_PATH, get(nutrition_handler))
        .route(FETCH_NUTRITION_PATH, get(nutrition_handler))
        .with_state(state)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ProxyErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

pub async fn nutrition_handler(
    State(state): State<ProxyState>,
    Query(params): Query<NutritionParams>,
) -> Response {
    // Whitespace-only queries are forwarded as-is; only an absent or empty one is rejected.
    let query = match params.query {
        Some(q) if !q.is_empty() => q,
        _ => return error_response(StatusCode::BAD_REQUEST, "Missing food query"),
    };
    let Some(api_key) = state.api_key.as_deref() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Nutrition API key is not configured",
        );
    };

    let upstream = state
        .http
        .get(&state.upstream_url)
        .query(&[("query", query.as_str())])
        .header(API_KEY_HEADER, api_key)
        .send()
        .await;

    let response = match upstream {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, query = %query, "upstream request failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch nutrition data");
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), query = %query, "upstream returned an error status");
        let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return error_response(status, "API request failed");
    }

    match response.json::<Value>().await {
        Ok(body) => {
            tracing::info!(query = %query, "proxied nutrition lookup");
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, query = %query, "upstream body was not JSON");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch nutrition data")
        }
    }
}
