//! Health check endpoints
//!
//! /health, /ready, and /metrics for orchestration and scraping.

use crate::metrics::BotMetrics;
use crate::session::SessionManager;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub gateway_connected: bool,
    pub session_phase: &'static str,
    pub roster_size: usize,
}

/// Application state for health endpoints
#[derive(Clone)]
pub struct AppState {
    pub session: SessionManager,
    pub metrics: BotMetrics,
    pub gateway_connected: Arc<AtomicBool>,
}

/// Create the health check router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Health endpoint - always returns 200 if process is running
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness endpoint - returns 200 once the gateway is connected
async fn ready_handler(State(state): State<AppState>) -> impl IntoResponse {
    let gateway_connected = state.gateway_connected.load(Ordering::SeqCst);
    let snapshot = state.session.snapshot().await;

    let response = ReadyResponse {
        ready: gateway_connected,
        gateway_connected,
        session_phase: snapshot.phase.label(),
        roster_size: snapshot.roster.len(),
    };

    if gateway_connected {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Metrics endpoint - returns Prometheus format metrics
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    state
        .metrics
        .set_gateway_connected(state.gateway_connected.load(Ordering::SeqCst));

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.2.0",
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
    }

    #[test]
    fn test_ready_response_serialization() {
        let response = ReadyResponse {
            ready: true,
            gateway_connected: true,
            session_phase: "open",
            roster_size: 4,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"ready\":true"));
        assert!(json.contains("\"roster_size\":4"));
    }
}
