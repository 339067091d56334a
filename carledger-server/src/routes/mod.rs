//! HTTP route handlers

mod cars;
mod events;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use carledger_core::AssetStore;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::AppState;

/// Success envelope: `{success: true, data, count?, message?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// List response with `count` filled in
    pub fn list(data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            count: Some(count),
            ..Self::ok(data)
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub store: String,
    pub cars: usize,
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = match state.store.health_check() {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            service: "CarLedger API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: carledger_core::transaction::iso8601(&chrono::Utc::now()),
            store: state.store.name().to_string(),
            cars: state.store.len(),
        }),
    )
}

async fn no_route() -> ApiError {
    ApiError::NoRoute
}

/// Create the router with all routes
pub fn create_router(state: Arc<AppState>, cors_enabled: bool) -> Router {
    let router = Router::new()
        .route("/api/health", get(health))
        .route("/api/cars", get(cars::list_cars).post(cars::create_car))
        .route(
            "/api/cars/:car_number",
            get(cars::get_car).put(cars::update_car),
        )
        .route("/api/cars/:car_number/owner", put(cars::change_owner))
        .route("/api/cars/:car_number/history", get(cars::car_history))
        .route("/api/cars/owner/:owner", get(cars::cars_by_owner))
        .route("/api/cars/make/:make", get(cars::cars_by_make))
        .route("/api/init", post(cars::init_ledger))
        .route("/api/events", get(events::list_events))
        .fallback(no_route)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
