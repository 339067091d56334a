//! Event routes

use std::sync::Arc;

use axum::{extract::State, response::Json};
use carledger_core::EmittedEvent;

use super::ApiResponse;
use crate::AppState;

/// Events emitted since the server started, oldest first
pub async fn list_events(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<EmittedEvent>>> {
    Json(ApiResponse::list(state.events.events()))
}
