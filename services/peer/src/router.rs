//! Axum Router Configuration

use crate::{state::AppState, ws::ws_handler};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Creates the router serving `/ws/chat/{session_id}`, open to any origin.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws/chat/{session_id}", get(ws_handler))
        .with_state(app_state)
        .layer(cors)
}
