//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Only the endpoints the interactive client calls live here. Page
//! rendering, login, and admin screens are served by the rest of the help
//! desk and are not part of this router.

pub mod auth;
pub mod dashboard;
pub mod tickets;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the router for the vote and stats endpoints.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/tickets/{id}/vote", post(tickets::vote_ticket))
        .route("/dashboard/stats", get(dashboard::dashboard_stats))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
