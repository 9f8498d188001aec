//! Dashboard counters route.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use crate::routes::auth::AuthUser;
use crate::services::stats;
use crate::state::AppState;
use crate::types::DashboardStats;

/// `GET /dashboard/stats`: counters for the caller's dashboard.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardStats>, StatusCode> {
    let stats = stats::dashboard_stats(state.store.as_ref(), &auth.user)
        .await
        .map_err(|e| {
            tracing::error!(user_id = auth.user.id, error = %e, "dashboard stats failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(stats))
}
