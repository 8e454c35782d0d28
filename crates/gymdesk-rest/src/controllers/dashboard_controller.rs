//! Dashboard controller.

use crate::{
    extractors::AuthenticatedUser,
    responses::{ok, ApiResult},
    state::AppState,
};
use axum::{extract::State, routing::get, Router};
use gymdesk_service::DashboardStats;

/// Creates the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard_stats))
}

/// Headline counts and revenue from completed payments (admin only).
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn dashboard_stats(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<DashboardStats> {
    let response = state.services.dashboard.stats(&user).await?;
    ok(response)
}
