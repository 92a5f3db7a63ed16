use axum::extract::State;
use service_core::error::AppError;

use crate::dtos::ApiResponse;
use crate::models::DashboardStats;
use crate::AppState;

/// Headline counts for the admin and secretary dashboards
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard counts", body = DashboardStats),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Dashboard"
)]
pub async fn stats(State(state): State<AppState>) -> Result<ApiResponse<DashboardStats>, AppError> {
    let stats = state.db.dashboard_stats().await?;
    Ok(ApiResponse::ok(stats))
}
