use axum::extract::State;
use serde_json::Value;
use service_core::error::AppError;

use crate::dtos::reports::{
    InventoryReport, InventoryReportQuery, RevenueQuery, SalesReportQuery, TopProductsQuery,
};
use crate::dtos::ApiResponse;
use crate::utils::{ApiQuery, ValidatedQuery};
use crate::AppState;

/// Sales between two dates, optionally for one seller or category
#[utoipa::path(
    get,
    path = "/api/reports/sales",
    params(SalesReportQuery),
    responses(
        (status = 200, description = "Report rows"),
        (status = 400, description = "dateFrom and dateTo are required", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn sales_report(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SalesReportQuery>,
) -> Result<ApiResponse<Vec<Value>>, AppError> {
    let (Some(date_from), Some(date_to)) = (query.date_from, query.date_to) else {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "dateFrom and dateTo are required"
        )));
    };
    let rows = state
        .db
        .sales_report(date_from, date_to, query.user.as_deref(), query.category_id)
        .await?;
    Ok(ApiResponse::ok(rows))
}

/// Current stock and recent movements
#[utoipa::path(
    get,
    path = "/api/reports/inventory",
    params(InventoryReportQuery),
    responses((status = 200, description = "Inventory and movements", body = InventoryReport)),
    tag = "Reports"
)]
pub async fn inventory_report(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<InventoryReportQuery>,
) -> Result<ApiResponse<InventoryReport>, AppError> {
    Ok(ApiResponse::ok(state.db.inventory_report(&query).await?))
}

/// Best-selling products
#[utoipa::path(
    get,
    path = "/api/reports/top-products",
    params(TopProductsQuery),
    responses(
        (status = 200, description = "Report rows"),
        (status = 400, description = "topN out of range", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn top_products(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<TopProductsQuery>,
) -> Result<ApiResponse<Vec<Value>>, AppError> {
    let rows = state
        .db
        .top_products(query.top_n, query.date_from, query.date_to)
        .await?;
    Ok(ApiResponse::ok(rows))
}

/// Revenue for a year, or one month of it
#[utoipa::path(
    get,
    path = "/api/reports/revenue",
    params(RevenueQuery),
    responses(
        (status = 200, description = "Report rows"),
        (status = 400, description = "year or month out of range", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn revenue(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<RevenueQuery>,
) -> Result<ApiResponse<Vec<Value>>, AppError> {
    Ok(ApiResponse::ok(state.db.revenue(query.year, query.month).await?))
}
