use axum::{extract::State, http::StatusCode, response::IntoResponse};
use service_core::error::AppError;

use crate::dtos::sales::{SaleRequest, SalesListQuery};
use crate::dtos::{ApiResponse, IdResponse};
use crate::middleware::ActingUser;
use crate::models::SaleSummary;
use crate::services::{SaleDetail, SaleFilters};
use crate::utils::{ApiPath, ApiQuery, PageRequest, ValidatedJson};
use crate::AppState;

/// Register a sale and its lines
#[utoipa::path(
    post,
    path = "/api/sales",
    request_body = SaleRequest,
    responses(
        (status = 201, description = "Sale registered", body = IdResponse),
        (status = 400, description = "Invalid items or refused by the database", body = ErrorResponse)
    ),
    tag = "Sales"
)]
#[tracing::instrument(skip(state, req), fields(actor = %actor))]
pub async fn register_sale(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ValidatedJson(req): ValidatedJson<SaleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (id, message) = state.db.register_sale(&actor, &req).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(IdResponse { id }).with_message(message),
    ))
}

#[utoipa::path(
    get,
    path = "/api/sales",
    params(SalesListQuery),
    responses((status = 200, description = "A page of sales, newest first")),
    tag = "Sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SalesListQuery>,
) -> Result<ApiResponse<Vec<SaleSummary>>, AppError> {
    let filters = SaleFilters::from(&query);
    let page = PageRequest::clamp(query.page, query.page_size, 20, 100);
    let (sales, pagination) = state.db.list_sales(&filters, page).await?;
    Ok(ApiResponse::paginated(sales, pagination))
}

/// Header and lines of a sale
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    params(("id" = i64, Path, description = "Sale id")),
    responses(
        (status = 200, description = "The sale", body = SaleDetail),
        (status = 404, description = "Sale not found", body = ErrorResponse)
    ),
    tag = "Sales"
)]
pub async fn sale_detail(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<SaleDetail>, AppError> {
    Ok(ApiResponse::ok(state.db.sale_detail(id).await?))
}
