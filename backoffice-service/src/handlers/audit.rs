//! Read-only views over the access and transaction logs.

use axum::extract::State;
use service_core::error::AppError;

use crate::dtos::audit::{AccessLogQuery, TransactionLogQuery};
use crate::dtos::ApiResponse;
use crate::models::{AccessLogEntry, TransactionLogEntry};
use crate::utils::{ApiQuery, PageRequest};
use crate::AppState;

use super::encode_filters;

/// Sign-in attempts, newest first
#[utoipa::path(
    get,
    path = "/api/audit/access",
    params(AccessLogQuery),
    responses(
        (status = 200, description = "A page of access-log rows"),
        (status = 400, description = "Malformed query string", body = ErrorResponse)
    ),
    tag = "Audit"
)]
pub async fn access_log(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AccessLogQuery>,
) -> Result<ApiResponse<Vec<AccessLogEntry>>, AppError> {
    let filters = query.filters();
    let page = PageRequest::clamp(query.page, query.limit, 10, 100);
    let (entries, pagination) = state.db.list_access_log(&filters, page).await?;
    Ok(ApiResponse::paginated(entries, pagination).with_filters(encode_filters(&filters)?))
}

/// Administrative changes, newest first
#[utoipa::path(
    get,
    path = "/api/audit/transactions",
    params(TransactionLogQuery),
    responses(
        (status = 200, description = "A page of transaction-log rows"),
        (status = 400, description = "Malformed query string", body = ErrorResponse)
    ),
    tag = "Audit"
)]
pub async fn transaction_log(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TransactionLogQuery>,
) -> Result<ApiResponse<Vec<TransactionLogEntry>>, AppError> {
    let filters = query.filters();
    let page = PageRequest::clamp(query.page, query.limit, 10, 100);
    let (entries, pagination) = state.db.list_transaction_log(&filters, page).await?;
    Ok(ApiResponse::paginated(entries, pagination).with_filters(encode_filters(&filters)?))
}
