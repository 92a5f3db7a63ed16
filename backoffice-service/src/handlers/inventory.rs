use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::Value;
use service_core::error::AppError;

use crate::dtos::inventory::{MovementRequest, MovementsQuery, StockQuery};
use crate::dtos::{ApiResponse, IdResponse};
use crate::middleware::ActingUser;
use crate::utils::validation::non_blank;
use crate::utils::{ApiQuery, ValidatedJson};
use crate::AppState;

/// Record a stock entry, exit, adjustment or purchase
#[utoipa::path(
    post,
    path = "/api/inventory/movements",
    request_body = MovementRequest,
    responses(
        (status = 201, description = "Movement registered", body = IdResponse),
        (status = 400, description = "Invalid data or refused by the database", body = ErrorResponse)
    ),
    tag = "Inventory"
)]
#[tracing::instrument(skip(state, req), fields(actor = %actor, product_id = req.product_id))]
pub async fn register_movement(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ValidatedJson(req): ValidatedJson<MovementRequest>,
) -> Result<impl IntoResponse, AppError> {
    let kind = req
        .movement_kind()
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Unknown movement kind")))?;
    let note = non_blank(req.note.as_deref());

    let (id, message) = state
        .db
        .register_movement(&actor, req.product_id, req.quantity, kind, note.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(IdResponse { id }).with_message(message),
    ))
}

#[utoipa::path(
    get,
    path = "/api/inventory/stock",
    params(StockQuery),
    responses((status = 200, description = "Stock levels")),
    tag = "Inventory"
)]
pub async fn stock(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StockQuery>,
) -> Result<ApiResponse<Vec<Value>>, AppError> {
    let rows = state
        .db
        .stock_levels(query.product_id, query.min_stock.unwrap_or(10))
        .await?;
    Ok(ApiResponse::ok(rows))
}

#[utoipa::path(
    get,
    path = "/api/inventory/movements",
    params(MovementsQuery),
    responses((status = 200, description = "Inventory movements")),
    tag = "Inventory"
)]
pub async fn movements(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MovementsQuery>,
) -> Result<ApiResponse<Vec<Value>>, AppError> {
    Ok(ApiResponse::ok(state.db.inventory_movements(&query).await?))
}
