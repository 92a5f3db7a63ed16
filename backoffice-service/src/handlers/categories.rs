use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::Value;
use service_core::error::AppError;

use crate::dtos::catalog::{CategoryListQuery, CategoryRequest, PageQuery, PhysicalDeleteQuery};
use crate::dtos::{ApiResponse, IdResponse};
use crate::middleware::ActingUser;
use crate::models::CategoryProduct;
use crate::utils::{ApiPath, ApiQuery, PageRequest, ValidatedJson};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/categories",
    params(CategoryListQuery),
    responses((status = 200, description = "Categories")),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CategoryListQuery>,
) -> Result<ApiResponse<Vec<Value>>, AppError> {
    let categories = state
        .db
        .list_categories(query.active_only.unwrap_or(true))
        .await?;
    Ok(ApiResponse::ok(categories))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "The category"),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<Value>, AppError> {
    Ok(ApiResponse::ok(state.db.get_category(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = IdResponse),
        (status = 400, description = "Missing name or refused by the database", body = ErrorResponse)
    ),
    tag = "Categories"
)]
#[tracing::instrument(skip(state, req), fields(actor = %actor))]
pub async fn create_category(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ValidatedJson(req): ValidatedJson<CategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let description = req.trimmed_description();
    let (id, message) = state
        .db
        .create_category(&actor, req.name.trim(), description.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(IdResponse { id }).with_message(message),
    ))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    request_body = CategoryRequest,
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category updated"),
        (status = 400, description = "Missing name or refused by the database", body = ErrorResponse)
    ),
    tag = "Categories"
)]
#[tracing::instrument(skip(state, req), fields(actor = %actor))]
pub async fn update_category(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(req): ValidatedJson<CategoryRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let description = req.trimmed_description();
    let message = state
        .db
        .update_category(
            &actor,
            id,
            req.name.trim(),
            description.as_deref(),
            req.active.unwrap_or(true),
        )
        .await?;
    Ok(ApiResponse::<()>::message(message))
}

/// Deactivate a category, or remove it with `physical=true`
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id"), PhysicalDeleteQuery),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 400, description = "Refused by the database", body = ErrorResponse)
    ),
    tag = "Categories"
)]
#[tracing::instrument(skip(state, query), fields(actor = %actor))]
pub async fn delete_category(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PhysicalDeleteQuery>,
) -> Result<ApiResponse<()>, AppError> {
    let message = state
        .db
        .delete_category(&actor, id, query.is_physical())
        .await?;
    Ok(ApiResponse::<()>::message(message))
}

/// Active products in a category, by name
#[utoipa::path(
    get,
    path = "/api/categories/{id}/products",
    params(("id" = i32, Path, description = "Category id"), PageQuery),
    responses((status = 200, description = "A page of products")),
    tag = "Categories"
)]
pub async fn category_products(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<ApiResponse<Vec<CategoryProduct>>, AppError> {
    let page = PageRequest::clamp(query.page, query.limit, 100, 100);
    let (products, pagination) = state.db.category_products(id, page).await?;
    Ok(ApiResponse::paginated(products, pagination))
}
