use axum::{extract::State, http::StatusCode, response::IntoResponse};
use service_core::error::AppError;

use crate::dtos::catalog::{
    CreateProductRequest, DeletedProduct, PhysicalDeleteQuery, ProductListQuery,
    UpdateProductRequest,
};
use crate::dtos::ApiResponse;
use crate::middleware::ActingUser;
use crate::models::Product;
use crate::services::ProductFilters;
use crate::utils::validation::non_blank;
use crate::utils::{ApiPath, ApiQuery, PageRequest, ValidatedJson};
use crate::AppState;

/// Create a product with its stock and categories
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid data", body = ErrorResponse),
        (status = 409, description = "Product code already exists", body = ErrorResponse)
    ),
    tag = "Products"
)]
#[tracing::instrument(skip(state, req), fields(actor = %actor))]
pub async fn create_product(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ValidatedJson(req): ValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.db.create_product(&actor, &req).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(product).with_message("Product created"),
    ))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductListQuery),
    responses((status = 200, description = "A page of products")),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> Result<ApiResponse<Vec<Product>>, AppError> {
    let filters = ProductFilters {
        search: non_blank(query.search.as_deref()),
        active: query.active_filter(),
    };
    let page = PageRequest::clamp(query.page, query.limit, 10, 100);
    let (products, pagination) = state.db.list_products(&filters, page).await?;
    Ok(ApiResponse::paginated(products, pagination))
}

#[utoipa::path(
    get,
    path = "/api/products/{code}",
    params(("code" = String, Path, description = "Product code")),
    responses(
        (status = 200, description = "The product", body = Product),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> Result<ApiResponse<Product>, AppError> {
    Ok(ApiResponse::ok(state.db.get_product(&code).await?))
}

/// Change only the supplied fields
#[utoipa::path(
    put,
    path = "/api/products/{code}",
    request_body = UpdateProductRequest,
    params(("code" = String, Path, description = "Product code")),
    responses(
        (status = 200, description = "The refreshed product", body = Product),
        (status = 400, description = "Invalid data", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "Products"
)]
#[tracing::instrument(skip(state, req), fields(actor = %actor))]
pub async fn update_product(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ApiPath(code): ApiPath<String>,
    ValidatedJson(req): ValidatedJson<UpdateProductRequest>,
) -> Result<ApiResponse<Product>, AppError> {
    let product = state.db.update_product(&actor, &code, &req).await?;
    Ok(ApiResponse::ok(product).with_message("Product updated"))
}

#[utoipa::path(
    delete,
    path = "/api/products/{code}",
    params(("code" = String, Path, description = "Product code"), PhysicalDeleteQuery),
    responses(
        (status = 200, description = "Product deleted", body = DeletedProduct),
        (status = 400, description = "Refused by the database", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "Products"
)]
#[tracing::instrument(skip(state, query), fields(actor = %actor))]
pub async fn delete_product(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ApiPath(code): ApiPath<String>,
    ApiQuery(query): ApiQuery<PhysicalDeleteQuery>,
) -> Result<ApiResponse<DeletedProduct>, AppError> {
    let physical = query.is_physical();
    let message = state.db.delete_product(&actor, &code, physical).await?;
    Ok(ApiResponse::ok(DeletedProduct { physical }).with_message(message))
}
