pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    rate_limit::{ip_rate_limit_middleware, IpRateLimiter},
    security_headers::security_headers_middleware,
    tracing::{make_http_span, request_id_middleware, REQUEST_ID_HEADER},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::BackofficeConfig;
use crate::middleware::ACTING_USER_HEADER;
use crate::services::{CredentialNotifier, Database};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::auth::login,
        handlers::auth::forgot_password,
        handlers::auth::change_password,
        handlers::dashboard::stats,
        handlers::students::create_student,
        handlers::students::list_students,
        handlers::students::list_programs,
        handlers::students::get_student,
        handlers::students::update_student,
        handlers::students::delete_student,
        handlers::users::create_user,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::users::reset_password,
        handlers::users::disable_user,
        handlers::users::enable_user,
        handlers::audit::access_log,
        handlers::audit::transaction_log,
        handlers::categories::list_categories,
        handlers::categories::get_category,
        handlers::categories::create_category,
        handlers::categories::update_category,
        handlers::categories::delete_category,
        handlers::categories::category_products,
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::inventory::register_movement,
        handlers::inventory::stock,
        handlers::inventory::movements,
        handlers::sales::register_sale,
        handlers::sales::list_sales,
        handlers::sales::sale_detail,
        handlers::reports::sales_report,
        handlers::reports::inventory_report,
        handlers::reports::top_products,
        handlers::reports::revenue,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::IdResponse,
            dtos::auth::LoginRequest,
            dtos::auth::ForgotPasswordRequest,
            dtos::auth::ChangePasswordRequest,
            dtos::students::StudentRequest,
            dtos::students::CreatedStudent,
            dtos::users::CreateUserRequest,
            dtos::users::UpdateUserRequest,
            dtos::users::ResetPasswordRequest,
            dtos::users::CreatedUser,
            dtos::catalog::CategoryRequest,
            dtos::catalog::CreateProductRequest,
            dtos::catalog::UpdateProductRequest,
            dtos::catalog::DeletedProduct,
            dtos::inventory::MovementRequest,
            dtos::sales::SaleRequest,
            dtos::sales::SaleItemRequest,
            dtos::reports::InventoryReport,
            models::AuthenticatedUser,
            models::AdminStats,
            models::SecretaryStats,
            models::DashboardStats,
            models::Student,
            models::UserSummary,
            models::UserDetail,
            models::AccessLogEntry,
            models::TransactionLogEntry,
            models::Product,
            models::CategoryProduct,
            models::SaleSummary,
            services::SaleDetail,
        )
    ),
    tags(
        (name = "Authentication", description = "Sign-in and password recovery"),
        (name = "Dashboard", description = "Headline counts"),
        (name = "Students", description = "Student registry"),
        (name = "Users", description = "System user administration"),
        (name = "Audit", description = "Access and transaction logs"),
        (name = "Categories", description = "Product categories"),
        (name = "Products", description = "Product catalog"),
        (name = "Inventory", description = "Stock and movements"),
        (name = "Sales", description = "Point-of-sale records"),
        (name = "Reports", description = "Tabular reports"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: BackofficeConfig,
    pub db: Database,
    pub notifier: Arc<dyn CredentialNotifier>,
    pub login_rate_limiter: IpRateLimiter,
    pub password_reset_rate_limiter: IpRateLimiter,
    pub ip_rate_limiter: IpRateLimiter,
}

fn api_routes(state: &AppState) -> Router<AppState> {
    let login_route = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .layer(from_fn_with_state(
            state.login_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let forgot_password_route = Router::new()
        .route(
            "/api/auth/forgot-password",
            post(handlers::auth::forgot_password),
        )
        .layer(from_fn_with_state(
            state.password_reset_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    Router::new()
        .merge(login_route)
        .merge(forgot_password_route)
        .route(
            "/api/auth/change-password",
            post(handlers::auth::change_password),
        )
        .route("/api/dashboard/stats", get(handlers::dashboard::stats))
        // Students
        .route(
            "/api/students",
            get(handlers::students::list_students).post(handlers::students::create_student),
        )
        .route(
            "/api/students/programs",
            get(handlers::students::list_programs),
        )
        .route(
            "/api/students/:code",
            get(handlers::students::get_student)
                .put(handlers::students::update_student)
                .delete(handlers::students::delete_student),
        )
        // Users
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/users/:id",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route(
            "/api/users/:id/reset-password",
            post(handlers::users::reset_password),
        )
        .route("/api/users/:id/disable", post(handlers::users::disable_user))
        .route("/api/users/:id/enable", post(handlers::users::enable_user))
        // Audit
        .route("/api/audit/access", get(handlers::audit::access_log))
        .route(
            "/api/audit/transactions",
            get(handlers::audit::transaction_log),
        )
        // Catalog
        .route(
            "/api/categories",
            get(handlers::categories::list_categories)
                .post(handlers::categories::create_category),
        )
        .route(
            "/api/categories/:id",
            get(handlers::categories::get_category)
                .put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )
        .route(
            "/api/categories/:id/products",
            get(handlers::categories::category_products),
        )
        .route(
            "/api/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/api/products/:code",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        // Inventory and sales
        .route(
            "/api/inventory/movements",
            get(handlers::inventory::movements).post(handlers::inventory::register_movement),
        )
        .route("/api/inventory/stock", get(handlers::inventory::stock))
        .route(
            "/api/sales",
            get(handlers::sales::list_sales).post(handlers::sales::register_sale),
        )
        .route("/api/sales/:id", get(handlers::sales::sale_detail))
        // Reports
        .route("/api/reports/sales", get(handlers::reports::sales_report))
        .route(
            "/api/reports/inventory",
            get(handlers::reports::inventory_report),
        )
        .route(
            "/api/reports/top-products",
            get(handlers::reports::top_products),
        )
        .route("/api/reports/revenue", get(handlers::reports::revenue))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(ACTING_USER_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    let mut app = api_routes(&state)
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics));

    if state.config.swagger.enabled {
        app = app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        // Without the UI the document stays available for tooling
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );
    }

    if let Some(dir) = &state.config.static_dir {
        tracing::info!(static_dir = %dir, "Serving frontend files");
        app = app.fallback_service(ServeDir::new(dir));
    }

    let app = app
        .with_state(state.clone())
        .layer(from_fn_with_state(
            state.ip_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| make_http_span(request)),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config.security.allowed_origins));

    Ok(app)
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are reachable"),
        (status = 503, description = "Database is unreachable", body = ErrorResponse)
    ),
    tag = "Observability"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "PostgreSQL health check failed");
        AppError::ServiceUnavailable
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
    })))
}
