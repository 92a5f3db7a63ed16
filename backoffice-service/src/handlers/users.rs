use axum::{extract::State, http::StatusCode};
use service_core::error::AppError;

use crate::dtos::users::{CreateUserRequest, CreatedUser, ResetPasswordRequest, UpdateUserRequest};
use crate::dtos::ApiResponse;
use crate::middleware::RequiredActingUser;
use crate::models::{UserDetail, UserSummary};
use crate::utils::{ApiPath, ValidatedJson};
use crate::AppState;

/// Create a system user with a temporary password
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    params(("X-Acting-User" = String, Header, description = "Username performing the change")),
    responses(
        (status = 201, description = "User created", body = CreatedUser),
        (status = 400, description = "Invalid data or refused by the database", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[tracing::instrument(skip(state, req), fields(actor = %actor))]
pub async fn create_user(
    State(state): State<AppState>,
    RequiredActingUser(actor): RequiredActingUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, ApiResponse<CreatedUser>), AppError> {
    let (user, message) = state
        .db
        .create_user(&actor, &req, state.config.temp_password_ttl_hours)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(user).with_message(message)))
}

/// Every user, newest first
#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, description = "Users with their last successful access and a total")),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<UserSummary>>, AppError> {
    let users = state.db.list_users().await?;
    let total = users.len() as i64;
    Ok(ApiResponse::ok(users).with_total(total))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserDetail),
        (status = 400, description = "Non-numeric id", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<UserDetail>, AppError> {
    Ok(ApiResponse::ok(state.db.get_user(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    request_body = UpdateUserRequest,
    params(
        ("id" = i32, Path, description = "User id"),
        ("X-Acting-User" = String, Header, description = "Username performing the change")
    ),
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Invalid data or email already in use", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[tracing::instrument(skip(state, req), fields(actor = %actor))]
pub async fn update_user(
    State(state): State<AppState>,
    RequiredActingUser(actor): RequiredActingUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<ApiResponse<()>, AppError> {
    state.db.update_user(&actor, id, &req).await?;
    Ok(ApiResponse::<()>::message("User updated"))
}

/// Permanently delete a user; only active administrators may do this
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = i32, Path, description = "User id"),
        ("X-Acting-User" = String, Header, description = "Administrator performing the deletion")
    ),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Acting user is not an active administrator", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[tracing::instrument(skip(state), fields(actor = %actor))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequiredActingUser(actor): RequiredActingUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<()>, AppError> {
    state.db.delete_user(&actor, id).await?;
    Ok(ApiResponse::<()>::message("User deleted"))
}

/// Set an administrator-chosen temporary password
#[utoipa::path(
    post,
    path = "/api/users/{id}/reset-password",
    request_body = ResetPasswordRequest,
    params(
        ("id" = i32, Path, description = "User id"),
        ("X-Acting-User" = String, Header, description = "Username performing the change")
    ),
    responses(
        (status = 200, description = "Temporary password set"),
        (status = 400, description = "Missing password", body = ErrorResponse),
        (status = 404, description = "User not found or inactive", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[tracing::instrument(skip(state, req), fields(actor = %actor))]
pub async fn reset_password(
    State(state): State<AppState>,
    RequiredActingUser(actor): RequiredActingUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<ApiResponse<()>, AppError> {
    state
        .db
        .reset_user_password(&actor, id, &req.new_password, state.config.temp_password_ttl_hours)
        .await?;
    Ok(ApiResponse::<()>::message(
        "Temporary password set; the user must change it at next login",
    ))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/disable",
    params(
        ("id" = i32, Path, description = "User id"),
        ("X-Acting-User" = String, Header, description = "Username performing the change")
    ),
    responses(
        (status = 200, description = "User disabled"),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[tracing::instrument(skip(state), fields(actor = %actor))]
pub async fn disable_user(
    State(state): State<AppState>,
    RequiredActingUser(actor): RequiredActingUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<()>, AppError> {
    state.db.set_user_active(&actor, id, false).await?;
    Ok(ApiResponse::<()>::message("User disabled"))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/enable",
    params(
        ("id" = i32, Path, description = "User id"),
        ("X-Acting-User" = String, Header, description = "Username performing the change")
    ),
    responses(
        (status = 200, description = "User enabled"),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[tracing::instrument(skip(state), fields(actor = %actor))]
pub async fn enable_user(
    State(state): State<AppState>,
    RequiredActingUser(actor): RequiredActingUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<()>, AppError> {
    state.db.set_user_active(&actor, id, true).await?;
    Ok(ApiResponse::<()>::message("User enabled"))
}
