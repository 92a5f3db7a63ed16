use axum::{extract::State, http::StatusCode};
use service_core::error::AppError;

use crate::dtos::students::{CreatedStudent, StudentListQuery, StudentRequest};
use crate::dtos::ApiResponse;
use crate::middleware::RequiredActingUser;
use crate::models::Student;
use crate::utils::{ApiPath, ApiQuery, ValidatedJson};
use crate::AppState;

use super::encode_filters;

/// Register a student
#[utoipa::path(
    post,
    path = "/api/students",
    request_body = StudentRequest,
    params(("X-Acting-User" = String, Header, description = "Username performing the change")),
    responses(
        (status = 201, description = "Student registered", body = CreatedStudent),
        (status = 400, description = "Invalid data, duplicate email or phone, or refused by the database", body = ErrorResponse)
    ),
    tag = "Students"
)]
#[tracing::instrument(skip(state, req), fields(actor = %actor))]
pub async fn create_student(
    State(state): State<AppState>,
    RequiredActingUser(actor): RequiredActingUser,
    ValidatedJson(req): ValidatedJson<StudentRequest>,
) -> Result<(StatusCode, ApiResponse<CreatedStudent>), AppError> {
    let (student, message) = state.db.create_student(&actor, &req).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(student).with_message(message),
    ))
}

/// Search, sort and page through students
#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentListQuery),
    responses(
        (status = 200, description = "A page of students with pagination and effective filters"),
        (status = 400, description = "Malformed query string", body = ErrorResponse)
    ),
    tag = "Students"
)]
pub async fn list_students(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StudentListQuery>,
) -> Result<ApiResponse<Vec<Student>>, AppError> {
    let page = state.db.list_students(&query).await?;
    let filters = encode_filters(&page.filters)?;
    Ok(ApiResponse::paginated(page.students, page.pagination).with_filters(filters))
}

/// Distinct programs students are enrolled in
#[utoipa::path(
    get,
    path = "/api/students/programs",
    responses((status = 200, description = "Program names in ascending order")),
    tag = "Students"
)]
pub async fn list_programs(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<String>>, AppError> {
    Ok(ApiResponse::ok(state.db.list_programs().await?))
}

#[utoipa::path(
    get,
    path = "/api/students/{code}",
    params(("code" = String, Path, description = "Student code (carné)")),
    responses(
        (status = 200, description = "The student", body = Student),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students"
)]
pub async fn get_student(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> Result<ApiResponse<Student>, AppError> {
    Ok(ApiResponse::ok(state.db.get_student(&code).await?))
}

#[utoipa::path(
    put,
    path = "/api/students/{code}",
    request_body = StudentRequest,
    params(
        ("code" = String, Path, description = "Student code (carné)"),
        ("X-Acting-User" = String, Header, description = "Username performing the change")
    ),
    responses(
        (status = 200, description = "Student updated"),
        (status = 400, description = "Invalid data, duplicate email or phone, or refused by the database", body = ErrorResponse)
    ),
    tag = "Students"
)]
#[tracing::instrument(skip(state, req), fields(actor = %actor))]
pub async fn update_student(
    State(state): State<AppState>,
    RequiredActingUser(actor): RequiredActingUser,
    ApiPath(code): ApiPath<String>,
    ValidatedJson(req): ValidatedJson<StudentRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let message = state.db.update_student(&actor, &code, &req).await?;
    Ok(ApiResponse::<()>::message(message))
}

#[utoipa::path(
    delete,
    path = "/api/students/{code}",
    params(
        ("code" = String, Path, description = "Student code (carné)"),
        ("X-Acting-User" = String, Header, description = "Username performing the change")
    ),
    responses(
        (status = 200, description = "Student deleted"),
        (status = 400, description = "Refused by the database", body = ErrorResponse)
    ),
    tag = "Students"
)]
#[tracing::instrument(skip(state), fields(actor = %actor))]
pub async fn delete_student(
    State(state): State<AppState>,
    RequiredActingUser(actor): RequiredActingUser,
    ApiPath(code): ApiPath<String>,
) -> Result<ApiResponse<()>, AppError> {
    let message = state.db.delete_student(&actor, &code).await?;
    Ok(ApiResponse::<()>::message(message))
}
