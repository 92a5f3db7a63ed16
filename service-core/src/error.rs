use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", describe_validation(.0))]
    ValidationError(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(anyhow::Error),

    /// A stored procedure refused the operation; the message is shown to the caller as-is.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    NotFound(anyhow::Error),

    #[error("{0}")]
    Unauthorized(anyhow::Error),

    #[error("{0}")]
    Forbidden(anyhow::Error),

    #[error("{0}")]
    Conflict(anyhow::Error),

    #[error("Too many requests: {0}")]
    TooManyRequests(String, Option<u64>),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Service Unavailable")]
    ServiceUnavailable,

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

/// Body of every failed response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) | AppError::Rejected(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests(_, _) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError(_) | AppError::DatabaseError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (message, retry_after) = match &self {
            AppError::TooManyRequests(msg, retry) => (msg.clone(), *retry),
            AppError::ServiceUnavailable => ("Service unavailable".to_string(), None),
            AppError::InternalError(_) | AppError::DatabaseError(_) | AppError::ConfigError(_) => {
                tracing::error!(error = ?self, "Request failed with an internal error");
                ("Internal server error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let mut res = (status, Json(ErrorResponse::new(message))).into_response();

        if let Some(retry) = retry_after {
            res.headers_mut()
                .insert(axum::http::header::RETRY_AFTER, retry.into());
        }

        res
    }
}

/// Flattens validator output into one sentence per failing field, nested lists included.
pub fn describe_validation(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages(errors, "", &mut messages);
    messages.dedup();
    if messages.is_empty() {
        return "Invalid request".to_string();
    }
    messages.join("; ")
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    match &err.message {
                        Some(msg) => out.push(msg.to_string()),
                        None => out.push(format!("{} is invalid", path)),
                    }
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::{Validate, ValidationError};

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(range(min = 0, message = "age must not be negative"))]
        age: i32,
    }

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn validation_messages_are_sorted_and_joined() {
        let sample = Sample {
            name: String::new(),
            age: -1,
        };
        let err = sample.validate().unwrap_err();
        assert_eq!(
            describe_validation(&err),
            "age must not be negative; name is required"
        );
    }

    #[test]
    fn validation_without_message_names_the_field() {
        let mut errors = ValidationErrors::new();
        errors.add("email", ValidationError::new("email"));
        assert_eq!(describe_validation(&errors), "email is invalid");
    }

    #[tokio::test]
    async fn rejected_passes_the_message_through() {
        let res = AppError::Rejected("El correo ya existe".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "El correo ya existe");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn database_errors_hide_details() {
        let res = AppError::DatabaseError(anyhow::anyhow!("connection refused on 10.0.0.4"))
            .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(res).await;
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn too_many_requests_sets_retry_after() {
        let res = AppError::TooManyRequests("slow down".to_string(), Some(30)).into_response();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(res.headers()[axum::http::header::RETRY_AFTER], "30");
    }

    #[test]
    fn status_codes_follow_the_error_tiers() {
        assert_eq!(
            AppError::NotFound(anyhow::anyhow!("x")).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden(anyhow::anyhow!("x")).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Conflict(anyhow::anyhow!("x")).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
