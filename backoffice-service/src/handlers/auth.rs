use axum::extract::State;
use service_core::error::AppError;

use crate::dtos::auth::{ChangePasswordRequest, ForgotPasswordRequest, LoginRequest};
use crate::dtos::ApiResponse;
use crate::models::AuthenticatedUser;
use crate::services::{CredentialNotifier, TemporaryCredential};
use crate::utils::ValidatedJson;
use crate::AppState;

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If the email is registered, a temporary password has been sent. Check your inbox.";

/// Sign in with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted; data holds the user profile"),
        (status = 400, description = "Missing username or password", body = ErrorResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<AuthenticatedUser>, AppError> {
    let outcome = state
        .db
        .authenticate(req.username.trim(), &req.password)
        .await?;

    let response = ApiResponse::ok(outcome.user);
    Ok(match outcome.message {
        Some(message) => response.with_message(message),
        None => response.with_message("Login successful"),
    })
}

/// Sends an issued credential to `email`. `Ok(false)` when nothing was issued.
async fn dispatch_credential(
    notifier: &dyn CredentialNotifier,
    email: &str,
    issued: Result<Option<TemporaryCredential>, AppError>,
) -> Result<bool, AppError> {
    let Some(credential) = issued? else {
        return Ok(false);
    };
    notifier
        .send_temporary_password(email, &credential.full_name, &credential.password)
        .await?;
    Ok(true)
}

/// Issue a temporary password and send it to the account's email
///
/// The answer is the same whether or not the address belongs to an account.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Request accepted"),
        (status = 400, description = "Missing email", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[tracing::instrument(skip(state, req))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let email = req.email.trim();

    let issued = state.db.issue_temporary_password(email).await;
    match dispatch_credential(state.notifier.as_ref(), email, issued).await {
        Ok(true) => tracing::info!("Temporary password sent"),
        Ok(false) => tracing::info!("No temporary password issued"),
        Err(e) => tracing::error!(error = %e, "Password recovery failed"),
    }

    Ok(ApiResponse::<()>::message(FORGOT_PASSWORD_MESSAGE))
}

/// Change a password using the current one
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Missing fields or rejected by the database", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn change_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let message = state.db.change_password(&req).await?;
    Ok(ApiResponse::<()>::message(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockNotifier;

    fn credential() -> TemporaryCredential {
        TemporaryCredential {
            full_name: "Ana Ruiz".into(),
            password: "Tmp#4821".into(),
        }
    }

    #[tokio::test]
    async fn issued_credential_is_sent_once_to_the_address() {
        let notifier = MockNotifier::new();
        let sent = dispatch_credential(&notifier, "ana@example.com", Ok(Some(credential())))
            .await
            .unwrap();

        assert!(sent);
        let deliveries = notifier.sent.lock().unwrap().clone();
        assert_eq!(
            deliveries,
            vec![(
                "ana@example.com".to_string(),
                "Ana Ruiz".to_string(),
                "Tmp#4821".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn nothing_is_sent_when_no_credential_was_issued() {
        let notifier = MockNotifier::new();
        let sent = dispatch_credential(&notifier, "nadie@example.com", Ok(None))
            .await
            .unwrap();
        assert!(!sent);
        assert!(notifier.sent_to().is_empty());
    }

    #[tokio::test]
    async fn lookup_failures_skip_delivery() {
        let notifier = MockNotifier::new();
        let result = dispatch_credential(
            &notifier,
            "ana@example.com",
            Err(AppError::DatabaseError(anyhow::anyhow!("pool timed out"))),
        )
        .await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert!(notifier.sent_to().is_empty());
    }

    #[tokio::test]
    async fn delivery_failures_surface_as_unavailable() {
        let notifier = MockNotifier::failing();
        let result = dispatch_credential(&notifier, "ana@example.com", Ok(Some(credential()))).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable)));
    }
}
