use service_core::error::AppError;
use tracing::{info, instrument, warn};

use crate::dtos::auth::ChangePasswordRequest;
use crate::models::{AuthenticatedUser, LoginRow};
use crate::services::metrics::{DB_QUERY_DURATION, PROCEDURE_CALLS_TOTAL};
use crate::services::procedure::{
    is_undefined_function, ProcedureCall, ProcedureOutcome, SuccessRule,
};
use crate::services::Database;

const CHANGE_PASSWORD: &str = "seg.sp_actualizar_contrasena";
const CHANGE_TEMPORARY_PASSWORD: &str = "seg.sp_cambiar_password_temporal";

/// A successful sign-in.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: AuthenticatedUser,
    pub message: Option<String>,
}

/// A freshly issued temporary password and the name to greet its owner with.
#[derive(Clone)]
pub struct TemporaryCredential {
    pub full_name: String,
    pub password: String,
}

impl std::fmt::Debug for TemporaryCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryCredential")
            .field("full_name", &self.full_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn password_change_call<'a>(
    procedure: &'static str,
    req: &'a ChangePasswordRequest,
) -> ProcedureCall<'a> {
    ProcedureCall::new(procedure)
        .arg(req.username.trim())
        .arg(req.current_password.as_str())
        .arg(req.new_password.as_str())
        .arg(req.confirm_password.as_str())
}

impl Database {
    /// Checks credentials with `seg.sp_validar_usuario`. Any answer other than `OK` is a
    /// generic 401; the procedure's reason only reaches the log.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["seg.sp_validar_usuario"])
            .start_timer();

        let row = sqlx::query_as::<_, LoginRow>(
            r#"
            SELECT resultado, mensaje, id_usuario, usuario, nombres, apellidos, rol, correo,
                   es_password_temporal
            FROM seg.sp_validar_usuario($1, $2)
            "#,
        )
        .bind(username)
        .bind(password)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            PROCEDURE_CALLS_TOTAL
                .with_label_values(&["seg.sp_validar_usuario", "error"])
                .inc();
            AppError::DatabaseError(anyhow::anyhow!("Failed to validate user: {}", e))
        })?;

        timer.observe_duration();

        match row {
            Some(row) if row.is_ok() => {
                PROCEDURE_CALLS_TOTAL
                    .with_label_values(&["seg.sp_validar_usuario", "ok"])
                    .inc();
                let message = row.mensaje.clone();
                let user = AuthenticatedUser::from_row(row, username);
                info!(user_id = ?user.id, "Login succeeded");
                Ok(LoginOutcome { user, message })
            }
            other => {
                PROCEDURE_CALLS_TOTAL
                    .with_label_values(&["seg.sp_validar_usuario", "rejected"])
                    .inc();
                let reason = other.as_ref().and_then(|r| r.mensaje.as_deref());
                warn!(reason, "Login rejected");
                Err(AppError::Unauthorized(anyhow::anyhow!(
                    "Invalid username or password"
                )))
            }
        }
    }

    /// Asks the database for a temporary password. `None` when the procedure refuses, which
    /// includes unknown addresses.
    #[instrument(skip(self))]
    pub async fn issue_temporary_password(
        &self,
        email: &str,
    ) -> Result<Option<TemporaryCredential>, AppError> {
        let outcome = ProcedureCall::new("seg.sp_generar_password_temporal")
            .arg(email)
            .outcome(self.pool())
            .await?;

        let accepted = match outcome.into_result(SuccessRule::Zero, "") {
            Ok(accepted) => accepted,
            Err(_) => return Ok(None),
        };

        let Some(password) = accepted.text("passwordTemporal") else {
            warn!("Temporary password procedure succeeded without a password");
            return Ok(None);
        };

        let full_name = sqlx::query_scalar::<_, String>(
            r#"
            SELECT TRIM(COALESCE(nombres, '') || ' ' || COALESCE(apellidos, ''))
            FROM seg.tb_usuario
            WHERE correo = $1 AND estado = true
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to look up user name: {}", e)))?
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Usuario".to_string());

        Ok(Some(TemporaryCredential {
            full_name,
            password,
        }))
    }

    /// Runs the password-change procedure, falling back to the older procedure name on
    /// databases that do not have the new one.
    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn change_password(&self, req: &ChangePasswordRequest) -> Result<String, AppError> {
        let (procedure, rows) = match password_change_call(CHANGE_PASSWORD, req)
            .try_rows(self.pool())
            .await
        {
            Ok(rows) => (CHANGE_PASSWORD, rows),
            Err(e) if is_undefined_function(&e) => {
                warn!(
                    missing = CHANGE_PASSWORD,
                    fallback = CHANGE_TEMPORARY_PASSWORD,
                    "Password procedure not found, retrying with fallback"
                );
                let rows = password_change_call(CHANGE_TEMPORARY_PASSWORD, req)
                    .try_rows(self.pool())
                    .await
                    .map_err(|e| {
                        AppError::DatabaseError(anyhow::anyhow!(
                            "Failed to call {}: {}",
                            CHANGE_TEMPORARY_PASSWORD,
                            e
                        ))
                    })?;
                (CHANGE_TEMPORARY_PASSWORD, rows)
            }
            Err(e) => {
                return Err(AppError::DatabaseError(anyhow::anyhow!(
                    "Failed to call {}: {}",
                    CHANGE_PASSWORD,
                    e
                )))
            }
        };

        let accepted = ProcedureOutcome::from_rows(procedure, &rows)?
            .into_result(SuccessRule::Zero, "Could not change the password")?;

        Ok(accepted.message_or("Password updated"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_change_binds_four_arguments() {
        let req = ChangePasswordRequest {
            username: " ana ".into(),
            current_password: "old".into(),
            new_password: "new".into(),
            confirm_password: "new".into(),
        };
        let mut call = password_change_call(CHANGE_TEMPORARY_PASSWORD, &req);
        assert_eq!(
            call.sql(),
            "SELECT * FROM seg.sp_cambiar_password_temporal($1, $2, $3, $4)"
        );
    }

    #[test]
    fn temporary_credential_debug_hides_the_password() {
        let credential = TemporaryCredential {
            full_name: "Ana Ruiz".into(),
            password: "Xy7!secret".into(),
        };
        let shown = format!("{:?}", credential);
        assert!(shown.contains("Ana Ruiz"));
        assert!(!shown.contains("Xy7!secret"));
    }
}
