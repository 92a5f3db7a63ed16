use service_core::error::AppError;
use sqlx::{Postgres, Transaction};
use tracing::{info, instrument};

use crate::dtos::users::{CreateUserRequest, CreatedUser, UpdateUserRequest};
use crate::models::{UserDetail, UserSummary};
use crate::services::database::{commit, record_transaction, AuditEntry};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::procedure::{ProcedureCall, SuccessRule};
use crate::services::Database;
use crate::utils::codes::username_for;

const USER_ENTITY: &str = "tb_usuario";

const USER_COLUMNS: &str = r#"
    SELECT u.id_usuario AS id,
           u.usuario AS username,
           COALESCE(u.nombres, '') AS first_names,
           COALESCE(u.apellidos, '') AS last_names,
           TRIM(COALESCE(u.nombres, '') || ' ' || COALESCE(u.apellidos, '')) AS full_name,
           u.correo AS email,
           u.rol AS role,
           CASE WHEN u.estado THEN 'active' ELSE 'inactive' END AS status,
           u.fecha_creacion AS created_at,
           (SELECT MAX(ba.fecha_hora)
              FROM seg.tb_bitacora_acceso ba
             WHERE ba.id_usuario = u.id_usuario AND ba.resultado = 'OK') AS last_access,
           u.ultimo_cambio_pass AS last_password_change
    FROM seg.tb_usuario u"#;

fn user_key(id: i32) -> String {
    format!("IdUsuario={}", id)
}

/// Username of user `id` inside `tx`, optionally requiring the account to be active.
async fn username_of(
    tx: &mut Transaction<'static, Postgres>,
    id: i32,
    active_only: bool,
) -> Result<Option<String>, AppError> {
    sqlx::query_scalar::<_, String>(
        "SELECT usuario FROM seg.tb_usuario WHERE id_usuario = $1 AND (estado = true OR NOT $2)",
    )
    .bind(id)
    .bind(active_only)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to look up user: {}", e)))
}

impl Database {
    /// Registers the account through `seg.sp_registrar_usuario` and marks its password as
    /// temporary, in one transaction.
    #[instrument(skip(self, req), fields(role = %req.role))]
    pub async fn create_user(
        &self,
        actor: &str,
        req: &CreateUserRequest,
        temp_password_ttl_hours: i64,
    ) -> Result<(CreatedUser, String), AppError> {
        let username = username_for(&req.first_names, &req.last_name);
        let role = req.role.trim().to_lowercase();
        let first_names = req.first_names.trim();
        let last_names = req.last_name.trim();
        let email = req.email.trim();

        let mut tx = self.begin().await?;

        let accepted = ProcedureCall::new("seg.sp_registrar_usuario")
            .arg(username.as_str())
            .arg(first_names)
            .arg(last_names)
            .arg(email)
            .arg(role.as_str())
            .arg(req.password.as_str())
            .arg(req.password.as_str())
            .outcome(&mut *tx)
            .await?
            .into_result(SuccessRule::Zero, "Could not create the user")?;

        sqlx::query(
            r#"
            UPDATE seg.tb_usuario
            SET es_password_temporal = true,
                fecha_expira_password = NOW() + $2 * INTERVAL '1 hour'
            WHERE usuario = $1
            "#,
        )
        .bind(&username)
        .bind(temp_password_ttl_hours as f64)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to flag temporary password: {}", e))
        })?;

        commit(tx).await?;
        info!(username = %username, created_by = actor, "User created");

        let message = accepted.message_or("User created");
        Ok((
            CreatedUser {
                username,
                first_names: first_names.to_string(),
                last_names: last_names.to_string(),
                email: email.to_string(),
                role,
                temporary_password: true,
            },
            message,
        ))
    }

    /// Every account, newest first.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserSummary>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_users"])
            .start_timer();

        let users = sqlx::query_as::<_, UserSummary>(&format!(
            "{} ORDER BY u.fecha_creacion DESC",
            USER_COLUMNS
        ))
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list users: {}", e)))?;

        timer.observe_duration();

        Ok(users)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i32) -> Result<UserDetail, AppError> {
        sqlx::query_as::<_, UserDetail>(&format!("{} WHERE u.id_usuario = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get user: {}", e)))?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))
    }

    #[instrument(skip(self, req))]
    pub async fn update_user(
        &self,
        actor: &str,
        id: i32,
        req: &UpdateUserRequest,
    ) -> Result<(), AppError> {
        let mut tx = self.begin().await?;

        let username = username_of(&mut tx, id, false)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

        let email = req.email.trim();
        let email_taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM seg.tb_usuario WHERE correo = $1 AND id_usuario <> $2)",
        )
        .bind(email)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to check email: {}", e)))?;

        if email_taken {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Email already used by another user"
            )));
        }

        sqlx::query(
            r#"
            UPDATE seg.tb_usuario
            SET nombres = $1, apellidos = $2, correo = $3, rol = $4, estado = $5
            WHERE id_usuario = $6
            "#,
        )
        .bind(req.first_names.trim())
        .bind(req.last_name.trim())
        .bind(email)
        .bind(req.role.trim().to_lowercase())
        .bind(req.is_active())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update user: {}", e)))?;

        record_transaction(
            &mut *tx,
            AuditEntry {
                actor,
                operation: "UPDATE_USER",
                entity: USER_ENTITY,
                entity_key: user_key(id),
                detail: format!("User updated ({})", username),
            },
        )
        .await?;

        commit(tx).await
    }

    /// Hard delete; only an active administrator may do it.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, actor: &str, id: i32) -> Result<(), AppError> {
        let mut tx = self.begin().await?;

        let actor_is_admin: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM seg.tb_usuario
                WHERE usuario = $1 AND LOWER(rol) = 'admin' AND estado = true
            )
            "#,
        )
        .bind(actor)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to check executor: {}", e)))?;

        if !actor_is_admin {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Only an active administrator can delete users"
            )));
        }

        let username = username_of(&mut tx, id, false)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

        sqlx::query("DELETE FROM seg.tb_usuario WHERE id_usuario = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete user: {}", e)))?;

        record_transaction(
            &mut *tx,
            AuditEntry {
                actor,
                operation: "DELETE_USER",
                entity: USER_ENTITY,
                entity_key: user_key(id),
                detail: format!("User deleted ({})", username),
            },
        )
        .await?;

        commit(tx).await?;
        info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Sets an administrator-chosen temporary password with a fresh salt.
    #[instrument(skip(self, new_password))]
    pub async fn reset_user_password(
        &self,
        actor: &str,
        id: i32,
        new_password: &str,
        temp_password_ttl_hours: i64,
    ) -> Result<(), AppError> {
        let mut tx = self.begin().await?;

        let username = username_of(&mut tx, id, true)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found or inactive")))?;

        let salt: [u8; 16] = rand::random();

        sqlx::query(
            r#"
            UPDATE seg.tb_usuario
            SET hash_password = seg.fn_hash_with_salt($1, $2),
                salt = $2,
                ultimo_cambio_pass = NOW(),
                es_password_temporal = true,
                fecha_expira_password = NOW() + $3 * INTERVAL '1 hour'
            WHERE id_usuario = $4
            "#,
        )
        .bind(new_password)
        .bind(salt.to_vec())
        .bind(temp_password_ttl_hours as f64)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to reset password: {}", e)))?;

        record_transaction(
            &mut *tx,
            AuditEntry {
                actor,
                operation: "RESET_PASSWORD_TEMPORAL",
                entity: USER_ENTITY,
                entity_key: user_key(id),
                detail: format!("Temporary password set ({})", username),
            },
        )
        .await?;

        commit(tx).await
    }

    #[instrument(skip(self))]
    pub async fn set_user_active(&self, actor: &str, id: i32, active: bool) -> Result<(), AppError> {
        let mut tx = self.begin().await?;

        let username = sqlx::query_scalar::<_, String>(
            "UPDATE seg.tb_usuario SET estado = $1 WHERE id_usuario = $2 RETURNING usuario",
        )
        .bind(active)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to change user status: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

        let (operation, verb) = if active {
            ("ENABLE_USER", "enabled")
        } else {
            ("DISABLE_USER", "disabled")
        };

        record_transaction(
            &mut *tx,
            AuditEntry {
                actor,
                operation,
                entity: USER_ENTITY,
                entity_key: user_key(id),
                detail: format!("User {} ({})", verb, username),
            },
        )
        .await?;

        commit(tx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_key_names_the_user_id() {
        assert_eq!(user_key(17), "IdUsuario=17");
    }

    #[test]
    fn user_columns_alias_every_detail_field() {
        for alias in [
            "AS id,",
            "AS username,",
            "AS first_names,",
            "AS last_names,",
            "AS full_name,",
            "AS email,",
            "AS role,",
            "AS status,",
            "AS created_at,",
            "AS last_access,",
            "AS last_password_change",
        ] {
            assert!(USER_COLUMNS.contains(alias), "missing {}", alias);
        }
    }
}
