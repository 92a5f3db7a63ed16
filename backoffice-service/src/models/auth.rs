use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// First row of `seg.sp_validar_usuario`.
#[derive(Debug, Clone, FromRow)]
pub struct LoginRow {
    pub resultado: Option<String>,
    pub mensaje: Option<String>,
    pub id_usuario: Option<i32>,
    pub usuario: Option<String>,
    pub nombres: Option<String>,
    pub apellidos: Option<String>,
    pub rol: Option<String>,
    pub correo: Option<String>,
    pub es_password_temporal: Option<bool>,
}

impl LoginRow {
    pub fn is_ok(&self) -> bool {
        self.resultado
            .as_deref()
            .map(|r| r.trim().eq_ignore_ascii_case("OK"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: Option<i32>,
    pub username: String,
    pub first_names: Option<String>,
    pub last_names: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    /// The account must change its password before continuing.
    pub temporary_password: bool,
}

impl AuthenticatedUser {
    pub fn from_row(row: LoginRow, requested_username: &str) -> Self {
        Self {
            id: row.id_usuario,
            username: row
                .usuario
                .unwrap_or_else(|| requested_username.to_string()),
            first_names: row.nombres,
            last_names: row.apellidos,
            role: row.rol,
            email: row.correo,
            temporary_password: row.es_password_temporal.unwrap_or(false),
        }
    }
}
