use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    /// `active` or `inactive`.
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    /// Latest successful access; `None` when the user never signed in.
    pub last_access: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub id: i32,
    pub username: String,
    pub first_names: String,
    pub last_names: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    pub last_access: Option<NaiveDateTime>,
    pub last_password_change: Option<NaiveDateTime>,
}
