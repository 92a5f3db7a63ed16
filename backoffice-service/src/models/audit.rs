use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogEntry {
    pub id: i64,
    pub occurred_at: NaiveDateTime,
    pub username: Option<String>,
    pub user_id: Option<i32>,
    /// `OK` or `FAIL`.
    pub status: String,
    /// `N/A` when the account has no role.
    pub role: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLogEntry {
    pub id: i64,
    pub occurred_at: NaiveDateTime,
    pub username: Option<String>,
    pub user_id: Option<i32>,
    pub operation: String,
    pub entity: Option<String>,
    pub entity_key: Option<String>,
    pub detail: Option<String>,
}
