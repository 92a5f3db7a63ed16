use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Carné assigned by the database.
    pub code: String,
    pub first_names: String,
    pub last_names: String,
    pub full_name: String,
    pub program: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub registered_at: Option<NaiveDateTime>,
}
