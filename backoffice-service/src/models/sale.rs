use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummary {
    pub id: i64,
    pub username: String,
    pub sold_at: NaiveDateTime,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub total: Decimal,
    pub note: Option<String>,
    pub item_count: i64,
    pub unit_count: i64,
}
