use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_students: i64,
    pub new_this_month: i64,
    pub active_users: i64,
    pub accesses_today: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretaryStats {
    pub total_students: i64,
    pub new_this_month: i64,
    pub active_students: i64,
    pub registered_today: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub admin: AdminStats,
    pub secretary: SecretaryStats,
}
