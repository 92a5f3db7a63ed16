use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::utils::validation::{blank_as_none, non_blank};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AccessLogQuery {
    #[serde(deserialize_with = "blank_as_none")]
    pub page: Option<i64>,
    #[serde(deserialize_with = "blank_as_none")]
    pub limit: Option<i64>,
    pub role: Option<String>,
    pub username: Option<String>,
    /// OK or FAIL.
    pub status: Option<String>,
    /// Alone, selects that single day.
    #[serde(deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>, format = Date)]
    pub date_from: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>, format = Date)]
    pub date_to: Option<NaiveDate>,
}

/// Access-log filters after normalisation; echoed back in `filters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogFilters {
    pub role: Option<String>,
    pub username: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl AccessLogQuery {
    pub fn filters(&self) -> AccessLogFilters {
        AccessLogFilters {
            role: non_blank(self.role.as_deref()).map(|r| r.to_lowercase()),
            username: non_blank(self.username.as_deref()),
            status: non_blank(self.status.as_deref()).map(|s| s.to_uppercase()),
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TransactionLogQuery {
    #[serde(deserialize_with = "blank_as_none")]
    pub page: Option<i64>,
    #[serde(deserialize_with = "blank_as_none")]
    pub limit: Option<i64>,
    pub username: Option<String>,
    /// Operation name, e.g. UPDATE_USER.
    pub action: Option<String>,
    pub entity: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>, format = Date)]
    pub date_from: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>, format = Date)]
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLogFilters {
    pub username: Option<String>,
    pub action: Option<String>,
    pub entity: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl TransactionLogQuery {
    pub fn filters(&self) -> TransactionLogFilters {
        TransactionLogFilters {
            username: non_blank(self.username.as_deref()),
            action: non_blank(self.action.as_deref()).map(|a| a.to_uppercase()),
            entity: non_blank(self.entity.as_deref()),
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_filters_are_normalised() {
        let query = AccessLogQuery {
            role: Some(" Admin ".into()),
            status: Some("fail".into()),
            username: Some("  ".into()),
            ..Default::default()
        };
        let filters = query.filters();
        assert_eq!(filters.role.as_deref(), Some("admin"));
        assert_eq!(filters.status.as_deref(), Some("FAIL"));
        assert!(filters.username.is_none());
    }

    #[test]
    fn transaction_action_is_uppercased() {
        let query = TransactionLogQuery {
            action: Some("update_user".into()),
            entity: Some("tb_usuario".into()),
            ..Default::default()
        };
        let filters = query.filters();
        assert_eq!(filters.action.as_deref(), Some("UPDATE_USER"));
        assert_eq!(filters.entity.as_deref(), Some("tb_usuario"));
    }
}
