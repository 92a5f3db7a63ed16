use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::utils::validation::blank_as_none;

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SalesReportQuery {
    #[serde(deserialize_with = "blank_as_none")]
    #[validate(required(message = "dateFrom and dateTo are required"))]
    #[param(value_type = String, format = Date)]
    pub date_from: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_as_none")]
    #[validate(required(message = "dateFrom and dateTo are required"))]
    #[param(value_type = String, format = Date)]
    pub date_to: Option<NaiveDate>,
    pub user: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub category_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InventoryReportQuery {
    #[serde(deserialize_with = "blank_as_none")]
    pub product_id: Option<i32>,
    #[serde(deserialize_with = "blank_as_none")]
    pub category_id: Option<i32>,
    /// Clamped to 1..=1000, default 50.
    #[serde(deserialize_with = "blank_as_none")]
    pub recent_movements: Option<i32>,
}

impl InventoryReportQuery {
    pub fn recent(&self) -> i32 {
        self.recent_movements.unwrap_or(50).clamp(1, 1000)
    }
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TopProductsQuery {
    /// 1 to 100, default 10.
    #[serde(deserialize_with = "blank_as_none")]
    #[validate(range(min = 1, max = 100, message = "topN must be between 1 and 100"))]
    pub top_n: Option<i32>,
    #[serde(deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>, format = Date)]
    pub date_from: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>, format = Date)]
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct RevenueQuery {
    /// Defaults to the current year.
    #[serde(deserialize_with = "blank_as_none")]
    #[validate(range(min = 2000, max = 2100, message = "year must be between 2000 and 2100"))]
    pub year: Option<i32>,
    #[serde(deserialize_with = "blank_as_none")]
    #[validate(range(min = 1, max = 12, message = "month must be between 1 and 12"))]
    pub month: Option<i32>,
}

/// `data` of the inventory report.
#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryReport {
    #[schema(value_type = Vec<Object>)]
    pub inventory: Vec<serde_json::Value>,
    #[schema(value_type = Vec<Object>)]
    pub movements: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sales_report_needs_both_dates() {
        let query = SalesReportQuery {
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn top_n_and_calendar_bounds() {
        let top = TopProductsQuery {
            top_n: Some(0),
            ..Default::default()
        };
        assert!(top.validate().is_err());
        assert!(TopProductsQuery::default().validate().is_ok());

        let revenue = RevenueQuery {
            year: Some(1999),
            month: Some(13),
        };
        let err = revenue.validate().unwrap_err();
        assert_eq!(
            service_core::error::describe_validation(&err),
            "month must be between 1 and 12; year must be between 2000 and 2100"
        );
    }

    #[test]
    fn recent_movements_are_clamped() {
        let query = |n| InventoryReportQuery {
            recent_movements: n,
            ..Default::default()
        };
        assert_eq!(query(None).recent(), 50);
        assert_eq!(query(Some(0)).recent(), 1);
        assert_eq!(query(Some(5000)).recent(), 1000);
    }
}
