pub mod audit;
pub mod auth;
pub mod catalog;
pub mod inventory;
pub mod reports;
pub mod sales;
pub mod students;
pub mod users;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;
use utoipa::ToSchema;

use crate::utils::PageMeta;

/// The `{success, message, data}` envelope every endpoint answers with.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
            filters: None,
            total: None,
        }
    }

    pub fn paginated(data: T, pagination: PageMeta) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_total(mut self, total: i64) -> Self {
        self.total = Some(total);
        self
    }
}

impl ApiResponse<()> {
    /// Success with a message and `data: null`.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            pagination: None,
            filters: None,
            total: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Error body, for the API docs.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "Invalid username or password")]
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

/// `data` of create endpoints that answer with the new row's id.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdResponse {
    #[schema(example = 42)]
    pub id: i64,
}

/// Converts a validated non-negative amount into a two-decimal `Decimal`.
pub(crate) fn money(field: &str, value: f64) -> Result<Decimal, AppError> {
    Decimal::try_from(value)
        .map(|d| d.round_dp(2))
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("{} is not a valid amount", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::PageRequest;
    use serde_json::json;

    #[test]
    fn message_only_keeps_null_data() {
        let body = serde_json::to_value(ApiResponse::message("Student deleted")).unwrap();
        assert_eq!(
            body,
            json!({"success": true, "message": "Student deleted", "data": null})
        );
    }

    #[test]
    fn paginated_carries_meta_and_filters() {
        let page = PageRequest { page: 1, limit: 10 };
        let body = serde_json::to_value(
            ApiResponse::paginated(vec![1, 2, 3], page.meta(3))
                .with_filters(json!({"search": "ana"})),
        )
        .unwrap();
        assert_eq!(body["data"], json!([1, 2, 3]));
        assert_eq!(body["message"], Value::Null);
        assert_eq!(body["pagination"]["totalItems"], 3);
        assert_eq!(body["filters"]["search"], "ana");
        assert!(body.get("total").is_none());
    }

    #[test]
    fn money_rounds_to_cents() {
        assert_eq!(money("price", 10.456).unwrap().to_string(), "10.46");
        assert!(money("price", f64::NAN).is_err());
    }
}
