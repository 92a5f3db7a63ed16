use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::utils::validation::blank_as_none;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SaleItemRequest {
    #[validate(range(min = 1, message = "productId is required"))]
    pub product_id: i32,

    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,

    #[validate(
        required(message = "unitPrice is required"),
        range(min = 0.0, message = "unitPrice must not be negative")
    )]
    #[schema(example = 5.0)]
    pub unit_price: Option<f64>,

    #[validate(range(min = 0.0, message = "discount must not be negative"))]
    pub discount: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SaleRequest {
    #[validate(length(min = 1, message = "A sale needs at least one item"), nested)]
    pub items: Vec<SaleItemRequest>,
    pub note: Option<String>,
}

/// One line in the JSON document `com.sp_registrar_venta` reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleDetailLine {
    #[serde(rename = "IdProducto")]
    pub product_id: i32,
    #[serde(rename = "Cantidad")]
    pub quantity: i32,
    #[serde(rename = "PrecioUnitario")]
    pub unit_price: f64,
    #[serde(rename = "Descuento")]
    pub discount: f64,
}

impl SaleRequest {
    /// The procedure's `detalle` argument.
    pub fn detail_lines(&self) -> Vec<SaleDetailLine> {
        self.items
            .iter()
            .map(|item| SaleDetailLine {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price.unwrap_or_default(),
                discount: item.discount.unwrap_or_default(),
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SalesListQuery {
    #[serde(deserialize_with = "blank_as_none")]
    pub page: Option<i64>,
    /// 1 to 100, default 20.
    #[serde(deserialize_with = "blank_as_none")]
    pub page_size: Option<i64>,
    #[serde(deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>, format = Date)]
    pub date_from: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>, format = Date)]
    pub date_to: Option<NaiveDate>,
    /// Exact seller username, or part of the sale number.
    pub user: Option<String>,
    /// Ignored when negative.
    #[serde(deserialize_with = "blank_as_none")]
    pub min_amount: Option<f64>,
    /// Ignored when negative.
    #[serde(deserialize_with = "blank_as_none")]
    pub max_amount: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_sale_is_rejected() {
        let req: SaleRequest = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn nested_items_are_validated() {
        let req: SaleRequest = serde_json::from_str(
            r#"{"items": [{"productId": 1, "quantity": 0, "unitPrice": 2.5}]}"#,
        )
        .unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(
            service_core::error::describe_validation(&err),
            "quantity must be at least 1"
        );
    }

    #[test]
    fn missing_items_default_to_an_empty_sale() {
        let req: SaleRequest = serde_json::from_str(r#"{"note": "mostrador"}"#).unwrap();
        assert!(req.items.is_empty());
        assert!(req.validate().is_err());
        assert_eq!(
            serde_json::to_value(SaleItemRequest::default()).unwrap(),
            json!({"productId": 0, "quantity": 0, "unitPrice": null, "discount": null})
        );
    }

    #[test]
    fn detail_uses_the_procedure_keys() {
        let req: SaleRequest = serde_json::from_str(
            r#"{"items": [{"productId": 4, "quantity": 2, "unitPrice": 7.25}], "note": "mostrador"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(
            serde_json::to_value(req.detail_lines()).unwrap(),
            json!([{"IdProducto": 4, "Cantidad": 2, "PrecioUnitario": 7.25, "Descuento": 0.0}])
        );
    }
}
