//! Categories and products.
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::utils::validation::{blank_as_none, non_blank, not_blank};

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CategoryRequest {
    #[validate(custom(function = "not_blank", message = "name is required"))]
    #[schema(example = "Bebidas")]
    pub name: String,

    pub description: Option<String>,

    /// Ignored on create; defaults to true on update.
    pub active: Option<bool>,
}

impl CategoryRequest {
    pub fn trimmed_description(&self) -> Option<String> {
        non_blank(self.description.as_deref())
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    /// Defaults to true.
    #[serde(deserialize_with = "blank_as_none")]
    pub active_only: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct PhysicalDeleteQuery {
    /// Remove the row instead of deactivating it.
    #[serde(deserialize_with = "blank_as_none")]
    pub physical: Option<bool>,
}

impl PhysicalDeleteQuery {
    pub fn is_physical(&self) -> bool {
        self.physical.unwrap_or(false)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    #[serde(deserialize_with = "blank_as_none")]
    pub page: Option<i64>,
    #[serde(deserialize_with = "blank_as_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Generated from the name when blank.
    #[schema(example = "BEBIDAS-7Q2K")]
    pub code: Option<String>,

    #[validate(custom(function = "not_blank", message = "name is required"))]
    #[schema(example = "Agua pura 600ml")]
    pub name: String,

    pub description: Option<String>,

    /// Category ids.
    pub categories: Vec<i32>,

    #[validate(
        required(message = "costPrice is required"),
        range(min = 0.0, message = "costPrice must not be negative")
    )]
    #[schema(example = 3.5)]
    pub cost_price: Option<f64>,

    #[validate(
        required(message = "salePrice is required"),
        range(min = 0.0, message = "salePrice must not be negative")
    )]
    #[schema(example = 5.0)]
    pub sale_price: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "discount must be between 0 and 100"))]
    pub discount: Option<f64>,

    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: Option<i32>,
}

/// Every field optional; only supplied columns change.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(custom(function = "not_blank", message = "name must not be blank"))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "costPrice must not be negative"))]
    pub cost_price: Option<f64>,

    #[validate(range(min = 0.0, message = "salePrice must not be negative"))]
    pub sale_price: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "discount must be between 0 and 100"))]
    pub discount: Option<f64>,

    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: Option<i32>,

    /// When present, the product's links are replaced by exactly these category ids.
    pub categories: Option<Vec<i32>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    #[serde(deserialize_with = "blank_as_none")]
    pub page: Option<i64>,
    #[serde(deserialize_with = "blank_as_none")]
    pub limit: Option<i64>,
    /// Matches name or code.
    pub search: Option<String>,
    /// `1` or `true` for active products; any other value for inactive ones.
    pub status: Option<String>,
}

impl ProductListQuery {
    /// `None` when no status filter was given.
    pub fn active_filter(&self) -> Option<bool> {
        non_blank(self.status.as_deref()).map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
    }
}

/// `data` of a product delete.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedProduct {
    pub physical: bool,
}
