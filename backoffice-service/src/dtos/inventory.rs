use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::utils::validation::blank_as_none;

/// Movement types, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Entry,
    Exit,
    Adjustment,
    Purchase,
}

impl MovementKind {
    /// Code stored by the inventory procedures.
    pub fn code(self) -> &'static str {
        match self {
            Self::Entry => "ENTRADA",
            Self::Exit => "SALIDA",
            Self::Adjustment => "AJUSTE",
            Self::Purchase => "COMPRA",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MovementKind {
    type Err = String;

    /// Accepts the wire names and the stored codes, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entry" | "entrada" => Ok(Self::Entry),
            "exit" | "salida" => Ok(Self::Exit),
            "adjustment" | "ajuste" => Ok(Self::Adjustment),
            "purchase" | "compra" => Ok(Self::Purchase),
            _ => Err("kind must be one of: entry, exit, adjustment, purchase".to_string()),
        }
    }
}

fn known_kind(value: &str) -> Result<(), ValidationError> {
    value.parse::<MovementKind>().map(|_| ()).map_err(|message| {
        let mut err = ValidationError::new("kind");
        err.message = Some(message.into());
        err
    })
}

fn non_zero(value: i32) -> Result<(), ValidationError> {
    if value == 0 {
        let mut err = ValidationError::new("non_zero");
        err.message = Some("quantity must not be zero".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MovementRequest {
    #[validate(range(min = 1, message = "productId is required"))]
    #[schema(example = 12)]
    pub product_id: i32,

    /// Negative values are outflows.
    #[validate(custom(function = "non_zero"))]
    #[schema(example = 24)]
    pub quantity: i32,

    #[validate(custom(function = "known_kind"))]
    #[schema(example = "entry")]
    pub kind: String,

    pub note: Option<String>,
}

impl MovementRequest {
    pub fn movement_kind(&self) -> Option<MovementKind> {
        self.kind.parse().ok()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StockQuery {
    #[serde(deserialize_with = "blank_as_none")]
    pub product_id: Option<i32>,
    /// Stock level below which a product counts as low. Defaults to 10.
    #[serde(deserialize_with = "blank_as_none")]
    pub min_stock: Option<i32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MovementsQuery {
    #[serde(deserialize_with = "blank_as_none")]
    pub product_id: Option<i32>,
    #[serde(deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>)]
    pub kind: Option<MovementKind>,
    #[serde(deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>, format = Date)]
    pub date_from: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>, format = Date)]
    pub date_to: Option<NaiveDate>,
    /// 1 to 1000, default 100.
    #[serde(deserialize_with = "blank_as_none")]
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_stored_codes() {
        assert_eq!("Entry".parse::<MovementKind>().unwrap().code(), "ENTRADA");
        assert_eq!("exit".parse::<MovementKind>().unwrap().code(), "SALIDA");
        assert_eq!("ADJUSTMENT".parse::<MovementKind>().unwrap().code(), "AJUSTE");
        assert_eq!("compra".parse::<MovementKind>().unwrap(), MovementKind::Purchase);
        assert!("transfer".parse::<MovementKind>().is_err());
    }

    #[test]
    fn zero_quantity_and_unknown_kind_fail() {
        let req = MovementRequest {
            product_id: 1,
            quantity: 0,
            kind: "transfer".into(),
            note: None,
        };
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("quantity"));
        assert!(err.field_errors().contains_key("kind"));
    }

    #[test]
    fn non_zero_rejects_only_zero() {
        assert!(non_zero(-5).is_ok());
        assert!(non_zero(7).is_ok());
        let err = non_zero(0).unwrap_err();
        assert_eq!(err.message.as_deref(), Some("quantity must not be zero"));
    }

    #[test]
    fn outflows_are_allowed() {
        let req: MovementRequest =
            serde_json::from_str(r#"{"productId": 3, "quantity": -2, "kind": "exit"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.movement_kind(), Some(MovementKind::Exit));
    }
}
