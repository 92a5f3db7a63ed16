use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::utils::validation::{blank_as_none, not_blank, required_email};

/// Body of create and update; the same rules apply to both.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentRequest {
    #[validate(custom(function = "not_blank", message = "firstNames is required"))]
    #[schema(example = "Ana Lucía")]
    pub first_names: String,

    #[validate(custom(function = "not_blank", message = "lastNames is required"))]
    #[schema(example = "Ruiz Pérez")]
    pub last_names: String,

    #[validate(custom(function = "required_email"))]
    #[schema(example = "ana@example.com")]
    pub email: String,

    #[validate(custom(function = "not_blank", message = "phone is required"))]
    #[schema(example = "5555-1234")]
    pub phone: String,

    #[validate(custom(function = "not_blank", message = "program is required"))]
    #[schema(example = "Ingeniería en Sistemas")]
    pub program: String,

    #[serde(deserialize_with = "blank_as_none")]
    #[schema(value_type = Option<String>, format = Date, example = "2001-05-14")]
    pub birth_date: Option<NaiveDate>,
}

impl StudentRequest {
    /// Copy with every text field trimmed.
    pub fn trimmed(&self) -> Self {
        Self {
            first_names: self.first_names.trim().to_string(),
            last_names: self.last_names.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            program: self.program.trim().to_string(),
            birth_date: self.birth_date,
        }
    }
}

/// `data` of a successful registration.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedStudent {
    /// Carné generated by the database.
    #[schema(example = "2024-0001")]
    pub code: String,
    pub first_names: String,
    pub last_names: String,
    pub email: String,
    pub program: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StudentSort {
    Code,
    FirstNames,
    LastNames,
    Program,
    #[default]
    RegisteredAt,
    Email,
}

impl StudentSort {
    /// Unknown names fall back to registration date.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim).unwrap_or_default() {
            "code" => Self::Code,
            "firstNames" => Self::FirstNames,
            "lastNames" => Self::LastNames,
            "program" => Self::Program,
            "email" => Self::Email,
            _ => Self::RegisteredAt,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Code => "carne",
            Self::FirstNames => "nombres",
            Self::LastNames => "apellidos",
            Self::Program => "carrera",
            Self::RegisteredAt => "fecha_registro",
            Self::Email => "correo",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StudentListQuery {
    /// Matches names, full name or student code.
    pub search: Option<String>,
    pub program: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub page: Option<i64>,
    /// 1 to 50, default 10.
    #[serde(deserialize_with = "blank_as_none")]
    pub limit: Option<i64>,
    /// code, firstNames, lastNames, program, registeredAt or email.
    pub sort_by: Option<String>,
    /// asc or desc.
    pub sort_order: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_falls_back_to_registration_date() {
        assert_eq!(StudentSort::parse(Some("lastNames")).column(), "apellidos");
        assert_eq!(StudentSort::parse(Some("carne; DROP")).column(), "fecha_registro");
        assert_eq!(StudentSort::parse(None), StudentSort::RegisteredAt);
    }

    #[test]
    fn sort_order_is_case_insensitive() {
        assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Desc);
    }

    #[test]
    fn missing_email_and_bad_email_are_reported() {
        let req: StudentRequest = serde_json::from_str(
            r#"{"firstNames":"Ana","lastNames":"Ruiz","phone":"1","program":"X"}"#,
        )
        .unwrap();
        let err = req.validate().unwrap_err();
        assert!(service_core::error::describe_validation(&err).contains("email is required"));

        let req: StudentRequest = serde_json::from_str(
            r#"{"firstNames":"Ana","lastNames":"Ruiz","email":"nope","phone":"1","program":"X","birthDate":""}"#,
        )
        .unwrap();
        assert!(req.birth_date.is_none());
        assert!(req.validate().is_err());
    }
}
