//! Field checks shared by the request DTOs.
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use std::fmt::Display;
use std::str::FromStr;
use validator::{ValidateEmail, ValidationError};

pub const ROLES: [&str; 2] = ["admin", "secretaria"];
pub const USER_STATUSES: [&str; 2] = ["active", "inactive"];

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Rejects empty and whitespace-only strings. Missing JSON fields land here as `""`.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub fn required_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(failure("blank", "email is required"));
    }
    if !value.trim().validate_email() {
        return Err(failure("email", "email must be a valid address"));
    }
    Ok(())
}

pub fn known_role(value: &str) -> Result<(), ValidationError> {
    if ROLES.contains(&value.trim().to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(failure("role", "role must be one of: admin, secretaria"))
    }
}

pub fn known_user_status(value: &str) -> Result<(), ValidationError> {
    if USER_STATUSES.contains(&value.trim().to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(failure("status", "status must be one of: active, inactive"))
    }
}

/// Trimmed value, or `None` when nothing is left.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Serde adapter for optional fields: absent, `null` and blank strings all become `None`, anything
/// else is parsed with `FromStr`. Lets `?page=&dateFrom=` through the way browsers send them.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn blank_strings_fail() {
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
        assert!(not_blank(" a ").is_ok());
    }

    #[test]
    fn email_checks_presence_then_format() {
        let missing = required_email(" ").unwrap_err();
        assert_eq!(missing.code, "blank");
        let malformed = required_email("not-an-email").unwrap_err();
        assert_eq!(malformed.code, "email");
        assert!(required_email("ana@example.com").is_ok());
    }

    #[test]
    fn roles_are_case_insensitive() {
        assert!(known_role("Admin").is_ok());
        assert!(known_role("secretaria").is_ok());
        assert!(known_role("root").is_err());
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank(Some("  x ")), Some("x".to_string()));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[derive(Deserialize)]
    struct Window {
        #[serde(default, deserialize_with = "blank_as_none")]
        from: Option<NaiveDate>,
        #[serde(default, deserialize_with = "blank_as_none")]
        limit: Option<i64>,
    }

    #[test]
    fn blank_values_deserialize_as_none() {
        let w: Window = serde_json::from_str(r#"{"from": " ", "limit": null}"#).unwrap();
        assert!(w.from.is_none());
        assert!(w.limit.is_none());

        let w: Window = serde_json::from_str(r#"{"from": "2024-02-29", "limit": "25"}"#).unwrap();
        assert_eq!(w.from, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(w.limit, Some(25));

        assert!(serde_json::from_str::<Window>(r#"{"from": "29/02/2024"}"#).is_err());
    }
}
