use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::validation::not_blank;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(custom(function = "not_blank", message = "username is required"))]
    #[schema(example = "anaruiz")]
    pub username: String,

    #[validate(custom(function = "not_blank", message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    #[validate(custom(function = "not_blank", message = "email is required"))]
    #[schema(example = "ana@example.com")]
    pub email: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(custom(function = "not_blank", message = "username is required"))]
    pub username: String,

    #[validate(custom(function = "not_blank", message = "currentPassword is required"))]
    pub current_password: String,

    #[validate(custom(function = "not_blank", message = "newPassword is required"))]
    pub new_password: String,

    #[validate(custom(function = "not_blank", message = "confirmPassword is required"))]
    pub confirm_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fail_validation() {
        let req: LoginRequest = serde_json::from_str(r#"{"username": "ana"}"#).unwrap();
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("password"));
        assert!(!err.field_errors().contains_key("username"));
    }

    #[test]
    fn change_password_reads_camel_case() {
        let req: ChangePasswordRequest = serde_json::from_str(
            r#"{"username":"ana","currentPassword":"a","newPassword":"b","confirmPassword":"b"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.current_password, "a");
    }
}
