use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::validation::{known_role, known_user_status, not_blank, required_email};

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(custom(function = "not_blank", message = "firstNames is required"))]
    #[schema(example = "Ana")]
    pub first_names: String,

    #[validate(custom(function = "not_blank", message = "lastName is required"))]
    #[schema(example = "Ruiz")]
    pub last_name: String,

    #[validate(custom(function = "required_email"))]
    pub email: String,

    #[validate(custom(function = "known_role"))]
    #[schema(example = "secretaria")]
    pub role: String,

    #[validate(custom(function = "not_blank", message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(custom(function = "not_blank", message = "firstNames is required"))]
    pub first_names: String,

    #[validate(custom(function = "not_blank", message = "lastName is required"))]
    pub last_name: String,

    #[validate(custom(function = "required_email"))]
    pub email: String,

    #[validate(custom(function = "known_role"))]
    pub role: String,

    #[validate(custom(function = "known_user_status"))]
    #[schema(example = "active")]
    pub status: String,
}

impl UpdateUserRequest {
    pub fn is_active(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("active")
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(custom(function = "not_blank", message = "newPassword is required"))]
    pub new_password: String,
}

/// `data` of a successful user creation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    #[schema(example = "anarui")]
    pub username: String,
    pub first_names: String,
    pub last_names: String,
    pub email: String,
    pub role: String,
    pub temporary_password: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use service_core::error::describe_validation;

    #[test]
    fn unknown_role_is_rejected() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"firstNames":"Ana","lastName":"Ruiz","email":"ana@example.com","role":"root","password":"x"}"#,
        )
        .unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(describe_validation(&err), "role must be one of: admin, secretaria");
    }

    #[test]
    fn status_drives_the_active_flag() {
        let mut req = UpdateUserRequest {
            status: "Active".into(),
            ..Default::default()
        };
        assert!(req.is_active());
        req.status = "inactive".into();
        assert!(!req.is_active());
    }
}
