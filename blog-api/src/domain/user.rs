use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

pub(crate) const USERNAME_MIN_CHARS: usize = 3;
pub(crate) const USERNAME_MAX_CHARS: usize = 20;
pub(crate) const PASSWORD_MIN_CHARS: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) repeat_password: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(DomainError::Validation {
                field: "password",
                message: "must be at least 6 chars",
            });
        }
        if self.password != self.repeat_password {
            return Err(DomainError::PasswordMismatch);
        }
        Ok(Self {
            username,
            email,
            password: self.password,
            repeat_password: self.repeat_password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = self.username.trim();
        if username.is_empty() || username.chars().count() > USERNAME_MAX_CHARS {
            return Err(DomainError::Validation {
                field: "username",
                message: "must be 1..20 chars",
            });
        }

        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }
        Ok(Self {
            username: username.to_string(),
            password: self.password,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
}

impl User {
    pub(crate) fn new(
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let username = normalize_username(&username.into())?;
        let email = normalize_email(&email.into())?;

        Ok(Self {
            id,
            username,
            email,
        })
    }
}

fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    let len = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be 3..20 chars",
        });
    }
    Ok(username.to_string())
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::{DomainError, RegisterRequest, User, normalize_email, normalize_username};

    fn register(password: &str, repeat_password: &str) -> RegisterRequest {
        RegisterRequest {
            username: "valid_user".to_string(),
            email: "test@example.com".to_string(),
            password: password.to_string(),
            repeat_password: repeat_password.to_string(),
        }
    }

    #[test]
    fn user_new_rejects_non_positive_id() {
        let result = User::new(0, "valid_user", "test@example.com");
        assert!(result.is_err());
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  TeSt@Example.COM ").expect("must be valid");
        assert_eq!(value, "test@example.com");
    }

    #[test]
    fn username_length_rules_are_applied() {
        assert!(normalize_username("ab").is_err());
        assert!(normalize_username("a_name_that_is_way_too_long").is_err());
        assert!(normalize_username("valid_user").is_ok());
    }

    #[test]
    fn register_password_length_is_checked() {
        assert!(register("short", "short").validate().is_err());

        let validated = register("secret-pw", "secret-pw")
            .validate()
            .expect("must be valid");
        assert_eq!(validated.username, "valid_user");
        assert_eq!(validated.email, "test@example.com");
    }

    #[test]
    fn register_rejects_mismatched_repeat_password() {
        let err = register("secret-pw", "secret-px")
            .validate()
            .expect_err("passwords differ");
        assert!(matches!(err, DomainError::PasswordMismatch));
    }
}
