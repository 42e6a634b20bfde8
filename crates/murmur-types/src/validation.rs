//! Input rules applied to request bodies before any domain object is built.

use thiserror::Error;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 20;
pub const PASSWORD_MIN: usize = 6;
pub const CONTENT_MAX: usize = 300;
pub const VERIFY_CODE_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Implemented by every request body. Checks run in field order and stop at
/// the first violation.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if len < USERNAME_MIN {
        return Err(ValidationError::new(
            "username",
            format!("Username must be at least {USERNAME_MIN} characters"),
        ));
    }
    if len > USERNAME_MAX {
        return Err(ValidationError::new(
            "username",
            format!("Username must be no more than {USERNAME_MAX} characters"),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ValidationError::new(
            "username",
            "Username must not contain special characters",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::new("email", "Invalid email address");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    // Domain needs at least one dot with non-empty labels on both sides.
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() || host.starts_with('.') || host.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(ValidationError::new(
            "password",
            format!("Password must be at least {PASSWORD_MIN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_verify_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != VERIFY_CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(
            "code",
            format!("Verification code must be {VERIFY_CODE_LEN} digits"),
        ));
    }
    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::new("content", "Message content is required"));
    }
    if content.chars().count() > CONTENT_MAX {
        return Err(ValidationError::new(
            "content",
            format!("Message must be no longer than {CONTENT_MAX} characters"),
        ));
    }
    Ok(())
}

pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, format!("{field} is required")));
    }
    Ok(())
}
