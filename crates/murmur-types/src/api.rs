use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Message, User};
use crate::validation::{
    Validate, ValidationError, require_non_empty, validate_content, validate_email,
    validate_password, validate_username, validate_verify_code,
};

// -- Session --

/// JWT claims carried by the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Envelope --

/// The `{success, message}` body every handler answers with when it has
/// nothing else to say, including all errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

// -- Auth --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Validate for SignUpRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyCodeRequest {
    pub username: String,
    pub code: String,
}

impl Validate for VerifyCodeRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("username", &self.username)?;
        validate_verify_code(&self.code)
    }
}

/// `identifier` is either the email or the username.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignInRequest {
    pub identifier: String,
    pub password: String,
}

impl Validate for SignInRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("identifier", &self.identifier)?;
        require_non_empty("password", &self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsernameQuery {
    #[serde(default)]
    pub username: String,
}

impl Validate for UsernameQuery {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)
    }
}

// -- Messages --

/// Extra fields are ignored, so older clients that send more than these
/// two keep working.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub username: String,
    pub content: String,
}

impl Validate for SendMessageRequest {
    // The username is only looked up, never format-checked: any name that is
    // not a verified user is a 404, not a 400.
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("username", &self.username)?;
        validate_content(&self.content)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub success: bool,
    pub messages: Vec<Message>,
}

// -- Settings --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AcceptMessagesRequest {
    pub accept_messages: bool,
}

impl Validate for AcceptMessagesRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptMessagesResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub is_accepting_messages: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnonShieldRequest {
    pub anon_shield: bool,
}

impl Validate for AnonShieldRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonShieldResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub anon_shield: bool,
}

// -- AI --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestMessagesRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestMessagesResponse {
    pub success: bool,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesCheckRequest {
    #[serde(default)]
    pub prompt: String,
}

impl Validate for MessagesCheckRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("prompt", &self.prompt)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesCheckResponse {
    pub success: bool,
    pub response: String,
    pub message: String,
}
