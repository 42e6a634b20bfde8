use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use tracing::debug;

use murmur_types::api::{
    MessagesCheckRequest, MessagesCheckResponse, SuggestMessagesRequest, SuggestMessagesResponse,
};
use murmur_types::genai::GenAiError;
use murmur_types::moderation::SUGGESTION_PROMPT;

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::state::AppState;

/// Ask the model for `||`-separated conversation starters. The body is
/// optional; anything unparseable falls back to the default prompt.
pub async fn suggest_messages(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SuggestMessagesResponse>, ApiError> {
    let req: SuggestMessagesRequest = serde_json::from_slice(&body).unwrap_or_default();
    let prompt = req
        .prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| SUGGESTION_PROMPT.to_string());

    let content = state
        .generator
        .generate(&prompt)
        .await
        .map_err(|e| upstream("Failed to generate messages", e))?;

    Ok(Json(SuggestMessagesResponse {
        success: true,
        content,
    }))
}

/// Pass-through used by the advisory moderation checker. The reply is
/// returned verbatim; classification happens on the caller's side.
pub async fn check_message(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<MessagesCheckRequest>,
) -> Result<(StatusCode, Json<MessagesCheckResponse>), ApiError> {
    let response = state
        .generator
        .generate(&req.prompt)
        .await
        .map_err(|e| upstream("Failed to get response from the AI provider", e))?;
    debug!("Moderation reply: {} bytes", response.len());

    Ok((
        StatusCode::CREATED,
        Json(MessagesCheckResponse {
            success: true,
            response,
            message: "Response generated successfully".into(),
        }),
    ))
}

fn upstream(public: &str, err: GenAiError) -> ApiError {
    match err {
        GenAiError::NotConfigured => ApiError::upstream("AI API key missing or invalid", err),
        other => ApiError::upstream(public, other),
    }
}
