//! Per-user flags: message acceptance and the anon shield.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

use murmur_types::api::{
    AcceptMessagesRequest, AcceptMessagesResponse, AnonShieldRequest, AnonShieldResponse,
};

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::session::Session;
use crate::state::{AppState, db_call};

fn user_gone() -> ApiError {
    ApiError::NotFound("User not found".into())
}

pub async fn get_accept_status(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<AcceptMessagesResponse>, ApiError> {
    let user_id = session.user_id.to_string();
    let user = db_call(&state, move |db| db.get_user_by_id(&user_id))
        .await?
        .ok_or_else(user_gone)?;

    Ok(Json(AcceptMessagesResponse {
        success: true,
        message: None,
        is_accepting_messages: user.is_accepting_messages,
    }))
}

/// Setting the current value again is a successful no-op.
pub async fn set_accept_status(
    State(state): State<AppState>,
    session: Session,
    ValidJson(req): ValidJson<AcceptMessagesRequest>,
) -> Result<Json<AcceptMessagesResponse>, ApiError> {
    let user_id = session.user_id.to_string();
    let accepting = req.accept_messages;
    let found = db_call(&state, move |db| db.set_accepting_messages(&user_id, accepting)).await?;
    if !found {
        return Err(user_gone());
    }
    info!("User {} set accepting messages to {}", session.username, accepting);

    Ok(Json(AcceptMessagesResponse {
        success: true,
        message: Some("Message acceptance status updated successfully".into()),
        is_accepting_messages: accepting,
    }))
}

pub async fn get_anon_shield(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<AnonShieldResponse>, ApiError> {
    let user_id = session.user_id.to_string();
    let user = db_call(&state, move |db| db.get_user_by_id(&user_id))
        .await?
        .ok_or_else(user_gone)?;

    Ok(Json(AnonShieldResponse {
        success: true,
        message: None,
        anon_shield: user.anon_shield,
    }))
}

pub async fn set_anon_shield(
    State(state): State<AppState>,
    session: Session,
    ValidJson(req): ValidJson<AnonShieldRequest>,
) -> Result<Json<AnonShieldResponse>, ApiError> {
    let user_id = session.user_id.to_string();
    let enabled = req.anon_shield;
    let found = db_call(&state, move |db| db.set_anon_shield(&user_id, enabled)).await?;
    if !found {
        return Err(user_gone());
    }
    info!("User {} set anon shield to {}", session.username, enabled);

    let status = if enabled { "enabled" } else { "disabled" };
    Ok(Json(AnonShieldResponse {
        success: true,
        message: Some(format!("Anon Shield {status}")),
        anon_shield: enabled,
    }))
}

/// Public lookup: only answers positively when the shield is on.
pub async fn anon_status(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<AnonShieldResponse>, ApiError> {
    let user = db_call(&state, move |db| db.get_verified_user_by_username(&username))
        .await?
        .ok_or_else(user_gone)?;

    if !user.anon_shield {
        return Err(ApiError::Forbidden("User has anon shield disabled".into()));
    }

    Ok(Json(AnonShieldResponse {
        success: true,
        message: None,
        anon_shield: true,
    }))
}
