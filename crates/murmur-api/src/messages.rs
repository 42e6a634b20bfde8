use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{info, warn};
use uuid::Uuid;

use murmur_db::models::{MessageRow, parse_timestamp};
use murmur_types::api::{ApiResponse, MessagesResponse, SendMessageRequest};
use murmur_types::models::Message;

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::session::Session;
use crate::state::{AppState, db_call};

/// Public endpoint: anyone may post to a verified user who is accepting
/// messages. No sender information is recorded and no moderation is applied
/// here; the content check is advisory and happens client-side.
pub async fn send_message(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SendMessageRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let username = req.username.clone();
    let user = db_call(&state, move |db| db.get_verified_user_by_username(&username))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if !user.is_accepting_messages {
        return Err(ApiError::Forbidden("User is not accepting messages".into()));
    }

    let row = MessageRow {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        content: req.content,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    db_call(&state, move |db| db.insert_message(&row)).await?;
    info!("Message delivered to {}", user.username);

    Ok(Json(ApiResponse::ok("Message sent successfully")))
}

pub async fn get_messages(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<MessagesResponse>, ApiError> {
    let user_id = session.user_id.to_string();
    let rows = db_call(&state, move |db| {
        if db.get_user_by_id(&user_id)?.is_none() {
            return Ok(None);
        }
        db.get_messages(&user_id).map(Some)
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let messages = rows.into_iter().filter_map(message_view).collect();

    Ok(Json(MessagesResponse {
        success: true,
        messages,
    }))
}

pub async fn delete_message(
    State(state): State<AppState>,
    session: Session,
    Path(message_id): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    let user_id = session.user_id.to_string();
    let mid = message_id.clone();
    let deleted = db_call(&state, move |db| db.delete_message(&user_id, &mid)).await?;

    if !deleted {
        return Err(ApiError::NotFound(
            "Message not found or already deleted".into(),
        ));
    }
    info!("User {} deleted message {}", session.username, message_id);

    Ok(Json(ApiResponse::ok("Message deleted")))
}

fn message_view(row: MessageRow) -> Option<Message> {
    let id = match row.id.parse() {
        Ok(id) => id,
        Err(e) => {
            warn!("Skipping message with corrupt id '{}': {}", row.id, e);
            return None;
        }
    };
    let created_at = parse_timestamp(&row.created_at).unwrap_or_else(|| {
        warn!("Corrupt created_at '{}' on message '{}'", row.created_at, row.id);
        chrono::DateTime::default()
    });

    Some(Message {
        id,
        content: row.content,
        created_at,
    })
}
