use axum::{
    Json, Router,
    routing::{delete, get, post},
};
use serde::Serialize;

use crate::state::AppState;
use crate::{ai, auth, messages, settings};

/// All routes; the binary adds CORS and tracing layers on top.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Account
        .route("/sign-up", post(auth::sign_up))
        .route("/verify-code", post(auth::verify_code))
        .route("/sign-in", post(auth::sign_in))
        .route("/check-username-unique", get(auth::check_username_unique))
        // Public profile page
        .route("/send-message", post(messages::send_message))
        .route("/suggest-messages", post(ai::suggest_messages))
        .route("/messages-check", post(ai::check_message))
        .route("/anon-status/{username}", get(settings::anon_status))
        // Dashboard
        .route("/get-messages", get(messages::get_messages))
        .route("/delete-messages/{id}", delete(messages::delete_message))
        .route(
            "/accept-message",
            get(settings::get_accept_status).post(settings::set_accept_status),
        )
        .route(
            "/anon-shield",
            get(settings::get_anon_shield).post(settings::set_anon_shield),
        );

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
