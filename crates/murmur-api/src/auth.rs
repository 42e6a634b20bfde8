use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rand::Rng;
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use uuid::Uuid;

use murmur_db::models::{NewUser, PendingUserOutcome, UserRow, parse_timestamp};
use murmur_types::api::{
    ApiResponse, SignInRequest, SignInResponse, SignUpRequest, UsernameQuery, VerifyCodeRequest,
};
use murmur_types::models::User;

use crate::error::ApiError;
use crate::extract::{ValidJson, ValidQuery};
use crate::session::issue_token;
use crate::state::{AppState, db_call};

pub async fn sign_up(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password_hash = hash_password(&req.password)?;
    let verify_code = generate_verify_code();
    let user = NewUser {
        id: Uuid::new_v4().to_string(),
        username: req.username.clone(),
        email: req.email.clone(),
        password_hash,
        verify_code: verify_code.clone(),
        verify_code_expiry: chrono::Utc::now() + state.verify_code_ttl,
    };

    let outcome = db_call(&state, move |db| db.register_pending_user(&user)).await?;
    match outcome {
        PendingUserOutcome::Created => {}
        PendingUserOutcome::UsernameTaken => {
            return Err(ApiError::Conflict("Username is already taken".into()));
        }
        PendingUserOutcome::EmailTaken => {
            return Err(ApiError::Conflict("User already exists with this email".into()));
        }
    }
    info!("Registered unverified user {}", req.username);

    // The user row stays even if the email cannot be sent.
    state
        .mailer
        .send_verification(&req.email, &req.username, &verify_code)
        .await
        .map_err(|e| ApiError::upstream("Failed to send verification email", e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "User registered successfully. Please verify your email",
        )),
    ))
}

pub async fn verify_code(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<VerifyCodeRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let username = req.username.clone();
    let user = db_call(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if user.is_verified {
        return Err(ApiError::BadRequest("Account is already verified".into()));
    }

    let not_expired = parse_timestamp(&user.verify_code_expiry)
        .is_some_and(|expiry| expiry > chrono::Utc::now());
    if !not_expired {
        return Err(ApiError::BadRequest(
            "Verification code has expired, please sign up again to get a new code".into(),
        ));
    }
    if !codes_match(&user.verify_code, &req.code) {
        warn!("Wrong verification code for {}", user.username);
        return Err(ApiError::BadRequest("Incorrect verification code".into()));
    }

    let id = user.id.clone();
    db_call(&state, move |db| db.mark_verified(&id)).await?;
    info!("User {} verified", user.username);

    Ok(Json(ApiResponse::ok("Account verified successfully")))
}

pub async fn sign_in(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SignInRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid credentials".into());

    let identifier = req.identifier.trim().to_string();
    let user = db_call(&state, move |db| db.get_verified_user_by_identifier(&identifier))
        .await?
        .ok_or_else(invalid)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash unreadable: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| invalid())?;

    let user = user_view(&user)?;
    let token = issue_token(&state.jwt_secret, user.id, &user.username, state.session_ttl)?;
    info!("User {} signed in", user.username);

    Ok(Json(SignInResponse {
        success: true,
        token,
        user,
    }))
}

pub async fn check_username_unique(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<UsernameQuery>,
) -> Result<Json<ApiResponse>, ApiError> {
    let taken = db_call(&state, move |db| db.get_verified_user_by_username(&query.username))
        .await?
        .is_some();

    if taken {
        return Err(ApiError::BadRequest("Username is already taken".into()));
    }
    Ok(Json(ApiResponse::ok("Username is unique")))
}

/// Argon2id with a fresh random salt.
fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))?
        .to_string())
}

/// Constant-time comparison of the stored and submitted codes.
fn codes_match(expected: &str, given: &str) -> bool {
    expected.as_bytes().ct_eq(given.as_bytes()).into()
}

/// Six decimal digits, leading digit non-zero.
pub fn generate_verify_code() -> String {
    rand::rng().random_range(100_000..1_000_000u32).to_string()
}

pub(crate) fn user_view(row: &UserRow) -> Result<User, ApiError> {
    let id = row
        .id
        .parse()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt user id '{}': {}", row.id, e)))?;

    Ok(User {
        id,
        username: row.username.clone(),
        email: row.email.clone(),
        is_verified: row.is_verified,
        is_accepting_messages: row.is_accepting_messages,
        anon_shield: row.anon_shield,
        created_at: parse_timestamp(&row.created_at).unwrap_or_else(|| {
            warn!("Corrupt created_at '{}' on user '{}'", row.created_at, row.id);
            chrono::DateTime::default()
        }),
    })
}
