use axum::{
    extract::{FromRef, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, TokenResponse},
        is_valid_email,
        jwt::{AuthUser, JwtKeys},
        password,
    },
    error::ApiError,
    state::AppState,
    users::repo::User,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth", get(current_user).post(login))
}

/// GET /api/auth: the caller's own user record, password hash omitted.
#[instrument(skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(user))
}

fn validate(payload: &LoginRequest) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_valid_email(&payload.email) {
        errors.push("Please enter a valid email".to_string());
    }
    if payload.password.is_empty() {
        errors.push("Password is required".to_string());
    }
    errors
}

/// POST /api/auth: authenticate and hand out a token. Unknown email and
/// wrong password produce the identical response.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let errors = validate(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !password::verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}
