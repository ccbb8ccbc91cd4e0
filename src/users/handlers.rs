use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{dto::TokenResponse, is_valid_email, jwt::JwtKeys, password},
    error::ApiError,
    state::AppState,
    users::{avatar, dto::RegisterRequest, repo::User},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/users", post(register))
}

fn validate(payload: &RegisterRequest) -> Vec<String> {
    let mut errors = Vec::new();
    if payload.name.trim().is_empty() {
        errors.push("Your name is required".to_string());
    }
    if !is_valid_email(&payload.email) {
        errors.push("Please enter a valid email".to_string());
    }
    if payload.password.len() < 8 {
        errors.push("Password must be at least 8 characters long".to_string());
    }
    errors
}

/// POST /api/users: register a new account and hand out a token.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let errors = validate(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "registration for an existing email");
        return Err(ApiError::UserExists);
    }

    let avatar = avatar::gravatar_url(&payload.email);
    let hash = password::hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.name, &payload.email, &hash, &avatar).await?;

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_failures_are_reported_in_declaration_order() {
        let errors = validate(&RegisterRequest {
            name: "   ".into(),
            email: "nope".into(),
            password: "short".into(),
        });
        assert_eq!(
            errors,
            vec![
                "Your name is required".to_string(),
                "Please enter a valid email".to_string(),
                "Password must be at least 8 characters long".to_string(),
            ]
        );
    }

    #[test]
    fn eight_character_password_passes() {
        let errors = validate(&RegisterRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "12345678".into(),
        });
        assert!(errors.is_empty());
    }

    #[test]
    fn seven_character_password_fails() {
        let errors = validate(&RegisterRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "1234567".into(),
        });
        assert_eq!(
            errors,
            vec!["Password must be at least 8 characters long".to_string()]
        );
    }
}
