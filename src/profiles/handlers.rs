use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{EducationRequest, ExperienceRequest, ProfileResponse, UpsertProfileRequest};
use super::repo::{self, EntryEdit};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(list_profiles).post(upsert_profile))
        .route("/profile/me", get(my_profile))
        .route(
            "/profile/user/:user_id",
            get(profile_by_user).delete(delete_account),
        )
        .route("/profile/experience", put(add_experience))
        .route("/profile/experience/:exp_id", delete(remove_experience))
        .route("/profile/education", put(add_education))
        .route("/profile/education/:edu_id", delete(remove_education))
        .route("/profile/github/:username", get(github_repos))
}

#[instrument(skip(state))]
pub async fn my_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let record = repo::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("There is no profile for this user"))?;
    Ok(Json(record.into()))
}

#[instrument(skip(state, payload))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let fields = payload.into_fields();
    let record = repo::upsert(&state.db, user_id, &fields).await?;
    info!(%user_id, "profile saved");
    Ok(Json(record.into()))
}

#[instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileResponse>>, ApiError> {
    let records = repo::list_all(&state.db).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user_id = parse_id(&user_id, "user_id is not a valid id")?;
    let record = repo::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("Profile not found"))?;
    Ok(Json(record.into()))
}

/// The `:user_id` path segment is accepted but ignored; deletion always
/// targets the token's own identity.
#[instrument(skip(state, _path_user_id))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(_path_user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    repo::delete_profile_and_user(&state.db, user_id).await?;
    info!(%user_id, "user removed");
    Ok(Json(json!({ "msg": "User removed" })))
}

#[instrument(skip(state, payload))]
pub async fn add_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ExperienceRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let record = repo::add_experience(&state.db, user_id, payload.into_entry())
        .await?
        .ok_or(ApiError::NotFound("There is no profile for this user"))?;
    Ok(Json(record.into()))
}

#[instrument(skip(state))]
pub async fn remove_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(exp_id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let exp_id = parse_id(&exp_id, "exp_id is not a valid id")?;
    match repo::remove_experience(&state.db, user_id, exp_id).await? {
        EntryEdit::Updated(record) => Ok(Json(record.into())),
        EntryEdit::NoProfile => Err(ApiError::NotFound("There is no profile for this user")),
        EntryEdit::EntryNotFound => Err(ApiError::NotFound("Experience not found")),
    }
}

#[instrument(skip(state, payload))]
pub async fn add_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<EducationRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let record = repo::add_education(&state.db, user_id, payload.into_entry())
        .await?
        .ok_or(ApiError::NotFound("There is no profile for this user"))?;
    Ok(Json(record.into()))
}

#[instrument(skip(state))]
pub async fn remove_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(edu_id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let edu_id = parse_id(&edu_id, "edu_id is not a valid id")?;
    match repo::remove_education(&state.db, user_id, edu_id).await? {
        EntryEdit::Updated(record) => Ok(Json(record.into())),
        EntryEdit::NoProfile => Err(ApiError::NotFound("There is no profile for this user")),
        EntryEdit::EntryNotFound => Err(ApiError::NotFound("Education not found")),
    }
}

#[instrument(skip(state))]
pub async fn github_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.github.list_repos(&username).await {
        Ok(Some(repos)) => Ok(Json(repos)),
        Ok(None) => Err(ApiError::GithubNotFound),
        Err(err) => {
            warn!(error = %err, %username, "github lookup failed");
            Err(ApiError::GithubNotFound)
        }
    }
}

fn parse_id(raw: &str, message: &str) -> Result<Uuid, ApiError> {
    raw.parse::<Uuid>()
        .map_err(|_| ApiError::Validation(vec![message.to_string()]))
}
