use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::User;

use super::dto::CreatePostRequest;
use super::repo::Post;

pub fn routes() -> Router<AppState> {
    Router::new().route("/posts", get(posts_placeholder).post(create_post))
}

pub async fn posts_placeholder() -> &'static str {
    "PostRoute"
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    let post = Post::create(&state.db, user_id, &payload.text, &user.name, &user.avatar).await?;
    info!(%user_id, post_id = %post.id, "post created");
    Ok(Json(post))
}
