use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod github;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
