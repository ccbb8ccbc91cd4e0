use axum::Router;

use crate::state::AppState;

pub mod avatar;
pub mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
