use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for every handler. Conversion to an HTTP response happens
/// in exactly one place so routes cannot drift apart on status codes or body
/// shapes.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Field-level input failures, reported together in declaration order.
    #[error("invalid request")]
    Validation(Vec<String>),

    /// Login failure. One message for unknown email and wrong password, so
    /// responses do not reveal which emails are registered.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserExists,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("No github profile found")]
    GithubNotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn errors_body(msgs: &[String]) -> serde_json::Value {
    json!({
        "errors": msgs.iter().map(|m| json!({ "msg": m })).collect::<Vec<_>>()
    })
}

fn msg_body(msg: &str) -> serde_json::Value {
    json!({ "msg": msg })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(msgs) => (StatusCode::BAD_REQUEST, errors_body(msgs)),
            ApiError::InvalidCredentials | ApiError::UserExists => (
                StatusCode::BAD_REQUEST,
                errors_body(std::slice::from_ref(&self.to_string())),
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg_body(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg_body(msg)),
            ApiError::GithubNotFound => (StatusCode::NOT_FOUND, msg_body(&self.to_string())),
            ApiError::Internal(err) => {
                // Full chain goes to the log; the client only sees a fixed body.
                tracing::error!(error = ?err, "handler failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg_body("Server error"))
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    #[tokio::test]
    async fn validation_is_400_with_error_list_in_order() {
        let resp = ApiError::Validation(vec![
            "Your name is required".into(),
            "Please enter a valid email".into(),
        ])
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["errors"][0]["msg"], "Your name is required");
        assert_eq!(body["errors"][1]["msg"], "Please enter a valid email");
    }

    #[tokio::test]
    async fn invalid_credentials_uses_the_errors_shape() {
        let resp = ApiError::InvalidCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["errors"][0]["msg"], "Invalid credentials");
    }

    #[tokio::test]
    async fn duplicate_user_is_400() {
        let resp = ApiError::UserExists.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["errors"][0]["msg"], "User already exists");
    }

    #[tokio::test]
    async fn unauthorized_and_not_found_use_msg_bodies() {
        let resp = ApiError::Unauthorized("Token is not valid").into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await["msg"], "Token is not valid");

        let resp = ApiError::NotFound("Profile not found").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["msg"], "Profile not found");
    }

    #[tokio::test]
    async fn github_miss_is_404() {
        let resp = ApiError::GithubNotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["msg"], "No github profile found");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let resp = ApiError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["msg"], "Server error");
    }
}
