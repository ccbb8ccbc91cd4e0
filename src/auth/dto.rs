use serde::{Deserialize, Serialize};

/// Login body. Fields default to empty so absent values flow through the
/// same validation path as blank ones instead of a serde rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returned by registration and login alike.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
