use serde::Deserialize;

/// Registration body. Defaults keep absent fields inside our validation
/// pipeline rather than failing at deserialization.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}
