use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub text: String,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Vec<String> {
        if self.text.is_empty() {
            vec!["Text is required".to_string()]
        } else {
            Vec::new()
        }
    }
}
