use anyhow::Context;
use axum::async_trait;
use serde_json::Value;

use crate::config::GithubConfig;

/// Narrow client over the GitHub repository-listing endpoint. Responses are
/// passed through as raw JSON; `None` means GitHub answered with a
/// non-success status (unknown user, rate limit, ...).
#[async_trait]
pub trait GithubClient: Send + Sync {
    async fn list_repos(&self, username: &str) -> anyhow::Result<Option<Value>>;
}

#[derive(Clone)]
pub struct GithubApi {
    http: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl GithubApi {
    pub fn new(config: &GithubConfig) -> anyhow::Result<Self> {
        // GitHub rejects requests without a User-Agent.
        let http = reqwest::Client::builder()
            .user_agent(format!("devconnector/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }
}

#[async_trait]
impl GithubClient for GithubApi {
    async fn list_repos(&self, username: &str) -> anyhow::Result<Option<Value>> {
        let url = format!("https://api.github.com/users/{username}/repos");

        let mut query: Vec<(&str, String)> = vec![
            ("per_page", "5".to_string()),
            ("sort", "created".to_string()),
            ("direction", "desc".to_string()),
        ];
        if let (Some(id), Some(secret)) = (&self.client_id, &self.client_secret) {
            query.push(("client_id", id.clone()));
            query.push(("client_secret", secret.clone()));
        }

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .context("github request failed")?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), %username, "github returned non-success");
            return Ok(None);
        }

        let repos = response
            .json::<Value>()
            .await
            .context("github response was not json")?;
        Ok(Some(repos))
    }
}
