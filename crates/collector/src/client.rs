use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use common::config::GithubConfig;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::metrics;

const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum GithubApiError {
    #[error("github user {username:?} not found")]
    NotFound { username: String },
    #[error("github api rate limit exceeded")]
    RateLimited { reset: Option<i64> },
    #[error("github api error: {status} for {endpoint}")]
    Http {
        status: StatusCode,
        endpoint: String,
    },
}

impl GithubApiError {
    pub fn status(status: StatusCode, endpoint: impl Into<String>) -> Self {
        Self::Http {
            status,
            endpoint: endpoint.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match *self {
            GithubApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            GithubApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GithubApiError::Http { status, .. } => status,
        }
    }
}

#[async_trait]
pub trait GithubClient: Send + Sync {
    /// One page of the user's public event feed, newest first.
    async fn list_user_events(&self, username: &str, page: u32, per_page: u32)
        -> Result<Vec<Value>>;
}

pub struct ReqwestGithubClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl ReqwestGithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base = Url::parse(&base_url)
            .with_context(|| format!("invalid github base url {:?}", config.base_url))?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base,
            token: config.token.clone(),
        })
    }

    fn events_url(&self, username: &str, page: u32, per_page: u32) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("github base url cannot carry a path"))?
            .pop_if_empty()
            .extend(["users", username, "events"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());
        Ok(url)
    }

    #[instrument(skip(self, url), fields(url = %url))]
    async fn get_json(&self, url: Url, username: &str) -> Result<Value> {
        let endpoint = url.path().trim_start_matches('/').to_string();
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let started = Instant::now();
        let response = request.send().await;
        metrics::FETCH_LATENCY_SECONDS.observe(started.elapsed().as_secs_f64());
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                metrics::FETCH_REQUESTS_TOTAL
                    .with_label_values(&["transport_error"])
                    .inc();
                return Err(err.into());
            }
        };

        let status = response.status();
        debug!(endpoint = %endpoint, status = %status, "github responded");
        if status.is_success() {
            metrics::FETCH_REQUESTS_TOTAL.with_label_values(&["success"]).inc();
            return Ok(response.json::<Value>().await?);
        }

        let err = match status {
            StatusCode::NOT_FOUND => {
                metrics::FETCH_REQUESTS_TOTAL.with_label_values(&["not_found"]).inc();
                GithubApiError::NotFound {
                    username: username.to_string(),
                }
            }
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                metrics::FETCH_REQUESTS_TOTAL
                    .with_label_values(&["rate_limited"])
                    .inc();
                let reset = response
                    .headers()
                    .get("x-ratelimit-reset")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<i64>().ok());
                warn!(status = %status, reset, "github rate limit hit");
                GithubApiError::RateLimited { reset }
            }
            _ => {
                metrics::FETCH_REQUESTS_TOTAL.with_label_values(&["error"]).inc();
                GithubApiError::status(status, endpoint)
            }
        };
        Err(err.into())
    }
}

#[async_trait]
impl GithubClient for ReqwestGithubClient {
    async fn list_user_events(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>> {
        let url = self.events_url(username, page, per_page)?;
        match self.get_json(url, username).await? {
            Value::Array(items) => Ok(items),
            _ => Err(anyhow!("expected array response for {username:?} events")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ReqwestGithubClient {
        let config = GithubConfig {
            base_url: base_url.to_string(),
            ..GithubConfig::default()
        };
        ReqwestGithubClient::new(&config).expect("client")
    }

    #[test]
    fn events_url_carries_paging_query() {
        let url = client("https://api.github.com/")
            .events_url("octocat", 1, 100)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/users/octocat/events?page=1&per_page=100"
        );
    }

    #[test]
    fn base_url_without_trailing_slash_keeps_prefix() {
        let url = client("http://localhost:9000/github")
            .events_url("a b", 2, 10)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/github/users/a%20b/events?page=2&per_page=10"
        );
    }

    #[test]
    fn error_variants_map_to_statuses() {
        let not_found = GithubApiError::NotFound {
            username: "ghost".into(),
        };
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "github user \"ghost\" not found");
        assert_eq!(
            GithubApiError::RateLimited { reset: None }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
