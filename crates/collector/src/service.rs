use std::sync::Arc;

use analysis::{analyze, ActivityReport, TimeWindow};
use anyhow::Result;
use chrono::{DateTime, Utc};
use common::config::GithubConfig;
use common::AnalysisError;
use tracing::{info, instrument};

use crate::client::{GithubClient, ReqwestGithubClient};
use crate::metrics;

const FIRST_PAGE: u32 = 1;

/// Fetches a user's feed and runs it through the analysis pipeline.
#[derive(Clone)]
pub struct ActivityService {
    client: Arc<dyn GithubClient>,
    per_page: u32,
}

impl ActivityService {
    pub fn new(client: Arc<dyn GithubClient>, per_page: u32) -> Self {
        Self { client, per_page }
    }

    pub fn from_config(config: &GithubConfig) -> Result<Self> {
        let client = ReqwestGithubClient::new(config)?;
        Ok(Self::new(Arc::new(client), config.per_page))
    }

    pub async fn analyze_user(
        &self,
        username: &str,
        window: &TimeWindow,
    ) -> Result<ActivityReport> {
        self.analyze_user_at(username, window, Utc::now()).await
    }

    #[instrument(skip(self, window), fields(window = %window))]
    pub async fn analyze_user_at(
        &self,
        username: &str,
        window: &TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<ActivityReport> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AnalysisError::invalid("username must not be empty").into());
        }

        let outcome = self.run(username, window, now).await;
        let label = match &outcome {
            Ok(report) if report.is_empty() => "empty",
            Ok(_) => "ok",
            Err(_) => "error",
        };
        metrics::ANALYSIS_RUNS_TOTAL.with_label_values(&[label]).inc();
        outcome
    }

    async fn run(
        &self,
        username: &str,
        window: &TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<ActivityReport> {
        let raw_events = self
            .client
            .list_user_events(username, FIRST_PAGE, self.per_page)
            .await?;
        let report = analyze(&raw_events, window, now)?;
        for (event_type, count) in &report.stats.events_by_type {
            metrics::NORMALIZED_EVENTS_TOTAL
                .with_label_values(&[event_type.as_str()])
                .inc_by(*count);
        }
        info!(
            username,
            fetched = raw_events.len(),
            kept = report.events.len(),
            "user activity analyzed"
        );
        Ok(report)
    }
}
