use std::sync::Arc;
use std::time::Duration;

use analysis::{ActivityReport, RelativeWindow, TimeWindow};
use axum::extract::{Form, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use collector::ActivityService;
use common::config::AppConfig;
use exporter::{activity_distribution, activity_timeline, commit_histogram, ExportFormat};
use prometheus::Encoder;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::cache::ReportCache;
use crate::error::{ApiError, ApiResult};
use crate::html::{self, Charts};

pub struct ApiState {
    pub service: ActivityService,
    pub cache: ReportCache,
    pub default_window: RelativeWindow,
    pub metrics_path: String,
}

impl ApiState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            service: ActivityService::from_config(&config.github)?,
            cache: ReportCache::new(
                config.web.cache_capacity,
                Duration::from_secs(config.web.cache_ttl_secs),
            ),
            default_window: config.export.default_window.parse()?,
            metrics_path: config.web.metrics_path.clone(),
        })
    }

    fn window(&self, token: Option<&str>) -> ApiResult<TimeWindow> {
        match token.map(str::trim).filter(|token| !token.is_empty()) {
            Some(token) => Ok(token.parse()?),
            None => Ok(self.default_window.into()),
        }
    }

    /// Cached report for the pair, running the analysis on a miss.
    async fn report(&self, username: &str, window: &TimeWindow) -> ApiResult<Arc<ActivityReport>> {
        let key = ReportCache::key(username, &window.label());
        if let Some(report) = self.cache.get(&key).await {
            debug!(key = %key, "report cache hit");
            return Ok(report);
        }
        let report = Arc::new(self.service.analyze_user(username, window).await?);
        self.cache.put(key, report.clone()).await;
        Ok(report)
    }
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    let metrics_path = state.metrics_path.clone();
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/export/:format", get(export))
        .route("/api/activity", get(activity))
        .route("/healthz", get(healthz))
        .route(&metrics_path, get(metrics))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ReportParams {
    username: Option<String>,
    window: Option<String>,
}

impl ReportParams {
    fn username(&self) -> ApiResult<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::bad_request("username is required"))
    }
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn index(State(state): State<Arc<ApiState>>) -> ApiResult<Html<String>> {
    Ok(Html(html::render_form(state.default_window)?))
}

#[instrument(skip(state))]
async fn analyze(
    State(state): State<Arc<ApiState>>,
    Form(params): Form<ReportParams>,
) -> ApiResult<Html<String>> {
    let username = params.username()?;
    let window = state.window(params.window.as_deref())?;
    let report = state.report(username, &window).await?;
    if report.is_empty() {
        return Err(ApiError::not_found(format!(
            "no activity for {username} in window {window}"
        )));
    }

    let charts = Charts {
        commit_histogram: commit_histogram(&report)?,
        activity_distribution: activity_distribution(&report)?,
        activity_timeline: activity_timeline(&report)?,
    };
    Ok(Html(html::render_results(
        username, &window, &report, &charts,
    )?))
}

#[instrument(skip(state))]
async fn export(
    State(state): State<Arc<ApiState>>,
    Path(format): Path<String>,
    Query(params): Query<ReportParams>,
) -> ApiResult<impl IntoResponse> {
    let format: ExportFormat = format.parse()?;
    let username = params.username()?;
    let window = state.window(params.window.as_deref())?;
    let report = state.report(username, &window).await?;
    let body = format.render(&report)?;
    let disposition = format!(
        "attachment; filename=\"github_activity.{}\"",
        format.extension()
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[instrument(skip(state))]
async fn activity(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<ReportParams>,
) -> ApiResult<Json<ActivityReport>> {
    let username = params.username()?;
    let window = state.window(params.window.as_deref())?;
    let report = state.report(username, &window).await?;
    Ok(Json(ActivityReport::clone(&report)))
}

async fn metrics() -> ApiResult<impl IntoResponse> {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    let content_type = encoder.format_type().to_string();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        buffer,
    ))
}
