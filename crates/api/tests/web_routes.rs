use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use analysis::RelativeWindow;
use api::{build_router, ApiState, ReportCache};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use collector::{ActivityService, GithubApiError, GithubClient};
use serde_json::{json, Value};
use tower::util::ServiceExt;

#[derive(Default)]
struct StubClient {
    calls: AtomicUsize,
}

fn recent(hours: i64) -> String {
    (Utc::now() - chrono::Duration::hours(hours))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

#[async_trait::async_trait]
impl GithubClient for StubClient {
    async fn list_user_events(
        &self,
        username: &str,
        _page: u32,
        _per_page: u32,
    ) -> anyhow::Result<Vec<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match username {
            "octocat" => Ok(vec![
                json!({
                    "id": "1",
                    "type": "PushEvent",
                    "created_at": recent(1),
                    "repo": { "name": "octocat/hello" },
                    "payload": { "commits": [{}, {}] }
                }),
                json!({
                    "id": "2",
                    "type": "PullRequestEvent",
                    "created_at": recent(5),
                    "repo": { "name": "octocat/<lib>" },
                    "payload": { "action": "opened", "pull_request": { "number": 1 } }
                }),
            ]),
            "idle" => Ok(Vec::new()),
            "limited" => Err(GithubApiError::RateLimited { reset: None }.into()),
            other => Err(GithubApiError::NotFound {
                username: other.to_string(),
            }
            .into()),
        }
    }
}

fn app() -> (Router, Arc<StubClient>) {
    let client = Arc::new(StubClient::default());
    let state = Arc::new(ApiState {
        service: ActivityService::new(client.clone(), 100),
        cache: ReportCache::new(8, Duration::from_secs(60)),
        default_window: RelativeWindow::Days30,
        metrics_path: "/metrics".to_string(),
    });
    (build_router(state), client)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn index_renders_the_form() {
    let (app, _) = app();
    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("name=\"username\""));
    assert!(page.contains("<option value=\"30d\" selected>30d</option>"));
}

#[tokio::test]
async fn analyze_renders_results_with_charts_and_links() {
    let (app, _) = app();
    let response = app
        .oneshot(post_form("username=octocat&window=1w"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("octocat/hello"));
    assert!(page.contains("octocat/&lt;lib&gt;"));
    assert!(page.contains("<svg"));
    assert!(page.contains("/export/json?username=octocat&amp;window=1w"));
}

#[tokio::test]
async fn analyze_rejects_missing_username_and_bad_window() {
    let (app, client) = app();
    let response = app.clone().oneshot(post_form("username=&window=1w")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "username is required");

    let response = app.oneshot(post_form("username=octocat&window=5y")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn analyze_reports_missing_activity_and_users() {
    let (app, _) = app();
    let response = app.clone().oneshot(post_form("username=idle")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(post_form("username=ghost")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(post_form("username=limited")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn exports_are_served_from_the_report_cache() {
    let (app, client) = app();
    let response = app
        .clone()
        .oneshot(get("/export/csv?username=octocat&window=1w"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"github_activity.csv\""
    );
    let csv = body_text(response).await;
    assert!(csv.starts_with("id,type,created_at,repo_name,details\n"));
    assert_eq!(csv.lines().count(), 3);

    let response = app
        .clone()
        .oneshot(get("/export/pdf?username=OctoCat&window=1w"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);

    let response = app
        .oneshot(get("/export/xlsx?username=octocat"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn activity_endpoint_returns_report_json() {
    let (app, _) = app();
    let response = app
        .oneshot(get("/api/activity?username=octocat&window=24h"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(report["window"], "24h");
    assert_eq!(report["stats"]["total_commits"], 2);
    assert_eq!(report["stats"]["total_prs"], 1);
    assert_eq!(report["ranking"][0]["repo"], "octocat/<lib>");
}

#[tokio::test]
async fn health_and_metrics_are_exposed() {
    let (app, _) = app();
    let response = app.clone().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
