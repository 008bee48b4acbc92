use std::io::Cursor;
use std::sync::Arc;

use analysis::{RelativeWindow, TimeWindow};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use collector::{ActivityService, Cli, GithubApiError, GithubClient, RunOutcome};
use exporter::ExportService;
use serde_json::{json, Value};

struct FeedClient;

fn recent(hours: i64) -> String {
    (Utc::now() - Duration::hours(hours))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

#[async_trait]
impl GithubClient for FeedClient {
    async fn list_user_events(
        &self,
        username: &str,
        _page: u32,
        _per_page: u32,
    ) -> Result<Vec<Value>> {
        match username {
            "octocat" => Ok(vec![
                json!({
                    "id": "1",
                    "type": "PushEvent",
                    "created_at": recent(2),
                    "repo": { "name": "octocat/hello" },
                    "payload": { "commits": [{}, {}, {}] }
                }),
                json!({
                    "id": "2",
                    "type": "CreateEvent",
                    "created_at": recent(3),
                    "repo": { "name": "octocat/fresh" },
                    "payload": { "ref_type": "repository" }
                }),
            ]),
            "idle" => Ok(vec![json!({
                "id": "9",
                "type": "PushEvent",
                "created_at": recent(24 * 60),
                "repo": { "name": "idle/old" },
                "payload": { "commits": [{}] }
            })]),
            "limited" => Err(GithubApiError::RateLimited { reset: None }.into()),
            "flaky" => Err(GithubApiError::status(
                reqwest::StatusCode::BAD_GATEWAY,
                "users/flaky/events",
            )
            .into()),
            other => Err(GithubApiError::NotFound {
                username: other.to_string(),
            }
            .into()),
        }
    }
}

fn cli(exports: Option<ExportService>) -> Cli {
    Cli::new(
        ActivityService::new(Arc::new(FeedClient), 100),
        exports,
        TimeWindow::Relative(RelativeWindow::Days30),
    )
}

async fn session(cli: &Cli, input: &str) -> String {
    let mut output = Vec::new();
    cli.run_interactive(Cursor::new(input.to_string()), &mut output)
        .await
        .expect("session");
    String::from_utf8(output).expect("utf8")
}

#[tokio::test]
async fn single_run_prints_totals_and_ranking() {
    let mut out = Vec::new();
    let outcome = cli(None)
        .run_once("octocat", &RelativeWindow::Hours24.into(), &mut out)
        .await
        .expect("run");
    let text = String::from_utf8(out).unwrap();
    assert_eq!(outcome, RunOutcome::Completed);
    assert!(text.contains("Commits:              3"));
    assert!(text.contains("Repositories created: 1"));
    assert!(text.contains("1. octocat/hello (score 3: 3 commits, 0 issues, 0 PRs)"));
    assert!(!text.contains("Saved"));
}

#[tokio::test]
async fn loop_reprompts_after_unknown_user_and_bad_window() {
    let text = session(&cli(None), "nobody\n\noctocat\n3d\n1w\nn\n").await;
    assert!(text.contains("User nobody was not found on GitHub."));
    assert!(text.contains("unknown time window \"3d\""));
    assert!(text.contains("Activity for octocat (window 1w)"));
    assert!(text.contains("Analyze another user? (y/N): "));
    assert!(text.trim_end().ends_with("Goodbye."));
}

#[tokio::test]
async fn loop_reports_empty_window_and_continues() {
    let text = session(&cli(None), "idle\n24h\noctocat\n\ny\n").await;
    assert!(text.contains("No activity found for idle in window 24h."));
    assert!(text.contains("Activity for octocat (window 30d)"));
    // input ends after "y": the loop stops at the next username prompt
    assert!(text.ends_with("GitHub username: "));
}

#[tokio::test]
async fn loop_exits_on_rate_limit() {
    let text = session(&cli(None), "limited\n\noctocat\n\n").await;
    assert!(text.contains("rate limit exceeded"));
    assert!(!text.contains("Activity for octocat"));
}

#[tokio::test]
async fn server_errors_offer_a_retry() {
    let text = session(&cli(None), "flaky\n\ny\noctocat\n\nn\n").await;
    assert!(text.contains("An error occurred: http error: github api error: 502 Bad Gateway"));
    assert!(text.contains("Try again? (y/N): "));
    assert!(text.contains("Activity for octocat (window 30d)"));
    assert!(text.trim_end().ends_with("Goodbye."));

    let text = session(&cli(None), "flaky\n24h\n\noctocat\n").await;
    assert_eq!(text.matches("An error occurred").count(), 1);
    assert!(!text.contains("Activity for octocat"));
    assert!(text.trim_end().ends_with("Goodbye."));
}

#[tokio::test]
async fn completed_run_writes_charts_and_exports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut out = Vec::new();
    cli(Some(ExportService::new(dir.path())))
        .run_once("octocat", &RelativeWindow::Week1.into(), &mut out)
        .await
        .expect("run");
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Saved ").count(), 6);
    for sub_dir in ["charts", "csv", "json", "pdf"] {
        let entries = std::fs::read_dir(dir.path().join(sub_dir)).expect(sub_dir).count();
        assert!(entries > 0, "{sub_dir} is empty");
    }
}
