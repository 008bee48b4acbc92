use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::AnalysisResult;
use normalizer::{normalize_events, NormalizedEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::ranking::{rank_repositories, RepoActivityRecord};
use crate::stats::{aggregate, daily_trends, DailyActivity, GlobalStats};
use crate::window::{filter_events, TimeWindow};

/// Everything the presentation layers need for one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub window: String,
    pub generated_at: DateTime<Utc>,
    pub events: Vec<NormalizedEvent>,
    pub stats: GlobalStats,
    pub ranking: Vec<RepoActivityRecord>,
    pub trends: BTreeMap<String, DailyActivity>,
}

impl ActivityReport {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Runs the full pipeline over one page of raw feed records.
#[instrument(skip(raw_events, window), fields(raw = raw_events.len(), window = %window))]
pub fn analyze(
    raw_events: &[Value],
    window: &TimeWindow,
    now: DateTime<Utc>,
) -> AnalysisResult<ActivityReport> {
    let events = normalize_events(raw_events)?;
    Ok(analyze_events(&events, window, now))
}

pub fn analyze_events(
    events: &[NormalizedEvent],
    window: &TimeWindow,
    now: DateTime<Utc>,
) -> ActivityReport {
    let filtered = filter_events(events, window, now);
    let stats = aggregate(&filtered);
    let ranking = rank_repositories(&filtered);
    let trends = daily_trends(&filtered);
    debug!(
        kept = filtered.len(),
        repos = stats.total_repos,
        "analysis complete"
    );
    ActivityReport {
        window: window.label(),
        generated_at: now,
        events: filtered,
        stats,
        ranking,
        trends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::RelativeWindow;
    use chrono::TimeZone;
    use common::AnalysisError;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    fn raw(id: &str, event_type: &str, created_at: &str, payload: Value) -> Value {
        json!({
            "id": id,
            "type": event_type,
            "created_at": created_at,
            "repo": { "name": "X/Y" },
            "payload": payload,
        })
    }

    #[test]
    fn pipeline_filters_then_reduces() {
        let raw_events = vec![
            raw("1", "PushEvent", "2024-06-10T08:00:00Z", json!({ "commits": [{}, {}] })),
            raw("2", "PushEvent", "2024-06-09T08:00:00Z", json!({ "commits": [] })),
            raw("3", "PushEvent", "2024-06-09T07:00:00Z", json!({ "commits": [{}] })),
            raw("4", "IssuesEvent", "2024-06-09T06:00:00Z", json!({ "action": "opened" })),
            raw("5", "IssuesEvent", "2024-06-09T05:00:00Z", json!({ "action": "closed" })),
            raw("6", "PushEvent", "2024-04-01T00:00:00Z", json!({ "commits": [{}, {}, {}] })),
        ];
        let report = analyze(&raw_events, &RelativeWindow::Weeks2.into(), now()).expect("report");
        assert_eq!(report.window, "2w");
        assert_eq!(report.events.len(), 5);
        assert_eq!(report.stats.total_commits, 3);
        assert_eq!(report.stats.total_issues, 1);
        assert_eq!(report.ranking.len(), 1);
        assert_eq!(report.ranking[0].total_activity, 5);
        assert_eq!(report.trends.len(), 2);
    }

    #[test]
    fn empty_feed_yields_empty_report() {
        let report = analyze(&[], &RelativeWindow::Days30.into(), now()).expect("report");
        assert!(report.is_empty());
        assert_eq!(report.stats.total_repos, 0);
        assert!(report.ranking.is_empty());
    }

    #[test]
    fn malformed_record_fails_whole_request() {
        let raw_events = vec![
            raw("1", "PushEvent", "2024-06-10T08:00:00Z", json!({})),
            raw("2", "PushEvent", "10/06/2024", json!({})),
        ];
        let err = analyze(&raw_events, &RelativeWindow::Days30.into(), now()).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
    }
}
