use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use normalizer::models::PUSH_EVENT;
use normalizer::NormalizedEvent;
use serde::{Deserialize, Serialize};

pub const COMMIT_WEIGHT: u64 = 1;
pub const ISSUE_WEIGHT: u64 = 2;
pub const PR_WEIGHT: u64 = 3;

pub const DEFAULT_WEIGHTS: ActivityWeights = ActivityWeights {
    commit: COMMIT_WEIGHT,
    issue: ISSUE_WEIGHT,
    pull_request: PR_WEIGHT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityWeights {
    pub commit: u64,
    pub issue: u64,
    pub pull_request: u64,
}

impl Default for ActivityWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl ActivityWeights {
    pub fn score(&self, commits: u64, issues: u64, prs: u64) -> u64 {
        commits
            .saturating_mul(self.commit)
            .saturating_add(issues.saturating_mul(self.issue))
            .saturating_add(prs.saturating_mul(self.pull_request))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoActivityRecord {
    pub repo: String,
    pub commits: u64,
    pub issues: u64,
    pub prs: u64,
    pub total_activity: u64,
    pub last_activity: DateTime<Utc>,
}

impl RepoActivityRecord {
    fn new(repo: &str, first_seen: DateTime<Utc>) -> Self {
        Self {
            repo: repo.to_string(),
            commits: 0,
            issues: 0,
            prs: 0,
            total_activity: 0,
            last_activity: first_seen,
        }
    }

    fn fold(&mut self, event: &NormalizedEvent, weights: &ActivityWeights) {
        self.last_activity = self.last_activity.max(event.created_at);
        if event.event_type == PUSH_EVENT {
            self.commits = self.commits.saturating_add(event.commits());
        } else if event.is_opened_issue() {
            self.issues += 1;
        } else if event.is_opened_pull_request() {
            self.prs += 1;
        }
        self.total_activity = weights.score(self.commits, self.issues, self.prs);
    }
}

/// Highest score first, then most recent activity, then repository name so
/// that equal keys always come out in the same order.
fn ranking_order(a: &RepoActivityRecord, b: &RepoActivityRecord) -> Ordering {
    b.total_activity
        .cmp(&a.total_activity)
        .then_with(|| b.last_activity.cmp(&a.last_activity))
        .then_with(|| a.repo.cmp(&b.repo))
}

pub fn rank_repositories(events: &[NormalizedEvent]) -> Vec<RepoActivityRecord> {
    rank_repositories_with(events, &DEFAULT_WEIGHTS)
}

pub fn rank_repositories_with(
    events: &[NormalizedEvent],
    weights: &ActivityWeights,
) -> Vec<RepoActivityRecord> {
    let mut by_repo: HashMap<&str, RepoActivityRecord> = HashMap::new();
    for event in events {
        by_repo
            .entry(event.repo_name.as_str())
            .or_insert_with(|| RepoActivityRecord::new(&event.repo_name, event.created_at))
            .fold(event, weights);
    }

    let mut ranked: Vec<RepoActivityRecord> = by_repo
        .into_values()
        .map(|mut record| {
            record.total_activity = weights.score(record.commits, record.issues, record.prs);
            record
        })
        .collect();
    ranked.sort_by(ranking_order);
    ranked
}
