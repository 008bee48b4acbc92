use std::collections::{BTreeMap, HashSet};

use normalizer::models::{CREATE_EVENT, ISSUES_EVENT, PULL_REQUEST_EVENT, PUSH_EVENT};
use normalizer::NormalizedEvent;
use serde::{Deserialize, Serialize};

pub const REPOSITORY_REF: &str = "repository";
pub const BRANCH_REF: &str = "branch";

/// Totals over one filtered batch of events. Maps are ordered so that
/// renderings of the same batch are byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_commits: u64,
    pub total_issues: u64,
    pub total_prs: u64,
    pub total_repos: u64,
    pub repos_created: u64,
    pub branches_created: u64,
    pub events_by_type: BTreeMap<String, u64>,
    pub activity_by_day: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub commits: u64,
    pub issues: u64,
    pub prs: u64,
    pub total: u64,
}

#[derive(Default)]
struct StatsAccumulator<'a> {
    stats: GlobalStats,
    repos: HashSet<&'a str>,
}

impl<'a> StatsAccumulator<'a> {
    fn fold(&mut self, event: &'a NormalizedEvent) {
        *self
            .stats
            .events_by_type
            .entry(event.event_type.clone())
            .or_default() += 1;
        *self
            .stats
            .activity_by_day
            .entry(event.date().to_string())
            .or_default() += 1;
        self.repos.insert(event.repo_name.as_str());

        match event.event_type.as_str() {
            PUSH_EVENT => {
                self.stats.total_commits = self.stats.total_commits.saturating_add(event.commits())
            }
            ISSUES_EVENT if event.is_opened_issue() => self.stats.total_issues += 1,
            PULL_REQUEST_EVENT if event.is_opened_pull_request() => self.stats.total_prs += 1,
            CREATE_EVENT => match event.created_ref_type() {
                Some(REPOSITORY_REF) => self.stats.repos_created += 1,
                Some(BRANCH_REF) => self.stats.branches_created += 1,
                _ => {}
            },
            _ => {}
        }
    }

    fn finish(self) -> GlobalStats {
        GlobalStats {
            total_repos: self.repos.len() as u64,
            ..self.stats
        }
    }
}

pub fn aggregate(events: &[NormalizedEvent]) -> GlobalStats {
    let mut acc = StatsAccumulator::default();
    for event in events {
        acc.fold(event);
    }
    acc.finish()
}

/// Per-day breakdown used by the timeline chart.
pub fn daily_trends(events: &[NormalizedEvent]) -> BTreeMap<String, DailyActivity> {
    let mut days: BTreeMap<String, DailyActivity> = BTreeMap::new();
    for event in events {
        let day = days.entry(event.date().to_string()).or_default();
        day.total += 1;
        match event.event_type.as_str() {
            PUSH_EVENT => day.commits = day.commits.saturating_add(event.commits()),
            ISSUES_EVENT if event.is_opened_issue() => day.issues += 1,
            PULL_REQUEST_EVENT if event.is_opened_pull_request() => day.prs += 1,
            _ => {}
        }
    }
    days
}
