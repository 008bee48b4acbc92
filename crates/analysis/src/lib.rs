pub mod ranking;
pub mod report;
pub mod stats;
pub mod window;

pub use ranking::{
    rank_repositories, rank_repositories_with, ActivityWeights, RepoActivityRecord,
    COMMIT_WEIGHT, DEFAULT_WEIGHTS, ISSUE_WEIGHT, PR_WEIGHT,
};
pub use report::{analyze, analyze_events, ActivityReport};
pub use stats::{aggregate, daily_trends, DailyActivity, GlobalStats};
pub use window::{filter_events, filter_events_now, RelativeWindow, TimeWindow};
