use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const PUSH_EVENT: &str = "PushEvent";
pub const ISSUES_EVENT: &str = "IssuesEvent";
pub const PULL_REQUEST_EVENT: &str = "PullRequestEvent";
pub const CREATE_EVENT: &str = "CreateEvent";

pub const OPENED_ACTION: &str = "opened";

/// Type-specific fields extracted from an event payload. The variant is
/// chosen by the event type alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventDetails {
    Push {
        commits: u64,
        #[serde(rename = "ref")]
        git_ref: String,
    },
    Issues {
        action: String,
        issue_number: Option<i64>,
    },
    PullRequest {
        action: String,
        pr_number: Option<i64>,
    },
    Create {
        ref_type: String,
    },
    Other,
}

impl EventDetails {
    pub fn commits(&self) -> u64 {
        match self {
            EventDetails::Push { commits, .. } => *commits,
            _ => 0,
        }
    }

    pub fn action(&self) -> Option<&str> {
        match self {
            EventDetails::Issues { action, .. } | EventDetails::PullRequest { action, .. } => {
                Some(action.as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub created_at: DateTime<Utc>,
    pub repo_name: String,
    pub details: EventDetails,
}

impl NormalizedEvent {
    pub fn date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn commits(&self) -> u64 {
        self.details.commits()
    }

    pub fn is_opened_issue(&self) -> bool {
        matches!(&self.details, EventDetails::Issues { action, .. } if action == OPENED_ACTION)
    }

    pub fn is_opened_pull_request(&self) -> bool {
        matches!(&self.details, EventDetails::PullRequest { action, .. } if action == OPENED_ACTION)
    }

    pub fn created_ref_type(&self) -> Option<&str> {
        match &self.details {
            EventDetails::Create { ref_type } => Some(ref_type.as_str()),
            _ => None,
        }
    }
}
