use chrono::{DateTime, NaiveDateTime, Utc};
use common::{AnalysisError, AnalysisResult};
use serde_json::Value;
use tracing::debug;

use crate::models::{
    EventDetails, NormalizedEvent, CREATE_EVENT, ISSUES_EVENT, PULL_REQUEST_EVENT, PUSH_EVENT,
};
use crate::payloads::{
    lenient, CreatePayload, IssuesPayload, PullRequestPayload, PushPayload, RawEvent,
};

/// The only accepted `created_at` layout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn parse_timestamp(value: &str) -> AnalysisResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| AnalysisError::parse("created_at", value))
}

pub fn normalize_event(raw: &RawEvent) -> AnalysisResult<NormalizedEvent> {
    let id = raw.id.as_deref().ok_or(AnalysisError::MissingField("id"))?;
    let event_type = raw
        .event_type
        .as_deref()
        .ok_or(AnalysisError::MissingField("type"))?;
    let created_at = raw
        .created_at
        .as_deref()
        .ok_or(AnalysisError::MissingField("created_at"))?;
    let repo_name = raw
        .repo
        .as_ref()
        .and_then(|repo| repo.name.as_deref())
        .ok_or(AnalysisError::MissingField("repo.name"))?;

    Ok(NormalizedEvent {
        id: id.to_string(),
        event_type: event_type.to_string(),
        created_at: parse_timestamp(created_at)?,
        repo_name: repo_name.to_string(),
        details: extract_details(event_type, &raw.payload),
    })
}

pub fn normalize_value(value: &Value) -> AnalysisResult<NormalizedEvent> {
    normalize_event(&RawEvent::from_value(value)?)
}

/// Normalizes a whole feed page. The first malformed record aborts the batch.
pub fn normalize_events(values: &[Value]) -> AnalysisResult<Vec<NormalizedEvent>> {
    let events = values
        .iter()
        .map(normalize_value)
        .collect::<AnalysisResult<Vec<_>>>()?;
    debug!(count = events.len(), "normalized events");
    Ok(events)
}

fn extract_details(event_type: &str, payload: &Value) -> EventDetails {
    match event_type {
        PUSH_EVENT => {
            let push: PushPayload = lenient(payload);
            let commits = match push.commits {
                Some(commits) => commits.len() as u64,
                None => push.size.unwrap_or(0),
            };
            EventDetails::Push {
                commits,
                git_ref: push.git_ref.unwrap_or_default(),
            }
        }
        ISSUES_EVENT => {
            let issues: IssuesPayload = lenient(payload);
            EventDetails::Issues {
                action: issues.action.unwrap_or_default(),
                issue_number: issues.issue.and_then(|issue| issue.number),
            }
        }
        PULL_REQUEST_EVENT => {
            let pr: PullRequestPayload = lenient(payload);
            EventDetails::PullRequest {
                action: pr.action.unwrap_or_default(),
                pr_number: pr.pull_request.and_then(|pull| pull.number),
            }
        }
        CREATE_EVENT => {
            let create: CreatePayload = lenient(payload);
            EventDetails::Create {
                ref_type: create.ref_type.unwrap_or_default(),
            }
        }
        _ => EventDetails::Other,
    }
}
