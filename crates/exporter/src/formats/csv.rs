use normalizer::NormalizedEvent;
use serde::Serialize;

use crate::error::{ExportError, Result};

const HEADER: [&str; 5] = ["id", "type", "created_at", "repo_name", "details"];

#[derive(Serialize)]
struct EventRow<'a> {
    id: &'a str,
    event_type: &'a str,
    created_at: String,
    repo_name: &'a str,
    details: String,
}

/// One row per event; details are embedded as a JSON object.
pub fn render(events: &[NormalizedEvent]) -> Result<Vec<u8>> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for event in events {
        writer.serialize(EventRow {
            id: &event.id,
            event_type: &event.event_type,
            created_at: event.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            repo_name: &event.repo_name,
            details: serde_json::to_string(&event.details)?,
        })?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))
}
