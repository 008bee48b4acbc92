use common::{AnalysisError, AnalysisResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One record of a user's public event feed, as returned by the API. Every
/// top-level field is optional here so that absence can be reported as a
/// missing field rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub repo: Option<RepoRef>,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoRef {
    #[serde(default)]
    pub name: Option<String>,
}

impl RawEvent {
    pub fn from_value(value: &Value) -> AnalysisResult<Self> {
        if !value.is_object() {
            return Err(AnalysisError::parse("event", value.to_string()));
        }
        RawEvent::deserialize(value).map_err(|err| AnalysisError::parse("event", err.to_string()))
    }
}

// Payload fields decode independently: a mistyped field becomes `None`
// without discarding its siblings.

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PushPayload {
    #[serde(default, deserialize_with = "or_none")]
    pub commits: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "or_none")]
    pub size: Option<u64>,
    #[serde(rename = "ref", default, deserialize_with = "or_none")]
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct IssuesPayload {
    #[serde(default, deserialize_with = "or_none")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "or_none")]
    pub issue: Option<NumberRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PullRequestPayload {
    #[serde(default, deserialize_with = "or_none")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "or_none")]
    pub pull_request: Option<NumberRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CreatePayload {
    #[serde(default, deserialize_with = "or_none")]
    pub ref_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct NumberRef {
    #[serde(default, deserialize_with = "or_none")]
    pub number: Option<i64>,
}

fn or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Decodes a nested payload, falling back to the empty shape when the payload
/// is not an object at all.
pub(crate) fn lenient<T>(payload: &Value) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    T::deserialize(payload).unwrap_or_default()
}
