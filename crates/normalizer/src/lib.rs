pub mod models;
pub mod payloads;
pub mod transform;

pub use models::{EventDetails, NormalizedEvent};
pub use payloads::{RawEvent, RepoRef};
pub use transform::{normalize_event, normalize_events, normalize_value, parse_timestamp};
