use normalizer::NormalizedEvent;

use crate::error::Result;

pub fn render(events: &[NormalizedEvent]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(events)?)
}
