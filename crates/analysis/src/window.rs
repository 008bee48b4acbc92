use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use common::{AnalysisError, AnalysisResult};
use normalizer::NormalizedEvent;
use serde::{Deserialize, Serialize};

/// Named look-back windows accepted from the CLI and the web form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelativeWindow {
    #[serde(rename = "24h")]
    Hours24,
    #[serde(rename = "48h")]
    Hours48,
    #[serde(rename = "1w")]
    Week1,
    #[serde(rename = "2w")]
    Weeks2,
    #[serde(rename = "30d")]
    Days30,
}

impl RelativeWindow {
    pub const ALL: [RelativeWindow; 5] = [
        RelativeWindow::Hours24,
        RelativeWindow::Hours48,
        RelativeWindow::Week1,
        RelativeWindow::Weeks2,
        RelativeWindow::Days30,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelativeWindow::Hours24 => "24h",
            RelativeWindow::Hours48 => "48h",
            RelativeWindow::Week1 => "1w",
            RelativeWindow::Weeks2 => "2w",
            RelativeWindow::Days30 => "30d",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            RelativeWindow::Hours24 => Duration::hours(24),
            RelativeWindow::Hours48 => Duration::hours(48),
            RelativeWindow::Week1 => Duration::days(7),
            RelativeWindow::Weeks2 => Duration::days(14),
            RelativeWindow::Days30 => Duration::days(30),
        }
    }

    pub fn allowed_tokens() -> String {
        Self::ALL
            .iter()
            .map(RelativeWindow::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RelativeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelativeWindow {
    type Err = AnalysisError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|window| window.as_str() == value)
            .ok_or_else(|| {
                AnalysisError::invalid(format!(
                    "unknown time window {value:?}; choose from: {}",
                    Self::allowed_tokens()
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Relative(RelativeWindow),
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl TimeWindow {
    pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> AnalysisResult<Self> {
        if start > end {
            return Err(AnalysisError::invalid(format!(
                "range start {start} is after end {end}"
            )));
        }
        Ok(TimeWindow::Range { start, end })
    }

    /// Parses an explicit range from either `YYYY-MM-DD` dates, which cover
    /// the whole day, or RFC 3339 timestamps.
    pub fn parse_range(start: &str, end: &str) -> AnalysisResult<Self> {
        let start = parse_bound(start, Bound::Start)?;
        let end = parse_bound(end, Bound::End)?;
        Self::range(start, end)
    }

    pub fn label(&self) -> String {
        match self {
            TimeWindow::Relative(window) => window.to_string(),
            TimeWindow::Range { start, end } => format!(
                "{} to {}",
                start.format("%Y-%m-%d %H:%M:%S"),
                end.format("%Y-%m-%d %H:%M:%S")
            ),
        }
    }

    fn contains(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            TimeWindow::Relative(window) => at >= now - window.duration(),
            TimeWindow::Range { start, end } => *start <= at && at <= *end,
        }
    }
}

impl From<RelativeWindow> for TimeWindow {
    fn from(window: RelativeWindow) -> Self {
        TimeWindow::Relative(window)
    }
}

impl FromStr for TimeWindow {
    type Err = AnalysisError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.parse::<RelativeWindow>().map(TimeWindow::Relative)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

fn parse_bound(value: &str, bound: Bound) -> AnalysisResult<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AnalysisError::invalid(format!("invalid range bound {value:?}")))?;
    let time = match bound {
        Bound::Start => date.and_hms_opt(0, 0, 0),
        Bound::End => date.and_hms_opt(23, 59, 59),
    };
    time.map(|naive| naive.and_utc())
        .ok_or_else(|| AnalysisError::invalid(format!("invalid range bound {value:?}")))
}

/// Keeps the events that fall inside `window`, preserving input order.
/// Relative windows are measured back from `now`.
pub fn filter_events(
    events: &[NormalizedEvent],
    window: &TimeWindow,
    now: DateTime<Utc>,
) -> Vec<NormalizedEvent> {
    events
        .iter()
        .filter(|event| window.contains(event.created_at, now))
        .cloned()
        .collect()
}

pub fn filter_events_now(events: &[NormalizedEvent], window: &TimeWindow) -> Vec<NormalizedEvent> {
    filter_events(events, window, Utc::now())
}
