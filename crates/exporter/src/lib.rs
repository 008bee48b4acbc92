pub mod charts;
pub mod error;
pub mod formats;
pub mod service;

pub use charts::{activity_distribution, activity_timeline, commit_histogram, ChartKind};
pub use error::{ExportError, Result};
pub use formats::ExportFormat;
pub use service::{ChartPaths, ExportPaths, ExportService};
