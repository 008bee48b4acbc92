use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use analysis::ActivityReport;
use chrono::Utc;
use tracing::{debug, info};

use crate::charts::{activity_distribution, activity_timeline, commit_histogram, ChartKind};
use crate::error::Result;
use crate::formats::ExportFormat;

const BASE_NAME: &str = "github_activity";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
    pub pdf: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartPaths {
    pub commit_histogram: Option<PathBuf>,
    pub activity_distribution: Option<PathBuf>,
    pub activity_timeline: Option<PathBuf>,
}

/// Writes exports and charts beneath a root directory, one sub-directory per
/// format, with timestamped file names.
#[derive(Debug, Clone)]
pub struct ExportService {
    root: PathBuf,
}

impl ExportService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates `{stem}_{stamp}.{extension}` under `sub_dir`. Names already
    /// taken within the same second get a `_1`, `_2`, ... suffix.
    fn create(&self, sub_dir: &str, stem: &str, extension: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dir = self.root.join(sub_dir);
        fs::create_dir_all(&dir)?;
        let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let mut attempt = 0u32;
        loop {
            let name = match attempt {
                0 => format!("{stem}_{stamp}.{extension}"),
                n => format!("{stem}_{stamp}_{n}.{extension}"),
            };
            let path = dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(bytes)?;
                    return Ok(path);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(err) => return Err(err.into()),
            }
        }
    }

    pub fn write(&self, report: &ActivityReport, format: ExportFormat) -> Result<PathBuf> {
        let bytes = format.render(report)?;
        let path = self.create(format.extension(), BASE_NAME, format.extension(), &bytes)?;
        debug!(path = %path.display(), format = %format, "export written");
        Ok(path)
    }

    pub fn write_all(&self, report: &ActivityReport) -> Result<ExportPaths> {
        let paths = ExportPaths {
            csv: self.write(report, ExportFormat::Csv)?,
            json: self.write(report, ExportFormat::Json)?,
            pdf: self.write(report, ExportFormat::Pdf)?,
        };
        info!(dir = %self.root.display(), "exports written");
        Ok(paths)
    }

    fn write_chart(&self, kind: ChartKind, svg: Option<String>) -> Result<Option<PathBuf>> {
        let Some(svg) = svg else {
            return Ok(None);
        };
        let path = self.create("charts", kind.file_stem(), "svg", svg.as_bytes())?;
        Ok(Some(path))
    }

    pub fn write_charts(&self, report: &ActivityReport) -> Result<ChartPaths> {
        Ok(ChartPaths {
            commit_histogram: self
                .write_chart(ChartKind::CommitHistogram, commit_histogram(report)?)?,
            activity_distribution: self.write_chart(
                ChartKind::ActivityDistribution,
                activity_distribution(report)?,
            )?,
            activity_timeline: self
                .write_chart(ChartKind::ActivityTimeline, activity_timeline(report)?)?,
        })
    }
}
