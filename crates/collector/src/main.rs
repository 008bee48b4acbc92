use std::io;
use std::path::PathBuf;

use analysis::TimeWindow;
use anyhow::{Context, Result};
use clap::Parser;
use collector::{ActivityService, Cli, RunOutcome};
use common::{config::AppConfig, logging, AppError};
use exporter::ExportService;
use tracing::info;

/// Summarize a GitHub user's recent public activity.
#[derive(Debug, Parser)]
#[command(name = "gh-activity", version, about)]
struct Args {
    /// Analyze this user once and exit instead of prompting.
    #[arg(long, short)]
    username: Option<String>,

    /// Look-back window: 24h, 48h, 1w, 2w or 30d.
    #[arg(long, short)]
    window: Option<String>,

    /// Start of an explicit range (YYYY-MM-DD or RFC 3339). Requires --until.
    #[arg(long, requires = "until", conflicts_with = "window")]
    since: Option<String>,

    /// End of an explicit range (YYYY-MM-DD or RFC 3339).
    #[arg(long, requires = "since")]
    until: Option<String>,

    /// Directory for charts and exports.
    #[arg(long, env = "GH_ACTIVITY_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Print the summary only.
    #[arg(long)]
    no_export: bool,
}

impl Args {
    fn window(&self, config: &AppConfig) -> Result<TimeWindow> {
        let window = match (&self.since, &self.until) {
            (Some(since), Some(until)) => TimeWindow::parse_range(since, until)?,
            _ => self
                .window
                .as_deref()
                .unwrap_or(&config.export.default_window)
                .parse::<TimeWindow>()?,
        };
        Ok(window)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging_with("warn", logging::LogStyle::Compact);
    let args = Args::parse();
    let config = AppConfig::load()?;
    let window = args.window(&config).context("resolving time window")?;

    let service = ActivityService::from_config(&config.github)?;
    let exports = (!args.no_export).then(|| {
        ExportService::new(args.out_dir.clone().unwrap_or_else(|| config.export.dir.clone()))
    });
    let cli = Cli::new(service, exports, window);

    let stdout = io::stdout();
    match args.username.as_deref() {
        Some(username) => {
            info!(username, window = %window, "single analysis");
            let outcome = cli.run_once(username, &window, &mut stdout.lock()).await?;
            match outcome {
                RunOutcome::Completed | RunOutcome::NoActivity => Ok(()),
                RunOutcome::UnknownUser => Err(AppError::NotFound(username.to_string()).into()),
                RunOutcome::RateLimited => Err(anyhow::anyhow!("github rate limit exceeded")),
            }
        }
        None => {
            cli.run_interactive(io::stdin().lock(), stdout.lock()).await?;
            Ok(())
        }
    }
}
