use std::io::{BufRead, Write};

use analysis::{ActivityReport, RelativeWindow, TimeWindow};
use common::{AnalysisError, AppError, Result};
use exporter::ExportService;
use tracing::{error, warn};

use crate::client::GithubApiError;
use crate::service::ActivityService;

const TOP_REPOSITORIES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    NoActivity,
    UnknownUser,
    RateLimited,
}

/// Terminal front end: one analysis per call to `run_once`, or a prompt loop.
pub struct Cli {
    service: ActivityService,
    exports: Option<ExportService>,
    default_window: TimeWindow,
}

impl Cli {
    pub fn new(
        service: ActivityService,
        exports: Option<ExportService>,
        default_window: TimeWindow,
    ) -> Self {
        Self {
            service,
            exports,
            default_window,
        }
    }

    pub async fn run_once<W: Write>(
        &self,
        username: &str,
        window: &TimeWindow,
        out: &mut W,
    ) -> Result<RunOutcome> {
        let report = match self.service.analyze_user(username, window).await {
            Ok(report) => report,
            Err(err) => return report_failure(err, username, out),
        };
        if report.is_empty() {
            writeln!(out, "No activity found for {username} in window {window}.")?;
            return Ok(RunOutcome::NoActivity);
        }

        print_report(&report, username, out)?;
        if let Some(exports) = &self.exports {
            let charts = exports.write_charts(&report).map_err(AppError::export)?;
            let files = exports.write_all(&report).map_err(AppError::export)?;
            writeln!(out)?;
            for path in [
                charts.commit_histogram,
                charts.activity_distribution,
                charts.activity_timeline,
            ]
            .into_iter()
            .flatten()
            .chain([files.csv, files.json, files.pdf])
            {
                writeln!(out, "Saved {}", path.display())?;
            }
        }
        Ok(RunOutcome::Completed)
    }

    pub async fn run_interactive<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut output: W,
    ) -> Result<()> {
        loop {
            let Some(username) = prompt(&mut input, &mut output, "GitHub username: ")? else {
                return Ok(());
            };
            if username.is_empty() {
                writeln!(output, "Please enter a username.")?;
                continue;
            }
            let Some(window) = self.prompt_window(&mut input, &mut output)? else {
                return Ok(());
            };

            match self.run_once(&username, &window, &mut output).await {
                Ok(RunOutcome::Completed) => {}
                Ok(RunOutcome::NoActivity | RunOutcome::UnknownUser) => continue,
                Ok(RunOutcome::RateLimited) => return Ok(()),
                Err(AppError::Analysis(err)) => {
                    writeln!(output, "Could not analyze {username}: {err}")?;
                    continue;
                }
                Err(err) => {
                    error!(username = %username, error = %err, "analysis run failed");
                    writeln!(output, "An error occurred: {err}")?;
                    if confirm(&mut input, &mut output, "Try again? (y/N): ")? {
                        continue;
                    }
                    writeln!(output, "Goodbye.")?;
                    return Ok(());
                }
            }

            if !confirm(&mut input, &mut output, "Analyze another user? (y/N): ")? {
                writeln!(output, "Goodbye.")?;
                return Ok(());
            }
        }
    }

    fn prompt_window<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<Option<TimeWindow>> {
        let message = format!(
            "Time window ({}) [{}]: ",
            RelativeWindow::allowed_tokens(),
            self.default_window
        );
        loop {
            let Some(token) = prompt(input, output, &message)? else {
                return Ok(None);
            };
            if token.is_empty() {
                return Ok(Some(self.default_window));
            }
            match token.parse::<TimeWindow>() {
                Ok(window) => return Ok(Some(window)),
                Err(err) => writeln!(output, "{err}")?,
            }
        }
    }
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> Result<Option<String>> {
    write!(output, "{message}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Yes/no question; anything but `y` or `yes`, including end of input, is no.
fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> Result<bool> {
    let answer = prompt(input, output, message)?.unwrap_or_default();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

fn report_failure<W: Write>(
    err: anyhow::Error,
    username: &str,
    out: &mut W,
) -> Result<RunOutcome> {
    match err.downcast_ref::<GithubApiError>() {
        Some(GithubApiError::NotFound { .. }) => {
            writeln!(out, "User {username} was not found on GitHub.")?;
            return Ok(RunOutcome::UnknownUser);
        }
        Some(GithubApiError::RateLimited { reset }) => {
            warn!(username, reset = ?reset, "rate limited");
            writeln!(out, "GitHub API rate limit exceeded. Try again later.")?;
            return Ok(RunOutcome::RateLimited);
        }
        _ => {}
    }
    match err.downcast::<AnalysisError>() {
        Ok(analysis) => Err(AppError::Analysis(analysis)),
        Err(err) => Err(AppError::http(err)),
    }
}

fn print_report<W: Write>(report: &ActivityReport, username: &str, out: &mut W) -> Result<()> {
    let stats = &report.stats;
    writeln!(out, "Activity for {username} (window {})", report.window)?;
    writeln!(out, "  Commits:              {}", stats.total_commits)?;
    writeln!(out, "  Issues opened:        {}", stats.total_issues)?;
    writeln!(out, "  Pull requests opened: {}", stats.total_prs)?;
    writeln!(out, "  Active repositories:  {}", stats.total_repos)?;
    writeln!(out, "  Repositories created: {}", stats.repos_created)?;
    writeln!(out, "  Branches created:     {}", stats.branches_created)?;

    if !report.ranking.is_empty() {
        writeln!(out)?;
        writeln!(out, "Most active repositories:")?;
        for (idx, repo) in report.ranking.iter().take(TOP_REPOSITORIES).enumerate() {
            writeln!(
                out,
                "  {}. {} (score {}: {} commits, {} issues, {} PRs)",
                idx + 1,
                repo.repo,
                repo.total_activity,
                repo.commits,
                repo.issues,
                repo.prs
            )?;
        }
    }
    Ok(())
}
