use core::fmt::{Result, Write};

use analysis::{ActivityReport, RelativeWindow, TimeWindow};
use exporter::ExportFormat;
use url::form_urlencoded;

/// Inline SVG charts shown on the results page, in display order.
#[derive(Debug, Default)]
pub struct Charts {
    pub commit_histogram: Option<String>,
    pub activity_distribution: Option<String>,
    pub activity_timeline: Option<String>,
}

const STYLE: &str = "body { font-family: sans-serif; margin: 2rem auto; max-width: 1000px; color: #1a1a1a; }
table { border-collapse: collapse; margin-bottom: 1.5rem; }
th, td { border: 1px solid #e0e0e0; padding: 0.35rem 0.75rem; text-align: left; }
th { background: #f5f5f5; }
.chart { margin: 1.5rem 0; }
.error { color: #b00020; }";

fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn write_head<W: Write>(writer: &mut W, title: &str) -> Result {
    writeln!(writer, "<!DOCTYPE html>")?;
    writeln!(writer, "<html lang=\"en\">")?;
    writeln!(writer, "<head>")?;
    writeln!(writer, "<meta charset=\"UTF-8\">")?;
    writeln!(writer, "<title>{}</title>", html_escape(title))?;
    writeln!(writer, "<style>\n{STYLE}\n</style>")?;
    writeln!(writer, "</head>")?;
    writeln!(writer, "<body>")?;
    Ok(())
}

fn write_foot<W: Write>(writer: &mut W) -> Result {
    writeln!(writer, "</body>")?;
    writeln!(writer, "</html>")
}

/// The search form: username plus one of the named windows.
pub fn render_form(
    default_window: RelativeWindow,
) -> std::result::Result<String, core::fmt::Error> {
    let mut page = String::new();
    write_head(&mut page, "GitHub activity")?;
    writeln!(page, "<h1>GitHub activity</h1>")?;
    writeln!(page, "<form method=\"post\" action=\"/analyze\">")?;
    writeln!(page, "<label for=\"username\">Username</label>")?;
    writeln!(
        page,
        "<input id=\"username\" name=\"username\" type=\"text\" required>"
    )?;
    writeln!(page, "<label for=\"window\">Time window</label>")?;
    writeln!(page, "<select id=\"window\" name=\"window\">")?;
    for window in RelativeWindow::ALL {
        let selected = if window == default_window { " selected" } else { "" };
        writeln!(
            page,
            "<option value=\"{token}\"{selected}>{token}</option>",
            token = window.as_str()
        )?;
    }
    writeln!(page, "</select>")?;
    writeln!(page, "<button type=\"submit\">Analyze</button>")?;
    writeln!(page, "</form>")?;
    write_foot(&mut page)?;
    Ok(page)
}

fn export_link(format: ExportFormat, username: &str, window: &TimeWindow) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("username", username)
        .append_pair("window", &window.to_string())
        .finish();
    format!("/export/{}?{}", format.extension(), html_escape(&query))
}

pub fn render_results(
    username: &str,
    window: &TimeWindow,
    report: &ActivityReport,
    charts: &Charts,
) -> std::result::Result<String, core::fmt::Error> {
    let stats = &report.stats;
    let mut page = String::new();
    write_head(&mut page, &format!("GitHub activity for {username}"))?;
    writeln!(
        page,
        "<h1>Activity for {} <small>({})</small></h1>",
        html_escape(username),
        html_escape(&report.window)
    )?;

    writeln!(page, "<h2>Totals</h2>")?;
    writeln!(page, "<table>")?;
    for (label, value) in [
        ("Commits", stats.total_commits),
        ("Issues opened", stats.total_issues),
        ("Pull requests opened", stats.total_prs),
        ("Active repositories", stats.total_repos),
        ("Repositories created", stats.repos_created),
        ("Branches created", stats.branches_created),
    ] {
        writeln!(page, "<tr><th>{label}</th><td>{value}</td></tr>")?;
    }
    writeln!(page, "</table>")?;

    writeln!(page, "<h2>Most active repositories</h2>")?;
    writeln!(page, "<table>")?;
    writeln!(
        page,
        "<tr><th>#</th><th>Repository</th><th>Commits</th><th>Issues</th><th>PRs</th><th>Score</th><th>Last activity</th></tr>"
    )?;
    for (idx, repo) in report.ranking.iter().enumerate() {
        writeln!(
            page,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            idx + 1,
            html_escape(&repo.repo),
            repo.commits,
            repo.issues,
            repo.prs,
            repo.total_activity,
            repo.last_activity.format("%Y-%m-%d %H:%M")
        )?;
    }
    writeln!(page, "</table>")?;

    for svg in [
        &charts.commit_histogram,
        &charts.activity_distribution,
        &charts.activity_timeline,
    ]
    .into_iter()
    .flatten()
    {
        writeln!(page, "<div class=\"chart\">{svg}</div>")?;
    }

    writeln!(page, "<h2>Export</h2>")?;
    writeln!(page, "<ul>")?;
    for format in ExportFormat::ALL {
        writeln!(
            page,
            "<li><a href=\"{}\">{}</a></li>",
            export_link(format, username, window),
            format.extension().to_ascii_uppercase()
        )?;
    }
    writeln!(page, "</ul>")?;
    writeln!(page, "<p><a href=\"/\">Analyze another user</a></p>")?;
    write_foot(&mut page)?;
    Ok(page)
}
