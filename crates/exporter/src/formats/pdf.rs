use analysis::ActivityReport;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use crate::error::{ExportError, Result};

const TITLE: &str = "GitHub activity report";
const TOP_REPOSITORIES: usize = 10;
const LINES_PER_PAGE: usize = 44;

enum Line {
    Heading(String),
    Text(String),
    Blank,
}

fn pdf_err(err: printpdf::Error) -> ExportError {
    ExportError::Pdf(err.to_string())
}

fn report_lines(report: &ActivityReport) -> Vec<Line> {
    let stats = &report.stats;
    let mut lines = vec![
        Line::Heading(TITLE.to_string()),
        Line::Text(format!(
            "Generated: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S")
        )),
        Line::Text(format!("Window: {}", report.window)),
        Line::Blank,
        Line::Heading("Totals".to_string()),
        Line::Text(format!("Commits: {}", stats.total_commits)),
        Line::Text(format!("Issues opened: {}", stats.total_issues)),
        Line::Text(format!("Pull requests opened: {}", stats.total_prs)),
        Line::Text(format!("Active repositories: {}", stats.total_repos)),
        Line::Text(format!("Repositories created: {}", stats.repos_created)),
        Line::Text(format!("Branches created: {}", stats.branches_created)),
        Line::Blank,
        Line::Heading("Events by type".to_string()),
    ];
    lines.extend(
        stats
            .events_by_type
            .iter()
            .map(|(event_type, count)| Line::Text(format!("{event_type}: {count}"))),
    );
    lines.push(Line::Blank);
    lines.push(Line::Heading("Most active repositories".to_string()));
    lines.extend(report.ranking.iter().take(TOP_REPOSITORIES).enumerate().map(
        |(idx, repo)| {
            Line::Text(format!(
                "{}. {} - score {} ({} commits, {} issues, {} PRs)",
                idx + 1,
                repo.repo,
                repo.total_activity,
                repo.commits,
                repo.issues,
                repo.prs
            ))
        },
    ));
    lines
}

fn new_page(doc: &PdfDocumentReference) -> PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
    doc.get_page(page).get_layer(layer)
}

/// A4 text summary of the report, spilling onto extra pages as needed.
pub fn render(report: &ActivityReport) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(TITLE, Mm(210.0), Mm(297.0), "Layer 1");
    let regular: IndirectFontRef = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold: IndirectFontRef = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    let mut current = doc.get_page(page).get_layer(layer);
    let mut row = 0usize;
    for line in report_lines(report) {
        if row == LINES_PER_PAGE {
            current = new_page(&doc);
            row = 0;
        }
        let y = Mm(280.0 - 6.0 * row as f32);
        match line {
            Line::Heading(text) => current.use_text(text, 14.0, Mm(15.0), y, &bold),
            Line::Text(text) => current.use_text(text, 11.0, Mm(15.0), y, &regular),
            Line::Blank => {}
        }
        row += 1;
    }

    doc.save_to_bytes().map_err(pdf_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis::{analyze_events, RelativeWindow};
    use chrono::{TimeZone, Utc};

    #[test]
    fn renders_a_pdf_document() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let report = analyze_events(&[], &RelativeWindow::Days30.into(), now);
        let bytes = render(&report).expect("pdf");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn lines_include_totals_and_top_repositories() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let report = analyze_events(&[], &RelativeWindow::Hours24.into(), now);
        let texts: Vec<String> = report_lines(&report)
            .into_iter()
            .filter_map(|line| match line {
                Line::Text(text) | Line::Heading(text) => Some(text),
                Line::Blank => None,
            })
            .collect();
        assert!(texts.contains(&"Commits: 0".to_string()));
        assert!(texts.contains(&"Window: 24h".to_string()));
        assert!(texts.contains(&"Most active repositories".to_string()));
    }
}
