use std::collections::{BTreeMap, BTreeSet};

use analysis::ActivityReport;
use normalizer::models::PUSH_EVENT;
use plotters::prelude::*;

use crate::error::{ExportError, Result};

const CHART_SIZE: (u32, u32) = (960, 540);
const MAX_X_LABELS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    CommitHistogram,
    ActivityDistribution,
    ActivityTimeline,
}

impl ChartKind {
    pub fn file_stem(&self) -> &'static str {
        match self {
            ChartKind::CommitHistogram => "commit_histogram",
            ChartKind::ActivityDistribution => "activity_distribution",
            ChartKind::ActivityTimeline => "activity_timeline",
        }
    }
}

fn chart_err<E: std::fmt::Display>(err: E) -> ExportError {
    ExportError::Chart(err.to_string())
}

fn palette_color(idx: usize) -> RGBColor {
    let (r, g, b) = Palette99::COLORS[idx % Palette99::COLORS.len()];
    RGBColor(r, g, b)
}

/// Commits pushed per day. `None` when the report has no push events.
pub fn commit_histogram(report: &ActivityReport) -> Result<Option<String>> {
    let mut per_day: BTreeMap<String, u64> = BTreeMap::new();
    for event in report
        .events
        .iter()
        .filter(|event| event.event_type == PUSH_EVENT)
    {
        *per_day.entry(event.date().to_string()).or_default() += event.commits();
    }
    if per_day.is_empty() {
        return Ok(None);
    }

    let labels: Vec<String> = per_day.keys().cloned().collect();
    let values: Vec<u64> = per_day.values().copied().collect();
    let max = values.iter().copied().max().unwrap_or(0).max(1) as f64;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Commit activity ({})", report.window),
                ("sans-serif", 24).into_font(),
            )
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..labels.len() as f64, 0f64..max * 1.1)
            .map_err(chart_err)?;

        let label_for = |x: &f64| labels.get(*x as usize).cloned().unwrap_or_default();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len().min(MAX_X_LABELS))
            .x_label_formatter(&label_for)
            .x_desc("Date")
            .y_desc("Commits")
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(values.iter().enumerate().map(|(idx, count)| {
                let x = idx as f64;
                Rectangle::new([(x + 0.1, 0.0), (x + 0.9, *count as f64)], BLUE.filled())
            }))
            .map_err(chart_err)?;
        root.present().map_err(chart_err)?;
    }
    Ok(Some(svg))
}

/// Share of each event type as a donut chart. `None` for an empty report.
pub fn activity_distribution(report: &ActivityReport) -> Result<Option<String>> {
    let by_type = &report.stats.events_by_type;
    if by_type.is_empty() {
        return Ok(None);
    }

    let labels: Vec<String> = by_type
        .iter()
        .map(|(event_type, count)| format!("{event_type} ({count})"))
        .collect();
    let sizes: Vec<f64> = by_type.values().map(|count| *count as f64).collect();
    let colors: Vec<RGBColor> = (0..sizes.len()).map(palette_color).collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;
        let root = root
            .titled("Activity by event type", ("sans-serif", 24).into_font())
            .map_err(chart_err)?;

        let (width, height) = root.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.35;
        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.donut_hole(radius * 0.3);
        pie.label_style(("sans-serif", 14).into_font().color(&BLACK));
        root.draw(&pie).map_err(chart_err)?;
        root.present().map_err(chart_err)?;
    }
    Ok(Some(svg))
}

/// Events per day, one line per event type. `None` for an empty report.
pub fn activity_timeline(report: &ActivityReport) -> Result<Option<String>> {
    if report.events.is_empty() {
        return Ok(None);
    }

    let mut counts: BTreeMap<(String, String), u64> = BTreeMap::new();
    let mut days: BTreeSet<String> = BTreeSet::new();
    let mut types: BTreeSet<String> = BTreeSet::new();
    for event in &report.events {
        let day = event.date().to_string();
        days.insert(day.clone());
        types.insert(event.event_type.clone());
        *counts.entry((event.event_type.clone(), day)).or_default() += 1;
    }
    let days: Vec<String> = days.into_iter().collect();
    let max = counts.values().copied().max().unwrap_or(0).max(1) as f64;
    let x_max = days.len().saturating_sub(1).max(1) as f64;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;
        let mut chart = ChartBuilder::on(&root)
            .caption("Activity timeline", ("sans-serif", 24).into_font())
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..x_max, 0f64..max * 1.1)
            .map_err(chart_err)?;

        let label_for = |x: &f64| days.get(x.round() as usize).cloned().unwrap_or_default();
        chart
            .configure_mesh()
            .x_labels(days.len().min(MAX_X_LABELS))
            .x_label_formatter(&label_for)
            .x_desc("Date")
            .y_desc("Events")
            .draw()
            .map_err(chart_err)?;

        for (idx, event_type) in types.iter().enumerate() {
            let color = palette_color(idx);
            let points: Vec<(f64, f64)> = days
                .iter()
                .enumerate()
                .map(|(x, day)| {
                    let count = counts
                        .get(&(event_type.clone(), day.clone()))
                        .copied()
                        .unwrap_or(0);
                    (x as f64, count as f64)
                })
                .collect();
            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))
                .map_err(chart_err)?
                .label(event_type.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_err)?;
        root.present().map_err(chart_err)?;
    }
    Ok(Some(svg))
}
