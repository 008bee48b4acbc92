use analysis::{analyze, RelativeWindow};
use chrono::{TimeZone, Utc};
use exporter::{ExportFormat, ExportService};
use serde_json::{json, Value};

fn sample_report() -> analysis::ActivityReport {
    let raw = vec![
        json!({
            "id": "1",
            "type": "PushEvent",
            "created_at": "2024-06-09T10:00:00Z",
            "repo": { "name": "octocat/hello" },
            "payload": { "commits": [{}, {}] }
        }),
        json!({
            "id": "2",
            "type": "IssuesEvent",
            "created_at": "2024-06-08T10:00:00Z",
            "repo": { "name": "octocat/hello" },
            "payload": { "action": "opened", "issue": { "number": 4 } }
        }),
        json!({
            "id": "3",
            "type": "CreateEvent",
            "created_at": "2024-06-07T10:00:00Z",
            "repo": { "name": "octocat/new" },
            "payload": { "ref_type": "repository" }
        }),
    ];
    let now = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
    analyze(&raw, &RelativeWindow::Week1.into(), now).expect("report")
}

#[test]
fn write_all_creates_one_file_per_format() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = ExportService::new(dir.path());
    let report = sample_report();

    let paths = service.write_all(&report).expect("exports");
    assert!(paths.csv.starts_with(dir.path().join("csv")));
    assert!(paths.json.starts_with(dir.path().join("json")));
    assert!(paths.pdf.starts_with(dir.path().join("pdf")));
    assert_eq!(paths.csv.extension().unwrap(), "csv");

    let csv = std::fs::read_to_string(&paths.csv).unwrap();
    assert_eq!(csv.lines().count(), 4);
    let first_row = csv.lines().nth(1).unwrap();
    assert!(first_row.starts_with("1,PushEvent,2024-06-09 10:00:00,octocat/hello,"));

    let json: Value = serde_json::from_slice(&std::fs::read(&paths.json).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 3);
    assert_eq!(json[0]["details"]["commits"], 2);

    let pdf = std::fs::read(&paths.pdf).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn repeated_exports_do_not_overwrite_each_other() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = ExportService::new(dir.path());
    let report = sample_report();

    let paths: Vec<_> = (0..3)
        .map(|_| service.write(&report, ExportFormat::Json).expect("export"))
        .collect();
    assert_ne!(paths[0], paths[1]);
    assert_ne!(paths[1], paths[2]);
    assert_ne!(paths[0], paths[2]);
    assert_eq!(std::fs::read_dir(dir.path().join("json")).unwrap().count(), 3);
}

#[test]
fn write_charts_skips_missing_series() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = ExportService::new(dir.path());
    let charts = service.write_charts(&sample_report()).expect("charts");

    let histogram = charts.commit_histogram.expect("push events present");
    assert!(histogram.starts_with(dir.path().join("charts")));
    assert!(std::fs::read_to_string(histogram).unwrap().contains("<svg"));
    assert!(charts.activity_distribution.is_some());
    assert!(charts.activity_timeline.is_some());
}

#[test]
fn formats_parse_case_insensitively() {
    assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
    assert_eq!("pdf".parse::<ExportFormat>().unwrap().content_type(), "application/pdf");
    assert!("xlsx".parse::<ExportFormat>().is_err());
}
