//! Export functionality for earnings reports
//!
//! Provides simple, testable export with proper error handling.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use stageledger_types::{EventStatus, Report};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    // Create parent directory if needed
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Quote a CSV field, doubling embedded quotes
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Export association earnings to CSV
///
/// CSV columns: Association ID, Association, Events, Earnings
/// One row per association (report order), then a row for the coordinator.
///
/// # Errors
/// Returns error if file creation or write operations fail
///
/// # Examples
///
/// ```no_run
/// use stageledger_core::cost::CostModel;
/// use stageledger_core::export::export_report_to_csv;
/// use stageledger_core::report::aggregate;
/// use std::path::Path;
///
/// let report = aggregate(&CostModel::default(), &[], None, false);
/// export_report_to_csv(&report, Path::new("earnings.csv")).unwrap();
/// ```
pub fn export_report_to_csv(report: &Report, path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;

    writeln!(writer, "Association ID,Association,Events,Earnings")
        .context("Failed to write CSV header")?;

    for association in &report.association_earnings {
        writeln!(
            writer,
            "{},{},{},{:.2}",
            association.association_id,
            csv_field(&association.association_name),
            association.events_count,
            association.total_earnings
        )
        .with_context(|| {
            format!(
                "Failed to write row for association {}",
                association.association_id
            )
        })?;
    }

    writeln!(
        writer,
        ",{},{},{:.2}",
        csv_field("Pro Loco (coordinator)"),
        report.coordinator_earnings.events_count,
        report.coordinator_earnings.total_earnings
    )
    .context("Failed to write coordinator row")?;

    writer.flush().context("Failed to flush CSV writer")?;
    info!(path = %path.display(), rows = report.association_earnings.len() + 1, "Exported earnings CSV");

    Ok(())
}

/// Export per-event breakdown to CSV, one row per (event, association)
///
/// CSV columns: Event ID, Event, Total Cost, Coordinator Share, Certification,
/// Association ID, Association, Volunteers, Earnings.
/// Events without assignments get one row with empty association columns.
/// Fails if the report was built without details.
pub fn export_event_details_to_csv(report: &Report, path: &Path) -> Result<()> {
    let details = report
        .events_with_earnings
        .as_ref()
        .context("Report has no per-event details (aggregate with details enabled)")?;

    let mut writer = create_writer(path)?;

    writeln!(
        writer,
        "Event ID,Event,Total Cost,Coordinator Share,Certification,Association ID,Association,Volunteers,Earnings"
    )
    .context("Failed to write CSV header")?;

    for detail in details {
        let prefix = format!(
            "{},{},{:.2},{:.2},{:.2}",
            detail.event_id,
            csv_field(&detail.event_title),
            detail.total_cost,
            detail.coordinator_share,
            detail.certification_cost
        );

        if detail.associations.is_empty() {
            writeln!(writer, "{},,,,", prefix)
                .with_context(|| format!("Failed to write row for event {}", detail.event_id))?;
            continue;
        }

        for allocation in &detail.associations {
            writeln!(
                writer,
                "{},{},{},{},{:.2}",
                prefix,
                allocation.association_id,
                csv_field(&allocation.association_name),
                allocation.volunteer_count,
                allocation.earnings
            )
            .with_context(|| format!("Failed to write row for event {}", detail.event_id))?;
        }
    }

    writer.flush().context("Failed to flush CSV writer")?;
    info!(path = %path.display(), events = details.len(), "Exported event details CSV");

    Ok(())
}

#[derive(Serialize)]
struct ReportExport<'a> {
    generated_at: DateTime<Utc>,
    status_filter: Option<EventStatus>,
    #[serde(flatten)]
    report: &'a Report,
}

/// Export the full report as pretty-printed JSON
///
/// Adds `generated_at` and the status filter used next to the report fields.
pub fn export_report_to_json(
    report: &Report,
    status_filter: Option<EventStatus>,
    path: &Path,
) -> Result<()> {
    let payload = ReportExport {
        generated_at: Utc::now(),
        status_filter,
        report,
    };

    let json =
        serde_json::to_string_pretty(&payload).context("Failed to serialize report to JSON")?;

    let mut writer = create_writer(path)?;
    writer
        .write_all(json.as_bytes())
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;
    writer.flush().context("Failed to flush JSON writer")?;

    info!(path = %path.display(), "Exported report JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostModel;
    use crate::report::aggregate;
    use stageledger_types::{AssociationContribution, EventRecord};
    use tempfile::TempDir;

    fn sample_report(include_details: bool) -> Report {
        let events = vec![
            EventRecord::new(1, "Sagra \"della\" castagna", EventStatus::Completed, 50.0)
                .with_contribution(AssociationContribution::new(1, "Alpini", 3))
                .with_contribution(AssociationContribution::new(2, "Avis", 7)),
            EventRecord::new(2, "Mercatino", EventStatus::Completed, 10.0),
        ];
        aggregate(&CostModel::default(), &events, None, include_details)
    }

    #[test]
    fn test_csv_field_escapes_quotes() {
        assert_eq!(csv_field("plain"), "\"plain\"");
        assert_eq!(csv_field("a \"b\""), "\"a \"\"b\"\"\"");
    }

    #[test]
    fn test_export_report_to_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("earnings.csv");

        export_report_to_csv(&sample_report(false), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Association ID,Association,Events,Earnings");
        assert_eq!(lines[1], "1,\"Alpini\",1,93.00");
        assert_eq!(lines[2], "2,\"Avis\",1,217.00");
        assert_eq!(lines[3], ",\"Pro Loco (coordinator)\",2,60.00");
    }

    #[test]
    fn test_export_event_details_to_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("details.csv");

        export_event_details_to_csv(&sample_report(true), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[1],
            "1,\"Sagra \"\"della\"\" castagna\",400.00,40.00,50.00,1,\"Alpini\",3,93.00"
        );
        assert_eq!(lines[3], "2,\"Mercatino\",160.00,20.00,50.00,,,,");
    }

    #[test]
    fn test_export_event_details_requires_details() {
        let dir = TempDir::new().unwrap();
        let err = export_event_details_to_csv(&sample_report(false), &dir.path().join("x.csv"))
            .unwrap_err();
        assert!(err.to_string().contains("no per-event details"));
    }

    #[test]
    fn test_export_report_to_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");

        export_report_to_json(&sample_report(true), Some(EventStatus::Completed), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["status_filter"], "Completed");
        assert_eq!(value["overall_totals"]["total_events"], 2);
        assert!(value["generated_at"].is_string());
        assert_eq!(value["events_with_earnings"].as_array().unwrap().len(), 2);
    }
}
