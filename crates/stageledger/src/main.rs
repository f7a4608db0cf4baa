//! stageledger - Event cost and earnings allocation for community stage rentals

mod cli;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use stageledger_core::{
    aggregate_concurrent, coordinator_earnings, export_event_details_to_csv, export_report_to_csv,
    export_report_to_json, CostModel, EngineConfig, Ledger, LoadReport,
};
use stageledger_types::{AssociationId, EventStatus, Report};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stageledger",
    version,
    about = "Event cost and earnings allocation for community stage rentals",
    long_about = "Computes what each stage-rental event costs, how much the coordinator keeps,\n\
                  and how the remainder is split among the volunteer associations.\n\
                  \n\
                  Examples:\n\
                    stageledger cost 85                          # Cost breakdown for 85 m²\n\
                    stageledger report --ledger ledger.json      # Earnings for all events\n\
                    stageledger report --status completed        # Only completed events\n\
                    stageledger association 3 --json             # One association, as JSON\n\
                    stageledger export out/earnings.csv          # Write a CSV report\n\
                  \n\
                  Status values:\n\
                    to-be-scheduled, contribution-received, certified-assembly,\n\
                    contribution-paid, completed\n\
                  \n\
                  Environment Variables:\n\
                    STAGELEDGER_LEDGER               # Default ledger file\n\
                    STAGELEDGER_CONFIG               # Engine config (TOML)\n\
                    STAGELEDGER_NO_COLOR             # Disable ANSI colors\n\
                    RUST_LOG                         # Log filter (default: info)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Ledger file with associations and events (JSON)
    #[arg(long, global = true, env = "STAGELEDGER_LEDGER")]
    ledger: Option<PathBuf>,

    /// Engine config file (default: <config dir>/stageledger/config.toml)
    #[arg(long, global = true, env = "STAGELEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "STAGELEDGER_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Earnings report over all events
    Report {
        /// Only events with this status
        #[arg(long, short = 's')]
        status: Option<EventStatus>,
        /// Include the per-event breakdown
        #[arg(long)]
        details: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Earnings of a single association
    Association {
        /// Association ID
        id: u64,
        /// Only events with this status
        #[arg(long, short = 's')]
        status: Option<EventStatus>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Earnings of the coordinator
    Coordinator {
        /// Only events with this status
        #[arg(long, short = 's')]
        status: Option<EventStatus>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Cost breakdown for a stage size (no ledger needed)
    Cost {
        /// Stage size in m²
        stage_size: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the report to a file
    Export {
        /// Output file
        path: PathBuf,
        /// Output format
        #[arg(long, short = 'f', value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Only events with this status
        #[arg(long, short = 's')]
        status: Option<EventStatus>,
        /// Per-event rows (CSV) or details section (JSON)
        #[arg(long)]
        details: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable (--json)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!no_color_requested())
        .init();

    let cli = Cli::parse();

    let config = EngineConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load engine config")?;
    let model = Arc::new(CostModel::new(config));

    // Extract flags for command handlers
    let no_color = cli.no_color;

    match cli.command {
        Command::Cost { stage_size, json } => {
            run_cost(&model, stage_size, json, no_color)?;
        }
        Command::Report {
            status,
            details,
            json,
        } => {
            let ledger = load_ledger(cli.ledger.as_deref()).await?;
            run_report(model, ledger, status, details, json, no_color).await?;
        }
        Command::Association { id, status, json } => {
            let ledger = load_ledger(cli.ledger.as_deref()).await?;
            run_association(&model, &ledger, id, status, json)?;
        }
        Command::Coordinator { status, json } => {
            let ledger = load_ledger(cli.ledger.as_deref()).await?;
            run_coordinator(&model, &ledger, status, json);
        }
        Command::Export {
            path,
            format,
            status,
            details,
        } => {
            let ledger = load_ledger(cli.ledger.as_deref()).await?;
            run_export(model, ledger, &path, format, status, details).await?;
        }
    }

    Ok(())
}

/// `--no-color` is parsed after the subscriber is installed, so peek at args/env
fn no_color_requested() -> bool {
    std::env::args().any(|a| a == "--no-color")
        || std::env::var("STAGELEDGER_NO_COLOR")
            .is_ok_and(|v| !matches!(v.as_str(), "" | "0" | "false"))
}

async fn load_ledger(path: Option<&Path>) -> Result<Ledger> {
    let Some(path) = path else {
        bail!("No ledger file given (use --ledger or set STAGELEDGER_LEDGER)");
    };

    let (ledger, report) = Ledger::load(path)
        .await
        .with_context(|| format!("Failed to load ledger {}", path.display()))?;
    print_load_report(&report);

    if report.has_fatal_errors() {
        bail!("Ledger {} could not be loaded", path.display());
    }
    Ok(ledger)
}

fn print_load_report(report: &LoadReport) {
    if !report.has_errors() {
        return;
    }

    let (warnings, errors, fatal) = report.error_count();
    eprintln!(
        "Ledger loaded with {} error(s), {} warning(s){}:",
        errors,
        warnings,
        if fatal > 0 { ", FATAL" } else { "" }
    );
    for error in &report.errors {
        match &error.suggestion {
            Some(suggestion) => eprintln!(
                "  - {}: {} (hint: {})",
                error.source, error.message, suggestion
            ),
            None => eprintln!("  - {}: {}", error.source, error.message),
        }
    }
}

fn run_cost(model: &CostModel, stage_size: f64, json: bool, no_color: bool) -> Result<()> {
    if !stage_size.is_finite() || stage_size < 0.0 {
        bail!("Stage size must be a non-negative number, got {}", stage_size);
    }

    let breakdown = model.breakdown(stage_size);
    println!("{}", cli::format_breakdown(&breakdown, json, no_color));
    Ok(())
}

async fn run_report(
    model: Arc<CostModel>,
    ledger: Ledger,
    status: Option<EventStatus>,
    details: bool,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let report = build_report(model, ledger, status, details).await?;
    println!("{}", cli::format_report(&report, json, no_color));
    Ok(())
}

/// Single aggregation path shared by `report` and `export`
async fn build_report(
    model: Arc<CostModel>,
    ledger: Ledger,
    status: Option<EventStatus>,
    details: bool,
) -> Result<Report> {
    let events = ledger.into_events();
    let count = events.len();

    let report = aggregate_concurrent(model, events.into(), status, details)
        .await
        .context("Failed to aggregate report")?;

    info!(
        events = count,
        aggregated = report.overall_totals.total_events,
        "Report ready"
    );
    Ok(report)
}

fn run_association(
    model: &CostModel,
    ledger: &Ledger,
    id: u64,
    status: Option<EventStatus>,
    json: bool,
) -> Result<()> {
    let earnings = ledger.association_earnings(model, AssociationId::new(id), status)?;
    println!("{}", cli::format_association(&earnings, json));
    Ok(())
}

fn run_coordinator(model: &CostModel, ledger: &Ledger, status: Option<EventStatus>, json: bool) {
    let earnings = coordinator_earnings(model, ledger.events(), status);
    println!("{}", cli::format_coordinator(&earnings, json));
}

async fn run_export(
    model: Arc<CostModel>,
    ledger: Ledger,
    path: &Path,
    format: ExportFormat,
    status: Option<EventStatus>,
    details: bool,
) -> Result<()> {
    let report = build_report(model, ledger, status, details).await?;
    write_export(&report, path, format, status, details)?;

    println!("Exported to {}", path.display());
    Ok(())
}

fn write_export(
    report: &Report,
    path: &Path,
    format: ExportFormat,
    status: Option<EventStatus>,
    details: bool,
) -> Result<()> {
    match format {
        ExportFormat::Csv if details => export_event_details_to_csv(report, path),
        ExportFormat::Csv => export_report_to_csv(report, path),
        ExportFormat::Json => export_report_to_json(report, status, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stageledger_core::ledger::LedgerFile;
    use tempfile::TempDir;

    const LEDGER: &str = r#"{
        "associations": [
            {"id": 1, "name": "Alpini"},
            {"id": 2, "name": "Avis"},
            {"id": 3, "name": "Banda Musicale"}
        ],
        "events": [
            {"id": 1, "title": "Sagra", "status": "Completed", "stage_size": 50,
             "assignments": [
                {"association_id": 1, "volunteer_count": 1},
                {"association_id": 2, "volunteer_count": 2}
             ]},
            {"id": 2, "title": "Festa", "status": "Completed", "stage_size": 83.3,
             "assignments": [
                {"association_id": 2, "volunteer_count": 7},
                {"association_id": 3, "volunteer_count": 3}
             ]},
            {"id": 3, "title": "Concerto", "status": "Completed", "stage_size": 17.9,
             "assignments": [
                {"association_id": 1, "volunteer_count": 11},
                {"association_id": 2, "volunteer_count": 13}
             ]}
        ]
    }"#;

    fn sample_ledger() -> Ledger {
        let file: LedgerFile = serde_json::from_str(LEDGER).unwrap();
        Ledger::from_file(file, &mut LoadReport::new())
    }

    fn one_event_per_chunk() -> Arc<CostModel> {
        Arc::new(CostModel::new(EngineConfig {
            concurrency_chunk_size: 1,
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn test_export_matches_printed_report() {
        let model = one_event_per_chunk();
        let printed = build_report(Arc::clone(&model), sample_ledger(), None, false)
            .await
            .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let exported = build_report(model, sample_ledger(), None, false)
            .await
            .unwrap();
        write_export(&exported, &path, ExportFormat::Json, None, false).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let associations = value["association_earnings"].as_array().unwrap();
        assert_eq!(associations.len(), printed.association_earnings.len());
        for (json, expected) in associations.iter().zip(&printed.association_earnings) {
            let earnings = json["total_earnings"].as_f64().unwrap();
            assert_eq!(earnings.to_bits(), expected.total_earnings.to_bits());
        }
    }

    #[tokio::test]
    async fn test_csv_export_with_details_writes_event_rows() {
        let report = build_report(one_event_per_chunk(), sample_ledger(), None, true)
            .await
            .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("details.csv");
        write_export(&report, &path, ExportFormat::Csv, None, true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        // header + two rows per event
        assert_eq!(content.lines().count(), 7);
    }
}
