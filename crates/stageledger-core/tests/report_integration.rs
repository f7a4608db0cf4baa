//! End-to-end tests: ledger file on disk through to exported reports
//!
//! Run with:
//! ```bash
//! cargo test --test report_integration
//! ```

use stageledger_core::{
    aggregate, aggregate_concurrent, export_event_details_to_csv, export_report_to_csv,
    export_report_to_json, CostModel, CoreError, EngineConfig, Ledger,
};
use stageledger_types::{AssociationId, EventStatus};
use std::sync::Arc;
use tempfile::TempDir;

const LEDGER: &str = r#"{
  "associations": [
    { "id": 1, "name": "Alpini", "volunteers": [
        { "id": 10, "first_name": "Mario", "last_name": "Rossi", "is_certified": true },
        { "id": 11, "first_name": "Luca", "last_name": "Bianchi" }
    ] },
    { "id": 2, "name": "Avis" },
    { "id": 3, "name": "Banda Musicale" }
  ],
  "events": [
    { "id": 1, "title": "Sagra della castagna", "status": "Completed", "stage_size": 50,
      "assignments": [
        { "association_id": 1, "volunteer_count": 3, "volunteer_ids": [10, 11] },
        { "association_id": 2, "volunteer_count": 7 }
      ] },
    { "id": 2, "title": "Festa patronale", "status": "Certified Assembly", "stage_size": 100,
      "assignments": [
        { "association_id": 2, "volunteer_count": 2 },
        { "association_id": 3, "volunteer_count": 4 }
      ] },
    { "id": 3, "title": "Palco rotto", "status": "Completed", "stage_size": -5 },
    { "id": 4, "title": "Mercatino", "stage_size": 10,
      "assignments": [ { "association_id": 77, "volunteer_count": 5 } ] }
  ]
}"#;

async fn load_sample(dir: &TempDir) -> Ledger {
    let path = dir.path().join("ledger.json");
    tokio::fs::write(&path, LEDGER).await.unwrap();

    let (ledger, report) = Ledger::load(&path).await.unwrap();
    assert_eq!(report.events_loaded, 3);
    assert_eq!(report.events_skipped, 1);
    assert_eq!(report.assignments_skipped, 1);
    assert!(!report.has_fatal_errors());
    ledger
}

#[tokio::test]
async fn test_ledger_to_report() {
    let dir = TempDir::new().unwrap();
    let ledger = load_sample(&dir).await;
    let model = CostModel::default();

    let report = aggregate(&model, ledger.events(), None, true);
    let totals = report.overall_totals;

    // 400 + 650 + 160
    assert_eq!(totals.total_events, 3);
    assert_eq!(totals.total_revenue, 1210.0);
    assert_eq!(totals.total_coordinator_earnings, 120.0);
    assert_eq!(totals.total_certification_costs, 150.0);
    assert!((totals.total_association_earnings - 850.0).abs() < 1e-9);
    // Event 4 had its only assignment dropped, so its remainder is undistributed
    assert!((totals.undistributed() - 90.0).abs() < 1e-9);

    let avis = report.association(AssociationId::new(2)).unwrap();
    assert_eq!(avis.association_name, "Avis");
    assert_eq!(avis.events_count, 2);
    assert!((avis.total_earnings - (217.0 + 180.0)).abs() < 1e-9);
}

#[tokio::test]
async fn test_ledger_association_report() {
    let dir = TempDir::new().unwrap();
    let ledger = load_sample(&dir).await;
    let model = CostModel::default();

    let banda = ledger
        .association_earnings(&model, AssociationId::new(3), None)
        .unwrap();
    assert_eq!(banda.association_name, "Banda Musicale");
    assert_eq!(banda.events_count, 1);
    assert!((banda.total_earnings - 360.0).abs() < 1e-9);

    let filtered = ledger
        .association_earnings(&model, AssociationId::new(3), Some(EventStatus::Completed))
        .unwrap();
    assert_eq!(filtered.events_count, 0);
    assert_eq!(filtered.total_earnings, 0.0);

    let err = ledger
        .association_earnings(&model, AssociationId::new(99), None)
        .unwrap_err();
    assert!(matches!(err, CoreError::AssociationNotFound { .. }));
}

#[tokio::test]
async fn test_concurrent_report_from_ledger() {
    let dir = TempDir::new().unwrap();
    let ledger = load_sample(&dir).await;
    let model = Arc::new(CostModel::new(EngineConfig {
        concurrency_chunk_size: 1,
        ..Default::default()
    }));

    let sequential = aggregate(&model, ledger.events(), None, true);
    let concurrent = aggregate_concurrent(
        Arc::clone(&model),
        ledger.into_events().into(),
        None,
        true,
    )
    .await
    .unwrap();

    assert_eq!(concurrent.overall_totals, sequential.overall_totals);
    assert_eq!(concurrent.association_earnings, sequential.association_earnings);
    assert_eq!(concurrent.events_with_earnings, sequential.events_with_earnings);
}

#[tokio::test]
async fn test_export_round_trip_files() {
    let dir = TempDir::new().unwrap();
    let ledger = load_sample(&dir).await;
    let report = aggregate(&CostModel::default(), ledger.events(), None, true);

    let out = dir.path().join("out");
    export_report_to_csv(&report, &out.join("earnings.csv")).unwrap();
    export_event_details_to_csv(&report, &out.join("details.csv")).unwrap();
    export_report_to_json(&report, None, &out.join("report.json")).unwrap();

    let earnings = std::fs::read_to_string(out.join("earnings.csv")).unwrap();
    // header + 3 associations + coordinator
    assert_eq!(earnings.lines().count(), 5);

    let details = std::fs::read_to_string(out.join("details.csv")).unwrap();
    // header + 2 + 2 + 1 (event 4 has no assignments left)
    assert_eq!(details.lines().count(), 6);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
    assert!(json["status_filter"].is_null());
    assert_eq!(json["coordinator_earnings"]["events_count"], 3);
}

#[tokio::test]
async fn test_missing_ledger_file() {
    let dir = TempDir::new().unwrap();
    let err = Ledger::load(&dir.path().join("nope.json")).await.unwrap_err();
    assert!(matches!(err, CoreError::FileNotFound { .. }));
}

#[test]
fn test_custom_config_changes_totals() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "base_cost = 200.0\ncertification_fee = 0.0\n").unwrap();

    let config = EngineConfig::load(&path).unwrap();
    let model = CostModel::new(config);

    // 200 + 50 * 6 = 500, share 50
    let cost = model.compute(50.0);
    assert_eq!(cost.total_cost, 500.0);
    assert_eq!(cost.coordinator_share, 50.0);
    assert_eq!(cost.available_for_associations(), 450.0);
}
