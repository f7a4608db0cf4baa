//! stageledger-core - Core library for stageledger
//!
//! Provides the event cost model, earnings allocation, report aggregation,
//! ledger loading and export for community event bookkeeping.

pub mod allocation;
pub mod config;
pub mod cost;
pub mod error;
pub mod export;
pub mod ledger;
pub mod report;

pub use allocation::{allocate_earnings, allocate_event};
pub use config::EngineConfig;
pub use cost::CostModel;
pub use error::{CoreError, ErrorSeverity, LoadError, LoadReport};
pub use export::{export_event_details_to_csv, export_report_to_csv, export_report_to_json};
pub use ledger::Ledger;
pub use report::{aggregate, aggregate_concurrent, association_earnings, coordinator_earnings};
