//! stageledger-types - Shared data types for stageledger
//!
//! This crate contains pure data structures without heavy dependencies.
//! No tokio, no caches - just serde-serializable types.
//!
//! Used by:
//! - stageledger-core (cost model, allocation, reports)
//! - stageledger (CLI rendering)

pub mod models;

pub use models::{
    AllocationResult, AssignOutcome, AssociationContribution, AssociationEarnings, AssociationId,
    CoordinatorEarnings, CostBreakdown, EventCostResult, EventEarningsDetail, EventId,
    EventRecord, EventStatus, OverallTotals, Report,
};
