//! Data models for stageledger

pub mod event;
pub mod report;

pub use event::{
    AssignOutcome, AssociationContribution, AssociationId, EventId, EventRecord, EventStatus,
};
pub use report::{
    AllocationResult, AssociationEarnings, CoordinatorEarnings, CostBreakdown, EventCostResult,
    EventEarningsDetail, OverallTotals, Report,
};
