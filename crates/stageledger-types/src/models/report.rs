//! Cost, allocation and report result types
//!
//! All values are derived on demand and never persisted.

use serde::{Deserialize, Serialize};

use super::event::{AssociationId, EventId};

/// Cost of a single event, split into its fixed parts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventCostResult {
    /// Total cost, multiple of the rounding quantum
    pub total_cost: f64,
    /// Coordinator share, multiple of the rounding quantum
    pub coordinator_share: f64,
    /// Fixed per-event certification fee
    pub certification_fee: f64,
}

impl EventCostResult {
    /// Remainder left for associations after fee and coordinator share
    pub fn available_for_associations(&self) -> f64 {
        self.total_cost - self.certification_fee - self.coordinator_share
    }
}

/// Full cost breakdown for a stage size, including the formula parameters used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub stage_size: f64,
    pub total_cost: f64,
    pub coordinator_share: f64,
    pub certification_fee: f64,
    pub available_for_associations: f64,
    pub rate_per_sqm: f64,
    pub base_cost: f64,
    pub coordinator_percentage: f64,
}

/// Earnings of one association for one event (not quantized)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub association_id: AssociationId,
    pub association_name: String,
    pub volunteer_count: u32,
    pub earnings: f64,
}

/// Running total for one association across the events in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationEarnings {
    pub association_id: AssociationId,
    pub association_name: String,
    pub total_earnings: f64,
    /// Events in which the association has a contribution (including zero-earning ones)
    pub events_count: usize,
}

/// Running total for the coordinating body
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorEarnings {
    pub total_earnings: f64,
    pub events_count: usize,
}

/// Report-wide totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallTotals {
    pub total_events: usize,
    pub total_revenue: f64,
    pub total_coordinator_earnings: f64,
    /// Sum of the per-association running totals
    pub total_association_earnings: f64,
    pub total_certification_costs: f64,
}

impl OverallTotals {
    /// Revenue not assigned to the fee, the coordinator or any association
    /// (non-zero only when some events have no volunteers)
    pub fn undistributed(&self) -> f64 {
        self.total_revenue
            - self.total_certification_costs
            - self.total_coordinator_earnings
            - self.total_association_earnings
    }
}

/// Per-event breakdown emitted when details are requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEarningsDetail {
    pub event_id: EventId,
    pub event_title: String,
    pub total_cost: f64,
    pub coordinator_share: f64,
    pub certification_cost: f64,
    pub associations: Vec<AllocationResult>,
}

/// Complete earnings report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub association_earnings: Vec<AssociationEarnings>,
    pub coordinator_earnings: CoordinatorEarnings,
    pub overall_totals: OverallTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_with_earnings: Option<Vec<EventEarningsDetail>>,
}

impl Report {
    pub fn association(&self, id: AssociationId) -> Option<&AssociationEarnings> {
        self.association_earnings
            .iter()
            .find(|a| a.association_id == id)
    }
}
