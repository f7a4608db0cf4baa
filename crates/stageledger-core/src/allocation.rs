//! Earnings allocation among the associations of one event
//!
//! After the certification fee and the coordinator share, the rest of the
//! event cost is split among the assigned associations in proportion to the
//! volunteers each one contributed:
//!
//! ```text
//! available = total_cost - certification_fee - coordinator_share
//! earnings  = available × (association_volunteers / total_volunteers)
//! ```
//!
//! Earnings are not rounded. An event with no volunteers at all distributes
//! nothing: every association gets 0.0 and the remainder stays undistributed.

use stageledger_types::{AllocationResult, AssociationContribution, EventCostResult};

use crate::cost::CostModel;

/// Earnings of one association for one event.
///
/// `total_volunteers` must be the sum over all associations of the event.
/// Callers guarantee `association_volunteers <= total_volunteers`.
pub fn allocate_earnings(
    total_cost: f64,
    coordinator_share: f64,
    certification_fee: f64,
    association_volunteers: u32,
    total_volunteers: u64,
) -> f64 {
    if total_volunteers == 0 {
        return 0.0;
    }

    let available = total_cost - certification_fee - coordinator_share;
    let volunteer_fraction = association_volunteers as f64 / total_volunteers as f64;
    available * volunteer_fraction
}

/// Allocate one event's remainder across all its contributions, in input order
pub fn allocate_event(
    cost: &EventCostResult,
    contributions: &[AssociationContribution],
) -> Vec<AllocationResult> {
    let total_volunteers: u64 = contributions
        .iter()
        .map(|c| u64::from(c.volunteer_count))
        .sum();

    contributions
        .iter()
        .map(|c| AllocationResult {
            association_id: c.association_id,
            association_name: c.association_name.clone(),
            volunteer_count: c.volunteer_count,
            earnings: allocate_earnings(
                cost.total_cost,
                cost.coordinator_share,
                cost.certification_fee,
                c.volunteer_count,
                total_volunteers,
            ),
        })
        .collect()
}

impl CostModel {
    /// [`allocate_earnings`] with this model's certification fee
    pub fn allocate_earnings(
        &self,
        total_cost: f64,
        coordinator_share: f64,
        association_volunteers: u32,
        total_volunteers: u64,
    ) -> f64 {
        allocate_earnings(
            total_cost,
            coordinator_share,
            self.certification_fee(),
            association_volunteers,
            total_volunteers,
        )
    }
}
