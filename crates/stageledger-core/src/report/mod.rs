//! Earnings reports over event collections
//!
//! Runs the cost model and the allocation over every event that passes the
//! status filter, and accumulates:
//! - overall revenue, coordinator earnings and certification costs
//! - per-association earnings and event counts
//! - optionally, the per-event breakdown (in input order)

use std::collections::HashMap;
use std::sync::Arc;

use stageledger_types::{
    AllocationResult, AssociationEarnings, AssociationId, CoordinatorEarnings, EventCostResult,
    EventEarningsDetail, EventRecord, EventStatus, OverallTotals, Report,
};
use tracing::debug;

use crate::allocation::allocate_event;
use crate::cost::CostModel;
use crate::error::CoreError;


/// Accumulators for a single aggregation pass
///
/// Partial totals from disjoint event chunks can be combined with
/// [`ReportTotals::merge`].
#[derive(Debug, Clone, Default)]
pub struct ReportTotals {
    associations: HashMap<AssociationId, AssociationEarnings>,
    total_events: usize,
    total_revenue: f64,
    total_coordinator_earnings: f64,
    total_certification_costs: f64,
    include_details: bool,
    details: Vec<EventEarningsDetail>,
}

impl ReportTotals {
    pub fn new(include_details: bool) -> Self {
        Self {
            include_details,
            ..Default::default()
        }
    }

    /// Add one event's cost and allocations
    pub fn record_event(
        &mut self,
        event: &EventRecord,
        cost: EventCostResult,
        allocations: Vec<AllocationResult>,
    ) {
        self.total_events += 1;
        self.total_revenue += cost.total_cost;
        self.total_coordinator_earnings += cost.coordinator_share;
        self.total_certification_costs += cost.certification_fee;

        for allocation in &allocations {
            let entry = self
                .associations
                .entry(allocation.association_id)
                .or_insert_with(|| AssociationEarnings {
                    association_id: allocation.association_id,
                    association_name: allocation.association_name.clone(),
                    total_earnings: 0.0,
                    events_count: 0,
                });
            entry.total_earnings += allocation.earnings;
            // Counted even when the event had no volunteers and paid 0.0
            entry.events_count += 1;
        }

        if self.include_details {
            self.details.push(EventEarningsDetail {
                event_id: event.id,
                event_title: event.title.clone(),
                total_cost: cost.total_cost,
                coordinator_share: cost.coordinator_share,
                certification_cost: cost.certification_fee,
                associations: allocations,
            });
        }
    }

    /// Fold in totals computed over events that come after this chunk
    pub fn merge(&mut self, other: ReportTotals) {
        self.total_events += other.total_events;
        self.total_revenue += other.total_revenue;
        self.total_coordinator_earnings += other.total_coordinator_earnings;
        self.total_certification_costs += other.total_certification_costs;

        for (id, earnings) in other.associations {
            match self.associations.get_mut(&id) {
                Some(existing) => {
                    existing.total_earnings += earnings.total_earnings;
                    existing.events_count += earnings.events_count;
                    if existing.association_name.is_empty() {
                        existing.association_name = earnings.association_name;
                    }
                }
                None => {
                    self.associations.insert(id, earnings);
                }
            }
        }

        self.details.extend(other.details);
    }

    pub fn total_events(&self) -> usize {
        self.total_events
    }

    pub fn into_report(self) -> Report {
        let mut association_earnings: Vec<AssociationEarnings> =
            self.associations.into_values().collect();
        association_earnings.sort_by_key(|a| a.association_id);

        let total_association_earnings =
            association_earnings.iter().map(|a| a.total_earnings).sum();

        Report {
            association_earnings,
            coordinator_earnings: CoordinatorEarnings {
                total_earnings: self.total_coordinator_earnings,
                events_count: self.total_events,
            },
            overall_totals: OverallTotals {
                total_events: self.total_events,
                total_revenue: self.total_revenue,
                total_coordinator_earnings: self.total_coordinator_earnings,
                total_association_earnings,
                total_certification_costs: self.total_certification_costs,
            },
            events_with_earnings: self.include_details.then_some(self.details),
        }
    }
}

/// Events matching the status filter (all events when `None`)
pub fn filter_events(
    events: &[EventRecord],
    status_filter: Option<EventStatus>,
) -> impl Iterator<Item = &EventRecord> {
    events
        .iter()
        .filter(move |event| status_filter.is_none_or(|status| event.status == status))
}

fn aggregate_totals(
    model: &CostModel,
    events: &[EventRecord],
    status_filter: Option<EventStatus>,
    include_details: bool,
) -> ReportTotals {
    let mut totals = ReportTotals::new(include_details);

    for event in filter_events(events, status_filter) {
        let cost = model.compute(event.stage_size);
        let allocations = allocate_event(&cost, &event.contributions);
        totals.record_event(event, cost, allocations);
    }

    totals
}

/// Build the earnings report for `events`
///
/// Association totals are sorted by association id. Per-event details, when
/// requested, follow the input order.
pub fn aggregate(
    model: &CostModel,
    events: &[EventRecord],
    status_filter: Option<EventStatus>,
    include_details: bool,
) -> Report {
    let totals = aggregate_totals(model, events, status_filter, include_details);
    debug!(
        input = events.len(),
        aggregated = totals.total_events(),
        status = ?status_filter,
        "Aggregated earnings report"
    );
    totals.into_report()
}

/// Same report as [`aggregate`], computed in chunks on the blocking pool
///
/// Each chunk accumulates into its own [`ReportTotals`]; partials are merged
/// in chunk order, so details keep the input order. Per-association sums may
/// differ from the sequential pass in the last bits (summation order).
pub async fn aggregate_concurrent(
    model: Arc<CostModel>,
    events: Arc<[EventRecord]>,
    status_filter: Option<EventStatus>,
    include_details: bool,
) -> Result<Report, CoreError> {
    let chunk_size = model.config().concurrency_chunk_size.max(1);

    let handles: Vec<_> = (0..events.len())
        .step_by(chunk_size)
        .map(|start| {
            let end = (start + chunk_size).min(events.len());
            let model = Arc::clone(&model);
            let events = Arc::clone(&events);
            tokio::task::spawn_blocking(move || {
                aggregate_totals(&model, &events[start..end], status_filter, include_details)
            })
        })
        .collect();

    let chunks = handles.len();
    let mut totals = ReportTotals::new(include_details);
    for handle in handles {
        let partial = handle.await.map_err(|e| CoreError::TaskFailed {
            message: e.to_string(),
        })?;
        totals.merge(partial);
    }

    debug!(
        input = events.len(),
        aggregated = totals.total_events(),
        chunks,
        "Aggregated earnings report concurrently"
    );
    Ok(totals.into_report())
}

/// Earnings of one association over the events it contributed to
///
/// The name is taken from the first matching contribution; it is empty when
/// the association has no contributions in the filtered events.
pub fn association_earnings(
    model: &CostModel,
    events: &[EventRecord],
    association_id: AssociationId,
    status_filter: Option<EventStatus>,
) -> AssociationEarnings {
    let mut result = AssociationEarnings {
        association_id,
        association_name: String::new(),
        total_earnings: 0.0,
        events_count: 0,
    };

    for event in filter_events(events, status_filter) {
        let Some(contribution) = event.contribution_for(association_id) else {
            continue;
        };

        let cost = model.compute(event.stage_size);
        result.total_earnings += model.allocate_earnings(
            cost.total_cost,
            cost.coordinator_share,
            contribution.volunteer_count,
            event.total_volunteers(),
        );
        result.events_count += 1;

        if result.association_name.is_empty() {
            result.association_name = contribution.association_name.clone();
        }
    }

    result
}

/// Coordinator share summed over the filtered events
pub fn coordinator_earnings(
    model: &CostModel,
    events: &[EventRecord],
    status_filter: Option<EventStatus>,
) -> CoordinatorEarnings {
    filter_events(events, status_filter).fold(CoordinatorEarnings::default(), |mut acc, event| {
        let total_cost = model.event_cost(event.stage_size);
        acc.total_earnings += model.coordinator_share(total_cost);
        acc.events_count += 1;
        acc
    })
}
