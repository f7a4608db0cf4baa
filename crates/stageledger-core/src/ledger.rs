//! Ledger file loading
//!
//! A ledger is a JSON export of associations and events, as the service
//! layer keeps them. Loading resolves association names, validates every
//! event and folds duplicate assignments, recording problems in a
//! [`LoadReport`] instead of failing on the first bad record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stageledger_types::{
    AssignOutcome, AssociationContribution, AssociationEarnings, AssociationId, EventId,
    EventRecord, EventStatus,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::cost::CostModel;
use crate::error::{CoreError, LoadError, LoadReport};
use crate::report;

/// On-disk ledger layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerFile {
    #[serde(default)]
    pub associations: Vec<AssociationEntry>,
    #[serde(default)]
    pub events: Vec<EventEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationEntry {
    pub id: AssociationId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(default)]
    pub volunteers: Vec<VolunteerEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolunteerEntry {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub is_certified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub status: EventStatus,
    pub stage_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignments: Vec<AssignmentEntry>,
}

/// One association assigned to one event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentEntry {
    pub association_id: AssociationId,
    pub volunteer_count: u32,
    /// Named volunteers; informational, the count drives the allocation
    #[serde(default)]
    pub volunteer_ids: Vec<u64>,
}

/// Reads ledger JSON files
#[derive(Debug, Default)]
pub struct LedgerParser;

impl LedgerParser {
    pub fn new() -> Self {
        Self
    }

    pub async fn parse(&self, path: &Path) -> Result<LedgerFile, CoreError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                CoreError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        serde_json::from_str(&content).map_err(|e| CoreError::JsonParse {
            path: path.to_path_buf(),
            message: e.to_string(),
            source: e,
        })
    }
}

/// Stage size must be a finite, non-negative number
pub fn validate_stage_size(event_id: EventId, stage_size: f64) -> Result<(), CoreError> {
    if !stage_size.is_finite() {
        return Err(CoreError::InvalidEvent {
            event_id: event_id.get(),
            reason: format!("stage size is not a finite number ({})", stage_size),
        });
    }
    if stage_size < 0.0 {
        return Err(CoreError::InvalidEvent {
            event_id: event_id.get(),
            reason: format!("stage size is negative ({} m²)", stage_size),
        });
    }
    Ok(())
}

/// Validated associations and events, ready for the engine
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    associations: Vec<AssociationEntry>,
    events: Vec<EventRecord>,
}

impl Ledger {
    /// Read, validate and resolve a ledger file
    pub async fn load(path: &Path) -> Result<(Self, LoadReport), CoreError> {
        let file = LedgerParser::new().parse(path).await?;
        let mut report = LoadReport::new();
        let ledger = Self::from_file(file, &mut report);

        info!(
            path = %path.display(),
            associations = report.associations_loaded,
            events = report.events_loaded,
            skipped = report.events_skipped,
            "Loaded ledger"
        );
        Ok((ledger, report))
    }

    /// Build from an already-parsed file, skipping invalid records
    pub fn from_file(file: LedgerFile, report: &mut LoadReport) -> Self {
        let mut associations: Vec<AssociationEntry> = Vec::with_capacity(file.associations.len());
        let mut seen_associations = HashSet::new();
        for association in file.associations {
            if !seen_associations.insert(association.id) {
                warn!(association_id = %association.id, "Duplicate association id, skipping");
                report.add_error(LoadError::error(
                    format!("association {}", association.id),
                    "Duplicate association id",
                ));
                continue;
            }
            associations.push(association);
        }
        report.associations_loaded = associations.len();

        let by_id: HashMap<AssociationId, &AssociationEntry> =
            associations.iter().map(|a| (a.id, a)).collect();

        let declared_events = file.events.len();
        let mut events = Vec::with_capacity(declared_events);
        let mut seen_events = HashSet::new();
        for entry in file.events {
            let source = format!("event {}", entry.id);

            if !seen_events.insert(entry.id) {
                let err = CoreError::DuplicateEvent {
                    event_id: entry.id.get(),
                };
                warn!(error = %err, "Skipping event");
                report.add_error(LoadError::from_core_error(source, &err));
                report.events_skipped += 1;
                continue;
            }

            if let Err(err) = validate_stage_size(entry.id, entry.stage_size) {
                warn!(error = %err, "Skipping event");
                report.add_error(LoadError::from_core_error(source, &err));
                report.events_skipped += 1;
                continue;
            }

            events.push(resolve_event(entry, &by_id, report));
        }
        report.events_loaded = events.len();
        if declared_events > 0 && events.is_empty() {
            report.add_fatal("ledger", "No valid events in ledger");
        }

        Self {
            associations,
            events,
        }
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn into_events(self) -> Vec<EventRecord> {
        self.events
    }

    pub fn associations(&self) -> &[AssociationEntry] {
        &self.associations
    }

    pub fn association(&self, id: AssociationId) -> Option<&AssociationEntry> {
        self.associations.iter().find(|a| a.id == id)
    }

    /// Earnings of a known association (zero totals if it has no events)
    pub fn association_earnings(
        &self,
        model: &CostModel,
        association_id: AssociationId,
        status_filter: Option<EventStatus>,
    ) -> Result<AssociationEarnings, CoreError> {
        let association = self
            .association(association_id)
            .ok_or(CoreError::AssociationNotFound {
                association_id: association_id.get(),
            })?;

        let mut earnings =
            report::association_earnings(model, &self.events, association_id, status_filter);
        earnings.association_name = association.name.clone();
        Ok(earnings)
    }
}

fn resolve_event(
    entry: EventEntry,
    associations: &HashMap<AssociationId, &AssociationEntry>,
    report: &mut LoadReport,
) -> EventRecord {
    let source = format!("event {}", entry.id);
    let mut event = EventRecord {
        id: entry.id,
        title: entry.title,
        status: entry.status,
        stage_size: entry.stage_size,
        location: entry.location,
        requester: entry.requester,
        start_datetime: entry.start_datetime,
        end_datetime: entry.end_datetime,
        contributions: Vec::with_capacity(entry.assignments.len()),
    };

    for assignment in entry.assignments {
        let Some(association) = associations.get(&assignment.association_id) else {
            let err = CoreError::UnknownAssociation {
                event_id: event.id.get(),
                association_id: assignment.association_id.get(),
            };
            warn!(error = %err, "Skipping assignment");
            report.add_error(LoadError::from_core_error(source.clone(), &err));
            report.assignments_skipped += 1;
            continue;
        };

        let foreign: Vec<u64> = assignment
            .volunteer_ids
            .iter()
            .copied()
            .filter(|id| !association.volunteers.iter().any(|v| v.id == *id))
            .collect();
        if !foreign.is_empty() {
            report.add_warning(
                source.clone(),
                format!(
                    "Volunteers {:?} do not belong to association {}, ignored",
                    foreign, association.id
                ),
            );
        }

        let contribution = AssociationContribution::new(
            association.id,
            association.name.clone(),
            assignment.volunteer_count,
        );
        if let AssignOutcome::Updated {
            previous_volunteers,
        } = event.assign(contribution)
        {
            debug!(event_id = %event.id, association_id = %association.id, "Assignment updated in place");
            report.add_error(
                LoadError::warning(
                    source.clone(),
                    format!(
                        "Association {} assigned twice; volunteer count {} replaced by {}",
                        association.id, previous_volunteers, assignment.volunteer_count
                    ),
                )
                .with_suggestion("Keep a single assignment per association and event"),
            );
        }
    }

    event
}
