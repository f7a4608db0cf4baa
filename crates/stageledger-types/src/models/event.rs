//! Event and assignment records consumed by the allocation engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Newtype for Event ID - zero-cost type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for Association ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssociationId(u64);

impl AssociationId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for AssociationId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for AssociationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a stage-rental event
///
/// Serialized with the display labels used by the municipal office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EventStatus {
    #[default]
    #[serde(rename = "To Be Scheduled")]
    ToBeScheduled,
    #[serde(rename = "Contribution Received")]
    ContributionReceived,
    #[serde(rename = "Certified Assembly")]
    CertifiedAssembly,
    #[serde(rename = "Contribution Paid to Association")]
    ContributionPaidToAssociation,
    #[serde(rename = "Completed")]
    Completed,
}

impl EventStatus {
    pub const ALL: [EventStatus; 5] = [
        EventStatus::ToBeScheduled,
        EventStatus::ContributionReceived,
        EventStatus::CertifiedAssembly,
        EventStatus::ContributionPaidToAssociation,
        EventStatus::Completed,
    ];

    /// Human-readable label (matches the serialized form)
    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::ToBeScheduled => "To Be Scheduled",
            EventStatus::ContributionReceived => "Contribution Received",
            EventStatus::CertifiedAssembly => "Certified Assembly",
            EventStatus::ContributionPaidToAssociation => "Contribution Paid to Association",
            EventStatus::Completed => "Completed",
        }
    }

    /// Kebab-case slug used on the command line
    pub fn slug(&self) -> &'static str {
        match self {
            EventStatus::ToBeScheduled => "to-be-scheduled",
            EventStatus::ContributionReceived => "contribution-received",
            EventStatus::CertifiedAssembly => "certified-assembly",
            EventStatus::ContributionPaidToAssociation => "contribution-paid",
            EventStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    /// Accepts either the slug or the label, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        EventStatus::ALL
            .into_iter()
            .find(|status| {
                status.slug().eq_ignore_ascii_case(needle)
                    || status.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| {
                let expected: Vec<&str> = EventStatus::ALL.iter().map(|s| s.slug()).collect();
                format!(
                    "Unknown event status '{}' (expected one of: {})",
                    s,
                    expected.join(", ")
                )
            })
    }
}

/// Volunteers one association contributes to one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationContribution {
    pub association_id: AssociationId,
    /// Display name resolved by the loading layer
    #[serde(default)]
    pub association_name: String,
    pub volunteer_count: u32,
}

impl AssociationContribution {
    pub fn new(
        association_id: impl Into<AssociationId>,
        association_name: impl Into<String>,
        volunteer_count: u32,
    ) -> Self {
        Self {
            association_id: association_id.into(),
            association_name: association_name.into(),
            volunteer_count,
        }
    }
}

/// Result of assigning an association to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    Created,
    /// The association was already assigned; its count was replaced
    Updated { previous_volunteers: u32 },
}

/// An event as handed to the engine: already loaded, already validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub status: EventStatus,
    /// Stage size in square meters
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
    pub contributions: Vec<AssociationContribution>,
}

impl EventRecord {
    pub fn new(
        id: impl Into<EventId>,
        title: impl Into<String>,
        status: EventStatus,
        stage_size: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status,
            stage_size,
            location: None,
            requester: None,
            start_datetime: None,
            end_datetime: None,
            contributions: Vec::new(),
        }
    }

    /// Builder-style assignment, for fixtures and tests
    pub fn with_contribution(mut self, contribution: AssociationContribution) -> Self {
        self.assign(contribution);
        self
    }

    /// Assign an association to this event.
    ///
    /// Keeps at most one contribution per association: re-assigning updates
    /// the existing entry in place rather than adding a second one.
    pub fn assign(&mut self, contribution: AssociationContribution) -> AssignOutcome {
        match self
            .contributions
            .iter_mut()
            .find(|c| c.association_id == contribution.association_id)
        {
            Some(existing) => {
                let previous_volunteers = existing.volunteer_count;
                *existing = contribution;
                AssignOutcome::Updated {
                    previous_volunteers,
                }
            }
            None => {
                self.contributions.push(contribution);
                AssignOutcome::Created
            }
        }
    }

    /// Remove an association from this event. Returns false if it was not assigned.
    pub fn remove_association(&mut self, association_id: AssociationId) -> bool {
        let before = self.contributions.len();
        self.contributions.retain(|c| c.association_id != association_id);
        self.contributions.len() != before
    }

    pub fn contribution_for(
        &self,
        association_id: AssociationId,
    ) -> Option<&AssociationContribution> {
        self.contributions
            .iter()
            .find(|c| c.association_id == association_id)
    }

    /// Sum of volunteer counts across every association assigned to the event
    pub fn total_volunteers(&self) -> u64 {
        self.contributions
            .iter()
            .map(|c| u64::from(c.volunteer_count))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_slug_and_label() {
        assert_eq!(
            "completed".parse::<EventStatus>().unwrap(),
            EventStatus::Completed
        );
        assert_eq!(
            "Contribution Paid to Association".parse::<EventStatus>().unwrap(),
            EventStatus::ContributionPaidToAssociation
        );
        assert_eq!(
            "CERTIFIED-ASSEMBLY".parse::<EventStatus>().unwrap(),
            EventStatus::CertifiedAssembly
        );
        assert!("cancelled".parse::<EventStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_with_label() {
        let json = serde_json::to_string(&EventStatus::ContributionReceived).unwrap();
        assert_eq!(json, "\"Contribution Received\"");
    }

    #[test]
    fn test_assign_updates_in_place() {
        let mut event = EventRecord::new(1, "Sagra", EventStatus::Completed, 50.0);
        assert_eq!(
            event.assign(AssociationContribution::new(7, "Alpini", 3)),
            AssignOutcome::Created
        );
        assert_eq!(
            event.assign(AssociationContribution::new(7, "Alpini", 5)),
            AssignOutcome::Updated {
                previous_volunteers: 3
            }
        );

        assert_eq!(event.contributions.len(), 1);
        assert_eq!(event.total_volunteers(), 5);
    }

    #[test]
    fn test_remove_association() {
        let mut event = EventRecord::new(1, "Sagra", EventStatus::Completed, 50.0)
            .with_contribution(AssociationContribution::new(1, "Alpini", 3))
            .with_contribution(AssociationContribution::new(2, "Avis", 7));

        assert!(event.remove_association(AssociationId::new(1)));
        assert!(!event.remove_association(AssociationId::new(1)));
        assert_eq!(event.total_volunteers(), 7);
        assert!(event.contribution_for(AssociationId::new(2)).is_some());
    }

    #[test]
    fn test_total_volunteers_beyond_u32() {
        let event = EventRecord::new(1, "Sagra", EventStatus::Completed, 50.0)
            .with_contribution(AssociationContribution::new(1, "Alpini", 3_000_000_000))
            .with_contribution(AssociationContribution::new(2, "Avis", 3_000_000_000));

        assert_eq!(event.total_volunteers(), 6_000_000_000);
    }
}
