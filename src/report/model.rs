//! Report models and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Location, WasteCategory};

/// Citizen waste report
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: WasteCategory,
    pub location: Location,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub citizen_id: String,
    pub status: ReportStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_decision_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_collector_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector_status: Option<CollectorTaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector_confirmed_category: Option<WasteCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<DateTime<Utc>>,
}

impl Report {
    /// Collected reports accept no further lifecycle changes
    pub fn is_closed(&self) -> bool {
        self.status == ReportStatus::Collected
    }

    /// Collector-facing status, `assigned` when none has been recorded yet
    pub fn task_status(&self) -> CollectorTaskStatus {
        self.collector_status.unwrap_or(CollectorTaskStatus::Assigned)
    }

    /// Whether the collector confirmed the category the citizen reported
    pub fn classification_matched(&self) -> Option<bool> {
        self.collector_confirmed_category
            .map(|confirmed| confirmed == self.category)
    }

    pub(crate) fn clear_assignment(&mut self) {
        self.assigned_collector_id = None;
        self.assigned_at = None;
        self.collector_status = None;
    }
}

/// Report lifecycle status
///
/// `pending -> accepted | rejected`, `accepted -> assigned`,
/// `assigned -> collected`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Accepted,
    Rejected,
    Assigned,
    Collected,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 5] = [
        ReportStatus::Pending,
        ReportStatus::Accepted,
        ReportStatus::Rejected,
        ReportStatus::Assigned,
        ReportStatus::Collected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Accepted => "accepted",
            ReportStatus::Rejected => "rejected",
            ReportStatus::Assigned => "assigned",
            ReportStatus::Collected => "collected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Rejected | ReportStatus::Collected)
    }
}

/// Collector-facing task status, tracked separately from the report status
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CollectorTaskStatus {
    Assigned,
    OnTheWay,
    Collected,
}

/// Shared badge styles the collector status maps onto
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StatusBadge {
    Pending,
    InProgress,
    Completed,
}

impl CollectorTaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CollectorTaskStatus::Assigned => "Assigned",
            CollectorTaskStatus::OnTheWay => "On the way",
            CollectorTaskStatus::Collected => "Collected",
        }
    }

    pub fn badge(&self) -> StatusBadge {
        match self {
            CollectorTaskStatus::Assigned => StatusBadge::Pending,
            CollectorTaskStatus::OnTheWay => StatusBadge::InProgress,
            CollectorTaskStatus::Collected => StatusBadge::Completed,
        }
    }

    /// Next step a collector advances to, if any
    pub fn next(&self) -> Option<CollectorTaskStatus> {
        match self {
            CollectorTaskStatus::Assigned => Some(CollectorTaskStatus::OnTheWay),
            CollectorTaskStatus::OnTheWay => Some(CollectorTaskStatus::Collected),
            CollectorTaskStatus::Collected => None,
        }
    }
}

/// Request DTO for creating a report
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub description: String,
    pub category: WasteCategory,
    #[validate]
    pub location: Location,
    #[serde(default)]
    pub images: Vec<String>,
    #[validate(length(min = 1, message = "Citizen id must not be empty"))]
    pub citizen_id: String,
}

/// Request DTO for the collector's proof of collection
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProofRequest {
    pub report_id: String,
    pub collector_confirmed_category: WasteCategory,
    #[serde(default)]
    pub proof_note: Option<String>,
    #[serde(default)]
    pub proof_images: Option<Vec<String>>,
}

/// Assigned-task row shown to a collector
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectorTask {
    pub report_id: String,
    pub category: WasteCategory,
    pub address: String,
    pub status: CollectorTaskStatus,
}

impl From<&Report> for CollectorTask {
    fn from(report: &Report) -> Self {
        Self {
            report_id: report.id.clone(),
            category: report.category,
            address: report.location.address.clone(),
            status: report.task_status(),
        }
    }
}

/// Platform event types published after each state change
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum PlatformEvent {
    ReportCreated {
        report_id: String,
        citizen_id: String,
    },
    ReportAccepted {
        report_id: String,
    },
    ReportRejected {
        report_id: String,
        note: Option<String>,
    },
    CollectorAssigned {
        report_id: String,
        collector_id: String,
    },
    CollectorStatusChanged {
        report_id: String,
        status: CollectorTaskStatus,
    },
    ReportCollected {
        report_id: String,
        transaction_id: String,
        points: i64,
    },
    RewardRulesUpdated,
    StateReset,
}

impl PlatformEvent {
    /// Report the event concerns, if it is report-scoped
    pub fn report_id(&self) -> Option<&str> {
        match self {
            PlatformEvent::ReportCreated { report_id, .. }
            | PlatformEvent::ReportAccepted { report_id }
            | PlatformEvent::ReportRejected { report_id, .. }
            | PlatformEvent::CollectorAssigned { report_id, .. }
            | PlatformEvent::CollectorStatusChanged { report_id, .. }
            | PlatformEvent::ReportCollected { report_id, .. } => Some(report_id),
            PlatformEvent::RewardRulesUpdated | PlatformEvent::StateReset => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_status_progression() {
        assert_eq!(
            CollectorTaskStatus::Assigned.next(),
            Some(CollectorTaskStatus::OnTheWay)
        );
        assert_eq!(
            CollectorTaskStatus::OnTheWay.next(),
            Some(CollectorTaskStatus::Collected)
        );
        assert_eq!(CollectorTaskStatus::Collected.next(), None);
    }

    #[test]
    fn test_collector_status_labels_and_badges() {
        assert_eq!(CollectorTaskStatus::OnTheWay.label(), "On the way");
        assert_eq!(CollectorTaskStatus::Assigned.badge(), StatusBadge::Pending);
        assert_eq!(
            CollectorTaskStatus::OnTheWay.badge(),
            StatusBadge::InProgress
        );
        assert_eq!(
            CollectorTaskStatus::Collected.badge(),
            StatusBadge::Completed
        );
    }

    #[test]
    fn test_collector_status_wire_format() {
        let json = serde_json::to_string(&CollectorTaskStatus::OnTheWay).unwrap();
        assert_eq!(json, "\"on-the-way\"");
        let parsed: CollectorTaskStatus = serde_json::from_str("\"collected\"").unwrap();
        assert_eq!(parsed, CollectorTaskStatus::Collected);
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = ReportStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![ReportStatus::Rejected, ReportStatus::Collected]);
    }

    #[test]
    fn test_create_request_validation() {
        let mut request = CreateReportRequest {
            title: "Overflowing bin".to_string(),
            description: String::new(),
            category: WasteCategory::Organic,
            location: Location {
                address: "1 Market St".to_string(),
                lat: 10.0,
                lng: 106.0,
            },
            images: vec![],
            citizen_id: "user1".to_string(),
        };
        assert!(request.validate().is_ok());

        request.title = String::new();
        assert!(request.validate().is_err());

        request.title = "Overflowing bin".to_string();
        request.location.lat = 91.0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_event_is_tagged() {
        let event = PlatformEvent::ReportAccepted {
            report_id: "AR-1".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ReportAccepted");
        assert_eq!(event.report_id(), Some("AR-1"));
        assert_eq!(PlatformEvent::StateReset.report_id(), None);
    }
}
