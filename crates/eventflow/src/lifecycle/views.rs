use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    LifecycleSubject, ProgressSnapshot, ProposalRecord, ProposalStatus, SubjectKind, TimelineEntry,
    VerificationStatus,
};

/// Subject as exposed to the dashboard. Tenant scoping stays server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectView {
    pub id: String,
    pub name: String,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

impl SubjectView {
    pub fn from_subject(subject: &LifecycleSubject) -> Self {
        Self {
            id: subject.id.0.clone(),
            name: subject.name.clone(),
            verification_status: subject.verification_status,
            created_at: subject.created_at,
            verified_at: subject.verified_at,
        }
    }
}

/// Raw proposal rows echoed alongside the timeline, minus tenant scoping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalView {
    pub id: String,
    pub entity_type: SubjectKind,
    pub entity_id: String,
    pub status: ProposalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ProposalView {
    pub fn from_record(record: &ProposalRecord) -> Self {
        Self {
            id: record.id.0.clone(),
            entity_type: record.entity_type,
            entity_id: record.entity_id.0.clone(),
            status: record.status,
            actor_id: record.actor_id.clone(),
            submitted_at: record.submitted_at,
            decided_at: record.decided_at,
            summary: record.summary.clone(),
        }
    }
}

/// Keys the subject under `event` or `company` depending on its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectEnvelope {
    Event(SubjectView),
    Company(SubjectView),
}

impl SubjectEnvelope {
    pub fn new(kind: SubjectKind, view: SubjectView) -> Self {
        match kind {
            SubjectKind::Event => Self::Event(view),
            SubjectKind::Company => Self::Company(view),
        }
    }
}

/// Final payload consumed by the dashboard: the subject, its raw proposal
/// rows, the progress snapshot, and the ordered timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleResponse {
    #[serde(flatten)]
    pub subject: SubjectEnvelope,
    pub proposals: Vec<ProposalView>,
    pub progress: ProgressSnapshot,
    pub timeline: Vec<TimelineEntry>,
}
