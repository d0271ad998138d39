use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for the owning tenant. Never serialized into
/// lifecycle responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

/// Identifier wrapper for lifecycle subjects (events and companies).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(pub String);

const MAX_IDENTIFIER_LEN: usize = 64;

impl SubjectId {
    /// Validate a caller-supplied identifier before it reaches storage.
    /// Accepts non-empty strings of at most 64 ASCII alphanumerics,
    /// hyphens, and underscores.
    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidIdentifier::Empty);
        }
        if trimmed.len() > MAX_IDENTIFIER_LEN {
            return Err(InvalidIdentifier::TooLong {
                length: trimmed.len(),
            });
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
        {
            return Err(InvalidIdentifier::BadCharacter { character: bad });
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Rejection reasons for malformed subject identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidIdentifier {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier is {length} characters, limit is {MAX_IDENTIFIER_LEN}")]
    TooLong { length: usize },
    #[error("identifier contains disallowed character '{character}'")]
    BadCharacter { character: char },
}

/// Identifier wrapper for persisted related-record rows. Dedup survivor
/// selection relies on the lexicographic `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

/// The two entity families the dashboard tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Event,
    Company,
}

impl SubjectKind {
    pub const fn label(self) -> &'static str {
        match self {
            SubjectKind::Event => "event",
            SubjectKind::Company => "company",
        }
    }
}

/// Verification decision state owned by the review controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    /// A terminal decision counts as progress even when negative.
    pub const fn is_terminal(self) -> bool {
        matches!(self, VerificationStatus::Verified | VerificationStatus::Rejected)
    }
}

/// The event or company whose lifecycle is being reconstructed.
/// Read-only to this engine; mutated only by external writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleSubject {
    pub id: SubjectId,
    pub tenant_id: TenantId,
    pub kind: SubjectKind,
    pub name: String,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Status of a proposal row. Decisions are additionally audit-logged by
/// the proposal controller, which is where decision timeline entries
/// come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Submitted,
    Approved,
    Rejected,
}

/// A proposal submitted against the subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub entity_type: SubjectKind,
    pub entity_id: SubjectId,
    pub status: ProposalStatus,
    pub actor_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

/// An entry in the shared audit log, keyed by a dotted action string
/// such as `event.verified` or `proposal.approved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub entity_type: SubjectKind,
    pub entity_id: SubjectId,
    pub action: String,
    pub actor_id: Option<String>,
    pub actor_role: Option<String>,
    pub description: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Outcome of one delivery attempt as logged by the notification workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailOutcome {
    Sent,
    Failed,
}

/// A logged email delivery attempt. Failures carry the delivery error text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailLogRecord {
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub entity_type: SubjectKind,
    pub entity_id: SubjectId,
    pub outcome: EmailOutcome,
    pub template: Option<String>,
    pub error: Option<String>,
    pub attempted_at: DateTime<Utc>,
}

/// The polymorphic row families referencing a subject. One exhaustive
/// match in the normalizer means a new kind is a compile error, not a
/// silently dropped record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelatedRecord {
    Proposal(ProposalRecord),
    Audit(AuditRecord),
    Email(EmailLogRecord),
}

/// Normalized timeline entry kinds. Serialized names match the dashboard
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineEntryKind {
    EntityCreated,
    EntityVerified,
    EntityRejected,
    ProposalSubmitted,
    ProposalApproved,
    ProposalRejected,
    EmailSent,
    EmailFailed,
    Other,
}

impl TimelineEntryKind {
    pub const fn title(self) -> &'static str {
        match self {
            TimelineEntryKind::EntityCreated => "Created",
            TimelineEntryKind::EntityVerified => "Verified",
            TimelineEntryKind::EntityRejected => "Verification rejected",
            TimelineEntryKind::ProposalSubmitted => "Proposal submitted",
            TimelineEntryKind::ProposalApproved => "Proposal approved",
            TimelineEntryKind::ProposalRejected => "Proposal rejected",
            TimelineEntryKind::EmailSent => "Email delivered",
            TimelineEntryKind::EmailFailed => "Email delivery failed",
            TimelineEntryKind::Other => "Recorded activity",
        }
    }
}

/// Transient projection of one persisted row onto the timeline. Lives only
/// for the duration of a single read request and never carries a tenant id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    #[serde(skip_serializing)]
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: TimelineEntryKind,
    pub entity_type: SubjectKind,
    pub entity_id: SubjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_role: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// One coarse dashboard milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressStep {
    pub label: &'static str,
    pub completed: bool,
}

/// Weighted completed/total step counts reduced to a percentage.
/// Derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub total_steps: u32,
    pub completed_steps: u32,
    pub percentage: u32,
    pub steps: Vec<ProgressStep>,
}
