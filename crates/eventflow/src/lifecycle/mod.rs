//! Lifecycle timeline aggregation and progress scoring.
//!
//! Reconstructs, for a single event or company, a deduplicated chronological
//! history out of heterogeneous persisted rows (the subject itself, proposal
//! submissions, audit log entries, email delivery logs) and reduces that
//! history to a weighted completion percentage for the manager dashboard.
//!
//! The engine is a pull-only read model: it never writes, owns no state
//! between requests, and treats storage, authentication, and delivery
//! workers as external collaborators behind trait seams.

pub mod domain;
pub mod normalize;
pub mod progress;
pub mod service;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    AuditRecord, EmailLogRecord, EmailOutcome, LifecycleSubject, ProgressSnapshot, ProgressStep,
    ProposalRecord, ProposalStatus, RecordId, RelatedRecord, SubjectId, SubjectKind, TenantId,
    TimelineEntry, TimelineEntryKind, VerificationStatus,
};
pub use normalize::{dedupe, dedupe_key, normalize, sort_chronologically, subject_entries, DedupeKey};
pub use progress::score;
pub use service::{LifecycleError, LifecycleService};
pub use store::{AuditStore, EmailLogStore, ProposalStore, StoreError, SubjectStore};
pub use views::{LifecycleResponse, ProposalView, SubjectEnvelope, SubjectView};
