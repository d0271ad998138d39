use std::collections::HashSet;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info};

use super::domain::{
    LifecycleSubject, ProgressSnapshot, ProposalRecord, RelatedRecord, SubjectId, SubjectKind,
    TenantId, TimelineEntry,
};
use super::normalize::{dedupe, dedupe_key, normalize, sort_chronologically, subject_entries};
use super::progress::score;
use super::store::{AuditStore, EmailLogStore, ProposalStore, StoreError, SubjectStore};
use super::views::{LifecycleResponse, ProposalView, SubjectEnvelope, SubjectView};

/// Failure taxonomy of one aggregation request.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Missing and cross-tenant subjects are indistinguishable so callers
    /// cannot probe another tenant's keyspace.
    #[error("subject not found")]
    NotFound,
    #[error("invalid identifier: {0}")]
    InvalidArgument(String),
    /// Any fetcher failure aborts the whole request; a partial timeline
    /// with an artificially low percentage is never returned.
    #[error("related record fetch failed: {0}")]
    Upstream(#[from] StoreError),
    /// Post-assembly invariant violation. Should never occur in correct
    /// operation; surfaced loudly rather than returning incorrect data.
    #[error("lifecycle invariants violated: {0}")]
    Inconsistent(String),
}

impl IntoResponse for LifecycleError {
    fn into_response(self) -> Response {
        let status = match &self {
            LifecycleError::NotFound => StatusCode::NOT_FOUND,
            LifecycleError::InvalidArgument(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LifecycleError::Upstream(_) => StatusCode::BAD_GATEWAY,
            LifecycleError::Inconsistent(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Identical body for missing and cross-tenant subjects.
        let body = match &self {
            LifecycleError::NotFound => json!({ "error": "subject not found" }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// Read-model service reconstructing one subject's lifecycle. Stateless
/// across requests; every call is independent and idempotent.
pub struct LifecycleService<S, P, A, E> {
    subjects: Arc<S>,
    proposals: Arc<P>,
    audits: Arc<A>,
    emails: Arc<E>,
}

impl<S, P, A, E> Clone for LifecycleService<S, P, A, E> {
    fn clone(&self) -> Self {
        Self {
            subjects: Arc::clone(&self.subjects),
            proposals: Arc::clone(&self.proposals),
            audits: Arc::clone(&self.audits),
            emails: Arc::clone(&self.emails),
        }
    }
}

impl<S, P, A, E> LifecycleService<S, P, A, E>
where
    S: SubjectStore + 'static,
    P: ProposalStore + 'static,
    A: AuditStore + 'static,
    E: EmailLogStore + 'static,
{
    pub fn new(subjects: Arc<S>, proposals: Arc<P>, audits: Arc<A>, emails: Arc<E>) -> Self {
        Self {
            subjects,
            proposals,
            audits,
            emails,
        }
    }

    /// Load the subject, fetch its related records concurrently, and reduce
    /// them to the ordered timeline plus progress snapshot.
    ///
    /// `kind` is the entity family the route was addressed through; a
    /// subject of the other family resolves to `NotFound` exactly like a
    /// missing row.
    pub async fn aggregate(
        &self,
        tenant_id: &TenantId,
        kind: SubjectKind,
        subject_id: &SubjectId,
    ) -> Result<LifecycleResponse, LifecycleError> {
        let subject = self
            .subjects
            .load(tenant_id, subject_id)
            .await?
            .filter(|subject| subject.kind == kind)
            .ok_or(LifecycleError::NotFound)?;

        // The three fetchers are read-only and independent; concurrent I/O
        // is the dominant latency lever once record counts grow.
        let (proposals, audits, emails) = tokio::try_join!(
            self.proposals.fetch_for(tenant_id, subject_id),
            self.audits.fetch_for(tenant_id, subject_id),
            self.emails.fetch_for(tenant_id, subject_id),
        )?;

        let mut entries = subject_entries(&subject);
        entries.extend(
            proposals
                .iter()
                .map(|proposal| normalize(&RelatedRecord::Proposal(proposal.clone()))),
        );
        entries.extend(
            audits
                .into_iter()
                .map(|audit| normalize(&RelatedRecord::Audit(audit))),
        );
        entries.extend(
            emails
                .into_iter()
                .map(|email| normalize(&RelatedRecord::Email(email))),
        );

        let mut timeline = dedupe(entries);
        sort_chronologically(&mut timeline);

        let progress = score(&subject, &timeline);

        info!(
            subject = %subject.id.0,
            kind = subject.kind.label(),
            entries = timeline.len(),
            percentage = progress.percentage,
            "lifecycle aggregated"
        );

        assemble(&subject, &proposals, timeline, progress)
    }
}

/// Compose the response after a final O(n) sweep over the invariants the
/// dashboard depends on: chronological order, unique dedup keys, and every
/// entry scoped to the requested subject.
fn assemble(
    subject: &LifecycleSubject,
    proposals: &[ProposalRecord],
    timeline: Vec<TimelineEntry>,
    progress: ProgressSnapshot,
) -> Result<LifecycleResponse, LifecycleError> {
    if let Err(violation) = verify_invariants(subject, &timeline, &progress) {
        error!(
            subject = %subject.id.0,
            violation = %violation,
            "refusing to return inconsistent lifecycle payload"
        );
        return Err(LifecycleError::Inconsistent(violation));
    }

    Ok(LifecycleResponse {
        subject: SubjectEnvelope::new(subject.kind, SubjectView::from_subject(subject)),
        proposals: proposals.iter().map(ProposalView::from_record).collect(),
        progress,
        timeline,
    })
}

fn verify_invariants(
    subject: &LifecycleSubject,
    timeline: &[TimelineEntry],
    progress: &ProgressSnapshot,
) -> Result<(), String> {
    let mut keys = HashSet::with_capacity(timeline.len());
    for pair in timeline.windows(2) {
        if pair[0].timestamp > pair[1].timestamp {
            return Err("timeline is not chronologically ordered".to_string());
        }
    }
    for entry in timeline {
        if entry.entity_id != subject.id || entry.entity_type != subject.kind {
            return Err(format!(
                "timeline entry {} does not belong to the requested subject",
                entry.id.0
            ));
        }
        if !keys.insert(dedupe_key(entry)) {
            return Err(format!("duplicate timeline key for entry {}", entry.id.0));
        }
    }
    if progress.completed_steps > progress.total_steps || progress.total_steps == 0 {
        return Err("progress counters out of bounds".to_string());
    }
    Ok(())
}
