use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::lifecycle::domain::{
    AuditRecord, EmailLogRecord, EmailOutcome, LifecycleSubject, ProposalRecord, ProposalStatus,
    RecordId, SubjectId, SubjectKind, TenantId, VerificationStatus,
};
use crate::lifecycle::service::LifecycleService;
use crate::lifecycle::store::{
    AuditStore, EmailLogStore, ProposalStore, StoreError, SubjectStore,
};

pub(super) fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().expect("valid timestamp")
}

pub(super) fn tenant(raw: &str) -> TenantId {
    TenantId(raw.to_string())
}

pub(super) fn subject_id(raw: &str) -> SubjectId {
    SubjectId(raw.to_string())
}

pub(super) fn event_subject(tenant_id: &str, id: &str) -> LifecycleSubject {
    LifecycleSubject {
        id: subject_id(id),
        tenant_id: tenant(tenant_id),
        kind: SubjectKind::Event,
        name: "Harvest Expo".to_string(),
        verification_status: VerificationStatus::Pending,
        created_at: ts("2026-03-01T09:00:00Z"),
        verified_at: None,
    }
}

pub(super) fn verified(mut subject: LifecycleSubject, at: &str) -> LifecycleSubject {
    subject.verification_status = VerificationStatus::Verified;
    subject.verified_at = Some(ts(at));
    subject
}

pub(super) fn proposal(
    tenant_id: &str,
    entity_id: &str,
    id: &str,
    submitted_at: &str,
) -> ProposalRecord {
    ProposalRecord {
        id: RecordId(id.to_string()),
        tenant_id: tenant(tenant_id),
        entity_type: SubjectKind::Event,
        entity_id: subject_id(entity_id),
        status: ProposalStatus::Submitted,
        actor_id: Some("vendor-1".to_string()),
        submitted_at: ts(submitted_at),
        decided_at: None,
        summary: None,
    }
}

pub(super) fn audit(
    tenant_id: &str,
    entity_id: &str,
    id: &str,
    action: &str,
    recorded_at: &str,
) -> AuditRecord {
    AuditRecord {
        id: RecordId(id.to_string()),
        tenant_id: tenant(tenant_id),
        entity_type: SubjectKind::Event,
        entity_id: subject_id(entity_id),
        action: action.to_string(),
        actor_id: Some("usr-1".to_string()),
        actor_role: Some("manager".to_string()),
        description: None,
        recorded_at: ts(recorded_at),
    }
}

pub(super) fn email(
    tenant_id: &str,
    entity_id: &str,
    id: &str,
    outcome: EmailOutcome,
    attempted_at: &str,
) -> EmailLogRecord {
    EmailLogRecord {
        id: RecordId(id.to_string()),
        tenant_id: tenant(tenant_id),
        entity_type: SubjectKind::Event,
        entity_id: subject_id(entity_id),
        outcome,
        template: Some("proposal_update".to_string()),
        error: match outcome {
            EmailOutcome::Failed => Some("smtp 550 mailbox unavailable".to_string()),
            EmailOutcome::Sent => None,
        },
        attempted_at: ts(attempted_at),
    }
}

/// Fixture stores backing the service tests. Tenant + entity filtering
/// happens inside `fetch_for`, mirroring the server-side scoping the
/// relational store performs.
#[derive(Default, Clone)]
pub(super) struct FixtureStore {
    pub subjects: Arc<Mutex<HashMap<(TenantId, SubjectId), LifecycleSubject>>>,
    pub proposals: Arc<Mutex<Vec<ProposalRecord>>>,
    pub audits: Arc<Mutex<Vec<AuditRecord>>>,
    pub emails: Arc<Mutex<Vec<EmailLogRecord>>>,
    pub fail_fetches: Arc<Mutex<bool>>,
}

impl FixtureStore {
    pub fn insert_subject(&self, subject: LifecycleSubject) {
        self.subjects
            .lock()
            .expect("subject mutex poisoned")
            .insert((subject.tenant_id.clone(), subject.id.clone()), subject);
    }

    pub fn fail_fetches(&self) {
        *self.fail_fetches.lock().expect("flag mutex poisoned") = true;
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *self.fail_fetches.lock().expect("flag mutex poisoned") {
            Err(StoreError::Unavailable("connection pool exhausted".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SubjectStore for FixtureStore {
    async fn load(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> Result<Option<LifecycleSubject>, StoreError> {
        let guard = self.subjects.lock().expect("subject mutex poisoned");
        Ok(guard.get(&(tenant_id.clone(), subject_id.clone())).cloned())
    }
}

#[async_trait]
impl ProposalStore for FixtureStore {
    async fn fetch_for(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> Result<Vec<ProposalRecord>, StoreError> {
        self.check_available()?;
        let guard = self.proposals.lock().expect("proposal mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.tenant_id == tenant_id && &record.entity_id == subject_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditStore for FixtureStore {
    async fn fetch_for(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        self.check_available()?;
        let guard = self.audits.lock().expect("audit mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.tenant_id == tenant_id && &record.entity_id == subject_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EmailLogStore for FixtureStore {
    async fn fetch_for(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> Result<Vec<EmailLogRecord>, StoreError> {
        self.check_available()?;
        let guard = self.emails.lock().expect("email mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.tenant_id == tenant_id && &record.entity_id == subject_id)
            .cloned()
            .collect())
    }
}

pub(super) fn service(
    store: &FixtureStore,
) -> LifecycleService<FixtureStore, FixtureStore, FixtureStore, FixtureStore> {
    let shared = Arc::new(store.clone());
    LifecycleService::new(
        Arc::clone(&shared),
        Arc::clone(&shared),
        Arc::clone(&shared),
        shared,
    )
}
