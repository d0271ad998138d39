use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::HeaderMap;
use eventflow::lifecycle::{
    AuditRecord, AuditStore, EmailLogRecord, EmailLogStore, LifecycleService, LifecycleSubject,
    ProposalRecord, ProposalStore, StoreError, SubjectId, SubjectStore, TenantId,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Tenant and role resolved by the upstream auth guard. The guard runs in
/// front of this service and forwards its decision via headers; requests
/// arriving without them never reach the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TenantContext {
    pub(crate) tenant_id: TenantId,
    pub(crate) role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GuardRejection {
    MissingTenant,
    ForbiddenRole,
}

const MANAGER_ROLES: [&str; 2] = ["manager", "admin"];

impl TenantContext {
    pub(crate) fn from_headers(headers: &HeaderMap) -> Result<Self, GuardRejection> {
        let tenant_id = headers
            .get("x-tenant-id")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(GuardRejection::MissingTenant)?;

        let role = headers
            .get("x-actor-role")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if !MANAGER_ROLES.contains(&role.as_str()) {
            return Err(GuardRejection::ForbiddenRole);
        }

        Ok(Self {
            tenant_id: TenantId(tenant_id.to_string()),
            role,
        })
    }
}

/// In-memory stand-in for the relational store. Tenant + entity filtering
/// happens inside each fetch, mirroring the server-side scoping a SQL
/// backend would apply.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLifecycleStore {
    subjects: Arc<Mutex<HashMap<(TenantId, SubjectId), LifecycleSubject>>>,
    proposals: Arc<Mutex<Vec<ProposalRecord>>>,
    audits: Arc<Mutex<Vec<AuditRecord>>>,
    emails: Arc<Mutex<Vec<EmailLogRecord>>>,
}

impl InMemoryLifecycleStore {
    pub(crate) fn insert_subject(&self, subject: LifecycleSubject) {
        self.subjects
            .lock()
            .expect("subject mutex poisoned")
            .insert((subject.tenant_id.clone(), subject.id.clone()), subject);
    }

    pub(crate) fn insert_proposal(&self, record: ProposalRecord) {
        self.proposals
            .lock()
            .expect("proposal mutex poisoned")
            .push(record);
    }

    pub(crate) fn insert_audit(&self, record: AuditRecord) {
        self.audits
            .lock()
            .expect("audit mutex poisoned")
            .push(record);
    }

    pub(crate) fn insert_email(&self, record: EmailLogRecord) {
        self.emails
            .lock()
            .expect("email mutex poisoned")
            .push(record);
    }
}

#[async_trait]
impl SubjectStore for InMemoryLifecycleStore {
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
impl ProposalStore for InMemoryLifecycleStore {
    async fn fetch_for(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> Result<Vec<ProposalRecord>, StoreError> {
        let guard = self.proposals.lock().expect("proposal mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.tenant_id == tenant_id && &record.entity_id == subject_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditStore for InMemoryLifecycleStore {
    async fn fetch_for(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        let guard = self.audits.lock().expect("audit mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.tenant_id == tenant_id && &record.entity_id == subject_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EmailLogStore for InMemoryLifecycleStore {
    async fn fetch_for(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> Result<Vec<EmailLogRecord>, StoreError> {
        let guard = self.emails.lock().expect("email mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.tenant_id == tenant_id && &record.entity_id == subject_id)
            .cloned()
            .collect())
    }
}

pub(crate) type ApiLifecycleService = LifecycleService<
    InMemoryLifecycleStore,
    InMemoryLifecycleStore,
    InMemoryLifecycleStore,
    InMemoryLifecycleStore,
>;

pub(crate) fn lifecycle_service(store: &InMemoryLifecycleStore) -> Arc<ApiLifecycleService> {
    let shared = Arc::new(store.clone());
    Arc::new(LifecycleService::new(
        Arc::clone(&shared),
        Arc::clone(&shared),
        Arc::clone(&shared),
        shared,
    ))
}
