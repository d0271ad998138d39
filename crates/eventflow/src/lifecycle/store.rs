use async_trait::async_trait;

use super::domain::{
    AuditRecord, EmailLogRecord, LifecycleSubject, ProposalRecord, SubjectId, TenantId,
};

/// Failure surfaced by a storage backend. Any variant aborts the whole
/// aggregation; a truncated timeline with an artificially low percentage
/// is worse than an explicit error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage query failed: {0}")]
    Query(String),
}

/// Loads the subject row scoped by id AND tenant in a single lookup.
/// `None` covers both the missing and the cross-tenant case so callers
/// cannot probe for existence across tenants.
#[async_trait]
pub trait SubjectStore: Send + Sync {
    async fn load(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> Result<Option<LifecycleSubject>, StoreError>;
}

/// Proposal rows referencing the subject, filtered server-side by
/// tenant and entity, in a deterministic order.
#[async_trait]
pub trait ProposalStore: Send + Sync {
    async fn fetch_for(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> Result<Vec<ProposalRecord>, StoreError>;
}

/// Audit log rows referencing the subject.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn fetch_for(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> Result<Vec<AuditRecord>, StoreError>;
}

/// Email delivery log rows referencing the subject.
#[async_trait]
pub trait EmailLogStore: Send + Sync {
    async fn fetch_for(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> Result<Vec<EmailLogRecord>, StoreError>;
}
