use chrono::{DateTime, Utc};
use clap::Args;
use eventflow::error::AppError;
use eventflow::lifecycle::{
    AuditRecord, EmailLogRecord, EmailOutcome, LifecycleSubject, ProposalRecord, ProposalStatus,
    RecordId, SubjectId, SubjectKind, TenantId, VerificationStatus,
};

use crate::infra::{lifecycle_service, InMemoryLifecycleStore};

const DEMO_TENANT: &str = "demo-tenant";
const DEMO_EVENT: &str = "ev-demo-01";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Pretty-print the JSON payload
    #[arg(long)]
    pub(crate) pretty: bool,
}

fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().expect("demo fixture timestamps are valid")
}

/// Fixtures for a verified event with one decided and one pending proposal
/// plus a mixed delivery history, including a duplicated worker log row so
/// the demo output shows dedup at work.
pub(crate) fn seed_demo_tenant(store: &InMemoryLifecycleStore) {
    let tenant = TenantId(DEMO_TENANT.to_string());
    let event = SubjectId(DEMO_EVENT.to_string());

    store.insert_subject(LifecycleSubject {
        id: event.clone(),
        tenant_id: tenant.clone(),
        kind: SubjectKind::Event,
        name: "Waterfront Trade Fair".to_string(),
        verification_status: VerificationStatus::Verified,
        created_at: ts("2026-06-01T09:00:00Z"),
        verified_at: Some(ts("2026-06-02T14:30:00Z")),
    });

    store.insert_proposal(ProposalRecord {
        id: RecordId("prop-001".to_string()),
        tenant_id: tenant.clone(),
        entity_type: SubjectKind::Event,
        entity_id: event.clone(),
        status: ProposalStatus::Approved,
        actor_id: Some("vendor-11".to_string()),
        submitted_at: ts("2026-06-03T10:00:00Z"),
        decided_at: Some(ts("2026-06-04T16:00:00Z")),
        summary: Some("Full catering package".to_string()),
    });
    store.insert_proposal(ProposalRecord {
        id: RecordId("prop-002".to_string()),
        tenant_id: tenant.clone(),
        entity_type: SubjectKind::Event,
        entity_id: event.clone(),
        status: ProposalStatus::Submitted,
        actor_id: Some("vendor-23".to_string()),
        submitted_at: ts("2026-06-03T11:20:00Z"),
        decided_at: None,
        summary: Some("Stage and lighting".to_string()),
    });

    store.insert_audit(AuditRecord {
        id: RecordId("audit-101".to_string()),
        tenant_id: tenant.clone(),
        entity_type: SubjectKind::Event,
        entity_id: event.clone(),
        action: "proposal.approved".to_string(),
        actor_id: Some("usr-5".to_string()),
        actor_role: Some("manager".to_string()),
        description: Some("Approved catering proposal".to_string()),
        recorded_at: ts("2026-06-04T16:00:00Z"),
    });

    store.insert_email(EmailLogRecord {
        id: RecordId("mail-301".to_string()),
        tenant_id: tenant.clone(),
        entity_type: SubjectKind::Event,
        entity_id: event.clone(),
        outcome: EmailOutcome::Sent,
        template: Some("proposal_decision".to_string()),
        error: None,
        attempted_at: ts("2026-06-04T16:01:00.250Z"),
    });
    // The worker logged the same send twice within the second.
    store.insert_email(EmailLogRecord {
        id: RecordId("mail-302".to_string()),
        tenant_id: tenant.clone(),
        entity_type: SubjectKind::Event,
        entity_id: event.clone(),
        outcome: EmailOutcome::Sent,
        template: Some("proposal_decision".to_string()),
        error: None,
        attempted_at: ts("2026-06-04T16:01:00.780Z"),
    });
    store.insert_email(EmailLogRecord {
        id: RecordId("mail-303".to_string()),
        tenant_id: tenant,
        entity_type: SubjectKind::Event,
        entity_id: event,
        outcome: EmailOutcome::Failed,
        template: Some("vendor_notification".to_string()),
        error: Some("smtp 451 temporary local problem".to_string()),
        attempted_at: ts("2026-06-04T16:02:00Z"),
    });
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = InMemoryLifecycleStore::default();
    seed_demo_tenant(&store);
    let service = lifecycle_service(&store);

    let response = service
        .aggregate(
            &TenantId(DEMO_TENANT.to_string()),
            SubjectKind::Event,
            &SubjectId(DEMO_EVENT.to_string()),
        )
        .await?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    }
    .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;

    println!("{rendered}");
    Ok(())
}
