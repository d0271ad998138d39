use std::collections::HashMap;

use super::domain::{
    EmailOutcome, LifecycleSubject, RecordId, RelatedRecord, SubjectId, TimelineEntry,
    TimelineEntryKind, VerificationStatus,
};

/// Entries derived from the subject row itself: creation always, plus the
/// verification decision once one has been recorded. Both timestamps come
/// from persisted columns; nothing is synthesized. An audit row logging
/// the same decision in the same second collapses with these in dedup.
pub fn subject_entries(subject: &LifecycleSubject) -> Vec<TimelineEntry> {
    let mut entries = vec![TimelineEntry {
        id: RecordId(subject.id.0.clone()),
        kind: TimelineEntryKind::EntityCreated,
        entity_type: subject.kind,
        entity_id: subject.id.clone(),
        actor_id: None,
        actor_role: None,
        title: TimelineEntryKind::EntityCreated.title().to_string(),
        description: None,
        timestamp: subject.created_at,
    }];

    if let Some(decided_at) = subject.verified_at {
        let kind = match subject.verification_status {
            VerificationStatus::Verified => Some(TimelineEntryKind::EntityVerified),
            VerificationStatus::Rejected => Some(TimelineEntryKind::EntityRejected),
            VerificationStatus::Pending => None,
        };
        if let Some(kind) = kind {
            entries.push(TimelineEntry {
                id: RecordId(subject.id.0.clone()),
                kind,
                entity_type: subject.kind,
                entity_id: subject.id.clone(),
                actor_id: None,
                actor_role: None,
                title: kind.title().to_string(),
                description: None,
                timestamp: decided_at,
            });
        }
    }

    entries
}

/// Project one persisted row onto the timeline. Exhaustive over the record
/// sum type; adding a record kind without handling it is a compile error.
pub fn normalize(record: &RelatedRecord) -> TimelineEntry {
    match record {
        RelatedRecord::Proposal(proposal) => TimelineEntry {
            id: proposal.id.clone(),
            kind: TimelineEntryKind::ProposalSubmitted,
            entity_type: proposal.entity_type,
            entity_id: proposal.entity_id.clone(),
            actor_id: proposal.actor_id.clone(),
            actor_role: None,
            title: TimelineEntryKind::ProposalSubmitted.title().to_string(),
            description: proposal.summary.clone(),
            timestamp: proposal.submitted_at,
        },
        RelatedRecord::Audit(audit) => {
            let kind = audit_action_kind(&audit.action);
            let description = match kind {
                // Unrecognized actions keep the raw action visible instead
                // of vanishing from the timeline.
                TimelineEntryKind::Other => Some(
                    audit
                        .description
                        .clone()
                        .unwrap_or_else(|| audit.action.clone()),
                ),
                _ => audit.description.clone(),
            };
            TimelineEntry {
                id: audit.id.clone(),
                kind,
                entity_type: audit.entity_type,
                entity_id: audit.entity_id.clone(),
                actor_id: audit.actor_id.clone(),
                actor_role: audit.actor_role.clone(),
                title: kind.title().to_string(),
                description,
                timestamp: audit.recorded_at,
            }
        }
        RelatedRecord::Email(email) => {
            let kind = match email.outcome {
                EmailOutcome::Sent => TimelineEntryKind::EmailSent,
                EmailOutcome::Failed => TimelineEntryKind::EmailFailed,
            };
            let description = match email.outcome {
                EmailOutcome::Failed => email.error.clone(),
                EmailOutcome::Sent => None,
            };
            TimelineEntry {
                id: email.id.clone(),
                kind,
                entity_type: email.entity_type,
                entity_id: email.entity_id.clone(),
                actor_id: None,
                actor_role: None,
                title: kind.title().to_string(),
                description,
                timestamp: email.attempted_at,
            }
        }
    }
}

fn audit_action_kind(action: &str) -> TimelineEntryKind {
    match action {
        "event.created" | "company.created" => TimelineEntryKind::EntityCreated,
        "event.verified" | "company.verified" => TimelineEntryKind::EntityVerified,
        "event.rejected" | "company.rejected" => TimelineEntryKind::EntityRejected,
        "proposal.submitted" => TimelineEntryKind::ProposalSubmitted,
        "proposal.approved" => TimelineEntryKind::ProposalApproved,
        "proposal.rejected" => TimelineEntryKind::ProposalRejected,
        _ => TimelineEntryKind::Other,
    }
}

/// Collapse key for near-simultaneous duplicate rows: at-least-once
/// delivery and logging can produce several rows for what the user
/// experiences as one occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey {
    pub kind: TimelineEntryKind,
    pub entity_id: SubjectId,
    pub second: i64,
}

/// Pure key derivation: (kind, entity id, timestamp floored to the second).
pub fn dedupe_key(entry: &TimelineEntry) -> DedupeKey {
    DedupeKey {
        kind: entry.kind,
        entity_id: entry.entity_id.clone(),
        second: entry.timestamp.timestamp(),
    }
}

/// Keep exactly one survivor per colliding key: the lowest source record
/// id, at the first occurrence's position, so repeated calls on unchanged
/// data produce identical output.
pub fn dedupe(entries: Vec<TimelineEntry>) -> Vec<TimelineEntry> {
    let mut slots: Vec<Option<TimelineEntry>> = Vec::with_capacity(entries.len());
    let mut seen: HashMap<DedupeKey, usize> = HashMap::with_capacity(entries.len());

    for entry in entries {
        match seen.get(&dedupe_key(&entry)) {
            Some(&index) => {
                let survivor = slots[index].as_mut().filter(|s| entry.id < s.id);
                if let Some(survivor) = survivor {
                    *survivor = entry;
                }
            }
            None => {
                seen.insert(dedupe_key(&entry), slots.len());
                slots.push(Some(entry));
            }
        }
    }

    slots.into_iter().flatten().collect()
}

/// Ascending by timestamp; the stable sort keeps the deterministic fetch
/// sequence as the tie-breaker, which the dashboard ordering relies on.
pub fn sort_chronologically(entries: &mut [TimelineEntry]) {
    entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::domain::{AuditRecord, SubjectKind, TenantId};
    use chrono::{DateTime, Utc};

    fn ts(raw: &str) -> DateTime<Utc> {
        raw.parse().expect("valid timestamp")
    }

    fn audit(id: &str, action: &str, recorded_at: &str) -> AuditRecord {
        AuditRecord {
            id: RecordId(id.to_string()),
            tenant_id: TenantId("t-1".to_string()),
            entity_type: SubjectKind::Event,
            entity_id: SubjectId("ev-1".to_string()),
            action: action.to_string(),
            actor_id: Some("usr-9".to_string()),
            actor_role: Some("manager".to_string()),
            description: None,
            recorded_at: ts(recorded_at),
        }
    }

    #[test]
    fn audit_actions_map_to_entry_kinds() {
        assert_eq!(
            audit_action_kind("event.verified"),
            TimelineEntryKind::EntityVerified
        );
        assert_eq!(
            audit_action_kind("company.rejected"),
            TimelineEntryKind::EntityRejected
        );
        assert_eq!(
            audit_action_kind("proposal.approved"),
            TimelineEntryKind::ProposalApproved
        );
    }

    #[test]
    fn unknown_audit_action_degrades_to_other_with_action_text() {
        let record = audit("a-1", "invoice.paid", "2026-01-05T09:00:00Z");
        let entry = normalize(&RelatedRecord::Audit(record));
        assert_eq!(entry.kind, TimelineEntryKind::Other);
        assert_eq!(entry.description.as_deref(), Some("invoice.paid"));
    }

    #[test]
    fn dedupe_key_floors_to_the_second() {
        let a = normalize(&RelatedRecord::Audit(audit(
            "a-1",
            "event.verified",
            "2026-01-05T09:00:00.120Z",
        )));
        let b = normalize(&RelatedRecord::Audit(audit(
            "a-2",
            "event.verified",
            "2026-01-05T09:00:00.870Z",
        )));
        let c = normalize(&RelatedRecord::Audit(audit(
            "a-3",
            "event.verified",
            "2026-01-05T09:00:01.010Z",
        )));

        assert_eq!(dedupe_key(&a), dedupe_key(&b));
        assert_ne!(dedupe_key(&a), dedupe_key(&c));
    }

    #[test]
    fn dedupe_keeps_lowest_record_id_at_first_position() {
        let late_id = normalize(&RelatedRecord::Audit(audit(
            "a-9",
            "event.verified",
            "2026-01-05T09:00:00.100Z",
        )));
        let early_id = normalize(&RelatedRecord::Audit(audit(
            "a-2",
            "event.verified",
            "2026-01-05T09:00:00.900Z",
        )));
        let unrelated = normalize(&RelatedRecord::Audit(audit(
            "a-5",
            "proposal.approved",
            "2026-01-05T09:00:00.500Z",
        )));

        let deduped = dedupe(vec![late_id, unrelated.clone(), early_id.clone()]);
        assert_eq!(deduped.len(), 2);
        // Survivor is the lowest id, sitting where the key first appeared.
        assert_eq!(deduped[0], early_id);
        assert_eq!(deduped[1], unrelated);
    }

    #[test]
    fn stable_sort_preserves_insertion_order_on_ties() {
        let first = normalize(&RelatedRecord::Audit(audit(
            "a-1",
            "proposal.approved",
            "2026-01-05T09:00:00Z",
        )));
        let second = normalize(&RelatedRecord::Audit(audit(
            "a-2",
            "event.verified",
            "2026-01-05T09:00:00Z",
        )));
        let earlier = normalize(&RelatedRecord::Audit(audit(
            "a-3",
            "event.created",
            "2026-01-05T08:00:00Z",
        )));

        let mut entries = vec![first.clone(), second.clone(), earlier.clone()];
        sort_chronologically(&mut entries);
        assert_eq!(entries, vec![earlier, first, second]);
    }
}
