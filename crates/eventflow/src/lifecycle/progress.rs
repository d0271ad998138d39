use super::domain::{
    LifecycleSubject, ProgressSnapshot, ProgressStep, TimelineEntry, TimelineEntryKind,
};

/// Reduce the deduplicated timeline to weighted completed/total counts.
///
/// Weights: creation is one always-completed step; the verification
/// decision is one step completed once the status is terminal (a negative
/// decision still counts as progress); every proposal contributes a
/// "submitted" and a "decided" step; every delivery attempt contributes
/// one step that only a successful send completes. Failed deliveries
/// inflate the total without inflating the completed count, which is what
/// keeps a subject visibly stuck below 100% on the dashboard.
pub fn score(subject: &LifecycleSubject, entries: &[TimelineEntry]) -> ProgressSnapshot {
    let mut submitted = 0u32;
    let mut decided = 0u32;
    let mut emails_sent = 0u32;
    let mut emails_failed = 0u32;

    for entry in entries {
        match entry.kind {
            TimelineEntryKind::ProposalSubmitted => submitted += 1,
            TimelineEntryKind::ProposalApproved | TimelineEntryKind::ProposalRejected => {
                decided += 1
            }
            TimelineEntryKind::EmailSent => emails_sent += 1,
            TimelineEntryKind::EmailFailed => emails_failed += 1,
            TimelineEntryKind::EntityCreated
            | TimelineEntryKind::EntityVerified
            | TimelineEntryKind::EntityRejected
            | TimelineEntryKind::Other => {}
        }
    }

    // A decision without a visible submission still denotes a proposal.
    let proposals = submitted.max(decided);
    let verification_done = subject.verification_status.is_terminal();
    let email_attempts = emails_sent + emails_failed;

    let total_steps = 2 + proposals * 2 + email_attempts;
    let completed_steps = 1
        + u32::from(verification_done)
        + submitted.min(proposals)
        + decided.min(proposals)
        + emails_sent;

    let steps = vec![
        ProgressStep {
            label: "Created",
            completed: true,
        },
        ProgressStep {
            label: "Verified",
            completed: verification_done,
        },
        ProgressStep {
            label: "Proposals reviewed",
            completed: proposals > 0 && decided >= proposals,
        },
        ProgressStep {
            label: "Notifications delivered",
            completed: email_attempts > 0 && emails_failed == 0,
        },
    ];

    ProgressSnapshot {
        total_steps,
        completed_steps,
        percentage: percentage(completed_steps, total_steps),
        steps,
    }
}

fn percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let raw = (f64::from(completed) / f64::from(total) * 100.0).round() as u32;
    raw.min(100)
}
