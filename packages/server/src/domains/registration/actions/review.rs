//! Organizer review: approve or reject pending registrations.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::common::{DomainError, DomainResult, RegistrationId};
use crate::domains::registration::events::RegistrationEvent;
use crate::domains::registration::models::{Registration, RegistrationStatus};
use crate::kernel::CoreDeps;

/// Review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    fn target_status(self) -> RegistrationStatus {
        match self {
            ReviewDecision::Approve => RegistrationStatus::Approved,
            ReviewDecision::Reject => RegistrationStatus::Rejected,
        }
    }
}

/// Apply an organizer decision to one registration.
///
/// Only pending/pending_review registrations are reviewable; anything else
/// (already approved, cancelled, rejected) fails with
/// `InvalidStateTransition`. Rejection requires non-blank notes.
pub async fn review_registration(
    registration_id: RegistrationId,
    decision: ReviewDecision,
    reviewer_id: &str,
    notes: Option<String>,
    deps: &CoreDeps,
) -> DomainResult<Registration> {
    let mut registration = deps
        .store
        .registration(registration_id)
        .await?
        .ok_or_else(|| DomainError::not_found("registration", registration_id))?;

    if !registration.status.is_reviewable() {
        return Err(DomainError::InvalidStateTransition {
            registration_id,
            from: registration.status.to_string(),
            attempted: decision.target_status().to_string(),
        });
    }

    let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    if decision == ReviewDecision::Reject && notes.is_none() {
        return Err(DomainError::ReviewNotesRequired);
    }

    registration.status = decision.target_status();
    registration.reviewed_by = Some(reviewer_id.to_string());
    registration.reviewed_at = Some(Utc::now());
    registration.review_notes = notes.clone();
    registration.updated_at = Utc::now();

    deps.store.update_registration(registration.clone()).await?;

    let event = match decision {
        ReviewDecision::Approve => {
            // The approval notification carries the payment summary.
            let modality = deps
                .store
                .modality(registration.modality_id)
                .await?
                .ok_or_else(|| DomainError::not_found("modality", registration.modality_id))?;
            RegistrationEvent::Approved {
                registration_id,
                assembly_id: registration.assembly_id,
                participant_email: registration.participant.email.clone(),
                modality_name: modality.name,
                price_cents: modality.price_cents,
                payment_exempted: registration.payment_exempted,
                exemption_reason: registration.exemption_reason.clone(),
            }
        }
        ReviewDecision::Reject => RegistrationEvent::Rejected {
            registration_id,
            assembly_id: registration.assembly_id,
            participant_email: registration.participant.email.clone(),
            reason: notes.unwrap_or_default(),
            resubmission_allowed: true,
        },
    };
    if let Err(e) = deps.notifier.notify(&event).await {
        error!(
            registration_id = %registration_id,
            kind = event.kind(),
            error = %e,
            "failed to deliver review notification"
        );
    }

    info!(
        registration_id = %registration_id,
        reviewer = reviewer_id,
        status = %registration.status,
        "registration reviewed"
    );
    Ok(registration)
}

/// Per-item outcome of a bulk review.
#[derive(Debug)]
pub struct BulkOutcome {
    pub registration_id: RegistrationId,
    pub outcome: DomainResult<()>,
}

/// Review many registrations independently.
///
/// Never atomic across the batch: each item commits or fails on its own and
/// the caller observes partial success.
pub async fn bulk_review(
    ids: &[RegistrationId],
    decision: ReviewDecision,
    reviewer_id: &str,
    notes: Option<String>,
    deps: &CoreDeps,
) -> Vec<BulkOutcome> {
    let mut outcomes = Vec::with_capacity(ids.len());

    for &registration_id in ids {
        let result =
            review_registration(registration_id, decision, reviewer_id, notes.clone(), deps)
                .await
                .map(|_| ());
        if let Err(e) = &result {
            warn!(registration_id = %registration_id, error = %e, "bulk review item failed");
        }
        outcomes.push(BulkOutcome {
            registration_id,
            outcome: result,
        });
    }

    outcomes
}
