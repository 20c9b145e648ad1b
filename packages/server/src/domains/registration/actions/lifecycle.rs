//! Cancellation and receipt attachment.

use chrono::Utc;
use tracing::info;

use crate::common::{DomainError, DomainResult, RegistrationId};
use crate::domains::registration::models::{Registration, RegistrationStatus};
use crate::kernel::CoreDeps;

/// External cancellation path: pending, pending_review, approved and
/// rejected registrations can all be cancelled. Cancellation frees the
/// modality slot and is terminal apart from deletion.
pub async fn cancel_registration(
    registration_id: RegistrationId,
    deps: &CoreDeps,
) -> DomainResult<Registration> {
    let mut registration = deps
        .store
        .registration(registration_id)
        .await?
        .ok_or_else(|| DomainError::not_found("registration", registration_id))?;

    if registration.status == RegistrationStatus::Cancelled {
        return Err(DomainError::InvalidStateTransition {
            registration_id,
            from: registration.status.to_string(),
            attempted: RegistrationStatus::Cancelled.to_string(),
        });
    }

    registration.status = RegistrationStatus::Cancelled;
    registration.updated_at = Utc::now();
    deps.store.update_registration(registration.clone()).await?;

    info!(registration_id = %registration_id, "registration cancelled");
    Ok(registration)
}

/// Attach (or replace) the payment-receipt reference on a registration.
/// The artifact itself lives in external storage; only the reference is kept.
pub async fn attach_receipt(
    registration_id: RegistrationId,
    reference: &str,
    deps: &CoreDeps,
) -> DomainResult<Registration> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(DomainError::Validation(
            "receipt reference cannot be empty".into(),
        ));
    }

    let mut registration = deps
        .store
        .registration(registration_id)
        .await?
        .ok_or_else(|| DomainError::not_found("registration", registration_id))?;

    registration.receipt_reference = Some(reference.to_string());
    registration.updated_at = Utc::now();
    deps.store.update_registration(registration.clone()).await?;

    info!(registration_id = %registration_id, "payment receipt attached");
    Ok(registration)
}
