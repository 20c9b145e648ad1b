//! Resubmission of rejected registrations.

use chrono::Utc;
use tracing::info;

use crate::common::{DomainError, DomainResult, RegistrationId};
use crate::domains::registration::models::{Registration, RegistrationStatus};
use crate::kernel::CoreDeps;

use super::create::RegistrationForm;

/// Move a rejected registration back to pending with edited form data.
///
/// The original modality reservation is preserved: the slot was reserved at
/// creation time, so capacity is deliberately not re-checked here. Canonical
/// identity linkage (external id, category) cannot be edited.
pub async fn resubmit_registration(
    registration_id: RegistrationId,
    form: RegistrationForm,
    deps: &CoreDeps,
) -> DomainResult<Registration> {
    let mut registration = deps
        .store
        .registration(registration_id)
        .await?
        .ok_or_else(|| DomainError::not_found("registration", registration_id))?;

    if registration.status != RegistrationStatus::Rejected {
        return Err(DomainError::InvalidStateTransition {
            registration_id,
            from: registration.status.to_string(),
            attempted: RegistrationStatus::Pending.to_string(),
        });
    }

    if form.first_name.trim().is_empty() || form.last_name.trim().is_empty() {
        return Err(DomainError::Validation(
            "participant first and last name are required".into(),
        ));
    }
    let email = form.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::Validation(
            "a valid participant email is required".into(),
        ));
    }

    registration.participant.first_name = form.first_name;
    registration.participant.last_name = form.last_name;
    registration.participant.email = form.email;
    registration.participant.role = form.role;
    if form.committee_name.is_some() {
        registration.participant.committee_name = form.committee_name;
    }
    registration.payment_exempted = form.payment_exempted;
    registration.exemption_reason = form.exemption_reason;

    registration.status = RegistrationStatus::Pending;
    registration.updated_at = Utc::now();

    deps.store.update_registration(registration.clone()).await?;

    info!(registration_id = %registration_id, "registration resubmitted");
    Ok(registration)
}
