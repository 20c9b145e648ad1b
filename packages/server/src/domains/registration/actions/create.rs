//! Registration admission.

use chrono::Utc;
use tracing::{error, info};

use crate::common::{AssemblyId, DomainError, DomainResult, ModalityId, RegistrationId};
use crate::domains::registration::events::RegistrationEvent;
use crate::domains::registration::models::{
    ParticipantSnapshot, Registration, RegistrationStatus,
};
use crate::domains::roster::EntityCategory;
use crate::kernel::CoreDeps;

/// Form data captured from the participant.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Option<String>,
    pub committee_name: Option<String>,
    pub payment_exempted: bool,
    pub exemption_reason: Option<String>,
}

/// Admission request.
#[derive(Debug, Clone)]
pub struct CreateRegistration {
    pub assembly_id: AssemblyId,
    pub modality_id: ModalityId,
    /// Opaque authenticated user id, resolved through the identity port.
    pub user_id: String,
    pub form: RegistrationForm,
}

/// Organizer-level configuration, passed explicitly rather than read from
/// ambient state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationPolicy {
    /// Approve new registrations immediately instead of queueing review.
    pub auto_approve: bool,
}

/// Outcome of a successful admission.
#[derive(Debug, Clone)]
pub struct CreatedRegistration {
    pub registration: Registration,
    pub is_auto_approved: bool,
}

impl CreatedRegistration {
    pub fn registration_id(&self) -> RegistrationId {
        self.registration.id
    }
}

/// Admit a participant into an assembly under a modality.
///
/// Checks, in order: form shape, assembly accepts registrations, modality
/// belongs to the assembly and is active, then capacity + identity
/// uniqueness inside the store's guarded insert. With auto-approval on, the
/// registration is approved immediately and the auto-approved notification
/// replaces the standard created one.
pub async fn create_registration(
    request: CreateRegistration,
    policy: &RegistrationPolicy,
    deps: &CoreDeps,
) -> DomainResult<CreatedRegistration> {
    let form = validate_form(request.form)?;

    let assembly = deps
        .store
        .assembly(request.assembly_id)
        .await?
        .ok_or_else(|| DomainError::not_found("assembly", request.assembly_id))?;
    if !assembly.accepts_registrations(Utc::now()) {
        return Err(DomainError::RegistrationClosed {
            assembly_id: assembly.id,
        });
    }

    let modality = deps
        .store
        .modality(request.modality_id)
        .await?
        .ok_or_else(|| DomainError::not_found("modality", request.modality_id))?;
    if modality.assembly_id != assembly.id {
        return Err(DomainError::Validation(format!(
            "modality {} does not belong to assembly {}",
            modality.id, assembly.id
        )));
    }
    if !modality.active {
        return Err(DomainError::Validation(format!(
            "modality {} is not open for registration",
            modality.id
        )));
    }

    let resolved = deps.identity.resolve(&request.user_id).await?;
    let (external_id, category, resolved_name) = match resolved {
        Some(identity) => (identity.external_id, identity.category, identity.display_name),
        None => (None, None, None),
    };

    let committee_name = match category {
        Some(EntityCategory::LocalCommittee) => form.committee_name.clone().or(resolved_name),
        _ => form.committee_name.clone(),
    };

    let status = if policy.auto_approve {
        RegistrationStatus::Approved
    } else {
        RegistrationStatus::Pending
    };

    let now = Utc::now();
    let registration = Registration {
        id: RegistrationId::new(),
        assembly_id: assembly.id,
        modality_id: modality.id,
        user_id: request.user_id,
        participant: ParticipantSnapshot {
            external_id,
            category,
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            role: form.role,
            committee_name,
        },
        status,
        payment_exempted: form.payment_exempted,
        exemption_reason: form.exemption_reason,
        receipt_reference: None,
        reviewed_by: None,
        reviewed_at: None,
        review_notes: None,
        created_at: now,
        updated_at: now,
    };

    // Capacity and uniqueness are enforced here, atomically.
    deps.store
        .insert_registration_guarded(registration.clone())
        .await?;

    let event = if policy.auto_approve {
        RegistrationEvent::AutoApproved {
            registration_id: registration.id,
            assembly_id: assembly.id,
            participant_email: registration.participant.email.clone(),
            modality_name: modality.name.clone(),
        }
    } else {
        RegistrationEvent::Created {
            registration_id: registration.id,
            assembly_id: assembly.id,
            participant_email: registration.participant.email.clone(),
            modality_name: modality.name.clone(),
        }
    };
    if let Err(e) = deps.notifier.notify(&event).await {
        error!(
            registration_id = %registration.id,
            kind = event.kind(),
            error = %e,
            "failed to deliver registration notification"
        );
    }

    info!(
        registration_id = %registration.id,
        assembly_id = %assembly.id,
        modality_id = %modality.id,
        auto_approved = policy.auto_approve,
        "registration created"
    );

    Ok(CreatedRegistration {
        registration,
        is_auto_approved: policy.auto_approve,
    })
}

fn validate_form(form: RegistrationForm) -> DomainResult<RegistrationForm> {
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
    if form.payment_exempted
        && form
            .exemption_reason
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .is_empty()
    {
        return Err(DomainError::Validation(
            "payment exemption requires a reason".into(),
        ));
    }
    Ok(form)
}
