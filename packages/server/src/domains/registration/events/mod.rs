use serde::{Deserialize, Serialize};

use crate::common::{AssemblyId, RegistrationId};

/// Registration domain events - FACT EVENTS ONLY.
///
/// Handed to the notification sink after the state change has committed.
/// Delivery failures never roll the state change back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegistrationEvent {
    /// A registration was created and awaits review.
    Created {
        registration_id: RegistrationId,
        assembly_id: AssemblyId,
        participant_email: String,
        modality_name: String,
    },

    /// A registration was created and approved immediately by policy.
    AutoApproved {
        registration_id: RegistrationId,
        assembly_id: AssemblyId,
        participant_email: String,
        modality_name: String,
    },

    /// An organizer approved the registration.
    Approved {
        registration_id: RegistrationId,
        assembly_id: AssemblyId,
        participant_email: String,
        modality_name: String,
        price_cents: i32,
        payment_exempted: bool,
        exemption_reason: Option<String>,
    },

    /// An organizer rejected the registration.
    Rejected {
        registration_id: RegistrationId,
        assembly_id: AssemblyId,
        participant_email: String,
        reason: String,
        resubmission_allowed: bool,
    },
}

impl RegistrationEvent {
    /// Wire kind of the event, as exposed to the notification sink.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistrationEvent::Created { .. } => "registration_created",
            RegistrationEvent::AutoApproved { .. } => "registration_auto_approved",
            RegistrationEvent::Approved { .. } => "registration_approved",
            RegistrationEvent::Rejected { .. } => "registration_rejected",
        }
    }

    pub fn registration_id(&self) -> RegistrationId {
        match self {
            RegistrationEvent::Created { registration_id, .. }
            | RegistrationEvent::AutoApproved { registration_id, .. }
            | RegistrationEvent::Approved { registration_id, .. }
            | RegistrationEvent::Rejected { registration_id, .. } => *registration_id,
        }
    }
}
