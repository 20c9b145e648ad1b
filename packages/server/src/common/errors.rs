use thiserror::Error;

use super::entity_ids::{AssemblyId, ModalityId, RegistrationId, SessionId};

/// Closed error taxonomy returned to the surrounding API layer.
///
/// Every variant carries enough context (offending id, current state) for the
/// caller to render a meaningful message. Only notification and
/// receipt-cleanup failures are swallowed (logged) instead of surfaced.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("registration is closed for assembly {assembly_id}")]
    RegistrationClosed { assembly_id: AssemblyId },

    #[error("modality {modality_id} is full ({count}/{max})")]
    CapacityExceeded {
        modality_id: ModalityId,
        count: i64,
        max: i64,
    },

    #[error("an active registration already exists for {external_id} in assembly {assembly_id}")]
    DuplicateRegistration {
        assembly_id: AssemblyId,
        external_id: String,
    },

    #[error("registration {registration_id} cannot go from {from} to {attempted}")]
    InvalidStateTransition {
        registration_id: RegistrationId,
        from: String,
        attempted: String,
    },

    #[error("session {session_id} cannot go from {from} to {attempted}")]
    InvalidSessionTransition {
        session_id: SessionId,
        from: String,
        attempted: String,
    },

    #[error("assembly {assembly_id} is archived")]
    AssemblyArchived { assembly_id: AssemblyId },

    #[error("review notes are required when rejecting a registration")]
    ReviewNotesRequired,

    #[error("session {session_id} is archived")]
    SessionArchived { session_id: SessionId },

    #[error("not eligible for self-attendance: {0}")]
    NotEligible(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    /// Shorthand for [`DomainError::NotFound`].
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Result alias used by all domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
