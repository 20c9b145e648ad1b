//! Test fixtures for creating test data through the domain actions.

use chrono::{Duration, Utc};

use assembly_core::common::{AssemblyId, ModalityId};
use assembly_core::domains::assembly::actions::{
    create_assembly, create_modality, NewAssembly, NewModality,
};
use assembly_core::domains::assembly::models::{Assembly, AssemblyKind, Modality};
use assembly_core::domains::attendance::actions::NewSession;
use assembly_core::domains::attendance::models::SessionType;
use assembly_core::domains::registration::actions::{CreateRegistration, RegistrationForm};
use assembly_core::kernel::CoreDeps;

/// Create an active assembly accepting registrations.
pub async fn create_test_assembly(deps: &CoreDeps) -> Assembly {
    let now = Utc::now();
    create_assembly(
        NewAssembly {
            name: "AG 2026".to_string(),
            kind: AssemblyKind::Ag,
            starts_at: now + Duration::days(30),
            ends_at: now + Duration::days(31),
            registration_deadline: None,
            max_participants: None,
            payment_required: true,
        },
        deps,
    )
    .await
    .expect("failed to create test assembly")
}

/// Create an active modality, optionally capacity-bounded.
pub async fn create_test_modality(
    deps: &CoreDeps,
    assembly_id: AssemblyId,
    max_participants: Option<i32>,
) -> Modality {
    create_modality(
        NewModality {
            assembly_id,
            name: "Délégué sur place".to_string(),
            price_cents: 2_500,
            max_participants,
            position: 0,
        },
        deps,
    )
    .await
    .expect("failed to create test modality")
}

/// A valid registration form for the given participant name.
pub fn test_form(first_name: &str, last_name: &str) -> RegistrationForm {
    RegistrationForm {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!(
            "{}.{}@example.org",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        role: None,
        committee_name: None,
        payment_exempted: false,
        exemption_reason: None,
    }
}

/// An admission request for an ad-hoc participant.
pub fn registration_request(
    assembly_id: AssemblyId,
    modality_id: ModalityId,
    user_id: &str,
) -> CreateRegistration {
    CreateRegistration {
        assembly_id,
        modality_id,
        user_id: user_id.to_string(),
        form: test_form("Test", user_id),
    }
}

/// Input for a plenary session.
pub fn plenary_session(assembly_id: AssemblyId) -> NewSession {
    NewSession {
        assembly_id,
        name: "Séance plénière".to_string(),
        session_type: SessionType::Plenary,
    }
}
