//! Modality management actions.

use chrono::Utc;
use tracing::info;

use crate::common::{AssemblyId, DomainError, DomainResult, ModalityId};
use crate::domains::assembly::models::{AssemblyStatus, Modality};
use crate::kernel::CoreDeps;

/// Input for [`create_modality`].
#[derive(Debug, Clone)]
pub struct NewModality {
    pub assembly_id: AssemblyId,
    pub name: String,
    pub price_cents: i32,
    pub max_participants: Option<i32>,
    pub position: i32,
}

/// Create a registration modality under an active assembly.
pub async fn create_modality(input: NewModality, deps: &CoreDeps) -> DomainResult<Modality> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("modality name is required".into()));
    }
    if input.price_cents < 0 {
        return Err(DomainError::Validation(
            "modality price cannot be negative".into(),
        ));
    }
    if let Some(max) = input.max_participants {
        if max < 1 {
            return Err(DomainError::Validation(
                "modality capacity must be at least 1".into(),
            ));
        }
    }

    let assembly = deps
        .store
        .assembly(input.assembly_id)
        .await?
        .ok_or_else(|| DomainError::not_found("assembly", input.assembly_id))?;
    if assembly.status == AssemblyStatus::Archived {
        return Err(DomainError::AssemblyArchived {
            assembly_id: assembly.id,
        });
    }

    let now = Utc::now();
    let modality = Modality {
        id: ModalityId::new(),
        assembly_id: input.assembly_id,
        name: name.to_string(),
        price_cents: input.price_cents,
        max_participants: input.max_participants,
        active: true,
        position: input.position,
        created_at: now,
        updated_at: now,
    };

    deps.store.insert_modality(modality.clone()).await?;

    info!(
        modality_id = %modality.id,
        assembly_id = %modality.assembly_id,
        price_cents = modality.price_cents,
        "modality created"
    );
    Ok(modality)
}

/// Activate or deactivate a modality. Inactive modalities refuse new
/// registrations but keep the existing ones.
pub async fn set_modality_active(
    modality_id: ModalityId,
    active: bool,
    deps: &CoreDeps,
) -> DomainResult<Modality> {
    let mut modality = deps
        .store
        .modality(modality_id)
        .await?
        .ok_or_else(|| DomainError::not_found("modality", modality_id))?;

    modality.active = active;
    modality.updated_at = Utc::now();
    deps.store.update_modality(modality.clone()).await?;

    info!(modality_id = %modality_id, active = active, "modality active flag updated");
    Ok(modality)
}

/// Modalities of an assembly in display order.
pub async fn list_modalities(
    assembly_id: AssemblyId,
    deps: &CoreDeps,
) -> DomainResult<Vec<Modality>> {
    let mut modalities = deps.store.modalities_by_assembly(assembly_id).await?;
    modalities.sort_by_key(|m| (m.position, m.id));
    Ok(modalities)
}
