//! Registration query actions.

use crate::common::{AssemblyId, DomainError, DomainResult, RegistrationId};
use crate::domains::registration::models::Registration;
use crate::kernel::CoreDeps;

/// Fetch one registration or fail with `NotFound`.
pub async fn get_registration(
    registration_id: RegistrationId,
    deps: &CoreDeps,
) -> DomainResult<Registration> {
    deps.store
        .registration(registration_id)
        .await?
        .ok_or_else(|| DomainError::not_found("registration", registration_id))
}

/// All registrations of an assembly.
pub async fn list_registrations(
    assembly_id: AssemblyId,
    deps: &CoreDeps,
) -> DomainResult<Vec<Registration>> {
    deps.store.registrations_by_assembly(assembly_id).await
}

/// Registrations awaiting an organizer decision, oldest first.
pub async fn pending_registrations(
    assembly_id: AssemblyId,
    deps: &CoreDeps,
) -> DomainResult<Vec<Registration>> {
    let mut pending: Vec<Registration> = deps
        .store
        .registrations_by_assembly(assembly_id)
        .await?
        .into_iter()
        .filter(|r| r.status.is_reviewable())
        .collect();
    pending.sort_by_key(|r| r.created_at);
    Ok(pending)
}

/// The caller's own registration in an assembly, if any.
pub async fn registration_for_user(
    assembly_id: AssemblyId,
    user_id: &str,
    deps: &CoreDeps,
) -> DomainResult<Option<Registration>> {
    deps.store.registration_by_user(assembly_id, user_id).await
}
