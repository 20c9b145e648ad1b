//! Hard deletion of registrations.

use tracing::{info, warn};

use crate::common::{DomainError, DomainResult, RegistrationId};
use crate::kernel::CoreDeps;

/// A receipt artifact that could not be cleaned up. The registration row is
/// gone regardless; the reference is reported for out-of-band cleanup.
#[derive(Debug, Clone)]
pub struct ArtifactFailure {
    pub registration_id: RegistrationId,
    pub reference: String,
    pub error: String,
}

/// Result of a (bulk) deletion.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub deleted: u64,
    pub artifact_failures: Vec<ArtifactFailure>,
}

/// Hard-delete one registration and its receipt artifact. Irreversible.
///
/// Artifact cleanup failures are collected, not fatal: the registration is
/// removed either way.
pub async fn delete_registration(
    registration_id: RegistrationId,
    actor_id: &str,
    deps: &CoreDeps,
) -> DomainResult<DeleteReport> {
    let registration = deps
        .store
        .registration(registration_id)
        .await?
        .ok_or_else(|| DomainError::not_found("registration", registration_id))?;

    let mut report = DeleteReport::default();

    if let Some(reference) = registration.receipt_reference.as_deref() {
        if let Err(e) = deps.receipts.delete_receipt(reference).await {
            warn!(
                registration_id = %registration_id,
                reference = reference,
                error = %e,
                "receipt artifact cleanup failed, deleting registration anyway"
            );
            report.artifact_failures.push(ArtifactFailure {
                registration_id,
                reference: reference.to_string(),
                error: e.to_string(),
            });
        }
    }

    if deps.store.delete_registration(registration_id).await? {
        report.deleted += 1;
    }

    info!(
        registration_id = %registration_id,
        actor = actor_id,
        "registration deleted"
    );
    Ok(report)
}

/// Delete many registrations independently; unknown ids are skipped.
/// Partial success is observable through the combined report.
pub async fn bulk_delete(
    ids: &[RegistrationId],
    actor_id: &str,
    deps: &CoreDeps,
) -> DomainResult<DeleteReport> {
    let mut combined = DeleteReport::default();

    for &registration_id in ids {
        match delete_registration(registration_id, actor_id, deps).await {
            Ok(report) => {
                combined.deleted += report.deleted;
                combined.artifact_failures.extend(report.artifact_failures);
            }
            Err(DomainError::NotFound { .. }) => {
                warn!(registration_id = %registration_id, "bulk delete: registration already gone");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(combined)
}
