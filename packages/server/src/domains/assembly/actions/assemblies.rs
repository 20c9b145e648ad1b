//! Assembly lifecycle actions.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::common::{AssemblyId, DomainError, DomainResult};
use crate::domains::assembly::models::{Assembly, AssemblyKind, AssemblyStatus};
use crate::kernel::CoreDeps;
use crate::storage::CascadeReport;

/// Input for [`create_assembly`].
#[derive(Debug, Clone)]
pub struct NewAssembly {
    pub name: String,
    pub kind: AssemblyKind,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub payment_required: bool,
}

/// Create an assembly. Registration starts open.
pub async fn create_assembly(input: NewAssembly, deps: &CoreDeps) -> DomainResult<Assembly> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("assembly name is required".into()));
    }
    if input.ends_at <= input.starts_at {
        return Err(DomainError::Validation(
            "assembly must end after it starts".into(),
        ));
    }

    let now = Utc::now();
    let assembly = Assembly {
        id: AssemblyId::new(),
        name: name.to_string(),
        kind: input.kind,
        status: AssemblyStatus::Active,
        starts_at: input.starts_at,
        ends_at: input.ends_at,
        registration_open: true,
        registration_deadline: input.registration_deadline,
        max_participants: input.max_participants,
        payment_required: input.payment_required,
        created_at: now,
        updated_at: now,
    };

    deps.store.insert_assembly(assembly.clone()).await?;

    info!(assembly_id = %assembly.id, kind = %assembly.kind, "assembly created");
    Ok(assembly)
}

/// Fetch an assembly or fail with `NotFound`.
pub async fn get_assembly(assembly_id: AssemblyId, deps: &CoreDeps) -> DomainResult<Assembly> {
    deps.store
        .assembly(assembly_id)
        .await?
        .ok_or_else(|| DomainError::not_found("assembly", assembly_id))
}

/// Archive an assembly: closes registration; terminal apart from deletion.
pub async fn archive_assembly(assembly_id: AssemblyId, deps: &CoreDeps) -> DomainResult<Assembly> {
    let mut assembly = get_assembly(assembly_id, deps).await?;

    if assembly.status == AssemblyStatus::Archived {
        return Err(DomainError::AssemblyArchived { assembly_id });
    }

    assembly.status = AssemblyStatus::Archived;
    assembly.registration_open = false;
    assembly.updated_at = Utc::now();
    deps.store.update_assembly(assembly.clone()).await?;

    info!(assembly_id = %assembly_id, "assembly archived");
    Ok(assembly)
}

/// Open or close the registration window of an active assembly.
pub async fn set_registration_open(
    assembly_id: AssemblyId,
    open: bool,
    deps: &CoreDeps,
) -> DomainResult<Assembly> {
    let mut assembly = get_assembly(assembly_id, deps).await?;

    if assembly.status == AssemblyStatus::Archived {
        return Err(DomainError::AssemblyArchived { assembly_id });
    }

    assembly.registration_open = open;
    assembly.updated_at = Utc::now();
    deps.store.update_assembly(assembly.clone()).await?;

    info!(assembly_id = %assembly_id, open = open, "registration window updated");
    Ok(assembly)
}

/// Delete an assembly and everything that references it: modalities,
/// registrations, sessions and their attendance records. Irreversible.
pub async fn delete_assembly(
    assembly_id: AssemblyId,
    deps: &CoreDeps,
) -> DomainResult<CascadeReport> {
    // Fail early with NotFound rather than reporting an empty cascade.
    get_assembly(assembly_id, deps).await?;

    let report = deps.store.delete_assembly_cascade(assembly_id).await?;

    info!(
        assembly_id = %assembly_id,
        registrations = report.registrations,
        modalities = report.modalities,
        sessions = report.sessions,
        attendance_records = report.attendance_records,
        "assembly deleted"
    );
    Ok(report)
}
