//! Session lifecycle actions.

use chrono::Utc;
use tracing::info;

use crate::common::{AssemblyId, DomainError, DomainResult, SessionId};
use crate::domains::assembly::models::AssemblyStatus;
use crate::domains::attendance::models::{Session, SessionStatus, SessionType};
use crate::kernel::CoreDeps;

/// Input for [`create_session`].
#[derive(Debug, Clone)]
pub struct NewSession {
    pub assembly_id: AssemblyId,
    pub name: String,
    pub session_type: SessionType,
}

/// Create a session under an active assembly.
pub async fn create_session(input: NewSession, deps: &CoreDeps) -> DomainResult<Session> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("session name is required".into()));
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
    let session = Session {
        id: SessionId::new(),
        assembly_id: input.assembly_id,
        name: name.to_string(),
        session_type: input.session_type,
        status: SessionStatus::Active,
        created_at: now,
        updated_at: now,
    };

    deps.store.insert_session(session.clone()).await?;

    info!(
        session_id = %session.id,
        assembly_id = %session.assembly_id,
        session_type = %session.session_type,
        "session created"
    );
    Ok(session)
}

/// Fetch a session or fail with `NotFound`.
pub async fn get_session(session_id: SessionId, deps: &CoreDeps) -> DomainResult<Session> {
    deps.store
        .session(session_id)
        .await?
        .ok_or_else(|| DomainError::not_found("session", session_id))
}

/// Freeze presence edits on a session.
pub async fn archive_session(session_id: SessionId, deps: &CoreDeps) -> DomainResult<Session> {
    transition_session(session_id, SessionStatus::Archived, deps).await
}

/// Reopen an archived session for presence edits.
pub async fn reopen_session(session_id: SessionId, deps: &CoreDeps) -> DomainResult<Session> {
    transition_session(session_id, SessionStatus::Active, deps).await
}

async fn transition_session(
    session_id: SessionId,
    target: SessionStatus,
    deps: &CoreDeps,
) -> DomainResult<Session> {
    let mut session = get_session(session_id, deps).await?;

    if session.status == target {
        return Err(DomainError::InvalidSessionTransition {
            session_id,
            from: session.status.to_string(),
            attempted: target.to_string(),
        });
    }

    session.status = target;
    session.updated_at = Utc::now();
    deps.store.update_session(session.clone()).await?;

    info!(session_id = %session_id, status = %session.status, "session status changed");
    Ok(session)
}

/// Delete a session and its attendance records; returns how many records
/// were removed with it.
pub async fn delete_session(session_id: SessionId, deps: &CoreDeps) -> DomainResult<u64> {
    get_session(session_id, deps).await?;
    let removed = deps.store.delete_session_cascade(session_id).await?;
    info!(session_id = %session_id, attendance_records = removed, "session deleted");
    Ok(removed)
}

/// Sessions of an assembly.
pub async fn list_sessions(assembly_id: AssemblyId, deps: &CoreDeps) -> DomainResult<Vec<Session>> {
    deps.store.sessions_by_assembly(assembly_id).await
}
