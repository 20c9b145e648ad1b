//! Organizer-side presence marking.

use chrono::Utc;
use tracing::info;

use crate::common::{AttendanceRecordId, DomainError, DomainResult, SessionId};
use crate::domains::attendance::models::{
    AttendanceRecord, AttendanceState, ParticipantType,
};
use crate::kernel::CoreDeps;

use super::sessions::get_session;

/// Identifies one participant within a session's roster.
#[derive(Debug, Clone)]
pub struct ParticipantRef {
    pub participant_id: String,
    pub participant_type: ParticipantType,
    pub display_name: String,
    pub role: Option<String>,
}

/// Set a participant's presence state, unconditionally (organizer override).
///
/// Requires the session to be active; upserts on the (session, participant
/// id, participant type) key so concurrent marks race benignly to
/// last-write-wins.
pub async fn mark_attendance(
    session_id: SessionId,
    participant: ParticipantRef,
    state: AttendanceState,
    actor_id: Option<&str>,
    deps: &CoreDeps,
) -> DomainResult<AttendanceRecord> {
    let session = get_session(session_id, deps).await?;
    if !session.is_active() {
        return Err(DomainError::SessionArchived { session_id });
    }

    if participant.participant_id.trim().is_empty() {
        return Err(DomainError::Validation(
            "participant id cannot be empty".into(),
        ));
    }

    let now = Utc::now();
    let record = AttendanceRecord {
        id: AttendanceRecordId::new(),
        session_id,
        participant_id: participant.participant_id,
        participant_type: participant.participant_type,
        display_name: participant.display_name,
        role: participant.role,
        state,
        marked_by: actor_id.map(str::to_string),
        marked_at: now,
        created_at: now,
    };

    let stored = deps.store.upsert_attendance(record).await?;

    info!(
        session_id = %session_id,
        participant_id = %stored.participant_id,
        participant_type = %stored.participant_type,
        state = %stored.state,
        "attendance marked"
    );
    Ok(stored)
}

/// Tap-through marking: advances the participant's state along the fixed
/// cycle not_counting -> present -> absent -> excluded -> not_counting.
/// A participant without a record starts from not_counting.
pub async fn advance_attendance(
    session_id: SessionId,
    participant: ParticipantRef,
    actor_id: Option<&str>,
    deps: &CoreDeps,
) -> DomainResult<AttendanceRecord> {
    let current = deps
        .store
        .attendance_by_key(
            session_id,
            &participant.participant_id,
            participant.participant_type,
        )
        .await?
        .map(|r| r.state)
        .unwrap_or(AttendanceState::NotCounting);

    mark_attendance(session_id, participant, current.next(), actor_id, deps).await
}

/// Presence rows of a session.
pub async fn list_attendance(
    session_id: SessionId,
    deps: &CoreDeps,
) -> DomainResult<Vec<AttendanceRecord>> {
    deps.store.attendance_by_session(session_id).await
}
