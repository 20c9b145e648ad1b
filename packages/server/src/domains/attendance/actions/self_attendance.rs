//! Participant-side presence marking.
//!
//! A participant may only mark the target their approved registration
//! resolves to. On plenary sessions a committee registrant marks the
//! committee entity, never themselves.

use tracing::info;

use crate::common::{DomainError, DomainResult, SessionId};
use crate::domains::attendance::models::{
    AttendanceRecord, AttendanceState, ParticipantType, Session, SessionType,
};
use crate::domains::registration::models::{Registration, RegistrationStatus};
use crate::domains::roster::EntityCategory;
use crate::kernel::CoreDeps;

use super::marking::{mark_attendance, ParticipantRef};
use super::sessions::get_session;

/// The attendance row a user is allowed to self-mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfAttendanceTarget {
    pub participant_id: String,
    pub participant_type: ParticipantType,
    pub display_name: String,
    pub role: Option<String>,
}

/// Determines whether (and as whom) an authenticated user may mark their own
/// presence in a session. `None` means not eligible.
pub fn resolve_self_attendance_target(
    session: &Session,
    registration: Option<&Registration>,
) -> Option<SelfAttendanceTarget> {
    let registration = registration?;
    if registration.status != RegistrationStatus::Approved {
        return None;
    }

    match session.session_type {
        // Ad-hoc roll calls are organizer-only.
        SessionType::AdHoc => None,

        SessionType::Dedicated => Some(SelfAttendanceTarget {
            participant_id: registration.user_id.clone(),
            participant_type: ParticipantType::IndividualDelegate,
            display_name: registration.participant.full_name(),
            role: registration.participant.role.clone(),
        }),

        SessionType::Plenary => match registration.participant.category {
            Some(category @ EntityCategory::ExecutiveBoard)
            | Some(category @ EntityCategory::RegionalCoordinator) => {
                Some(SelfAttendanceTarget {
                    participant_id: registration
                        .participant
                        .external_id
                        .clone()
                        .unwrap_or_else(|| registration.user_id.clone()),
                    participant_type: category.into(),
                    display_name: registration.participant.full_name(),
                    role: registration.participant.role.clone(),
                })
            }
            // Committee registrants mark the committee entity, identified by
            // external id, falling back to the committee name.
            Some(EntityCategory::LocalCommittee) => {
                let committee_id = registration
                    .participant
                    .external_id
                    .clone()
                    .or_else(|| registration.participant.committee_name.clone())?;
                Some(SelfAttendanceTarget {
                    participant_id: committee_id,
                    participant_type: ParticipantType::LocalCommittee,
                    display_name: registration
                        .participant
                        .committee_name
                        .clone()
                        .unwrap_or_else(|| registration.participant.full_name()),
                    role: None,
                })
            }
            None => None,
        },
    }
}

/// Mark the caller's own presence.
///
/// Fails with `NotEligible` when no target resolves. Idempotent: an existing
/// `present` record is returned as-is instead of being rewritten.
pub async fn mark_self_attendance(
    session_id: SessionId,
    user_id: &str,
    deps: &CoreDeps,
) -> DomainResult<AttendanceRecord> {
    let session = get_session(session_id, deps).await?;
    if !session.is_active() {
        return Err(DomainError::SessionArchived { session_id });
    }

    let registration = deps
        .store
        .registration_by_user(session.assembly_id, user_id)
        .await?;

    let target = resolve_self_attendance_target(&session, registration.as_ref()).ok_or_else(
        || {
            DomainError::NotEligible(format!(
                "user {} has no approved registration eligible for {} sessions",
                user_id, session.session_type
            ))
        },
    )?;

    if let Some(existing) = deps
        .store
        .attendance_by_key(session_id, &target.participant_id, target.participant_type)
        .await?
    {
        if existing.state == AttendanceState::Present {
            info!(
                session_id = %session_id,
                participant_id = %existing.participant_id,
                "self-attendance already present, nothing to do"
            );
            return Ok(existing);
        }
    }

    mark_attendance(
        session_id,
        ParticipantRef {
            participant_id: target.participant_id,
            participant_type: target.participant_type,
            display_name: target.display_name,
            role: target.role,
        },
        AttendanceState::Present,
        Some(user_id),
        deps,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{AssemblyId, ModalityId, RegistrationId};
    use crate::domains::registration::models::ParticipantSnapshot;
    use chrono::Utc;

    fn session(session_type: SessionType) -> Session {
        let now = Utc::now();
        Session {
            id: crate::common::SessionId::new(),
            assembly_id: AssemblyId::new(),
            name: "Plénière".to_string(),
            session_type,
            status: crate::domains::attendance::models::SessionStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn registration(
        status: RegistrationStatus,
        category: Option<EntityCategory>,
        external_id: Option<&str>,
        committee_name: Option<&str>,
    ) -> Registration {
        let now = Utc::now();
        Registration {
            id: RegistrationId::new(),
            assembly_id: AssemblyId::new(),
            modality_id: ModalityId::new(),
            user_id: "user-7".to_string(),
            participant: ParticipantSnapshot {
                external_id: external_id.map(str::to_string),
                category,
                first_name: "Nadia".to_string(),
                last_name: "Benali".to_string(),
                email: "nadia@example.org".to_string(),
                role: Some("Déléguée".to_string()),
                committee_name: committee_name.map(str::to_string),
            },
            status,
            payment_exempted: false,
            exemption_reason: None,
            receipt_reference: None,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn unapproved_registration_has_no_target() {
        let s = session(SessionType::Plenary);
        let r = registration(
            RegistrationStatus::Pending,
            Some(EntityCategory::ExecutiveBoard),
            Some("EB-1"),
            None,
        );
        assert_eq!(resolve_self_attendance_target(&s, Some(&r)), None);
        assert_eq!(resolve_self_attendance_target(&s, None), None);
    }

    #[test]
    fn ad_hoc_sessions_never_offer_self_attendance() {
        let s = session(SessionType::AdHoc);
        let r = registration(
            RegistrationStatus::Approved,
            Some(EntityCategory::ExecutiveBoard),
            Some("EB-1"),
            None,
        );
        assert_eq!(resolve_self_attendance_target(&s, Some(&r)), None);
    }

    #[test]
    fn dedicated_sessions_target_the_individual_delegate() {
        let s = session(SessionType::Dedicated);
        let r = registration(RegistrationStatus::Approved, None, None, None);
        let target = resolve_self_attendance_target(&s, Some(&r)).unwrap();
        assert_eq!(target.participant_id, "user-7");
        assert_eq!(target.participant_type, ParticipantType::IndividualDelegate);
    }

    #[test]
    fn plenary_committee_registrant_targets_the_committee_entity() {
        let s = session(SessionType::Plenary);
        let r = registration(
            RegistrationStatus::Approved,
            Some(EntityCategory::LocalCommittee),
            Some("CL-12"),
            Some("Comité de Lyon"),
        );
        let target = resolve_self_attendance_target(&s, Some(&r)).unwrap();
        assert_eq!(target.participant_id, "CL-12");
        assert_eq!(target.participant_type, ParticipantType::LocalCommittee);
        assert_eq!(target.display_name, "Comité de Lyon");
    }

    #[test]
    fn committee_name_is_the_fallback_identifier() {
        let s = session(SessionType::Plenary);
        let r = registration(
            RegistrationStatus::Approved,
            Some(EntityCategory::LocalCommittee),
            None,
            Some("Comité de Lille"),
        );
        let target = resolve_self_attendance_target(&s, Some(&r)).unwrap();
        assert_eq!(target.participant_id, "Comité de Lille");

        // No external id and no committee name: nothing to mark.
        let r = registration(
            RegistrationStatus::Approved,
            Some(EntityCategory::LocalCommittee),
            None,
            None,
        );
        assert_eq!(resolve_self_attendance_target(&s, Some(&r)), None);
    }

    #[test]
    fn plenary_board_member_targets_themselves() {
        let s = session(SessionType::Plenary);
        let r = registration(
            RegistrationStatus::Approved,
            Some(EntityCategory::ExecutiveBoard),
            Some("EB-3"),
            None,
        );
        let target = resolve_self_attendance_target(&s, Some(&r)).unwrap();
        assert_eq!(target.participant_id, "EB-3");
        assert_eq!(target.participant_type, ParticipantType::ExecutiveBoard);
    }

    #[test]
    fn plenary_other_participant_is_not_eligible() {
        let s = session(SessionType::Plenary);
        let r = registration(RegistrationStatus::Approved, None, None, None);
        assert_eq!(resolve_self_attendance_target(&s, Some(&r)), None);
    }
}
