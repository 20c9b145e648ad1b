//! Integration tests for sessions, presence marking, self-attendance and
//! quorum statistics.

mod common;

use common::{create_test_assembly, create_test_modality, plenary_session, registration_request};

use assembly_core::common::DomainError;
use assembly_core::domains::attendance::actions::{
    advance_attendance, archive_session, create_session, delete_session, list_attendance,
    mark_attendance, mark_self_attendance, reopen_session, NewSession, ParticipantRef,
};
use assembly_core::domains::attendance::models::{AttendanceState, ParticipantType, SessionType};
use assembly_core::domains::attendance::quorum::quorum_stats;
use assembly_core::domains::registration::actions::{create_registration, RegistrationPolicy};
use assembly_core::domains::roster::EntityCategory;
use assembly_core::kernel::{CoreDeps, ResolvedIdentity, TestDependencies};

fn board_member(n: usize) -> ParticipantRef {
    ParticipantRef {
        participant_id: format!("EB-{n}"),
        participant_type: ParticipantType::ExecutiveBoard,
        display_name: format!("Member {n}"),
        role: None,
    }
}

async fn active_session(
    deps: &CoreDeps,
    assembly_id: assembly_core::common::AssemblyId,
    session_type: SessionType,
) -> assembly_core::domains::attendance::models::Session {
    create_session(
        NewSession {
            assembly_id,
            name: "Session".to_string(),
            session_type,
        },
        deps,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn marking_upserts_on_the_participant_key() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let session = active_session(&t.deps, assembly.id, SessionType::Plenary).await;

    mark_attendance(
        session.id,
        board_member(1),
        AttendanceState::Present,
        Some("organizer-1"),
        &t.deps,
    )
    .await
    .unwrap();

    // Organizer override: the second mark unconditionally overwrites.
    let record = mark_attendance(
        session.id,
        board_member(1),
        AttendanceState::Absent,
        Some("organizer-2"),
        &t.deps,
    )
    .await
    .unwrap();

    assert_eq!(record.state, AttendanceState::Absent);
    assert_eq!(record.marked_by.as_deref(), Some("organizer-2"));

    let rows = list_attendance(session.id, &t.deps).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn archived_sessions_freeze_marking_until_reopened() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let session = active_session(&t.deps, assembly.id, SessionType::Plenary).await;

    archive_session(session.id, &t.deps).await.unwrap();

    let err = mark_attendance(
        session.id,
        board_member(1),
        AttendanceState::Present,
        Some("organizer-1"),
        &t.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::SessionArchived { .. }));

    // Archiving twice is an invalid transition.
    let err = archive_session(session.id, &t.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidSessionTransition { .. }));

    reopen_session(session.id, &t.deps).await.unwrap();
    mark_attendance(
        session.id,
        board_member(1),
        AttendanceState::Present,
        Some("organizer-1"),
        &t.deps,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn advance_walks_the_fixed_cycle() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let session = active_session(&t.deps, assembly.id, SessionType::AdHoc).await;

    let mut seen = Vec::new();
    for _ in 0..4 {
        let record = advance_attendance(session.id, board_member(1), Some("organizer-1"), &t.deps)
            .await
            .unwrap();
        seen.push(record.state);
    }

    assert_eq!(
        seen,
        vec![
            AttendanceState::Present,
            AttendanceState::Absent,
            AttendanceState::Excluded,
            AttendanceState::NotCounting,
        ]
    );
}

#[tokio::test]
async fn committee_registrant_marks_the_committee_present() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;
    let session = active_session(&t.deps, assembly.id, SessionType::Plenary).await;

    t.identity.insert(
        "claire",
        ResolvedIdentity {
            external_id: Some("CL-12".to_string()),
            category: Some(EntityCategory::LocalCommittee),
            display_name: Some("Comité de Lyon".to_string()),
        },
    );

    // Approved registration via auto-approval.
    create_registration(
        registration_request(assembly.id, modality.id, "claire"),
        &RegistrationPolicy { auto_approve: true },
        &t.deps,
    )
    .await
    .unwrap();

    let record = mark_self_attendance(session.id, "claire", &t.deps)
        .await
        .unwrap();

    // The committee entity is marked, not the registrant.
    assert_eq!(record.participant_id, "CL-12");
    assert_eq!(record.participant_type, ParticipantType::LocalCommittee);
    assert_eq!(record.state, AttendanceState::Present);
    assert_eq!(record.marked_by.as_deref(), Some("claire"));

    // Idempotent: marking again neither duplicates nor errors.
    let again = mark_self_attendance(session.id, "claire", &t.deps)
        .await
        .unwrap();
    assert_eq!(again.id, record.id);
    assert_eq!(list_attendance(session.id, &t.deps).await.unwrap().len(), 1);
}

#[tokio::test]
async fn self_attendance_requires_an_approved_registration() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;
    let session = active_session(&t.deps, assembly.id, SessionType::Plenary).await;

    // Unregistered user.
    let err = mark_self_attendance(session.id, "stranger", &t.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotEligible(_)));

    // Registered but still pending review.
    t.identity.insert(
        "bob",
        ResolvedIdentity {
            external_id: Some("EB-2".to_string()),
            category: Some(EntityCategory::ExecutiveBoard),
            display_name: None,
        },
    );
    create_registration(
        registration_request(assembly.id, modality.id, "bob"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap();

    let err = mark_self_attendance(session.id, "bob", &t.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotEligible(_)));

    assert!(list_attendance(session.id, &t.deps).await.unwrap().is_empty());
}

#[tokio::test]
async fn ad_hoc_sessions_refuse_self_attendance() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;
    let session = active_session(&t.deps, assembly.id, SessionType::AdHoc).await;

    create_registration(
        registration_request(assembly.id, modality.id, "user-1"),
        &RegistrationPolicy { auto_approve: true },
        &t.deps,
    )
    .await
    .unwrap();

    let err = mark_self_attendance(session.id, "user-1", &t.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotEligible(_)));
}

#[tokio::test]
async fn dedicated_sessions_mark_the_delegate_themselves() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;
    let session = active_session(&t.deps, assembly.id, SessionType::Dedicated).await;

    create_registration(
        registration_request(assembly.id, modality.id, "dora"),
        &RegistrationPolicy { auto_approve: true },
        &t.deps,
    )
    .await
    .unwrap();

    let record = mark_self_attendance(session.id, "dora", &t.deps)
        .await
        .unwrap();
    assert_eq!(record.participant_id, "dora");
    assert_eq!(record.participant_type, ParticipantType::IndividualDelegate);
}

#[tokio::test]
async fn quorum_over_marked_session_excludes_the_excluded() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let session = active_session(&t.deps, assembly.id, SessionType::Plenary).await;

    for n in 0..6 {
        mark_attendance(
            session.id,
            board_member(n),
            AttendanceState::Present,
            Some("organizer-1"),
            &t.deps,
        )
        .await
        .unwrap();
    }
    mark_attendance(
        session.id,
        board_member(6),
        AttendanceState::Absent,
        Some("organizer-1"),
        &t.deps,
    )
    .await
    .unwrap();
    for n in 7..10 {
        mark_attendance(
            session.id,
            board_member(n),
            AttendanceState::Excluded,
            Some("organizer-1"),
            &t.deps,
        )
        .await
        .unwrap();
    }

    let rows = list_attendance(session.id, &t.deps).await.unwrap();
    let stats = quorum_stats(&rows);

    assert_eq!(stats.eligible, 7);
    assert_eq!(stats.present, 6);
    assert!((stats.quorum_percentage - 85.714_285).abs() < 0.001);
}

#[tokio::test]
async fn deleting_a_session_removes_its_records() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let session = create_session(plenary_session(assembly.id), &t.deps)
        .await
        .unwrap();

    for n in 0..3 {
        mark_attendance(
            session.id,
            board_member(n),
            AttendanceState::Present,
            Some("organizer-1"),
            &t.deps,
        )
        .await
        .unwrap();
    }

    let removed = delete_session(session.id, &t.deps).await.unwrap();
    assert_eq!(removed, 3);
    assert!(list_attendance(session.id, &t.deps).await.unwrap().is_empty());
}
