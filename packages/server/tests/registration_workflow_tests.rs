//! Integration tests for the registration workflow engine: admission,
//! review, resubmission, cancellation and deletion.

mod common;

use common::{create_test_assembly, create_test_modality, registration_request, test_form};

use assembly_core::common::{DomainError, RegistrationId};
use assembly_core::domains::assembly::actions::{set_modality_active, set_registration_open};
use assembly_core::domains::registration::actions::{
    attach_receipt, bulk_delete, bulk_review, cancel_registration, create_registration,
    delete_registration, get_registration, resubmit_registration, review_registration,
    RegistrationPolicy, ReviewDecision,
};
use assembly_core::domains::registration::models::RegistrationStatus;
use assembly_core::domains::roster::EntityCategory;
use assembly_core::kernel::{ResolvedIdentity, TestDependencies};

fn board_identity(external_id: &str) -> ResolvedIdentity {
    ResolvedIdentity {
        external_id: Some(external_id.to_string()),
        category: Some(EntityCategory::ExecutiveBoard),
        display_name: None,
    }
}

#[tokio::test]
async fn create_leaves_registration_pending_and_notifies() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    let created = create_registration(
        registration_request(assembly.id, modality.id, "user-1"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap();

    assert!(!created.is_auto_approved);
    assert_eq!(created.registration.status, RegistrationStatus::Pending);
    assert_eq!(t.notifier.kinds(), vec!["registration_created"]);

    let stored = get_registration(created.registration_id(), &t.deps)
        .await
        .unwrap();
    assert_eq!(stored.status, RegistrationStatus::Pending);
}

#[tokio::test]
async fn auto_approval_policy_approves_immediately() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    let created = create_registration(
        registration_request(assembly.id, modality.id, "user-1"),
        &RegistrationPolicy { auto_approve: true },
        &t.deps,
    )
    .await
    .unwrap();

    assert!(created.is_auto_approved);
    assert_eq!(created.registration.status, RegistrationStatus::Approved);
    assert_eq!(t.notifier.kinds(), vec!["registration_auto_approved"]);
}

#[tokio::test]
async fn closed_registration_window_rejects_admission() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    set_registration_open(assembly.id, false, &t.deps).await.unwrap();

    let err = create_registration(
        registration_request(assembly.id, modality.id, "user-1"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DomainError::RegistrationClosed { .. }));
    assert!(t.notifier.sent().is_empty());
}

#[tokio::test]
async fn inactive_or_foreign_modality_rejects_admission() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let other_assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    // Modality belongs to a different assembly.
    let err = create_registration(
        registration_request(other_assembly.id, modality.id, "user-1"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    // Deactivated modality.
    set_modality_active(modality.id, false, &t.deps).await.unwrap();
    let err = create_registration(
        registration_request(assembly.id, modality.id, "user-1"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn one_active_registration_per_identity() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    t.identity.insert("alice", board_identity("EB-1"));
    t.identity.insert("alice-second-device", board_identity("EB-1"));

    create_registration(
        registration_request(assembly.id, modality.id, "alice"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap();

    let err = create_registration(
        registration_request(assembly.id, modality.id, "alice-second-device"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateRegistration { .. }));

    // Ad-hoc participants without canonical identity are exempt.
    for user in ["guest-1", "guest-2"] {
        create_registration(
            registration_request(assembly.id, modality.id, user),
            &RegistrationPolicy::default(),
            &t.deps,
        )
        .await
        .unwrap();
    }
}

#[tokio::test]
async fn cancelled_identity_can_register_again() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    t.identity.insert("alice", board_identity("EB-1"));

    let first = create_registration(
        registration_request(assembly.id, modality.id, "alice"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap();

    cancel_registration(first.registration_id(), &t.deps)
        .await
        .unwrap();

    // The cancelled registration no longer blocks the identity.
    create_registration(
        registration_request(assembly.id, modality.id, "alice"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn approval_records_reviewer_and_notifies_payment_summary() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    let created = create_registration(
        registration_request(assembly.id, modality.id, "user-1"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap();

    let reviewed = review_registration(
        created.registration_id(),
        ReviewDecision::Approve,
        "organizer-1",
        None,
        &t.deps,
    )
    .await
    .unwrap();

    assert_eq!(reviewed.status, RegistrationStatus::Approved);
    assert_eq!(reviewed.reviewed_by.as_deref(), Some("organizer-1"));
    assert!(reviewed.reviewed_at.is_some());

    let kinds = t.notifier.kinds();
    assert_eq!(kinds, vec!["registration_created", "registration_approved"]);

    // Approving again is an invalid transition.
    let err = review_registration(
        created.registration_id(),
        ReviewDecision::Approve,
        "organizer-1",
        None,
        &t.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
}

#[tokio::test]
async fn rejection_requires_notes() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    let created = create_registration(
        registration_request(assembly.id, modality.id, "user-1"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap();

    for notes in [None, Some("   ".to_string())] {
        let err = review_registration(
            created.registration_id(),
            ReviewDecision::Reject,
            "organizer-1",
            notes,
            &t.deps,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::ReviewNotesRequired));
    }

    let rejected = review_registration(
        created.registration_id(),
        ReviewDecision::Reject,
        "organizer-1",
        Some("missing payment receipt".to_string()),
        &t.deps,
    )
    .await
    .unwrap();
    assert_eq!(rejected.status, RegistrationStatus::Rejected);
    assert_eq!(
        rejected.review_notes.as_deref(),
        Some("missing payment receipt")
    );
}

#[tokio::test]
async fn resubmission_moves_rejected_back_to_pending() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, Some(1)).await;

    let created = create_registration(
        registration_request(assembly.id, modality.id, "user-1"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap();

    // Resubmitting a pending registration is illegal.
    let err = resubmit_registration(created.registration_id(), test_form("Test", "user-1"), &t.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidStateTransition { .. }));

    review_registration(
        created.registration_id(),
        ReviewDecision::Reject,
        "organizer-1",
        Some("illegible receipt".to_string()),
        &t.deps,
    )
    .await
    .unwrap();

    // The modality has capacity 1 and the original slot is preserved:
    // resubmission must not fail with CapacityExceeded.
    let mut form = test_form("Corrected", "Name");
    form.role = Some("Déléguée".to_string());
    let resubmitted = resubmit_registration(created.registration_id(), form, &t.deps)
        .await
        .unwrap();

    assert_eq!(resubmitted.status, RegistrationStatus::Pending);
    assert_eq!(resubmitted.participant.first_name, "Corrected");
    assert_eq!(resubmitted.modality_id, modality.id);

    // Approve after resubmission; the capacity count stays at one.
    review_registration(
        created.registration_id(),
        ReviewDecision::Approve,
        "organizer-1",
        None,
        &t.deps,
    )
    .await
    .unwrap();

    let count = assembly_core::domains::assembly::ledger::current_count(modality.id, &t.deps)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn bulk_review_reports_partial_failure() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    let mut ids = Vec::new();
    for user in ["u-1", "u-2", "u-3"] {
        let created = create_registration(
            registration_request(assembly.id, modality.id, user),
            &RegistrationPolicy::default(),
            &t.deps,
        )
        .await
        .unwrap();
        ids.push(created.registration_id());
    }

    // Pre-approve the middle one so the batch hits an invalid transition.
    review_registration(ids[1], ReviewDecision::Approve, "organizer-1", None, &t.deps)
        .await
        .unwrap();

    let unknown = RegistrationId::new();
    ids.push(unknown);

    let outcomes = bulk_review(&ids, ReviewDecision::Approve, "organizer-1", None, &t.deps).await;
    assert_eq!(outcomes.len(), 4);
    assert!(outcomes[0].outcome.is_ok());
    assert!(matches!(
        outcomes[1].outcome,
        Err(DomainError::InvalidStateTransition { .. })
    ));
    assert!(outcomes[2].outcome.is_ok());
    assert!(matches!(
        outcomes[3].outcome,
        Err(DomainError::NotFound { .. })
    ));

    // The failures did not prevent the successes from committing.
    for id in &ids[..3] {
        let stored = get_registration(*id, &t.deps).await.unwrap();
        assert_eq!(stored.status, RegistrationStatus::Approved);
    }
}

#[tokio::test]
async fn delete_removes_registration_and_receipt() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    let created = create_registration(
        registration_request(assembly.id, modality.id, "user-1"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap();

    attach_receipt(created.registration_id(), "receipts/2026/ag-42.pdf", &t.deps)
        .await
        .unwrap();

    let report = delete_registration(created.registration_id(), "organizer-1", &t.deps)
        .await
        .unwrap();

    assert_eq!(report.deleted, 1);
    assert!(report.artifact_failures.is_empty());
    assert_eq!(t.receipts.deleted(), vec!["receipts/2026/ag-42.pdf"]);

    let err = get_registration(created.registration_id(), &t.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn receipt_cleanup_failure_does_not_block_deletion() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    let created = create_registration(
        registration_request(assembly.id, modality.id, "user-1"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap();

    attach_receipt(created.registration_id(), "receipts/stuck.pdf", &t.deps)
        .await
        .unwrap();
    t.receipts.fail_for("receipts/stuck.pdf");

    let report = delete_registration(created.registration_id(), "organizer-1", &t.deps)
        .await
        .unwrap();

    assert_eq!(report.deleted, 1);
    assert_eq!(report.artifact_failures.len(), 1);
    assert_eq!(report.artifact_failures[0].reference, "receipts/stuck.pdf");

    // The registration is gone regardless.
    assert!(get_registration(created.registration_id(), &t.deps)
        .await
        .is_err());
}

#[tokio::test]
async fn bulk_delete_skips_unknown_ids() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    let mut ids = Vec::new();
    for user in ["u-1", "u-2"] {
        let created = create_registration(
            registration_request(assembly.id, modality.id, user),
            &RegistrationPolicy::default(),
            &t.deps,
        )
        .await
        .unwrap();
        ids.push(created.registration_id());
    }
    ids.push(RegistrationId::new());

    let report = bulk_delete(&ids, "organizer-1", &t.deps).await.unwrap();
    assert_eq!(report.deleted, 2);
}

#[tokio::test]
async fn notification_failure_does_not_roll_back_creation() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    t.notifier.fail_deliveries();

    let created = create_registration(
        registration_request(assembly.id, modality.id, "user-1"),
        &RegistrationPolicy::default(),
        &t.deps,
    )
    .await
    .unwrap();

    // Nothing was delivered, but the registration exists.
    assert!(t.notifier.sent().is_empty());
    let stored = get_registration(created.registration_id(), &t.deps)
        .await
        .unwrap();
    assert_eq!(stored.status, RegistrationStatus::Pending);
}

#[tokio::test]
async fn payment_exemption_requires_reason() {
    let t = TestDependencies::new();
    let assembly = create_test_assembly(&t.deps).await;
    let modality = create_test_modality(&t.deps, assembly.id, None).await;

    let mut request = registration_request(assembly.id, modality.id, "user-1");
    request.form.payment_exempted = true;

    let err = create_registration(request.clone(), &RegistrationPolicy::default(), &t.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    request.form.exemption_reason = Some("volunteer organizer".to_string());
    let created = create_registration(request, &RegistrationPolicy::default(), &t.deps)
        .await
        .unwrap();
    assert!(created.registration.payment_exempted);
}
