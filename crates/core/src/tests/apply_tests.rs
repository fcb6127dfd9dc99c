// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_case, create_test_policies, create_test_time};
use crate::{CoreError, Transition, TransitionResult, apply};
use registrar_audit::{ActionKind, Actor};
use registrar_domain::{
    ApprovalPolicy, AttachmentSlot, BlobRef, Case, CaseId, CaseKind, CaseStatus, Decision,
    DocumentRecord, OfficialSequence, Period, PolicyTable, RoleTag,
};
use std::collections::BTreeMap;
use time::Month;

fn actor(username: &str) -> Actor {
    Actor::new(String::from(username))
}

fn policy(kind: CaseKind) -> ApprovalPolicy {
    let table: std::sync::Arc<PolicyTable> = create_test_policies();
    table.get(kind).clone()
}

fn sk_record(number: &str) -> DocumentRecord {
    DocumentRecord {
        number: String::from(number),
        sequence: 1,
        period: Period::new(Month::September, 2026),
    }
}

fn approve(kind: CaseKind, case: &Case, role: RoleTag) -> Result<TransitionResult, CoreError> {
    apply(
        &policy(kind),
        case,
        Transition::Approve { role },
        actor("approver"),
        create_test_time(),
    )
}

#[test]
fn test_finalize_replaces_id_and_enters_first_step() {
    let case: Case = create_test_case(CaseKind::AcademicLeave, CaseStatus::Draft);
    let transition: Transition = Transition::Finalize {
        official_id: CaseId::official("001/PMA/CA/IX/2026"),
        sequence: OfficialSequence {
            sequence: 1,
            period: Period::new(Month::September, 2026),
        },
    };

    let result: TransitionResult = apply(
        &policy(CaseKind::AcademicLeave),
        &case,
        transition,
        actor("staff-akademik"),
        create_test_time(),
    )
    .unwrap();

    assert_eq!(result.new_case.id.value(), "001/PMA/CA/IX/2026");
    assert!(result.new_case.id.is_official());
    assert_eq!(result.new_case.draft_id, case.draft_id);
    assert_eq!(result.new_case.status, CaseStatus::PendingApproval(1));
    assert_eq!(result.audit_event.before.case_id, case.id.value());
    assert_eq!(result.audit_event.after.case_id, "001/PMA/CA/IX/2026");
    assert_eq!(result.audit_event.action.kind, ActionKind::Finalize);
}

#[test]
fn test_finalize_outside_draft_is_invalid_state() {
    let case: Case = create_test_case(CaseKind::AcademicLeave, CaseStatus::PendingApproval(1));
    let result = apply(
        &policy(CaseKind::AcademicLeave),
        &case,
        Transition::Finalize {
            official_id: CaseId::official("002/PMA/CA/IX/2026"),
            sequence: OfficialSequence {
                sequence: 2,
                period: Period::new(Month::September, 2026),
            },
        },
        actor("staff-akademik"),
        create_test_time(),
    );

    assert!(matches!(
        result,
        Err(CoreError::InvalidState {
            operation: ActionKind::Finalize,
            ..
        })
    ));
}

#[test]
fn test_approve_walks_the_role_sequence() {
    let case: Case = create_test_case(CaseKind::DropOut, CaseStatus::PendingApproval(1));

    let after_prodi: Case = approve(CaseKind::DropOut, &case, RoleTag::Prodi)
        .unwrap()
        .new_case;
    assert_eq!(after_prodi.status, CaseStatus::PendingApproval(2));

    let after_wadir: Case = approve(CaseKind::DropOut, &after_prodi, RoleTag::Wadir1)
        .unwrap()
        .new_case;
    assert_eq!(after_wadir.status, CaseStatus::PendingApproval(3));

    let after_direktur: Case = approve(CaseKind::DropOut, &after_wadir, RoleTag::Direktur)
        .unwrap()
        .new_case;
    assert_eq!(after_direktur.status, CaseStatus::AwaitingDocument);
    assert_eq!(after_direktur.approval_trail.len(), 3);
    assert!(
        after_direktur
            .approval_trail
            .iter()
            .all(|entry| entry.decision == Decision::Approved)
    );
}

#[test]
fn test_last_approval_without_document_step_approves() {
    let case: Case = create_test_case(CaseKind::AcademicLeave, CaseStatus::PendingApproval(2));
    let result: TransitionResult = approve(CaseKind::AcademicLeave, &case, RoleTag::Wadir1).unwrap();
    assert_eq!(result.new_case.status, CaseStatus::Approved);
}

#[test]
fn test_approve_by_wrong_role_is_invalid_role() {
    let case: Case = create_test_case(CaseKind::AcademicLeave, CaseStatus::PendingApproval(1));

    let result = approve(CaseKind::AcademicLeave, &case, RoleTag::Wadir1);

    assert_eq!(
        result,
        Err(CoreError::InvalidRole {
            case_id: case.id.value().to_string(),
            expected: RoleTag::Prodi,
            actual: RoleTag::Wadir1,
        })
    );
}

#[test]
fn test_decided_statuses_are_already_processed() {
    for status in [
        CaseStatus::AwaitingDocument,
        CaseStatus::Approved,
        CaseStatus::Rejected,
    ] {
        let case: Case = create_test_case(CaseKind::DropOut, status);
        assert!(matches!(
            approve(CaseKind::DropOut, &case, RoleTag::Prodi),
            Err(CoreError::AlreadyProcessed { .. })
        ));
    }
    for status in [CaseStatus::Draft, CaseStatus::Deleted] {
        let case: Case = create_test_case(CaseKind::DropOut, status);
        assert!(matches!(
            approve(CaseKind::DropOut, &case, RoleTag::Prodi),
            Err(CoreError::InvalidState { .. })
        ));
    }
}

#[test]
fn test_reject_records_reason_and_trail() {
    let case: Case = create_test_case(CaseKind::Resignation, CaseStatus::PendingApproval(2));

    let result: TransitionResult = apply(
        &policy(CaseKind::Resignation),
        &case,
        Transition::Reject {
            role: RoleTag::Wadir1,
            reason: String::from("  Incomplete documents "),
        },
        actor("wadir1"),
        create_test_time(),
    )
    .unwrap();

    assert_eq!(result.new_case.status, CaseStatus::Rejected);
    assert_eq!(
        result.new_case.rejection_reason.as_deref(),
        Some("Incomplete documents")
    );
    assert_eq!(result.new_case.approval_trail.len(), 1);
    assert_eq!(
        result.new_case.approval_trail[0].decision,
        Decision::Rejected
    );
    assert_eq!(result.audit_event.action.kind, ActionKind::Reject);
}

#[test]
fn test_reject_requires_a_reason() {
    let case: Case = create_test_case(CaseKind::Resignation, CaseStatus::PendingApproval(1));

    let result = apply(
        &policy(CaseKind::Resignation),
        &case,
        Transition::Reject {
            role: RoleTag::Prodi,
            reason: String::from("   "),
        },
        actor("kaprodi"),
        create_test_time(),
    );

    assert!(matches!(
        result,
        Err(CoreError::ValidationFailed { ref field, .. }) if field == "reason"
    ));
}

#[test]
fn test_first_sk_upload_assigns_number_and_approves() {
    let case: Case = create_test_case(CaseKind::DeathOfStudent, CaseStatus::AwaitingDocument);

    let result: TransitionResult = apply(
        &policy(CaseKind::DeathOfStudent),
        &case,
        Transition::AttachDocument {
            slot: AttachmentSlot::Sk,
            blob: BlobRef::new("sk-1.pdf"),
            document: Some(sk_record("001/PMA/SK-MD/IX/2026")),
        },
        actor("staff-akademik"),
        create_test_time(),
    )
    .unwrap();

    assert_eq!(result.new_case.status, CaseStatus::Approved);
    assert_eq!(
        result.new_case.document,
        Some(sk_record("001/PMA/SK-MD/IX/2026"))
    );
    assert_eq!(
        result.new_case.attachment(AttachmentSlot::Sk),
        Some(&BlobRef::new("sk-1.pdf"))
    );
}

#[test]
fn test_sk_reupload_keeps_the_issued_number() {
    let mut case: Case = create_test_case(CaseKind::DeathOfStudent, CaseStatus::Approved);
    case.document = Some(sk_record("001/PMA/SK-MD/IX/2026"));

    let result: TransitionResult = apply(
        &policy(CaseKind::DeathOfStudent),
        &case,
        Transition::AttachDocument {
            slot: AttachmentSlot::Sk,
            blob: BlobRef::new("sk-2.pdf"),
            document: Some(sk_record("999/PMA/SK-MD/IX/2026")),
        },
        actor("staff-akademik"),
        create_test_time(),
    )
    .unwrap();

    assert_eq!(result.new_case.status, CaseStatus::Approved);
    assert_eq!(
        result.new_case.document,
        Some(sk_record("001/PMA/SK-MD/IX/2026"))
    );
    assert_eq!(
        result.new_case.attachment(AttachmentSlot::Sk),
        Some(&BlobRef::new("sk-2.pdf"))
    );
}

#[test]
fn test_sk_upload_rules() {
    let attach = |kind: CaseKind, policy: &ApprovalPolicy, status: CaseStatus, slot: AttachmentSlot| {
        let case: Case = create_test_case(kind, status);
        apply(
            policy,
            &case,
            Transition::AttachDocument {
                slot,
                blob: BlobRef::new("file.pdf"),
                document: Some(sk_record("001/PMA/SK-XX/IX/2026")),
            },
            actor("staff-akademik"),
            create_test_time(),
        )
    };

    let leave: ApprovalPolicy = policy(CaseKind::AcademicLeave);
    assert!(matches!(
        attach(CaseKind::AcademicLeave, &leave, CaseStatus::Approved, AttachmentSlot::Sk),
        Err(CoreError::InvalidState { .. })
    ));

    let death: ApprovalPolicy = policy(CaseKind::DeathOfStudent);
    assert!(matches!(
        attach(
            CaseKind::DeathOfStudent,
            &death,
            CaseStatus::AwaitingDocument,
            AttachmentSlot::SubmissionLetter
        ),
        Err(CoreError::ValidationFailed { .. })
    ));
    assert!(matches!(
        attach(
            CaseKind::DeathOfStudent,
            &death,
            CaseStatus::PendingApproval(1),
            AttachmentSlot::Sk
        ),
        Err(CoreError::InvalidState { .. })
    ));

    let mut locked: ApprovalPolicy = death.clone();
    locked.allow_document_reupload = false;
    assert!(matches!(
        attach(CaseKind::DeathOfStudent, &locked, CaseStatus::Approved, AttachmentSlot::Sk),
        Err(CoreError::AlreadyProcessed { .. })
    ));

    let supplementary: TransitionResult = attach(
        CaseKind::DeathOfStudent,
        &death,
        CaseStatus::AwaitingDocument,
        AttachmentSlot::SkSupplementary,
    )
    .unwrap();
    assert_eq!(supplementary.new_case.status, CaseStatus::AwaitingDocument);
    assert_eq!(supplementary.new_case.document, None);
}

#[test]
fn test_update_replaces_and_removes_details() {
    let case: Case = create_test_case(CaseKind::AcademicLeave, CaseStatus::Draft);
    let mut details: BTreeMap<String, String> = BTreeMap::new();
    details.insert(String::from("semester_count"), String::from("2"));
    details.insert(String::from("note"), String::from("urgent"));

    let updated: Case = apply(
        &policy(CaseKind::AcademicLeave),
        &case,
        Transition::Update {
            student_id: Some(String::from(" 0420240099 ")),
            details,
            attachments: BTreeMap::new(),
        },
        actor("staff-akademik"),
        create_test_time(),
    )
    .unwrap()
    .new_case;

    assert_eq!(updated.student_id, "0420240099");
    assert_eq!(updated.details.get("semester_count").map(String::as_str), Some("2"));
    assert_eq!(updated.details.get("note").map(String::as_str), Some("urgent"));

    let mut clear: BTreeMap<String, String> = BTreeMap::new();
    clear.insert(String::from("reason"), String::new());
    let result = apply(
        &policy(CaseKind::AcademicLeave),
        &updated,
        Transition::Update {
            student_id: None,
            details: clear,
            attachments: BTreeMap::new(),
        },
        actor("staff-akademik"),
        create_test_time(),
    );
    assert!(matches!(
        result,
        Err(CoreError::ValidationFailed { ref field, .. }) if field == "reason"
    ));
}

#[test]
fn test_update_respects_editable_while_pending() {
    let mut details: BTreeMap<String, String> = BTreeMap::new();
    details.insert(String::from("note"), String::from("checked"));
    let update = || Transition::Update {
        student_id: None,
        details: details.clone(),
        attachments: BTreeMap::new(),
    };

    let leave: Case = create_test_case(CaseKind::AcademicLeave, CaseStatus::PendingApproval(1));
    assert!(matches!(
        apply(
            &policy(CaseKind::AcademicLeave),
            &leave,
            update(),
            actor("staff"),
            create_test_time()
        ),
        Err(CoreError::InvalidState { .. })
    ));

    let drop_out: Case = create_test_case(CaseKind::DropOut, CaseStatus::PendingApproval(2));
    assert!(
        apply(
            &policy(CaseKind::DropOut),
            &drop_out,
            update(),
            actor("staff"),
            create_test_time()
        )
        .is_ok()
    );

    let approved: Case = create_test_case(CaseKind::DropOut, CaseStatus::Approved);
    assert!(matches!(
        apply(
            &policy(CaseKind::DropOut),
            &approved,
            update(),
            actor("staff"),
            create_test_time()
        ),
        Err(CoreError::InvalidState { .. })
    ));
}

#[test]
fn test_update_while_awaiting_document_follows_policy() {
    let mut details: BTreeMap<String, String> = BTreeMap::new();
    details.insert(String::from("date_of_death"), String::from("2026-08-29"));
    let update = || Transition::Update {
        student_id: None,
        details: details.clone(),
        attachments: BTreeMap::new(),
    };

    let death: Case = create_test_case(CaseKind::DeathOfStudent, CaseStatus::AwaitingDocument);
    let result: TransitionResult = apply(
        &policy(CaseKind::DeathOfStudent),
        &death,
        update(),
        actor("staff"),
        create_test_time(),
    )
    .unwrap();
    assert_eq!(result.new_case.status, CaseStatus::AwaitingDocument);
    assert_eq!(
        result.new_case.details.get("date_of_death").map(String::as_str),
        Some("2026-08-29")
    );
    assert_eq!(result.new_case.version, death.version + 1);

    let resignation: Case =
        create_test_case(CaseKind::Resignation, CaseStatus::AwaitingDocument);
    assert!(matches!(
        apply(
            &policy(CaseKind::Resignation),
            &resignation,
            update(),
            actor("staff"),
            create_test_time()
        ),
        Err(CoreError::InvalidState {
            status: CaseStatus::AwaitingDocument,
            ..
        })
    ));
}

#[test]
fn test_soft_delete_rules() {
    let delete = |kind: CaseKind, status: CaseStatus| {
        apply(
            &policy(kind),
            &create_test_case(kind, status),
            Transition::SoftDelete,
            actor("staff"),
            create_test_time(),
        )
    };

    let deleted: TransitionResult = delete(CaseKind::AcademicLeave, CaseStatus::Rejected).unwrap();
    assert_eq!(deleted.new_case.status, CaseStatus::Deleted);
    assert_eq!(
        deleted.audit_event.before.status,
        Some(CaseStatus::Rejected)
    );
    assert_eq!(deleted.audit_event.after.status, Some(CaseStatus::Deleted));

    assert!(delete(CaseKind::AcademicLeave, CaseStatus::Draft).is_ok());
    assert!(delete(CaseKind::DeathOfStudent, CaseStatus::Approved).is_ok());
    assert!(matches!(
        delete(CaseKind::AcademicLeave, CaseStatus::Approved),
        Err(CoreError::InvalidState { .. })
    ));
    assert!(matches!(
        delete(CaseKind::AcademicLeave, CaseStatus::Deleted),
        Err(CoreError::InvalidState { .. })
    ));
}
