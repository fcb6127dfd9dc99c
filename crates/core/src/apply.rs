// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pure case transitions.
//!
//! Nothing here performs I/O: the engine loads the case, resolves blobs and
//! identifiers, then applies a [`Transition`] to obtain the new case and
//! its audit event.

use crate::command::{DraftPayload, Transition};
use crate::error::CoreError;
use registrar_audit::{Action, ActionKind, Actor, AuditEvent, StatusSnapshot};
use registrar_domain::{
    ApprovalEntry, ApprovalPolicy, AttachmentSlot, BlobRef, Case, CaseId, CaseKind, CaseStatus,
    Decision, RoleTag, validate_reason, validate_required_attachments, validate_required_fields,
    validate_student_id,
};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// The outcome of applying a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_case: Case,
    pub audit_event: AuditEvent,
}

/// What an SK upload will do to the case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPlan {
    /// A document number must be minted.
    pub mint_number: bool,
    /// The upload moves the case to `Approved`.
    pub completes: bool,
}

/// Validates a submission before any blob is stored.
///
/// # Errors
///
/// Returns `CoreError::ValidationFailed` naming the first missing field or slot.
pub fn validate_draft(policy: &ApprovalPolicy, payload: &DraftPayload) -> Result<(), CoreError> {
    validate_student_id(&payload.student_id)?;
    validate_required_fields(policy, &payload.details)?;
    let slots: Vec<AttachmentSlot> = payload.attachments.iter().map(|a| a.slot).collect();
    validate_required_attachments(policy, &slots)?;
    reject_document_slots(slots.iter())?;
    Ok(())
}

fn reject_document_slots<'a>(
    mut slots: impl Iterator<Item = &'a AttachmentSlot>,
) -> Result<(), CoreError> {
    if let Some(slot) = slots.find(|slot| slot.is_document()) {
        return Err(CoreError::ValidationFailed {
            field: slot.as_str().to_string(),
            message: String::from("decision documents can only be attached by document upload"),
        });
    }
    Ok(())
}

/// Builds a new draft case and its creation event.
#[must_use]
pub fn apply_create(
    kind: CaseKind,
    id: CaseId,
    payload: &DraftPayload,
    attachments: BTreeMap<AttachmentSlot, BlobRef>,
    actor: Actor,
    at: OffsetDateTime,
) -> TransitionResult {
    let case: Case = Case::new_draft(
        id,
        kind,
        payload.student_id.trim().to_string(),
        payload.details.clone(),
        attachments,
        actor.username.clone(),
        at,
    );
    let before: StatusSnapshot = StatusSnapshot::new(case.id.value().to_string(), None);
    let after: StatusSnapshot =
        StatusSnapshot::new(case.id.value().to_string(), Some(case.status));
    let action: Action = Action::new(
        ActionKind::CreateDraft,
        Some(format!("Created draft for student {}", case.student_id)),
    );
    let audit_event: AuditEvent = AuditEvent::new(case.kind, actor, action, before, after, at);

    TransitionResult {
        new_case: case,
        audit_event,
    }
}

/// Checks that an approval decision can be recorded and returns the pending step.
///
/// # Errors
///
/// Returns `InvalidState` for drafts and deleted cases and
/// `AlreadyProcessed` once a final decision was made.
pub fn check_decidable(case: &Case, operation: ActionKind) -> Result<u8, CoreError> {
    match case.status {
        CaseStatus::PendingApproval(step) => Ok(step),
        CaseStatus::AwaitingDocument | CaseStatus::Approved | CaseStatus::Rejected => {
            Err(CoreError::AlreadyProcessed {
                case_id: case.id.value().to_string(),
                status: case.status,
            })
        }
        CaseStatus::Draft | CaseStatus::Deleted => Err(invalid_state(case, operation)),
    }
}

/// Checks that `role` is the approver expected at `step`.
///
/// # Errors
///
/// Returns `InvalidRole` on a mismatch and `AlreadyProcessed` if the role
/// already decided on this case.
pub fn check_role(
    policy: &ApprovalPolicy,
    case: &Case,
    step: u8,
    role: RoleTag,
    operation: ActionKind,
) -> Result<(), CoreError> {
    let expected: RoleTag = policy
        .expected_role(step)
        .ok_or_else(|| invalid_state(case, operation))?;
    if role != expected {
        return Err(CoreError::InvalidRole {
            case_id: case.id.value().to_string(),
            expected,
            actual: role,
        });
    }
    if case.has_decision_by(role) {
        return Err(CoreError::AlreadyProcessed {
            case_id: case.id.value().to_string(),
            status: case.status,
        });
    }
    Ok(())
}

/// Checks that content edits are allowed.
///
/// # Errors
///
/// Returns `InvalidState` unless the case is a draft, or not yet approved
/// and the policy allows edits after finalization.
pub fn check_editable(policy: &ApprovalPolicy, case: &Case) -> Result<(), CoreError> {
    match case.status {
        CaseStatus::Draft => Ok(()),
        CaseStatus::PendingApproval(_) | CaseStatus::AwaitingDocument
            if policy.editable_while_pending =>
        {
            Ok(())
        }
        _ => Err(invalid_state(case, ActionKind::Update)),
    }
}

/// Checks that the case may be soft-deleted.
///
/// # Errors
///
/// Returns `InvalidState` for deleted cases and for approved cases unless
/// the policy allows deleting them.
pub fn check_deletable(policy: &ApprovalPolicy, case: &Case) -> Result<(), CoreError> {
    match case.status {
        CaseStatus::Deleted => Err(invalid_state(case, ActionKind::SoftDelete)),
        CaseStatus::Approved if !policy.deletable_when_approved => {
            Err(invalid_state(case, ActionKind::SoftDelete))
        }
        _ => Ok(()),
    }
}

/// Decides what uploading into a document slot does.
///
/// # Errors
///
/// Returns `ValidationFailed` for non-document slots, `AlreadyProcessed`
/// for a forbidden re-upload and `InvalidState` otherwise.
pub fn plan_document_upload(
    policy: &ApprovalPolicy,
    case: &Case,
    slot: AttachmentSlot,
) -> Result<UploadPlan, CoreError> {
    if !slot.is_document() {
        return Err(CoreError::ValidationFailed {
            field: String::from("slot"),
            message: format!("'{slot}' is not a decision document slot"),
        });
    }
    if !policy.requires_document {
        return Err(invalid_state(case, ActionKind::UploadDocument));
    }

    match (slot, case.status) {
        (AttachmentSlot::Sk, CaseStatus::AwaitingDocument) => Ok(UploadPlan {
            mint_number: case.document.is_none(),
            completes: true,
        }),
        (AttachmentSlot::Sk, CaseStatus::Approved) if policy.allow_document_reupload => {
            Ok(UploadPlan {
                mint_number: case.document.is_none(),
                completes: false,
            })
        }
        (AttachmentSlot::Sk, CaseStatus::Approved) => Err(CoreError::AlreadyProcessed {
            case_id: case.id.value().to_string(),
            status: case.status,
        }),
        (AttachmentSlot::SkSupplementary, CaseStatus::AwaitingDocument | CaseStatus::Approved) => {
            Ok(UploadPlan {
                mint_number: false,
                completes: false,
            })
        }
        _ => Err(invalid_state(case, ActionKind::UploadDocument)),
    }
}

/// Applies a transition to a case, producing the new case and audit event.
///
/// # Errors
///
/// Returns an error if the transition is not legal for the case's status
/// under its policy.
#[allow(clippy::too_many_lines)]
pub fn apply(
    policy: &ApprovalPolicy,
    case: &Case,
    transition: Transition,
    actor: Actor,
    at: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let before: StatusSnapshot =
        StatusSnapshot::new(case.id.value().to_string(), Some(case.status));
    let mut new_case: Case = case.clone();
    new_case.version = case.version.wrapping_add(1);
    new_case.modified_by.clone_from(&actor.username);
    new_case.modified_at = at;

    let action: Action = match transition {
        Transition::Finalize {
            official_id,
            sequence,
        } => {
            if case.status != CaseStatus::Draft {
                return Err(invalid_state(case, ActionKind::Finalize));
            }
            let target: CaseStatus = CaseStatus::PendingApproval(1);
            case.status
                .validate_transition(target, policy.role_count(), policy.requires_document)?;

            new_case.id = official_id;
            new_case.official = Some(sequence);
            new_case.status = target;
            Action::new(
                ActionKind::Finalize,
                Some(format!(
                    "Draft {} finalized as {}",
                    case.id.value(),
                    new_case.id.value()
                )),
            )
        }
        Transition::Approve { role } => {
            let step: u8 = check_decidable(case, ActionKind::Approve)?;
            check_role(policy, case, step, role, ActionKind::Approve)?;
            let target: CaseStatus = policy.status_after_approval(step);
            case.status
                .validate_transition(target, policy.role_count(), policy.requires_document)?;

            new_case.approval_trail.push(ApprovalEntry {
                role,
                approver: actor.username.clone(),
                at,
                decision: Decision::Approved,
            });
            new_case.status = target;
            Action::new(
                ActionKind::Approve,
                Some(format!("Approved as {role} at step {step}")),
            )
        }
        Transition::Reject { role, reason } => {
            let step: u8 = check_decidable(case, ActionKind::Reject)?;
            check_role(policy, case, step, role, ActionKind::Reject)?;
            validate_reason(&reason)?;

            new_case.approval_trail.push(ApprovalEntry {
                role,
                approver: actor.username.clone(),
                at,
                decision: Decision::Rejected,
            });
            new_case.status = CaseStatus::Rejected;
            new_case.rejection_reason = Some(reason.trim().to_string());
            Action::new(
                ActionKind::Reject,
                Some(format!("Rejected as {role} at step {step}: {}", reason.trim())),
            )
        }
        Transition::AttachDocument {
            slot,
            blob,
            document,
        } => {
            let plan: UploadPlan = plan_document_upload(policy, case, slot)?;
            match (&case.document, document) {
                // An issued number is never replaced.
                (Some(_), _) => {}
                (None, Some(minted)) if plan.mint_number => new_case.document = Some(minted),
                (None, _) if plan.mint_number => {
                    return Err(CoreError::ValidationFailed {
                        field: String::from("document"),
                        message: String::from("a document number must be issued with the first SK"),
                    });
                }
                (None, _) => {}
            }
            if plan.completes {
                case.status.validate_transition(
                    CaseStatus::Approved,
                    policy.role_count(),
                    policy.requires_document,
                )?;
                new_case.status = CaseStatus::Approved;
            }
            new_case.attachments.insert(slot, blob.clone());
            Action::new(
                ActionKind::UploadDocument,
                Some(format!(
                    "Stored {slot} as {blob}{}",
                    new_case
                        .document
                        .as_ref()
                        .map(|doc| format!(" (number {})", doc.number))
                        .unwrap_or_default()
                )),
            )
        }
        Transition::Update {
            student_id,
            details,
            attachments,
        } => {
            check_editable(policy, case)?;
            reject_document_slots(attachments.keys())?;

            if let Some(student_id) = student_id {
                validate_student_id(&student_id)?;
                new_case.student_id = student_id.trim().to_string();
            }
            for (field, value) in details {
                if value.trim().is_empty() {
                    new_case.details.remove(&field);
                } else {
                    new_case.details.insert(field, value);
                }
            }
            new_case.attachments.extend(attachments);

            validate_required_fields(policy, &new_case.details)?;
            validate_required_attachments(policy, new_case.attachments.keys())?;
            Action::new(ActionKind::Update, None)
        }
        Transition::SoftDelete => {
            check_deletable(policy, case)?;
            new_case.status = CaseStatus::Deleted;
            Action::new(
                ActionKind::SoftDelete,
                Some(format!("Deleted from status {}", case.status)),
            )
        }
    };

    let after: StatusSnapshot =
        StatusSnapshot::new(new_case.id.value().to_string(), Some(new_case.status));
    let audit_event: AuditEvent = AuditEvent::new(case.kind, actor, action, before, after, at);

    Ok(TransitionResult {
        new_case,
        audit_event,
    })
}

fn invalid_state(case: &Case, operation: ActionKind) -> CoreError {
    CoreError::InvalidState {
        case_id: case.id.value().to_string(),
        status: case.status,
        operation,
    }
}
