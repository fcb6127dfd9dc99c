// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The case workflow engine.
//!
//! Every mutation follows the same shape: load the case, run the status
//! prechecks, resolve the acting role, store any blobs, apply the pure
//! transition and write it back with a compare-and-swap on the status and
//! version the case was loaded with. The engine holds no locks; a lost
//! race surfaces as [`CoreError::ConcurrentModification`].
//!
//! The request context travels into every store and blob call, so a
//! cancelled or expired request stops inside the adapter as well as
//! between calls.

use crate::allocator::{Allocated, IdentifierAllocator};
use crate::apply::{
    TransitionResult, UploadPlan, apply, apply_create, check_decidable, check_editable,
    plan_document_upload, validate_draft,
};
use crate::command::{AttachmentUpload, DraftPayload, Transition, UpdatePayload};
use crate::context::RequestContext;
use crate::error::{CoreError, StoreError};
use crate::ports::{BlobStore, CasePrecondition, CaseStore, Clock, IdentityResolver};
use registrar_audit::{ActionKind, Actor, AuditEvent};
use registrar_domain::{
    ApprovalPolicy, AttachmentSlot, BlobRef, Case, CaseId, CaseKind, CaseStatus, DocumentRecord,
    OfficialSequence, Period, PolicyTable, RoleSource, RoleTag,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

/// Finalize attempts when the conditional write loses to an id collision.
const FINALIZE_ATTEMPTS: u32 = 3;

/// Result of a document upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// The case's decision document number, once issued.
    pub document_number: Option<String>,
    pub blob: BlobRef,
    pub status: CaseStatus,
}

/// Drives cases through their approval lifecycle.
#[derive(Clone)]
pub struct WorkflowEngine {
    store: Arc<dyn CaseStore>,
    blobs: Arc<dyn BlobStore>,
    identity: Arc<dyn IdentityResolver>,
    clock: Arc<dyn Clock>,
    policies: Arc<PolicyTable>,
    allocator: IdentifierAllocator,
}

impl WorkflowEngine {
    #[must_use]
    pub fn new(
        store: Arc<dyn CaseStore>,
        blobs: Arc<dyn BlobStore>,
        identity: Arc<dyn IdentityResolver>,
        clock: Arc<dyn Clock>,
        policies: Arc<PolicyTable>,
    ) -> Self {
        let allocator: IdentifierAllocator =
            IdentifierAllocator::new(Arc::clone(&store), Arc::clone(&policies), Arc::clone(&clock));
        Self {
            store,
            blobs,
            identity,
            clock,
            policies,
            allocator,
        }
    }

    #[must_use]
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Creates a new draft case.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` for a blank student id, a missing required
    /// detail or attachment, plus allocation, storage and cancellation errors.
    pub fn create_draft(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        payload: DraftPayload,
        created_by: &str,
    ) -> Result<CaseId, CoreError> {
        let actor: Actor = actor(created_by, None)?;
        let policy: &ApprovalPolicy = self.policies.get(kind);
        validate_draft(policy, &payload)?;

        let id: CaseId = self.allocator.allocate_draft_id(ctx, kind)?;
        let attachments: BTreeMap<AttachmentSlot, BlobRef> =
            self.save_attachments(ctx, &payload.attachments)?;

        let result: TransitionResult =
            apply_create(kind, id, &payload, attachments, actor, self.clock.now());

        self.store.insert(ctx, &result.new_case).map_err(|err| match err {
            StoreError::Conflict(_) => CoreError::ConcurrentModification {
                case_id: result.new_case.id.value().to_string(),
            },
            other => other.into(),
        })?;
        self.record(&result.audit_event)?;

        info!(
            kind = %kind,
            case_id = %result.new_case.id,
            actor = %created_by,
            "Created draft case"
        );
        Ok(result.new_case.id)
    }

    /// Finalizes a draft, replacing its id with an official one.
    ///
    /// Replaying finalize on a case that already has an official id returns
    /// that id without minting a new sequence. `case_id` may be the draft id
    /// or the current id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no case answers to the id, `InvalidState` for a
    /// deleted draft, `AlreadyFinalized` if the draft moved on without an
    /// official record, plus allocation, storage and cancellation errors.
    pub fn finalize(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        case_id: &str,
        finalized_by: &str,
    ) -> Result<CaseId, CoreError> {
        let actor: Actor = actor(finalized_by, None)?;
        let policy: &ApprovalPolicy = self.policies.get(kind);

        for attempt in 1..=FINALIZE_ATTEMPTS {
            let case: Case = self.load(ctx, kind, case_id)?;
            match case.status {
                CaseStatus::Draft => {}
                _ if case.id.is_official() => {
                    debug!(kind = %kind, case_id = %case.id, "Finalize replayed");
                    return Ok(case.id);
                }
                CaseStatus::Deleted => {
                    return Err(CoreError::InvalidState {
                        case_id: case.id.value().to_string(),
                        status: case.status,
                        operation: ActionKind::Finalize,
                    });
                }
                _ => {
                    return Err(CoreError::AlreadyFinalized {
                        case_id: case_id.to_string(),
                    });
                }
            }

            let now: OffsetDateTime = self.clock.now();
            let allocated: Allocated =
                self.allocator
                    .allocate_official_id(ctx, kind, Period::containing(now))?;
            let transition: Transition = Transition::Finalize {
                official_id: CaseId::official(allocated.value),
                sequence: OfficialSequence {
                    sequence: allocated.sequence,
                    period: allocated.period,
                },
            };
            let result: TransitionResult = apply(policy, &case, transition, actor.clone(), now)?;

            if self.store.compare_and_swap(
                ctx,
                kind,
                case.id.value(),
                CasePrecondition::of(&case),
                &result.new_case,
            )? {
                self.record(&result.audit_event)?;
                info!(
                    kind = %kind,
                    case_id = %result.new_case.id,
                    draft_id = %case.draft_id,
                    actor = %finalized_by,
                    "Finalized case"
                );
                return Ok(result.new_case.id);
            }
            warn!(kind = %kind, case_id = %case.id, attempt, "Finalize lost conditional write");
        }

        Err(CoreError::ConcurrentModification {
            case_id: case_id.to_string(),
        })
    }

    /// Records an approval and advances the case.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` for drafts and deleted cases,
    /// `AlreadyProcessed` once decided, `InvalidRole` for the wrong
    /// approver and `RoleUndetermined` if no role can be established.
    pub fn approve(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        case_id: &str,
        role: Option<RoleTag>,
        approver: &str,
    ) -> Result<CaseStatus, CoreError> {
        let policy: &ApprovalPolicy = self.policies.get(kind);
        let case: Case = self.load(ctx, kind, case_id)?;
        check_decidable(&case, ActionKind::Approve)?;
        let role: RoleTag = self.resolve_role(policy, &case, role, approver)?;

        let result: TransitionResult = apply(
            policy,
            &case,
            Transition::Approve { role },
            actor(approver, Some(role))?,
            self.clock.now(),
        )?;
        let updated: Case = self.commit(ctx, kind, &case, result)?;

        info!(
            kind = %kind,
            case_id = %updated.id,
            actor = %approver,
            role = %role,
            status = %updated.status,
            "Approved case"
        );
        Ok(updated.status)
    }

    /// Records a rejection.
    ///
    /// # Errors
    ///
    /// Same as [`WorkflowEngine::approve`], plus `ValidationFailed` for a
    /// blank reason.
    pub fn reject(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        case_id: &str,
        role: Option<RoleTag>,
        rejected_by: &str,
        reason: &str,
    ) -> Result<CaseStatus, CoreError> {
        let policy: &ApprovalPolicy = self.policies.get(kind);
        let case: Case = self.load(ctx, kind, case_id)?;
        check_decidable(&case, ActionKind::Reject)?;
        let role: RoleTag = self.resolve_role(policy, &case, role, rejected_by)?;

        let result: TransitionResult = apply(
            policy,
            &case,
            Transition::Reject {
                role,
                reason: reason.to_string(),
            },
            actor(rejected_by, Some(role))?,
            self.clock.now(),
        )?;
        let updated: Case = self.commit(ctx, kind, &case, result)?;

        info!(
            kind = %kind,
            case_id = %updated.id,
            actor = %rejected_by,
            role = %role,
            "Rejected case"
        );
        Ok(updated.status)
    }

    /// Stores a decision document (SK) or a supplementary document.
    ///
    /// The first SK upload mints the document number and approves the case.
    /// Re-uploads keep the number and only replace the stored reference.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the kind has no document step or the case
    /// is not waiting for one, `ValidationFailed` for a non-document slot
    /// and `AlreadyProcessed` for a re-upload the policy forbids.
    pub fn upload_document(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        case_id: &str,
        upload: AttachmentUpload,
        uploaded_by: &str,
    ) -> Result<UploadOutcome, CoreError> {
        let actor: Actor = actor(uploaded_by, None)?;
        let policy: &ApprovalPolicy = self.policies.get(kind);
        let case: Case = self.load(ctx, kind, case_id)?;
        let plan: UploadPlan = plan_document_upload(policy, &case, upload.slot)?;

        let blob: BlobRef = self.save_blob(ctx, &upload)?;
        let now: OffsetDateTime = self.clock.now();
        let document: Option<DocumentRecord> = if plan.mint_number {
            let allocated: Allocated =
                self.allocator
                    .allocate_document_number(ctx, kind, Period::containing(now))?;
            Some(DocumentRecord {
                number: allocated.value,
                sequence: allocated.sequence,
                period: allocated.period,
            })
        } else {
            None
        };

        let result: TransitionResult = apply(
            policy,
            &case,
            Transition::AttachDocument {
                slot: upload.slot,
                blob: blob.clone(),
                document,
            },
            actor,
            now,
        )?;
        let updated: Case = self.commit(ctx, kind, &case, result)?;

        let document_number: Option<String> =
            updated.document.as_ref().map(|doc| doc.number.clone());
        info!(
            kind = %kind,
            case_id = %updated.id,
            actor = %uploaded_by,
            slot = %upload.slot,
            document_number = ?document_number,
            "Uploaded document"
        );
        Ok(UploadOutcome {
            document_number,
            blob,
            status: updated.status,
        })
    }

    /// Edits a case's content.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` once the case is past the editable statuses of
    /// its policy, and `ValidationFailed` for an empty edit or an edit that
    /// leaves a required field or attachment missing.
    pub fn update(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        case_id: &str,
        payload: UpdatePayload,
        updated_by: &str,
    ) -> Result<Case, CoreError> {
        let actor: Actor = actor(updated_by, None)?;
        if payload.is_empty() {
            return Err(CoreError::ValidationFailed {
                field: String::from("payload"),
                message: String::from("nothing to update"),
            });
        }
        let policy: &ApprovalPolicy = self.policies.get(kind);
        let case: Case = self.load(ctx, kind, case_id)?;
        check_editable(policy, &case)?;

        let attachments: BTreeMap<AttachmentSlot, BlobRef> =
            self.save_attachments(ctx, &payload.attachments)?;
        let result: TransitionResult = apply(
            policy,
            &case,
            Transition::Update {
                student_id: payload.student_id,
                details: payload.details,
                attachments,
            },
            actor,
            self.clock.now(),
        )?;
        let updated: Case = self.commit(ctx, kind, &case, result)?;

        info!(kind = %kind, case_id = %updated.id, actor = %updated_by, "Updated case");
        Ok(updated)
    }

    /// Marks a case as deleted. The record stays retrievable.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no case answers to the id and `InvalidState`
    /// if it is already deleted or its policy keeps approved cases.
    pub fn soft_delete(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        case_id: &str,
        deleted_by: &str,
    ) -> Result<(), CoreError> {
        let actor: Actor = actor(deleted_by, None)?;
        let policy: &ApprovalPolicy = self.policies.get(kind);
        let case: Case = self.load(ctx, kind, case_id)?;

        let result: TransitionResult =
            apply(policy, &case, Transition::SoftDelete, actor, self.clock.now())?;
        let updated: Case = self.commit(ctx, kind, &case, result)?;

        info!(
            kind = %kind,
            case_id = %updated.id,
            actor = %deleted_by,
            previous = %case.status,
            "Deleted case"
        );
        Ok(())
    }

    /// Reads a case by its current or draft id, including deleted cases.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no case answers to the id.
    pub fn get(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        case_id: &str,
    ) -> Result<Case, CoreError> {
        self.load(ctx, kind, case_id)
    }

    fn load(&self, ctx: &RequestContext, kind: CaseKind, case_id: &str) -> Result<Case, CoreError> {
        if let Some(case) = self.store.get_by_id(ctx, kind, case_id)? {
            return Ok(case);
        }
        if let Some(case) = self.store.get_by_draft_id(ctx, kind, case_id)? {
            debug!(kind = %kind, draft_id = %case_id, case_id = %case.id, "Resolved case by draft id");
            return Ok(case);
        }
        Err(CoreError::NotFound {
            kind,
            case_id: case_id.to_string(),
        })
    }

    /// Determines the role acting on the case.
    fn resolve_role(
        &self,
        policy: &ApprovalPolicy,
        case: &Case,
        supplied: Option<RoleTag>,
        username: &str,
    ) -> Result<RoleTag, CoreError> {
        let role: Option<RoleTag> = match policy.role_source {
            RoleSource::Supplied => supplied.or_else(|| self.identity.classify_role(username)),
            RoleSource::Resolved => {
                let resolved: Option<RoleTag> = self.identity.classify_role(username);
                match (resolved, supplied) {
                    (Some(resolved), Some(supplied)) if resolved != supplied => {
                        return Err(CoreError::InvalidRole {
                            case_id: case.id.value().to_string(),
                            expected: resolved,
                            actual: supplied,
                        });
                    }
                    _ => resolved,
                }
            }
        };

        role.ok_or_else(|| CoreError::RoleUndetermined {
            username: username.to_string(),
        })
    }

    fn save_blob(
        &self,
        ctx: &RequestContext,
        upload: &AttachmentUpload,
    ) -> Result<BlobRef, CoreError> {
        let blob: BlobRef = self.blobs.save(ctx, &upload.bytes, &upload.file_name)?;
        debug!(slot = %upload.slot, blob = %blob, size = upload.bytes.len(), "Stored blob");
        Ok(blob)
    }

    fn save_attachments(
        &self,
        ctx: &RequestContext,
        uploads: &[AttachmentUpload],
    ) -> Result<BTreeMap<AttachmentSlot, BlobRef>, CoreError> {
        let mut attachments: BTreeMap<AttachmentSlot, BlobRef> = BTreeMap::new();
        for upload in uploads {
            attachments.insert(upload.slot, self.save_blob(ctx, upload)?);
        }
        Ok(attachments)
    }

    /// Writes a transition back, conditional on the loaded status and version.
    fn commit(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        loaded: &Case,
        result: TransitionResult,
    ) -> Result<Case, CoreError> {
        let swapped: bool = self.store.compare_and_swap(
            ctx,
            kind,
            loaded.id.value(),
            CasePrecondition::of(loaded),
            &result.new_case,
        )?;
        if !swapped {
            warn!(
                kind = %kind,
                case_id = %loaded.id,
                expected = %loaded.status,
                version = loaded.version,
                "Conditional write lost to a concurrent change"
            );
            return Err(CoreError::ConcurrentModification {
                case_id: loaded.id.value().to_string(),
            });
        }
        // The audit append belongs to the committed write.
        self.record(&result.audit_event)?;
        Ok(result.new_case)
    }

    /// Appends the event of a committed write.
    ///
    /// Runs under a fresh context: once the case row is written, its event
    /// is recorded even if the request was cancelled meanwhile.
    fn record(&self, event: &AuditEvent) -> Result<(), CoreError> {
        self.store.append_audit(&RequestContext::new(), event)?;
        Ok(())
    }
}

fn actor(username: &str, role: Option<RoleTag>) -> Result<Actor, CoreError> {
    let username: &str = username.trim();
    if username.is_empty() {
        return Err(CoreError::ValidationFailed {
            field: String::from("actor"),
            message: String::from("actor username must not be blank"),
        });
    }
    Ok(match role {
        Some(role) => Actor::with_role(username.to_string(), role),
        None => Actor::new(username.to_string()),
    })
}
