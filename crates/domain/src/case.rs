// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::case_status::CaseStatus;
use crate::period::Period;
use crate::types::{AttachmentSlot, BlobRef, CaseId, CaseKind, RoleTag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// An approver's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

/// One entry of the append-only approval trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalEntry {
    pub role: RoleTag,
    pub approver: String,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub decision: Decision,
}

/// The issued decision document number.
///
/// Assigned once on the first SK upload and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub number: String,
    pub sequence: u32,
    pub period: Period,
}

/// Where an official identifier was minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficialSequence {
    pub sequence: u32,
    pub period: Period,
}

/// One workflow instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Current identifier (draft or official).
    pub id: CaseId,
    /// The identifier assigned at creation; kept after finalization.
    pub draft_id: String,
    /// Present once the case is finalized.
    pub official: Option<OfficialSequence>,
    pub kind: CaseKind,
    pub student_id: String,
    pub status: CaseStatus,
    /// Incremented by every committed write; conditional writes match on it.
    pub version: u32,
    pub details: BTreeMap<String, String>,
    pub attachments: BTreeMap<AttachmentSlot, BlobRef>,
    pub approval_trail: Vec<ApprovalEntry>,
    pub rejection_reason: Option<String>,
    pub document: Option<DocumentRecord>,
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub modified_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub modified_at: OffsetDateTime,
}

impl Case {
    /// Creates a new draft case.
    #[must_use]
    pub fn new_draft(
        id: CaseId,
        kind: CaseKind,
        student_id: String,
        details: BTreeMap<String, String>,
        attachments: BTreeMap<AttachmentSlot, BlobRef>,
        created_by: String,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            draft_id: id.value().to_string(),
            id,
            official: None,
            kind,
            student_id,
            status: CaseStatus::Draft,
            version: 1,
            details,
            attachments,
            approval_trail: Vec::new(),
            rejection_reason: None,
            document: None,
            modified_by: created_by.clone(),
            created_by,
            modified_at: created_at,
            created_at,
        }
    }

    /// Returns true if this case was created with the given draft id
    /// or currently holds the given id.
    #[must_use]
    pub fn answers_to(&self, id: &str) -> bool {
        self.id.value() == id || self.draft_id == id
    }

    /// Returns true if the role already decided on this case.
    #[must_use]
    pub fn has_decision_by(&self, role: RoleTag) -> bool {
        self.approval_trail.iter().any(|entry| entry.role == role)
    }

    /// Returns true if the username created or decided on this case.
    #[must_use]
    pub fn involves(&self, username: &str) -> bool {
        self.created_by == username
            || self
                .approval_trail
                .iter()
                .any(|entry| entry.approver == username)
    }

    /// Returns the reference stored in an attachment slot.
    #[must_use]
    pub fn attachment(&self, slot: AttachmentSlot) -> Option<&BlobRef> {
        self.attachments.get(&slot)
    }
}
