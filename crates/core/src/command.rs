// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use registrar_domain::{AttachmentSlot, BlobRef, CaseId, DocumentRecord, OfficialSequence, RoleTag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File content to be stored in an attachment slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentUpload {
    pub slot: AttachmentSlot,
    /// Name hint passed to the blob store.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl AttachmentUpload {
    #[must_use]
    pub fn new(slot: AttachmentSlot, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            slot,
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Content of a new case submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPayload {
    pub student_id: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentUpload>,
}

/// Content edits to an existing case.
///
/// Omitted fields are left unchanged. A detail set to an empty string is
/// removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub student_id: Option<String>,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentUpload>,
}

impl UpdatePayload {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.student_id.is_none() && self.details.is_empty() && self.attachments.is_empty()
    }
}

/// A transition represents workflow intent as data only.
///
/// Blob bytes and newly minted identifiers are resolved by the engine
/// before a transition is applied, so applying one is pure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Replace the draft id with an official one and enter the first approval step.
    Finalize {
        official_id: CaseId,
        sequence: OfficialSequence,
    },
    /// Record an approval by the given role.
    Approve { role: RoleTag },
    /// Record a rejection by the given role.
    Reject { role: RoleTag, reason: String },
    /// Store an uploaded document; `document` is set only when a number was minted.
    AttachDocument {
        slot: AttachmentSlot,
        blob: BlobRef,
        document: Option<DocumentRecord>,
    },
    /// Replace mutable content.
    Update {
        student_id: Option<String>,
        details: BTreeMap<String, String>,
        attachments: BTreeMap<AttachmentSlot, BlobRef>,
    },
    /// Soft delete.
    SoftDelete,
}
