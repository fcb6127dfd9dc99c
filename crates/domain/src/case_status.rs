// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Case status states and transition rules.
//!
//! The status path is shared by every case kind:
//!
//! `Draft → PendingApproval(1) → … → PendingApproval(n) → [AwaitingDocument →] Approved`
//!
//! Any pending step may instead move to `Rejected`. `Deleted` is an
//! orthogonal soft-delete escape whose legality depends on the kind's policy.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status of a case within its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "step")]
pub enum CaseStatus {
    /// Created but not yet submitted for approval.
    Draft,
    /// Waiting for the approver at the given 1-based position of the role sequence.
    PendingApproval(u8),
    /// All approvals recorded; waiting for the decision document upload.
    AwaitingDocument,
    /// Workflow completed successfully.
    Approved,
    /// An approver rejected the case.
    Rejected,
    /// Soft-deleted; the record is retained.
    Deleted,
}

impl CaseStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and filtering.
    #[must_use]
    pub fn as_string(&self) -> String {
        match self {
            Self::Draft => String::from("draft"),
            Self::PendingApproval(step) => format!("pending_approval_{step}"),
            Self::AwaitingDocument => String::from("awaiting_document"),
            Self::Approved => String::from("approved"),
            Self::Rejected => String::from("rejected"),
            Self::Deleted => String::from("deleted"),
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "draft" => Ok(Self::Draft),
            "awaiting_document" => Ok(Self::AwaitingDocument),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "deleted" => Ok(Self::Deleted),
            other => other
                .strip_prefix("pending_approval_")
                .and_then(|step| step.parse::<u8>().ok())
                .filter(|step| *step >= 1)
                .map(Self::PendingApproval)
                .ok_or_else(|| DomainError::InvalidCaseStatus {
                    status: s.to_string(),
                }),
        }
    }

    /// Returns true once no approval decision can be recorded anymore.
    #[must_use]
    pub const fn is_decided(&self) -> bool {
        matches!(
            self,
            Self::AwaitingDocument | Self::Approved | Self::Rejected
        )
    }

    /// Returns true if the status is pending an approver.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::PendingApproval(_))
    }

    /// Returns the 1-based approval step, if pending.
    #[must_use]
    pub const fn pending_step(&self) -> Option<u8> {
        match self {
            Self::PendingApproval(step) => Some(*step),
            _ => None,
        }
    }

    /// Checks if a transition along the approval path is valid.
    ///
    /// `role_count` is the length of the kind's role sequence and
    /// `requires_document` whether a document upload precedes `Approved`.
    /// Soft deletion is not covered here; it is governed by policy.
    #[must_use]
    pub const fn can_transition_to(
        &self,
        target: Self,
        role_count: u8,
        requires_document: bool,
    ) -> bool {
        match (*self, target) {
            (Self::Draft, Self::PendingApproval(1)) => role_count >= 1,
            (Self::PendingApproval(k), Self::PendingApproval(next)) => {
                next > k && next - k == 1 && next <= role_count
            }
            (Self::PendingApproval(k), Self::AwaitingDocument) => {
                k == role_count && requires_document
            }
            (Self::PendingApproval(k), Self::Approved) => k == role_count && !requires_document,
            (Self::PendingApproval(_), Self::Rejected) => true,
            (Self::AwaitingDocument, Self::Approved) => requires_document,
            _ => false,
        }
    }

    /// Validates a transition along the approval path.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the transition is not allowed.
    pub fn validate_transition(
        &self,
        target: Self,
        role_count: u8,
        requires_document: bool,
    ) -> Result<(), DomainError> {
        if self.can_transition_to(target, role_count, requires_document) {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_string(),
                to: target.as_string(),
            })
        }
    }
}

impl FromStr for CaseStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}
