// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use registrar_domain::{CaseKind, CaseStatus, RoleTag};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[cfg(test)]
mod tests;

/// Represents the user performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting username.
    pub username: String,
    /// The role the user acted in, when the action is role-gated.
    pub role: Option<RoleTag>,
}

impl Actor {
    /// Creates an actor acting without a role.
    #[must_use]
    pub const fn new(username: String) -> Self {
        Self {
            username,
            role: None,
        }
    }

    /// Creates an actor acting in a role.
    #[must_use]
    pub const fn with_role(username: String, role: RoleTag) -> Self {
        Self {
            username,
            role: Some(role),
        }
    }
}

/// The workflow operation that was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateDraft,
    Finalize,
    Approve,
    Reject,
    UploadDocument,
    Update,
    SoftDelete,
}

impl ActionKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateDraft => "create_draft",
            Self::Finalize => "finalize",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::UploadDocument => "upload_document",
            Self::Update => "update",
            Self::SoftDelete => "soft_delete",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    /// Optional human-readable details.
    pub details: Option<String>,
}

impl Action {
    #[must_use]
    pub const fn new(kind: ActionKind, details: Option<String>) -> Self {
        Self { kind, details }
    }
}

/// The identifier and status of a case at one point in time.
///
/// `status` is `None` before the case existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub case_id: String,
    pub status: Option<CaseStatus>,
}

impl StatusSnapshot {
    #[must_use]
    pub const fn new(case_id: String, status: Option<CaseStatus>) -> Self {
        Self { case_id, status }
    }
}

/// An immutable audit event representing one case transition.
///
/// Every successful workflow mutation produces exactly one audit event.
/// `before` and `after` carry the identifier too, since finalization
/// replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub kind: CaseKind,
    pub actor: Actor,
    pub action: Action,
    pub before: StatusSnapshot,
    pub after: StatusSnapshot,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    #[must_use]
    pub const fn new(
        kind: CaseKind,
        actor: Actor,
        action: Action,
        before: StatusSnapshot,
        after: StatusSnapshot,
        occurred_at: OffsetDateTime,
    ) -> Self {
        Self {
            kind,
            actor,
            action,
            before,
            after,
            occurred_at,
        }
    }

    /// Returns true if the event concerns the given case identifier,
    /// before or after the transition.
    #[must_use]
    pub fn concerns(&self, case_id: &str) -> bool {
        self.before.case_id == case_id || self.after.case_id == case_id
    }
}
