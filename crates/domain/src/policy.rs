// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Approval policy per case kind.
//!
//! The [`PolicyTable`] is the single source of truth for role sequences,
//! identifier templates and per-kind workflow flags. It is validated once
//! at construction and immutable afterwards.

use crate::case_status::CaseStatus;
use crate::error::DomainError;
use crate::period::Period;
use crate::types::{AttachmentSlot, CaseKind, RoleTag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default official identifier template.
pub const DEFAULT_ID_TEMPLATE: &str = "{seq}/{org}/{code}/{month}/{year}";
/// Default decision document number template.
pub const DEFAULT_DOCUMENT_TEMPLATE: &str = "{seq}/{org}/SK-{code}/{month}/{year}";
/// Default organization code.
pub const DEFAULT_ORGANIZATION: &str = "PMA";

/// Where the acting role of an approval comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSource {
    /// The caller names the role; the identity resolver is a fallback.
    Supplied,
    /// The role is always derived from the approver's username.
    Resolved,
}

/// A formatted identifier template.
///
/// Placeholders: `{seq}` (zero-padded to 3 digits), `{org}`, `{code}`,
/// `{month}` (Roman numeral) and `{year}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdTemplate(String);

impl IdTemplate {
    /// Creates a template.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTemplate` if `{seq}` is missing.
    pub fn new(template: impl Into<String>) -> Result<Self, DomainError> {
        let template: String = template.into();
        if !template.contains("{seq}") {
            return Err(DomainError::InvalidTemplate(template));
        }
        Ok(Self(template))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders the template for one sequence number.
    #[must_use]
    pub fn render(&self, sequence: u32, organization: &str, code: &str, period: &Period) -> String {
        self.0
            .replace("{seq}", &format!("{sequence:03}"))
            .replace("{org}", organization)
            .replace("{code}", code)
            .replace("{month}", period.roman_month())
            .replace("{year}", &period.year().to_string())
    }
}

/// Workflow rules for one case kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    pub kind: CaseKind,
    /// Ordered approver roles.
    pub roles: Vec<RoleTag>,
    /// Whether an SK upload is required between the last approval and `Approved`.
    pub requires_document: bool,
    pub role_source: RoleSource,
    /// Short code used in identifier templates (e.g. `CA`).
    pub code: String,
    pub id_template: IdTemplate,
    pub document_template: IdTemplate,
    /// Detail fields that must be non-blank.
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub required_attachments: Vec<AttachmentSlot>,
    /// Content edits allowed after finalization until the case is approved.
    #[serde(default)]
    pub editable_while_pending: bool,
    /// Soft delete allowed after approval.
    #[serde(default)]
    pub deletable_when_approved: bool,
    /// SK re-upload allowed after approval.
    #[serde(default)]
    pub allow_document_reupload: bool,
}

impl ApprovalPolicy {
    /// Number of required approvals.
    #[must_use]
    pub fn role_count(&self) -> u8 {
        u8::try_from(self.roles.len()).unwrap_or(u8::MAX)
    }

    /// Returns the role expected at a 1-based approval step.
    #[must_use]
    pub fn expected_role(&self, step: u8) -> Option<RoleTag> {
        usize::from(step)
            .checked_sub(1)
            .and_then(|index| self.roles.get(index))
            .copied()
    }

    /// Returns the role the case is waiting on, if any.
    #[must_use]
    pub fn awaiting_role(&self, status: CaseStatus) -> Option<RoleTag> {
        status.pending_step().and_then(|step| self.expected_role(step))
    }

    /// Returns the status reached after approving the given step.
    #[must_use]
    pub fn status_after_approval(&self, step: u8) -> CaseStatus {
        if step < self.role_count() {
            CaseStatus::PendingApproval(step + 1)
        } else if self.requires_document {
            CaseStatus::AwaitingDocument
        } else {
            CaseStatus::Approved
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.roles.is_empty() {
            return Err(DomainError::InvalidPolicy {
                kind: self.kind,
                reason: String::from("role sequence is empty"),
            });
        }
        if self.roles.len() > usize::from(u8::MAX) {
            return Err(DomainError::InvalidPolicy {
                kind: self.kind,
                reason: String::from("role sequence is too long"),
            });
        }
        for (index, role) in self.roles.iter().enumerate() {
            if self.roles[..index].contains(role) {
                return Err(DomainError::InvalidPolicy {
                    kind: self.kind,
                    reason: format!("role '{role}' appears more than once"),
                });
            }
        }
        if self.code.trim().is_empty() {
            return Err(DomainError::InvalidPolicy {
                kind: self.kind,
                reason: String::from("code is empty"),
            });
        }
        Ok(())
    }
}

/// Immutable per-kind policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    organization: String,
    policies: BTreeMap<CaseKind, ApprovalPolicy>,
}

impl PolicyTable {
    /// Builds a table from explicit policies.
    ///
    /// # Errors
    ///
    /// Returns an error if a kind is missing or duplicated, or a policy is invalid.
    pub fn new(
        organization: impl Into<String>,
        policies: Vec<ApprovalPolicy>,
    ) -> Result<Self, DomainError> {
        let mut table: BTreeMap<CaseKind, ApprovalPolicy> = BTreeMap::new();
        for policy in policies {
            policy.validate()?;
            let kind: CaseKind = policy.kind;
            if table.insert(kind, policy).is_some() {
                return Err(DomainError::InvalidPolicy {
                    kind,
                    reason: String::from("defined more than once"),
                });
            }
        }
        for kind in CaseKind::ALL {
            if !table.contains_key(&kind) {
                return Err(DomainError::InvalidPolicy {
                    kind,
                    reason: String::from("no policy defined"),
                });
            }
        }
        Ok(Self {
            organization: organization.into(),
            policies: table,
        })
    }

    /// The registrar's standard policy table.
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in table is inconsistent.
    pub fn standard(organization: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(organization, standard_policies()?)
    }

    #[must_use]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Returns the policy for a kind.
    #[must_use]
    pub fn get(&self, kind: CaseKind) -> &ApprovalPolicy {
        // Construction guarantees every kind is present.
        &self.policies[&kind]
    }

    /// Renders an official case identifier.
    #[must_use]
    pub fn render_case_id(&self, kind: CaseKind, sequence: u32, period: &Period) -> String {
        let policy: &ApprovalPolicy = self.get(kind);
        policy
            .id_template
            .render(sequence, &self.organization, &policy.code, period)
    }

    /// Renders a decision document number.
    #[must_use]
    pub fn render_document_number(&self, kind: CaseKind, sequence: u32, period: &Period) -> String {
        let policy: &ApprovalPolicy = self.get(kind);
        policy
            .document_template
            .render(sequence, &self.organization, &policy.code, period)
    }

    /// Iterates the policies in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &ApprovalPolicy> {
        self.policies.values()
    }
}

fn standard_policies() -> Result<Vec<ApprovalPolicy>, DomainError> {
    let id_template: IdTemplate = IdTemplate::new(DEFAULT_ID_TEMPLATE)?;
    let document_template: IdTemplate = IdTemplate::new(DEFAULT_DOCUMENT_TEMPLATE)?;

    Ok(vec![
        ApprovalPolicy {
            kind: CaseKind::AcademicLeave,
            roles: vec![RoleTag::Prodi, RoleTag::Wadir1],
            requires_document: false,
            role_source: RoleSource::Supplied,
            code: String::from("CA"),
            id_template: id_template.clone(),
            document_template: document_template.clone(),
            required_fields: vec![String::from("reason"), String::from("semester_count")],
            required_attachments: vec![AttachmentSlot::SubmissionLetter],
            editable_while_pending: false,
            deletable_when_approved: false,
            allow_document_reupload: false,
        },
        ApprovalPolicy {
            kind: CaseKind::DropOut,
            roles: vec![RoleTag::Prodi, RoleTag::Wadir1, RoleTag::Direktur],
            requires_document: true,
            role_source: RoleSource::Resolved,
            code: String::from("DO"),
            id_template: id_template.clone(),
            document_template: document_template.clone(),
            required_fields: vec![String::from("reason")],
            required_attachments: Vec::new(),
            editable_while_pending: true,
            deletable_when_approved: false,
            allow_document_reupload: true,
        },
        ApprovalPolicy {
            kind: CaseKind::DeathOfStudent,
            roles: vec![RoleTag::Wadir1],
            requires_document: true,
            role_source: RoleSource::Resolved,
            code: String::from("MD"),
            id_template: id_template.clone(),
            document_template: document_template.clone(),
            required_fields: vec![String::from("date_of_death")],
            required_attachments: vec![AttachmentSlot::SupportingDocument],
            editable_while_pending: true,
            deletable_when_approved: true,
            allow_document_reupload: true,
        },
        ApprovalPolicy {
            kind: CaseKind::Resignation,
            roles: vec![RoleTag::Prodi, RoleTag::Wadir1],
            requires_document: true,
            role_source: RoleSource::Supplied,
            code: String::from("UD"),
            id_template,
            document_template,
            required_fields: vec![String::from("reason")],
            required_attachments: vec![AttachmentSlot::SubmissionLetter],
            editable_while_pending: false,
            deletable_when_approved: false,
            allow_document_reupload: true,
        },
    ])
}
