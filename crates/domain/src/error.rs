// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{AttachmentSlot, CaseKind};

/// Errors that can occur during domain parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Unknown case kind string.
    InvalidCaseKind(String),
    /// Unknown role tag string.
    InvalidRole(String),
    /// Unknown attachment slot name.
    InvalidAttachmentSlot(String),
    /// Unknown identifier form.
    InvalidIdKind(String),
    /// Unknown case status string.
    InvalidCaseStatus {
        /// The invalid status value.
        status: String,
    },
    /// A status transition is not permitted.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
    /// Period key could not be parsed.
    InvalidPeriod(String),
    /// Identifier template lacks a `{seq}` placeholder.
    InvalidTemplate(String),
    /// Approval policy is inconsistent.
    InvalidPolicy {
        /// The kind whose policy is invalid.
        kind: CaseKind,
        /// Why the policy was rejected.
        reason: String,
    },
    /// Unknown sort key.
    InvalidSortKey(String),
    /// Page number or size out of range.
    InvalidPage {
        /// The requested page.
        page: u32,
        /// The requested size.
        size: u32,
    },
    /// Student reference is empty.
    InvalidStudentId(String),
    /// A required detail field is missing or blank.
    MissingField {
        /// The field name.
        field: String,
    },
    /// A required attachment slot is empty.
    MissingAttachment {
        /// The slot.
        slot: AttachmentSlot,
    },
}

impl DomainError {
    /// The name of the offending input, for validation reporting.
    #[must_use]
    pub fn field(&self) -> String {
        match self {
            Self::InvalidCaseKind(_) => String::from("kind"),
            Self::InvalidRole(_) => String::from("role"),
            Self::InvalidAttachmentSlot(_) => String::from("slot"),
            Self::InvalidIdKind(_) => String::from("id_kind"),
            Self::InvalidCaseStatus { .. } | Self::InvalidStatusTransition { .. } => {
                String::from("status")
            }
            Self::InvalidPeriod(_) => String::from("period"),
            Self::InvalidTemplate(_) => String::from("template"),
            Self::InvalidPolicy { .. } => String::from("policy"),
            Self::InvalidSortKey(_) => String::from("sort"),
            Self::InvalidPage { .. } => String::from("page"),
            Self::InvalidStudentId(_) => String::from("student_id"),
            Self::MissingField { field } => field.clone(),
            Self::MissingAttachment { slot } => slot.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCaseKind(value) => write!(f, "Invalid case kind: {value}"),
            Self::InvalidRole(value) => write!(f, "Invalid role: {value}"),
            Self::InvalidAttachmentSlot(value) => write!(f, "Invalid attachment slot: {value}"),
            Self::InvalidIdKind(value) => write!(f, "Invalid identifier kind: {value}"),
            Self::InvalidCaseStatus { status } => write!(f, "Invalid case status: {status}"),
            Self::InvalidStatusTransition { from, to } => {
                write!(f, "Invalid status transition from {from} to {to}")
            }
            Self::InvalidPeriod(value) => write!(f, "Invalid period key: {value}"),
            Self::InvalidTemplate(value) => {
                write!(f, "Identifier template '{value}' must contain {{seq}}")
            }
            Self::InvalidPolicy { kind, reason } => {
                write!(f, "Invalid approval policy for {kind}: {reason}")
            }
            Self::InvalidSortKey(value) => write!(f, "Invalid sort key: {value}"),
            Self::InvalidPage { page, size } => {
                write!(
                    f,
                    "Invalid page request: page {page}, size {size}. Page must be at least 1 and size between 1 and {}",
                    crate::filter::MAX_PAGE_SIZE
                )
            }
            Self::InvalidStudentId(value) => write!(f, "Invalid student id: '{value}'"),
            Self::MissingField { field } => write!(f, "Required field '{field}' is missing"),
            Self::MissingAttachment { slot } => {
                write!(f, "Required attachment '{slot}' is missing")
            }
        }
    }
}

impl std::error::Error for DomainError {}
