// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::policy::ApprovalPolicy;
use crate::types::AttachmentSlot;
use std::collections::BTreeMap;

/// Validates a student reference.
///
/// # Errors
///
/// Returns `DomainError::InvalidStudentId` if the reference is blank.
pub fn validate_student_id(student_id: &str) -> Result<(), DomainError> {
    if student_id.trim().is_empty() {
        return Err(DomainError::InvalidStudentId(student_id.to_string()));
    }
    Ok(())
}

/// Validates that every detail field the policy requires is non-blank.
///
/// # Errors
///
/// Returns `DomainError::MissingField` naming the first missing field.
pub fn validate_required_fields(
    policy: &ApprovalPolicy,
    details: &BTreeMap<String, String>,
) -> Result<(), DomainError> {
    for field in &policy.required_fields {
        let present: bool = details
            .get(field)
            .is_some_and(|value| !value.trim().is_empty());
        if !present {
            return Err(DomainError::MissingField {
                field: field.clone(),
            });
        }
    }
    Ok(())
}

/// Validates that every attachment slot the policy requires is filled.
///
/// # Errors
///
/// Returns `DomainError::MissingAttachment` naming the first empty slot.
pub fn validate_required_attachments<'a, I>(
    policy: &ApprovalPolicy,
    filled: I,
) -> Result<(), DomainError>
where
    I: IntoIterator<Item = &'a AttachmentSlot> + Clone,
{
    for slot in &policy.required_attachments {
        if !filled.clone().into_iter().any(|filled_slot| filled_slot == slot) {
            return Err(DomainError::MissingAttachment { slot: *slot });
        }
    }
    Ok(())
}

/// Validates a rejection reason.
///
/// # Errors
///
/// Returns `DomainError::MissingField` if the reason is blank.
pub fn validate_reason(reason: &str) -> Result<(), DomainError> {
    if reason.trim().is_empty() {
        return Err(DomainError::MissingField {
            field: String::from("reason"),
        });
    }
    Ok(())
}
