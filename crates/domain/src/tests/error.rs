// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AttachmentSlot, CaseKind, DomainError};

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::InvalidCaseKind(String::from("sabbatical"));
    assert_eq!(format!("{err}"), "Invalid case kind: sabbatical");

    let err: DomainError = DomainError::InvalidStatusTransition {
        from: String::from("approved"),
        to: String::from("draft"),
    };
    assert_eq!(
        format!("{err}"),
        "Invalid status transition from approved to draft"
    );

    let err: DomainError = DomainError::InvalidPolicy {
        kind: CaseKind::DropOut,
        reason: String::from("role sequence is empty"),
    };
    assert_eq!(
        format!("{err}"),
        "Invalid approval policy for drop_out: role sequence is empty"
    );

    let err: DomainError = DomainError::InvalidTemplate(String::from("{org}/{year}"));
    assert_eq!(
        format!("{err}"),
        "Identifier template '{org}/{year}' must contain {seq}"
    );

    let err: DomainError = DomainError::MissingAttachment {
        slot: AttachmentSlot::SupportingDocument,
    };
    assert_eq!(
        format!("{err}"),
        "Required attachment 'supporting-document' is missing"
    );
}

#[test]
fn test_domain_error_field_names() {
    let err: DomainError = DomainError::MissingField {
        field: String::from("date_of_death"),
    };
    assert_eq!(err.field(), "date_of_death");

    let err: DomainError = DomainError::MissingAttachment {
        slot: AttachmentSlot::SubmissionLetter,
    };
    assert_eq!(err.field(), "submission-letter");

    let err: DomainError = DomainError::InvalidStudentId(String::from("  "));
    assert_eq!(err.field(), "student_id");
}
