// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::SqliteCaseStore;
use registrar_domain::{
    ApprovalEntry, AttachmentSlot, BlobRef, Case, CaseId, CaseKind, CaseStatus, Decision,
    OfficialSequence, Period, RoleTag,
};
use std::collections::BTreeMap;
use time::macros::datetime;
use time::{Month, OffsetDateTime};

pub fn create_test_time() -> OffsetDateTime {
    datetime!(2026-09-14 09:00 UTC)
}

pub fn create_test_period() -> Period {
    Period::new(Month::September, 2026)
}

pub fn create_test_store() -> SqliteCaseStore {
    SqliteCaseStore::new_in_memory().expect("Failed to create in-memory store")
}

/// A draft case with one detail and one attachment.
pub fn create_draft_case(kind: CaseKind, draft_id: &str, student_id: &str) -> Case {
    let mut details: BTreeMap<String, String> = BTreeMap::new();
    details.insert(String::from("reason"), String::from("Medical treatment"));
    let mut attachments: BTreeMap<AttachmentSlot, BlobRef> = BTreeMap::new();
    attachments.insert(
        AttachmentSlot::SubmissionLetter,
        BlobRef::new("1789000000000_0000abcd_letter.pdf"),
    );

    Case::new_draft(
        CaseId::draft(draft_id),
        kind,
        String::from(student_id),
        details,
        attachments,
        String::from("staff-akademik"),
        create_test_time(),
    )
}

/// Returns `case` moved to an official id with sequence `sequence`.
pub fn finalized(mut case: Case, sequence: u32, code: &str) -> Case {
    let period: Period = create_test_period();
    case.id = CaseId::official(format!("{sequence:03}/PMA/{code}/{}", period.key()));
    case.official = Some(OfficialSequence { sequence, period });
    case.status = CaseStatus::PendingApproval(1);
    case.version += 1;
    case
}

/// Returns `case` with a first-step approval recorded.
pub fn approved_once(mut case: Case) -> Case {
    case.approval_trail.push(ApprovalEntry {
        role: RoleTag::Prodi,
        approver: String::from("kaprodi.ti"),
        at: create_test_time(),
        decision: Decision::Approved,
    });
    case.status = CaseStatus::PendingApproval(2);
    case.modified_by = String::from("kaprodi.ti");
    case.version += 1;
    case
}
