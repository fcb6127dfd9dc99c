// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod error;

use crate::{AttachmentSlot, BlobRef, Case, CaseId, CaseKind};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::macros::datetime;

pub fn create_test_time() -> OffsetDateTime {
    datetime!(2026-09-14 09:00 UTC)
}

pub fn create_test_case(kind: CaseKind, id: &str, student_id: &str) -> Case {
    let mut details: BTreeMap<String, String> = BTreeMap::new();
    details.insert(String::from("reason"), String::from("Family matters"));

    let mut attachments: BTreeMap<AttachmentSlot, BlobRef> = BTreeMap::new();
    attachments.insert(
        AttachmentSlot::SubmissionLetter,
        BlobRef::new("letter-001.pdf"),
    );

    Case::new_draft(
        CaseId::draft(id),
        kind,
        String::from(student_id),
        details,
        attachments,
        String::from("staff-akademik"),
        create_test_time(),
    )
}
