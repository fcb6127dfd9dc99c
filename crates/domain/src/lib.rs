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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod case;
mod case_status;
mod error;
mod filter;
mod period;
mod policy;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use case::{ApprovalEntry, Case, Decision, DocumentRecord, OfficialSequence};
pub use case_status::CaseStatus;
pub use error::DomainError;
pub use filter::{CaseFilter, CaseSummary, MAX_PAGE_SIZE, Page, PageRequest, SortKey};
pub use period::Period;
pub use policy::{
    ApprovalPolicy, DEFAULT_DOCUMENT_TEMPLATE, DEFAULT_ID_TEMPLATE, DEFAULT_ORGANIZATION,
    IdTemplate, PolicyTable, RoleSource,
};
pub use types::{AttachmentSlot, BlobRef, CaseId, CaseKind, IdKind, IdSeries, RoleTag};
pub use validation::{
    validate_reason, validate_required_attachments, validate_required_fields,
    validate_student_id,
};
