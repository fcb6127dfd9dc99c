// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Listing filters, sorting and paging.

use crate::case::{Case, OfficialSequence};
use crate::case_status::CaseStatus;
use crate::error::DomainError;
use crate::policy::ApprovalPolicy;
use crate::types::{CaseKind, RoleTag};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use time::OffsetDateTime;

/// Largest page size a history query may request.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Filter for listing cases of one kind.
///
/// `None` fields match everything. With no status, deleted cases are
/// excluded unless `include_deleted` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFilter {
    pub student_id: Option<String>,
    pub status: Option<CaseStatus>,
    /// Matches the creator or any approver on the trail.
    pub actor: Option<String>,
    /// Case-insensitive substring of the case id or student id.
    pub keyword: Option<String>,
    /// Matches cases whose next expected approver is this role.
    pub awaiting_role: Option<RoleTag>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl CaseFilter {
    #[must_use]
    pub fn with_status(status: CaseStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Returns true if the case satisfies the status and student criteria.
    ///
    /// These are the criteria a store is expected to push down; the rest
    /// need the kind's policy and are applied by [`CaseFilter::matches`].
    #[must_use]
    pub fn matches_stored(&self, case: &Case) -> bool {
        match self.status {
            Some(status) if case.status != status => return false,
            None if case.status == CaseStatus::Deleted && !self.include_deleted => return false,
            _ => {}
        }

        non_blank(self.student_id.as_deref())
            .is_none_or(|student_id| case.student_id == student_id)
    }

    /// Returns true if the case satisfies every populated criterion.
    #[must_use]
    pub fn matches(&self, case: &Case, policy: &ApprovalPolicy) -> bool {
        if !self.matches_stored(case) {
            return false;
        }

        if let Some(actor) = non_blank(self.actor.as_deref())
            && !case.involves(actor)
        {
            return false;
        }

        if let Some(keyword) = non_blank(self.keyword.as_deref()) {
            let needle: String = keyword.to_lowercase();
            let in_id: bool = case.id.value().to_lowercase().contains(&needle);
            let in_student: bool = case.student_id.to_lowercase().contains(&needle);
            if !in_id && !in_student {
                return false;
            }
        }

        if let Some(role) = self.awaiting_role
            && policy.awaiting_role(case.status) != Some(role)
        {
            return false;
        }

        true
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Sort order for history views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    DateAsc,
    #[default]
    DateDesc,
    IdAsc,
    IdDesc,
}

impl SortKey {
    /// Compares two summaries. Date ties are broken by id ascending.
    #[must_use]
    pub fn compare(&self, a: &CaseSummary, b: &CaseSummary) -> Ordering {
        match self {
            Self::DateAsc => a
                .created_at
                .cmp(&b.created_at)
                .then_with(|| id_order(a, b)),
            Self::DateDesc => b
                .created_at
                .cmp(&a.created_at)
                .then_with(|| id_order(a, b)),
            Self::IdAsc => id_order(a, b),
            Self::IdDesc => id_order(b, a),
        }
    }
}

/// Ascending id order.
///
/// Official ids order by period, then sequence, so `010/..` follows
/// `009/..` and December precedes the next January. Drafts come before
/// every official id and compare as text among themselves.
fn id_order(a: &CaseSummary, b: &CaseSummary) -> Ordering {
    match (a.official, b.official) {
        (Some(x), Some(y)) => x
            .period
            .cmp(&y.period)
            .then(x.sequence.cmp(&y.sequence))
            .then_with(|| a.id.cmp(&b.id)),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date_asc" => Ok(Self::DateAsc),
            "date_desc" => Ok(Self::DateDesc),
            "id_asc" => Ok(Self::IdAsc),
            "id_desc" => Ok(Self::IdDesc),
            _ => Err(DomainError::InvalidSortKey(s.to_string())),
        }
    }
}

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Creates a page request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPage` if `page` is zero or `size` is
    /// outside `1..=MAX_PAGE_SIZE`.
    pub const fn new(page: u32, size: u32) -> Result<Self, DomainError> {
        if page == 0 || size == 0 || size > MAX_PAGE_SIZE {
            return Err(DomainError::InvalidPage { page, size });
        }
        Ok(Self { page, size })
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Index of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.size as usize)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    /// Number of matches across all pages.
    pub total: usize,
}

/// Compact listing view of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub id: String,
    pub kind: CaseKind,
    pub student_id: String,
    pub status: CaseStatus,
    pub awaiting_role: Option<RoleTag>,
    pub document_number: Option<String>,
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub modified_at: OffsetDateTime,
    /// Where the official id was minted; orders ids, not listed.
    #[serde(skip)]
    pub official: Option<OfficialSequence>,
}

impl CaseSummary {
    #[must_use]
    pub fn from_case(case: &Case, policy: &ApprovalPolicy) -> Self {
        Self {
            id: case.id.value().to_string(),
            kind: case.kind,
            student_id: case.student_id.clone(),
            status: case.status,
            awaiting_role: policy.awaiting_role(case.status),
            document_number: case.document.as_ref().map(|doc| doc.number.clone()),
            created_by: case.created_by.clone(),
            created_at: case.created_at,
            modified_at: case.modified_at,
            official: case.official,
        }
    }
}
