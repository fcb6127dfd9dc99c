// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Case queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use registrar_domain::{Case, CaseFilter, CaseKind, CaseStatus};

use crate::data_models::CaseRow;
use crate::diesel_schema::cases;
use crate::error::PersistenceError;

/// Retrieves the case currently holding `case_id`.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_case_by_id(
    conn: &mut SqliteConnection,
    kind: CaseKind,
    case_id: &str,
) -> Result<Option<Case>, PersistenceError> {
    cases::table
        .filter(cases::kind.eq(kind.as_str()))
        .filter(cases::case_id.eq(case_id))
        .select(CaseRow::as_select())
        .first::<CaseRow>(conn)
        .optional()?
        .map(CaseRow::into_case)
        .transpose()
}

/// Retrieves the case created under `draft_id`, whatever its current id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_case_by_draft_id(
    conn: &mut SqliteConnection,
    kind: CaseKind,
    draft_id: &str,
) -> Result<Option<Case>, PersistenceError> {
    cases::table
        .filter(cases::kind.eq(kind.as_str()))
        .filter(cases::draft_id.eq(draft_id))
        .select(CaseRow::as_select())
        .first::<CaseRow>(conn)
        .optional()?
        .map(CaseRow::into_case)
        .transpose()
}

/// Lists cases of a kind, pushing the status and student criteria into SQL.
///
/// Deleted cases are excluded unless the filter names the deleted status
/// or asks for them explicitly.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_cases(
    conn: &mut SqliteConnection,
    kind: CaseKind,
    filter: &CaseFilter,
) -> Result<Vec<Case>, PersistenceError> {
    let mut query = cases::table
        .filter(cases::kind.eq(kind.as_str()))
        .select(CaseRow::as_select())
        .order(cases::case_row_id.asc())
        .into_boxed();

    match filter.status {
        Some(status) => {
            query = query.filter(cases::status.eq(status.as_string()));
        }
        None if !filter.include_deleted => {
            query = query.filter(cases::status.ne(CaseStatus::Deleted.as_string()));
        }
        None => {}
    }

    if let Some(student_id) = filter
        .student_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        query = query.filter(cases::student_id.eq(student_id.to_string()));
    }

    let rows: Vec<CaseRow> = query.load::<CaseRow>(conn)?;
    rows.into_iter().map(CaseRow::into_case).collect()
}
