// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Case mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use registrar::CasePrecondition;
use registrar_domain::{Case, CaseKind};
use tracing::debug;

use crate::data_models::CaseRecord;
use crate::diesel_schema::cases;
use crate::error::PersistenceError;

/// Inserts a new case row.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the id (or draft id) is
/// already taken.
pub fn insert_case(conn: &mut SqliteConnection, case: &Case) -> Result<(), PersistenceError> {
    let record: CaseRecord = CaseRecord::from_case(case)?;
    diesel::insert_into(cases::table)
        .values(&record)
        .execute(conn)?;
    debug!(case_id = %case.id, kind = %case.kind, "Inserted case");
    Ok(())
}

/// Replaces the row holding `case_id` if its status and version still
/// match `expected`.
///
/// The whole row is rewritten, including the identifier, so finalization
/// moves the case to its official id in the same statement. Returns false
/// if no row matched or the new identifier collides with another case.
///
/// # Errors
///
/// Returns an error if the update fails for any other reason.
pub fn replace_case_if_current(
    conn: &mut SqliteConnection,
    kind: CaseKind,
    case_id: &str,
    expected: CasePrecondition,
    new_case: &Case,
) -> Result<bool, PersistenceError> {
    // No stored row can hold a version outside the column range.
    let Ok(expected_version) = i32::try_from(expected.version) else {
        return Ok(false);
    };
    let record: CaseRecord = CaseRecord::from_case(new_case)?;
    let result: Result<usize, PersistenceError> = diesel::update(
        cases::table
            .filter(cases::kind.eq(kind.as_str()))
            .filter(cases::case_id.eq(case_id))
            .filter(cases::status.eq(expected.status.as_string()))
            .filter(cases::version.eq(expected_version)),
    )
    .set(&record)
    .execute(conn)
    .map_err(PersistenceError::from);

    match result {
        Ok(affected) => Ok(affected == 1),
        Err(PersistenceError::UniqueViolation(msg)) => {
            debug!(case_id, new_id = %new_case.id, %msg, "Replacement collided");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
