// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identifier registry mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use registrar::IdClaim;
use registrar_domain::{CaseKind, IdSeries};

use crate::data_models::IdClaimRecord;
use crate::diesel_schema::id_claims;
use crate::error::PersistenceError;

/// Claims an identifier. Returns false if another writer already holds it.
///
/// The `UNIQUE (kind, series, value)` constraint makes the claim atomic
/// across connections and processes.
///
/// # Errors
///
/// Returns an error if the insert fails for a reason other than the
/// uniqueness constraint.
pub fn claim_identifier(
    conn: &mut SqliteConnection,
    kind: CaseKind,
    series: IdSeries,
    claim: &IdClaim,
) -> Result<bool, PersistenceError> {
    let record: IdClaimRecord = IdClaimRecord::new(kind, series, claim)?;
    match diesel::insert_into(id_claims::table)
        .values(&record)
        .execute(conn)
        .map_err(PersistenceError::from)
    {
        Ok(_) => Ok(true),
        Err(PersistenceError::UniqueViolation(_)) => Ok(false),
        Err(e) => Err(e),
    }
}
