// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identifier registry queries.

use diesel::SqliteConnection;
use diesel::dsl::{exists, max};
use diesel::prelude::*;
use registrar_domain::{CaseKind, IdSeries, Period};

use crate::diesel_schema::id_claims;
use crate::error::PersistenceError;

/// Returns true if `value` was ever claimed in the kind's series.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn id_is_claimed(
    conn: &mut SqliteConnection,
    kind: CaseKind,
    series: IdSeries,
    value: &str,
) -> Result<bool, PersistenceError> {
    let claimed: bool = diesel::select(exists(
        id_claims::table
            .filter(id_claims::kind.eq(kind.as_str()))
            .filter(id_claims::series.eq(series.as_str()))
            .filter(id_claims::value.eq(value)),
    ))
    .get_result(conn)?;
    Ok(claimed)
}

/// Returns the highest sequence claimed in the period, or 0 if none.
///
/// # Errors
///
/// Returns an error if the query fails or the stored maximum is negative.
pub fn max_claimed_sequence(
    conn: &mut SqliteConnection,
    kind: CaseKind,
    series: IdSeries,
    period: &Period,
) -> Result<u32, PersistenceError> {
    let highest: Option<i32> = id_claims::table
        .filter(id_claims::kind.eq(kind.as_str()))
        .filter(id_claims::series.eq(series.as_str()))
        .filter(id_claims::period_key.eq(period.key()))
        .select(max(id_claims::sequence))
        .first::<Option<i32>>(conn)?;

    highest.map_or(Ok(0), |value| {
        u32::try_from(value)
            .map_err(|_| PersistenceError::CorruptRecord(format!("negative sequence {value}")))
    })
}
