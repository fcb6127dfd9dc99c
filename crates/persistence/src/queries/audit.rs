// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use registrar_audit::AuditEvent;
use registrar_domain::CaseKind;

use crate::data_models::AuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Retrieves the events whose before or after identifier is one of
/// `case_ids`, in insertion order.
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn get_audit_events(
    conn: &mut SqliteConnection,
    kind: CaseKind,
    case_ids: &[&str],
) -> Result<Vec<AuditEvent>, PersistenceError> {
    if case_ids.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = case_ids.iter().map(|id| (*id).to_string()).collect();
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::kind.eq(kind.as_str()))
        .filter(
            audit_events::before_case_id
                .eq_any(&ids)
                .or(audit_events::after_case_id.eq_any(&ids)),
        )
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load::<AuditEventRow>(conn)?;

    rows.into_iter().map(AuditEventRow::into_event).collect()
}
