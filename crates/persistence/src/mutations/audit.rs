// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use registrar_audit::AuditEvent;

use crate::data_models::AuditEventRecord;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Persists an audit event and returns its row id.
///
/// # Errors
///
/// Returns an error if the event cannot be serialized or inserted.
pub fn insert_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let record: AuditEventRecord = AuditEventRecord::from_event(event)?;
    let event_id: i64 = diesel::insert_into(audit_events::table)
        .values(&record)
        .returning(audit_events::event_id)
        .get_result(conn)?;
    Ok(event_id)
}
