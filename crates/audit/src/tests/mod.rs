// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used)]

use crate::{Action, ActionKind, Actor, AuditEvent, StatusSnapshot};
use registrar_domain::{CaseKind, CaseStatus, RoleTag};
use time::macros::datetime;

fn create_finalize_event() -> AuditEvent {
    AuditEvent::new(
        CaseKind::AcademicLeave,
        Actor::new(String::from("staff-akademik")),
        Action::new(ActionKind::Finalize, None),
        StatusSnapshot::new(String::from("1760860800123"), Some(CaseStatus::Draft)),
        StatusSnapshot::new(
            String::from("001/PMA/CA/X/2026"),
            Some(CaseStatus::PendingApproval(1)),
        ),
        datetime!(2026-10-19 08:00 UTC),
    )
}

#[test]
fn test_actor_with_role() {
    let actor: Actor = Actor::with_role(String::from("wadir1"), RoleTag::Wadir1);

    assert_eq!(actor.username, "wadir1");
    assert_eq!(actor.role, Some(RoleTag::Wadir1));
    assert_eq!(Actor::new(String::from("staff")).role, None);
}

#[test]
fn test_event_concerns_both_identifiers() {
    let event: AuditEvent = create_finalize_event();

    assert!(event.concerns("1760860800123"));
    assert!(event.concerns("001/PMA/CA/X/2026"));
    assert!(!event.concerns("002/PMA/CA/X/2026"));
}

#[test]
fn test_creation_snapshot_has_no_prior_status() {
    let before: StatusSnapshot = StatusSnapshot::new(String::from("1760860800123"), None);
    assert_eq!(before.status, None);
}

#[test]
fn test_action_names() {
    assert_eq!(ActionKind::UploadDocument.as_str(), "upload_document");
    assert_eq!(ActionKind::SoftDelete.to_string(), "soft_delete");
}

#[test]
fn test_audit_event_serialization_round_trip() {
    let event: AuditEvent = create_finalize_event();

    let json: String = serde_json::to_string(&event).unwrap();
    let parsed: AuditEvent = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, event);
}
