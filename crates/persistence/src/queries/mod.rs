// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `cases`: Case lookups and filtered listing
//! - `claims`: Identifier registry lookups
//! - `audit`: Audit event queries

pub mod audit;
pub mod cases;
pub mod claims;

pub use audit::get_audit_events;
pub use cases::{find_case_by_draft_id, find_case_by_id, list_cases};
pub use claims::{id_is_claimed, max_claimed_sequence};
