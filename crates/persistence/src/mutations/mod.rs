// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation modules for persistence layer.
//!
//! This module contains all write operations for the persistence layer.
//!
//! ## Module Organization
//!
//! - `cases`: Case inserts and conditional replacement
//! - `claims`: Identifier registry claims
//! - `audit`: Audit event persistence

pub mod audit;
pub mod cases;
pub mod claims;

pub use audit::insert_audit_event;
pub use cases::{insert_case, replace_case_if_current};
pub use claims::claim_identifier;
