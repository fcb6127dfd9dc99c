// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Case lifecycle and approval workflow.
//!
//! [`WorkflowEngine`] drives cases from draft through finalization,
//! sequential approvals and decision document issuance. [`QueryService`]
//! answers read-only listings. Both talk to storage only through the
//! traits in [`ports`].

mod allocator;
mod apply;
mod command;
mod config;
mod context;
mod engine;
mod error;
mod identity;
pub mod memory;
pub mod ports;
mod query;

#[cfg(test)]
mod tests;

pub use allocator::{Allocated, IdentifierAllocator, MAX_ALLOCATION_ATTEMPTS};
pub use apply::{TransitionResult, UploadPlan, apply, apply_create};
pub use command::{AttachmentUpload, DraftPayload, Transition, UpdatePayload};
pub use config::{ConfigError, RegistrarConfig};
pub use context::RequestContext;
pub use engine::{UploadOutcome, WorkflowEngine};
pub use error::{CoreError, StoreError};
pub use identity::{RoleRule, RuleBasedResolver, UsernameMatcher};
pub use ports::{
    BlobStore, CasePrecondition, CaseStore, Clock, FixedClock, IdClaim, IdentityResolver,
    SystemClock,
};
pub use query::QueryService;
