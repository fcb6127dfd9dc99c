// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::{CoreError, StoreError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Caller-supplied deadline and cancellation for one request.
///
/// Every collaborator call receives the context and checks it before doing
/// any work, so a cancelled or expired request stops without further
/// writes. Clones share the cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl RequestContext {
    /// A context without deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context expiring after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A context expiring at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancels this context and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Time left before the deadline, if one is set.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fails if the request was cancelled or its deadline passed.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Cancelled` or `CoreError::DeadlineExceeded`.
    pub fn check(&self) -> Result<(), CoreError> {
        self.check_store().map_err(CoreError::from)
    }

    /// [`RequestContext::check`] for storage adapters.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Cancelled` or `StoreError::DeadlineExceeded`.
    pub fn check_store(&self) -> Result<(), StoreError> {
        if self.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        if self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            return Err(StoreError::DeadlineExceeded);
        }
        Ok(())
    }

    /// How long a storage call may block: the time left before the
    /// deadline, capped at `limit`.
    #[must_use]
    pub fn wait_budget(&self, limit: Duration) -> Duration {
        self.remaining().map_or(limit, |remaining| remaining.min(limit))
    }
}
