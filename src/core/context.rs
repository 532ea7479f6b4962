//! core::context
//!
//! Cancellable invocation context threaded through every I/O call.
//!
//! # Semantics
//!
//! A [`Context`] carries a cancellation token and an optional deadline.
//! Bucket reads, writes and every step of a walk call [`Context::check`]
//! first, so cancelling the token (or passing the deadline) aborts the
//! in-flight operation with a [`ContextError`]. Context errors are never
//! folded into domain errors; every error enum in this crate carries a
//! dedicated `Canceled` variant for them.
//!
//! # Example
//!
//! ```
//! use protomod::core::context::{Context, ContextError};
//!
//! let ctx = Context::background();
//! assert!(ctx.check().is_ok());
//!
//! ctx.cancel();
//! assert_eq!(ctx.check(), Err(ContextError::Canceled));
//! ```

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors raised when an invocation context is no longer live.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Invocation context for synchronous operations.
///
/// Cloning a context shares its cancellation state.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never canceled unless [`Context::cancel`] is called.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that expires `timeout` from now.
    ///
    /// The derived context is canceled when the parent is canceled, and
    /// keeps the earlier of the two deadlines. A timeout too large to
    /// represent as an `Instant` adds no deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Derive a context that expires at `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Derive a child context that can be canceled independently.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Check whether the context is still live.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Canceled` after cancellation and
    /// `ContextError::DeadlineExceeded` once the deadline has passed.
    pub fn check(&self) -> Result<(), ContextError> {
        if self.token.is_cancelled() {
            return Err(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ContextError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
