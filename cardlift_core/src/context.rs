// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host-supplied transition context.
//!
//! The host hands one [`TransitionContext`] per transition to the
//! coordinator: the screen container, the source and destination view
//! handles, a shared cancellation flag, and a completion callback that must
//! fire exactly once. The driver inspects the cancellation flag a single
//! time, at completion, to pick the success or rollback cleanup path -- it
//! never polls mid-flight.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;

use crate::view::ViewId;

/// Shared flag the host may set at any point to mark the in-flight
/// transition cancelled.
///
/// Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the transition cancelled.
    pub fn cancel(&self) {
        self.0.set(true);
    }

    /// Whether the transition was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Where a driver is in its single run.
///
/// Exactly one variant holds at any time. Once a driver leaves
/// [`Running`](Self::Running) it never changes again; drivers are not
/// reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// The driver's animation blocks are scheduled or in flight.
    Running,
    /// The transition finished and reported success.
    Completed,
    /// The transition finished and reported failure (host cancellation or
    /// unresolved handles).
    Cancelled,
}

/// Everything a driver needs from the host for one transition.
pub struct TransitionContext {
    /// The screen-level container both the card grid and the detail view
    /// live under.
    pub container: ViewId,
    /// The cancellation flag, shared with the host.
    pub cancelled: CancellationToken,
    completion: Option<Box<dyn FnOnce(bool)>>,
    completed: bool,
}

impl TransitionContext {
    /// Creates a context whose `completion` runs exactly once with the
    /// transition's success flag.
    pub fn new(
        container: ViewId,
        cancelled: CancellationToken,
        completion: impl FnOnce(bool) + 'static,
    ) -> Self {
        Self {
            container,
            cancelled,
            completion: Some(Box::new(completion)),
            completed: false,
        }
    }

    /// Reports the transition outcome to the host.
    ///
    /// The first call runs the completion callback; later calls are no-ops
    /// (and debug-panic, since a double report is a driver bug).
    pub fn complete(&mut self, success: bool) {
        debug_assert!(!self.completed, "transition completed twice");
        self.completed = true;
        if let Some(completion) = self.completion.take() {
            completion(success);
        }
    }

    /// Whether the outcome has already been reported.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl fmt::Debug for TransitionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionContext")
            .field("container", &self.container)
            .field("cancelled", &self.cancelled)
            .field("completed", &self.completed)
            .finish()
    }
}
