// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Detail-screen lifecycle hooks.
//!
//! The detail screen (the expanded destination content) is notified at
//! three points so it can coordinate its own state with the transition,
//! typically freezing highlight or scroll handling while geometry is in
//! flight. The core never calls it outside these hooks.

/// Lifecycle notifications delivered to the detail screen.
///
/// All methods have no-op defaults; implement only the hooks you need.
pub trait DetailLifecycle {
    /// The expansion animation is about to start driving geometry.
    fn did_start_presenting(&mut self) {}

    /// The expansion finished and the detail view sits in plain layout.
    fn did_finish_presenting(&mut self) {}

    /// The collapse animation is about to begin, before any geometry
    /// changes. A good moment to freeze internal highlight or content
    /// offset state.
    fn did_begin_dismissing(&mut self) {}
}

/// A [`DetailLifecycle`] that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLifecycle;

impl DetailLifecycle for NoopLifecycle {}
