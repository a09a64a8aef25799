// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for transitions.
//!
//! This module provides a [`TraceSink`] trait with per-event methods the
//! drivers call as a transition progresses. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use crate::time::HostTime;
use crate::timeline::BlockId;

/// Which scheduled piece of a transition an event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionPhase {
    /// The outer spring moving the floating container into place.
    Bounce,
    /// The inner linear block resizing the detail content.
    Resize,
    /// The linear block driving the scroll offset back during dismissal.
    ScrollReset,
    /// The backdrop opacity fade.
    BackdropFade,
}

/// Emitted when a driver starts a transition.
#[derive(Clone, Copy, Debug)]
pub struct TransitionBeginEvent {
    /// `true` for the expand, `false` for the collapse.
    pub presenting: bool,
    /// Host time when the driver was invoked.
    pub now: HostTime,
    /// Total transition duration in seconds.
    pub duration_secs: f64,
}

/// Emitted for each animation block a driver schedules.
#[derive(Clone, Copy, Debug)]
pub struct PhaseScheduledEvent {
    /// Which phase the block implements.
    pub phase: TransitionPhase,
    /// The timeline block backing the phase.
    pub block: BlockId,
    /// The phase duration in seconds.
    pub duration_secs: f64,
    /// The phase start offset in seconds.
    pub delay_secs: f64,
}

/// Emitted once per transition, when the outcome is reported to the host.
#[derive(Clone, Copy, Debug)]
pub struct TransitionEndEvent {
    /// `true` for the expand, `false` for the collapse.
    pub presenting: bool,
    /// `false` when the host cancelled the transition.
    pub success: bool,
}

/// Emitted for each transient animating view when
/// `is_enabled_debug_animating_views` is set.
#[derive(Clone, Copy, Debug)]
pub struct AnimatingViewEvent {
    /// Raw slot index of the view.
    pub view_index: u32,
    /// What the view is doing in the transition.
    pub label: &'static str,
}

/// Receives trace events from the transition drivers.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a driver starts a transition.
    fn on_transition_begin(&mut self, e: &TransitionBeginEvent) {
        _ = e;
    }

    /// Called for each scheduled animation block.
    fn on_phase_scheduled(&mut self, e: &PhaseScheduledEvent) {
        _ = e;
    }

    /// Called when the transition outcome is reported.
    fn on_transition_end(&mut self, e: &TransitionEndEvent) {
        _ = e;
    }

    /// Called per transient animating view when debug views are enabled.
    fn on_animating_view(&mut self, e: &AnimatingViewEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`TransitionBeginEvent`].
    #[inline]
    pub fn transition_begin(&mut self, e: &TransitionBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_transition_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseScheduledEvent`].
    #[inline]
    pub fn phase_scheduled(&mut self, e: &PhaseScheduledEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_scheduled(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TransitionEndEvent`].
    #[inline]
    pub fn transition_end(&mut self, e: &TransitionEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_transition_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AnimatingViewEvent`].
    #[inline]
    pub fn animating_view(&mut self, e: &AnimatingViewEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_animating_view(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}
