// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic clocks and lifecycle doubles for cardlift tests and demos.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use cardlift_core::detail::DetailLifecycle;
use cardlift_core::time::{Duration, HostTime, Timebase};
use cardlift_core::timeline::Timeline;
use cardlift_core::view::ViewStore;

/// A fixed-step host clock.
///
/// Produces monotonically increasing [`HostTime`] values at a constant
/// frame interval, so transition tests are reproducible tick for tick.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    now: HostTime,
    step: Duration,
}

impl FrameClock {
    /// A clock starting at host time zero, stepping at `fps` frames per
    /// second against `timebase`.
    #[must_use]
    pub fn new(fps: f64, timebase: Timebase) -> Self {
        Self {
            now: HostTime(0),
            step: Duration::from_secs_f64(1.0 / fps, timebase),
        }
    }

    /// The current host time without advancing.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.now
    }

    /// The frame interval.
    #[must_use]
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Advances one frame and returns the new host time.
    pub fn advance(&mut self) -> HostTime {
        self.now = self.now + self.step;
        self.now
    }
}

/// A lifecycle event recorded by [`RecordingDetail`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// `did_start_presenting` fired.
    StartPresenting,
    /// `did_finish_presenting` fired.
    FinishPresenting,
    /// `did_begin_dismissing` fired.
    BeginDismissing,
}

/// A [`DetailLifecycle`] double that records the order hooks fire in.
#[derive(Debug, Default)]
pub struct RecordingDetail {
    events: Vec<LifecycleEvent>,
}

impl RecordingDetail {
    /// An empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The events recorded so far, in firing order.
    #[must_use]
    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }
}

impl DetailLifecycle for RecordingDetail {
    fn did_start_presenting(&mut self) {
        self.events.push(LifecycleEvent::StartPresenting);
    }

    fn did_finish_presenting(&mut self) {
        self.events.push(LifecycleEvent::FinishPresenting);
    }

    fn did_begin_dismissing(&mut self) {
        self.events.push(LifecycleEvent::BeginDismissing);
    }
}

/// Ticks `timeline` frame by frame until it goes idle or `max_frames`
/// elapse. Returns the number of frames ticked, or `None` if the timeline
/// never settled.
pub fn drive_to_idle(
    timeline: &mut Timeline,
    store: &mut ViewStore,
    hooks: &mut dyn DetailLifecycle,
    clock: &mut FrameClock,
    max_frames: u32,
) -> Option<u32> {
    for frame in 0..max_frames {
        if timeline.is_idle() {
            return Some(frame);
        }
        timeline.tick(clock.advance(), store, hooks);
    }
    timeline.is_idle().then_some(max_frames)
}
