// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property animation timeline.
//!
//! Animations are scheduled as *blocks*: a caller hands
//! [`Timeline::animate`] a closure that mutates the view store, and the
//! timeline captures which presentation values changed, turning each change
//! into an interpolation track. Model values keep the closure's final
//! state immediately; presentation values are rewound to their pre-block
//! state and then driven toward the model over the block's duration.
//!
//! Each [`Timeline::tick`] advances every active block and writes
//! interpolated presentation values back into the store. Spring-curved
//! blocks may overshoot their target before settling; tracks interpolate
//! unclamped so the overshoot is visible. When a block's duration elapses,
//! its final values are written exactly and its completion callback runs
//! with `finished = true`. Callbacks observe blocks completing in the order
//! they were scheduled.
//!
//! There is no nesting: a phase that should start mid-flight of another is
//! scheduled as a sibling block with a delay.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect};

use crate::detail::DetailLifecycle;
use crate::spring::SpringTiming;
use crate::time::{Duration, HostTime, Timebase};
use crate::view::ViewStore;

/// Identifies a scheduled animation block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(pub u64);

/// The pacing curve of an animation block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Curve {
    /// Constant-rate progress from 0 to 1.
    Linear,
    /// Damped-spring progress; may overshoot 1 before settling.
    Spring(SpringTiming),
}

impl Curve {
    /// Returns the unit progress at `elapsed` seconds into a block of
    /// `duration` seconds.
    ///
    /// Clamped to `[0, 1]` for [`Linear`](Curve::Linear); spring curves may
    /// exceed 1 mid-flight but always return exactly 1 at or past the
    /// duration.
    #[must_use]
    pub fn value(&self, elapsed: f64, duration: f64) -> f64 {
        match self {
            Self::Linear => {
                if duration <= 0.0 || elapsed >= duration {
                    1.0
                } else if elapsed <= 0.0 {
                    0.0
                } else {
                    elapsed / duration
                }
            }
            Self::Spring(timing) => timing.progress(elapsed, duration),
        }
    }
}

/// Scheduling parameters for one animation block.
#[derive(Clone, Copy, Debug)]
pub struct BlockParams {
    /// Pacing curve.
    pub curve: Curve,
    /// How long the block runs after its delay.
    pub duration: Duration,
    /// How long after scheduling the block starts.
    pub delay: Duration,
}

impl BlockParams {
    /// A block with the given curve and no delay.
    #[must_use]
    pub const fn new(curve: Curve, duration: Duration) -> Self {
        Self {
            curve,
            duration,
            delay: Duration::ZERO,
        }
    }

    /// A linear block with no delay.
    #[must_use]
    pub const fn linear(duration: Duration) -> Self {
        Self::new(Curve::Linear, duration)
    }

    /// Returns a copy with the given delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Runs when a block finishes or is cancelled. The flag is `true` when the
/// block ran to its full duration.
pub type Completion = Box<dyn FnOnce(&mut ViewStore, &mut dyn DetailLifecycle, bool)>;

/// One animated property on one view slot.
#[derive(Clone, Copy, Debug)]
enum Track {
    Frame { slot: u32, from: Rect, to: Rect },
    Transform { slot: u32, from: Affine, to: Affine },
    CornerRadius { slot: u32, from: f64, to: f64 },
    Opacity { slot: u32, from: f64, to: f64 },
    ScrollOffset { slot: u32, from: Point, to: Point },
}

struct Block {
    id: BlockId,
    curve: Curve,
    duration: Duration,
    delay: Duration,
    /// When the block was scheduled; shifted forward on resume so elapsed
    /// time excludes paused spans.
    scheduled_at: HostTime,
    paused_at: Option<HostTime>,
    tracks: Vec<Track>,
    completion: Option<Completion>,
}

impl Block {
    /// Elapsed animation time past the delay, or `None` while the delay has
    /// not yet expired.
    fn active_elapsed(&self, now: HostTime) -> Option<Duration> {
        let reference = self.paused_at.unwrap_or(now);
        let since_schedule = reference.saturating_duration_since(self.scheduled_at);
        if since_schedule < self.delay {
            None
        } else {
            Some(since_schedule.saturating_sub(self.delay))
        }
    }
}

impl core::fmt::Debug for Block {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Block")
            .field("id", &self.id)
            .field("curve", &self.curve)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("scheduled_at", &self.scheduled_at)
            .field("paused_at", &self.paused_at)
            .field("tracks", &self.tracks.len())
            .field("has_completion", &self.completion.is_some())
            .finish()
    }
}

/// Snapshot of the store's presentation arrays, used to diff a mutation
/// closure's effect.
struct PresentationBaseline {
    frame: Vec<Rect>,
    transform: Vec<Affine>,
    corner_radius: Vec<f64>,
    opacity: Vec<f64>,
    scroll_offset: Vec<Point>,
}

impl PresentationBaseline {
    fn capture(store: &ViewStore) -> Self {
        Self {
            frame: store.pres_frame.clone(),
            transform: store.pres_transform.clone(),
            corner_radius: store.pres_corner_radius.clone(),
            opacity: store.pres_opacity.clone(),
            scroll_offset: store.pres_scroll_offset.clone(),
        }
    }
}

/// Schedules and advances animation blocks against a [`ViewStore`].
#[derive(Debug)]
pub struct Timeline {
    timebase: Timebase,
    blocks: Vec<Block>,
    next_id: u64,
}

impl Timeline {
    /// Creates an empty timeline that converts host time with `timebase`.
    #[must_use]
    pub fn new(timebase: Timebase) -> Self {
        Self {
            timebase,
            blocks: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedules an animation block.
    ///
    /// `mutate` runs immediately against the store; every presentation value
    /// it changes becomes an interpolation track from the pre-block value to
    /// the new model value. Presentation values are rewound so the change
    /// plays out over `params.duration` starting at `now + params.delay`.
    ///
    /// Views created inside `mutate` appear at their final state immediately
    /// rather than animating.
    pub fn animate(
        &mut self,
        store: &mut ViewStore,
        now: HostTime,
        params: BlockParams,
        mutate: impl FnOnce(&mut ViewStore),
    ) -> BlockId {
        self.animate_with_completion(store, now, params, mutate, None)
    }

    /// Like [`animate`](Self::animate), with a completion callback that runs
    /// when the block finishes or is cancelled.
    pub fn animate_with_completion(
        &mut self,
        store: &mut ViewStore,
        now: HostTime,
        params: BlockParams,
        mutate: impl FnOnce(&mut ViewStore),
        completion: Option<Completion>,
    ) -> BlockId {
        let baseline = PresentationBaseline::capture(store);
        mutate(store);

        let tracks = Self::diff_and_rewind(store, &baseline);

        let id = BlockId(self.next_id);
        self.next_id += 1;
        self.blocks.push(Block {
            id,
            curve: params.curve,
            duration: params.duration,
            delay: params.delay,
            scheduled_at: now,
            paused_at: None,
            tracks,
            completion,
        });
        id
    }

    /// Builds tracks for every presentation value the mutation closure
    /// changed, then rewinds those values to their pre-block state.
    fn diff_and_rewind(store: &mut ViewStore, baseline: &PresentationBaseline) -> Vec<Track> {
        let mut tracks = Vec::new();
        // Slots past the baseline length were created inside the closure and
        // do not animate.
        let prior_len = baseline.frame.len();
        for slot in 0..prior_len {
            let idx = slot as u32;
            if !store.slot_alive(idx) {
                continue;
            }

            let from = baseline.frame[slot];
            let to = store.pres_frame[slot];
            if from != to {
                tracks.push(Track::Frame { slot: idx, from, to });
                store.write_pres_frame(idx, from);
            }

            let from = baseline.transform[slot];
            let to = store.pres_transform[slot];
            if from != to {
                tracks.push(Track::Transform { slot: idx, from, to });
                store.write_pres_transform(idx, from);
            }

            let from = baseline.corner_radius[slot];
            let to = store.pres_corner_radius[slot];
            if from != to {
                tracks.push(Track::CornerRadius { slot: idx, from, to });
                store.write_pres_corner_radius(idx, from);
            }

            let from = baseline.opacity[slot];
            let to = store.pres_opacity[slot];
            if from != to {
                tracks.push(Track::Opacity { slot: idx, from, to });
                store.write_pres_opacity(idx, from);
            }

            let from = baseline.scroll_offset[slot];
            let to = store.pres_scroll_offset[slot];
            if from != to {
                tracks.push(Track::ScrollOffset { slot: idx, from, to });
                store.write_pres_scroll_offset(idx, from);
            }
        }
        tracks
    }

    /// Advances all blocks to `now`, writing interpolated presentation
    /// values into the store and running the completion of every block
    /// whose duration has elapsed.
    pub fn tick(&mut self, now: HostTime, store: &mut ViewStore, hooks: &mut dyn DetailLifecycle) {
        let mut finished = Vec::new();

        for block in &mut self.blocks {
            let Some(elapsed) = block.active_elapsed(now) else {
                continue;
            };
            let elapsed_secs = elapsed.to_secs_f64(self.timebase);
            let duration_secs = block.duration.to_secs_f64(self.timebase);

            let done = block.paused_at.is_none() && elapsed >= block.duration;
            let progress = if done {
                1.0
            } else {
                block.curve.value(elapsed_secs, duration_secs)
            };

            for track in &block.tracks {
                apply_track(store, track, progress);
            }

            if done {
                finished.push(block.id);
            }
        }

        // Completions run in schedule order.
        for id in finished {
            if let Some(pos) = self.blocks.iter().position(|b| b.id == id) {
                let block = self.blocks.remove(pos);
                if let Some(completion) = block.completion {
                    completion(store, hooks, true);
                }
            }
        }
    }

    /// Removes a block without letting it finish. Presentation values stay
    /// wherever the last tick left them; the completion runs with
    /// `finished = false`.
    pub fn cancel(
        &mut self,
        id: BlockId,
        store: &mut ViewStore,
        hooks: &mut dyn DetailLifecycle,
    ) {
        if let Some(pos) = self.blocks.iter().position(|b| b.id == id) {
            let block = self.blocks.remove(pos);
            if let Some(completion) = block.completion {
                completion(store, hooks, false);
            }
        }
    }

    /// Freezes a block's clock. Ticks while paused keep presentation values
    /// at the pause position.
    pub fn pause(&mut self, id: BlockId, now: HostTime) {
        if let Some(block) = self.blocks.iter_mut().find(|b| b.id == id)
            && block.paused_at.is_none()
        {
            block.paused_at = Some(now);
        }
    }

    /// Resumes a paused block. The paused span does not count toward the
    /// block's elapsed time.
    pub fn resume(&mut self, id: BlockId, now: HostTime) {
        if let Some(block) = self.blocks.iter_mut().find(|b| b.id == id)
            && let Some(paused_at) = block.paused_at.take()
        {
            let paused_for = now.saturating_duration_since(paused_at);
            block.scheduled_at = block.scheduled_at + paused_for;
        }
    }

    /// Returns the fraction of a block's duration that has elapsed, in
    /// `[0, 1]`, or `None` if the block is not active.
    #[must_use]
    pub fn fraction_complete(&self, id: BlockId, now: HostTime) -> Option<f64> {
        let block = self.blocks.iter().find(|b| b.id == id)?;
        let Some(elapsed) = block.active_elapsed(now) else {
            return Some(0.0);
        };
        if block.duration == Duration::ZERO {
            return Some(1.0);
        }
        let fraction = elapsed.to_secs_f64(self.timebase) / block.duration.to_secs_f64(self.timebase);
        Some(fraction.clamp(0.0, 1.0))
    }

    /// Whether a block is still scheduled or running.
    #[must_use]
    pub fn is_active(&self, id: BlockId) -> bool {
        self.blocks.iter().any(|b| b.id == id)
    }

    /// Whether no blocks remain.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The timebase used to convert host time ticks.
    #[must_use]
    pub fn timebase(&self) -> Timebase {
        self.timebase
    }
}

fn apply_track(store: &mut ViewStore, track: &Track, progress: f64) {
    match *track {
        Track::Frame { slot, from, to } => {
            if store.slot_alive(slot) {
                store.write_pres_frame(slot, lerp_rect(from, to, progress));
            }
        }
        Track::Transform { slot, from, to } => {
            if store.slot_alive(slot) {
                store.write_pres_transform(slot, lerp_affine(from, to, progress));
            }
        }
        Track::CornerRadius { slot, from, to } => {
            if store.slot_alive(slot) {
                store.write_pres_corner_radius(slot, lerp(from, to, progress));
            }
        }
        Track::Opacity { slot, from, to } => {
            if store.slot_alive(slot) {
                store.write_pres_opacity(slot, lerp(from, to, progress));
            }
        }
        Track::ScrollOffset { slot, from, to } => {
            if store.slot_alive(slot) {
                store.write_pres_scroll_offset(slot, lerp_point(from, to, progress));
            }
        }
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

fn lerp_point(from: Point, to: Point, t: f64) -> Point {
    Point::new(lerp(from.x, to.x, t), lerp(from.y, to.y, t))
}

fn lerp_rect(from: Rect, to: Rect, t: f64) -> Rect {
    Rect::new(
        lerp(from.x0, to.x0, t),
        lerp(from.y0, to.y0, t),
        lerp(from.x1, to.x1, t),
        lerp(from.y1, to.y1, t),
    )
}

fn lerp_affine(from: Affine, to: Affine, t: f64) -> Affine {
    let a = from.as_coeffs();
    let b = to.as_coeffs();
    Affine::new([
        lerp(a[0], b[0], t),
        lerp(a[1], b[1], t),
        lerp(a[2], b[2], t),
        lerp(a[3], b[3], t),
        lerp(a[4], b[4], t),
        lerp(a[5], b[5], t),
    ])
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use crate::detail::NoopLifecycle;
    use crate::spring::SpringProfile;

    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s, Timebase::NANOS)
    }

    fn timeline() -> Timeline {
        Timeline::new(Timebase::NANOS)
    }

    fn at(s: f64) -> HostTime {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "test times are small positive values"
        )]
        HostTime((s * 1e9) as u64)
    }

    #[test]
    fn model_snaps_and_presentation_rewinds() {
        let mut tl = timeline();
        let mut store = ViewStore::new();
        let v = store.create_view();
        store.set_frame(v, Rect::new(0.0, 0.0, 100.0, 100.0));
        let _ = store.evaluate();

        let target = Rect::new(0.0, 0.0, 200.0, 400.0);
        tl.animate(&mut store, at(0.0), BlockParams::linear(secs(1.0)), |s| {
            s.set_frame(v, target);
        });

        // Model holds the final value immediately; presentation rewound.
        assert_eq!(store.frame(v), target);
        assert_eq!(store.presented_frame(v), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn linear_block_interpolates_and_completes() {
        let mut tl = timeline();
        let mut store = ViewStore::new();
        let mut hooks = NoopLifecycle;
        let v = store.create_view();
        store.set_opacity(v, 0.0);
        let _ = store.evaluate();

        tl.animate(&mut store, at(0.0), BlockParams::linear(secs(1.0)), |s| {
            s.set_opacity(v, 1.0);
        });

        tl.tick(at(0.5), &mut store, &mut hooks);
        assert!((store.presented_opacity(v) - 0.5).abs() < 1e-9);
        assert!(!tl.is_idle());

        tl.tick(at(1.0), &mut store, &mut hooks);
        assert!((store.presented_opacity(v) - 1.0).abs() < 1e-12);
        assert!(tl.is_idle());
    }

    #[test]
    fn delay_defers_start() {
        let mut tl = timeline();
        let mut store = ViewStore::new();
        let mut hooks = NoopLifecycle;
        let v = store.create_view();
        store.set_opacity(v, 0.0);

        tl.animate(
            &mut store,
            at(0.0),
            BlockParams::linear(secs(1.0)).with_delay(secs(0.5)),
            |s| s.set_opacity(v, 1.0),
        );

        tl.tick(at(0.4), &mut store, &mut hooks);
        assert_eq!(store.presented_opacity(v), 0.0);

        tl.tick(at(1.0), &mut store, &mut hooks);
        assert!((store.presented_opacity(v) - 0.5).abs() < 1e-9);

        tl.tick(at(1.5), &mut store, &mut hooks);
        assert_eq!(store.presented_opacity(v), 1.0);
        assert!(tl.is_idle());
    }

    #[test]
    fn completion_runs_once_with_finished_true() {
        let mut tl = timeline();
        let mut store = ViewStore::new();
        let mut hooks = NoopLifecycle;
        let v = store.create_view();

        let ran = Rc::new(Cell::new(0_u32));
        let observed = Rc::new(Cell::new(false));
        let ran2 = Rc::clone(&ran);
        let observed2 = Rc::clone(&observed);
        tl.animate_with_completion(
            &mut store,
            at(0.0),
            BlockParams::linear(secs(0.5)),
            |s| s.set_opacity(v, 0.5),
            Some(Box::new(move |_, _, finished| {
                ran2.set(ran2.get() + 1);
                observed2.set(finished);
            })),
        );

        tl.tick(at(1.0), &mut store, &mut hooks);
        tl.tick(at(2.0), &mut store, &mut hooks);
        assert_eq!(ran.get(), 1);
        assert!(observed.get());
    }

    #[test]
    fn cancel_runs_completion_with_finished_false() {
        let mut tl = timeline();
        let mut store = ViewStore::new();
        let mut hooks = NoopLifecycle;
        let v = store.create_view();

        let finished_flag = Rc::new(Cell::new(true));
        let flag = Rc::clone(&finished_flag);
        let id = tl.animate_with_completion(
            &mut store,
            at(0.0),
            BlockParams::linear(secs(1.0)),
            |s| s.set_opacity(v, 0.0),
            Some(Box::new(move |_, _, finished| flag.set(finished))),
        );

        tl.tick(at(0.25), &mut store, &mut hooks);
        let mid = store.presented_opacity(v);
        tl.cancel(id, &mut store, &mut hooks);

        assert!(!finished_flag.get());
        assert!(tl.is_idle());
        // Presentation stays wherever the last tick left it.
        assert!((store.presented_opacity(v) - mid).abs() < 1e-12);
    }

    #[test]
    fn completions_run_in_schedule_order() {
        let mut tl = timeline();
        let mut store = ViewStore::new();
        let mut hooks = NoopLifecycle;
        let v = store.create_view();

        let order = Rc::new(core::cell::RefCell::new(alloc::vec::Vec::new()));
        for tag in 0..3 {
            let order = Rc::clone(&order);
            tl.animate_with_completion(
                &mut store,
                at(0.0),
                BlockParams::linear(secs(0.1)),
                |s| s.set_opacity(v, 0.9 - 0.1 * f64::from(tag)),
                Some(Box::new(move |_, _, _| order.borrow_mut().push(tag))),
            );
        }

        tl.tick(at(1.0), &mut store, &mut hooks);
        assert_eq!(*order.borrow(), alloc::vec![0, 1, 2]);
    }

    #[test]
    fn pause_freezes_and_resume_excludes_paused_span() {
        let mut tl = timeline();
        let mut store = ViewStore::new();
        let mut hooks = NoopLifecycle;
        let v = store.create_view();
        store.set_opacity(v, 0.0);

        let id = tl.animate(&mut store, at(0.0), BlockParams::linear(secs(1.0)), |s| {
            s.set_opacity(v, 1.0);
        });

        tl.tick(at(0.3), &mut store, &mut hooks);
        tl.pause(id, at(0.3));

        // Time passes while paused; presentation does not advance.
        tl.tick(at(5.0), &mut store, &mut hooks);
        assert!((store.presented_opacity(v) - 0.3).abs() < 1e-9);
        let fraction = tl.fraction_complete(id, at(5.0)).unwrap();
        assert!((fraction - 0.3).abs() < 1e-9);

        tl.resume(id, at(5.0));
        tl.tick(at(5.2), &mut store, &mut hooks);
        assert!((store.presented_opacity(v) - 0.5).abs() < 1e-9);

        tl.tick(at(5.7), &mut store, &mut hooks);
        assert!(tl.is_idle());
        assert_eq!(store.presented_opacity(v), 1.0);
    }

    #[test]
    fn spring_block_reaches_exact_target() {
        let mut tl = timeline();
        let mut store = ViewStore::new();
        let mut hooks = NoopLifecycle;
        let v = store.create_view();
        store.set_frame(v, Rect::new(0.0, 500.0, 200.0, 700.0));

        let profile = SpringProfile::compute(500.0, 200.0, 800.0);
        let target = Rect::new(0.0, 0.0, 400.0, 900.0);
        tl.animate(
            &mut store,
            at(0.0),
            BlockParams::new(profile.curve(), secs(profile.duration)),
            |s| s.set_frame(v, target),
        );

        tl.tick(at(profile.duration + 0.001), &mut store, &mut hooks);
        assert!(tl.is_idle());
        assert_eq!(store.presented_frame(v), target);
        assert_eq!(store.frame(v), target);
    }

    #[test]
    fn views_created_inside_block_do_not_animate() {
        let mut tl = timeline();
        let mut store = ViewStore::new();
        let mut hooks = NoopLifecycle;

        let mut created = None;
        tl.animate(&mut store, at(0.0), BlockParams::linear(secs(1.0)), |s| {
            let v = s.create_view();
            s.set_opacity(v, 0.25);
            created = Some(v);
        });

        let v = created.unwrap();
        assert_eq!(store.presented_opacity(v), 0.25);
        tl.tick(at(0.5), &mut store, &mut hooks);
        assert_eq!(store.presented_opacity(v), 0.25);
    }

    #[test]
    fn destroyed_view_mid_flight_is_skipped() {
        let mut tl = timeline();
        let mut store = ViewStore::new();
        let mut hooks = NoopLifecycle;
        let v = store.create_view();
        store.set_opacity(v, 0.0);

        tl.animate(&mut store, at(0.0), BlockParams::linear(secs(1.0)), |s| {
            s.set_opacity(v, 1.0);
        });

        tl.tick(at(0.5), &mut store, &mut hooks);
        store.destroy_view(v);

        // No panic; block still completes.
        tl.tick(at(1.0), &mut store, &mut hooks);
        assert!(tl.is_idle());
    }
}
