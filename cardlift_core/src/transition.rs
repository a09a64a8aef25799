// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The coordinator that ties one card to one present/dismiss pair.
//!
//! A [`CardTransition`] is created when the host decides a card will be
//! presented. Construction freezes the cell's highlight animation and
//! captures its geometry, so the expand starts from exactly what was on
//! screen even if the press animation was mid-flight. The coordinator
//! then owns the backdrop and the per-direction drivers, tracks a small
//! state machine, and guarantees the host completion fires exactly once
//! per requested transition.

use alloc::rc::Rc;
use core::cell::Cell;

use crate::backdrop::BackdropController;
use crate::cell::CardCell;
use crate::context::{CancellationToken, TransitionContext};
use crate::detail::DetailLifecycle;
use crate::dismiss::DismissDriver;
use crate::geometry::GeometrySnapshot;
use crate::present::PresentDriver;
use crate::settings::TransitionSettings;
use crate::time::HostTime;
use crate::timeline::Timeline;
use crate::trace::{Tracer, TransitionEndEvent};
use crate::view::{ViewId, ViewStore};

/// Where a [`CardTransition`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionState {
    /// Nothing requested yet, or a failed present was rolled back.
    Idle,
    /// The expand animation is in flight.
    Presenting,
    /// The detail screen fills the container.
    Presented,
    /// The collapse animation is in flight.
    Dismissing,
    /// The collapse completed; only teardown remains.
    Dismissed,
}

/// Coordinates one card's present/dismiss cycle.
#[derive(Debug)]
pub struct CardTransition {
    cell: CardCell,
    settings: Rc<TransitionSettings>,
    snapshot: GeometrySnapshot,
    backdrop: BackdropController,
    state: Rc<Cell<TransitionState>>,
    outcome: Rc<Cell<Option<bool>>>,
    cancellation: CancellationToken,
    present_driver: Option<PresentDriver>,
    dismiss_driver: Option<DismissDriver>,
}

impl CardTransition {
    /// Freezes the cell's highlight animation and captures its rendered
    /// geometry. The capture happens here, not when the animation is
    /// scheduled, so the expand starts from what the user actually sees.
    pub fn new(store: &mut ViewStore, mut cell: CardCell) -> Self {
        cell.freeze_animations();
        let settings = Rc::clone(cell.settings());
        let snapshot = GeometrySnapshot::capture(store, cell.view());
        Self {
            cell,
            backdrop: BackdropController::new(Rc::clone(&settings)),
            settings,
            snapshot,
            state: Rc::new(Cell::new(TransitionState::Idle)),
            outcome: Rc::new(Cell::new(None)),
            cancellation: CancellationToken::new(),
            present_driver: None,
            dismiss_driver: None,
        }
    }

    /// Where this coordinator is in its lifecycle.
    #[must_use]
    pub fn state(&self) -> TransitionState {
        self.state.get()
    }

    /// The geometry the transition pair collapses back onto.
    #[must_use]
    pub fn snapshot(&self) -> GeometrySnapshot {
        self.snapshot
    }

    /// The card cell this coordinator transitions.
    #[must_use]
    pub fn cell(&self) -> &CardCell {
        &self.cell
    }

    /// The dimming backdrop owned by this coordinator.
    #[must_use]
    pub fn backdrop(&self) -> &BackdropController {
        &self.backdrop
    }

    /// Whether the host should honor a bottom-edge swipe as a dismiss
    /// request.
    #[must_use]
    pub fn should_close_on_bottom_swipe(&self) -> bool {
        self.settings.is_enabled_bottom_close
    }

    /// The driver for the direction currently or most recently in flight.
    #[must_use]
    pub fn present_driver(&self) -> Option<&PresentDriver> {
        self.present_driver.as_ref()
    }

    /// The dismiss driver, once a dismissal has been requested.
    #[must_use]
    pub fn dismiss_driver(&self) -> Option<&DismissDriver> {
        self.dismiss_driver.as_ref()
    }

    /// Requests cancellation of the transition currently in flight. The
    /// animation still runs to completion; its completion rolls the
    /// layout back and reports failure.
    pub fn cancel_active(&self) {
        self.cancellation.cancel();
    }

    /// Starts the expand animation from the cell into `to_view`.
    ///
    /// `completion` fires exactly once, with `false` if the transition
    /// could not start, was cancelled, or the detail handles could not be
    /// resolved. Returns whether an animation was scheduled.
    pub fn present(
        &mut self,
        timeline: &mut Timeline,
        store: &mut ViewStore,
        now: HostTime,
        container: ViewId,
        to_view: ViewId,
        hooks: &mut dyn DetailLifecycle,
        tracer: &mut Tracer<'_>,
        completion: impl FnOnce(bool) + 'static,
    ) -> bool {
        if self.state.get() != TransitionState::Idle {
            completion(false);
            return false;
        }
        self.state.set(TransitionState::Presenting);
        self.cancellation = CancellationToken::new();
        self.outcome.set(None);
        // Fresh capture per direction: the expand starts from what is on
        // screen right now, not from where the cell was at construction.
        self.snapshot = GeometrySnapshot::capture(store, self.cell.view());

        let mut driver = PresentDriver::new(
            self.snapshot,
            Rc::clone(&self.settings),
            store.bounds(container).height(),
        );
        // Backdrop first so it draws behind the floating container.
        self.backdrop.fade_in(
            timeline,
            store,
            now,
            container,
            driver.transition_duration(),
            tracer,
        );

        let state = Rc::clone(&self.state);
        let outcome = Rc::clone(&self.outcome);
        let ctx = TransitionContext::new(
            container,
            self.cancellation.clone(),
            move |success| {
                state.set(if success {
                    TransitionState::Presented
                } else {
                    TransitionState::Idle
                });
                outcome.set(Some(success));
                completion(success);
            },
        );
        driver.animate(
            timeline,
            store,
            now,
            ctx,
            self.cell.view(),
            to_view,
            hooks,
            tracer,
        );
        self.present_driver = Some(driver);
        self.state.get() == TransitionState::Presenting
    }

    /// Starts the collapse animation from `from_view` back onto the cell.
    ///
    /// A cancelled collapse restores the presented layout and returns the
    /// state to [`TransitionState::Presented`]. Returns whether an
    /// animation was scheduled.
    pub fn dismiss(
        &mut self,
        timeline: &mut Timeline,
        store: &mut ViewStore,
        now: HostTime,
        container: ViewId,
        from_view: ViewId,
        hooks: &mut dyn DetailLifecycle,
        tracer: &mut Tracer<'_>,
        completion: impl FnOnce(bool) + 'static,
    ) -> bool {
        if self.state.get() != TransitionState::Presented {
            completion(false);
            return false;
        }
        self.state.set(TransitionState::Dismissing);
        self.cancellation = CancellationToken::new();
        self.outcome.set(None);
        // Re-measure the resting frame so the card collapses back to where
        // the list shows it now, even if the list scrolled while presented.
        self.snapshot = GeometrySnapshot::capture(store, self.cell.view());

        let mut driver = DismissDriver::new(self.snapshot, Rc::clone(&self.settings));
        self.backdrop.fade_out(
            timeline,
            store,
            now,
            driver.transition_duration(),
            tracer,
        );

        let state = Rc::clone(&self.state);
        let outcome = Rc::clone(&self.outcome);
        let ctx = TransitionContext::new(
            container,
            self.cancellation.clone(),
            move |success| {
                state.set(if success {
                    TransitionState::Dismissed
                } else {
                    TransitionState::Presented
                });
                outcome.set(Some(success));
                completion(success);
            },
        );
        driver.animate(
            timeline,
            store,
            now,
            ctx,
            self.cell.view(),
            from_view,
            hooks,
            tracer,
        );
        self.dismiss_driver = Some(driver);
        self.state.get() == TransitionState::Dismissing
    }

    /// Reports the outcome of the most recent transition, once. Call
    /// after ticking the timeline; emits the end trace event the first
    /// time the outcome is observed.
    pub fn poll_outcome(&mut self, tracer: &mut Tracer<'_>) -> Option<bool> {
        let success = self.outcome.take()?;
        tracer.transition_end(&TransitionEndEvent {
            presenting: self.dismiss_driver.is_none(),
            success,
        });
        Some(success)
    }

    /// Releases everything the coordinator holds on the view tree: the
    /// cell's highlight freeze always, and the backdrop after a completed
    /// dismissal or a failed present (nothing is presented in either case,
    /// so the dimming must go). A cancelled dismiss keeps the screen
    /// dimmed.
    pub fn teardown(&mut self, store: &mut ViewStore) {
        self.cell.unfreeze_animations();
        if matches!(
            self.state.get(),
            TransitionState::Dismissed | TransitionState::Idle
        ) {
            self.backdrop.teardown(store);
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Affine, Rect};

    use crate::detail::NoopLifecycle;
    use crate::time::Timebase;
    use crate::view::{Role, find_role};

    use super::*;

    struct World {
        timeline: Timeline,
        store: ViewStore,
        container: ViewId,
        detail: ViewId,
        transition: CardTransition,
    }

    fn secs_after(s: f64) -> HostTime {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "test times are small positive values"
        )]
        HostTime((s * 1e9) as u64)
    }

    fn world() -> World {
        let mut store = ViewStore::new();
        let container = store.create_view();
        store.set_frame(container, Rect::new(0.0, 0.0, 400.0, 800.0));

        let cell_view = store.create_view();
        store.set_frame(cell_view, Rect::new(20.0, 500.0, 180.0, 700.0));
        store.add_child(container, cell_view);
        let content = store.create_view();
        store.add_child(cell_view, content);

        let detail = store.create_view();
        store.set_role(detail, Some(Role::DetailRoot));
        let detail_content = store.create_view();
        store.set_role(detail_content, Some(Role::DetailContent));
        store.add_child(detail, detail_content);

        let settings = Rc::new(TransitionSettings::default());
        let cell = CardCell::new(&mut store, cell_view, content, settings);
        let _ = store.evaluate();
        let transition = CardTransition::new(&mut store, cell);

        World {
            timeline: Timeline::new(Timebase::NANOS),
            store,
            container,
            detail,
            transition,
        }
    }

    fn run_present(w: &mut World) -> bool {
        let mut hooks = NoopLifecycle;
        let started = w.transition.present(
            &mut w.timeline,
            &mut w.store,
            HostTime(0),
            w.container,
            w.detail,
            &mut hooks,
            &mut Tracer::none(),
            |_| {},
        );
        w.timeline.tick(secs_after(2.0), &mut w.store, &mut hooks);
        started
    }

    #[test]
    fn construction_freezes_cell_highlight() {
        let w = world();
        assert!(w.transition.cell().animations_frozen());
        assert_eq!(w.transition.state(), TransitionState::Idle);
    }

    #[test]
    fn present_reaches_presented_state() {
        let mut w = world();
        assert!(run_present(&mut w));
        assert_eq!(w.transition.state(), TransitionState::Presented);
        assert_eq!(w.transition.poll_outcome(&mut Tracer::none()), Some(true));
        assert_eq!(w.transition.poll_outcome(&mut Tracer::none()), None);
        assert_eq!(w.store.parent(w.detail), Some(w.container));
        // Backdrop is up behind it.
        let backdrop = w.transition.backdrop().view().unwrap();
        assert_eq!(w.store.presented_opacity(backdrop), 1.0);
    }

    #[test]
    fn present_while_not_idle_fails_fast() {
        let mut w = world();
        assert!(run_present(&mut w));
        let mut hooks = NoopLifecycle;
        let fired = Rc::new(Cell::new(None));
        let slot = Rc::clone(&fired);
        let started = w.transition.present(
            &mut w.timeline,
            &mut w.store,
            secs_after(3.0),
            w.container,
            w.detail,
            &mut hooks,
            &mut Tracer::none(),
            move |ok| slot.set(Some(ok)),
        );
        assert!(!started);
        assert_eq!(fired.get(), Some(false));
        assert_eq!(w.transition.state(), TransitionState::Presented);
    }

    #[test]
    fn round_trip_restores_the_cell() {
        let mut w = world();
        let cell_view = w.transition.cell().view();
        let before = w.store.screen_frame(cell_view);
        assert!(run_present(&mut w));
        assert!(w.store.hidden(cell_view));

        let mut hooks = NoopLifecycle;
        assert!(w.transition.dismiss(
            &mut w.timeline,
            &mut w.store,
            secs_after(3.0),
            w.container,
            w.detail,
            &mut hooks,
            &mut Tracer::none(),
            |_| {},
        ));
        w.timeline.tick(secs_after(5.0), &mut w.store, &mut hooks);
        assert_eq!(w.transition.state(), TransitionState::Dismissed);

        let _ = w.store.evaluate();
        assert!(!w.store.hidden(cell_view));
        assert_eq!(w.store.transform(cell_view), Affine::IDENTITY);
        assert_eq!(w.store.screen_frame(cell_view), before);

        w.transition.teardown(&mut w.store);
        assert!(!w.transition.cell().animations_frozen());
        assert!(w.transition.backdrop().view().is_none());
        assert!(find_role(&w.store, w.container, Role::Backdrop).is_none());
    }

    #[test]
    fn cancelled_dismiss_returns_to_presented_and_keeps_backdrop() {
        let mut w = world();
        assert!(run_present(&mut w));

        let mut hooks = NoopLifecycle;
        assert!(w.transition.dismiss(
            &mut w.timeline,
            &mut w.store,
            secs_after(3.0),
            w.container,
            w.detail,
            &mut hooks,
            &mut Tracer::none(),
            |_| {},
        ));
        w.transition.cancel_active();
        w.timeline.tick(secs_after(5.0), &mut w.store, &mut hooks);

        assert_eq!(w.transition.state(), TransitionState::Presented);
        assert_eq!(w.transition.poll_outcome(&mut Tracer::none()), Some(false));
        assert_eq!(w.store.parent(w.detail), Some(w.container));

        // Teardown after a cancelled dismiss leaves the backdrop alone.
        let backdrop = w.transition.backdrop().view().unwrap();
        w.transition.teardown(&mut w.store);
        assert!(w.store.is_alive(backdrop));
    }

    #[test]
    fn frame_stepped_round_trip_fires_lifecycle_hooks_in_order() {
        use cardlift_harness::{FrameClock, LifecycleEvent, RecordingDetail, drive_to_idle};

        let mut w = world();
        let mut clock = FrameClock::new(60.0, Timebase::NANOS);
        let mut detail = RecordingDetail::new();

        assert!(w.transition.present(
            &mut w.timeline,
            &mut w.store,
            clock.now(),
            w.container,
            w.detail,
            &mut detail,
            &mut Tracer::none(),
            |_| {},
        ));
        let frames = drive_to_idle(
            &mut w.timeline,
            &mut w.store,
            &mut detail,
            &mut clock,
            600,
        );
        assert!(frames.is_some(), "present never settled");
        assert_eq!(w.transition.state(), TransitionState::Presented);

        assert!(w.transition.dismiss(
            &mut w.timeline,
            &mut w.store,
            clock.now(),
            w.container,
            w.detail,
            &mut detail,
            &mut Tracer::none(),
            |_| {},
        ));
        let frames = drive_to_idle(
            &mut w.timeline,
            &mut w.store,
            &mut detail,
            &mut clock,
            600,
        );
        assert!(frames.is_some(), "dismiss never settled");
        assert_eq!(w.transition.state(), TransitionState::Dismissed);

        assert_eq!(
            detail.events(),
            [
                LifecycleEvent::StartPresenting,
                LifecycleEvent::FinishPresenting,
                LifecycleEvent::BeginDismissing,
            ]
        );
    }

    #[test]
    fn failed_present_rolls_back_to_idle() {
        let mut w = world();
        // A detail root with no tagged content view cannot be resolved.
        let bare = w.store.create_view();
        let mut hooks = NoopLifecycle;
        let fired = Rc::new(Cell::new(None));
        let slot = Rc::clone(&fired);
        let started = w.transition.present(
            &mut w.timeline,
            &mut w.store,
            HostTime(0),
            w.container,
            bare,
            &mut hooks,
            &mut Tracer::none(),
            move |ok| slot.set(Some(ok)),
        );
        assert!(!started);
        assert_eq!(fired.get(), Some(false));
        assert_eq!(w.transition.state(), TransitionState::Idle);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn failed_present_reports_exactly_one_end_event() {
        use crate::trace::{TraceSink, TransitionEndEvent};

        #[derive(Default)]
        struct CountingSink {
            ends: u32,
        }
        impl TraceSink for CountingSink {
            fn on_transition_end(&mut self, _e: &TransitionEndEvent) {
                self.ends += 1;
            }
        }

        let mut w = world();
        let bare = w.store.create_view();
        let mut sink = CountingSink::default();
        let mut hooks = NoopLifecycle;
        {
            let mut tracer = Tracer::new(&mut sink);
            let started = w.transition.present(
                &mut w.timeline,
                &mut w.store,
                HostTime(0),
                w.container,
                bare,
                &mut hooks,
                &mut tracer,
                |_| {},
            );
            assert!(!started);
            assert_eq!(w.transition.poll_outcome(&mut tracer), Some(false));
            assert_eq!(w.transition.poll_outcome(&mut tracer), None);
        }
        assert_eq!(sink.ends, 1);
    }

    #[test]
    fn teardown_after_failed_present_removes_the_backdrop() {
        let mut w = world();
        let bare = w.store.create_view();
        let mut hooks = NoopLifecycle;
        let started = w.transition.present(
            &mut w.timeline,
            &mut w.store,
            HostTime(0),
            w.container,
            bare,
            &mut hooks,
            &mut Tracer::none(),
            |_| {},
        );
        assert!(!started);

        // The fade block was already scheduled; the screen must not stay
        // dimmed once the failed present is torn down.
        let backdrop = w.transition.backdrop().view().unwrap();
        w.transition.teardown(&mut w.store);
        assert!(!w.store.is_alive(backdrop));
        assert!(find_role(&w.store, w.container, Role::Backdrop).is_none());

        // The orphaned fade block ticks harmlessly against the dead slot.
        w.timeline.tick(secs_after(1.0), &mut w.store, &mut hooks);
        assert!(w.timeline.is_idle());
    }
}
