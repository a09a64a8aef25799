// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The collapse animation: full-screen detail view shrinks back into the
//! source card.
//!
//! The collapse mirrors the expand in structure, with a fixed spring
//! profile (critical-ish damping, no initial velocity) instead of a
//! travel-derived one. A transient floating container again carries the
//! detail view; the spring shrinks it down onto the card's resting frame
//! while the corner radius collapses back. A short concurrent linear block
//! (0.4x the spring duration) resets the detail scroll view so the card
//! content is visible when the frames converge.
//!
//! A cancelled collapse (interactive gesture released short of the
//! threshold) must restore the pre-dismissal layout exactly, so the driver
//! records where the detail view came from before touching the tree.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

use kurbo::{Affine, Rect};

use crate::context::{RunState, TransitionContext};
use crate::detail::DetailLifecycle;
use crate::geometry::{GeometrySnapshot, inset_rect};
use crate::settings::TransitionSettings;
use crate::spring::SpringProfile;
use crate::time::{Duration, HostTime};
use crate::timeline::{BlockId, BlockParams, Timeline};
use crate::trace::{
    AnimatingViewEvent, PhaseScheduledEvent, Tracer, TransitionBeginEvent, TransitionPhase,
};
use crate::view::{Role, ViewId, ViewStore, find_role};

/// The scroll reset runs for this share of the spring duration.
const SCROLL_RESET_DURATION_FACTOR: f64 = 0.4;

/// Drives one dismiss transition. Create a fresh driver per request.
#[derive(Debug)]
pub struct DismissDriver {
    snapshot: GeometrySnapshot,
    settings: Rc<TransitionSettings>,
    profile: SpringProfile,
    state: Rc<Cell<RunState>>,
    spring_block: Option<BlockId>,
    scroll_block: Option<BlockId>,
}

impl DismissDriver {
    /// Builds a driver that collapses back onto the card geometry in
    /// `snapshot` (captured when the present transition began).
    #[must_use]
    pub fn new(snapshot: GeometrySnapshot, settings: Rc<TransitionSettings>) -> Self {
        let profile = SpringProfile::dismissal(settings.dismissal_animation_duration);
        Self {
            snapshot,
            settings,
            profile,
            state: Rc::new(Cell::new(RunState::Running)),
            spring_block: None,
            scroll_block: None,
        }
    }

    /// Where this driver's single run currently stands.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.state.get()
    }

    /// Total transition duration in seconds.
    #[must_use]
    pub fn transition_duration(&self) -> f64 {
        self.profile.duration
    }

    /// The spring block, once scheduled.
    #[must_use]
    pub fn spring_block(&self) -> Option<BlockId> {
        self.spring_block
    }

    /// The scroll reset block, if the detail screen has a scroll view.
    #[must_use]
    pub fn scroll_block(&self) -> Option<BlockId> {
        self.scroll_block
    }

    /// Runs the collapse animation.
    ///
    /// `from_view` is the detail root currently filling the container and
    /// `cell` the card it collapses onto. On success the detail root is
    /// detached from the tree (the host owns what happens to it next) and
    /// the cell is unhidden; on cancellation the detail root is restored
    /// to its pre-dismissal parent and frame.
    pub fn animate(
        &mut self,
        timeline: &mut Timeline,
        store: &mut ViewStore,
        now: HostTime,
        mut ctx: TransitionContext,
        cell: ViewId,
        from_view: ViewId,
        hooks: &mut dyn DetailLifecycle,
        tracer: &mut Tracer<'_>,
    ) {
        if !store.is_alive(cell) || !store.is_alive(from_view) {
            self.state.set(RunState::Cancelled);
            ctx.complete(false);
            return;
        }
        let Some(content) = find_role(store, from_view, Role::DetailContent) else {
            self.state.set(RunState::Cancelled);
            ctx.complete(false);
            return;
        };
        let scroll = find_role(store, from_view, Role::ScrollView);

        tracer.transition_begin(&TransitionBeginEvent {
            presenting: false,
            now,
            duration_secs: self.profile.duration,
        });

        // Dismissal has begun the moment the driver commits to it, before
        // any geometry changes.
        hooks.did_begin_dismissing();

        let container = ctx.container;
        let container_bounds = store.bounds(container);

        // Remembered so a cancelled collapse can put the detail view back.
        let prior_parent = store.parent(from_view);
        let prior_frame = store.frame(from_view);

        // The floating container starts where the expand left off: the
        // screen container minus the configured insets.
        let insets = self.settings.card_container_insets;
        let start = inset_rect(container_bounds, insets);
        let floating = store.create_view();
        store.set_role(floating, Some(Role::FloatingContainer));
        store.set_frame(floating, start);
        store.add_child(container, floating);

        store.reparent(from_view, floating);
        // Oversized by the container insets so the reparent does not move
        // the detail visually; the spring then shrinks it onto the card.
        store.set_frame(
            from_view,
            Rect::new(
                -insets.x0,
                -insets.y0,
                start.width() + insets.x1,
                start.height() + insets.y1,
            ),
        );

        if self.settings.is_enabled_debug_animating_views {
            tracer.animating_view(&AnimatingViewEvent {
                view_index: floating.index(),
                label: "floating container",
            });
            tracer.animating_view(&AnimatingViewEvent {
                view_index: from_view.index(),
                label: "detail root",
            });
        }

        let resting = self.snapshot.resting_frame;
        let duration = Duration::from_secs_f64(self.profile.duration, timeline.timebase());

        let settings = Rc::clone(&self.settings);
        let restore_radius = self.settings.details_corner_radius;
        let run_state = Rc::clone(&self.state);
        let spring = timeline.animate_with_completion(
            store,
            now,
            BlockParams::new(self.profile.curve(), duration),
            |s| {
                s.set_transform(from_view, Affine::IDENTITY);
                s.set_corner_radius(from_view, settings.card_corner_radius);
                s.set_frame(floating, resting);
                s.set_frame(from_view, Rect::new(0.0, 0.0, resting.width(), resting.height()));
                if let Some(hook) = &settings.additional_card_view_animations {
                    hook(s, content, false);
                }
            },
            Some(Box::new(move |s, _hooks, _finished| {
                let success = !ctx.cancelled.is_cancelled();
                run_state.set(if success {
                    RunState::Completed
                } else {
                    RunState::Cancelled
                });
                if success {
                    // The detail view leaves the tree; the host decides
                    // whether to keep it around for re-presentation.
                    s.remove_from_parent(from_view);
                    s.destroy_view(floating);
                    if s.is_alive(cell) {
                        s.set_hidden(cell, false);
                    }
                } else {
                    // Put everything back exactly where it was.
                    s.reparent(from_view, prior_parent.unwrap_or(container));
                    s.set_frame(from_view, prior_frame);
                    s.set_corner_radius(from_view, restore_radius);
                    s.destroy_view(floating);
                }
                ctx.complete(success);
            })),
        );

        tracer.phase_scheduled(&PhaseScheduledEvent {
            phase: TransitionPhase::Bounce,
            block: spring,
            duration_secs: self.profile.duration,
            delay_secs: 0.0,
        });
        self.spring_block = Some(spring);

        // Reset the scroll position early in the collapse so the card
        // content is in view by the time the frames converge.
        if let Some(scroll) = scroll {
            let offset = self.settings.dismissal_scroll_view_content_offset;
            let reset = timeline.animate(
                store,
                now,
                BlockParams::linear(duration.mul_f64(SCROLL_RESET_DURATION_FACTOR)),
                |s| {
                    s.set_scroll_offset(scroll, offset);
                },
            );
            tracer.phase_scheduled(&PhaseScheduledEvent {
                phase: TransitionPhase::ScrollReset,
                block: reset,
                duration_secs: self.profile.duration * SCROLL_RESET_DURATION_FACTOR,
                delay_secs: 0.0,
            });
            self.scroll_block = Some(reset);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use kurbo::Point;

    use crate::context::CancellationToken;
    use crate::detail::NoopLifecycle;
    use crate::time::Timebase;

    use super::*;

    struct Fixture {
        timeline: Timeline,
        store: ViewStore,
        container: ViewId,
        cell: ViewId,
        detail: ViewId,
        scroll: ViewId,
        snapshot: GeometrySnapshot,
    }

    /// Container with a hidden cell and a detail view already presented
    /// full-screen, as a completed present transition leaves them.
    fn fixture() -> Fixture {
        let mut store = ViewStore::new();
        let container = store.create_view();
        store.set_frame(container, Rect::new(0.0, 0.0, 400.0, 800.0));

        let cell = store.create_view();
        store.set_role(cell, Some(Role::CardCell));
        store.set_frame(cell, Rect::new(20.0, 500.0, 180.0, 700.0));
        store.add_child(container, cell);
        let snapshot = GeometrySnapshot::capture(&mut store, cell);
        store.set_hidden(cell, true);

        let detail = store.create_view();
        store.set_role(detail, Some(Role::DetailRoot));
        store.set_frame(detail, Rect::new(0.0, 0.0, 400.0, 800.0));
        store.set_corner_radius(detail, 16.0);
        let content = store.create_view();
        store.set_role(content, Some(Role::DetailContent));
        let scroll = store.create_view();
        store.set_role(scroll, Some(Role::ScrollView));
        store.set_scroll_offset(scroll, Point::new(0.0, 340.0));
        store.add_child(detail, content);
        store.add_child(content, scroll);
        store.add_child(container, detail);

        let _ = store.evaluate();
        Fixture {
            timeline: Timeline::new(Timebase::NANOS),
            store,
            container,
            cell,
            detail,
            scroll,
            snapshot,
        }
    }

    fn secs_after(s: f64) -> HostTime {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "test times are small positive values"
        )]
        HostTime((s * 1e9) as u64)
    }

    fn run_dismiss(
        f: &mut Fixture,
        token: CancellationToken,
        completion: impl FnOnce(bool) + 'static,
    ) -> DismissDriver {
        let mut driver = DismissDriver::new(f.snapshot, Rc::new(TransitionSettings::default()));
        let ctx = TransitionContext::new(f.container, token, completion);
        let mut hooks = NoopLifecycle;
        driver.animate(
            &mut f.timeline,
            &mut f.store,
            HostTime(0),
            ctx,
            f.cell,
            f.detail,
            &mut hooks,
            &mut Tracer::none(),
        );
        driver
    }

    #[test]
    fn successful_dismiss_detaches_detail_and_unhides_cell() {
        let mut f = fixture();
        let reported = Rc::new(Cell::new(None));
        let slot = Rc::clone(&reported);
        let driver = run_dismiss(&mut f, CancellationToken::new(), move |ok| {
            slot.set(Some(ok));
        });

        let mut hooks = NoopLifecycle;
        f.timeline.tick(secs_after(1.0), &mut f.store, &mut hooks);

        assert_eq!(reported.get(), Some(true));
        assert_eq!(driver.run_state(), RunState::Completed);
        assert!(f.timeline.is_idle());
        assert_eq!(f.store.parent(f.detail), None);
        assert!(!f.store.hidden(f.cell));
        assert!(find_role(&f.store, f.container, Role::FloatingContainer).is_none());
    }

    #[test]
    fn reparent_into_floating_keeps_detail_screen_frame() {
        let mut f = fixture();
        let _ = f.store.evaluate();
        let before = f.store.screen_frame(f.detail);

        let _driver = run_dismiss(&mut f, CancellationToken::new(), |_| {});
        let _ = f.store.evaluate();
        assert_eq!(f.store.screen_frame(f.detail), before);
    }

    #[test]
    fn floating_container_lands_on_resting_frame() {
        let mut f = fixture();
        let resting = f.snapshot.resting_frame;
        let driver = run_dismiss(&mut f, CancellationToken::new(), |_| {});

        // Just before completion the container has converged on the
        // resting frame; the detail root fills it at the origin.
        let floating = find_role(&f.store, f.container, Role::FloatingContainer).unwrap();
        let mut hooks = NoopLifecycle;
        f.timeline.tick(
            secs_after(driver.transition_duration() - 1e-6),
            &mut f.store,
            &mut hooks,
        );
        let pf = f.store.presented_frame(floating);
        assert!((pf.y0 - resting.y0).abs() < 2.0, "near resting: {pf:?}");
        assert!((f.store.presented_corner_radius(f.detail) - 8.0).abs() < 0.1);
    }

    #[test]
    fn cancelled_dismiss_restores_pre_dismissal_layout() {
        let mut f = fixture();
        let reported = Rc::new(Cell::new(None));
        let slot = Rc::clone(&reported);
        let token = CancellationToken::new();
        let _driver = run_dismiss(&mut f, token.clone(), move |ok| {
            slot.set(Some(ok));
        });

        token.cancel();
        let mut hooks = NoopLifecycle;
        f.timeline.tick(secs_after(1.0), &mut f.store, &mut hooks);

        assert_eq!(reported.get(), Some(false));
        assert_eq!(f.store.parent(f.detail), Some(f.container));
        assert_eq!(f.store.frame(f.detail), Rect::new(0.0, 0.0, 400.0, 800.0));
        assert_eq!(f.store.corner_radius(f.detail), 16.0);
        // The cell stays hidden behind the still-presented detail view.
        assert!(f.store.hidden(f.cell));
        assert!(find_role(&f.store, f.container, Role::FloatingContainer).is_none());
    }

    #[test]
    fn scroll_resets_during_first_part_of_collapse() {
        let mut f = fixture();
        let driver = run_dismiss(&mut f, CancellationToken::new(), |_| {});
        assert!(driver.scroll_block().is_some());
        let d = driver.transition_duration();

        let mut hooks = NoopLifecycle;
        f.timeline
            .tick(secs_after(d * 0.2), &mut f.store, &mut hooks);
        let mid = f.store.presented_scroll_offset(f.scroll);
        assert!(mid.y > 0.0 && mid.y < 340.0, "mid-reset offset: {mid:?}");

        f.timeline
            .tick(secs_after(d * 0.5), &mut f.store, &mut hooks);
        assert_eq!(f.store.presented_scroll_offset(f.scroll), Point::ZERO);
        assert!(!f.timeline.is_idle(), "spring still in flight");
    }

    #[test]
    fn lifecycle_hook_fires_before_geometry_changes() {
        struct Probe {
            fired: Rc<Cell<bool>>,
        }
        impl DetailLifecycle for Probe {
            fn did_begin_dismissing(&mut self) {
                self.fired.set(true);
            }
        }

        let mut f = fixture();
        let fired = Rc::new(Cell::new(false));
        let mut hooks = Probe {
            fired: Rc::clone(&fired),
        };
        let mut driver = DismissDriver::new(f.snapshot, Rc::new(TransitionSettings::default()));
        let ctx = TransitionContext::new(f.container, CancellationToken::new(), |_| {});
        driver.animate(
            &mut f.timeline,
            &mut f.store,
            HostTime(0),
            ctx,
            f.cell,
            f.detail,
            &mut hooks,
            &mut Tracer::none(),
        );
        assert!(fired.get());
    }

    #[test]
    fn dead_cell_reports_immediate_failure() {
        let mut f = fixture();
        let dead = f.store.create_view();
        f.store.destroy_view(dead);
        let reported = Rc::new(Cell::new(None));
        let slot = Rc::clone(&reported);
        let mut driver = DismissDriver::new(f.snapshot, Rc::new(TransitionSettings::default()));
        let ctx = TransitionContext::new(f.container, CancellationToken::new(), move |ok| {
            slot.set(Some(ok));
        });
        let mut hooks = NoopLifecycle;
        driver.animate(
            &mut f.timeline,
            &mut f.store,
            HostTime(0),
            ctx,
            dead,
            f.detail,
            &mut hooks,
            &mut Tracer::none(),
        );
        assert_eq!(reported.get(), Some(false));
        assert!(f.timeline.is_idle());
    }
}
