// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The expand animation: card grows into the full-screen detail view.
//!
//! The driver decouples "slide into place" from "grow to full size" with a
//! transient floating container: the outer spring bounces the container
//! from the card's rendered position up to its resting place, while a
//! concurrent linear block (0.6x the spring duration) resizes the detail
//! content from card dimensions to container dimensions and rounds its
//! corners out to the expanded radius. When the spring completes, the
//! detail view is reparented directly under the screen container in plain
//! layout and the transient container is destroyed.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

use kurbo::{Affine, Rect, Vec2};

use crate::context::{RunState, TransitionContext};
use crate::detail::DetailLifecycle;
use crate::geometry::{GeometrySnapshot, inset_rect};
use crate::settings::{CardVerticalExpandingStyle, TransitionSettings};
use crate::spring::SpringProfile;
use crate::time::{Duration, HostTime};
use crate::timeline::{BlockId, BlockParams, Timeline};
use crate::trace::{
    AnimatingViewEvent, PhaseScheduledEvent, Tracer, TransitionBeginEvent, TransitionPhase,
};
use crate::view::{Role, ViewId, ViewStore, find_role};

/// The inner resize runs for this share of the outer spring duration.
const RESIZE_DURATION_FACTOR: f64 = 0.6;

/// Drives one present transition. Create a fresh driver per request.
#[derive(Debug)]
pub struct PresentDriver {
    snapshot: GeometrySnapshot,
    settings: Rc<TransitionSettings>,
    profile: SpringProfile,
    state: Rc<Cell<RunState>>,
    spring_block: Option<BlockId>,
    resize_block: Option<BlockId>,
}

impl PresentDriver {
    /// Builds a driver for a card whose geometry was just captured.
    ///
    /// The spring profile is derived here, once, from the card's vertical
    /// travel; it does not change if layout moves afterwards.
    #[must_use]
    pub fn new(
        snapshot: GeometrySnapshot,
        settings: Rc<TransitionSettings>,
        screen_height: f64,
    ) -> Self {
        let profile = SpringProfile::compute(
            snapshot.rendered_frame.y0,
            snapshot.rendered_frame.height(),
            screen_height,
        );
        Self {
            snapshot,
            settings,
            profile,
            state: Rc::new(Cell::new(RunState::Running)),
            spring_block: None,
            resize_block: None,
        }
    }

    /// Where this driver's single run currently stands.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.state.get()
    }

    /// Total transition duration in seconds (the outer spring duration).
    #[must_use]
    pub fn transition_duration(&self) -> f64 {
        self.profile.duration
    }

    /// The outer spring block, once scheduled. Hosts may pause and resume
    /// it through the timeline in response to an interactive gesture.
    #[must_use]
    pub fn spring_block(&self) -> Option<BlockId> {
        self.spring_block
    }

    /// The inner resize block, once scheduled.
    #[must_use]
    pub fn resize_block(&self) -> Option<BlockId> {
        self.resize_block
    }

    /// Runs the expand animation.
    ///
    /// `cell` is the source card; `to_view` the detail root that will fill
    /// the container. The detail content is resolved by role search under
    /// `to_view`; if it or the cell cannot be resolved, the driver reports
    /// immediate failure through `ctx` rather than leaving the host
    /// without a completion signal.
    pub fn animate(
        &mut self,
        timeline: &mut Timeline,
        store: &mut ViewStore,
        now: HostTime,
        mut ctx: TransitionContext,
        cell: ViewId,
        to_view: ViewId,
        hooks: &mut dyn DetailLifecycle,
        tracer: &mut Tracer<'_>,
    ) {
        if !store.is_alive(cell) || !store.is_alive(to_view) {
            self.state.set(RunState::Cancelled);
            ctx.complete(false);
            return;
        }
        let Some(content) = find_role(store, to_view, Role::DetailContent) else {
            self.state.set(RunState::Cancelled);
            ctx.complete(false);
            return;
        };
        let scroll = find_role(store, to_view, Role::ScrollView);

        tracer.transition_begin(&TransitionBeginEvent {
            presenting: true,
            now,
            duration_secs: self.profile.duration,
        });

        let container = ctx.container;
        let container_bounds = store.bounds(container);
        let rendered = self.snapshot.rendered_frame;

        // Where the floating container comes to rest: the screen container
        // minus the configured insets.
        let insets = self.settings.card_container_insets;
        let target = inset_rect(container_bounds, insets);
        let (w, h) = (target.width(), target.height());

        // Slide the whole container down so its content starts where the
        // card currently renders.
        let dy = match self.settings.card_vertical_expanding_style {
            CardVerticalExpandingStyle::FromTop => rendered.y0 - target.y0,
            CardVerticalExpandingStyle::FromCenter => rendered.center().y - target.center().y,
        };
        let start = target + Vec2::new(0.0, dy);

        let floating = store.create_view();
        store.set_role(floating, Some(Role::FloatingContainer));
        store.set_frame(floating, start);
        store.add_child(container, floating);

        // The detail view starts card-sized inside the floating container,
        // horizontally centered, anchored per the expanding style.
        let (rw, rh) = (rendered.width(), rendered.height());
        let detail_start = match self.settings.card_vertical_expanding_style {
            CardVerticalExpandingStyle::FromTop => {
                Rect::new((w - rw) / 2.0, 0.0, (w + rw) / 2.0, rh)
            }
            CardVerticalExpandingStyle::FromCenter => {
                Rect::new((w - rw) / 2.0, (h - rh) / 2.0, (w + rw) / 2.0, (h + rh) / 2.0)
            }
        };
        store.reparent(to_view, floating);
        store.set_frame(to_view, detail_start);
        store.set_corner_radius(to_view, self.settings.card_corner_radius);
        if let Some(scroll) = scroll {
            store.set_scroll_enabled(scroll, false);
        }

        // The cell is replaced visually by the animating detail view.
        store.set_hidden(cell, true);
        store.set_transform(cell, Affine::IDENTITY);

        if self.settings.is_enabled_debug_animating_views {
            tracer.animating_view(&AnimatingViewEvent {
                view_index: floating.index(),
                label: "floating container",
            });
            tracer.animating_view(&AnimatingViewEvent {
                view_index: to_view.index(),
                label: "detail root",
            });
        }

        hooks.did_start_presenting();

        let duration = Duration::from_secs_f64(self.profile.duration, timeline.timebase());

        // Phase A: spring the floating container into its resting place.
        // Its completion is the whole transition's completion.
        let run_state = Rc::clone(&self.state);
        let spring = timeline.animate_with_completion(
            store,
            now,
            BlockParams::new(self.profile.curve(), duration),
            |s| {
                s.set_frame(floating, target);
            },
            Some(Box::new(move |s, hooks, _finished| {
                // Back under the screen container, in plain layout.
                s.reparent(to_view, container);
                s.set_frame(to_view, container_bounds);
                s.destroy_view(floating);
                if let Some(scroll) = scroll
                    && s.is_alive(scroll)
                {
                    s.set_scroll_enabled(scroll, true);
                }
                let success = !ctx.cancelled.is_cancelled();
                run_state.set(if success {
                    RunState::Completed
                } else {
                    RunState::Cancelled
                });
                ctx.complete(success);
                hooks.did_finish_presenting();
            })),
        );

        // Phase B: linear resize of the detail content, concurrent with
        // the bounce but finishing earlier. The detail grows past the
        // floating container by the configured insets so that once the
        // container settles on the inset target the detail's absolute
        // frame is exactly the container bounds, and the completion's
        // plain reparent moves nothing visually.
        let settings = Rc::clone(&self.settings);
        let resize = timeline.animate(
            store,
            now,
            BlockParams::linear(duration.mul_f64(RESIZE_DURATION_FACTOR)),
            |s| {
                s.set_frame(
                    to_view,
                    Rect::new(-insets.x0, -insets.y0, w + insets.x1, h + insets.y1),
                );
                s.set_corner_radius(to_view, settings.details_corner_radius);
                if let Some(hook) = &settings.additional_card_view_animations {
                    hook(s, content, true);
                }
            },
        );

        tracer.phase_scheduled(&PhaseScheduledEvent {
            phase: TransitionPhase::Bounce,
            block: spring,
            duration_secs: self.profile.duration,
            delay_secs: 0.0,
        });
        tracer.phase_scheduled(&PhaseScheduledEvent {
            phase: TransitionPhase::Resize,
            block: resize,
            duration_secs: self.profile.duration * RESIZE_DURATION_FACTOR,
            delay_secs: 0.0,
        });

        self.spring_block = Some(spring);
        self.resize_block = Some(resize);
    }
}
