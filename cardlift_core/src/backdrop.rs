// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The dimming backdrop behind a presented detail screen.
//!
//! The backdrop is a plain view owned by the coordinator, inserted under
//! the container before any transition views so it draws behind them. It
//! fades in over the first half of the present transition and fades out
//! over a late slice of the dismiss transition; it is destroyed only at
//! teardown, after a completed dismissal, so a cancelled dismiss keeps it
//! dimmed.

use alloc::rc::Rc;

use crate::settings::TransitionSettings;
use crate::time::{Duration, HostTime};
use crate::timeline::{BlockId, BlockParams, Timeline};
use crate::trace::{PhaseScheduledEvent, Tracer, TransitionPhase};
use crate::view::{Role, ViewId, ViewStore};

/// Fade-in runs over the first half of the present transition.
const FADE_IN_DURATION_FACTOR: f64 = 0.5;
/// Fade-out duration as a share of the dismiss transition.
const FADE_OUT_DURATION_FACTOR: f64 = 0.3;
/// Fade-out start offset as a share of the dismiss transition.
const FADE_OUT_DELAY_FACTOR: f64 = 0.2;

/// Owns the backdrop view across a present/dismiss pair.
#[derive(Debug)]
pub struct BackdropController {
    settings: Rc<TransitionSettings>,
    view: Option<ViewId>,
    fade_block: Option<BlockId>,
}

impl BackdropController {
    /// A controller with no backdrop view yet.
    #[must_use]
    pub fn new(settings: Rc<TransitionSettings>) -> Self {
        Self {
            settings,
            view: None,
            fade_block: None,
        }
    }

    /// The backdrop view, once created.
    #[must_use]
    pub fn view(&self) -> Option<ViewId> {
        self.view
    }

    /// The most recently scheduled fade block.
    #[must_use]
    pub fn fade_block(&self) -> Option<BlockId> {
        self.fade_block
    }

    /// Creates the backdrop (transparent, filling `container`) if needed
    /// and fades it up to the configured alpha.
    pub fn fade_in(
        &mut self,
        timeline: &mut Timeline,
        store: &mut ViewStore,
        now: HostTime,
        container: ViewId,
        transition_duration: f64,
        tracer: &mut Tracer<'_>,
    ) {
        let view = match self.view {
            Some(view) if store.is_alive(view) => view,
            _ => {
                let view = store.create_view();
                store.set_role(view, Some(Role::Backdrop));
                store.set_frame(view, store.bounds(container));
                store.set_opacity(view, 0.0);
                store.add_child(container, view);
                self.view = Some(view);
                view
            }
        };

        let duration = Duration::from_secs_f64(
            transition_duration * FADE_IN_DURATION_FACTOR,
            timeline.timebase(),
        );
        let alpha = self.settings.backdrop_alpha;
        let block = timeline.animate(store, now, BlockParams::linear(duration), |s| {
            s.set_opacity(view, alpha);
        });
        tracer.phase_scheduled(&PhaseScheduledEvent {
            phase: TransitionPhase::BackdropFade,
            block,
            duration_secs: transition_duration * FADE_IN_DURATION_FACTOR,
            delay_secs: 0.0,
        });
        self.fade_block = Some(block);
    }

    /// Fades the backdrop out over a late slice of the dismiss transition.
    /// The view itself survives until [`teardown`](Self::teardown) so a
    /// cancelled dismiss can simply fade back in.
    pub fn fade_out(
        &mut self,
        timeline: &mut Timeline,
        store: &mut ViewStore,
        now: HostTime,
        transition_duration: f64,
        tracer: &mut Tracer<'_>,
    ) {
        let Some(view) = self.view.filter(|&v| store.is_alive(v)) else {
            return;
        };
        let duration = Duration::from_secs_f64(
            transition_duration * FADE_OUT_DURATION_FACTOR,
            timeline.timebase(),
        );
        let delay = Duration::from_secs_f64(
            transition_duration * FADE_OUT_DELAY_FACTOR,
            timeline.timebase(),
        );
        let block = timeline.animate(
            store,
            now,
            BlockParams::linear(duration).with_delay(delay),
            |s| {
                s.set_opacity(view, 0.0);
            },
        );
        tracer.phase_scheduled(&PhaseScheduledEvent {
            phase: TransitionPhase::BackdropFade,
            block,
            duration_secs: transition_duration * FADE_OUT_DURATION_FACTOR,
            delay_secs: transition_duration * FADE_OUT_DELAY_FACTOR,
        });
        self.fade_block = Some(block);
    }

    /// Destroys the backdrop view. Called by the coordinator after a
    /// completed dismissal.
    pub fn teardown(&mut self, store: &mut ViewStore) {
        if let Some(view) = self.view.take()
            && store.is_alive(view)
        {
            store.remove_from_parent(view);
            store.destroy_view(view);
        }
        self.fade_block = None;
    }
}
