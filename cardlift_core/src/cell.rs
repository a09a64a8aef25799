// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The card cell: the compact grid element a transition expands from.

use alloc::rc::Rc;

use kurbo::Affine;

use crate::settings::TransitionSettings;
use crate::spring::SpringProfile;
use crate::time::{Duration, HostTime};
use crate::timeline::{BlockParams, Timeline};
use crate::view::{Role, ViewId, ViewStore};

/// Duration of the press highlight animation, in seconds.
const HIGHLIGHT_DURATION: f64 = 0.5;

/// A cell in the card grid, wrapping its view handles and shared settings.
///
/// The cell owns its press-highlight behavior: touching a card shrinks it
/// slightly with a non-bouncy spring, releasing restores it. While a
/// transition runs, the coordinator freezes highlighting so the cell's own
/// animation cannot fight the expansion geometry.
#[derive(Debug)]
pub struct CardCell {
    view: ViewId,
    content_view: ViewId,
    settings: Rc<TransitionSettings>,
    highlight_frozen: bool,
}

impl CardCell {
    /// Wraps an existing view as a card cell, tagging it with
    /// [`Role::CardCell`].
    pub fn new(
        store: &mut ViewStore,
        view: ViewId,
        content_view: ViewId,
        settings: Rc<TransitionSettings>,
    ) -> Self {
        store.set_role(view, Some(Role::CardCell));
        Self {
            view,
            content_view,
            settings,
            highlight_frozen: false,
        }
    }

    /// The cell's root view.
    #[must_use]
    pub fn view(&self) -> ViewId {
        self.view
    }

    /// The cell's content sub-view (what visually matches the detail
    /// content at transition start).
    #[must_use]
    pub fn content_view(&self) -> ViewId {
        self.content_view
    }

    /// The settings shared across the modal session.
    #[must_use]
    pub fn settings(&self) -> &Rc<TransitionSettings> {
        &self.settings
    }

    /// Whether hosts should keep delivering touches while the highlight
    /// scale is applied.
    #[must_use]
    pub fn allows_interaction_while_highlighted(&self) -> bool {
        self.settings
            .is_enabled_allows_user_interaction_while_highlighting_card
    }

    /// Animates the press-highlight scale in or out.
    ///
    /// Ignored while highlighting is frozen (a transition is running).
    pub fn animate_highlight(
        &self,
        timeline: &mut Timeline,
        store: &mut ViewStore,
        now: HostTime,
        highlighted: bool,
    ) {
        if self.highlight_frozen {
            return;
        }
        let transform = if highlighted {
            Affine::scale(self.settings.card_highlighted_factor)
        } else {
            Affine::IDENTITY
        };
        // Critically damped so the press scale never overshoots.
        let profile = SpringProfile {
            damping: 1.0,
            duration: HIGHLIGHT_DURATION,
            initial_velocity: 0.0,
        };
        let params = BlockParams::new(
            profile.curve(),
            Duration::from_secs_f64(HIGHLIGHT_DURATION, timeline.timebase()),
        );
        let view = self.view;
        timeline.animate(store, now, params, |s| {
            s.set_transform(view, transform);
        });
    }

    /// Suppresses highlight animations until
    /// [`unfreeze_animations`](Self::unfreeze_animations).
    pub fn freeze_animations(&mut self) {
        self.highlight_frozen = true;
    }

    /// Resumes highlight animations.
    pub fn unfreeze_animations(&mut self) {
        self.highlight_frozen = false;
    }

    /// Whether highlight animations are currently suppressed.
    #[must_use]
    pub fn animations_frozen(&self) -> bool {
        self.highlight_frozen
    }

    /// Snaps the cell back to identity transform without animating, so a
    /// following geometry capture sees the resting shape.
    pub fn reset_transform(&self, store: &mut ViewStore) {
        store.set_transform(self.view, Affine::IDENTITY);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use crate::detail::NoopLifecycle;
    use crate::time::Timebase;

    use super::*;

    fn fixture() -> (Timeline, ViewStore, CardCell) {
        let mut store = ViewStore::new();
        let view = store.create_view();
        let content = store.create_view();
        store.add_child(view, content);
        store.set_frame(view, Rect::new(20.0, 500.0, 180.0, 700.0));
        let cell = CardCell::new(
            &mut store,
            view,
            content,
            Rc::new(TransitionSettings::default()),
        );
        (Timeline::new(Timebase::NANOS), store, cell)
    }

    #[test]
    fn new_tags_the_role() {
        let (_, store, cell) = fixture();
        assert_eq!(store.role(cell.view()), Some(Role::CardCell));
    }

    #[test]
    fn highlight_targets_scale_from_settings() {
        let (mut tl, mut store, cell) = fixture();
        cell.animate_highlight(&mut tl, &mut store, HostTime(0), true);
        assert_eq!(store.transform(cell.view()), Affine::scale(0.96));
        // Presentation is still identity until the block plays out.
        assert_eq!(store.presented_transform(cell.view()), Affine::IDENTITY);

        let mut hooks = NoopLifecycle;
        tl.tick(HostTime(600_000_000), &mut store, &mut hooks);
        assert!(tl.is_idle());
        assert_eq!(store.presented_transform(cell.view()), Affine::scale(0.96));
    }

    #[test]
    fn highlight_scale_never_overshoots_the_target() {
        let (mut tl, mut store, cell) = fixture();
        cell.animate_highlight(&mut tl, &mut store, HostTime(0), true);
        let mut hooks = NoopLifecycle;
        // Sample across the whole highlight; a critically damped spring
        // stays between identity and the pressed scale throughout.
        for ms in (0..=500).step_by(25) {
            tl.tick(HostTime(ms * 1_000_000), &mut store, &mut hooks);
            let scale = store.presented_transform(cell.view()).as_coeffs()[0];
            assert!(
                (0.96..=1.0).contains(&scale),
                "scale {scale} out of range at {ms} ms"
            );
        }
    }

    #[test]
    fn unhighlight_restores_identity() {
        let (mut tl, mut store, cell) = fixture();
        let mut hooks = NoopLifecycle;
        cell.animate_highlight(&mut tl, &mut store, HostTime(0), true);
        tl.tick(HostTime(600_000_000), &mut store, &mut hooks);

        cell.animate_highlight(&mut tl, &mut store, HostTime(600_000_000), false);
        tl.tick(HostTime(1_200_000_000), &mut store, &mut hooks);
        assert_eq!(store.presented_transform(cell.view()), Affine::IDENTITY);
    }

    #[test]
    fn frozen_cell_ignores_highlight() {
        let (mut tl, mut store, mut cell) = fixture();
        cell.freeze_animations();
        cell.animate_highlight(&mut tl, &mut store, HostTime(0), true);
        assert!(tl.is_idle());
        assert_eq!(store.transform(cell.view()), Affine::IDENTITY);

        cell.unfreeze_animations();
        cell.animate_highlight(&mut tl, &mut store, HostTime(0), true);
        assert!(!tl.is_idle());
    }

    #[test]
    fn reset_transform_snaps_without_animation() {
        let (mut tl, mut store, cell) = fixture();
        cell.animate_highlight(&mut tl, &mut store, HostTime(0), true);
        cell.reset_transform(&mut store);
        assert_eq!(store.transform(cell.view()), Affine::IDENTITY);
        assert_eq!(store.presented_transform(cell.view()), Affine::IDENTITY);
    }
}
