// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition geometry captured from the live view tree.

use kurbo::{Insets, Rect};

use crate::view::{ViewId, ViewStore};

/// A source view's geometry frozen at transition start.
///
/// Created fresh per transition request by the coordinator, passed by value
/// into the chosen driver, and discarded when the transition ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometrySnapshot {
    /// The view's frame as currently rendered on screen, including any
    /// mid-flight transform (e.g. the press-scale shrink). Read from
    /// presentation values, because transforms may be animating.
    pub rendered_frame: Rect,
    /// The same view's frame with identity transform, in absolute screen
    /// coordinates. The dismissal target: the card returns exactly here
    /// even if the underlying list scrolled in the meantime.
    pub resting_frame: Rect,
}

impl GeometrySnapshot {
    /// Captures the snapshot for `view`, flushing any pending evaluation
    /// first so screen coordinates are current.
    pub fn capture(store: &mut ViewStore, view: ViewId) -> Self {
        let _ = store.evaluate();
        Self {
            rendered_frame: store.screen_frame(view),
            resting_frame: store.resting_frame(view),
        }
    }
}

/// Shrinks `rect` by edge insets (positive insets move edges inward).
///
/// Degenerate insets that would invert the rect collapse it to its center.
#[must_use]
pub fn inset_rect(rect: Rect, insets: Insets) -> Rect {
    let out = Rect::new(
        rect.x0 + insets.x0,
        rect.y0 + insets.y0,
        rect.x1 - insets.x1,
        rect.y1 - insets.y1,
    );
    if out.x0 > out.x1 || out.y0 > out.y1 {
        Rect::from_center_size(rect.center(), (0.0, 0.0))
    } else {
        out
    }
}
