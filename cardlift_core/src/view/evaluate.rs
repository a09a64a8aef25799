// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree evaluation and change tracking.
//!
//! Evaluation follows a drain-recompute pattern for each dirty channel:
//!
//! 1. **GEOMETRY** — Drain dirty indices, recompute each view's absolute
//!    presentation frame by chaining parent frame origins, then its
//!    `screen_frame` by applying the view's own transform about its
//!    center, then its `resting_frame` from model frames with identity
//!    transform, and finally `effective_hidden` as
//!    `parent_effective_hidden || hidden`.
//! 2. **OPACITY** — Drain dirty indices, recompute each view's
//!    `effective_opacity` as `parent_effective * local_opacity`.
//! 3. **APPEARANCE** / **SCROLL** — Drain dirty indices (no recomputation;
//!    consumers read the current values directly from the store).
//! 4. **TOPOLOGY** — Drain and discard (the traversal order was already
//!    rebuilt at the start of evaluation if needed).
//!
//! [`ViewChanges`] uses raw slot indices (`u32`) rather than [`ViewId`]
//! handles so downstream consumers can index the store's SoA arrays without
//! paying for generation checks on every access.
//!
//! [`ViewId`]: super::ViewId

use alloc::vec::Vec;

use kurbo::{Affine, Rect};

use super::id::INVALID;
use super::store::ViewStore;
use crate::dirty;

/// The set of changes produced by a single [`ViewStore::evaluate`] call.
///
/// Each field contains the raw slot indices of views that changed in the
/// corresponding category.
#[derive(Clone, Debug, Default)]
pub struct ViewChanges {
    /// Views whose screen or resting frame was recomputed.
    pub geometry: Vec<u32>,
    /// Views whose effective opacity was recomputed.
    pub opacities: Vec<u32>,
    /// Views whose corner radius changed.
    pub appearance: Vec<u32>,
    /// Views whose scroll offset or scrollability changed.
    pub scrolls: Vec<u32>,
    /// Views that transitioned from visible to effectively hidden.
    pub hidden: Vec<u32>,
    /// Views that transitioned from effectively hidden to visible.
    pub unhidden: Vec<u32>,
    /// Views added since the last evaluate.
    pub added: Vec<u32>,
    /// Views removed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl ViewChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.geometry.clear();
        self.opacities.clear();
        self.appearance.clear();
        self.scrolls.clear();
        self.hidden.clear();
        self.unhidden.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }
}

/// Translates `rect` so its origin sits at `parent_origin + rect.origin`.
fn chain(rect: Rect, parent: Rect) -> Rect {
    Rect::new(
        parent.x0 + rect.x0,
        parent.y0 + rect.y0,
        parent.x0 + rect.x1,
        parent.y0 + rect.y1,
    )
}

/// Applies `transform` about the center of `rect` and returns the bounding
/// box of the result.
pub(crate) fn transform_about_center(rect: Rect, transform: Affine) -> Rect {
    if transform == Affine::IDENTITY {
        return rect;
    }
    let c = rect.center();
    let about_center =
        Affine::translate(c.to_vec2()) * transform * Affine::translate(-c.to_vec2());
    about_center.transform_rect_bbox(rect)
}

impl ViewStore {
    /// Evaluates the view tree, recomputing dirty properties and returning
    /// the set of changes.
    ///
    /// This rebuilds the traversal order if topology changed, then drains
    /// each dirty channel and recomputes absolute frames and effective
    /// opacities in parent-before-child order.
    pub fn evaluate(&mut self) -> ViewChanges {
        let mut changes = ViewChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided
    /// buffer to avoid allocation.
    pub fn evaluate_into(&mut self, changes: &mut ViewChanges) {
        changes.clear();

        // Rebuild traversal order if needed.
        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        // Drain GEOMETRY channel — collect dirty indices, then recompute.
        let dirty_geometry: Vec<u32> = self
            .dirty
            .drain(dirty::GEOMETRY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_geometry {
            let parent_idx = self.parent[idx as usize];
            let (parent_abs, parent_resting, parent_hidden) = if parent_idx != INVALID {
                (
                    self.pres_abs[parent_idx as usize],
                    self.resting_frame[parent_idx as usize],
                    self.effective_hidden[parent_idx as usize],
                )
            } else {
                (Rect::ZERO, Rect::ZERO, false)
            };

            // Child positions chain off the parent's untransformed origin;
            // only the view's own transform contributes to its screen frame.
            let abs = chain(self.pres_frame[idx as usize], parent_abs);
            self.pres_abs[idx as usize] = abs;
            self.screen_frame[idx as usize] =
                transform_about_center(abs, self.pres_transform[idx as usize]);
            self.resting_frame[idx as usize] = chain(self.frame[idx as usize], parent_resting);

            let new_hidden = parent_hidden || self.hidden[idx as usize];
            let old_hidden = self.effective_hidden[idx as usize];
            if new_hidden != old_hidden {
                if new_hidden {
                    changes.hidden.push(idx);
                } else {
                    changes.unhidden.push(idx);
                }
                self.effective_hidden[idx as usize] = new_hidden;
            }
        }
        changes.geometry = dirty_geometry;

        // Drain OPACITY channel.
        let dirty_opacities: Vec<u32> = self
            .dirty
            .drain(dirty::OPACITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_opacities {
            let parent_opacity = if self.parent[idx as usize] != INVALID {
                self.effective_opacity[self.parent[idx as usize] as usize]
            } else {
                1.0
            };
            self.effective_opacity[idx as usize] =
                parent_opacity * self.pres_opacity[idx as usize];
        }
        changes.opacities = dirty_opacities;

        // Drain APPEARANCE channel — no recomputation, just collect.
        changes.appearance = self
            .dirty
            .drain(dirty::APPEARANCE)
            .deterministic()
            .run()
            .collect();

        // Drain SCROLL channel.
        changes.scrolls = self
            .dirty
            .drain(dirty::SCROLL)
            .deterministic()
            .run()
            .collect();

        // Drain TOPOLOGY channel (just consume, changes are structural).
        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        // Move lifecycle lists.
        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// Returns the current traversal order (depth-first pre-order).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called at
    /// least once.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    /// Rebuilds the depth-first pre-order traversal of all live views.
    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        // Start from roots.
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    /// Depth-first pre-order collection starting from `idx`.
    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}
