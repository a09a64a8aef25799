// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays view storage with allocation, topology, and property
//! management.
//!
//! Every animatable property keeps two values: the *model* value (what the
//! caller last set) and the *presentation* value (what is currently on
//! screen). Model setters snap both; while an animation block is in flight
//! the [`Timeline`](crate::timeline::Timeline) rewrites presentation values
//! each tick. Geometry snapshots and evaluation read presentation values, so
//! mid-flight transforms are observed as rendered.

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, Role, ViewId};
use super::traverse::Children;
use crate::dirty;

/// Struct-of-arrays storage for all views.
///
/// Views are addressed by [`ViewId`] handles. Internally, each view occupies
/// a slot in parallel arrays. Destroyed views are recycled via a free list,
/// and generation counters prevent stale handle access. Sibling order is
/// z-order: later children render on top.
#[derive(Debug)]
pub struct ViewStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Model properties (set by callers) --
    pub(crate) frame: Vec<Rect>,
    pub(crate) transform: Vec<Affine>,
    pub(crate) corner_radius: Vec<f64>,
    pub(crate) opacity: Vec<f64>,
    pub(crate) scroll_offset: Vec<Point>,
    pub(crate) scroll_enabled: Vec<bool>,
    pub(crate) hidden: Vec<bool>,
    pub(crate) role: Vec<Option<Role>>,

    // -- Presentation properties (written by the timeline) --
    pub(crate) pres_frame: Vec<Rect>,
    pub(crate) pres_transform: Vec<Affine>,
    pub(crate) pres_corner_radius: Vec<f64>,
    pub(crate) pres_opacity: Vec<f64>,
    pub(crate) pres_scroll_offset: Vec<Point>,

    // -- Computed properties (written by evaluate) --
    pub(crate) pres_abs: Vec<Rect>,
    pub(crate) screen_frame: Vec<Rect>,
    pub(crate) resting_frame: Vec<Rect>,
    pub(crate) effective_hidden: Vec<bool>,
    pub(crate) effective_opacity: Vec<f64>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStore {
    /// Creates an empty view store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            frame: Vec::new(),
            transform: Vec::new(),
            corner_radius: Vec::new(),
            opacity: Vec::new(),
            scroll_offset: Vec::new(),
            scroll_enabled: Vec::new(),
            hidden: Vec::new(),
            role: Vec::new(),
            pres_frame: Vec::new(),
            pres_transform: Vec::new(),
            pres_corner_radius: Vec::new(),
            pres_opacity: Vec::new(),
            pres_scroll_offset: Vec::new(),
            pres_abs: Vec::new(),
            screen_frame: Vec::new(),
            resting_frame: Vec::new(),
            effective_hidden: Vec::new(),
            effective_opacity: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new view and returns its handle.
    ///
    /// The view starts with a zero frame, identity transform, zero corner
    /// radius, full opacity, scrolling enabled, visible, no role, and no
    /// parent.
    pub fn create_view(&mut self) -> ViewId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.reset_slot(idx);
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.frame.push(Rect::ZERO);
            self.transform.push(Affine::IDENTITY);
            self.corner_radius.push(0.0);
            self.opacity.push(1.0);
            self.scroll_offset.push(Point::ZERO);
            self.scroll_enabled.push(true);
            self.hidden.push(false);
            self.role.push(None);
            self.pres_frame.push(Rect::ZERO);
            self.pres_transform.push(Affine::IDENTITY);
            self.pres_corner_radius.push(0.0);
            self.pres_opacity.push(1.0);
            self.pres_scroll_offset.push(Point::ZERO);
            self.pres_abs.push(Rect::ZERO);
            self.screen_frame.push(Rect::ZERO);
            self.resting_frame.push(Rect::ZERO);
            self.effective_hidden.push(false);
            self.effective_opacity.push(1.0);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        ViewId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    fn reset_slot(&mut self, idx: u32) {
        let i = idx as usize;
        self.parent[i] = INVALID;
        self.first_child[i] = INVALID;
        self.next_sibling[i] = INVALID;
        self.prev_sibling[i] = INVALID;
        self.frame[i] = Rect::ZERO;
        self.transform[i] = Affine::IDENTITY;
        self.corner_radius[i] = 0.0;
        self.opacity[i] = 1.0;
        self.scroll_offset[i] = Point::ZERO;
        self.scroll_enabled[i] = true;
        self.hidden[i] = false;
        self.role[i] = None;
        self.pres_frame[i] = Rect::ZERO;
        self.pres_transform[i] = Affine::IDENTITY;
        self.pres_corner_radius[i] = 0.0;
        self.pres_opacity[i] = 1.0;
        self.pres_scroll_offset[i] = Point::ZERO;
        self.pres_abs[i] = Rect::ZERO;
        self.screen_frame[i] = Rect::ZERO;
        self.resting_frame[i] = Rect::ZERO;
        self.effective_hidden[i] = false;
        self.effective_opacity[i] = 1.0;
    }

    /// Destroys a view, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the view has children (remove them first, or use
    /// [`destroy_subtree`](Self::destroy_subtree)) or if the handle is
    /// stale.
    pub fn destroy_view(&mut self, id: ViewId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy view with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Destroys a view and all of its descendants, leaf-first.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_subtree(&mut self, id: ViewId) {
        self.validate(id);
        let mut post_order = Vec::new();
        self.collect_post_order(id.idx, &mut post_order);
        for idx in post_order {
            let handle = ViewId {
                idx,
                generation: self.generation[idx as usize],
            };
            self.destroy_view(handle);
        }
    }

    fn collect_post_order(&self, idx: u32, out: &mut Vec<u32>) {
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.collect_post_order(child, out);
            child = self.next_sibling[child as usize];
        }
        out.push(idx);
    }

    /// Returns whether the given handle refers to a live view.
    #[must_use]
    pub fn is_alive(&self, id: ViewId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent` (topmost in z-order).
    ///
    /// Marks inherited channels for `child`'s subtree so screen frames,
    /// effective opacity, and effective hidden state are recomputed under
    /// the new ancestry.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: ViewId, child: ViewId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.link_as_last_child(p, c);

        let _ = self.dirty.add_dependency(c, p, dirty::GEOMETRY);
        let _ = self.dirty.add_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from its current parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the view has no parent.
    pub fn remove_from_parent(&mut self, child: ViewId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "view has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);

        self.dirty.remove_dependency(c, p, dirty::GEOMETRY);
        self.dirty.remove_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Moves `child` to be the last child of `new_parent`, detaching it from
    /// its current parent first if it has one.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn reparent(&mut self, child: ViewId, new_parent: ViewId) {
        self.validate(child);
        self.validate(new_parent);

        if self.parent[child.idx as usize] != INVALID {
            let old_p = self.parent[child.idx as usize];
            self.unlink_from_parent(child.idx);
            self.dirty
                .remove_dependency(child.idx, old_p, dirty::GEOMETRY);
            self.dirty
                .remove_dependency(child.idx, old_p, dirty::OPACITY);
            self.dirty.mark(old_p, dirty::TOPOLOGY);
        }

        let p = new_parent.idx;
        let c = child.idx;
        self.link_as_last_child(p, c);

        let _ = self.dirty.add_dependency(c, p, dirty::GEOMETRY);
        let _ = self.dirty.add_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a view, if any.
    #[must_use]
    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(ViewId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of a view, back-to-front.
    #[must_use]
    pub fn children(&self, id: ViewId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    // -- Property getters (model values) --

    /// Returns the model frame of a view, in parent coordinates.
    #[must_use]
    pub fn frame(&self, id: ViewId) -> Rect {
        self.validate(id);
        self.frame[id.idx as usize]
    }

    /// Returns the view's bounds: its frame's size at the local origin.
    #[must_use]
    pub fn bounds(&self, id: ViewId) -> Rect {
        self.frame(id).size().to_rect()
    }

    /// Returns the model transform of a view.
    #[must_use]
    pub fn transform(&self, id: ViewId) -> Affine {
        self.validate(id);
        self.transform[id.idx as usize]
    }

    /// Returns the model corner radius of a view.
    #[must_use]
    pub fn corner_radius(&self, id: ViewId) -> f64 {
        self.validate(id);
        self.corner_radius[id.idx as usize]
    }

    /// Returns the model opacity of a view.
    #[must_use]
    pub fn opacity(&self, id: ViewId) -> f64 {
        self.validate(id);
        self.opacity[id.idx as usize]
    }

    /// Returns the model scroll offset of a view.
    #[must_use]
    pub fn scroll_offset(&self, id: ViewId) -> Point {
        self.validate(id);
        self.scroll_offset[id.idx as usize]
    }

    /// Returns whether scrolling is enabled on a view.
    #[must_use]
    pub fn scroll_enabled(&self, id: ViewId) -> bool {
        self.validate(id);
        self.scroll_enabled[id.idx as usize]
    }

    /// Returns whether the view's own hidden flag is set.
    #[must_use]
    pub fn hidden(&self, id: ViewId) -> bool {
        self.validate(id);
        self.hidden[id.idx as usize]
    }

    /// Returns the capability role of a view, if any.
    #[must_use]
    pub fn role(&self, id: ViewId) -> Option<Role> {
        self.validate(id);
        self.role[id.idx as usize]
    }

    // -- Property getters (presentation values) --

    /// Returns the presentation frame (what is currently on screen).
    #[must_use]
    pub fn presented_frame(&self, id: ViewId) -> Rect {
        self.validate(id);
        self.pres_frame[id.idx as usize]
    }

    /// Returns the presentation transform.
    #[must_use]
    pub fn presented_transform(&self, id: ViewId) -> Affine {
        self.validate(id);
        self.pres_transform[id.idx as usize]
    }

    /// Returns the presentation corner radius.
    #[must_use]
    pub fn presented_corner_radius(&self, id: ViewId) -> f64 {
        self.validate(id);
        self.pres_corner_radius[id.idx as usize]
    }

    /// Returns the presentation opacity.
    #[must_use]
    pub fn presented_opacity(&self, id: ViewId) -> f64 {
        self.validate(id);
        self.pres_opacity[id.idx as usize]
    }

    /// Returns the presentation scroll offset.
    #[must_use]
    pub fn presented_scroll_offset(&self, id: ViewId) -> Point {
        self.validate(id);
        self.pres_scroll_offset[id.idx as usize]
    }

    // -- Property getters (computed; valid after `evaluate`) --

    /// Returns the absolute on-screen frame from presentation values,
    /// including the view's own transform (applied about its center).
    #[must_use]
    pub fn screen_frame(&self, id: ViewId) -> Rect {
        self.validate(id);
        self.screen_frame[id.idx as usize]
    }

    /// Returns the absolute frame from model values with identity
    /// transform: where the view rests when nothing is animating.
    #[must_use]
    pub fn resting_frame(&self, id: ViewId) -> Rect {
        self.validate(id);
        self.resting_frame[id.idx as usize]
    }

    /// Returns whether the view is effectively hidden (including by an
    /// ancestor's hidden flag).
    #[must_use]
    pub fn effective_hidden(&self, id: ViewId) -> bool {
        self.validate(id);
        self.effective_hidden[id.idx as usize]
    }

    /// Returns the computed effective opacity of a view.
    #[must_use]
    pub fn effective_opacity(&self, id: ViewId) -> f64 {
        self.validate(id);
        self.effective_opacity[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty; presentation snaps to model) --

    /// Sets the frame of a view, in parent coordinates.
    pub fn set_frame(&mut self, id: ViewId, frame: Rect) {
        self.validate(id);
        self.frame[id.idx as usize] = frame;
        self.pres_frame[id.idx as usize] = frame;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Sets the transform of a view (applied about the view's center).
    pub fn set_transform(&mut self, id: ViewId, transform: Affine) {
        self.validate(id);
        self.transform[id.idx as usize] = transform;
        self.pres_transform[id.idx as usize] = transform;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Sets the rounded-corner clip radius of a view.
    pub fn set_corner_radius(&mut self, id: ViewId, radius: f64) {
        self.validate(id);
        self.corner_radius[id.idx as usize] = radius;
        self.pres_corner_radius[id.idx as usize] = radius;
        self.dirty.mark(id.idx, dirty::APPEARANCE);
    }

    /// Sets the local opacity of a view.
    pub fn set_opacity(&mut self, id: ViewId, opacity: f64) {
        self.validate(id);
        self.opacity[id.idx as usize] = opacity;
        self.pres_opacity[id.idx as usize] = opacity;
        self.dirty.mark_with(id.idx, dirty::OPACITY, &EagerPolicy);
    }

    /// Sets the scroll offset of a view.
    pub fn set_scroll_offset(&mut self, id: ViewId, offset: Point) {
        self.validate(id);
        self.scroll_offset[id.idx as usize] = offset;
        self.pres_scroll_offset[id.idx as usize] = offset;
        self.dirty.mark(id.idx, dirty::SCROLL);
    }

    /// Enables or disables scrolling on a view.
    pub fn set_scroll_enabled(&mut self, id: ViewId, enabled: bool) {
        self.validate(id);
        self.scroll_enabled[id.idx as usize] = enabled;
        self.dirty.mark(id.idx, dirty::SCROLL);
    }

    /// Sets the view's hidden flag, suppressing its subtree visually.
    ///
    /// Properties can still be mutated while hidden; unhiding restores
    /// state immediately.
    pub fn set_hidden(&mut self, id: ViewId, hidden: bool) {
        self.validate(id);
        self.hidden[id.idx as usize] = hidden;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Tags the view with a capability role.
    pub fn set_role(&mut self, id: ViewId, role: Option<Role>) {
        self.validate(id);
        self.role[id.idx as usize] = role;
    }

    // -- Presentation writes (timeline only) --

    /// Whether the raw slot currently holds a live view.
    pub(crate) fn slot_alive(&self, idx: u32) -> bool {
        idx < self.len && !self.free_list.contains(&idx)
    }

    pub(crate) fn write_pres_frame(&mut self, idx: u32, frame: Rect) {
        self.pres_frame[idx as usize] = frame;
        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
    }

    pub(crate) fn write_pres_transform(&mut self, idx: u32, transform: Affine) {
        self.pres_transform[idx as usize] = transform;
        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
    }

    pub(crate) fn write_pres_corner_radius(&mut self, idx: u32, radius: f64) {
        self.pres_corner_radius[idx as usize] = radius;
        self.dirty.mark(idx, dirty::APPEARANCE);
    }

    pub(crate) fn write_pres_opacity(&mut self, idx: u32, opacity: f64) {
        self.pres_opacity[idx as usize] = opacity;
        self.dirty.mark_with(idx, dirty::OPACITY, &EagerPolicy);
    }

    pub(crate) fn write_pres_scroll_offset(&mut self, idx: u32, offset: Point) {
        self.pres_scroll_offset[idx as usize] = offset;
        self.dirty.mark(idx, dirty::SCROLL);
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: ViewId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale ViewId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn link_as_last_child(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list without touching dirty
    /// state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Marks the subtree rooted at `idx` dirty for inherited channels.
    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::OPACITY, &EagerPolicy);
    }
}
