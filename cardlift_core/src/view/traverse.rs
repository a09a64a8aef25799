// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.
//!
//! Besides plain child iteration, this module provides the capability
//! search used by the transition drivers: [`find_role`] walks a subtree
//! looking for a view tagged with a given [`Role`], so a driver can locate
//! the card cell or detail content inside an arbitrary container without
//! the caller wiring every handle through.

use super::id::{INVALID, Role, ViewId};
use super::store::ViewStore;

/// An iterator over the direct children of a view, back-to-front.
///
/// Created by [`ViewStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a ViewStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a ViewStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(ViewId {
            idx,
            generation: self.store.generation[idx as usize],
        })
    }
}

/// Searches the subtree rooted at `root` (including `root` itself) in
/// depth-first pre-order, returning the first `Some` value produced by `f`.
pub fn find_map_descendant<T>(
    store: &ViewStore,
    root: ViewId,
    mut f: impl FnMut(&ViewStore, ViewId) -> Option<T>,
) -> Option<T> {
    find_map_inner(store, root, &mut f)
}

fn find_map_inner<T>(
    store: &ViewStore,
    id: ViewId,
    f: &mut impl FnMut(&ViewStore, ViewId) -> Option<T>,
) -> Option<T> {
    if let Some(value) = f(store, id) {
        return Some(value);
    }
    for child in store.children(id) {
        if let Some(value) = find_map_inner(store, child, f) {
            return Some(value);
        }
    }
    None
}

/// Returns the first view in the subtree rooted at `root` (pre-order,
/// including `root`) tagged with `role`.
#[must_use]
pub fn find_role(store: &ViewStore, root: ViewId, role: Role) -> Option<ViewId> {
    find_map_descendant(store, root, |store, id| {
        (store.role(id) == Some(role)).then_some(id)
    })
}
