// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View identity types.

use core::fmt;

/// Sentinel value indicating "no view" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a view in a [`ViewStore`](super::ViewStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a view is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter — must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl ViewId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewId({}@gen{})", self.idx, self.generation)
    }
}

/// Capability tag attached to a view so transition drivers can locate their
/// collaborators by depth-first search rather than by out-of-band wiring.
///
/// A view carries at most one role. Views without a role are plain content
/// and are skipped by [`find_role`](super::find_role).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// A compact card cell in the presenting grid.
    CardCell,
    /// The root view of the expanded detail screen.
    DetailRoot,
    /// The detail screen's card content view (resize target).
    DetailContent,
    /// The detail screen's scrollable view, if it has one.
    ScrollView,
    /// The temporary floating container owned by a running driver.
    FloatingContainer,
    /// The dimming backdrop behind the presented detail screen.
    Backdrop,
}
