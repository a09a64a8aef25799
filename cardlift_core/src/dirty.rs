// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Cardlift uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! propagate invalidation through the view tree. Each channel represents an
//! independent category of change.
//!
//! # Propagation semantics
//!
//! - **Propagating** — [`GEOMETRY`] and [`OPACITY`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have dependency
//!   edges from child to parent. Marking a parent dirty automatically marks
//!   all descendants, because screen frames, resting frames, effective
//!   opacities, and effective hidden state are inherited properties.
//!   (Hidden-flag and transform changes are routed through [`GEOMETRY`] so
//!   one drain pass recomputes frames and `effective_hidden` together.)
//!
//! - **Local-only** — [`APPEARANCE`] (corner radius) and [`SCROLL`] (offset
//!   and enablement) are marked with the default policy. Only the explicitly
//!   marked view appears in the drain output.
//!
//! - **Structural** — [`TOPOLOGY`] is marked on topology mutations and
//!   triggers a traversal-order rebuild during evaluation.
//!
//! Callers never query dirty state directly: each
//! [`ViewStore::evaluate`](crate::view::ViewStore::evaluate) call drains all
//! channels and surfaces the results as
//! [`ViewChanges`](crate::view::ViewChanges).

use understory_dirty::Channel;

/// Frame, transform, or hidden flag changed — requires screen/resting frame
/// and effective hidden recomputation for descendants.
pub const GEOMETRY: Channel = Channel::new(0);

/// Opacity changed — requires effective opacity recomputation for
/// descendants.
pub const OPACITY: Channel = Channel::new(1);

/// Corner radius changed — no propagation needed.
pub const APPEARANCE: Channel = Channel::new(2);

/// Scroll offset or enablement changed — no propagation needed.
pub const SCROLL: Channel = Channel::new(3);

/// Tree topology changed — triggers traversal order rebuild.
pub const TOPOLOGY: Channel = Channel::new(4);
