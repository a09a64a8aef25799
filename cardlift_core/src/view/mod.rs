// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained view tree data model.
//!
//! A *view* is a node in a layout tree. Each view has:
//!
//! - An identity ([`ViewId`]) — a generational handle that becomes stale
//!   when the view is destroyed, preventing use-after-free bugs at the API
//!   level.
//! - Topology — parent, first-child, and sibling links forming an ordered
//!   tree. Sibling order is z-order: later children render on top.
//! - **Model properties** set by the caller:
//!   [`frame`](ViewStore::set_frame), [`transform`](ViewStore::set_transform),
//!   [`corner_radius`](ViewStore::set_corner_radius),
//!   [`opacity`](ViewStore::set_opacity),
//!   [`scroll_offset`](ViewStore::set_scroll_offset), and
//!   [`hidden`](ViewStore::set_hidden).
//! - **Presentation properties** — the values currently on screen. Model
//!   setters snap both values; the animation timeline rewrites presentation
//!   values each tick without disturbing the model.
//! - **Computed properties** produced by [`evaluate`](ViewStore::evaluate):
//!   `screen_frame` (absolute presentation frame with the view's transform
//!   applied about its center), `resting_frame` (absolute model frame with
//!   identity transform), and `effective_opacity` / `effective_hidden`
//!   (inherited from ancestors).
//!
//! Views are stored in struct-of-arrays layout with index-based handles
//! for cache-friendly traversal.
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding dirty channel
//! (see [`dirty`](crate::dirty)). The channels map to property categories:
//!
//! - **GEOMETRY** / **OPACITY** — propagate to all descendants, since
//!   absolute frames and effective opacities are inherited.
//! - **APPEARANCE** / **SCROLL** — local-only; only the modified view is
//!   marked.
//! - **TOPOLOGY** — structural changes (add/remove child, create/destroy
//!   view) that trigger a traversal-order rebuild.

mod evaluate;
mod id;
mod store;
mod traverse;

pub use evaluate::ViewChanges;
pub use id::{INVALID, Role, ViewId};
pub use store::ViewStore;
pub use traverse::{Children, find_map_descendant, find_role};
