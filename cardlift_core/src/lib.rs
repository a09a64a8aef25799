// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Card-expansion transition engine over a retained view tree.
//!
//! `cardlift_core` implements the store-style card transition: a compact
//! card in a grid expands into a full-screen detail view with a spring
//! bounce, and collapses back onto the card on dismissal. It is `no_std`
//! compatible (with `alloc`) and uses array-based struct-of-arrays storage
//! with generational handles for the view tree.
//!
//! # Architecture
//!
//! The crate is organized around a host-driven frame loop:
//!
//! ```text
//!   CardTransition::present()/dismiss()
//!       │
//!       ▼
//!   Driver ──► Timeline blocks (spring + linear phases)
//!                   │
//!   host frame ──► Timeline::tick() ──► presentation rewrite
//!                   │
//!                   ▼
//!   ViewStore::evaluate() ──► ViewChanges ──► host renderer
//! ```
//!
//! **[`view`]** — Struct-of-arrays view tree with generational handles and
//! a model/presentation property split. Model setters snap presentation;
//! the timeline rewrites presentation during flight. Evaluation resolves
//! absolute geometry, screen frames, and effective opacity through
//! multi-channel dirty tracking (`understory_dirty`).
//!
//! **[`timeline`]** — Block-based animation scheduler. A block captures a
//! presentation baseline, runs a mutation against the model, diffs, and
//! replays the difference over time under a [`Curve`](timeline::Curve).
//!
//! **[`spring`]** — Spring profile derivation: damping ratio and duration
//! from the card's vertical travel, and the closed-form underdamped
//! response used as a timing curve.
//!
//! **[`present`] / [`dismiss`]** — The two transition drivers. Each builds
//! a transient floating container and schedules the phase blocks; their
//! completions perform the reparent/cleanup protocol and report the
//! outcome.
//!
//! **[`transition`]** — The [`CardTransition`](transition::CardTransition)
//! coordinator: freezes the cell, captures geometry, owns the backdrop,
//! and tracks the present/dismiss state machine.
//!
//! **[`cell`] / [`detail`]** — The card-cell capability (press highlight,
//! freeze protocol) and the detail-screen lifecycle hooks.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types
//! for transition instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backdrop;
pub mod cell;
pub mod context;
pub mod detail;
pub mod dirty;
pub mod dismiss;
pub mod geometry;
pub mod present;
pub mod settings;
pub mod spring;
pub mod time;
pub mod timeline;
pub mod trace;
pub mod transition;
pub mod view;
