// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational handles, layers, animators, and renderer state for a
//! retained-mode UI.
//!
//! `armature_core` provides the data and event plumbing that sits between an
//! application's retained UI description and whatever actually renders it.
//! It is `no_std` compatible (with `alloc`) and keeps all bookkeeping in
//! slot-indexed storage addressed by packed generational handles.
//!
//! # Architecture
//!
//! The crate is organized around a per-frame protocol driven by an external
//! orchestrator (node tree, event routing, and frame loop live outside this
//! crate):
//!
//! ```text
//!   Orchestrator (frame loop)
//!       │
//!       ▼
//!   Layer::state() ──► clean_nodes() / clean_data()
//!       │
//!       ▼
//!   Animator::advance() ──► active/factor/remove masks ──► clean()
//!       │
//!       ▼
//!   Layer::update(consumed states) ──► Renderer::transition()
//!                                          │
//!                                          ▼
//!                                 Layer::draw() / composite()
//! ```
//!
//! **[`handle`]** — Packed `(index, generation)` handle newtypes. Full
//! handles ([`DataHandle`](handle::DataHandle),
//! [`AnimationHandle`](handle::AnimationHandle)) embed the owning instance's
//! handle so they never validate against a foreign instance.
//!
//! **[`pool`]** — The generational slot allocator behind both stores: FIFO
//! slot reuse, 12-bit generations, permanent retirement on generation wrap.
//!
//! **[`time`]** — Signed integer nanoseconds. Animation math stays integral
//! until the final factor division.
//!
//! **[`layer`]** — Data ownership and dirty-state aggregation. A layer owns
//! data slots, tracks a [`LayerStates`](layer::LayerStates) bitmask, and
//! dispatches update/draw/composite/event work through capability-gated
//! hooks with no-op defaults.
//!
//! **[`animator`]** — Animation scheduling. An animator owns animation
//! slots keyed by played/paused/stopped timestamps and derives per-frame
//! active/factor/remove masks from pure integer arithmetic.
//!
//! **[`renderer`]** — A small state machine tracking the target framebuffer
//! state (initial/draw/composite/final) and per-draw toggles, so concrete
//! renderers only see legal transitions.
//!
//! **[`event`]** — Pointer, key, focus, and text input event values routed
//! through the layer's event entry points.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! lifecycle instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animator;
pub mod event;
pub mod handle;
pub mod layer;
pub mod pool;
pub mod renderer;
pub mod time;
pub mod trace;
