// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the layer and animator lifecycle.
//!
//! This module provides a [`TraceSink`] trait with per-event methods an
//! orchestrator calls around the batched entry points. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use crate::handle::{AnimatorHandle, LayerHandle};
use crate::layer::LayerStates;
use crate::renderer::{DrawStates, TargetState};
use crate::time::Nanoseconds;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a layer consumes dirty state in an update.
#[derive(Clone, Copy, Debug)]
pub struct UpdateEvent {
    /// The layer being updated.
    pub layer: LayerHandle,
    /// The state subset consumed by this update.
    pub states: LayerStates,
    /// How many data ids the batch carries.
    pub data_count: usize,
}

/// Emitted when a layer draws a run of its data.
#[derive(Clone, Copy, Debug)]
pub struct DrawEvent {
    /// The layer drawing.
    pub layer: LayerHandle,
    /// First index of the run.
    pub offset: usize,
    /// Length of the run.
    pub count: usize,
}

/// Emitted when a compositing layer reads framebuffer rects back.
#[derive(Clone, Copy, Debug)]
pub struct CompositeEvent {
    /// The layer compositing.
    pub layer: LayerHandle,
    /// First rect of the run.
    pub offset: usize,
    /// Number of rects.
    pub count: usize,
}

/// Emitted after a clean pass freed layer data slots.
#[derive(Clone, Copy, Debug)]
pub struct CleanEvent {
    /// The layer that was cleaned.
    pub layer: LayerHandle,
    /// How many data slots were freed.
    pub removed_count: usize,
}

/// Emitted after an animator advanced.
#[derive(Clone, Copy, Debug)]
pub struct AdvanceEvent {
    /// The animator that advanced.
    pub animator: AnimatorHandle,
    /// The time it advanced to.
    pub time: Nanoseconds,
    /// How many animations were active at that time.
    pub active_count: usize,
    /// How many animations were retired by the advance.
    pub removed_count: usize,
}

/// Emitted after a renderer transition reached the backend.
#[derive(Clone, Copy, Debug)]
pub struct TransitionEvent {
    /// Target state before the transition.
    pub from_target: TargetState,
    /// Draw states before the transition.
    pub from_draw: DrawStates,
    /// Target state after the transition.
    pub to_target: TargetState,
    /// Draw states after the transition.
    pub to_draw: DrawStates,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the orchestrator.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a layer consumed dirty state in an update.
    fn on_update(&mut self, e: &UpdateEvent) {
        _ = e;
    }

    /// Called when a layer drew a run of its data.
    fn on_draw(&mut self, e: &DrawEvent) {
        _ = e;
    }

    /// Called when a compositing layer read framebuffer rects back.
    fn on_composite(&mut self, e: &CompositeEvent) {
        _ = e;
    }

    /// Called after a clean pass freed layer data slots.
    fn on_clean(&mut self, e: &CleanEvent) {
        _ = e;
    }

    /// Called after an animator advanced.
    fn on_advance(&mut self, e: &AdvanceEvent) {
        _ = e;
    }

    /// Called after a renderer transition reached the backend.
    fn on_transition(&mut self, e: &TransitionEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Whether events reach a sink at all, so callers can skip assembling
    /// them.
    #[inline]
    #[must_use]
    pub fn active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits an [`UpdateEvent`].
    #[inline]
    pub fn update(&mut self, e: &UpdateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_update(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DrawEvent`].
    #[inline]
    pub fn draw(&mut self, e: &DrawEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_draw(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CompositeEvent`].
    #[inline]
    pub fn composite(&mut self, e: &CompositeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_composite(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CleanEvent`].
    #[inline]
    pub fn clean(&mut self, e: &CleanEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_clean(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AdvanceEvent`].
    #[inline]
    pub fn advance(&mut self, e: &AdvanceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_advance(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TransitionEvent`].
    #[inline]
    pub fn transition(&mut self, e: &TransitionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_transition(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
