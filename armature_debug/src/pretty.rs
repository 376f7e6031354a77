// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Times are
//! printed in microseconds.

use std::io::Write;

use armature_core::time::Nanoseconds;
use armature_core::trace::{
    AdvanceEvent, CleanEvent, CompositeEvent, DrawEvent, TraceSink, TransitionEvent, UpdateEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

fn nanos_us(time: Nanoseconds) -> f64 {
    time.nanos() as f64 / 1000.0
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_update(&mut self, e: &UpdateEvent) {
        let _ = writeln!(
            self.writer,
            "[update] layer={:?} states={:?} data={}",
            e.layer, e.states, e.data_count,
        );
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        let _ = writeln!(
            self.writer,
            "[draw] layer={:?} offset={} count={}",
            e.layer, e.offset, e.count,
        );
    }

    fn on_composite(&mut self, e: &CompositeEvent) {
        let _ = writeln!(
            self.writer,
            "[composite] layer={:?} offset={} count={}",
            e.layer, e.offset, e.count,
        );
    }

    fn on_clean(&mut self, e: &CleanEvent) {
        let _ = writeln!(
            self.writer,
            "[clean] layer={:?} removed={}",
            e.layer, e.removed_count,
        );
    }

    fn on_advance(&mut self, e: &AdvanceEvent) {
        let _ = writeln!(
            self.writer,
            "[advance] animator={:?} time={:.1}µs active={} removed={}",
            e.animator,
            nanos_us(e.time),
            e.active_count,
            e.removed_count,
        );
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        let _ = writeln!(
            self.writer,
            "[transition] from={:?} from_draw={:?} to={:?} to_draw={:?}",
            e.from_target, e.from_draw, e.to_target, e.to_draw,
        );
    }
}
