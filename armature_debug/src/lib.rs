// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing for armature trace diagnostics.
//!
//! This crate provides [`TraceSink`](armature_core::trace::TraceSink)
//! implementations for development:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.

pub mod pretty;
