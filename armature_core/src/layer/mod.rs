// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data ownership, dirty-state aggregation, and capability-gated dispatch.
//!
//! A layer owns uniform *data* slots (one per visual element it manages),
//! tracks what work the next frame owes it as a [`LayerStates`] bitmask, and
//! advertises what it can do as [`LayerFeatures`]. The concrete storage and
//! bookkeeping live in [`DataStore`]; the [`Layer`] trait wraps that store
//! with validating entry points that forward to per-implementation hooks.
//!
//! Dirty state is an aggregate: explicit mutations (create, attach, remove,
//! [`Layer::set_needs_update`]) OR bits into the tracked mask, and
//! [`Layer::state`] unions the mask with the lazily polled
//! [`Layer::poll_state`]. The orchestrator consumes tracked bits in batch
//! via [`Layer::update`], which clears exactly the subset it was handed.

mod dispatch;
mod store;

use core::fmt;

pub use dispatch::{Layer, LayerUpdate};
pub use store::{AssignedAnimator, DataStore};

bitflags::bitflags! {
    /// Capabilities a layer advertises through [`Layer::features`].
    ///
    /// Dispatch entry points check these before invoking the matching hook:
    /// an operation whose feature is missing is a contract violation, while
    /// an advertised feature whose hook was never overridden is a silent
    /// no-op.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct LayerFeatures: u8 {
        /// The layer draws something.
        const DRAW = 1 << 0;
        /// Drawing needs blending enabled; contains [`DRAW`](Self::DRAW).
        const DRAW_USES_BLENDING = Self::DRAW.bits() | (1 << 1);
        /// Drawing needs scissor clipping; contains [`DRAW`](Self::DRAW).
        const DRAW_USES_SCISSOR = Self::DRAW.bits() | (1 << 2);
        /// The layer handles input events.
        const EVENT = 1 << 3;
        /// The layer composites previously rendered framebuffer contents.
        const COMPOSITE = 1 << 4;
        /// Data animators can be assigned to the layer.
        const ANIMATE_DATA = 1 << 5;
        /// Style animators can be assigned to the layer.
        const ANIMATE_STYLES = 1 << 6;
    }
}

bitflags::bitflags! {
    /// Pending-work bits tracked by a layer.
    ///
    /// Some values contain others — an attachment change implies node order
    /// and node enablement are stale too, and a node offset/size change
    /// implies the same. The containment is part of the bit layout, so
    /// testing for a broad value with `contains` also covers anything that
    /// implies it.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct LayerStates: u16 {
        /// Which nodes are enabled changed.
        const NEEDS_NODE_ENABLED_UPDATE = 1 << 0;
        /// Node draw/event order changed; contains
        /// [`NEEDS_NODE_ENABLED_UPDATE`](Self::NEEDS_NODE_ENABLED_UPDATE).
        const NEEDS_NODE_ORDER_UPDATE = Self::NEEDS_NODE_ENABLED_UPDATE.bits() | (1 << 1);
        /// Node offsets or sizes changed; contains
        /// [`NEEDS_NODE_ORDER_UPDATE`](Self::NEEDS_NODE_ORDER_UPDATE).
        const NEEDS_NODE_OFFSET_SIZE_UPDATE = Self::NEEDS_NODE_ORDER_UPDATE.bits() | (1 << 2);
        /// Data-to-node attachments changed; contains
        /// [`NEEDS_NODE_ORDER_UPDATE`](Self::NEEDS_NODE_ORDER_UPDATE).
        const NEEDS_ATTACHMENT_UPDATE = Self::NEEDS_NODE_ORDER_UPDATE.bits() | (1 << 3);
        /// Per-data content changed.
        const NEEDS_DATA_UPDATE = 1 << 4;
        /// Layer-common content changed.
        const NEEDS_COMMON_DATA_UPDATE = 1 << 5;
        /// Content shared across layers changed.
        const NEEDS_SHARED_DATA_UPDATE = 1 << 6;
        /// Composited rect placement changed.
        const NEEDS_COMPOSITE_OFFSET_SIZE_UPDATE = 1 << 7;
        /// Removed data await a clean pass.
        const NEEDS_DATA_CLEAN = 1 << 8;
    }
}

impl LayerStates {
    /// The subset [`Layer::poll_state`] and [`Layer::set_needs_update`] may
    /// report, before the composite extension.
    pub(crate) const POLLABLE: Self = Self::NEEDS_DATA_UPDATE
        .union(Self::NEEDS_COMMON_DATA_UPDATE)
        .union(Self::NEEDS_SHARED_DATA_UPDATE);
}

/// Named values of [`LayerFeatures`], most specific first, for Debug output.
const FEATURE_NAMES: &[(&str, u32)] = &[
    (
        "DRAW_USES_BLENDING",
        LayerFeatures::DRAW_USES_BLENDING.bits() as u32,
    ),
    (
        "DRAW_USES_SCISSOR",
        LayerFeatures::DRAW_USES_SCISSOR.bits() as u32,
    ),
    ("DRAW", LayerFeatures::DRAW.bits() as u32),
    ("EVENT", LayerFeatures::EVENT.bits() as u32),
    ("COMPOSITE", LayerFeatures::COMPOSITE.bits() as u32),
    ("ANIMATE_DATA", LayerFeatures::ANIMATE_DATA.bits() as u32),
    (
        "ANIMATE_STYLES",
        LayerFeatures::ANIMATE_STYLES.bits() as u32,
    ),
];

/// Named values of [`LayerStates`], most specific first, for Debug output.
const STATE_NAMES: &[(&str, u32)] = &[
    (
        "NEEDS_NODE_OFFSET_SIZE_UPDATE",
        LayerStates::NEEDS_NODE_OFFSET_SIZE_UPDATE.bits() as u32,
    ),
    (
        "NEEDS_ATTACHMENT_UPDATE",
        LayerStates::NEEDS_ATTACHMENT_UPDATE.bits() as u32,
    ),
    (
        "NEEDS_NODE_ORDER_UPDATE",
        LayerStates::NEEDS_NODE_ORDER_UPDATE.bits() as u32,
    ),
    (
        "NEEDS_NODE_ENABLED_UPDATE",
        LayerStates::NEEDS_NODE_ENABLED_UPDATE.bits() as u32,
    ),
    (
        "NEEDS_DATA_UPDATE",
        LayerStates::NEEDS_DATA_UPDATE.bits() as u32,
    ),
    (
        "NEEDS_COMMON_DATA_UPDATE",
        LayerStates::NEEDS_COMMON_DATA_UPDATE.bits() as u32,
    ),
    (
        "NEEDS_SHARED_DATA_UPDATE",
        LayerStates::NEEDS_SHARED_DATA_UPDATE.bits() as u32,
    ),
    (
        "NEEDS_COMPOSITE_OFFSET_SIZE_UPDATE",
        LayerStates::NEEDS_COMPOSITE_OFFSET_SIZE_UPDATE.bits() as u32,
    ),
    (
        "NEEDS_DATA_CLEAN",
        LayerStates::NEEDS_DATA_CLEAN.bits() as u32,
    ),
];

/// Prints a flag set naming only the most specific containing values.
///
/// A named value is emitted when it is wholly present and contributes at
/// least one bit no earlier (more specific) value already covered, so a set
/// holding `NEEDS_NODE_ORDER_UPDATE` prints that name alone rather than also
/// naming the contained `NEEDS_NODE_ENABLED_UPDATE`.
fn fmt_flag_set(
    f: &mut fmt::Formatter<'_>,
    type_name: &str,
    bits: u32,
    named: &[(&str, u32)],
) -> fmt::Result {
    write!(f, "{type_name}(")?;
    if bits == 0 {
        return write!(f, "0x0)");
    }
    let mut printed: u32 = 0;
    let mut first = true;
    for &(name, value) in named {
        if bits & value == value && printed & value != value {
            if !first {
                write!(f, " | ")?;
            }
            write!(f, "{name}")?;
            printed |= value;
            first = false;
        }
    }
    let unknown = bits & !printed;
    if unknown != 0 {
        if !first {
            write!(f, " | ")?;
        }
        write!(f, "{unknown:#x}")?;
    }
    write!(f, ")")
}

impl fmt::Debug for LayerFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_flag_set(f, "LayerFeatures", u32::from(self.bits()), FEATURE_NAMES)
    }
}

impl fmt::Debug for LayerStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_flag_set(f, "LayerStates", u32::from(self.bits()), STATE_NAMES)
    }
}
