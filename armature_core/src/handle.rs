// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed generational handle types.
//!
//! Every object owned by a [`layer`](crate::layer) or
//! [`animator`](crate::animator) is addressed by a handle packing a slot
//! index and a generation counter into one integer. The generation lets
//! stale handles be detected after a slot is freed and reused; generation 0
//! is reserved and never produced, so a zeroed integer never aliases a live
//! handle.
//!
//! Full handles ([`DataHandle`], [`AnimationHandle`]) additionally embed the
//! handle of the owning instance, so a handle minted by one layer or
//! animator never validates against another.

use core::fmt;

/// Bit width of the index part in wide (32-bit) handles.
pub(crate) const WIDE_INDEX_BITS: u32 = 20;
/// Bit width of the generation part in wide (32-bit) handles.
pub(crate) const WIDE_GENERATION_BITS: u32 = 12;
/// Bit width of the index part in narrow (16-bit) handles.
pub(crate) const NARROW_INDEX_BITS: u32 = 8;
/// Bit width of the generation part in narrow (16-bit) handles.
pub(crate) const NARROW_GENERATION_BITS: u32 = 8;

const WIDE_INDEX_MASK: u32 = (1 << WIDE_INDEX_BITS) - 1;
const NARROW_INDEX_MASK: u32 = (1 << NARROW_INDEX_BITS) - 1;

// ---------------------------------------------------------------------------
// Node handles
// ---------------------------------------------------------------------------

/// A handle to a node in the orchestrator's node tree.
///
/// Nodes themselves are owned outside this crate; layers and animators only
/// ever reference them. 20-bit index, 12-bit generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(u32);

impl NodeHandle {
    /// Packs an index and generation into a handle.
    ///
    /// # Panics
    ///
    /// Panics if `index` needs more than 20 bits or `generation` more than
    /// 12 bits.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(pack_wide(index, generation))
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 & WIDE_INDEX_MASK
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.0 >> WIDE_INDEX_BITS
    }

    /// Returns the raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// Reconstructs a handle from a raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle({}@gen{})", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// Layer-side handles
// ---------------------------------------------------------------------------

/// A handle to a layer instance. 8-bit index, 8-bit generation.
///
/// Layer instances are allocated by the orchestrator; a
/// [`DataStore`](crate::layer::DataStore) is constructed with the handle
/// identifying it and embeds it into every [`DataHandle`] it mints.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(u16);

impl LayerHandle {
    /// Packs an index and generation into a handle.
    ///
    /// # Panics
    ///
    /// Panics if `index` or `generation` needs more than 8 bits.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(pack_narrow(index, generation))
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32 & NARROW_INDEX_MASK
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.0 as u32 >> NARROW_INDEX_BITS
    }

    /// Returns the raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u16 {
        self.0
    }

    /// Reconstructs a handle from a raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for LayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerHandle({}@gen{})", self.index(), self.generation())
    }
}

/// A layer-local handle to one data entry. 20-bit index, 12-bit generation.
///
/// Valid only in the context of the layer that minted it; see [`DataHandle`]
/// for the globally unambiguous form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerDataHandle(u32);

impl LayerDataHandle {
    /// Packs an index and generation into a handle.
    ///
    /// # Panics
    ///
    /// Panics if `index` needs more than 20 bits or `generation` more than
    /// 12 bits.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(pack_wide(index, generation))
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 & WIDE_INDEX_MASK
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.0 >> WIDE_INDEX_BITS
    }

    /// Returns the raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// Reconstructs a handle from a raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for LayerDataHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LayerDataHandle({}@gen{})",
            self.index(),
            self.generation()
        )
    }
}

/// A full handle to one data entry: the owning [`LayerHandle`] in the upper
/// 32 bits, the [`LayerDataHandle`] in the lower 32.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataHandle(u64);

impl DataHandle {
    /// Composes a full handle from the owning layer and the layer-local part.
    #[inline]
    #[must_use]
    pub const fn new(layer: LayerHandle, local: LayerDataHandle) -> Self {
        Self(((layer.to_bits() as u64) << 32) | local.to_bits() as u64)
    }

    /// Returns the owning layer's handle.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "upper word is masked to the 16 bits a LayerHandle occupies"
    )]
    pub const fn layer(self) -> LayerHandle {
        LayerHandle::from_bits((self.0 >> 32) as u16)
    }

    /// Returns the layer-local part.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "truncation to the lower word is the extraction"
    )]
    pub const fn local(self) -> LayerDataHandle {
        LayerDataHandle::from_bits(self.0 as u32)
    }

    /// Returns the raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Reconstructs a handle from a raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for DataHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layer = self.layer();
        let local = self.local();
        write!(
            f,
            "DataHandle({}@gen{}, {}@gen{})",
            layer.index(),
            layer.generation(),
            local.index(),
            local.generation()
        )
    }
}

// ---------------------------------------------------------------------------
// Animator-side handles
// ---------------------------------------------------------------------------

/// A handle to an animator instance. 8-bit index, 8-bit generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimatorHandle(u16);

impl AnimatorHandle {
    /// Packs an index and generation into a handle.
    ///
    /// # Panics
    ///
    /// Panics if `index` or `generation` needs more than 8 bits.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(pack_narrow(index, generation))
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32 & NARROW_INDEX_MASK
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.0 as u32 >> NARROW_INDEX_BITS
    }

    /// Returns the raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u16 {
        self.0
    }

    /// Reconstructs a handle from a raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for AnimatorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnimatorHandle({}@gen{})",
            self.index(),
            self.generation()
        )
    }
}

/// An animator-local handle to one animation. 20-bit index, 12-bit
/// generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimatorDataHandle(u32);

impl AnimatorDataHandle {
    /// Packs an index and generation into a handle.
    ///
    /// # Panics
    ///
    /// Panics if `index` needs more than 20 bits or `generation` more than
    /// 12 bits.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(pack_wide(index, generation))
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 & WIDE_INDEX_MASK
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.0 >> WIDE_INDEX_BITS
    }

    /// Returns the raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// Reconstructs a handle from a raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for AnimatorDataHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnimatorDataHandle({}@gen{})",
            self.index(),
            self.generation()
        )
    }
}

/// A full handle to one animation: the owning [`AnimatorHandle`] in the
/// upper 32 bits, the [`AnimatorDataHandle`] in the lower 32.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(u64);

impl AnimationHandle {
    /// Composes a full handle from the owning animator and the local part.
    #[inline]
    #[must_use]
    pub const fn new(animator: AnimatorHandle, local: AnimatorDataHandle) -> Self {
        Self(((animator.to_bits() as u64) << 32) | local.to_bits() as u64)
    }

    /// Returns the owning animator's handle.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "upper word is masked to the 16 bits an AnimatorHandle occupies"
    )]
    pub const fn animator(self) -> AnimatorHandle {
        AnimatorHandle::from_bits((self.0 >> 32) as u16)
    }

    /// Returns the animator-local part.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "truncation to the lower word is the extraction"
    )]
    pub const fn local(self) -> AnimatorDataHandle {
        AnimatorDataHandle::from_bits(self.0 as u32)
    }

    /// Returns the raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Reconstructs a handle from a raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let animator = self.animator();
        let local = self.local();
        write!(
            f,
            "AnimationHandle({}@gen{}, {}@gen{})",
            animator.index(),
            animator.generation(),
            local.index(),
            local.generation()
        )
    }
}

// ---------------------------------------------------------------------------
// Packing helpers
// ---------------------------------------------------------------------------

const fn pack_wide(index: u32, generation: u32) -> u32 {
    assert!(
        index < (1 << WIDE_INDEX_BITS),
        "handle index does not fit in 20 bits"
    );
    assert!(
        generation < (1 << WIDE_GENERATION_BITS),
        "handle generation does not fit in 12 bits"
    );
    index | (generation << WIDE_INDEX_BITS)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "both parts are asserted to fit in 8 bits"
)]
const fn pack_narrow(index: u32, generation: u32) -> u16 {
    assert!(
        index < (1 << NARROW_INDEX_BITS),
        "handle index does not fit in 8 bits"
    );
    assert!(
        generation < (1 << NARROW_GENERATION_BITS),
        "handle generation does not fit in 8 bits"
    );
    (index | (generation << NARROW_INDEX_BITS)) as u16
}
