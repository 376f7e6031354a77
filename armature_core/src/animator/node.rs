// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animators that rewrite node placement, flags and lifetime in place.

use alloc::vec;

use bitflags::bitflags;
use kurbo::{Point, Size};

use crate::time::Nanoseconds;

use super::{Animator, AnimatorFeatures, checked_features};

bitflags! {
    /// Per-node behavior flags a node animator may rewrite.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// The node and its children are not drawn.
        const HIDDEN = 1 << 0;
        /// Children are clipped to the node's rectangle.
        const CLIP = 1 << 1;
        /// The node and its children are drawn but don't react to events.
        const DISABLED = 1 << 2;
        /// Events fall through the node as if it wasn't there.
        const NO_EVENTS = 1 << 3;
    }
}

bitflags! {
    /// Categories of node state an advance step touched.
    ///
    /// Returned from [`NodeAnimator::animate`] so the caller re-derives
    /// exactly the state that changed and nothing else.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct NodeAnimations: u8 {
        /// Some node offset or size changed.
        const OFFSET_SIZE = 1 << 0;
        /// Some node's [`NodeFlags`] changed.
        const FLAGS = 1 << 1;
        /// Some node was marked for removal.
        const REMOVAL = 1 << 2;
    }
}

/// An animator whose animations are attached to nodes and whose effect is
/// rewriting node placement, flags or lifetime in place.
///
/// Concrete implementations fill in [`on_advance`](Self::on_advance) and
/// call [`animate`](Self::animate) once per frame with views over the
/// caller's per-node storage; the advance protocol and the retirement of
/// finished animations are handled here. Requires
/// [`NODE_ATTACHMENT`](AnimatorFeatures::NODE_ATTACHMENT).
pub trait NodeAnimator: Animator {
    /// Applies one advance step to the node views.
    ///
    /// `active` and `factors` are indexed by animation id and follow the
    /// [`advance`](super::AnimationStore::advance) contract; the node views
    /// are indexed by node id. Setting `nodes_remove[i]` requests removal of
    /// node `i`. Returns the categories of node state that were touched.
    fn on_advance(
        &mut self,
        active: &[bool],
        factors: &[f32],
        node_offsets: &mut [Point],
        node_sizes: &mut [Size],
        node_flags: &mut [NodeFlags],
        nodes_remove: &mut [bool],
    ) -> NodeAnimations;

    /// Advances every animation to `time`, lets
    /// [`on_advance`](Self::on_advance) rewrite the node views and retires
    /// the animations that stopped without
    /// [`KEEP_ONCE_PLAYED`](super::AnimationFlags::KEEP_ONCE_PLAYED).
    ///
    /// The hook is skipped, and the empty set returned, when no animation is
    /// active at `time`.
    ///
    /// # Panics
    ///
    /// Panics without
    /// [`NODE_ATTACHMENT`](AnimatorFeatures::NODE_ATTACHMENT), if the four
    /// node views don't share one length, or if `time` is before the store's
    /// last advance time.
    fn animate(
        &mut self,
        time: Nanoseconds,
        node_offsets: &mut [Point],
        node_sizes: &mut [Size],
        node_flags: &mut [NodeFlags],
        nodes_remove: &mut [bool],
    ) -> NodeAnimations {
        assert!(
            checked_features(self.features()).contains(AnimatorFeatures::NODE_ATTACHMENT),
            "animator does not advertise NODE_ATTACHMENT"
        );
        assert!(
            node_offsets.len() == node_sizes.len()
                && node_offsets.len() == node_flags.len()
                && node_offsets.len() == nodes_remove.len(),
            "node offset, size, flag and removal views differ: {}, {}, {} and {}",
            node_offsets.len(),
            node_sizes.len(),
            node_flags.len(),
            nodes_remove.len()
        );
        let capacity = self.store().capacity() as usize;
        let mut active = vec![false; capacity];
        let mut factors = vec![0.0; capacity];
        let mut remove = vec![false; capacity];
        let store = self.store_mut();
        let (any_active, any_remove) = store.advance(time, &mut active, &mut factors, &mut remove);
        let animations = if any_active {
            self.on_advance(
                &active,
                &factors,
                node_offsets,
                node_sizes,
                node_flags,
                nodes_remove,
            )
        } else {
            NodeAnimations::empty()
        };
        if any_remove {
            self.clean(&remove);
        }
        animations
    }
}
