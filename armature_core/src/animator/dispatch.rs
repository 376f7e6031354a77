// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Animator`] trait: the capability-gated surface over an
//! [`AnimationStore`].

use crate::handle::{
    AnimationHandle, AnimatorHandle, DataHandle, LayerDataHandle, LayerHandle, NodeHandle,
};
use crate::time::Nanoseconds;

use super::store::{AnimationStore, Attachment};
use super::{AnimationFlags, AnimatorFeatures, AnimatorStates, checked_features};

/// An animator: animation scheduling plus the hooks a concrete implementation
/// fills in.
///
/// Storage-level operations that are always legal, creating unattached
/// animations, scheduling, property access and the advance protocol, live
/// directly on [`AnimationStore`]; this trait adds everything gated on the
/// advertised [`AnimatorFeatures`] and the clean calls that report to
/// [`on_clean`](Self::on_clean).
pub trait Animator {
    /// The animator's animation store.
    fn store(&self) -> &AnimationStore;

    /// Mutable access to the animator's animation store.
    fn store_mut(&mut self) -> &mut AnimationStore;

    /// The fixed capability set of this animator.
    ///
    /// Must not advertise both attachment features at once.
    fn features(&self) -> AnimatorFeatures;

    /// Reacts to animations removed by a clean call; `removed` is indexed by
    /// animation id.
    fn on_clean(&mut self, removed: &[bool]) {
        _ = removed;
    }

    /// The handle identifying this animator.
    fn handle(&self) -> AnimatorHandle {
        self.store().handle()
    }

    /// Accumulated dirty state.
    fn state(&self) -> AnimatorStates {
        self.store().state()
    }

    /// The layer this animator was assigned to, if any.
    ///
    /// Binding happens at most once, through the layer's animator
    /// assignment.
    fn layer(&self) -> Option<LayerHandle> {
        self.store().layer()
    }

    /// Schedules a new animation attached to `node`.
    ///
    /// # Panics
    ///
    /// Panics without
    /// [`NODE_ATTACHMENT`](AnimatorFeatures::NODE_ATTACHMENT), or under the
    /// [`AnimationStore::create`] contract.
    fn create_attached_node(
        &mut self,
        played: Nanoseconds,
        duration: Nanoseconds,
        node: NodeHandle,
        repeat_count: u32,
        flags: AnimationFlags,
    ) -> AnimationHandle {
        assert!(
            checked_features(self.features()).contains(AnimatorFeatures::NODE_ATTACHMENT),
            "animator does not advertise NODE_ATTACHMENT"
        );
        let attachment = Attachment::Node(node);
        self.store_mut()
            .create_attached(played, duration, repeat_count, flags, attachment)
    }

    /// Schedules a new animation attached to `data` of the assigned layer.
    ///
    /// # Panics
    ///
    /// Panics without
    /// [`DATA_ATTACHMENT`](AnimatorFeatures::DATA_ATTACHMENT), before the
    /// animator is assigned to a layer, if the handle's layer part is a
    /// different layer, or under the [`AnimationStore::create`] contract.
    fn create_attached_data(
        &mut self,
        played: Nanoseconds,
        duration: Nanoseconds,
        data: DataHandle,
        repeat_count: u32,
        flags: AnimationFlags,
    ) -> AnimationHandle {
        assert!(
            checked_features(self.features()).contains(AnimatorFeatures::DATA_ATTACHMENT),
            "animator does not advertise DATA_ATTACHMENT"
        );
        match self.store().layer() {
            None => panic!("animator is not assigned to a layer"),
            Some(layer) => assert!(
                layer == data.layer(),
                "data {data:?} does not belong to the assigned layer {layer:?}"
            ),
        }
        let attachment = Attachment::Data(data.local());
        self.store_mut()
            .create_attached(played, duration, repeat_count, flags, attachment)
    }

    /// Like [`create_attached_data`](Self::create_attached_data) with a
    /// layer-local handle, so no cross-layer check is possible.
    fn create_attached_data_local(
        &mut self,
        played: Nanoseconds,
        duration: Nanoseconds,
        data: LayerDataHandle,
        repeat_count: u32,
        flags: AnimationFlags,
    ) -> AnimationHandle {
        assert!(
            checked_features(self.features()).contains(AnimatorFeatures::DATA_ATTACHMENT),
            "animator does not advertise DATA_ATTACHMENT"
        );
        assert!(
            self.store().layer().is_some(),
            "animator is not assigned to a layer"
        );
        let attachment = Attachment::Data(data);
        self.store_mut()
            .create_attached(played, duration, repeat_count, flags, attachment)
    }

    /// The node `animation` is attached to, if any.
    ///
    /// # Panics
    ///
    /// Panics without
    /// [`NODE_ATTACHMENT`](AnimatorFeatures::NODE_ATTACHMENT) or for a stale
    /// handle.
    fn node_attachment(&self, animation: AnimationHandle) -> Option<NodeHandle> {
        assert!(
            checked_features(self.features()).contains(AnimatorFeatures::NODE_ATTACHMENT),
            "animator does not advertise NODE_ATTACHMENT"
        );
        match self.store().attachment(animation) {
            Attachment::Node(node) => Some(node),
            _ => None,
        }
    }

    /// The layer data `animation` is attached to, if any.
    ///
    /// # Panics
    ///
    /// Panics without
    /// [`DATA_ATTACHMENT`](AnimatorFeatures::DATA_ATTACHMENT) or for a stale
    /// handle.
    fn data_attachment(&self, animation: AnimationHandle) -> Option<LayerDataHandle> {
        assert!(
            checked_features(self.features()).contains(AnimatorFeatures::DATA_ATTACHMENT),
            "animator does not advertise DATA_ATTACHMENT"
        );
        match self.store().attachment(animation) {
            Attachment::Data(data) => Some(data),
            _ => None,
        }
    }

    /// Frees every animation whose mask bit is set and reports the mask to
    /// [`on_clean`](Self::on_clean).
    ///
    /// This is the path that retires animations the last
    /// [`advance`](AnimationStore::advance) marked for removal.
    ///
    /// # Panics
    ///
    /// Panics if the mask doesn't have exactly
    /// [`capacity`](AnimationStore::capacity) elements or marks a dead slot.
    fn clean(&mut self, remove: &[bool]) {
        self.store_mut().remove_masked(remove);
        self.on_clean(remove);
    }

    /// Frees every animation attached to a node that is stale against
    /// `node_generations` (indexed by node id, 0 for dead nodes) and reports
    /// the removals to [`on_clean`](Self::on_clean).
    ///
    /// # Panics
    ///
    /// Panics without
    /// [`NODE_ATTACHMENT`](AnimatorFeatures::NODE_ATTACHMENT).
    fn clean_nodes(&mut self, node_generations: &[u32]) {
        assert!(
            checked_features(self.features()).contains(AnimatorFeatures::NODE_ATTACHMENT),
            "animator does not advertise NODE_ATTACHMENT"
        );
        let removed = self.store_mut().prune_nodes(node_generations);
        self.on_clean(&removed);
    }

    /// Frees every animation attached to layer data that is stale against
    /// `data_generations` (indexed by data id, 0 for dead data) and reports
    /// the removals to [`on_clean`](Self::on_clean).
    ///
    /// Normally invoked through the owning layer's clean pass.
    ///
    /// # Panics
    ///
    /// Panics without
    /// [`DATA_ATTACHMENT`](AnimatorFeatures::DATA_ATTACHMENT).
    fn clean_data(&mut self, data_generations: &[u32]) {
        assert!(
            checked_features(self.features()).contains(AnimatorFeatures::DATA_ATTACHMENT),
            "animator does not advertise DATA_ATTACHMENT"
        );
        let removed = self.store_mut().prune_data(data_generations);
        self.on_clean(&removed);
    }
}

/// Marker for animators a layer accepts in its data animation surface.
pub trait DataAnimator: Animator {}

/// Marker for animators a layer accepts in its style animation surface.
pub trait StyleAnimator: Animator {}
