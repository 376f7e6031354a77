// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot storage and dirty-state bookkeeping for one layer.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Size;

use crate::handle::{AnimatorHandle, DataHandle, LayerDataHandle, LayerHandle, NodeHandle};
use crate::pool::SlotPool;

use super::{LayerFeatures, LayerStates};

/// The animator driving one data entry, if any.
///
/// A data entry can be driven by a data animator or a style animator but
/// never both at once; assigning one replaces the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignedAnimator {
    /// A data animator, animating the data's own values.
    Data(AnimatorHandle),
    /// A style animator, animating the style applied to the data.
    Style(AnimatorHandle),
}

/// Per-data payload: the node the data is attached to plus its animator
/// assignment.
#[derive(Debug, Default)]
pub(crate) struct Data {
    pub(crate) node: Option<NodeHandle>,
    pub(crate) animator: Option<AssignedAnimator>,
}

/// Storage and dirty-state tracking embedded in every layer.
///
/// A concrete layer holds one of these and hands it out through
/// [`Layer::store`](super::Layer::store). All mutation goes through the
/// [`Layer`](super::Layer) entry points; the store exposes the read-side
/// queries.
#[derive(Debug)]
pub struct DataStore {
    handle: LayerHandle,
    pool: SlotPool<Data>,
    state: LayerStates,
    size: Option<Size>,
    framebuffer_size: Option<Size>,
}

impl DataStore {
    /// Creates an empty store for the layer identified by `handle`.
    ///
    /// # Panics
    ///
    /// Panics if the handle carries the reserved generation 0, which no live
    /// layer can have.
    #[must_use]
    pub fn new(handle: LayerHandle) -> Self {
        assert!(
            handle.generation() != 0,
            "layer handle generation 0 is reserved: {handle:?}"
        );
        Self {
            handle,
            pool: SlotPool::new(),
            state: LayerStates::empty(),
            size: None,
            framebuffer_size: None,
        }
    }

    /// The handle identifying this layer, embedded in every [`DataHandle`]
    /// it mints.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> LayerHandle {
        self.handle
    }

    /// Number of data slots ever allocated, including freed ones.
    ///
    /// Per-data scratch views handed to batch operations must have exactly
    /// this many elements.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.pool.capacity()
    }

    /// Number of data currently alive.
    #[inline]
    #[must_use]
    pub fn used_count(&self) -> u32 {
        self.pool.used_count()
    }

    /// The explicitly tracked dirty state, without polling the layer.
    ///
    /// [`Layer::state`](super::Layer::state) unions this with the polled
    /// hook value.
    #[inline]
    #[must_use]
    pub const fn tracked_state(&self) -> LayerStates {
        self.state
    }

    /// The UI-coordinate size set by [`Layer::set_size`](super::Layer::set_size).
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Option<Size> {
        self.size
    }

    /// The framebuffer size set by [`Layer::set_size`](super::Layer::set_size).
    #[inline]
    #[must_use]
    pub const fn framebuffer_size(&self) -> Option<Size> {
        self.framebuffer_size
    }

    /// Is `data` a live handle minted by this layer?
    ///
    /// Never panics; handles from other layers are simply not valid here.
    #[must_use]
    pub fn is_valid(&self, data: DataHandle) -> bool {
        data.layer() == self.handle && self.is_valid_local(data.local())
    }

    /// Is the layer-local `data` handle live?
    ///
    /// Never panics, for any input.
    #[must_use]
    pub fn is_valid_local(&self, data: LayerDataHandle) -> bool {
        self.pool.is_valid(data.index(), data.generation())
    }

    /// The node `data` is attached to, if any.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not a live handle of this layer.
    #[must_use]
    pub fn node(&self, data: DataHandle) -> Option<NodeHandle> {
        self.validate(data);
        self.pool.payload(data.local().index()).node
    }

    /// Like [`node`](Self::node), addressed by the layer-local handle.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not live.
    #[must_use]
    pub fn node_local(&self, data: LayerDataHandle) -> Option<NodeHandle> {
        self.validate_local(data);
        self.pool.payload(data.index()).node
    }

    /// The data animator assigned to `data`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not a live handle of this layer.
    #[must_use]
    pub fn data_animator(&self, data: DataHandle) -> Option<AnimatorHandle> {
        self.validate(data);
        match self.pool.payload(data.local().index()).animator {
            Some(AssignedAnimator::Data(animator)) => Some(animator),
            _ => None,
        }
    }

    /// The style animator assigned to `data`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not a live handle of this layer.
    #[must_use]
    pub fn style_animator(&self, data: DataHandle) -> Option<AnimatorHandle> {
        self.validate(data);
        match self.pool.payload(data.local().index()).animator {
            Some(AssignedAnimator::Style(animator)) => Some(animator),
            _ => None,
        }
    }

    /// One generation entry per data slot, 0 for slots not in use.
    ///
    /// This is the table an animator prunes stale data attachments against;
    /// no live handle carries generation 0, so dead slots never match.
    #[must_use]
    pub fn data_generations(&self) -> Vec<u32> {
        let capacity = self.pool.capacity();
        let mut generations = vec![0; capacity as usize];
        for index in 0..capacity {
            if self.pool.is_used(index) {
                generations[index as usize] = self.pool.generation_at(index);
            }
        }
        generations
    }

    pub(crate) fn validate(&self, data: DataHandle) {
        assert!(
            self.is_valid(data),
            "stale or foreign handle: {data:?} (layer {:?})",
            self.handle
        );
    }

    pub(crate) fn validate_local(&self, data: LayerDataHandle) {
        assert!(self.is_valid_local(data), "stale handle: {data:?}");
    }

    pub(crate) fn mark(&mut self, states: LayerStates) {
        self.state |= states;
    }

    pub(crate) fn consume(&mut self, states: LayerStates) {
        self.state &= !states;
    }

    pub(crate) fn set_sizes(&mut self, size: Size, framebuffer_size: Size) {
        self.size = Some(size);
        self.framebuffer_size = Some(framebuffer_size);
    }

    /// Allocates a data slot, optionally attached to `node` from the start.
    pub(crate) fn create(&mut self, node: Option<NodeHandle>) -> DataHandle {
        let (index, generation) = self.pool.create();
        self.pool.payload_mut(index).node = node;
        let mut states = LayerStates::NEEDS_DATA_UPDATE;
        if node.is_some() {
            states |= LayerStates::NEEDS_ATTACHMENT_UPDATE
                | LayerStates::NEEDS_NODE_OFFSET_SIZE_UPDATE
                | LayerStates::NEEDS_NODE_ENABLED_UPDATE;
        }
        self.mark(states);
        DataHandle::new(self.handle, LayerDataHandle::new(index, generation))
    }

    pub(crate) fn attach(
        &mut self,
        data: LayerDataHandle,
        node: Option<NodeHandle>,
        features: LayerFeatures,
    ) {
        self.validate_local(data);
        let slot = self.pool.payload_mut(data.index());
        if slot.node == node {
            return;
        }
        slot.node = node;
        let mut states = LayerStates::NEEDS_ATTACHMENT_UPDATE;
        if node.is_some() {
            states |=
                LayerStates::NEEDS_NODE_OFFSET_SIZE_UPDATE | LayerStates::NEEDS_NODE_ENABLED_UPDATE;
            if features.contains(LayerFeatures::COMPOSITE) {
                states |= LayerStates::NEEDS_COMPOSITE_OFFSET_SIZE_UPDATE;
            }
        }
        self.mark(states);
    }

    /// Invalidates `data` immediately; the slot itself is recycled by the
    /// next clean pass.
    pub(crate) fn remove(&mut self, data: LayerDataHandle) {
        self.validate_local(data);
        let attached = self.pool.payload(data.index()).node.is_some();
        self.pool.mark_removed(data.index(), data.generation());
        let mut states = LayerStates::NEEDS_DATA_UPDATE | LayerStates::NEEDS_DATA_CLEAN;
        if attached {
            states |= LayerStates::NEEDS_ATTACHMENT_UPDATE;
        }
        self.mark(states);
    }

    pub(crate) fn set_animator(&mut self, data: LayerDataHandle, animator: AssignedAnimator) {
        self.validate_local(data);
        self.pool.payload_mut(data.index()).animator = Some(animator);
    }

    /// Removes every data whose attached node is stale against
    /// `node_generations`, recycles slots parked by [`remove`](Self::remove),
    /// and clears [`NEEDS_DATA_CLEAN`](LayerStates::NEEDS_DATA_CLEAN).
    ///
    /// Returns the mask of node-driven removals, indexed by data id.
    pub(crate) fn clean_nodes(&mut self, node_generations: &[u32]) -> Vec<bool> {
        let capacity = self.pool.capacity();
        let mut removed = vec![false; capacity as usize];
        for index in 0..capacity {
            if !self.pool.is_used(index) {
                continue;
            }
            let Some(node) = self.pool.payload(index).node else {
                continue;
            };
            let stale = node_generations
                .get(node.index() as usize)
                .is_none_or(|&generation| generation != node.generation());
            if stale {
                self.pool.remove_at(index);
                removed[index as usize] = true;
            }
        }
        self.finish_clean();
        removed
    }

    /// Recycles parked slots and clears
    /// [`NEEDS_DATA_CLEAN`](LayerStates::NEEDS_DATA_CLEAN); the tail end of
    /// both clean passes.
    pub(crate) fn finish_clean(&mut self) {
        self.pool.recycle_marked();
        self.state.remove(LayerStates::NEEDS_DATA_CLEAN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DataStore {
        DataStore::new(LayerHandle::new(0, 1))
    }

    #[test]
    fn create_without_node_sets_data_update_only() {
        let mut store = store();
        let data = store.create(None);
        assert!(store.is_valid(data));
        assert_eq!(store.tracked_state(), LayerStates::NEEDS_DATA_UPDATE);
        assert_eq!(store.node(data), None);
    }

    #[test]
    fn create_with_node_sets_attachment_states() {
        let mut store = store();
        let node = NodeHandle::new(7, 1);
        let data = store.create(Some(node));
        assert_eq!(store.node(data), Some(node));
        let expected = LayerStates::NEEDS_DATA_UPDATE
            | LayerStates::NEEDS_ATTACHMENT_UPDATE
            | LayerStates::NEEDS_NODE_OFFSET_SIZE_UPDATE
            | LayerStates::NEEDS_NODE_ENABLED_UPDATE;
        assert_eq!(store.tracked_state(), expected);
    }

    #[test]
    fn attach_same_node_is_a_no_op() {
        let mut store = store();
        let node = NodeHandle::new(3, 1);
        let data = store.create(Some(node));
        store.consume(store.tracked_state());

        store.attach(data.local(), Some(node), LayerFeatures::empty());
        assert_eq!(store.tracked_state(), LayerStates::empty());
    }

    #[test]
    fn detach_sets_attachment_update_only() {
        let mut store = store();
        let data = store.create(Some(NodeHandle::new(3, 1)));
        store.consume(store.tracked_state());

        store.attach(data.local(), None, LayerFeatures::empty());
        assert_eq!(store.tracked_state(), LayerStates::NEEDS_ATTACHMENT_UPDATE);
    }

    #[test]
    fn attach_with_composite_feature_marks_composite_rects() {
        let mut store = store();
        let data = store.create(None);
        store.consume(store.tracked_state());

        store.attach(
            data.local(),
            Some(NodeHandle::new(1, 1)),
            LayerFeatures::COMPOSITE,
        );
        assert!(
            store
                .tracked_state()
                .contains(LayerStates::NEEDS_COMPOSITE_OFFSET_SIZE_UPDATE)
        );
    }

    #[test]
    fn remove_marks_clean_and_keeps_slot_parked() {
        let mut store = store();
        let data = store.create(Some(NodeHandle::new(2, 1)));
        store.consume(store.tracked_state());

        store.remove(data.local());
        assert!(!store.is_valid(data));
        assert_eq!(store.used_count(), 0);
        assert_eq!(store.capacity(), 1);
        let expected = LayerStates::NEEDS_DATA_UPDATE
            | LayerStates::NEEDS_DATA_CLEAN
            | LayerStates::NEEDS_ATTACHMENT_UPDATE;
        assert_eq!(store.tracked_state(), expected);

        // The freed index must not be reused before a clean pass.
        let fresh = store.create(None);
        assert_ne!(fresh.local().index(), data.local().index());
    }

    #[test]
    fn handles_from_another_layer_are_never_valid() {
        let mut first = DataStore::new(LayerHandle::new(0, 1));
        let mut second = DataStore::new(LayerHandle::new(1, 1));
        let foreign = first.create(None);
        let _ = second.create(None);
        assert!(!second.is_valid(foreign));
        assert!(first.is_valid(foreign));
    }

    #[test]
    fn clean_nodes_removes_stale_attachments() {
        let mut store = store();
        let live = store.create(Some(NodeHandle::new(0, 1)));
        let stale = store.create(Some(NodeHandle::new(1, 1)));
        let unattached = store.create(None);

        // Node 1 has been regenerated, node 0 is still alive.
        let removed = store.clean_nodes(&[1, 2]);
        assert_eq!(removed, alloc::vec![false, true, false]);
        assert!(store.is_valid(live));
        assert!(!store.is_valid(stale));
        assert!(store.is_valid(unattached));
        let state = store.tracked_state();
        assert!(!state.contains(LayerStates::NEEDS_DATA_CLEAN));
    }

    #[test]
    fn clean_nodes_removes_out_of_range_attachments() {
        let mut store = store();
        let data = store.create(Some(NodeHandle::new(9, 1)));
        let removed = store.clean_nodes(&[1]);
        assert_eq!(removed, alloc::vec![true]);
        assert!(!store.is_valid(data));
    }

    #[test]
    fn clean_recycles_parked_slots_in_index_order() {
        let mut store = store();
        let a = store.create(None);
        let b = store.create(None);
        store.remove(a.local());
        store.remove(b.local());
        store.clean_nodes(&[]);

        let first = store.create(None);
        let second = store.create(None);
        assert_eq!(first.local().index(), a.local().index());
        assert_eq!(second.local().index(), b.local().index());
        assert_eq!(first.local().generation(), a.local().generation() + 1);
    }

    #[test]
    fn data_generations_zero_for_dead_slots() {
        let mut store = store();
        let a = store.create(None);
        let b = store.create(None);
        store.remove(a.local());
        assert_eq!(
            store.data_generations(),
            alloc::vec![0, b.local().generation()]
        );
    }

    #[test]
    fn animator_assignment_is_exclusive() {
        let mut store = store();
        let data = store.create(None);
        let animator = AnimatorHandle::new(0, 1);
        store.set_animator(data.local(), AssignedAnimator::Data(animator));
        assert_eq!(store.data_animator(data), Some(animator));
        assert_eq!(store.style_animator(data), None);

        store.set_animator(data.local(), AssignedAnimator::Style(animator));
        assert_eq!(store.data_animator(data), None);
        assert_eq!(store.style_animator(data), Some(animator));
    }

    #[test]
    #[should_panic(expected = "stale or foreign handle")]
    fn node_of_removed_data_panics() {
        let mut store = store();
        let data = store.create(None);
        store.remove(data.local());
        let _ = store.node(data);
    }

    #[test]
    #[should_panic(expected = "layer handle generation 0 is reserved")]
    fn reserved_generation_rejected() {
        let _ = DataStore::new(LayerHandle::new(0, 0));
    }
}
