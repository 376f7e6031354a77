// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Layer`] trait: capability-gated entry points over a [`DataStore`].

use kurbo::{Point, Size};

use crate::animator::{Animator, AnimatorFeatures, DataAnimator, StyleAnimator};
use crate::event::{
    FocusEvent, KeyEvent, PointerEvent, PointerMoveEvent, TextInputEvent, VisibilityLostEvent,
};
use crate::handle::{AnimatorHandle, DataHandle, LayerDataHandle, LayerHandle, NodeHandle};
use crate::renderer::Renderer;
use crate::time::Nanoseconds;

use super::store::{AssignedAnimator, DataStore};
use super::{LayerFeatures, LayerStates};

/// Borrowed per-frame views handed to [`Layer::update`] and [`Layer::draw`].
///
/// The orchestrator owns the backing storage; a layer only ever reads it.
/// `clip_rect_ids` and `clip_rect_data_counts` are parallel, as are the three
/// node views, the two clip rect geometry views, and the two composite rect
/// views. Composite rect views must be empty for layers without
/// [`LayerFeatures::COMPOSITE`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LayerUpdate<'a> {
    /// Data ids to process, in draw order.
    pub data_ids: &'a [u32],
    /// For each clip rect in draw order, the id of the rect.
    pub clip_rect_ids: &'a [u32],
    /// For each clip rect in draw order, how many of `data_ids` it covers.
    pub clip_rect_data_counts: &'a [u32],
    /// Absolute node offsets, indexed by node id.
    pub node_offsets: &'a [Point],
    /// Node sizes, indexed by node id.
    pub node_sizes: &'a [Size],
    /// Whether each node is enabled, indexed by node id.
    pub nodes_enabled: &'a [bool],
    /// Clip rect offsets, indexed by clip rect id.
    pub clip_rect_offsets: &'a [Point],
    /// Clip rect sizes, indexed by clip rect id.
    pub clip_rect_sizes: &'a [Size],
    /// Compositing rect offsets, indexed by data id.
    pub composite_rect_offsets: &'a [Point],
    /// Compositing rect sizes, indexed by data id.
    pub composite_rect_sizes: &'a [Size],
}

fn validate_views(ctx: &LayerUpdate<'_>) {
    assert!(
        ctx.clip_rect_ids.len() == ctx.clip_rect_data_counts.len(),
        "clip rect id and data count views differ: {} vs {}",
        ctx.clip_rect_ids.len(),
        ctx.clip_rect_data_counts.len()
    );
    assert!(
        ctx.node_offsets.len() == ctx.node_sizes.len()
            && ctx.node_offsets.len() == ctx.nodes_enabled.len(),
        "node offset, size and enabled views differ: {}, {} and {}",
        ctx.node_offsets.len(),
        ctx.node_sizes.len(),
        ctx.nodes_enabled.len()
    );
    assert!(
        ctx.clip_rect_offsets.len() == ctx.clip_rect_sizes.len(),
        "clip rect offset and size views differ: {} vs {}",
        ctx.clip_rect_offsets.len(),
        ctx.clip_rect_sizes.len()
    );
    assert!(
        ctx.composite_rect_offsets.len() == ctx.composite_rect_sizes.len(),
        "composite rect offset and size views differ: {} vs {}",
        ctx.composite_rect_offsets.len(),
        ctx.composite_rect_sizes.len()
    );
}

fn validate_event_dispatch(features: LayerFeatures, capacity: u32, data_id: u32) {
    assert!(
        features.contains(LayerFeatures::EVENT),
        "layer does not advertise EVENT"
    );
    assert!(
        data_id < capacity,
        "data id {data_id} out of bounds for capacity {capacity}"
    );
}

/// A layer: typed per-data storage plus the hooks a concrete implementation
/// fills in.
///
/// Implementations provide the three required methods and override whichever
/// `on_*` hooks their advertised [`LayerFeatures`] call for. Every public
/// entry point validates its contract, so a hook body can rely on the
/// documented preconditions without re-checking them. An advertised feature
/// whose hook is left at the default is not an error; the dispatch simply
/// does nothing.
pub trait Layer {
    /// The layer's data store.
    fn store(&self) -> &DataStore;

    /// Mutable access to the layer's data store.
    fn store_mut(&mut self) -> &mut DataStore;

    /// The fixed capability set of this layer.
    fn features(&self) -> LayerFeatures;

    // -------------------------------------------------------------------- //
    // Hooks                                                                //
    // -------------------------------------------------------------------- //

    /// Dirty state known only to the implementation, unioned into
    /// [`state`](Self::state) on every read.
    ///
    /// May only report [`NEEDS_DATA_UPDATE`](LayerStates::NEEDS_DATA_UPDATE),
    /// [`NEEDS_COMMON_DATA_UPDATE`](LayerStates::NEEDS_COMMON_DATA_UPDATE),
    /// [`NEEDS_SHARED_DATA_UPDATE`](LayerStates::NEEDS_SHARED_DATA_UPDATE)
    /// and, on compositing layers,
    /// [`NEEDS_COMPOSITE_OFFSET_SIZE_UPDATE`](LayerStates::NEEDS_COMPOSITE_OFFSET_SIZE_UPDATE).
    fn poll_state(&self) -> LayerStates {
        LayerStates::empty()
    }

    /// Reacts to [`set_size`](Self::set_size).
    fn on_set_size(&mut self, size: Size, framebuffer_size: Size) {
        _ = (size, framebuffer_size);
    }

    /// Reacts to data removed by [`clean_nodes`](Self::clean_nodes);
    /// `data_removed` is indexed by data id.
    fn on_clean(&mut self, data_removed: &[bool]) {
        _ = data_removed;
    }

    /// Refreshes internal state from the passed views. `states` is the subset
    /// the caller chose to process this frame.
    fn on_update(&mut self, states: LayerStates, ctx: &LayerUpdate<'_>) {
        _ = (states, ctx);
    }

    /// Draws `count` entries of `ctx.data_ids` starting at `offset`, covered
    /// by `clip_rect_count` clip rects starting at `clip_rect_offset`.
    fn on_draw(
        &mut self,
        ctx: &LayerUpdate<'_>,
        offset: usize,
        count: usize,
        clip_rect_offset: usize,
        clip_rect_count: usize,
    ) {
        _ = (ctx, offset, count, clip_rect_offset, clip_rect_count);
    }

    /// Composites `count` rects starting at `offset` from the framebuffer the
    /// renderer exposes.
    fn on_composite(
        &mut self,
        renderer: &mut dyn Renderer,
        rect_offsets: &[Point],
        rect_sizes: &[Size],
        offset: usize,
        count: usize,
    ) {
        _ = (renderer, rect_offsets, rect_sizes, offset, count);
    }

    /// Advances the assigned data animators, partitioning the scratch views
    /// among them.
    fn on_advance_data_animations(
        &mut self,
        time: Nanoseconds,
        active: &mut [bool],
        factors: &mut [f32],
        remove: &mut [bool],
        animators: &mut [&mut dyn DataAnimator],
    ) {
        _ = (time, active, factors, remove, animators);
    }

    /// Advances the assigned style animators, partitioning the scratch views
    /// among them.
    fn on_advance_style_animations(
        &mut self,
        time: Nanoseconds,
        active: &mut [bool],
        factors: &mut [f32],
        remove: &mut [bool],
        animators: &mut [&mut dyn StyleAnimator],
    ) {
        _ = (time, active, factors, remove, animators);
    }

    /// Reacts to [`pointer_press_event`](Self::pointer_press_event).
    fn on_pointer_press(&mut self, data_id: u32, event: &mut PointerEvent) {
        _ = (data_id, event);
    }

    /// Reacts to [`pointer_release_event`](Self::pointer_release_event).
    fn on_pointer_release(&mut self, data_id: u32, event: &mut PointerEvent) {
        _ = (data_id, event);
    }

    /// Reacts to [`pointer_tap_or_click_event`](Self::pointer_tap_or_click_event).
    fn on_pointer_tap_or_click(&mut self, data_id: u32, event: &mut PointerEvent) {
        _ = (data_id, event);
    }

    /// Reacts to [`pointer_move_event`](Self::pointer_move_event).
    fn on_pointer_move(&mut self, data_id: u32, event: &mut PointerMoveEvent) {
        _ = (data_id, event);
    }

    /// Reacts to [`pointer_enter_event`](Self::pointer_enter_event).
    fn on_pointer_enter(&mut self, data_id: u32, event: &mut PointerMoveEvent) {
        _ = (data_id, event);
    }

    /// Reacts to [`pointer_leave_event`](Self::pointer_leave_event).
    fn on_pointer_leave(&mut self, data_id: u32, event: &mut PointerMoveEvent) {
        _ = (data_id, event);
    }

    /// Reacts to [`focus_event`](Self::focus_event).
    fn on_focus(&mut self, data_id: u32, event: &mut FocusEvent) {
        _ = (data_id, event);
    }

    /// Reacts to [`blur_event`](Self::blur_event).
    fn on_blur(&mut self, data_id: u32, event: &mut FocusEvent) {
        _ = (data_id, event);
    }

    /// Reacts to [`key_press_event`](Self::key_press_event).
    fn on_key_press(&mut self, data_id: u32, event: &mut KeyEvent) {
        _ = (data_id, event);
    }

    /// Reacts to [`key_release_event`](Self::key_release_event).
    fn on_key_release(&mut self, data_id: u32, event: &mut KeyEvent) {
        _ = (data_id, event);
    }

    /// Reacts to [`text_input_event`](Self::text_input_event).
    fn on_text_input(&mut self, data_id: u32, event: &mut TextInputEvent<'_>) {
        _ = (data_id, event);
    }

    /// Reacts to [`visibility_lost_event`](Self::visibility_lost_event).
    fn on_visibility_lost(&mut self, data_id: u32, event: &mut VisibilityLostEvent) {
        _ = (data_id, event);
    }

    // -------------------------------------------------------------------- //
    // Entry points                                                         //
    // -------------------------------------------------------------------- //

    /// The handle identifying this layer.
    fn handle(&self) -> LayerHandle {
        self.store().handle()
    }

    /// Union of the tracked dirty state and [`poll_state`](Self::poll_state).
    ///
    /// # Panics
    ///
    /// Panics if the polled value strays outside the poll-eligible set.
    fn state(&self) -> LayerStates {
        let polled = self.poll_state();
        let mut eligible = LayerStates::POLLABLE;
        if self.features().contains(LayerFeatures::COMPOSITE) {
            eligible |= LayerStates::NEEDS_COMPOSITE_OFFSET_SIZE_UPDATE;
        }
        assert!(
            eligible.contains(polled),
            "poll_state returned {polled:?}, outside the eligible {eligible:?}"
        );
        self.store().tracked_state() | polled
    }

    /// Marks data as dirty without going through a mutator, for state the
    /// implementation tracks itself.
    ///
    /// # Panics
    ///
    /// Panics if `states` is empty or strays outside the poll-eligible set.
    fn set_needs_update(&mut self, states: LayerStates) {
        let mut eligible = LayerStates::POLLABLE;
        if self.features().contains(LayerFeatures::COMPOSITE) {
            eligible |= LayerStates::NEEDS_COMPOSITE_OFFSET_SIZE_UPDATE;
        }
        assert!(
            !states.is_empty() && eligible.contains(states),
            "set_needs_update with {states:?}, expected a non-empty subset of {eligible:?}"
        );
        self.store_mut().mark(states);
    }

    /// Sets the UI and framebuffer sizes a drawing layer projects into.
    ///
    /// # Panics
    ///
    /// Panics without [`LayerFeatures::DRAW`] or for a size with zero area.
    fn set_size(&mut self, size: Size, framebuffer_size: Size) {
        assert!(
            self.features().contains(LayerFeatures::DRAW),
            "layer does not advertise DRAW"
        );
        assert!(
            size.width > 0.0 && size.height > 0.0,
            "size {size:?} has no area"
        );
        assert!(
            framebuffer_size.width > 0.0 && framebuffer_size.height > 0.0,
            "framebuffer size {framebuffer_size:?} has no area"
        );
        self.store_mut().set_sizes(size, framebuffer_size);
        self.on_set_size(size, framebuffer_size);
    }

    /// Allocates a data slot, optionally attached to `node` from the start.
    ///
    /// # Panics
    ///
    /// Panics when the slot pool is exhausted.
    fn create(&mut self, node: Option<NodeHandle>) -> DataHandle {
        self.store_mut().create(node)
    }

    /// Attaches `data` to a node, or detaches it with `None`.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not a live handle of this layer.
    fn attach(&mut self, data: DataHandle, node: Option<NodeHandle>) {
        self.store().validate(data);
        self.attach_local(data.local(), node);
    }

    /// Like [`attach`](Self::attach), addressed by the layer-local handle.
    fn attach_local(&mut self, data: LayerDataHandle, node: Option<NodeHandle>) {
        let features = self.features();
        self.store_mut().attach(data, node, features);
    }

    /// Invalidates `data`; the slot is recycled by the next clean pass.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not a live handle of this layer.
    fn remove(&mut self, data: DataHandle) {
        self.store().validate(data);
        self.store_mut().remove(data.local());
    }

    /// Like [`remove`](Self::remove), addressed by the layer-local handle.
    fn remove_local(&mut self, data: LayerDataHandle) {
        self.store_mut().remove(data);
    }

    /// Processes the `states` subset of accumulated dirty state against the
    /// passed views, clearing exactly that subset.
    ///
    /// Calling with bits that are no longer set is a valid no-op; the hook
    /// still runs.
    ///
    /// # Panics
    ///
    /// Panics if `states` is empty or contains
    /// [`NEEDS_DATA_CLEAN`](LayerStates::NEEDS_DATA_CLEAN) (or the composite
    /// flag without [`LayerFeatures::COMPOSITE`]), if parallel views in `ctx`
    /// disagree on length, or on a drawing layer before
    /// [`set_size`](Self::set_size) was ever called.
    fn update(&mut self, states: LayerStates, ctx: &LayerUpdate<'_>) {
        let features = self.features();
        let mut eligible = LayerStates::NEEDS_NODE_OFFSET_SIZE_UPDATE
            | LayerStates::NEEDS_ATTACHMENT_UPDATE
            | LayerStates::POLLABLE;
        if features.contains(LayerFeatures::COMPOSITE) {
            eligible |= LayerStates::NEEDS_COMPOSITE_OFFSET_SIZE_UPDATE;
        } else {
            assert!(
                ctx.composite_rect_offsets.is_empty() && ctx.composite_rect_sizes.is_empty(),
                "composite rects passed to a layer without COMPOSITE"
            );
        }
        assert!(
            !states.is_empty() && eligible.contains(states),
            "update with {states:?}, expected a non-empty subset of {eligible:?}"
        );
        validate_views(ctx);
        if features.contains(LayerFeatures::DRAW) {
            assert!(
                self.store().framebuffer_size().is_some(),
                "update on a drawing layer before set_size"
            );
        }
        self.store_mut().consume(states);
        self.on_update(states, ctx);
    }

    /// Draws a contiguous run of `ctx.data_ids`.
    ///
    /// # Panics
    ///
    /// Panics without [`LayerFeatures::DRAW`], if either range reaches past
    /// its view, or if parallel views in `ctx` disagree on length.
    fn draw(
        &mut self,
        ctx: &LayerUpdate<'_>,
        offset: usize,
        count: usize,
        clip_rect_offset: usize,
        clip_rect_count: usize,
    ) {
        assert!(
            self.features().contains(LayerFeatures::DRAW),
            "layer does not advertise DRAW"
        );
        validate_views(ctx);
        assert!(
            offset + count <= ctx.data_ids.len(),
            "data range {offset}+{count} out of bounds for {} ids",
            ctx.data_ids.len()
        );
        assert!(
            clip_rect_offset + clip_rect_count <= ctx.clip_rect_ids.len(),
            "clip rect range {clip_rect_offset}+{clip_rect_count} out of bounds for {} rects",
            ctx.clip_rect_ids.len()
        );
        self.on_draw(ctx, offset, count, clip_rect_offset, clip_rect_count);
    }

    /// Composites a contiguous run of rects from the renderer's framebuffer.
    ///
    /// # Panics
    ///
    /// Panics without [`LayerFeatures::COMPOSITE`], if the rect views differ
    /// in length, or if the range reaches past them.
    fn composite(
        &mut self,
        renderer: &mut dyn Renderer,
        rect_offsets: &[Point],
        rect_sizes: &[Size],
        offset: usize,
        count: usize,
    ) {
        assert!(
            self.features().contains(LayerFeatures::COMPOSITE),
            "layer does not advertise COMPOSITE"
        );
        assert!(
            rect_offsets.len() == rect_sizes.len(),
            "rect offset and size views differ: {} vs {}",
            rect_offsets.len(),
            rect_sizes.len()
        );
        assert!(
            offset + count <= rect_offsets.len(),
            "rect range {offset}+{count} out of bounds for {} rects",
            rect_offsets.len()
        );
        self.on_composite(renderer, rect_offsets, rect_sizes, offset, count);
    }

    /// Routes a primary pointer press to `data_id`.
    ///
    /// # Panics
    ///
    /// Panics without [`LayerFeatures::EVENT`], for an out-of-range id, an
    /// already-accepted event, or a non-primary pointer.
    fn pointer_press_event(&mut self, data_id: u32, event: &mut PointerEvent) {
        validate_event_dispatch(self.features(), self.store().capacity(), data_id);
        assert!(!event.is_accepted(), "event already accepted");
        assert!(event.primary, "pointer press events are always primary");
        self.on_pointer_press(data_id, event);
    }

    /// Routes a primary pointer release to `data_id`. Same contract as
    /// [`pointer_press_event`](Self::pointer_press_event).
    fn pointer_release_event(&mut self, data_id: u32, event: &mut PointerEvent) {
        validate_event_dispatch(self.features(), self.store().capacity(), data_id);
        assert!(!event.is_accepted(), "event already accepted");
        assert!(event.primary, "pointer release events are always primary");
        self.on_pointer_release(data_id, event);
    }

    /// Routes a synthesized tap-or-click to `data_id`. Same contract as
    /// [`pointer_press_event`](Self::pointer_press_event).
    fn pointer_tap_or_click_event(&mut self, data_id: u32, event: &mut PointerEvent) {
        validate_event_dispatch(self.features(), self.store().capacity(), data_id);
        assert!(!event.is_accepted(), "event already accepted");
        assert!(event.primary, "tap or click events are always primary");
        self.on_pointer_tap_or_click(data_id, event);
    }

    /// Routes a pointer move to `data_id`. Secondary pointers are allowed
    /// here.
    ///
    /// # Panics
    ///
    /// Panics without [`LayerFeatures::EVENT`], for an out-of-range id or an
    /// already-accepted event.
    fn pointer_move_event(&mut self, data_id: u32, event: &mut PointerMoveEvent) {
        validate_event_dispatch(self.features(), self.store().capacity(), data_id);
        assert!(!event.is_accepted(), "event already accepted");
        self.on_pointer_move(data_id, event);
    }

    /// Routes a synthesized pointer enter to `data_id`. Enter events exist
    /// only for the primary pointer.
    fn pointer_enter_event(&mut self, data_id: u32, event: &mut PointerMoveEvent) {
        validate_event_dispatch(self.features(), self.store().capacity(), data_id);
        assert!(!event.is_accepted(), "event already accepted");
        assert!(event.primary, "pointer enter events are always primary");
        self.on_pointer_enter(data_id, event);
    }

    /// Routes a synthesized pointer leave to `data_id`. Leave events exist
    /// only for the primary pointer.
    fn pointer_leave_event(&mut self, data_id: u32, event: &mut PointerMoveEvent) {
        validate_event_dispatch(self.features(), self.store().capacity(), data_id);
        assert!(!event.is_accepted(), "event already accepted");
        assert!(event.primary, "pointer leave events are always primary");
        self.on_pointer_leave(data_id, event);
    }

    /// Routes focus gain to `data_id`.
    fn focus_event(&mut self, data_id: u32, event: &mut FocusEvent) {
        validate_event_dispatch(self.features(), self.store().capacity(), data_id);
        assert!(!event.is_accepted(), "event already accepted");
        self.on_focus(data_id, event);
    }

    /// Routes focus loss to `data_id`.
    fn blur_event(&mut self, data_id: u32, event: &mut FocusEvent) {
        validate_event_dispatch(self.features(), self.store().capacity(), data_id);
        assert!(!event.is_accepted(), "event already accepted");
        self.on_blur(data_id, event);
    }

    /// Routes a key press to `data_id`.
    fn key_press_event(&mut self, data_id: u32, event: &mut KeyEvent) {
        validate_event_dispatch(self.features(), self.store().capacity(), data_id);
        assert!(!event.is_accepted(), "event already accepted");
        self.on_key_press(data_id, event);
    }

    /// Routes a key release to `data_id`.
    fn key_release_event(&mut self, data_id: u32, event: &mut KeyEvent) {
        validate_event_dispatch(self.features(), self.store().capacity(), data_id);
        assert!(!event.is_accepted(), "event already accepted");
        self.on_key_release(data_id, event);
    }

    /// Routes text input to `data_id`.
    fn text_input_event(&mut self, data_id: u32, event: &mut TextInputEvent<'_>) {
        validate_event_dispatch(self.features(), self.store().capacity(), data_id);
        assert!(!event.is_accepted(), "event already accepted");
        self.on_text_input(data_id, event);
    }

    /// Tells `data_id` it is no longer visible to events. Carries no
    /// acceptance.
    fn visibility_lost_event(&mut self, data_id: u32, event: &mut VisibilityLostEvent) {
        validate_event_dispatch(self.features(), self.store().capacity(), data_id);
        self.on_visibility_lost(data_id, event);
    }

    /// Removes every data attached to a node that is stale against
    /// `node_generations` (indexed by node id, 0 for dead nodes), recycles
    /// slots parked by [`remove`](Self::remove), and reports the node-driven
    /// removals to [`on_clean`](Self::on_clean).
    fn clean_nodes(&mut self, node_generations: &[u32]) {
        let removed = self.store_mut().clean_nodes(node_generations);
        self.on_clean(&removed);
    }

    /// Has every animator drop animations attached to dead or regenerated
    /// data of this layer, then recycles slots parked by
    /// [`remove`](Self::remove).
    ///
    /// # Panics
    ///
    /// Panics if an animator lacks
    /// [`DATA_ATTACHMENT`](AnimatorFeatures::DATA_ATTACHMENT) or is assigned
    /// to a different layer.
    fn clean_data(&mut self, animators: &mut [&mut dyn Animator]) {
        let handle = self.store().handle();
        let generations = self.store().data_generations();
        for animator in animators.iter_mut() {
            assert!(
                animator.features().contains(AnimatorFeatures::DATA_ATTACHMENT),
                "animator {:?} does not advertise DATA_ATTACHMENT",
                animator.store().handle()
            );
            assert!(
                animator.store().layer() == Some(handle),
                "animator {:?} is not assigned to layer {handle:?}",
                animator.store().handle()
            );
            animator.clean_data(&generations);
        }
        self.store_mut().finish_clean();
    }

    /// Assigns a data animator to this layer, binding it on first use.
    ///
    /// Assigning the same animator again is a no-op.
    ///
    /// # Panics
    ///
    /// Panics without [`LayerFeatures::ANIMATE_DATA`], if the animator lacks
    /// [`DATA_ATTACHMENT`](AnimatorFeatures::DATA_ATTACHMENT), or if it is
    /// already assigned to a different layer.
    fn assign_data_animator(&mut self, animator: &mut dyn DataAnimator) {
        assert!(
            self.features().contains(LayerFeatures::ANIMATE_DATA),
            "layer does not advertise ANIMATE_DATA"
        );
        bind_animator(self.store().handle(), animator);
    }

    /// Assigns a style animator to this layer, binding it on first use.
    ///
    /// # Panics
    ///
    /// Same contract as [`assign_data_animator`](Self::assign_data_animator),
    /// gated on [`LayerFeatures::ANIMATE_STYLES`].
    fn assign_style_animator(&mut self, animator: &mut dyn StyleAnimator) {
        assert!(
            self.features().contains(LayerFeatures::ANIMATE_STYLES),
            "layer does not advertise ANIMATE_STYLES"
        );
        bind_animator(self.store().handle(), animator);
    }

    /// Records `animator` as the one driving `data`, replacing any style
    /// animator recorded for it.
    ///
    /// # Panics
    ///
    /// Panics without [`LayerFeatures::ANIMATE_DATA`], if the animator is not
    /// assigned to this layer, or if `data` is not a live handle of it.
    fn set_data_animator(&mut self, data: DataHandle, animator: &dyn DataAnimator) {
        assert!(
            self.features().contains(LayerFeatures::ANIMATE_DATA),
            "layer does not advertise ANIMATE_DATA"
        );
        let assigned = AssignedAnimator::Data(checked_assignment(self.store(), animator));
        self.store().validate(data);
        self.store_mut().set_animator(data.local(), assigned);
    }

    /// Records `animator` as the one styling `data`, replacing any data
    /// animator recorded for it.
    ///
    /// # Panics
    ///
    /// Same contract as [`set_data_animator`](Self::set_data_animator), gated
    /// on [`LayerFeatures::ANIMATE_STYLES`].
    fn set_style_animator(&mut self, data: DataHandle, animator: &dyn StyleAnimator) {
        assert!(
            self.features().contains(LayerFeatures::ANIMATE_STYLES),
            "layer does not advertise ANIMATE_STYLES"
        );
        let assigned = AssignedAnimator::Style(checked_assignment(self.store(), animator));
        self.store().validate(data);
        self.store_mut().set_animator(data.local(), assigned);
    }

    /// Advances the assigned data animators to `time`.
    ///
    /// # Panics
    ///
    /// Panics without [`LayerFeatures::ANIMATE_DATA`], if an animator is not
    /// assigned to this layer, or if the scratch views don't all have as many
    /// elements as the animator capacities sum to.
    fn advance_data_animations(
        &mut self,
        time: Nanoseconds,
        active: &mut [bool],
        factors: &mut [f32],
        remove: &mut [bool],
        animators: &mut [&mut dyn DataAnimator],
    ) {
        assert!(
            self.features().contains(LayerFeatures::ANIMATE_DATA),
            "layer does not advertise ANIMATE_DATA"
        );
        let handle = self.store().handle();
        let mut total = 0_usize;
        for animator in animators.iter() {
            assert!(
                animator.store().layer() == Some(handle),
                "animator {:?} is not assigned to layer {handle:?}",
                animator.store().handle()
            );
            total += animator.store().capacity() as usize;
        }
        assert!(
            active.len() == total && factors.len() == total && remove.len() == total,
            "scratch views sized {}, {} and {} but animator capacities sum to {total}",
            active.len(),
            factors.len(),
            remove.len()
        );
        self.on_advance_data_animations(time, active, factors, remove, animators);
    }

    /// Advances the assigned style animators to `time`. Same contract as
    /// [`advance_data_animations`](Self::advance_data_animations), gated on
    /// [`LayerFeatures::ANIMATE_STYLES`].
    fn advance_style_animations(
        &mut self,
        time: Nanoseconds,
        active: &mut [bool],
        factors: &mut [f32],
        remove: &mut [bool],
        animators: &mut [&mut dyn StyleAnimator],
    ) {
        assert!(
            self.features().contains(LayerFeatures::ANIMATE_STYLES),
            "layer does not advertise ANIMATE_STYLES"
        );
        let handle = self.store().handle();
        let mut total = 0_usize;
        for animator in animators.iter() {
            assert!(
                animator.store().layer() == Some(handle),
                "animator {:?} is not assigned to layer {handle:?}",
                animator.store().handle()
            );
            total += animator.store().capacity() as usize;
        }
        assert!(
            active.len() == total && factors.len() == total && remove.len() == total,
            "scratch views sized {}, {} and {} but animator capacities sum to {total}",
            active.len(),
            factors.len(),
            remove.len()
        );
        self.on_advance_style_animations(time, active, factors, remove, animators);
    }
}

fn bind_animator(handle: LayerHandle, animator: &mut dyn Animator) {
    assert!(
        animator.features().contains(AnimatorFeatures::DATA_ATTACHMENT),
        "animator {:?} does not advertise DATA_ATTACHMENT",
        animator.store().handle()
    );
    match animator.store().layer() {
        None => animator.store_mut().bind_layer(handle),
        Some(bound) => assert!(
            bound == handle,
            "animator {:?} is already assigned to layer {bound:?}",
            animator.store().handle()
        ),
    }
}

fn checked_assignment(store: &DataStore, animator: &dyn Animator) -> AnimatorHandle {
    assert!(
        animator.store().layer() == Some(store.handle()),
        "animator {:?} is not assigned to layer {:?}",
        animator.store().handle(),
        store.handle()
    );
    animator.store().handle()
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::animator::{AnimationFlags, AnimationStore};
    use crate::event::{Pointer, PointerEventSource};
    use crate::renderer::{RendererFeatures, RendererState};

    use super::*;

    struct TestLayer {
        store: DataStore,
        features: LayerFeatures,
        polled: LayerStates,
        updates: Vec<LayerStates>,
        sizes: Vec<(Size, Size)>,
        cleaned: Vec<Vec<bool>>,
        drawn: Vec<(usize, usize, usize, usize)>,
        composited: Vec<(usize, usize)>,
        advanced: Vec<usize>,
        events: Vec<&'static str>,
    }

    fn layer(features: LayerFeatures) -> TestLayer {
        TestLayer {
            store: DataStore::new(LayerHandle::new(0, 1)),
            features,
            polled: LayerStates::empty(),
            updates: Vec::new(),
            sizes: Vec::new(),
            cleaned: Vec::new(),
            drawn: Vec::new(),
            composited: Vec::new(),
            advanced: Vec::new(),
            events: Vec::new(),
        }
    }

    impl Layer for TestLayer {
        fn store(&self) -> &DataStore {
            &self.store
        }

        fn store_mut(&mut self) -> &mut DataStore {
            &mut self.store
        }

        fn features(&self) -> LayerFeatures {
            self.features
        }

        fn poll_state(&self) -> LayerStates {
            self.polled
        }

        fn on_set_size(&mut self, size: Size, framebuffer_size: Size) {
            self.sizes.push((size, framebuffer_size));
        }

        fn on_clean(&mut self, data_removed: &[bool]) {
            self.cleaned.push(data_removed.to_vec());
        }

        fn on_update(&mut self, states: LayerStates, _ctx: &LayerUpdate<'_>) {
            self.updates.push(states);
        }

        fn on_draw(
            &mut self,
            _ctx: &LayerUpdate<'_>,
            offset: usize,
            count: usize,
            clip_rect_offset: usize,
            clip_rect_count: usize,
        ) {
            self.drawn.push((offset, count, clip_rect_offset, clip_rect_count));
        }

        fn on_composite(
            &mut self,
            _renderer: &mut dyn Renderer,
            _rect_offsets: &[Point],
            _rect_sizes: &[Size],
            offset: usize,
            count: usize,
        ) {
            self.composited.push((offset, count));
        }

        fn on_advance_data_animations(
            &mut self,
            _time: Nanoseconds,
            active: &mut [bool],
            _factors: &mut [f32],
            _remove: &mut [bool],
            _animators: &mut [&mut dyn DataAnimator],
        ) {
            self.advanced.push(active.len());
        }

        fn on_pointer_press(&mut self, _data_id: u32, event: &mut PointerEvent) {
            event.set_accepted();
            self.events.push("press");
        }

        fn on_pointer_move(&mut self, _data_id: u32, _event: &mut PointerMoveEvent) {
            self.events.push("move");
        }
    }

    struct TestAnimator {
        store: AnimationStore,
        features: AnimatorFeatures,
    }

    fn animator(index: u32) -> TestAnimator {
        TestAnimator {
            store: AnimationStore::new(AnimatorHandle::new(index, 1)),
            features: AnimatorFeatures::DATA_ATTACHMENT,
        }
    }

    impl Animator for TestAnimator {
        fn store(&self) -> &AnimationStore {
            &self.store
        }

        fn store_mut(&mut self) -> &mut AnimationStore {
            &mut self.store
        }

        fn features(&self) -> AnimatorFeatures {
            self.features
        }
    }

    impl DataAnimator for TestAnimator {}
    impl StyleAnimator for TestAnimator {}

    struct TestRenderer {
        state: RendererState,
    }

    impl Renderer for TestRenderer {
        fn state(&self) -> &RendererState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut RendererState {
            &mut self.state
        }

        fn features(&self) -> RendererFeatures {
            RendererFeatures::COMPOSITE
        }
    }

    fn press(primary: bool) -> PointerEvent {
        PointerEvent::new(
            Nanoseconds::from_millis(5),
            PointerEventSource::Mouse,
            Pointer::MouseLeft,
            primary,
            Point::new(16.0, 24.0),
        )
    }

    fn sized(features: LayerFeatures) -> TestLayer {
        let mut layer = layer(features);
        layer.set_size(Size::new(800.0, 600.0), Size::new(1600.0, 1200.0));
        layer
    }

    #[test]
    fn state_unions_tracked_and_polled() {
        let mut layer = layer(LayerFeatures::empty());
        layer.polled = LayerStates::NEEDS_SHARED_DATA_UPDATE;
        layer.set_needs_update(LayerStates::NEEDS_COMMON_DATA_UPDATE);
        assert_eq!(
            layer.state(),
            LayerStates::NEEDS_SHARED_DATA_UPDATE | LayerStates::NEEDS_COMMON_DATA_UPDATE
        );
        // Reading state never consumes it.
        let again = layer.state();
        assert!(again.contains(LayerStates::NEEDS_COMMON_DATA_UPDATE));
    }

    #[test]
    #[should_panic(expected = "outside the eligible")]
    fn polled_attachment_update_is_rejected() {
        let mut layer = layer(LayerFeatures::empty());
        layer.polled = LayerStates::NEEDS_ATTACHMENT_UPDATE;
        let _ = layer.state();
    }

    #[test]
    #[should_panic(expected = "outside the eligible")]
    fn polled_composite_bit_requires_the_feature() {
        let mut layer = layer(LayerFeatures::empty());
        layer.polled = LayerStates::NEEDS_COMPOSITE_OFFSET_SIZE_UPDATE;
        let _ = layer.state();
    }

    #[test]
    #[should_panic(expected = "non-empty subset")]
    fn set_needs_update_rejects_empty() {
        let mut layer = layer(LayerFeatures::empty());
        layer.set_needs_update(LayerStates::empty());
    }

    #[test]
    fn set_size_stores_and_notifies() {
        let mut layer = layer(LayerFeatures::DRAW);
        let size = Size::new(800.0, 600.0);
        let framebuffer = Size::new(1600.0, 1200.0);
        layer.set_size(size, framebuffer);
        assert_eq!(layer.store().size(), Some(size));
        assert_eq!(layer.store().framebuffer_size(), Some(framebuffer));
        assert_eq!(layer.sizes, vec![(size, framebuffer)]);
    }

    #[test]
    #[should_panic(expected = "does not advertise DRAW")]
    fn set_size_requires_draw() {
        let mut layer = layer(LayerFeatures::EVENT);
        layer.set_size(Size::new(1.0, 1.0), Size::new(1.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "has no area")]
    fn set_size_rejects_zero_area() {
        let mut layer = layer(LayerFeatures::DRAW);
        layer.set_size(Size::new(800.0, 0.0), Size::new(1.0, 1.0));
    }

    #[test]
    fn update_clears_exactly_the_passed_subset() {
        let mut layer = layer(LayerFeatures::empty());
        let node = NodeHandle::new(2, 1);
        let _ = layer.create(Some(node));

        let processed = LayerStates::NEEDS_ATTACHMENT_UPDATE | LayerStates::NEEDS_DATA_UPDATE;
        layer.update(processed, &LayerUpdate::default());
        assert_eq!(layer.updates, vec![processed]);
        // Only the bit of NEEDS_NODE_OFFSET_SIZE_UPDATE not shared with the
        // consumed attachment superset survives.
        assert_eq!(
            layer.state(),
            LayerStates::NEEDS_NODE_OFFSET_SIZE_UPDATE
                .difference(LayerStates::NEEDS_NODE_ORDER_UPDATE)
        );

        // A second pass over already-cleared bits is a plain no-op.
        layer.update(processed, &LayerUpdate::default());
        assert_eq!(layer.updates.len(), 2);
    }

    #[test]
    fn update_accepts_full_node_views() {
        let mut layer = sized(LayerFeatures::DRAW);
        let offsets = [Point::new(0.0, 0.0), Point::new(4.0, 4.0)];
        let sizes = [Size::new(10.0, 10.0), Size::new(20.0, 20.0)];
        let enabled = [true, false];
        let ctx = LayerUpdate {
            data_ids: &[0],
            node_offsets: &offsets,
            node_sizes: &sizes,
            nodes_enabled: &enabled,
            ..LayerUpdate::default()
        };
        layer.update(LayerStates::NEEDS_NODE_OFFSET_SIZE_UPDATE, &ctx);
        assert_eq!(layer.updates.len(), 1);
    }

    #[test]
    #[should_panic(expected = "non-empty subset")]
    fn update_rejects_data_clean() {
        let mut layer = layer(LayerFeatures::empty());
        layer.update(LayerStates::NEEDS_DATA_CLEAN, &LayerUpdate::default());
    }

    #[test]
    #[should_panic(expected = "non-empty subset")]
    fn update_rejects_composite_bit_without_feature() {
        let mut layer = layer(LayerFeatures::empty());
        layer.update(
            LayerStates::NEEDS_COMPOSITE_OFFSET_SIZE_UPDATE,
            &LayerUpdate::default(),
        );
    }

    #[test]
    #[should_panic(expected = "composite rects passed to a layer without COMPOSITE")]
    fn update_rejects_composite_rects_without_feature() {
        let mut layer = layer(LayerFeatures::empty());
        let rects = [Point::new(0.0, 0.0)];
        let rect_sizes = [Size::new(1.0, 1.0)];
        let ctx = LayerUpdate {
            composite_rect_offsets: &rects,
            composite_rect_sizes: &rect_sizes,
            ..LayerUpdate::default()
        };
        layer.update(LayerStates::NEEDS_DATA_UPDATE, &ctx);
    }

    #[test]
    #[should_panic(expected = "node offset, size and enabled views differ")]
    fn update_rejects_mismatched_node_views() {
        let mut layer = layer(LayerFeatures::empty());
        let offsets = [Point::new(0.0, 0.0)];
        let ctx = LayerUpdate {
            node_offsets: &offsets,
            ..LayerUpdate::default()
        };
        layer.update(LayerStates::NEEDS_DATA_UPDATE, &ctx);
    }

    #[test]
    #[should_panic(expected = "before set_size")]
    fn update_requires_set_size_on_drawing_layers() {
        let mut layer = layer(LayerFeatures::DRAW);
        layer.update(LayerStates::NEEDS_DATA_UPDATE, &LayerUpdate::default());
    }

    #[test]
    fn draw_forwards_ranges() {
        let mut layer = sized(LayerFeatures::DRAW);
        let ctx = LayerUpdate {
            data_ids: &[0, 1, 2],
            clip_rect_ids: &[0],
            clip_rect_data_counts: &[3],
            ..LayerUpdate::default()
        };
        layer.draw(&ctx, 1, 2, 0, 1);
        assert_eq!(layer.drawn, vec![(1, 2, 0, 1)]);
    }

    #[test]
    #[should_panic(expected = "out of bounds for 3 ids")]
    fn draw_rejects_range_past_the_view() {
        let mut layer = sized(LayerFeatures::DRAW);
        let ctx = LayerUpdate {
            data_ids: &[0, 1, 2],
            ..LayerUpdate::default()
        };
        layer.draw(&ctx, 2, 2, 0, 0);
    }

    #[test]
    #[should_panic(expected = "does not advertise DRAW")]
    fn draw_requires_the_feature() {
        let mut layer = layer(LayerFeatures::EVENT);
        layer.draw(&LayerUpdate::default(), 0, 0, 0, 0);
    }

    #[test]
    fn composite_forwards_to_the_hook() {
        let mut layer = layer(LayerFeatures::COMPOSITE);
        let mut renderer = TestRenderer {
            state: RendererState::new(),
        };
        let offsets = [Point::new(0.0, 0.0), Point::new(8.0, 8.0)];
        let sizes = [Size::new(4.0, 4.0), Size::new(4.0, 4.0)];
        layer.composite(&mut renderer, &offsets, &sizes, 0, 2);
        assert_eq!(layer.composited, vec![(0, 2)]);
    }

    #[test]
    #[should_panic(expected = "does not advertise COMPOSITE")]
    fn composite_requires_the_feature() {
        let mut layer = layer(LayerFeatures::DRAW);
        let mut renderer = TestRenderer {
            state: RendererState::new(),
        };
        layer.composite(&mut renderer, &[], &[], 0, 0);
    }

    #[test]
    fn pointer_press_reaches_the_hook() {
        let mut layer = layer(LayerFeatures::EVENT);
        let _ = layer.create(None);
        let mut event = press(true);
        layer.pointer_press_event(0, &mut event);
        assert!(event.is_accepted());
        assert_eq!(layer.events, vec!["press"]);
    }

    #[test]
    fn secondary_pointer_moves_are_dispatched() {
        let mut layer = layer(LayerFeatures::EVENT);
        let _ = layer.create(None);
        let mut event = PointerMoveEvent::new(
            Nanoseconds::from_millis(5),
            PointerEventSource::Touch,
            Some(Pointer::Finger),
            false,
            Point::new(1.0, 1.0),
            kurbo::Vec2::new(0.5, 0.5),
        );
        layer.pointer_move_event(0, &mut event);
        assert_eq!(layer.events, vec!["move"]);
    }

    #[test]
    #[should_panic(expected = "does not advertise EVENT")]
    fn events_require_the_feature() {
        let mut layer = layer(LayerFeatures::DRAW);
        layer.pointer_press_event(0, &mut press(true));
    }

    #[test]
    #[should_panic(expected = "out of bounds for capacity")]
    fn events_reject_out_of_range_ids() {
        let mut layer = layer(LayerFeatures::EVENT);
        layer.pointer_press_event(0, &mut press(true));
    }

    #[test]
    #[should_panic(expected = "event already accepted")]
    fn accepted_events_are_not_redispatched() {
        let mut layer = layer(LayerFeatures::EVENT);
        let _ = layer.create(None);
        let mut event = press(true);
        event.set_accepted();
        layer.pointer_press_event(0, &mut event);
    }

    #[test]
    #[should_panic(expected = "always primary")]
    fn secondary_pointer_presses_are_rejected() {
        let mut layer = layer(LayerFeatures::EVENT);
        let _ = layer.create(None);
        layer.pointer_press_event(0, &mut press(false));
    }

    #[test]
    fn clean_nodes_reports_the_removal_mask() {
        let mut layer = layer(LayerFeatures::empty());
        let _ = layer.create(Some(NodeHandle::new(0, 1)));
        let _ = layer.create(Some(NodeHandle::new(1, 1)));
        layer.clean_nodes(&[1, 9]);
        assert_eq!(layer.cleaned, vec![vec![false, true]]);
    }

    #[test]
    fn assign_data_animator_binds_once_and_is_idempotent() {
        let mut layer = layer(LayerFeatures::ANIMATE_DATA);
        let mut animator = animator(0);
        layer.assign_data_animator(&mut animator);
        assert_eq!(animator.store.layer(), Some(layer.handle()));
        layer.assign_data_animator(&mut animator);
        assert_eq!(animator.store.layer(), Some(layer.handle()));
    }

    #[test]
    #[should_panic(expected = "already assigned to layer")]
    fn assign_rejects_an_animator_of_another_layer() {
        let mut first = layer(LayerFeatures::ANIMATE_DATA);
        let mut second = TestLayer {
            store: DataStore::new(LayerHandle::new(1, 1)),
            ..layer(LayerFeatures::ANIMATE_DATA)
        };
        let mut animator = animator(0);
        first.assign_data_animator(&mut animator);
        second.assign_data_animator(&mut animator);
    }

    #[test]
    #[should_panic(expected = "does not advertise ANIMATE_DATA")]
    fn assign_data_animator_requires_the_feature() {
        let mut layer = layer(LayerFeatures::empty());
        layer.assign_data_animator(&mut animator(0));
    }

    #[test]
    #[should_panic(expected = "does not advertise DATA_ATTACHMENT")]
    fn assign_rejects_node_attachment_animators() {
        let mut layer = layer(LayerFeatures::ANIMATE_DATA);
        let mut animator = animator(0);
        animator.features = AnimatorFeatures::NODE_ATTACHMENT;
        layer.assign_data_animator(&mut animator);
    }

    #[test]
    fn set_data_animator_records_the_assignment() {
        let mut layer = layer(LayerFeatures::ANIMATE_DATA);
        let mut animator = animator(0);
        layer.assign_data_animator(&mut animator);
        let data = layer.create(None);
        layer.set_data_animator(data, &animator);
        assert_eq!(
            layer.store().data_animator(data),
            Some(animator.store.handle())
        );
    }

    #[test]
    #[should_panic(expected = "is not assigned to layer")]
    fn set_data_animator_requires_assignment_first() {
        let mut layer = layer(LayerFeatures::ANIMATE_DATA);
        let animator = animator(0);
        let data = layer.create(None);
        layer.set_data_animator(data, &animator);
    }

    #[test]
    fn clean_data_prunes_stale_attachments() {
        let mut layer = layer(LayerFeatures::ANIMATE_DATA);
        let mut animator = animator(0);
        layer.assign_data_animator(&mut animator);

        let live = layer.create(None);
        let stale = layer.create(None);
        let kept = animator.create_attached_data(
            Nanoseconds::ZERO,
            Nanoseconds::from_millis(10),
            live,
            1,
            AnimationFlags::empty(),
        );
        let dropped = animator.create_attached_data(
            Nanoseconds::ZERO,
            Nanoseconds::from_millis(10),
            stale,
            1,
            AnimationFlags::empty(),
        );
        layer.remove(stale);

        layer.clean_data(&mut [&mut animator as &mut dyn Animator]);
        assert!(animator.store.is_valid(kept));
        assert!(!animator.store.is_valid(dropped));
        assert!(!layer.state().contains(LayerStates::NEEDS_DATA_CLEAN));
    }

    #[test]
    #[should_panic(expected = "is not assigned to layer")]
    fn clean_data_rejects_foreign_animators() {
        let mut layer = layer(LayerFeatures::ANIMATE_DATA);
        let mut animator = animator(0);
        layer.clean_data(&mut [&mut animator as &mut dyn Animator]);
    }

    #[test]
    fn advance_data_animations_partitions_by_capacity() {
        let mut layer = layer(LayerFeatures::ANIMATE_DATA);
        let mut first = animator(0);
        let mut second = animator(1);
        layer.assign_data_animator(&mut first);
        layer.assign_data_animator(&mut second);
        let duration = Nanoseconds::from_millis(10);
        let _ = first.store.create(Nanoseconds::ZERO, duration, 1, AnimationFlags::empty());
        let _ = first.store.create(Nanoseconds::ZERO, duration, 1, AnimationFlags::empty());
        let _ = second.store.create(Nanoseconds::ZERO, duration, 1, AnimationFlags::empty());

        let mut active = [false; 3];
        let mut factors = [0.0_f32; 3];
        let mut remove = [false; 3];
        layer.advance_data_animations(
            Nanoseconds::from_millis(1),
            &mut active,
            &mut factors,
            &mut remove,
            &mut [&mut first, &mut second],
        );
        assert_eq!(layer.advanced, vec![3]);
    }

    #[test]
    #[should_panic(expected = "animator capacities sum to 1")]
    fn advance_data_animations_rejects_short_scratch() {
        let mut layer = layer(LayerFeatures::ANIMATE_DATA);
        let mut animator = animator(0);
        layer.assign_data_animator(&mut animator);
        let _ = animator.store.create(
            Nanoseconds::ZERO,
            Nanoseconds::from_millis(10),
            1,
            AnimationFlags::empty(),
        );

        let mut active = [false; 0];
        let mut factors = [0.0_f32; 0];
        let mut remove = [false; 0];
        layer.advance_data_animations(
            Nanoseconds::ZERO,
            &mut active,
            &mut factors,
            &mut remove,
            &mut [&mut animator],
        );
    }
}
