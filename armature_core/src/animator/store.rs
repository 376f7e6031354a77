// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation slot storage and the timestamp-driven scheduling machine.

use alloc::vec;
use alloc::vec::Vec;

use crate::handle::{
    AnimationHandle, AnimatorDataHandle, AnimatorHandle, LayerDataHandle, LayerHandle, NodeHandle,
};
use crate::pool::SlotPool;
use crate::time::Nanoseconds;

use super::{AnimationFlags, AnimationState, AnimatorStates};

/// What an animation is attached to.
///
/// At most one of the two attachment kinds, fixed at creation; which kinds an
/// animator may use at all is governed by its
/// [`AnimatorFeatures`](super::AnimatorFeatures).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Attachment {
    /// Not attached to anything.
    #[default]
    None,
    /// Attached to a node; cleaned up when the node goes away.
    Node(NodeHandle),
    /// Attached to data of the assigned layer, by its layer-local handle;
    /// cleaned up when the data goes away.
    Data(LayerDataHandle),
}

#[derive(Clone, Copy, Debug, Default)]
struct Animation {
    played: Nanoseconds,
    paused: Option<Nanoseconds>,
    stopped: Option<Nanoseconds>,
    duration: Nanoseconds,
    repeat_count: u32,
    flags: AnimationFlags,
    attachment: Attachment,
}

/// State of `animation` at time `time`.
///
/// A reached stop point wins over everything, a reached pause point over the
/// rest; only then do the play point and repeat exhaustion decide.
fn state_at(animation: &Animation, time: Nanoseconds) -> AnimationState {
    if let Some(stopped) = animation.stopped {
        if time >= stopped {
            return AnimationState::Stopped;
        }
    }
    if let Some(paused) = animation.paused {
        if time >= paused {
            return AnimationState::Paused;
        }
    }
    if time < animation.played {
        return AnimationState::Scheduled;
    }
    if animation.repeat_count != 0 {
        let total = animation.duration.saturating_mul(i64::from(animation.repeat_count));
        if time - animation.played >= total {
            return AnimationState::Stopped;
        }
    }
    AnimationState::Playing
}

/// Interpolation factor of `animation` at time `time`, in `[0, 1]`.
///
/// The sample point is `time` clamped to any reached pause or stop point, so
/// paused and stopped animations report their frozen factor. An elapsed time
/// that is an exact positive multiple of the duration counts as the end of
/// the previous repeat, not the start of the next.
#[expect(
    clippy::cast_precision_loss,
    reason = "the remainder is below the duration, so the ratio keeps its precision"
)]
fn factor_at(animation: &Animation, time: Nanoseconds) -> f32 {
    let mut sample = time;
    if let Some(paused) = animation.paused {
        if paused <= time {
            sample = sample.min(paused);
        }
    }
    if let Some(stopped) = animation.stopped {
        if stopped <= time {
            sample = sample.min(stopped);
        }
    }
    let elapsed = (sample - animation.played).nanos();
    if elapsed < 0 {
        return 0.0;
    }
    if animation.repeat_count != 0 {
        let total = animation.duration.saturating_mul(i64::from(animation.repeat_count));
        if elapsed >= total.nanos() {
            return 1.0;
        }
    }
    let duration = animation.duration.nanos();
    let remainder = elapsed % duration;
    if remainder == 0 && elapsed > 0 {
        1.0
    } else {
        remainder as f32 / duration as f32
    }
}

/// Animation storage and scheduling state embedded in every animator.
///
/// A concrete animator holds one of these and hands it out through
/// [`Animator::store`](super::Animator::store). Scheduling, property access
/// and the advance/clean protocol live here; the attachment-gated surface is
/// on the [`Animator`](super::Animator) trait.
#[derive(Debug)]
pub struct AnimationStore {
    handle: AnimatorHandle,
    pool: SlotPool<Animation>,
    time: Nanoseconds,
    state: AnimatorStates,
    layer: Option<LayerHandle>,
}

impl AnimationStore {
    /// Creates an empty store for the animator identified by `handle`.
    ///
    /// Time starts at [`Nanoseconds::ZERO`]; the first
    /// [`advance`](Self::advance) must not go below that.
    ///
    /// # Panics
    ///
    /// Panics if the handle carries the reserved generation 0, which no live
    /// animator can have.
    #[must_use]
    pub fn new(handle: AnimatorHandle) -> Self {
        assert!(
            handle.generation() != 0,
            "animator handle generation 0 is reserved: {handle:?}"
        );
        Self {
            handle,
            pool: SlotPool::new(),
            time: Nanoseconds::ZERO,
            state: AnimatorStates::empty(),
            layer: None,
        }
    }

    /// The handle identifying this animator, embedded in every
    /// [`AnimationHandle`] it mints.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> AnimatorHandle {
        self.handle
    }

    /// Number of animation slots ever allocated, including freed ones.
    ///
    /// The scratch views passed to [`advance`](Self::advance) and the mask
    /// passed to clean must have exactly this many elements.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.pool.capacity()
    }

    /// Number of animations currently alive.
    #[inline]
    #[must_use]
    pub fn used_count(&self) -> u32 {
        self.pool.used_count()
    }

    /// The time of the last [`advance`](Self::advance), which every
    /// state/factor query evaluates at.
    #[inline]
    #[must_use]
    pub const fn time(&self) -> Nanoseconds {
        self.time
    }

    /// Accumulated dirty state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> AnimatorStates {
        self.state
    }

    /// The layer this animator was assigned to, if any.
    #[inline]
    #[must_use]
    pub const fn layer(&self) -> Option<LayerHandle> {
        self.layer
    }

    pub(crate) fn bind_layer(&mut self, layer: LayerHandle) {
        self.layer = Some(layer);
    }

    /// Is `animation` a live handle minted by this animator?
    ///
    /// Never panics; handles from other animators are simply not valid here.
    #[must_use]
    pub fn is_valid(&self, animation: AnimationHandle) -> bool {
        animation.animator() == self.handle && self.is_valid_local(animation.local())
    }

    /// Is the animator-local `animation` handle live?
    ///
    /// Never panics, for any input.
    #[must_use]
    pub fn is_valid_local(&self, animation: AnimatorDataHandle) -> bool {
        self.pool.is_valid(animation.index(), animation.generation())
    }

    fn validate(&self, animation: AnimationHandle) {
        assert!(
            self.is_valid(animation),
            "stale or foreign handle: {animation:?} (animator {:?})",
            self.handle
        );
    }

    /// Schedules a new unattached animation.
    ///
    /// `repeat_count` 0 means forever. Sets
    /// [`NEEDS_ADVANCE`](AnimatorStates::NEEDS_ADVANCE).
    ///
    /// # Panics
    ///
    /// Panics if `duration` is not positive or if the slot pool is exhausted.
    pub fn create(
        &mut self,
        played: Nanoseconds,
        duration: Nanoseconds,
        repeat_count: u32,
        flags: AnimationFlags,
    ) -> AnimationHandle {
        self.create_attached(played, duration, repeat_count, flags, Attachment::None)
    }

    pub(crate) fn create_attached(
        &mut self,
        played: Nanoseconds,
        duration: Nanoseconds,
        repeat_count: u32,
        flags: AnimationFlags,
        attachment: Attachment,
    ) -> AnimationHandle {
        assert!(
            duration > Nanoseconds::ZERO,
            "animation duration must be positive, got {duration:?}"
        );
        let (index, generation) = self.pool.create();
        *self.pool.payload_mut(index) = Animation {
            played,
            paused: None,
            stopped: None,
            duration,
            repeat_count,
            flags,
            attachment,
        };
        self.state |= AnimatorStates::NEEDS_ADVANCE;
        AnimationHandle::new(self.handle, AnimatorDataHandle::new(index, generation))
    }

    /// Frees `animation` immediately; its slot goes back into circulation
    /// without waiting for a clean pass, unlike layer data.
    ///
    /// # Panics
    ///
    /// Panics if `animation` is not a live handle of this animator.
    pub fn remove(&mut self, animation: AnimationHandle) {
        self.validate(animation);
        self.pool.remove(animation.local().index(), animation.local().generation());
    }

    /// The animation's duration.
    ///
    /// # Panics
    ///
    /// Panics if `animation` is not a live handle of this animator, as do all
    /// the property accessors and setters below.
    #[must_use]
    pub fn duration(&self, animation: AnimationHandle) -> Nanoseconds {
        self.validate(animation);
        self.pool.payload(animation.local().index()).duration
    }

    /// How many times the animation runs, 0 meaning forever.
    #[must_use]
    pub fn repeat_count(&self, animation: AnimationHandle) -> u32 {
        self.validate(animation);
        self.pool.payload(animation.local().index()).repeat_count
    }

    /// Changes the repeat count, taking effect at the next state query.
    pub fn set_repeat_count(&mut self, animation: AnimationHandle, repeat_count: u32) {
        self.validate(animation);
        let index = animation.local().index();
        self.pool.payload_mut(index).repeat_count = repeat_count;
    }

    /// The animation's behavior flags.
    #[must_use]
    pub fn flags(&self, animation: AnimationHandle) -> AnimationFlags {
        self.validate(animation);
        self.pool.payload(animation.local().index()).flags
    }

    /// Replaces the animation's behavior flags.
    pub fn set_flags(&mut self, animation: AnimationHandle, flags: AnimationFlags) {
        self.validate(animation);
        self.pool.payload_mut(animation.local().index()).flags = flags;
    }

    /// Adds to the animation's behavior flags.
    pub fn add_flags(&mut self, animation: AnimationHandle, flags: AnimationFlags) {
        self.validate(animation);
        self.pool.payload_mut(animation.local().index()).flags |= flags;
    }

    /// Removes from the animation's behavior flags.
    pub fn clear_flags(&mut self, animation: AnimationHandle, flags: AnimationFlags) {
        self.validate(animation);
        self.pool.payload_mut(animation.local().index()).flags &= !flags;
    }

    /// When the animation (re)starts playing.
    #[must_use]
    pub fn played(&self, animation: AnimationHandle) -> Nanoseconds {
        self.validate(animation);
        self.pool.payload(animation.local().index()).played
    }

    /// The pause point, if one was requested.
    #[must_use]
    pub fn paused(&self, animation: AnimationHandle) -> Option<Nanoseconds> {
        self.validate(animation);
        self.pool.payload(animation.local().index()).paused
    }

    /// The stop point, if one was requested.
    #[must_use]
    pub fn stopped(&self, animation: AnimationHandle) -> Option<Nanoseconds> {
        self.validate(animation);
        self.pool.payload(animation.local().index()).stopped
    }

    /// What the animation is attached to.
    #[must_use]
    pub fn attachment(&self, animation: AnimationHandle) -> Attachment {
        self.validate(animation);
        self.pool.payload(animation.local().index()).attachment
    }

    /// (Re)starts the animation at `time`, dropping any pause or stop point.
    ///
    /// If a pause point had actually been reached, the play point is shifted
    /// so the animation resumes where the pause froze it instead of starting
    /// over. Sets [`NEEDS_ADVANCE`](AnimatorStates::NEEDS_ADVANCE).
    ///
    /// # Panics
    ///
    /// Panics if `animation` is not a live handle of this animator.
    pub fn play(&mut self, animation: AnimationHandle, time: Nanoseconds) {
        self.validate(animation);
        let entry = self.pool.payload_mut(animation.local().index());
        entry.played = match entry.paused {
            Some(paused) if paused <= time && entry.played < paused => {
                time - (paused - entry.played)
            }
            _ => time,
        };
        entry.paused = None;
        entry.stopped = None;
        self.state |= AnimatorStates::NEEDS_ADVANCE;
    }

    /// Requests a pause at `time`, which may lie in the future.
    ///
    /// Sets [`NEEDS_ADVANCE`](AnimatorStates::NEEDS_ADVANCE) so the freeze
    /// sample gets delivered.
    pub fn pause(&mut self, animation: AnimationHandle, time: Nanoseconds) {
        self.validate(animation);
        self.pool.payload_mut(animation.local().index()).paused = Some(time);
        self.state |= AnimatorStates::NEEDS_ADVANCE;
    }

    /// Requests a stop at `time`, which may lie in the future.
    ///
    /// Sets [`NEEDS_ADVANCE`](AnimatorStates::NEEDS_ADVANCE) so the final
    /// sample gets delivered.
    pub fn stop(&mut self, animation: AnimationHandle, time: Nanoseconds) {
        self.validate(animation);
        self.pool.payload_mut(animation.local().index()).stopped = Some(time);
        self.state |= AnimatorStates::NEEDS_ADVANCE;
    }

    /// The animation's state at the stored time.
    ///
    /// # Panics
    ///
    /// Panics if `animation` is not a live handle of this animator.
    #[must_use]
    pub fn animation_state(&self, animation: AnimationHandle) -> AnimationState {
        self.validate(animation);
        state_at(self.pool.payload(animation.local().index()), self.time)
    }

    /// The animation's interpolation factor at the stored time, in `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `animation` is not a live handle of this animator.
    #[must_use]
    pub fn factor(&self, animation: AnimationHandle) -> f32 {
        self.validate(animation);
        factor_at(self.pool.payload(animation.local().index()), self.time)
    }

    /// Advances to `time`, filling one entry per slot in the scratch views.
    ///
    /// `active[i]` is set when animation `i` is playing at `time`, or when it
    /// just froze into paused/stopped since the previous advance and its one
    /// final sample is due. `factors[i]` is written only where `active[i]` is
    /// set. `remove[i]` is set for stopped animations without
    /// [`KEEP_ONCE_PLAYED`](AnimationFlags::KEEP_ONCE_PLAYED); the caller is
    /// expected to pass the mask on to clean. Entries for unused slots are
    /// written `false`.
    ///
    /// Returns whether anything is active and whether anything wants removal.
    /// [`NEEDS_ADVANCE`](AnimatorStates::NEEDS_ADVANCE) is re-derived to
    /// whether some animation is scheduled or playing at `time`.
    ///
    /// # Panics
    ///
    /// Panics if `time` is before the previously stored time or if the three
    /// scratch views don't all have exactly [`capacity`](Self::capacity)
    /// elements.
    pub fn advance(
        &mut self,
        time: Nanoseconds,
        active: &mut [bool],
        factors: &mut [f32],
        remove: &mut [bool],
    ) -> (bool, bool) {
        assert!(
            time >= self.time,
            "advance time {time:?} is before the stored {:?}",
            self.time
        );
        let capacity = self.pool.capacity() as usize;
        assert!(
            active.len() == capacity && factors.len() == capacity && remove.len() == capacity,
            "scratch views sized {}, {} and {} but capacity is {capacity}",
            active.len(),
            factors.len(),
            remove.len()
        );

        let mut any_active = false;
        let mut any_remove = false;
        let mut needs_advance = false;
        for index in 0..self.pool.capacity() {
            let i = index as usize;
            if !self.pool.is_used(index) {
                active[i] = false;
                remove[i] = false;
                continue;
            }
            let animation = self.pool.payload(index);
            let before = state_at(animation, self.time);
            let now = state_at(animation, time);

            let was_frozen = matches!(before, AnimationState::Paused | AnimationState::Stopped);
            let is_active = now == AnimationState::Playing
                || (matches!(now, AnimationState::Paused | AnimationState::Stopped)
                    && !was_frozen);
            active[i] = is_active;
            if is_active {
                factors[i] = factor_at(animation, time);
                any_active = true;
            }

            let removing = now == AnimationState::Stopped
                && !animation.flags.contains(AnimationFlags::KEEP_ONCE_PLAYED);
            remove[i] = removing;
            any_remove |= removing;

            needs_advance |= matches!(now, AnimationState::Scheduled | AnimationState::Playing);
        }

        self.state.set(AnimatorStates::NEEDS_ADVANCE, needs_advance);
        self.time = time;
        (any_active, any_remove)
    }

    /// Frees every slot whose mask bit is set. Every marked slot must be
    /// alive.
    ///
    /// # Panics
    ///
    /// Panics if the mask doesn't have exactly [`capacity`](Self::capacity)
    /// elements or marks a slot that isn't in use.
    pub(crate) fn remove_masked(&mut self, remove: &[bool]) {
        assert!(
            remove.len() == self.pool.capacity() as usize,
            "mask has {} elements but capacity is {}",
            remove.len(),
            self.pool.capacity()
        );
        for index in 0..self.pool.capacity() {
            if remove[index as usize] {
                self.pool.remove_at(index);
            }
        }
    }

    /// Frees every animation attached to data that is stale against
    /// `data_generations` (indexed by data id, 0 for dead slots). Returns the
    /// removal mask.
    pub(crate) fn prune_data(&mut self, data_generations: &[u32]) -> Vec<bool> {
        self.prune(data_generations, |attachment| match attachment {
            Attachment::Data(data) => Some((data.index(), data.generation())),
            _ => None,
        })
    }

    /// Frees every animation attached to a node that is stale against
    /// `node_generations`. Returns the removal mask.
    pub(crate) fn prune_nodes(&mut self, node_generations: &[u32]) -> Vec<bool> {
        self.prune(node_generations, |attachment| match attachment {
            Attachment::Node(node) => Some((node.index(), node.generation())),
            _ => None,
        })
    }

    fn prune(
        &mut self,
        generations: &[u32],
        target: impl Fn(Attachment) -> Option<(u32, u32)>,
    ) -> Vec<bool> {
        let capacity = self.pool.capacity();
        let mut removed = vec![false; capacity as usize];
        for index in 0..capacity {
            if !self.pool.is_used(index) {
                continue;
            }
            let Some((target_index, target_generation)) =
                target(self.pool.payload(index).attachment)
            else {
                continue;
            };
            let stale = generations
                .get(target_index as usize)
                .is_none_or(|&generation| generation != target_generation);
            if stale {
                self.pool.remove_at(index);
                removed[index as usize] = true;
            }
        }
        removed
    }
}
