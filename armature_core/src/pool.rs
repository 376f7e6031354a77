// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot pool.
//!
//! [`SlotPool`] is the allocator behind both the layer's data store and the
//! animator's animation store. Slots are addressed by `(index, generation)`
//! pairs; freed slots are reused oldest-first so that an index cycles
//! through the whole generation space before repeating a pair, and a slot
//! whose 12-bit generation wraps around is retired permanently rather than
//! ever handing the same pair out twice.
//!
//! The layer store additionally needs removal to be observable before the
//! slot is recycled (animations may still point at the dying data), so a
//! slot can be [marked removed](SlotPool::mark_removed) — immediately
//! invalid, not yet reusable — and later swept into the free list by
//! [`recycle_marked`](SlotPool::recycle_marked).

use alloc::vec::Vec;

use crate::handle::{WIDE_GENERATION_BITS, WIDE_INDEX_BITS};

/// Maximum number of slots a pool will ever allocate.
///
/// This is the full 20-bit index space of the wide handle types.
pub const MAX_SLOTS: u32 = 1 << WIDE_INDEX_BITS;

const GENERATION_MASK: u32 = (1 << WIDE_GENERATION_BITS) - 1;

/// Sentinel for "no slot" in free-list links.
const NONE: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    /// Live; the stored generation validates handles.
    Used,
    /// Invalidated but kept allocated until the next recycle sweep.
    Pending,
    /// Linked into the free list, awaiting reuse.
    Free,
    /// Generation wrapped to 0; never handed out again.
    Retired,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    state: SlotState,
    next_free: u32,
    payload: T,
}

/// A generational slot allocator with FIFO reuse.
///
/// `T` is the per-slot payload; it is reset to `T::default()` whenever the
/// slot changes hands.
#[derive(Debug)]
pub struct SlotPool<T> {
    slots: Vec<Slot<T>>,
    first_free: u32,
    last_free: u32,
    used: u32,
}

impl<T: Default> SlotPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            first_free: NONE,
            last_free: NONE,
            used: 0,
        }
    }

    /// Allocates a slot and returns its `(index, generation)` pair.
    ///
    /// The oldest freed slot is reused first, keeping the generation it was
    /// left with; otherwise a fresh slot is appended at generation 1. Either
    /// way the payload starts out as `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if the pool already holds [`MAX_SLOTS`] slots.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot count is bounded by MAX_SLOTS, well inside u32"
    )]
    pub fn create(&mut self) -> (u32, u32) {
        if self.first_free != NONE {
            let index = self.first_free;
            let slot = &mut self.slots[index as usize];
            self.first_free = slot.next_free;
            if self.first_free == NONE {
                self.last_free = NONE;
            }
            slot.next_free = NONE;
            slot.state = SlotState::Used;
            slot.payload = T::default();
            self.used += 1;
            return (index, slot.generation);
        }
        assert!(
            self.slots.len() < MAX_SLOTS as usize,
            "slot pool exhausted: all {MAX_SLOTS} indices are allocated"
        );
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            state: SlotState::Used,
            next_free: NONE,
            payload: T::default(),
        });
        self.used += 1;
        (index, 1)
    }

    /// Frees a live slot, immediately appending it to the free-list tail.
    ///
    /// The slot's generation is incremented so every outstanding
    /// `(index, generation)` pair for it turns invalid; when the increment
    /// wraps the 12-bit space the slot is retired instead of reused.
    ///
    /// # Panics
    ///
    /// Panics if the pair does not name a live slot.
    pub fn remove(&mut self, index: u32, generation: u32) {
        assert!(
            self.is_valid(index, generation),
            "stale slot {index}@gen{generation}"
        );
        self.used -= 1;
        if self.invalidate(index) {
            self.slots[index as usize].state = SlotState::Free;
            self.push_free(index);
        }
    }

    /// Invalidates a live slot without recycling it.
    ///
    /// Outstanding handles to the slot stop validating at once, but the
    /// index stays out of circulation until [`recycle_marked`] runs. Used by
    /// the layer store, where removal and physical cleanup are separate
    /// phases.
    ///
    /// # Panics
    ///
    /// Panics if the pair does not name a live slot.
    ///
    /// [`recycle_marked`]: Self::recycle_marked
    pub fn mark_removed(&mut self, index: u32, generation: u32) {
        assert!(
            self.is_valid(index, generation),
            "stale slot {index}@gen{generation}"
        );
        self.used -= 1;
        if self.invalidate(index) {
            self.slots[index as usize].state = SlotState::Pending;
        }
    }

    /// Moves every marked slot to the free-list tail, in index order.
    ///
    /// Returns how many slots were recycled.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot count is bounded by MAX_SLOTS, well inside u32"
    )]
    pub fn recycle_marked(&mut self) -> u32 {
        let mut recycled = 0;
        for index in 0..self.slots.len() {
            if self.slots[index].state == SlotState::Pending {
                self.slots[index].state = SlotState::Free;
                self.push_free(index as u32);
                recycled += 1;
            }
        }
        recycled
    }

    /// Frees a live slot by index alone, for sweeps that already checked
    /// liveness via [`is_used`](Self::is_used).
    ///
    /// # Panics
    ///
    /// Panics if the slot is not in use.
    pub(crate) fn remove_at(&mut self, index: u32) {
        assert!(self.is_used(index), "slot {index} is not in use");
        self.used -= 1;
        if self.invalidate(index) {
            self.slots[index as usize].state = SlotState::Free;
            self.push_free(index);
        }
    }

    /// Bumps the generation and resets the payload. Returns `false` when the
    /// generation wrapped and the slot was retired instead.
    fn invalidate(&mut self, index: u32) -> bool {
        let slot = &mut self.slots[index as usize];
        slot.generation = (slot.generation + 1) & GENERATION_MASK;
        slot.payload = T::default();
        if slot.generation == 0 {
            slot.state = SlotState::Retired;
            return false;
        }
        true
    }

    fn push_free(&mut self, index: u32) {
        self.slots[index as usize].next_free = NONE;
        if self.last_free == NONE {
            self.first_free = index;
        } else {
            self.slots[self.last_free as usize].next_free = index;
        }
        self.last_free = index;
    }
}

impl<T> SlotPool<T> {
    /// Is this `(index, generation)` pair a live slot?
    ///
    /// Never panics, for any input.
    #[must_use]
    pub fn is_valid(&self, index: u32, generation: u32) -> bool {
        if generation == 0 {
            return false;
        }
        let Some(slot) = self.slots.get(index as usize) else {
            return false;
        };
        slot.state == SlotState::Used && slot.generation == generation
    }

    /// Is the slot at `index` in use? Out-of-range indices are not.
    #[must_use]
    pub fn is_used(&self, index: u32) -> bool {
        self.slots
            .get(index as usize)
            .is_some_and(|slot| slot.state == SlotState::Used)
    }

    /// Number of slots ever allocated, including freed and retired ones.
    ///
    /// This is the length every per-slot scratch view handed to batch
    /// operations has to match.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot count is bounded by MAX_SLOTS, well inside u32"
    )]
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Number of slots currently in use.
    #[inline]
    #[must_use]
    pub fn used_count(&self) -> u32 {
        self.used
    }

    /// Returns the generation currently stored for `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn generation_at(&self, index: u32) -> u32 {
        self.slots[index as usize].generation
    }

    /// Returns the payload of a slot in use.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not in use.
    #[must_use]
    pub fn payload(&self, index: u32) -> &T {
        let slot = &self.slots[index as usize];
        assert!(slot.state == SlotState::Used, "slot {index} is not in use");
        &slot.payload
    }

    /// Mutable access to the payload of a slot in use.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not in use.
    pub fn payload_mut(&mut self, index: u32) -> &mut T {
        let slot = &mut self.slots[index as usize];
        assert!(slot.state == SlotState::Used, "slot {index} is not in use");
        &mut slot.payload
    }

    /// Iterates over `(index, payload)` for every slot in use.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot count is bounded by MAX_SLOTS, well inside u32"
    )]
    pub fn iter_used(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state == SlotState::Used)
            .map(|(index, slot)| (index as u32, &slot.payload))
    }
}

impl<T: Default> Default for SlotPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_starts_at_generation_one() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        assert_eq!(pool.create(), (0, 1));
        assert_eq!(pool.create(), (1, 1));
        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.used_count(), 2);
    }

    #[test]
    fn remove_bumps_generation_and_reuses() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let (index, generation) = pool.create();
        pool.remove(index, generation);
        assert!(!pool.is_valid(index, generation));
        assert_eq!(pool.used_count(), 0);

        let (reused, new_generation) = pool.create();
        assert_eq!(reused, index);
        assert_eq!(new_generation, generation + 1);
        assert!(pool.is_valid(reused, new_generation));
    }

    #[test]
    fn fifo_reuse_order() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let a = pool.create();
        let b = pool.create();
        let c = pool.create();
        pool.remove(a.0, a.1);
        pool.remove(b.0, b.1);
        pool.remove(c.0, c.1);
        // Oldest removal is reused first.
        assert_eq!(pool.create().0, a.0);
        assert_eq!(pool.create().0, b.0);
        assert_eq!(pool.create().0, c.0);
    }

    #[test]
    fn payload_resets_on_reuse() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let (index, generation) = pool.create();
        *pool.payload_mut(index) = 99;
        pool.remove(index, generation);
        let (reused, _) = pool.create();
        assert_eq!(reused, index);
        assert_eq!(*pool.payload(reused), 0);
    }

    #[test]
    fn is_valid_never_panics() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let (index, generation) = pool.create();
        assert!(pool.is_valid(index, generation));
        assert!(!pool.is_valid(index, 0));
        assert!(!pool.is_valid(index, generation + 1));
        assert!(!pool.is_valid(u32::MAX, 1));
        assert!(!pool.is_valid(1 << 20, 1));
    }

    #[test]
    fn mark_removed_defers_recycling() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let (index, generation) = pool.create();
        pool.mark_removed(index, generation);
        assert!(!pool.is_valid(index, generation));
        assert_eq!(pool.used_count(), 0);
        assert_eq!(pool.capacity(), 1);

        // The slot is not reusable until the sweep runs.
        let (fresh, _) = pool.create();
        assert_ne!(fresh, index);

        assert_eq!(pool.recycle_marked(), 1);
        let (reused, new_generation) = pool.create();
        assert_eq!(reused, index);
        assert_eq!(new_generation, generation + 1);
    }

    #[test]
    fn generation_wrap_retires_slot() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let (index, mut generation) = pool.create();
        while generation < GENERATION_MASK {
            pool.remove(index, generation);
            let (reused, next) = pool.create();
            assert_eq!(reused, index);
            generation = next;
        }
        // Removing at the last representable generation wraps to 0.
        pool.remove(index, generation);
        let (fresh, first) = pool.create();
        assert_ne!(fresh, index);
        assert_eq!(first, 1);
        assert!(!pool.is_valid(index, 0));
    }

    #[test]
    fn iter_used_skips_freed() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let a = pool.create();
        let b = pool.create();
        *pool.payload_mut(b.0) = 7;
        pool.remove(a.0, a.1);
        let collected: alloc::vec::Vec<_> = pool.iter_used().map(|(i, p)| (i, *p)).collect();
        assert_eq!(collected, alloc::vec![(b.0, 7)]);
    }

    #[test]
    #[should_panic(expected = "stale slot 0@gen1")]
    fn remove_stale_panics() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let (index, generation) = pool.create();
        pool.remove(index, generation);
        pool.remove(index, generation);
    }

    #[test]
    #[should_panic(expected = "slot 0 is not in use")]
    fn payload_of_freed_slot_panics() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let (index, generation) = pool.create();
        pool.remove(index, generation);
        let _ = pool.payload(index);
    }
}
