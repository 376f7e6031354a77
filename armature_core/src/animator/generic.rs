// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Self-contained animators driven by a single per-frame call.

use alloc::vec;

use crate::time::Nanoseconds;

use super::Animator;

/// An animator whose whole effect lives in its
/// [`on_advance`](Self::on_advance) hook.
///
/// Concrete implementations fill in `on_advance` and call
/// [`animate`](Self::animate) once per frame; scratch allocation, the advance
/// protocol and the retirement of finished animations are handled here. The
/// factors are the only output, so a generic animator needs no attachment
/// capability at all.
pub trait GenericAnimator: Animator {
    /// Applies one advance step.
    ///
    /// Both views are indexed by animation id; `factors[i]` is meaningful
    /// only where `active[i]` is set.
    fn on_advance(&mut self, active: &[bool], factors: &[f32]);

    /// Advances every animation to `time`, forwards the factors to
    /// [`on_advance`](Self::on_advance) and retires the animations that
    /// stopped without [`KEEP_ONCE_PLAYED`](super::AnimationFlags::KEEP_ONCE_PLAYED).
    ///
    /// The hook is skipped entirely when no animation is active at `time`.
    ///
    /// # Panics
    ///
    /// Panics if `time` is before the store's last advance time.
    fn animate(&mut self, time: Nanoseconds) {
        let capacity = self.store().capacity() as usize;
        let mut active = vec![false; capacity];
        let mut factors = vec![0.0; capacity];
        let mut remove = vec![false; capacity];
        let store = self.store_mut();
        let (any_active, any_remove) = store.advance(time, &mut active, &mut factors, &mut remove);
        if any_active {
            self.on_advance(&active, &factors);
        }
        if any_remove {
            self.clean(&remove);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::handle::AnimatorHandle;

    use super::super::store::AnimationStore;
    use super::super::{AnimationFlags, AnimationState, AnimatorFeatures};
    use super::*;

    struct OpacityAnimator {
        store: AnimationStore,
        advanced: Vec<(Vec<bool>, Vec<f32>)>,
        cleaned: Vec<Vec<bool>>,
    }

    fn animator() -> OpacityAnimator {
        OpacityAnimator {
            store: AnimationStore::new(AnimatorHandle::new(0, 1)),
            advanced: Vec::new(),
            cleaned: Vec::new(),
        }
    }

    impl Animator for OpacityAnimator {
        fn store(&self) -> &AnimationStore {
            &self.store
        }

        fn store_mut(&mut self) -> &mut AnimationStore {
            &mut self.store
        }

        fn features(&self) -> AnimatorFeatures {
            AnimatorFeatures::empty()
        }

        fn on_clean(&mut self, removed: &[bool]) {
            self.cleaned.push(removed.to_vec());
        }
    }

    impl GenericAnimator for OpacityAnimator {
        fn on_advance(&mut self, active: &[bool], factors: &[f32]) {
            self.advanced.push((active.to_vec(), factors.to_vec()));
        }
    }

    const D10: Nanoseconds = Nanoseconds(10);

    #[test]
    fn animate_feeds_factors_to_the_hook() {
        let mut animator = animator();
        let _ = animator.store.create(Nanoseconds::ZERO, D10, 0, AnimationFlags::empty());
        let scheduled = animator.store.create(Nanoseconds(100), D10, 0, AnimationFlags::empty());

        animator.animate(Nanoseconds(3));
        assert_eq!(animator.advanced, vec![(vec![true, false], vec![0.3, 0.0])]);
        assert!(animator.cleaned.is_empty());
        assert_eq!(
            animator.store.animation_state(scheduled),
            AnimationState::Scheduled
        );
    }

    #[test]
    fn animate_skips_the_hook_while_nothing_is_active() {
        let mut animator = animator();
        let _ = animator.store.create(Nanoseconds(100), D10, 1, AnimationFlags::empty());

        animator.animate(Nanoseconds(50));
        assert!(animator.advanced.is_empty());
    }

    #[test]
    fn animate_retires_finished_animations() {
        let mut animator = animator();
        let finished = animator.store.create(Nanoseconds::ZERO, D10, 1, AnimationFlags::empty());
        let kept =
            animator.store.create(Nanoseconds::ZERO, D10, 1, AnimationFlags::KEEP_ONCE_PLAYED);

        animator.animate(Nanoseconds(10));
        // Both deliver their final factor 1.0 sample before retirement.
        assert_eq!(animator.advanced, vec![(vec![true, true], vec![1.0, 1.0])]);
        assert_eq!(animator.cleaned, vec![vec![true, false]]);
        assert!(!animator.store.is_valid(finished));
        assert!(animator.store.is_valid(kept));

        animator.animate(Nanoseconds(20));
        assert_eq!(animator.advanced.len(), 1);
        assert_eq!(animator.cleaned.len(), 1);
    }

    #[test]
    #[should_panic(expected = "is before the stored")]
    fn animate_rejects_time_going_backwards() {
        let mut animator = animator();
        animator.animate(Nanoseconds(5));
        animator.animate(Nanoseconds(4));
    }
}
