// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animators: time-based scheduling over generational animation slots.
//!
//! An animator owns a set of animations, each described purely by timestamps
//! (`played`, optional `paused`/`stopped` freeze points), a positive duration
//! and a repeat count. Nothing ticks in the background; the orchestrator
//! calls [`AnimationStore::advance`] once per frame with a monotonic time and
//! the store derives, per animation, whether it is [`Scheduled`], [`Playing`],
//! [`Paused`] or [`Stopped`] and what its interpolation factor is. All time
//! math stays in integer nanoseconds until the final factor division.
//!
//! The [`Animator`] trait layers the capability-gated surface on top: an
//! animator advertising [`AnimatorFeatures::NODE_ATTACHMENT`] can tie
//! animations to nodes, one advertising
//! [`AnimatorFeatures::DATA_ATTACHMENT`] to layer data. [`GenericAnimator`]
//! and [`NodeAnimator`] package the per-frame advance-then-clean protocol
//! for the two common shapes.
//!
//! [`Scheduled`]: AnimationState::Scheduled
//! [`Playing`]: AnimationState::Playing
//! [`Paused`]: AnimationState::Paused
//! [`Stopped`]: AnimationState::Stopped

use bitflags::bitflags;

mod dispatch;
mod generic;
mod node;
mod store;

pub use dispatch::{Animator, DataAnimator, StyleAnimator};
pub use generic::GenericAnimator;
pub use node::{NodeAnimations, NodeAnimator, NodeFlags};
pub use store::{AnimationStore, Attachment};

bitflags! {
    /// Fixed capabilities an animator advertises.
    ///
    /// The two attachment features are mutually exclusive; an animator
    /// advertising both trips an assertion the first time its capabilities
    /// are consulted.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AnimatorFeatures: u8 {
        /// Animations can be attached to nodes.
        const NODE_ATTACHMENT = 1 << 0;
        /// Animations can be attached to data of the assigned layer.
        const DATA_ATTACHMENT = 1 << 1;
    }
}

bitflags! {
    /// Accumulated dirty state of an animator.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AnimatorStates: u8 {
        /// Some animation is scheduled, playing, or has an unconsumed
        /// freeze/stop sample; the next frame should call advance.
        const NEEDS_ADVANCE = 1 << 0;
    }
}

bitflags! {
    /// Per-animation behavior flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AnimationFlags: u8 {
        /// Keep the animation slot alive once it stops instead of marking it
        /// for removal in advance's remove mask.
        const KEEP_ONCE_PLAYED = 1 << 0;
    }
}

/// Scheduling state of one animation, derived from its timestamps and the
/// animator's current time; never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    /// The play point lies in the future.
    Scheduled,
    /// Between the play point and its natural or forced end.
    Playing,
    /// A pause point is in effect; the factor is frozen there.
    Paused,
    /// Past a stop point or past all repeats.
    Stopped,
}

pub(crate) fn checked_features(features: AnimatorFeatures) -> AnimatorFeatures {
    let attachments = AnimatorFeatures::NODE_ATTACHMENT | AnimatorFeatures::DATA_ATTACHMENT;
    assert!(
        !features.contains(attachments),
        "NODE_ATTACHMENT and DATA_ATTACHMENT are mutually exclusive"
    );
    features
}
