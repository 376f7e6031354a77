// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer state transitions around draw and composite passes.
//!
//! A concrete renderer owns the graphics state a frame needs: framebuffer
//! bindings, blending, scissor. The orchestrator never touches those
//! directly; it announces where the frame is going through
//! [`Renderer::transition`] and the renderer reacts in its
//! [`on_transition`](Renderer::on_transition) hook. The transition table is
//! deliberately small so a backend only has to handle the edges that can
//! actually occur.

use bitflags::bitflags;
use kurbo::Size;

bitflags! {
    /// Fixed capabilities a renderer advertises.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RendererFeatures: u8 {
        /// The renderer can hand framebuffer contents back to compositing
        /// layers, enabling the [`Composite`](TargetState::Composite) target
        /// state.
        const COMPOSITE = 1 << 0;
    }
}

bitflags! {
    /// Draw-pass state accompanying a transition to
    /// [`Draw`](TargetState::Draw).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DrawStates: u8 {
        /// Blending is enabled for the upcoming draws.
        const BLENDING = 1 << 0;
        /// Scissor clipping is enabled for the upcoming draws.
        const SCISSOR = 1 << 1;
    }
}

/// Where a frame currently stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetState {
    /// Before the first draw of a frame.
    #[default]
    Initial,
    /// Drawing layer contents.
    Draw,
    /// Reading framebuffer contents back for a compositing layer.
    Composite,
    /// The frame is done.
    Final,
}

/// Transition state embedded in every renderer.
///
/// A concrete renderer holds one of these and hands it out through
/// [`Renderer::state`]; all mutation goes through the [`Renderer`] entry
/// points.
#[derive(Debug)]
pub struct RendererState {
    target: TargetState,
    draw: DrawStates,
    framebuffer_size: Option<Size>,
}

impl RendererState {
    /// Creates the state of a fresh renderer, in
    /// [`Initial`](TargetState::Initial) with no framebuffer set up.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            target: TargetState::Initial,
            draw: DrawStates::empty(),
            framebuffer_size: None,
        }
    }

    /// The current target state.
    #[inline]
    #[must_use]
    pub fn target_state(&self) -> TargetState {
        self.target
    }

    /// The draw states of the last transition to
    /// [`Draw`](TargetState::Draw), empty otherwise.
    #[inline]
    #[must_use]
    pub fn draw_states(&self) -> DrawStates {
        self.draw
    }

    /// The framebuffer size of the last
    /// [`setup_framebuffers`](Renderer::setup_framebuffers), if any.
    #[inline]
    #[must_use]
    pub fn framebuffer_size(&self) -> Option<Size> {
        self.framebuffer_size
    }
}

impl Default for RendererState {
    fn default() -> Self {
        Self::new()
    }
}

/// A renderer: the transition machine plus the hooks a concrete backend
/// fills in.
pub trait Renderer {
    /// The renderer's transition state.
    fn state(&self) -> &RendererState;

    /// Mutable access to the renderer's transition state.
    fn state_mut(&mut self) -> &mut RendererState;

    /// The fixed capability set of this renderer.
    fn features(&self) -> RendererFeatures;

    /// Reacts to the framebuffer size being established or changed.
    fn on_setup_framebuffers(&mut self, size: Size) {
        _ = size;
    }

    /// Reacts to a committed transition; the state still holds the `from`
    /// pair while this runs.
    fn on_transition(
        &mut self,
        from_target: TargetState,
        from_draw: DrawStates,
        to_target: TargetState,
        to_draw: DrawStates,
    ) {
        _ = (from_target, from_draw, to_target, to_draw);
    }

    /// Establishes the framebuffer size, calling
    /// [`on_setup_framebuffers`](Self::on_setup_framebuffers).
    ///
    /// Legal only between frames, so in [`Initial`](TargetState::Initial) or
    /// [`Final`](TargetState::Final).
    ///
    /// # Panics
    ///
    /// Panics if `size` has no area or in any other target state.
    fn setup_framebuffers(&mut self, size: Size) {
        assert!(
            size.width > 0.0 && size.height > 0.0,
            "framebuffer size {size:?} has no area"
        );
        let target = self.state().target_state();
        assert!(
            matches!(target, TargetState::Initial | TargetState::Final),
            "setup_framebuffers in {target:?} instead of Initial or Final"
        );
        self.on_setup_framebuffers(size);
        self.state_mut().framebuffer_size = Some(size);
    }

    /// Moves the frame to `target` with `draw` in effect.
    ///
    /// The legal edges are `Initial` to `Initial`, `Draw` or `Final`; `Draw`
    /// to `Draw`, `Composite` or `Final`; `Composite` to `Draw`; and `Final`
    /// to `Initial`. A legal edge to the current `(target, draw)` pair
    /// succeeds without reaching [`on_transition`](Self::on_transition); any
    /// other legal edge calls the hook and then commits.
    ///
    /// # Panics
    ///
    /// Panics for an edge outside the table, for `Composite` without
    /// [`COMPOSITE`](RendererFeatures::COMPOSITE), for non-empty `draw` with
    /// a `target` other than `Draw`, or before
    /// [`setup_framebuffers`](Self::setup_framebuffers).
    fn transition(&mut self, target: TargetState, draw: DrawStates) {
        let from = self.state().target_state();
        assert!(
            matches!(
                (from, target),
                (
                    TargetState::Initial,
                    TargetState::Initial | TargetState::Draw | TargetState::Final
                ) | (
                    TargetState::Draw,
                    TargetState::Draw | TargetState::Composite | TargetState::Final
                ) | (TargetState::Composite, TargetState::Draw)
                    | (TargetState::Final, TargetState::Initial)
            ),
            "transition from {from:?} to {target:?} is not allowed"
        );
        if target == TargetState::Composite {
            assert!(
                self.features().contains(RendererFeatures::COMPOSITE),
                "renderer does not advertise COMPOSITE"
            );
        }
        assert!(
            draw.is_empty() || target == TargetState::Draw,
            "draw states {draw:?} on a transition to {target:?}"
        );
        assert!(
            self.state().framebuffer_size().is_some(),
            "transition before setup_framebuffers"
        );

        let from_draw = self.state().draw_states();
        if target == from && draw == from_draw {
            return;
        }
        self.on_transition(from, from_draw, target, draw);
        let state = self.state_mut();
        state.target = target;
        state.draw = draw;
    }

    /// The current target state.
    fn current_target_state(&self) -> TargetState {
        self.state().target_state()
    }

    /// The current draw states.
    fn current_draw_states(&self) -> DrawStates {
        self.state().draw_states()
    }

    /// The established framebuffer size.
    ///
    /// # Panics
    ///
    /// Panics before [`setup_framebuffers`](Self::setup_framebuffers).
    fn framebuffer_size(&self) -> Size {
        match self.state().framebuffer_size() {
            Some(size) => size,
            None => panic!("framebuffer size was never set up"),
        }
    }
}
