// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input event value types.
//!
//! These are the payloads the orchestrator routes into a layer's event entry
//! points (see [`Layer`](crate::layer::Layer)). Events are transient values:
//! the orchestrator builds one per input occurrence, offers it to the layers
//! under the pointer or focus, and inspects the acceptance flag afterwards
//! to decide whether to keep propagating.
//!
//! Acceptance starts out unset and can only be turned on; an event that
//! arrives at a dispatch entry point already accepted is a caller bug and
//! panics there.

use core::fmt;

use bitflags::bitflags;
use kurbo::{Point, Vec2};

use crate::time::Nanoseconds;

/// The class of device a pointer event originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventSource {
    /// A mouse.
    Mouse,
    /// A touch contact.
    Touch,
    /// A stylus.
    Pen,
}

/// A concrete pointer: a mouse button or a pen/touch contact kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pointer {
    /// Left mouse button.
    MouseLeft,
    /// Middle mouse button.
    MouseMiddle,
    /// Right mouse button.
    MouseRight,
    /// A finger contact.
    Finger,
    /// A pen tip.
    Pen,
    /// A pen eraser.
    Eraser,
}

bitflags! {
    /// Keyboard modifiers held during an event.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 1 << 0;
        /// Control.
        const CTRL = 1 << 1;
        /// Alt / Option.
        const ALT = 1 << 2;
        /// Super / Command / Windows.
        const SUPER = 1 << 3;
    }
}

/// Keys reported by [`KeyEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Space bar.
    Space,
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Insert.
    Insert,
}

/// A pointer press, release, or tap-or-click event.
#[derive(Debug)]
pub struct PointerEvent {
    /// When the event occurred.
    pub time: Nanoseconds,
    /// Device class.
    pub source: PointerEventSource,
    /// The pointer that changed state.
    pub pointer: Pointer,
    /// Whether this is the primary pointer of a multi-contact sequence.
    pub primary: bool,
    /// Position in UI coordinates.
    pub position: Point,
    accepted: bool,
}

impl PointerEvent {
    /// Creates an unaccepted event.
    #[must_use]
    pub const fn new(
        time: Nanoseconds,
        source: PointerEventSource,
        pointer: Pointer,
        primary: bool,
        position: Point,
    ) -> Self {
        Self {
            time,
            source,
            pointer,
            primary,
            position,
            accepted: false,
        }
    }

    /// Has a handler accepted this event?
    #[inline]
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Marks the event accepted, stopping further propagation.
    #[inline]
    pub const fn set_accepted(&mut self) {
        self.accepted = true;
    }
}

/// A pointer move, enter, or leave event.
#[derive(Debug)]
pub struct PointerMoveEvent {
    /// When the event occurred.
    pub time: Nanoseconds,
    /// Device class.
    pub source: PointerEventSource,
    /// The pointer the move belongs to, if any is pressed.
    pub pointer: Option<Pointer>,
    /// Whether this is the primary pointer of a multi-contact sequence.
    pub primary: bool,
    /// Position in UI coordinates.
    pub position: Point,
    /// Position delta against the previous event of the sequence.
    pub relative_position: Vec2,
    accepted: bool,
}

impl PointerMoveEvent {
    /// Creates an unaccepted event.
    #[must_use]
    pub const fn new(
        time: Nanoseconds,
        source: PointerEventSource,
        pointer: Option<Pointer>,
        primary: bool,
        position: Point,
        relative_position: Vec2,
    ) -> Self {
        Self {
            time,
            source,
            pointer,
            primary,
            position,
            relative_position,
            accepted: false,
        }
    }

    /// Has a handler accepted this event?
    #[inline]
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Marks the event accepted, stopping further propagation.
    #[inline]
    pub const fn set_accepted(&mut self) {
        self.accepted = true;
    }
}

/// A focus gain or loss event.
#[derive(Debug)]
pub struct FocusEvent {
    /// When the event occurred.
    pub time: Nanoseconds,
    accepted: bool,
}

impl FocusEvent {
    /// Creates an unaccepted event.
    #[must_use]
    pub const fn new(time: Nanoseconds) -> Self {
        Self {
            time,
            accepted: false,
        }
    }

    /// Has a handler accepted this event?
    #[inline]
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Marks the event accepted, stopping further propagation.
    #[inline]
    pub const fn set_accepted(&mut self) {
        self.accepted = true;
    }
}

/// A key press or release event.
#[derive(Debug)]
pub struct KeyEvent {
    /// When the event occurred.
    pub time: Nanoseconds,
    /// The key that changed state.
    pub key: Key,
    /// Modifiers held at event time.
    pub modifiers: Modifiers,
    accepted: bool,
}

impl KeyEvent {
    /// Creates an unaccepted event.
    #[must_use]
    pub const fn new(time: Nanoseconds, key: Key, modifiers: Modifiers) -> Self {
        Self {
            time,
            key,
            modifiers,
            accepted: false,
        }
    }

    /// Has a handler accepted this event?
    #[inline]
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Marks the event accepted, stopping further propagation.
    #[inline]
    pub const fn set_accepted(&mut self) {
        self.accepted = true;
    }
}

/// A text input event carrying the committed text.
pub struct TextInputEvent<'a> {
    /// When the event occurred.
    pub time: Nanoseconds,
    /// The text being inserted.
    pub text: &'a str,
    accepted: bool,
}

impl<'a> TextInputEvent<'a> {
    /// Creates an unaccepted event.
    #[must_use]
    pub const fn new(time: Nanoseconds, text: &'a str) -> Self {
        Self {
            time,
            text,
            accepted: false,
        }
    }

    /// Has a handler accepted this event?
    #[inline]
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Marks the event accepted, stopping further propagation.
    #[inline]
    pub const fn set_accepted(&mut self) {
        self.accepted = true;
    }
}

impl fmt::Debug for TextInputEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextInputEvent")
            .field("time", &self.time)
            .field("text", &self.text)
            .field("accepted", &self.accepted)
            .finish()
    }
}

/// Notifies a previously visible data entry that it can no longer receive
/// events.
///
/// Sent when a hovered, pressed, or focused node gets hidden or removed.
/// There is nothing to accept; the notification is unconditional.
#[derive(Debug, Default)]
pub struct VisibilityLostEvent {}

impl VisibilityLostEvent {
    /// Creates the event.
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}
