#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! The console driver reads raw host records and posts values of these types
//! onto the consumer-facing event queue. All events derive `Clone`,
//! `PartialEq`, and `Eq` for use in tests and pattern matching.
//!
//! # Design Notes
//!
//! - Mouse coordinates are 0-indexed character-cell positions and may be
//!   negative when the host reports a drag that left the window.
//! - A printable key arrives as [`Key::Char`]; the rune is the payload.
//! - `Modifiers` and `Buttons` use bitflags for easy combination.

use bitflags::bitflags;

/// Canonical input event.
///
/// This enum represents every event the console driver can deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A mouse event.
    Mouse(MouseEvent),

    /// Terminal was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },

    /// Focus gained (`true`) or lost (`false`).
    Focus(bool),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub key: Key,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event with no modifiers.
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.key, Key::Char(ch) if ch == c)
    }

    /// Check if Ctrl is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Key identifiers.
///
/// Printable input is carried by [`Key::Char`]; everything else is a named
/// key. Function keys use [`Key::F`] with a 1-based index (F1–F24).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Shift+Tab (back-tab).
    BackTab,

    /// Delete key.
    Delete,

    /// Insert key.
    Insert,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Pause/Break key.
    Pause,

    /// Print or Print Screen key.
    Print,

    /// Help key.
    Help,

    /// Cancel (Ctrl+Break) key.
    Cancel,

    /// Clear key (numpad 5 with Num Lock off).
    Clear,

    /// Function key (F1–F24).
    F(u8),
}

bitflags! {
    /// Modifier keys that can be held during a key or mouse event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

bitflags! {
    /// Mouse buttons and wheel motion reported by a single event.
    ///
    /// Buttons are a *state* mask: every button held at the time of the
    /// event is set, so press and release are derived by comparing
    /// consecutive events. Wheel bits are edge-triggered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Buttons: u16 {
        /// No buttons.
        const NONE        = 0;
        /// Primary (usually left) button.
        const BUTTON1     = 1 << 0;
        /// Secondary (usually right) button.
        const BUTTON2     = 1 << 1;
        /// Middle button.
        const BUTTON3     = 1 << 2;
        /// Extra button 4.
        const BUTTON4     = 1 << 3;
        /// Extra button 5.
        const BUTTON5     = 1 << 4;
        /// Extra button 6.
        const BUTTON6     = 1 << 5;
        /// Extra button 7.
        const BUTTON7     = 1 << 6;
        /// Extra button 8.
        const BUTTON8     = 1 << 7;
        /// Vertical wheel scrolled away from the user.
        const WHEEL_UP    = 1 << 8;
        /// Vertical wheel scrolled toward the user.
        const WHEEL_DOWN  = 1 << 9;
        /// Horizontal wheel scrolled left.
        const WHEEL_LEFT  = 1 << 10;
        /// Horizontal wheel scrolled right.
        const WHEEL_RIGHT = 1 << 11;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Self::NONE
    }
}

/// A mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// X coordinate (0-indexed, leftmost column is 0).
    pub x: i16,

    /// Y coordinate (0-indexed, topmost row is 0).
    pub y: i16,

    /// Buttons held (plus wheel motion, if any).
    pub buttons: Buttons,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// Create a new mouse event with no modifiers.
    #[must_use]
    pub const fn new(x: i16, y: i16, buttons: Buttons) -> Self {
        Self {
            x,
            y,
            buttons,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a mouse event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Get the position as a tuple.
    #[must_use]
    pub const fn position(&self) -> (i16, i16) {
        (self.x, self.y)
    }
}
