#![forbid(unsafe_code)]

//! Decoding of console input records into typed events.
//!
//! # Key decoding rules
//!
//! - Key-up records and records with a repeat count below 1 produce nothing.
//! - A nonzero character code yields a rune event, repeated `repeat` times.
//!   Exception: a character equal to the tab virtual key with *exactly*
//!   Shift held becomes a `BackTab` key with no modifiers.
//! - A zero character code is looked up in the virtual-key table; unmapped
//!   keys are dropped.
//! - Ctrl and Alt held together mean AltGr on many layouts; the composed
//!   character already reflects it, so both modifiers are stripped to avoid
//!   double-reporting.

use congrid_core::event::{Buttons, Key, KeyEvent, Modifiers, MouseEvent};

use crate::backend::{ControlKeyState, KeyRecord, MouseFlags, MouseRecord};

/// Virtual key code for Tab, matched against the character field for the
/// Shift+Tab special case.
pub const VK_TAB: u16 = 0x09;

/// Sign bit of the mouse button word; distinguishes wheel direction.
const WHEEL_NEGATIVE: u32 = 0x8000_0000;

/// Convert a control-key state word to a modifier mask.
///
/// Ctrl+Alt together is treated as AltGr and stripped entirely.
#[must_use]
pub fn modifiers(cks: ControlKeyState) -> Modifiers {
    let ctrl = cks.intersects(ControlKeyState::LEFT_CTRL | ControlKeyState::RIGHT_CTRL);
    let alt = cks.intersects(ControlKeyState::LEFT_ALT | ControlKeyState::RIGHT_ALT);

    let mut mods = Modifiers::NONE;
    if !(ctrl && alt) {
        if ctrl {
            mods |= Modifiers::CTRL;
        }
        if alt {
            mods |= Modifiers::ALT;
        }
    }
    if cks.contains(ControlKeyState::SHIFT) {
        mods |= Modifiers::SHIFT;
    }
    mods
}

/// Convert a raw button-state word plus event flags to a button mask.
#[must_use]
pub fn buttons(raw: u32, flags: MouseFlags) -> Buttons {
    let mut btns = Buttons::NONE;
    for (bit, button) in [
        (0x01, Buttons::BUTTON1),
        (0x02, Buttons::BUTTON2),
        (0x04, Buttons::BUTTON3),
        (0x08, Buttons::BUTTON4),
        (0x10, Buttons::BUTTON5),
        (0x20, Buttons::BUTTON6),
        (0x40, Buttons::BUTTON7),
        (0x80, Buttons::BUTTON8),
    ] {
        if raw & bit != 0 {
            btns |= button;
        }
    }

    if flags.contains(MouseFlags::WHEELED) {
        if raw & WHEEL_NEGATIVE == 0 {
            btns |= Buttons::WHEEL_UP;
        } else {
            btns |= Buttons::WHEEL_DOWN;
        }
    }
    if flags.contains(MouseFlags::HWHEELED) {
        if raw & WHEEL_NEGATIVE == 0 {
            btns |= Buttons::WHEEL_RIGHT;
        } else {
            btns |= Buttons::WHEEL_LEFT;
        }
    }
    btns
}

/// Map a virtual key code to a key, for records with no character payload.
///
/// Covers the typical 101/105-key layout plus F1–F24. Anything else is
/// unmapped and the record is dropped.
#[must_use]
pub fn virtual_key(code: u16) -> Option<Key> {
    let key = match code {
        0x03 => Key::Cancel,
        0x08 => Key::Backspace,
        0x09 => Key::Tab,
        0x0C => Key::Clear,
        0x0D => Key::Enter,
        0x13 => Key::Pause,
        0x1B => Key::Escape,
        0x20 => Key::Char(' '),
        0x21 => Key::PageUp,
        0x22 => Key::PageDown,
        0x23 => Key::End,
        0x24 => Key::Home,
        0x25 => Key::Left,
        0x26 => Key::Up,
        0x27 => Key::Right,
        0x28 => Key::Down,
        0x2A | 0x2C => Key::Print,
        0x2D => Key::Insert,
        0x2E => Key::Delete,
        0x2F => Key::Help,
        0x70..=0x87 => Key::F((code - 0x70 + 1) as u8),
        _ => return None,
    };
    Some(key)
}

/// Decode a key record into an event and its repeat count.
///
/// Returns `None` for key-up records, repeat counts below 1, characters
/// outside the Unicode scalar range (lone surrogate halves), and unmapped
/// virtual keys.
#[must_use]
pub fn decode_key(record: &KeyRecord) -> Option<(KeyEvent, u16)> {
    if !record.key_down || record.repeat < 1 {
        return None;
    }

    if record.ch != 0 {
        let mods = modifiers(record.control_keys);
        if mods == Modifiers::SHIFT && record.ch == VK_TAB {
            return Some((KeyEvent::new(Key::BackTab), record.repeat));
        }
        let ch = char::from_u32(record.ch as u32)?;
        return Some((
            KeyEvent::new(Key::Char(ch)).with_modifiers(mods),
            record.repeat,
        ));
    }

    let key = virtual_key(record.virtual_key)?;
    Some((
        KeyEvent::new(key).with_modifiers(modifiers(record.control_keys)),
        record.repeat,
    ))
}

/// Decode a mouse record.
///
/// Double clicks carry no special treatment; they arrive as an ordinary
/// press.
#[must_use]
pub fn decode_mouse(record: &MouseRecord) -> MouseEvent {
    MouseEvent::new(record.x, record.y, buttons(record.buttons, record.flags))
        .with_modifiers(modifiers(record.control_keys))
}
