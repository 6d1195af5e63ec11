#![forbid(unsafe_code)]

//! Legacy 16-color attribute word translation.
//!
//! Consoles without VT processing take a 16-bit attribute word per write:
//! low nibble foreground, next nibble background, both VGA-encoded. There
//! is no native reverse video, so reverse is emulated by swapping the
//! nibbles before intensity is applied.
//!
//! | Bits | Meaning |
//! |------|---------|
//! | 0x000F | foreground VGA nibble |
//! | 0x00F0 | background VGA nibble |
//! | 0x0008 | foreground intensity (set by bold, cleared by dim) |
//! | 0x8000 | underline (grid, best-effort; many hosts ignore it) |

use crate::color::vga_index;
use crate::style::{Attrs, Style};

/// Underline bit in the attribute word. Best-effort only.
pub const ATTR_UNDERLINE: u16 = 0x8000;

/// Intensity bit within the foreground nibble.
const ATTR_INTENSITY: u16 = 0x8;

/// Map a style to a legacy console attribute word.
///
/// `original_attr` is the attribute word captured from the console at
/// startup; `Default` and `Reset` colors inherit its nibbles.
#[must_use]
pub fn legacy_attr(style: &Style, original_attr: u16) -> u16 {
    let mut fa = original_attr & 0xF;
    let mut ba = (original_attr >> 4) & 0xF;

    if let Some(nibble) = vga_index(style.fg) {
        fa = nibble as u16;
    }
    if let Some(nibble) = vga_index(style.bg) {
        ba = nibble as u16;
    }

    // Reverse swaps the nibbles first, so bold/dim intensify whatever ends
    // up in the foreground position.
    let mut attr = if style.attrs.contains(Attrs::REVERSE) {
        ba | (fa << 4)
    } else {
        fa | (ba << 4)
    };

    if style.attrs.contains(Attrs::BOLD) {
        attr |= ATTR_INTENSITY;
    }
    if style.attrs.contains(Attrs::DIM) {
        attr &= !ATTR_INTENSITY;
    }
    if style.attrs.contains(Attrs::UNDERLINE) {
        attr |= ATTR_UNDERLINE;
    }
    // Blink has no legacy encoding.
    attr
}
