#![forbid(unsafe_code)]

//! Color values and the 16-entry VGA palette mapping.
//!
//! Colors come in four fidelity levels: the terminal's configured default,
//! an explicit reset of a prior override, a 256-color palette index, and a
//! 24-bit RGB triple. The legacy console path can only display the 16 VGA
//! colors, so palette and RGB values are collapsed to the nearest VGA entry
//! through a process-wide memoized lookup.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// A color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Use the terminal's default color.
    #[default]
    Default,
    /// Clear a previously applied override.
    Reset,
    /// 256-color palette index (0–255; the low 16 are the VGA entries).
    Palette(u8),
    /// 24-bit RGB triple.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Check whether this is an RGB triple.
    #[must_use]
    pub const fn is_rgb(self) -> bool {
        matches!(self, Self::Rgb(..))
    }

    /// Check whether this carries a concrete color (palette or RGB).
    ///
    /// `Default` and `Reset` are directives, not colors.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Palette(_) | Self::Rgb(..))
    }

    /// Expand to an RGB triple, if this carries a concrete color.
    #[must_use]
    pub const fn rgb(self) -> Option<(u8, u8, u8)> {
        match self {
            Self::Rgb(r, g, b) => Some((r, g, b)),
            Self::Palette(idx) => Some(palette_rgb(idx)),
            Self::Default | Self::Reset => None,
        }
    }
}

/// The 16 VGA colors in ANSI palette order (index 0–15).
pub const VGA_PALETTE: [(u8, u8, u8); 16] = [
    (0, 0, 0),       // black
    (128, 0, 0),     // maroon
    (0, 128, 0),     // green
    (128, 128, 0),   // olive
    (0, 0, 128),     // navy
    (128, 0, 128),   // purple
    (0, 128, 128),   // teal
    (192, 192, 192), // silver
    (128, 128, 128), // grey
    (255, 0, 0),     // red
    (0, 255, 0),     // lime
    (255, 255, 0),   // yellow
    (0, 0, 255),     // blue
    (255, 0, 255),   // fuchsia
    (0, 255, 255),   // aqua
    (255, 255, 255), // white
];

/// ANSI palette index (0–15) to VGA attribute nibble.
///
/// The console attribute nibble packs blue/green/red/intensity bits, which
/// is not the ANSI ordering: ANSI red (1) is VGA 0x4, ANSI navy (4) is
/// VGA 0x1, and so on.
const ANSI_TO_VGA: [u8; 16] = [
    0x0, 0x4, 0x2, 0x6, 0x1, 0x5, 0x3, 0x7, 0x8, 0xC, 0xA, 0xE, 0x9, 0xD, 0xB, 0xF,
];

/// Expand a 256-color palette index to RGB.
///
/// Indices 0–15 are the VGA entries, 16–231 the 6×6×6 color cube with
/// levels `[0, 95, 135, 175, 215, 255]`, and 232–255 the 24-step gray ramp.
#[must_use]
pub const fn palette_rgb(index: u8) -> (u8, u8, u8) {
    if index < 16 {
        return VGA_PALETTE[index as usize];
    }
    if index >= 232 {
        let gray = 8 + 10 * (index - 232);
        return (gray, gray, gray);
    }
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    let idx = index - 16;
    let r = idx / 36;
    let g = (idx / 6) % 6;
    let b = idx % 6;
    (
        LEVELS[r as usize],
        LEVELS[g as usize],
        LEVELS[b as usize],
    )
}

/// Map a color to its VGA attribute nibble (0x0–0xF).
///
/// Palette indices below 16 map through the fixed nibble table; everything
/// else goes through the memoized nearest-color search. Returns `None` for
/// `Default` and `Reset`, which inherit the captured console attribute.
#[must_use]
pub fn vga_index(color: Color) -> Option<u8> {
    match color {
        Color::Palette(idx) if idx < 16 => Some(ANSI_TO_VGA[idx as usize]),
        Color::Palette(idx) => {
            let (r, g, b) = palette_rgb(idx);
            Some(nearest_vga(r, g, b))
        }
        Color::Rgb(r, g, b) => Some(nearest_vga(r, g, b)),
        Color::Default | Color::Reset => None,
    }
}

/// Process-wide memo of RGB → VGA nibble results.
///
/// The key space is bounded by the number of distinct colors an application
/// actually uses, so the map is never evicted.
fn nearest_cache() -> &'static Mutex<HashMap<u32, u8>> {
    static CACHE: OnceLock<Mutex<HashMap<u32, u8>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn nearest_vga(r: u8, g: u8, b: u8) -> u8 {
    let key = ((r as u32) << 16) | ((g as u32) << 8) | (b as u32);
    let mut cache = nearest_cache()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(&nibble) = cache.get(&key) {
        return nibble;
    }

    let mut best = 0usize;
    let mut best_dist = u64::MAX;
    for (idx, &(cr, cg, cb)) in VGA_PALETTE.iter().enumerate() {
        let dist = weighted_distance((r, g, b), (cr, cg, cb));
        if dist < best_dist {
            best = idx;
            best_dist = dist;
        }
    }

    let nibble = ANSI_TO_VGA[best];
    cache.insert(key, nibble);
    nibble
}

/// BT.709-weighted squared distance between two RGB triples.
fn weighted_distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> u64 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    2126 * (dr * dr) as u64 + 7152 * (dg * dg) as u64 + 722 * (db * db) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_and_reset_are_not_valid() {
        assert!(!Color::Default.is_valid());
        assert!(!Color::Reset.is_valid());
        assert!(Color::Palette(9).is_valid());
        assert!(Color::Rgb(1, 2, 3).is_valid());
    }

    #[test]
    fn rgb_expansion() {
        assert_eq!(Color::Rgb(10, 20, 30).rgb(), Some((10, 20, 30)));
        assert_eq!(Color::Palette(9).rgb(), Some((255, 0, 0)));
        assert_eq!(Color::Default.rgb(), None);
        assert_eq!(Color::Reset.rgb(), None);
    }

    #[test]
    fn low_palette_maps_through_nibble_table() {
        // ANSI bright red (9) is VGA 0xC, ANSI navy (4) is VGA 0x1.
        assert_eq!(vga_index(Color::Palette(9)), Some(0xC));
        assert_eq!(vga_index(Color::Palette(4)), Some(0x1));
        assert_eq!(vga_index(Color::Palette(0)), Some(0x0));
        assert_eq!(vga_index(Color::Palette(15)), Some(0xF));
    }

    #[test]
    fn directives_have_no_nibble() {
        assert_eq!(vga_index(Color::Default), None);
        assert_eq!(vga_index(Color::Reset), None);
    }

    #[test]
    fn exact_rgb_matches_map_to_their_entry() {
        assert_eq!(vga_index(Color::Rgb(255, 0, 0)), Some(0xC));
        assert_eq!(vga_index(Color::Rgb(0, 0, 128)), Some(0x1));
        assert_eq!(vga_index(Color::Rgb(255, 255, 255)), Some(0xF));
    }

    #[test]
    fn near_rgb_values_snap_to_nearest_entry() {
        assert_eq!(vga_index(Color::Rgb(250, 5, 5)), Some(0xC));
        assert_eq!(vga_index(Color::Rgb(10, 10, 10)), Some(0x0));
    }

    #[test]
    fn nearest_lookup_is_memoized() {
        // Same query twice must agree (and exercises the cache hit path).
        let first = vga_index(Color::Rgb(123, 45, 67));
        let second = vga_index(Color::Rgb(123, 45, 67));
        assert_eq!(first, second);
    }

    #[test]
    fn cube_expansion_endpoints() {
        assert_eq!(palette_rgb(16), (0, 0, 0));
        assert_eq!(palette_rgb(231), (255, 255, 255));
        assert_eq!(palette_rgb(196), (255, 0, 0));
    }

    #[test]
    fn gray_ramp_expansion() {
        assert_eq!(palette_rgb(232), (8, 8, 8));
        assert_eq!(palette_rgb(255), (238, 238, 238));
    }

    #[test]
    fn high_palette_goes_through_nearest_search() {
        // 196 expands to pure red, which is nearest to VGA red (0xC).
        assert_eq!(vga_index(Color::Palette(196)), Some(0xC));
        // 16 expands to black.
        assert_eq!(vga_index(Color::Palette(16)), Some(0x0));
    }
}
