#![forbid(unsafe_code)]

//! The cell grid and its dirty tracking.
//!
//! A [`CellBuffer`] is a dense W×H grid in row-major order. Each cell holds
//! one primary rune, any combining runes, a style, the glyph width in
//! columns, and a dirty bit. The renderer consumes dirty cells and clears
//! their bits as it emits them.
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height`
//! 2. Out-of-range reads return the empty cell; out-of-range writes are
//!    no-ops. Access never panics.
//! 3. A cell becomes dirty exactly when its rune, combining sequence, or
//!    style changes.
//! 4. Stored width is never 0; zero-width primaries are normalized to 1.

use smallvec::SmallVec;
use unicode_width::UnicodeWidthChar;

use crate::style::Style;

/// Combining runes attached to a cell. Nearly always empty or length 1.
pub type Combining = SmallVec<[char; 2]>;

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Primary rune.
    pub ch: char,
    /// Combining runes rendered onto the primary.
    pub combining: Combining,
    /// Style for this cell.
    pub style: Style,
    /// Glyph width in columns (1 or 2).
    pub width: u8,
    /// Whether this cell differs from what was last emitted.
    pub dirty: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            combining: Combining::new(),
            style: Style::default(),
            width: 1,
            dirty: false,
        }
    }
}

/// Compute the column width of a primary rune.
///
/// Zero-width and control runes are normalized to 1: a cell always occupies
/// at least one column.
#[must_use]
pub fn rune_width(ch: char) -> u8 {
    match ch.width() {
        Some(w) if w >= 1 => w.min(2) as u8,
        _ => 1,
    }
}

/// A dense W×H grid of cells.
#[derive(Debug, Clone, Default)]
pub struct CellBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl CellBuffer {
    /// Create a buffer with the given dimensions, all cells empty.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    /// Grid dimensions as (width, height).
    #[must_use]
    pub const fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Store content into a cell, dirtying it iff something changed.
    ///
    /// Out-of-range coordinates are ignored.
    pub fn set_content(&mut self, x: usize, y: usize, ch: char, combining: &[char], style: Style) {
        let Some(idx) = self.index(x, y) else { return };
        let cell = &mut self.cells[idx];

        let changed =
            cell.ch != ch || cell.combining.as_slice() != combining || cell.style != style;
        cell.ch = ch;
        cell.combining = Combining::from_slice(combining);
        cell.style = style;
        cell.width = rune_width(ch);
        if changed {
            cell.dirty = true;
        }
    }

    /// Read a cell's content: (rune, combining, style, width).
    ///
    /// Out-of-range coordinates return the empty cell's content.
    #[must_use]
    pub fn get_content(&self, x: usize, y: usize) -> (char, Combining, Style, usize) {
        match self.index(x, y) {
            Some(idx) => {
                let cell = &self.cells[idx];
                (
                    cell.ch,
                    cell.combining.clone(),
                    cell.style.clone(),
                    cell.width as usize,
                )
            }
            None => (' ', Combining::new(), Style::default(), 1),
        }
    }

    /// Check a cell's dirty bit. Out-of-range is never dirty.
    #[must_use]
    pub fn dirty(&self, x: usize, y: usize) -> bool {
        self.index(x, y).is_some_and(|idx| self.cells[idx].dirty)
    }

    /// Set or clear a cell's dirty bit. Out-of-range is ignored.
    pub fn set_dirty(&mut self, x: usize, y: usize, dirty: bool) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx].dirty = dirty;
        }
    }

    /// Mark every cell dirty, forcing a full redraw.
    pub fn invalidate(&mut self) {
        for cell in &mut self.cells {
            cell.dirty = true;
        }
    }

    /// Resize to new dimensions, preserving the overlapping region.
    ///
    /// Every cell of the resized buffer is dirty afterwards.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            self.invalidate();
            return;
        }

        let mut cells = vec![Cell::default(); width * height];
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                cells[y * width + x] = self.cells[y * self.width + x].clone();
            }
        }
        self.cells = cells;
        self.width = width;
        self.height = height;
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn new_buffer_is_clean() {
        let buf = CellBuffer::new(4, 2);
        assert_eq!(buf.size(), (4, 2));
        for y in 0..2 {
            for x in 0..4 {
                assert!(!buf.dirty(x, y));
            }
        }
    }

    #[test]
    fn set_content_dirties_on_change_only() {
        let mut buf = CellBuffer::new(4, 2);
        let style = Style::default().fg(Color::Palette(2));

        buf.set_content(1, 0, 'A', &[], style.clone());
        assert!(buf.dirty(1, 0));

        buf.set_dirty(1, 0, false);
        buf.set_content(1, 0, 'A', &[], style.clone());
        assert!(!buf.dirty(1, 0), "identical content must not re-dirty");

        buf.set_content(1, 0, 'A', &[], style.fg(Color::Palette(3)));
        assert!(buf.dirty(1, 0), "style change must dirty");
    }

    #[test]
    fn combining_change_dirties() {
        let mut buf = CellBuffer::new(2, 1);
        buf.set_content(0, 0, 'e', &[], Style::default());
        buf.set_dirty(0, 0, false);

        buf.set_content(0, 0, 'e', &['\u{0301}'], Style::default());
        assert!(buf.dirty(0, 0));

        let (ch, comb, _, width) = buf.get_content(0, 0);
        assert_eq!(ch, 'e');
        assert_eq!(comb.as_slice(), ['\u{0301}']);
        assert_eq!(width, 1);
    }

    #[test]
    fn wide_rune_width() {
        let mut buf = CellBuffer::new(4, 1);
        buf.set_content(0, 0, '世', &[], Style::default());
        let (_, _, _, width) = buf.get_content(0, 0);
        assert_eq!(width, 2);
    }

    #[test]
    fn zero_width_rune_normalizes_to_one() {
        assert_eq!(rune_width('\u{0301}'), 1);
        assert_eq!(rune_width('\u{0007}'), 1);
        assert_eq!(rune_width('A'), 1);
        assert_eq!(rune_width('世'), 2);
    }

    #[test]
    fn out_of_range_access_is_safe() {
        let mut buf = CellBuffer::new(2, 2);
        buf.set_content(99, 99, 'X', &[], Style::default());
        assert!(!buf.dirty(99, 99));

        let (ch, comb, style, width) = buf.get_content(99, 99);
        assert_eq!(ch, ' ');
        assert!(comb.is_empty());
        assert_eq!(style, Style::default());
        assert_eq!(width, 1);
    }

    #[test]
    fn invalidate_dirties_everything() {
        let mut buf = CellBuffer::new(3, 2);
        buf.invalidate();
        for y in 0..2 {
            for x in 0..3 {
                assert!(buf.dirty(x, y));
            }
        }
    }

    #[test]
    fn resize_preserves_overlap_and_dirties_all() {
        let mut buf = CellBuffer::new(4, 2);
        buf.set_content(1, 1, 'Q', &[], Style::default());

        buf.resize(2, 3);
        assert_eq!(buf.size(), (2, 3));
        let (ch, _, _, _) = buf.get_content(1, 1);
        assert_eq!(ch, 'Q');
        for y in 0..3 {
            for x in 0..2 {
                assert!(buf.dirty(x, y));
            }
        }
    }

    #[test]
    fn resize_to_same_size_still_invalidates() {
        let mut buf = CellBuffer::new(2, 2);
        buf.resize(2, 2);
        assert!(buf.dirty(0, 0) && buf.dirty(1, 1));
    }
}
