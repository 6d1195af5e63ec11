#![forbid(unsafe_code)]

//! Render kernel: colors, styles, the cell grid, and style translation.
//!
//! Two translation paths exist for the same [`style::Style`] value: a legacy
//! 16-color attribute word ([`attr`]) for consoles driven through direct
//! attribute calls, and a VT/ANSI escape string ([`vt`]) for consoles with
//! virtual-terminal processing enabled.

pub mod attr;
pub mod cell;
pub mod color;
pub mod style;
pub mod vt;
