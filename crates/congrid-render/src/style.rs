#![forbid(unsafe_code)]

//! The style aggregate applied to cells.
//!
//! A [`Style`] bundles foreground/background colors, an attribute mask, the
//! underline substyle and color, and an optional hyperlink. `Style::default()`
//! is the neutral value: both colors inherit the terminal defaults and no
//! attributes are set.

use bitflags::bitflags;

use crate::color::Color;

bitflags! {
    /// Text attribute mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Attrs: u8 {
        /// No attributes.
        const NONE      = 0;
        /// Bold / increased intensity.
        const BOLD      = 1 << 0;
        /// Dim / decreased intensity.
        const DIM       = 1 << 1;
        /// Blinking text.
        const BLINK     = 1 << 2;
        /// Reverse video (swap fg/bg).
        const REVERSE   = 1 << 3;
        /// Underlined text (any substyle).
        const UNDERLINE = 1 << 4;
    }
}

impl Default for Attrs {
    fn default() -> Self {
        Self::NONE
    }
}

/// Underline substyle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnderlineStyle {
    /// No underline.
    #[default]
    None,
    /// Single straight underline.
    Solid,
    /// Double underline.
    Double,
    /// Curly (wavy) underline.
    Curly,
    /// Dotted underline.
    Dotted,
    /// Dashed underline.
    Dashed,
}

/// An immutable style aggregate.
///
/// Styles compare by value; the renderer coalesces runs of cells whose
/// styles are equal, so equality is the transition test.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Attribute mask.
    pub attrs: Attrs,
    /// Underline substyle.
    pub underline: UnderlineStyle,
    /// Underline color (`Default` = follow the foreground).
    pub underline_color: Color,
    /// Hyperlink target; empty means no link.
    pub url: String,
    /// Hyperlink grouping id; empty means none.
    pub url_id: String,
}

impl Style {
    /// Return a copy with the given foreground.
    #[must_use]
    pub fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    /// Return a copy with the given background.
    #[must_use]
    pub fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Return a copy with the given attribute mask.
    #[must_use]
    pub fn attributes(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Return a copy with the given underline substyle.
    ///
    /// Also keeps the `UNDERLINE` attribute bit in sync so the legacy path
    /// can honor underlines without consulting the substyle.
    #[must_use]
    pub fn underline(mut self, underline: UnderlineStyle) -> Self {
        self.underline = underline;
        if underline == UnderlineStyle::None {
            self.attrs.remove(Attrs::UNDERLINE);
        } else {
            self.attrs.insert(Attrs::UNDERLINE);
        }
        self
    }

    /// Return a copy with the given underline color.
    #[must_use]
    pub fn underline_color(mut self, color: Color) -> Self {
        self.underline_color = color;
        self
    }

    /// Return a copy carrying a hyperlink.
    ///
    /// An empty `url` removes the link.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>, id: impl Into<String>) -> Self {
        self.url = url.into();
        self.url_id = id.into();
        self
    }
}
