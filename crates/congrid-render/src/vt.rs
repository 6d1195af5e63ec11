#![forbid(unsafe_code)]

//! VT/ANSI escape generation for consoles with virtual-terminal processing.
//!
//! Pure string generation; no state tracking. The driver concatenates these
//! into a single write per run, so every builder returns the complete
//! sequence.
//!
//! # Sequence Reference
//!
//! | Category | Sequence | Description |
//! |----------|----------|-------------|
//! | CSI | `ESC [ n m` | SGR (Select Graphic Rendition) |
//! | CSI | `ESC [ 4 : n m` | Underline substyle (sub-parameter form) |
//! | CSI | `ESC [ row ; col H` | CUP (Cursor Position, 1-indexed) |
//! | CSI | `ESC [ n SP q` | DECSCUSR (cursor shape) |
//! | CSI | `ESC [ ? 7 h/l` | Auto-wrap on/off |
//! | CSI | `ESC [ ? 1049 h/l` + `22/23;0;0t` | Alternate screen with screen save |
//! | CSI | `ESC [ 22/23 ; 2 t` | Title save/restore |
//! | OSC | `ESC ] 2 ; text ST` | Set window title |
//! | OSC | `ESC ] 8 ; id ; url ST` | Hyperlink open/close |
//! | OSC | `ESC ] 12 ; #rrggbb BEL` | Cursor color (and `OSC 112` reset) |

use std::fmt::Write as _;

use crate::color::Color;
use crate::style::{Attrs, Style, UnderlineStyle};

/// Show the cursor: `CSI ? 25 h`
pub const SHOW_CURSOR: &str = "\x1b[?25h";
/// Hide the cursor: `CSI ? 25 l`
pub const HIDE_CURSOR: &str = "\x1b[?25l";
/// SGR reset: `CSI 0 m`
pub const SGR_RESET: &str = "\x1b[0m";
/// Bold: `CSI 1 m`
pub const BOLD: &str = "\x1b[1m";
/// Underline: `CSI 4 m`
pub const UNDERLINE: &str = "\x1b[4m";
/// Blink: `CSI 5 m`
pub const BLINK: &str = "\x1b[5m";
/// Reverse video: `CSI 7 m`
pub const REVERSE: &str = "\x1b[7m";
/// Double underline substyle.
pub const UNDERLINE_DOUBLE: &str = "\x1b[4:2m";
/// Curly underline substyle.
pub const UNDERLINE_CURLY: &str = "\x1b[4:3m";
/// Dotted underline substyle.
pub const UNDERLINE_DOTTED: &str = "\x1b[4:4m";
/// Dashed underline substyle.
pub const UNDERLINE_DASHED: &str = "\x1b[4:5m";
/// Reset the underline color: `CSI 59 m`
pub const UNDERLINE_COLOR_RESET: &str = "\x1b[59m";
/// Disable auto-wrap: `CSI ? 7 l`
pub const DISABLE_AUTO_WRAP: &str = "\x1b[?7l";
/// Enable auto-wrap: `CSI ? 7 h`
pub const ENABLE_AUTO_WRAP: &str = "\x1b[?7h";
/// Enter the alternate screen, saving the current screen.
pub const ENTER_ALT_SCREEN: &str = "\x1b[?1049h\x1b[22;0;0t";
/// Leave the alternate screen, restoring the saved screen.
pub const EXIT_ALT_SCREEN: &str = "\x1b[?1049l\x1b[23;0;0t";
/// Push the window title onto the host's title stack.
pub const SAVE_TITLE: &str = "\x1b[22;2t";
/// Pop the window title from the host's title stack.
pub const RESTORE_TITLE: &str = "\x1b[23;2t";
/// Close any open hyperlink: `OSC 8 ; ; ST`
pub const EXIT_URL: &str = "\x1b]8;;\x1b\\";
/// Reset the cursor color: `OSC 112 BEL`
pub const CURSOR_COLOR_RESET: &str = "\x1b]112\x07";

/// Cursor shapes selectable through DECSCUSR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorStyle {
    /// The host's configured default shape.
    #[default]
    Default,
    /// Blinking block.
    BlinkingBlock,
    /// Steady block.
    SteadyBlock,
    /// Blinking underline.
    BlinkingUnderline,
    /// Steady underline.
    SteadyUnderline,
    /// Blinking bar.
    BlinkingBar,
    /// Steady bar.
    SteadyBar,
}

impl CursorStyle {
    /// The DECSCUSR escape selecting this shape.
    #[must_use]
    pub const fn sequence(self) -> &'static str {
        match self {
            Self::Default => "\x1b[0 q",
            Self::BlinkingBlock => "\x1b[1 q",
            Self::SteadyBlock => "\x1b[2 q",
            Self::BlinkingUnderline => "\x1b[3 q",
            Self::SteadyUnderline => "\x1b[4 q",
            Self::BlinkingBar => "\x1b[5 q",
            Self::SteadyBar => "\x1b[6 q",
        }
    }
}

/// CUP to a 0-indexed cell position. The escape is row-first and 1-based.
#[must_use]
pub fn cursor_pos(x: usize, y: usize) -> String {
    format!("\x1b[{};{}H", y + 1, x + 1)
}

/// Set the window title: `OSC 2 ; title ST`
#[must_use]
pub fn set_title(title: &str) -> String {
    format!("\x1b]2;{title}\x1b\\")
}

/// Set the cursor color, or reset it.
///
/// Returns `None` for colors that carry no directive (`Default`).
#[must_use]
pub fn cursor_color(color: Color) -> Option<String> {
    match color {
        Color::Reset => Some(CURSOR_COLOR_RESET.to_string()),
        c => c
            .rgb()
            .map(|(r, g, b)| format!("\x1b]12;#{r:02x}{g:02x}{b:02x}\x07")),
    }
}

/// Build the complete SGR/OSC string for a style.
///
/// The string always starts from a reset and re-states every facet, so the
/// renderer can emit it whole at each style transition without diffing
/// sub-attributes.
#[must_use]
pub fn style_seq(style: &Style) -> String {
    let mut esc = String::with_capacity(32);

    esc.push_str(SGR_RESET);
    if style.attrs.contains(Attrs::BOLD) && !style.attrs.contains(Attrs::DIM) {
        esc.push_str(BOLD);
    }
    if style.attrs.contains(Attrs::BLINK) {
        esc.push_str(BLINK);
    }

    if style.underline != UnderlineStyle::None {
        match style.underline_color {
            Color::Reset => esc.push_str(UNDERLINE_COLOR_RESET),
            Color::Rgb(r, g, b) => {
                let _ = write!(esc, "\x1b[58:2::{r}:{g}:{b}m");
            }
            Color::Palette(idx) => {
                let _ = write!(esc, "\x1b[58:5:{idx}m");
            }
            Color::Default => {}
        }

        esc.push_str(UNDERLINE);
        // Legacy hosts ignore the sub-parameter forms; newer ones restyle.
        match style.underline {
            UnderlineStyle::None | UnderlineStyle::Solid => {}
            UnderlineStyle::Double => esc.push_str(UNDERLINE_DOUBLE),
            UnderlineStyle::Curly => esc.push_str(UNDERLINE_CURLY),
            UnderlineStyle::Dotted => esc.push_str(UNDERLINE_DOTTED),
            UnderlineStyle::Dashed => esc.push_str(UNDERLINE_DASHED),
        }
    }

    if style.attrs.contains(Attrs::REVERSE) {
        esc.push_str(REVERSE);
    }

    match style.fg {
        Color::Rgb(r, g, b) => {
            let _ = write!(esc, "\x1b[38;2;{r};{g};{b}m");
        }
        Color::Palette(idx) => {
            let _ = write!(esc, "\x1b[38;5;{idx}m");
        }
        Color::Default | Color::Reset => {}
    }
    match style.bg {
        Color::Rgb(r, g, b) => {
            let _ = write!(esc, "\x1b[48;2;{r};{g};{b}m");
        }
        Color::Palette(idx) => {
            let _ = write!(esc, "\x1b[48;5;{idx}m");
        }
        Color::Default | Color::Reset => {}
    }

    // The URL can be long; only send it when the cell actually carries one.
    if style.url.is_empty() {
        esc.push_str(EXIT_URL);
    } else {
        let _ = write!(esc, "\x1b]8;{};{}\x1b\\", style.url_id, style.url);
    }

    esc
}
