#![forbid(unsafe_code)]

//! The console backend seam.
//!
//! Everything platform-specific the driver needs is expressed through
//! [`ConsoleBackend`]: reading one input record, writing UTF-16 code units,
//! getting/setting console modes, and manipulating buffer/window geometry.
//! One implementation wraps the host console; [`crate::fake::FakeConsole`]
//! fakes the whole surface for tests.
//!
//! # Input records
//!
//! The host delivers input as fixed-size records tagged by a type word,
//! with a 16-byte little-endian payload:
//!
//! | Type word | Record | Payload |
//! |-----------|--------|---------|
//! | 1 | key | down(i32), repeat(u16), virtual key(u16), scan code(u16), char(u16), control keys(u32) |
//! | 2 | mouse | x(i16), y(i16), buttons(u32), control keys(u32), flags(u32) |
//! | 4 | resize | width(i16), height(i16) |
//! | 8 | menu | ignored |
//! | 16 | focus | focused(i32) |

use std::io;

use bitflags::bitflags;
use congrid_core::cancel::CancelToken;

bitflags! {
    /// Console input mode word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InputMode: u32 {
        /// Report buffer-size changes as resize records.
        const RESIZE_EVENTS  = 0x0008;
        /// Report mouse records.
        const MOUSE_INPUT    = 0x0010;
        /// Required companion flag for the extended input modes.
        const EXTENDED_FLAGS = 0x0080;
    }
}

bitflags! {
    /// Console output mode word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutputMode: u32 {
        /// Processed ("cooked") output.
        const COOKED          = 0x0001;
        /// Interpret VT escape sequences.
        const VT_PROCESSING   = 0x0004;
        /// Do not append a newline on wrap.
        const NO_AUTO_NEWLINE = 0x0008;
        /// Honor the grid/underline attribute bits worldwide.
        const UNDERLINE_GRID  = 0x0010;
    }
}

bitflags! {
    /// Modifier-key state word attached to key and mouse records.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlKeyState: u32 {
        /// Right Alt key.
        const RIGHT_ALT  = 0x0001;
        /// Left Alt key.
        const LEFT_ALT   = 0x0002;
        /// Right Ctrl key.
        const RIGHT_CTRL = 0x0004;
        /// Left Ctrl key.
        const LEFT_CTRL  = 0x0008;
        /// Either Shift key.
        const SHIFT      = 0x0010;
    }
}

bitflags! {
    /// Event-flag word attached to mouse records.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MouseFlags: u32 {
        /// Pointer motion.
        const MOVED        = 0x0001;
        /// Second click of a double click.
        const DOUBLE_CLICK = 0x0002;
        /// Vertical wheel motion.
        const WHEELED      = 0x0004;
        /// Horizontal wheel motion.
        const HWHEELED     = 0x0008;
    }
}

/// Record type word: key.
pub const RECORD_KEY: u16 = 1;
/// Record type word: mouse.
pub const RECORD_MOUSE: u16 = 2;
/// Record type word: resize.
pub const RECORD_RESIZE: u16 = 4;
/// Record type word: menu (ignored).
pub const RECORD_MENU: u16 = 8;
/// Record type word: focus.
pub const RECORD_FOCUS: u16 = 16;

/// A key press/release record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRecord {
    /// `true` for key-down, `false` for key-up.
    pub key_down: bool,
    /// Repeat count; the decoder multiplies the event by this.
    pub repeat: u16,
    /// Virtual key code.
    pub virtual_key: u16,
    /// Hardware scan code.
    pub scan_code: u16,
    /// Translated UTF-16 code unit, or 0 for non-character keys.
    pub ch: u16,
    /// Modifier-key state.
    pub control_keys: ControlKeyState,
}

/// A mouse record: position, button state, and wheel flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseRecord {
    /// Cell column (0-indexed).
    pub x: i16,
    /// Cell row (0-indexed).
    pub y: i16,
    /// Raw button-state word; the high bit signs wheel direction.
    pub buttons: u32,
    /// Modifier-key state.
    pub control_keys: ControlKeyState,
    /// Event flags (wheel, motion, double click).
    pub flags: MouseFlags,
}

/// A buffer-resize record carrying the new size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeRecord {
    /// New width in columns.
    pub width: i16,
    /// New height in rows.
    pub height: i16,
}

/// A focus-change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRecord {
    /// `true` when the console gained focus.
    pub focused: bool,
}

/// One decoded console input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRecord {
    /// Keyboard activity.
    Key(KeyRecord),
    /// Mouse activity.
    Mouse(MouseRecord),
    /// Buffer resize.
    Resize(ResizeRecord),
    /// Focus change.
    Focus(FocusRecord),
    /// Menu or any other record type; dropped.
    Ignored,
}

#[inline]
fn u16_at(data: &[u8; 16], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn i16_at(data: &[u8; 16], offset: usize) -> i16 {
    u16_at(data, offset) as i16
}

#[inline]
fn u32_at(data: &[u8; 16], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[inline]
fn i32_at(data: &[u8; 16], offset: usize) -> i32 {
    u32_at(data, offset) as i32
}

impl InputRecord {
    /// Decode a raw record from its type word and 16-byte payload.
    ///
    /// Unknown type words decode to [`InputRecord::Ignored`].
    #[must_use]
    pub fn parse(kind: u16, data: &[u8; 16]) -> Self {
        match kind {
            RECORD_KEY => Self::Key(KeyRecord {
                key_down: i32_at(data, 0) != 0,
                repeat: u16_at(data, 4),
                virtual_key: u16_at(data, 6),
                scan_code: u16_at(data, 8),
                ch: u16_at(data, 10),
                control_keys: ControlKeyState::from_bits_truncate(u32_at(data, 12)),
            }),
            RECORD_MOUSE => Self::Mouse(MouseRecord {
                x: i16_at(data, 0),
                y: i16_at(data, 2),
                buttons: u32_at(data, 4),
                control_keys: ControlKeyState::from_bits_truncate(u32_at(data, 8)),
                flags: MouseFlags::from_bits_truncate(u32_at(data, 12)),
            }),
            RECORD_RESIZE => Self::Resize(ResizeRecord {
                width: i16_at(data, 0),
                height: i16_at(data, 2),
            }),
            RECORD_FOCUS => Self::Focus(FocusRecord {
                focused: i32_at(data, 0) != 0,
            }),
            _ => Self::Ignored,
        }
    }
}

/// A character-cell coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coord {
    /// Column.
    pub x: i16,
    /// Row.
    pub y: i16,
}

impl Coord {
    /// Create a coordinate pair.
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// A window rectangle in buffer coordinates (all edges inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowRect {
    /// Left column.
    pub left: i16,
    /// Top row.
    pub top: i16,
    /// Right column (inclusive).
    pub right: i16,
    /// Bottom row (inclusive).
    pub bottom: i16,
}

impl WindowRect {
    /// Width in columns.
    #[must_use]
    pub const fn width(&self) -> i16 {
        self.right - self.left + 1
    }

    /// Height in rows.
    #[must_use]
    pub const fn height(&self) -> i16 {
        self.bottom - self.top + 1
    }
}

/// Console cursor shape and visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorInfo {
    /// Fill percentage of the cell (1–100).
    pub size: u32,
    /// Whether the cursor is drawn.
    pub visible: bool,
}

/// A snapshot of the console screen buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenInfo {
    /// Buffer size in cells.
    pub size: Coord,
    /// Cursor position.
    pub cursor: Coord,
    /// Current text attribute word.
    pub attrs: u16,
    /// Visible window within the buffer.
    pub window: WindowRect,
    /// Maximum window size the host supports.
    pub max_size: Coord,
}

/// Outcome of a blocking input wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitSignal {
    /// The cancellation token tripped. Preferred when both are ready.
    Cancelled,
    /// At least one input record is available.
    Input,
}

/// The narrow host-console surface the driver runs against.
///
/// Mode and geometry setters are deliberately infallible: rendering is
/// best-effort and the driver ignores per-call failures, matching how the
/// host API is actually used. Only opening, waiting, reading, writing, and
/// the bell can fail in ways the driver reacts to.
pub trait ConsoleBackend: Send + Sync + 'static {
    /// Open the input and output handles.
    ///
    /// # Errors
    ///
    /// Fails when either console handle cannot be opened; the error aborts
    /// driver initialization.
    fn open(&self) -> io::Result<()>;

    /// Block until input is available or the token is cancelled.
    ///
    /// When both are ready at once, implementations must report
    /// [`WaitSignal::Cancelled`].
    ///
    /// # Errors
    ///
    /// Fails when the underlying wait primitive fails; the scanner exits.
    fn wait_input(&self, cancel: &CancelToken) -> io::Result<WaitSignal>;

    /// Read exactly one input record, if one is pending.
    ///
    /// # Errors
    ///
    /// Fails when the console read fails; the scanner exits.
    fn read_record(&self) -> io::Result<Option<InputRecord>>;

    /// Write UTF-16LE code units at the current cursor position.
    ///
    /// # Errors
    ///
    /// Fails when the console write fails; rendering ignores this.
    fn write_text(&self, units: &[u16]) -> io::Result<()>;

    /// Read the input mode word.
    fn input_mode(&self) -> InputMode;

    /// Set the input mode word.
    fn set_input_mode(&self, mode: InputMode);

    /// Read the output mode word.
    ///
    /// Reading back after a set reveals which requested bits the host
    /// actually accepted; VT negotiation depends on this.
    fn output_mode(&self) -> OutputMode;

    /// Set the output mode word.
    fn set_output_mode(&self, mode: OutputMode);

    /// Snapshot the screen buffer state.
    fn screen_info(&self) -> ScreenInfo;

    /// Read the cursor shape/visibility.
    fn cursor_info(&self) -> CursorInfo;

    /// Set the cursor shape/visibility.
    fn set_cursor_info(&self, info: CursorInfo);

    /// Move the cursor.
    fn set_cursor_pos(&self, pos: Coord);

    /// Resize the screen buffer.
    fn set_buffer_size(&self, size: Coord);

    /// Resize/reposition the visible window within the buffer.
    fn set_window_rect(&self, rect: WindowRect);

    /// The largest window the host can display.
    fn largest_window(&self) -> Coord;

    /// Set the text attribute applied to subsequent legacy writes.
    fn set_text_attr(&self, attr: u16);

    /// Flood-fill character and attribute from the buffer origin.
    fn fill(&self, ch: char, attr: u16, count: u32);

    /// Sound the console bell.
    ///
    /// # Errors
    ///
    /// Fails when the host bell call fails.
    fn beep(&self) -> io::Result<()>;
}
