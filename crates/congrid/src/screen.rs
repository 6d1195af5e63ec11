#![forbid(unsafe_code)]

//! The console screen driver.
//!
//! [`ConsoleScreen`] owns the cell grid, reconciles it against the physical
//! console, and runs the input scanner. Rendering is dual-mode: when the
//! host accepts virtual-terminal processing, updates go out as one escape
//! stream per run; otherwise the driver falls back to direct attribute and
//! cursor calls.
//!
//! # Lifecycle
//!
//! ```text
//! Created → init() → Running ──suspend()──▶ Suspended ──resume()──▶ Running
//!                      │                                              │
//!                      └────────────────── fini() ────────────────────┘
//! ```
//!
//! `fini` is once-only; mutating calls after it are no-ops. A per-screen
//! mutex serializes every public method, and the renderer holds it for the
//! whole of `show`/`sync`, so a draw is atomic with respect to mutation.
//!
//! # Environment knobs
//!
//! | Name | Values | Effect |
//! |------|--------|--------|
//! | `ConEmuPID` | any non-empty | disable truecolor and the VT attempt |
//! | `TCELL_TRUECOLOR` | `enable`/`disable` | force truecolor (and VT) on/off |
//! | `TCELL_VTMODE` | `enable`/`disable` | force the VT path on/off |
//! | `TCELL_ALTSCREEN` | `enable`/`disable` | opt out of the alternate screen |

use std::env;
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use tracing::{debug, warn};

use congrid_core::cancel::CancelToken;
use congrid_core::event::{Event, Key};
use congrid_render::attr::legacy_attr;
use congrid_render::cell::{CellBuffer, Combining};
use congrid_render::color::Color;
use congrid_render::style::Style;
use congrid_render::vt::{self, CursorStyle};

use crate::backend::{
    ConsoleBackend, Coord, CursorInfo, InputMode, InputRecord, OutputMode, ScreenInfo, WaitSignal,
    WindowRect,
};
use crate::input;

/// Depth of the consumer-facing event queue.
const EVENT_QUEUE_DEPTH: usize = 10;

/// Hosts whose largest window is at least this wide are assumed to be
/// modern terminal emulators that reject application-initiated resizing,
/// so `set_size` becomes a no-op. Empirical; treat as a tunable.
pub const MODERN_TERMINAL_MIN_COLS: i16 = 500;

/// Driver configuration, normally read from the environment once at init.
///
/// Tests construct this directly so they never race on process-global
/// environment state.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Advertise 24-bit color when the VT path is active.
    pub truecolor: bool,
    /// Attempt VT output-mode negotiation at init.
    pub try_vt: bool,
    /// Enter the alternate screen on engage.
    pub alt_screen: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            truecolor: true,
            try_vt: true,
            alt_screen: true,
        }
    }
}

impl DriverOptions {
    /// Read the environment knobs.
    ///
    /// ConEmu's VT handling scrolls the palette incorrectly, so its
    /// presence disables both truecolor and the VT attempt up front; the
    /// explicit overrides are applied afterwards and win.
    #[must_use]
    pub fn from_env() -> Self {
        let mut opts = Self::default();

        if env::var_os("ConEmuPID").is_some_and(|v| !v.is_empty()) {
            opts.truecolor = false;
            opts.try_vt = false;
        }
        match env::var("TCELL_TRUECOLOR").as_deref() {
            Ok("disable") => opts.truecolor = false,
            Ok("enable") => {
                opts.truecolor = true;
                opts.try_vt = true;
            }
            _ => {}
        }
        match env::var("TCELL_VTMODE").as_deref() {
            Ok("disable") => opts.try_vt = false,
            Ok("enable") => opts.try_vt = true,
            _ => {}
        }
        match env::var("TCELL_ALTSCREEN").as_deref() {
            Ok("disable") => opts.alt_screen = false,
            Ok("enable") => opts.alt_screen = true,
            _ => {}
        }
        opts
    }
}

/// Errors surfaced by the screen lifecycle.
#[derive(Debug)]
pub enum ScreenError {
    /// `engage` (via `init` or `resume`) was called while already running.
    AlreadyEngaged,
    /// A console operation failed.
    Io(io::Error),
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyEngaged => write!(f, "screen is already engaged"),
            Self::Io(err) => write!(f, "console error: {err}"),
        }
    }
}

impl std::error::Error for ScreenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AlreadyEngaged => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for ScreenError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

#[derive(Debug)]
struct State {
    cur_x: i32,
    cur_y: i32,
    style: Style,
    fini: bool,
    vt: bool,
    truecolor: bool,
    running: bool,
    alt_screen: bool,
    title: String,
    w: usize,
    h: usize,
    original_screen: ScreenInfo,
    original_cursor: CursorInfo,
    cursor_style: CursorStyle,
    cursor_color: Color,
    original_input_mode: InputMode,
    original_output_mode: OutputMode,
    cells: CellBuffer,
    focus_enabled: bool,
    mouse_enabled: bool,
    quit_tx: Option<Sender<()>>,
    stop_tx: Option<Sender<()>>,
    cancel: Option<CancelToken>,
    scanner: Option<JoinHandle<()>>,
}

/// State shared with the scanner thread.
struct Shared {
    state: Mutex<State>,
    event_tx: Sender<Event>,
    quit_rx: Receiver<()>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Post an event, blocking on the bounded queue until either the
    /// consumer drains it or `fini` disconnects the quit channel (in which
    /// case the event is dropped).
    fn post_event(&self, event: Event) {
        select! {
            send(self.event_tx, event) -> _ => {}
            recv(self.quit_rx) -> _ => {}
        }
    }

    fn dispatch(&self, record: InputRecord) {
        match record {
            InputRecord::Key(rec) => {
                if let Some((event, repeat)) = input::decode_key(&rec) {
                    for _ in 0..repeat {
                        self.post_event(Event::Key(event));
                    }
                }
            }
            InputRecord::Mouse(rec) => {
                self.post_event(Event::Mouse(input::decode_mouse(&rec)));
            }
            InputRecord::Resize(rec) => {
                self.post_event(Event::Resize {
                    width: rec.width.max(0) as u16,
                    height: rec.height.max(0) as u16,
                });
            }
            InputRecord::Focus(rec) => {
                // Dropped silently (not buffered) while reporting is off.
                let enabled = self.lock().focus_enabled;
                if enabled {
                    self.post_event(Event::Focus(rec.focused));
                }
            }
            InputRecord::Ignored => {}
        }
    }
}

/// The long-lived scanner loop: wait for input or cancellation, read one
/// record, decode, post. A closed stop channel or a read failure ends it.
fn scan_input<B: ConsoleBackend>(
    backend: Arc<B>,
    shared: Arc<Shared>,
    cancel: CancelToken,
    stop_rx: Receiver<()>,
) {
    debug!("input scanner started");
    loop {
        if matches!(stop_rx.try_recv(), Err(TryRecvError::Disconnected)) {
            break;
        }
        match backend.wait_input(&cancel) {
            Ok(WaitSignal::Cancelled) => break,
            Ok(WaitSignal::Input) => match backend.read_record() {
                Ok(Some(record)) => shared.dispatch(record),
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "console read failed, scanner exiting");
                    break;
                }
            },
            Err(err) => {
                warn!(error = %err, "input wait failed, scanner exiting");
                break;
            }
        }
    }
    debug!("input scanner stopped");
}

/// A console screen driver running against backend `B`.
pub struct ConsoleScreen<B: ConsoleBackend> {
    backend: Arc<B>,
    shared: Arc<Shared>,
    event_rx: Receiver<Event>,
    options: DriverOptions,
}

impl<B: ConsoleBackend> ConsoleScreen<B> {
    /// Create a screen over `backend` with explicit options.
    ///
    /// Nothing touches the console until [`init`](Self::init).
    #[must_use]
    pub fn new(backend: B, options: DriverOptions) -> Self {
        let (event_tx, event_rx) = bounded(EVENT_QUEUE_DEPTH);
        let (quit_tx, quit_rx) = bounded(0);

        let state = State {
            cur_x: -1,
            cur_y: -1,
            style: Style::default(),
            fini: false,
            vt: false,
            truecolor: false,
            running: false,
            alt_screen: options.alt_screen,
            title: String::new(),
            w: 0,
            h: 0,
            original_screen: ScreenInfo::default(),
            original_cursor: CursorInfo {
                size: 25,
                visible: true,
            },
            cursor_style: CursorStyle::Default,
            cursor_color: Color::Default,
            original_input_mode: InputMode::empty(),
            original_output_mode: OutputMode::empty(),
            cells: CellBuffer::default(),
            focus_enabled: false,
            mouse_enabled: false,
            quit_tx: Some(quit_tx),
            stop_tx: None,
            cancel: None,
            scanner: None,
        };

        Self {
            backend: Arc::new(backend),
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                event_tx,
                quit_rx,
            }),
            event_rx,
            options,
        }
    }

    /// Create a screen configured from the environment knobs.
    #[must_use]
    pub fn from_env(backend: B) -> Self {
        Self::new(backend, DriverOptions::from_env())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared.lock()
    }

    fn emit(&self, seq: &str) {
        let units: Vec<u16> = seq.encode_utf16().collect();
        let _ = self.backend.write_text(&units);
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Open the console, capture its original state, negotiate the output
    /// path, and engage.
    ///
    /// # Errors
    ///
    /// Fails when the console handles cannot be opened or when the screen
    /// is already engaged. VT negotiation failure is not an error; the
    /// driver silently downgrades to the legacy path.
    pub fn init(&self) -> Result<(), ScreenError> {
        self.backend.open()?;

        {
            let mut state = self.lock();
            state.truecolor = self.options.truecolor;
            state.alt_screen = self.options.alt_screen;
            state.cur_x = -1;
            state.cur_y = -1;
            state.style = Style::default();
            state.original_cursor = self.backend.cursor_info();
            state.original_screen = self.backend.screen_info();
            state.original_output_mode = self.backend.output_mode();
            state.original_input_mode = self.backend.input_mode();
            self.reconcile_size(&mut state);
            state.fini = false;

            self.backend
                .set_input_mode(InputMode::RESIZE_EVENTS | InputMode::EXTENDED_FLAGS);

            if self.options.try_vt {
                self.backend.set_output_mode(vt_output_mode());
                // Read back: the bit sticking is the only reliable signal
                // that the host actually processes escapes.
                if self
                    .backend
                    .output_mode()
                    .contains(OutputMode::VT_PROCESSING)
                {
                    state.vt = true;
                    debug!("virtual terminal output negotiated");
                } else {
                    state.truecolor = false;
                    self.backend.set_output_mode(OutputMode::empty());
                    debug!("virtual terminal rejected, using legacy output");
                }
            } else {
                self.backend.set_output_mode(OutputMode::empty());
            }
        }

        self.engage()
    }

    /// Release the console: stop the scanner, restore every captured mode,
    /// and wake any blocked event posters. Idempotent.
    pub fn fini(&self) {
        let quit_tx = {
            let mut state = self.lock();
            if state.fini {
                return;
            }
            state.fini = true;
            state.quit_tx.take()
        };
        // Disconnecting the quit channel unblocks posters on a full queue.
        drop(quit_tx);
        self.disengage();
    }

    /// Temporarily give the console back to the host (e.g. to run a
    /// subprocess). The screen object stays valid; [`resume`](Self::resume)
    /// re-engages.
    pub fn suspend(&self) {
        self.disengage();
    }

    /// Re-engage after [`suspend`](Self::suspend).
    ///
    /// # Errors
    ///
    /// Fails when the screen is already engaged.
    pub fn resume(&self) -> Result<(), ScreenError> {
        self.engage()
    }

    fn engage(&self) -> Result<(), ScreenError> {
        let mut state = self.lock();
        if state.running {
            return Err(ScreenError::AlreadyEngaged);
        }

        let cancel = CancelToken::new();
        let (stop_tx, stop_rx) = bounded(0);
        state.cancel = Some(cancel.clone());
        state.stop_tx = Some(stop_tx);
        state.running = true;

        self.apply_mouse_mode(state.mouse_enabled);

        if state.vt {
            self.backend.set_output_mode(vt_output_mode());
            if state.alt_screen {
                self.emit(vt::SAVE_TITLE);
                self.emit(vt::ENTER_ALT_SCREEN);
            }
            self.emit(vt::DISABLE_AUTO_WRAP);
            if !state.title.is_empty() {
                self.emit(&vt::set_title(&state.title));
            }
        } else {
            self.backend.set_output_mode(OutputMode::empty());
        }

        let style = state.style.clone();
        self.clear_screen(&state, &style);
        self.hide_cursor_raw(&state);

        state.cells.invalidate();
        self.reconcile_size(&mut state);
        self.draw(&mut state);
        self.apply_cursor(&state);

        let backend = Arc::clone(&self.backend);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("congrid-scanner".into())
            .spawn(move || scan_input(backend, shared, cancel, stop_rx))
            .map_err(ScreenError::Io)?;
        state.scanner = Some(handle);

        debug!(vt = state.vt, "screen engaged");
        Ok(())
    }

    fn disengage(&self) {
        let scanner = {
            let mut state = self.lock();
            if !state.running {
                return;
            }
            state.running = false;
            if let Some(cancel) = state.cancel.take() {
                cancel.trip();
            }
            // Dropping the sender closes the scanner's stop channel.
            state.stop_tx.take();
            state.scanner.take()
        };

        if let Some(handle) = scanner {
            let _ = handle.join();
        }

        let state = self.lock();
        if state.vt {
            self.emit(CursorStyle::Default.sequence());
            self.emit(vt::CURSOR_COLOR_RESET);
            self.emit(vt::ENABLE_AUTO_WRAP);
            if state.alt_screen {
                self.emit(vt::RESTORE_TITLE);
                self.emit(vt::EXIT_ALT_SCREEN);
            }
        } else if state.alt_screen {
            self.clear_screen(&state, &Style::default());
            self.backend.set_cursor_pos(Coord::new(0, 0));
        }

        self.backend.set_cursor_info(state.original_cursor);
        self.backend.set_buffer_size(state.original_screen.size);
        self.backend.set_input_mode(state.original_input_mode);
        self.backend.set_output_mode(state.original_output_mode);
        self.backend
            .set_text_attr(legacy_attr(&Style::default(), state.original_screen.attrs));

        debug!("screen disengaged");
    }

    // ── Rendering ────────────────────────────────────────────────────────

    /// Reconcile the viewport and emit every dirty cell.
    pub fn show(&self) {
        let mut state = self.lock();
        if state.fini {
            return;
        }
        self.hide_cursor_raw(&state);
        self.reconcile_size(&mut state);
        self.draw(&mut state);
        self.apply_cursor(&state);
    }

    /// Force a full repaint: invalidate every cell, then draw.
    pub fn sync(&self) {
        let mut state = self.lock();
        if state.fini {
            return;
        }
        state.cells.invalidate();
        self.hide_cursor_raw(&state);
        self.reconcile_size(&mut state);
        self.draw(&mut state);
        self.apply_cursor(&state);
    }

    /// Walk the grid coalescing runs of contiguous dirty cells that share a
    /// style, and flush each run as one positioned write.
    fn draw(&self, state: &mut State) {
        let vt_active = state.vt;
        let original_attrs = state.original_screen.attrs;
        let (w, h) = (state.w, state.h);
        let screen_style = state.style.clone();

        let mut run: Vec<u16> = Vec::with_capacity(w.max(16));
        let mut run_style: Option<Style> = None;
        let (mut run_x, mut run_y) = (0usize, 0usize);
        let mut utf16 = [0u16; 2];

        for y in 0..h {
            let mut x = 0usize;
            while x < w {
                let (mut ch, mut comb, mut style, mut width) = state.cells.get_content(x, y);
                let dirty = state.cells.dirty(x, y);
                if style == Style::default() {
                    style = screen_style.clone();
                }

                // Flush on a clean cell or a style transition.
                if !dirty || run_style.as_ref() != Some(&style) {
                    self.flush_run(vt_active, original_attrs, run_x, run_y, run_style.take(), &mut run);
                    if !dirty {
                        x += 1;
                        continue;
                    }
                }

                if width == 0 {
                    width = 1;
                }
                // A wide glyph that would cross the right edge renders as a
                // plain space; the stored cell is left as-is.
                if x + width > w {
                    ch = ' ';
                    comb.clear();
                    width = 1;
                }

                if run.is_empty() {
                    run_style = Some(style);
                    run_x = x;
                    run_y = y;
                }
                run.extend_from_slice(ch.encode_utf16(&mut utf16));
                for c in &comb {
                    run.extend_from_slice(c.encode_utf16(&mut utf16));
                }
                for dx in 0..width {
                    state.cells.set_dirty(x + dx, y, false);
                }
                x += width;
            }
            self.flush_run(vt_active, original_attrs, run_x, run_y, run_style.take(), &mut run);
        }
    }

    /// Emit one run. VT concatenates position + style + text into a single
    /// write; legacy positions, sets the attribute word, then writes.
    fn flush_run(
        &self,
        vt_active: bool,
        original_attrs: u16,
        x: usize,
        y: usize,
        style: Option<Style>,
        run: &mut Vec<u16>,
    ) {
        if run.is_empty() {
            return;
        }
        let style = style.unwrap_or_default();

        if vt_active {
            let mut buf: Vec<u16> = Vec::with_capacity(run.len() + 32);
            buf.extend(vt::cursor_pos(x, y).encode_utf16());
            buf.extend(vt::style_seq(&style).encode_utf16());
            buf.extend_from_slice(run);
            let _ = self.backend.write_text(&buf);
        } else {
            self.backend.set_cursor_pos(Coord::new(x as i16, y as i16));
            self.backend
                .set_text_attr(legacy_attr(&style, original_attrs));
            let _ = self.backend.write_text(run);
        }
        run.clear();
    }

    fn clear_screen(&self, state: &State, style: &Style) {
        if state.vt {
            self.emit(&vt::style_seq(style));
            let row = " ".repeat(state.w);
            for y in 0..state.h {
                self.emit(&vt::cursor_pos(0, y));
                self.emit(&row);
            }
            self.emit(&vt::cursor_pos(0, 0));
        } else {
            let attr = legacy_attr(style, state.original_screen.attrs);
            let count = (state.w * state.h) as u32;
            self.backend.fill(' ', attr, count);
        }
    }

    // ── Cursor ───────────────────────────────────────────────────────────

    fn hide_cursor_raw(&self, state: &State) {
        if state.vt {
            self.emit(vt::HIDE_CURSOR);
        } else {
            self.backend.set_cursor_info(CursorInfo {
                size: 1,
                visible: false,
            });
        }
    }

    fn show_cursor_raw(&self, state: &State) {
        if state.vt {
            self.emit(vt::SHOW_CURSOR);
            self.emit(state.cursor_style.sequence());
            if let Some(seq) = vt::cursor_color(state.cursor_color) {
                self.emit(&seq);
            }
        } else {
            self.backend.set_cursor_info(CursorInfo {
                size: 100,
                visible: true,
            });
        }
    }

    /// Hide the cursor when the advertised position is out of range,
    /// otherwise position and show it.
    fn apply_cursor(&self, state: &State) {
        let (x, y) = (state.cur_x, state.cur_y);
        if x < 0 || y < 0 || x >= state.w as i32 || y >= state.h as i32 {
            self.hide_cursor_raw(state);
        } else {
            if state.vt {
                self.emit(&vt::cursor_pos(x as usize, y as usize));
            } else {
                self.backend.set_cursor_pos(Coord::new(x as i16, y as i16));
            }
            self.show_cursor_raw(state);
        }
    }

    /// Advertise the cursor at (x, y); negative coordinates hide it.
    pub fn show_cursor(&self, x: i32, y: i32) {
        let mut state = self.lock();
        if state.fini {
            return;
        }
        state.cur_x = x;
        state.cur_y = y;
        self.apply_cursor(&state);
    }

    /// Hide the cursor.
    pub fn hide_cursor(&self) {
        self.show_cursor(-1, -1);
    }

    /// Set the cursor shape and color (VT path only; legacy consoles keep
    /// their block cursor).
    pub fn set_cursor(&self, style: CursorStyle, color: Color) {
        let mut state = self.lock();
        if state.fini {
            return;
        }
        state.cursor_style = style;
        state.cursor_color = color;
        self.apply_cursor(&state);
    }

    // ── Geometry ─────────────────────────────────────────────────────────

    /// Current dimensions in cells.
    #[must_use]
    pub fn size(&self) -> (usize, usize) {
        let state = self.lock();
        (state.w, state.h)
    }

    /// Re-read the viewport; on change, resize the grid, the backing
    /// buffer, and the window, and best-effort post a resize event.
    fn reconcile_size(&self, state: &mut State) {
        let info = self.backend.screen_info();
        let w = info.window.width().max(0) as usize;
        let h = info.window.height().max(0) as usize;
        if state.w == w && state.h == h {
            return;
        }

        state.cells.resize(w, h);
        state.w = w;
        state.h = h;

        self.backend.set_buffer_size(Coord::new(w as i16, h as i16));
        self.backend.set_window_rect(WindowRect {
            left: 0,
            top: 0,
            right: w as i16 - 1,
            bottom: h as i16 - 1,
        });
        // Dropped when the queue is full; consumers treat resizes as
        // idempotent.
        let _ = self.shared.event_tx.try_send(Event::Resize {
            width: w as u16,
            height: h as u16,
        });
    }

    /// Request new dimensions.
    ///
    /// No-op on hosts that cannot honor it: a zero largest-window answer,
    /// or one at least [`MODERN_TERMINAL_MIN_COLS`] wide (modern emulators
    /// reject application-initiated resizing).
    pub fn set_size(&self, width: usize, height: usize) {
        let mut state = self.lock();
        if state.fini {
            return;
        }

        let largest = self.backend.largest_window();
        if largest.x == 0 || largest.y == 0 {
            return;
        }
        if largest.x >= MODERN_TERMINAL_MIN_COLS {
            return;
        }

        self.backend
            .set_buffer_size(Coord::new(width as i16, height as i16));
        self.backend.set_window_rect(WindowRect {
            left: 0,
            top: 0,
            right: width as i16 - 1,
            bottom: height as i16 - 1,
        });
        self.reconcile_size(&mut state);
    }

    // ── Content and style ────────────────────────────────────────────────

    /// Store content into a cell of the back buffer.
    pub fn set_content(&self, x: usize, y: usize, ch: char, combining: &[char], style: Style) {
        let mut state = self.lock();
        if state.fini {
            return;
        }
        state.cells.set_content(x, y, ch, combining, style);
    }

    /// Read back a cell of the back buffer.
    #[must_use]
    pub fn get_content(&self, x: usize, y: usize) -> (char, Combining, Style, usize) {
        self.lock().cells.get_content(x, y)
    }

    /// Set the style substituted for cells whose stored style is the
    /// default.
    pub fn set_style(&self, style: Style) {
        let mut state = self.lock();
        if state.fini {
            return;
        }
        state.style = style;
    }

    /// Set the window title (emitted immediately on the VT path, and
    /// re-applied on every engage).
    pub fn set_title(&self, title: &str) {
        let mut state = self.lock();
        if state.fini {
            return;
        }
        state.title = title.to_string();
        if state.vt {
            self.emit(&vt::set_title(title));
        }
    }

    // ── Input configuration ──────────────────────────────────────────────

    fn apply_mouse_mode(&self, on: bool) {
        let mut mode = InputMode::RESIZE_EVENTS | InputMode::EXTENDED_FLAGS;
        if on {
            mode |= InputMode::MOUSE_INPUT;
        }
        self.backend.set_input_mode(mode);
    }

    /// Enable mouse reporting.
    pub fn enable_mouse(&self) {
        let mut state = self.lock();
        if state.fini {
            return;
        }
        state.mouse_enabled = true;
        self.apply_mouse_mode(true);
    }

    /// Disable mouse reporting.
    pub fn disable_mouse(&self) {
        let mut state = self.lock();
        if state.fini {
            return;
        }
        state.mouse_enabled = false;
        self.apply_mouse_mode(false);
    }

    /// The console always has a mouse.
    #[must_use]
    pub fn has_mouse(&self) -> bool {
        true
    }

    /// Forward focus records as events.
    pub fn enable_focus(&self) {
        let mut state = self.lock();
        if state.fini {
            return;
        }
        state.focus_enabled = true;
    }

    /// Stop forwarding focus records.
    pub fn disable_focus(&self) {
        let mut state = self.lock();
        if state.fini {
            return;
        }
        state.focus_enabled = false;
    }

    /// Bracketed paste does not exist on this platform.
    pub fn enable_paste(&self) {}

    /// Bracketed paste does not exist on this platform.
    pub fn disable_paste(&self) {}

    // ── Capabilities ─────────────────────────────────────────────────────

    /// Number of displayable colors: 2²⁴ under VT, 16 on legacy consoles.
    #[must_use]
    pub fn colors(&self) -> usize {
        if self.lock().vt { 1 << 24 } else { 16 }
    }

    /// Whether 24-bit color survived negotiation.
    #[must_use]
    pub fn truecolor(&self) -> bool {
        self.lock().truecolor
    }

    /// Sound the console bell.
    ///
    /// # Errors
    ///
    /// Fails when the host bell call fails.
    pub fn beep(&self) -> io::Result<()> {
        self.backend.beep()
    }

    /// Whether this driver can report the given key: the typical 101/105
    /// layout plus runes.
    #[must_use]
    pub fn has_key(&self, key: Key) -> bool {
        match key {
            Key::Char(_)
            | Key::Backspace
            | Key::Tab
            | Key::Escape
            | Key::Pause
            | Key::Print
            | Key::PageUp
            | Key::PageDown
            | Key::Enter
            | Key::End
            | Key::Home
            | Key::Left
            | Key::Up
            | Key::Right
            | Key::Down
            | Key::Insert
            | Key::Delete => true,
            Key::F(n) => (1..=12).contains(&n),
            _ => false,
        }
    }

    /// Output is Unicode; everything displays.
    #[must_use]
    pub fn can_display(&self, _ch: char, _fallback: bool) -> bool {
        true
    }

    /// The console writes UTF-16LE code units.
    #[must_use]
    pub fn character_set(&self) -> &'static str {
        "UTF-16LE"
    }

    /// Native Unicode output needs no fallback registry.
    pub fn register_rune_fallback(&self, _ch: char, _fallback: &str) {}

    /// Native Unicode output needs no fallback registry.
    pub fn unregister_rune_fallback(&self, _ch: char) {}

    /// Clipboard integration is not available on this platform.
    pub fn set_clipboard(&self, _data: &[u8]) {}

    /// Clipboard integration is not available on this platform.
    pub fn get_clipboard(&self) {}

    // ── Queues ───────────────────────────────────────────────────────────

    /// The consumer-facing event queue.
    #[must_use]
    pub fn events(&self) -> Receiver<Event> {
        self.event_rx.clone()
    }

    /// A channel that disconnects when [`fini`](Self::fini) runs; use it to
    /// observe shutdown while blocked on [`events`](Self::events).
    #[must_use]
    pub fn stop_events(&self) -> Receiver<()> {
        self.shared.quit_rx.clone()
    }
}

impl<B: ConsoleBackend> Drop for ConsoleScreen<B> {
    fn drop(&mut self) {
        self.fini();
    }
}

fn vt_output_mode() -> OutputMode {
    OutputMode::COOKED
        | OutputMode::VT_PROCESSING
        | OutputMode::NO_AUTO_NEWLINE
        | OutputMode::UNDERLINE_GRID
}
