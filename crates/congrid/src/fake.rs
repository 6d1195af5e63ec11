#![forbid(unsafe_code)]

//! An in-memory console for tests.
//!
//! [`FakeConsole`] implements the full [`ConsoleBackend`] surface: it
//! records every operation the driver performs, serves scripted input
//! records to the scanner, and honors the cancellation token. Handles are
//! cheap clones sharing one console, so a test can keep a handle while the
//! driver owns another.
//!
//! Knobs:
//!
//! - [`FakeConsole::reject_vt`] makes `set_output_mode` drop the
//!   VT-processing bit, emulating a legacy host; the driver's read-back
//!   negotiation then downgrades.
//! - [`FakeConsole::fail_open`] makes `open` fail, for init error paths.
//! - [`FakeConsole::fail_reads`] makes `read_record` fail, for scanner
//!   termination paths.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use congrid_core::cancel::CancelToken;

use crate::backend::{
    ConsoleBackend, Coord, CursorInfo, InputMode, InputRecord, OutputMode, ScreenInfo, WaitSignal,
    WindowRect,
};

/// One recorded backend operation, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleOp {
    /// `set_input_mode` with the requested word.
    SetInputMode(InputMode),
    /// `set_output_mode` with the requested word (before any VT rejection).
    SetOutputMode(OutputMode),
    /// `set_cursor_info`.
    SetCursorInfo(CursorInfo),
    /// `set_cursor_pos`.
    SetCursorPos(Coord),
    /// `set_buffer_size`.
    SetBufferSize(Coord),
    /// `set_window_rect`.
    SetWindowRect(WindowRect),
    /// `set_text_attr`.
    SetTextAttr(u16),
    /// `write_text`, decoded from UTF-16 for readable assertions.
    Write(String),
    /// `fill`.
    Fill {
        /// Fill character.
        ch: char,
        /// Fill attribute word.
        attr: u16,
        /// Cell count.
        count: u32,
    },
    /// `beep`.
    Beep,
}

#[derive(Debug)]
struct FakeState {
    records: VecDeque<InputRecord>,
    ops: Vec<ConsoleOp>,
    input_mode: InputMode,
    output_mode: OutputMode,
    reject_vt: bool,
    fail_open: bool,
    fail_reads: bool,
    screen: ScreenInfo,
    cursor: CursorInfo,
    largest: Coord,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<FakeState>,
    input_ready: Condvar,
}

/// A cloneable handle to an in-memory console.
#[derive(Debug, Clone)]
pub struct FakeConsole {
    inner: Arc<Inner>,
}

impl FakeConsole {
    /// Create a console whose visible window is `width`×`height` cells.
    #[must_use]
    pub fn new(width: i16, height: i16) -> Self {
        let screen = ScreenInfo {
            size: Coord::new(width, height),
            cursor: Coord::new(0, 0),
            attrs: 0x0007,
            window: WindowRect {
                left: 0,
                top: 0,
                right: width - 1,
                bottom: height - 1,
            },
            max_size: Coord::new(width, height),
        };
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(FakeState {
                    records: VecDeque::new(),
                    ops: Vec::new(),
                    input_mode: InputMode::empty(),
                    output_mode: OutputMode::empty(),
                    reject_vt: false,
                    fail_open: false,
                    fail_reads: false,
                    screen,
                    cursor: CursorInfo {
                        size: 25,
                        visible: true,
                    },
                    largest: Coord::new(width, height),
                }),
                input_ready: Condvar::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make `set_output_mode` refuse the VT-processing bit.
    pub fn reject_vt(&self, reject: bool) {
        self.lock().reject_vt = reject;
    }

    /// Make `open` fail.
    pub fn fail_open(&self, fail: bool) {
        self.lock().fail_open = fail;
    }

    /// Make `read_record` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Queue an input record and wake the scanner.
    pub fn push_record(&self, record: InputRecord) {
        self.lock().records.push_back(record);
        self.inner.input_ready.notify_all();
    }

    /// Change the visible window size, as a host-side resize would.
    pub fn set_viewport(&self, width: i16, height: i16) {
        let mut state = self.lock();
        state.screen.window = WindowRect {
            left: 0,
            top: 0,
            right: width - 1,
            bottom: height - 1,
        };
        state.screen.size = Coord::new(width, height);
    }

    /// Set what `largest_window` reports.
    pub fn set_largest_window(&self, size: Coord) {
        self.lock().largest = size;
    }

    /// Override the captured text attribute word.
    pub fn set_attrs(&self, attrs: u16) {
        self.lock().screen.attrs = attrs;
    }

    /// Snapshot the operations recorded so far.
    #[must_use]
    pub fn ops(&self) -> Vec<ConsoleOp> {
        self.lock().ops.clone()
    }

    /// Forget all recorded operations.
    pub fn clear_ops(&self) {
        self.lock().ops.clear();
    }

    /// Concatenate every `Write` operation recorded so far.
    #[must_use]
    pub fn written(&self) -> String {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                ConsoleOp::Write(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl ConsoleBackend for FakeConsole {
    fn open(&self) -> io::Result<()> {
        if self.lock().fail_open {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "console handles unavailable",
            ));
        }
        Ok(())
    }

    fn wait_input(&self, cancel: &CancelToken) -> io::Result<WaitSignal> {
        let mut state = self.lock();
        loop {
            // Cancellation takes priority over ready input.
            if cancel.is_tripped() {
                return Ok(WaitSignal::Cancelled);
            }
            if !state.records.is_empty() {
                return Ok(WaitSignal::Input);
            }
            let (guard, _) = self
                .inner
                .input_ready
                .wait_timeout(state, Duration::from_millis(5))
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            state = guard;
        }
    }

    fn read_record(&self) -> io::Result<Option<InputRecord>> {
        let mut state = self.lock();
        if state.fail_reads {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "console read failed",
            ));
        }
        Ok(state.records.pop_front())
    }

    fn write_text(&self, units: &[u16]) -> io::Result<()> {
        let text = String::from_utf16_lossy(units);
        self.lock().ops.push(ConsoleOp::Write(text));
        Ok(())
    }

    fn input_mode(&self) -> InputMode {
        self.lock().input_mode
    }

    fn set_input_mode(&self, mode: InputMode) {
        let mut state = self.lock();
        state.input_mode = mode;
        state.ops.push(ConsoleOp::SetInputMode(mode));
    }

    fn output_mode(&self) -> OutputMode {
        self.lock().output_mode
    }

    fn set_output_mode(&self, mode: OutputMode) {
        let mut state = self.lock();
        let effective = if state.reject_vt {
            mode - OutputMode::VT_PROCESSING
        } else {
            mode
        };
        state.output_mode = effective;
        state.ops.push(ConsoleOp::SetOutputMode(mode));
    }

    fn screen_info(&self) -> ScreenInfo {
        self.lock().screen
    }

    fn cursor_info(&self) -> CursorInfo {
        self.lock().cursor
    }

    fn set_cursor_info(&self, info: CursorInfo) {
        let mut state = self.lock();
        state.cursor = info;
        state.ops.push(ConsoleOp::SetCursorInfo(info));
    }

    fn set_cursor_pos(&self, pos: Coord) {
        let mut state = self.lock();
        state.screen.cursor = pos;
        state.ops.push(ConsoleOp::SetCursorPos(pos));
    }

    fn set_buffer_size(&self, size: Coord) {
        let mut state = self.lock();
        state.screen.size = size;
        state.ops.push(ConsoleOp::SetBufferSize(size));
    }

    fn set_window_rect(&self, rect: WindowRect) {
        let mut state = self.lock();
        state.screen.window = rect;
        state.ops.push(ConsoleOp::SetWindowRect(rect));
    }

    fn largest_window(&self) -> Coord {
        self.lock().largest
    }

    fn set_text_attr(&self, attr: u16) {
        self.lock().ops.push(ConsoleOp::SetTextAttr(attr));
    }

    fn fill(&self, ch: char, attr: u16, count: u32) {
        self.lock().ops.push(ConsoleOp::Fill { ch, attr, count });
    }

    fn beep(&self) -> io::Result<()> {
        self.lock().ops.push(ConsoleOp::Beep);
        Ok(())
    }
}
