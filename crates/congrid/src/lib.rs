#![forbid(unsafe_code)]

//! A dual-mode console screen driver.
//!
//! The driver owns a rectangular grid of character cells, reconciles that
//! logical back buffer against the physical console by emitting minimal
//! updates, and multiplexes keyboard/mouse/resize/focus input onto a
//! consumer-facing event queue.
//!
//! Two rendering paths are negotiated at runtime: direct attribute calls
//! for legacy consoles, and a VT/ANSI escape stream for consoles with
//! virtual-terminal processing. The host console itself sits behind the
//! narrow [`backend::ConsoleBackend`] trait, so the same driver runs
//! against the real console, a pseudo-terminal, or the in-memory
//! [`fake::FakeConsole`] used by the test suite.

pub mod backend;
pub mod fake;
pub mod input;
pub mod screen;

pub use congrid_core::cancel::CancelToken;
pub use congrid_core::event::{Buttons, Event, Key, KeyEvent, Modifiers, MouseEvent};
pub use congrid_render::cell::CellBuffer;
pub use congrid_render::color::Color;
pub use congrid_render::style::{Attrs, Style, UnderlineStyle};
pub use congrid_render::vt::CursorStyle;
pub use screen::{ConsoleScreen, DriverOptions, ScreenError};
