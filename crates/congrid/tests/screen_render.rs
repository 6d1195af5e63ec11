//! Rendering and lifecycle behavior against the fake console.

use congrid::backend::{Coord, CursorInfo, InputMode, OutputMode, WindowRect};
use congrid::fake::{ConsoleOp, FakeConsole};
use congrid::screen::{ConsoleScreen, DriverOptions, ScreenError};
use congrid::{Color, Style};

fn vt_screen(width: i16, height: i16) -> (ConsoleScreen<FakeConsole>, FakeConsole) {
    let console = FakeConsole::new(width, height);
    let screen = ConsoleScreen::new(console.clone(), DriverOptions::default());
    screen.init().expect("init succeeds");
    drain_events(&screen);
    console.clear_ops();
    (screen, console)
}

fn legacy_screen(width: i16, height: i16) -> (ConsoleScreen<FakeConsole>, FakeConsole) {
    let console = FakeConsole::new(width, height);
    let screen = ConsoleScreen::new(
        console.clone(),
        DriverOptions {
            try_vt: false,
            ..DriverOptions::default()
        },
    );
    screen.init().expect("init succeeds");
    drain_events(&screen);
    console.clear_ops();
    (screen, console)
}

fn drain_events(screen: &ConsoleScreen<FakeConsole>) {
    let events = screen.events();
    while events.try_recv().is_ok() {}
}

fn write_ops(console: &FakeConsole) -> Vec<String> {
    console
        .ops()
        .into_iter()
        .filter_map(|op| match op {
            ConsoleOp::Write(text) => Some(text),
            _ => None,
        })
        .collect()
}

// ── Scenario: plain draw on the legacy path ─────────────────────────────

#[test]
fn legacy_draw_sets_attribute_then_writes() {
    let (screen, console) = legacy_screen(80, 25);

    screen.set_content(0, 0, 'A', &[], Style::default().fg(Color::Palette(9)));
    screen.show();

    let ops = console.ops();
    let attr_idx = ops
        .iter()
        .position(|op| matches!(op, ConsoleOp::SetTextAttr(_)))
        .expect("a text attribute was set");

    let Some(&ConsoleOp::SetTextAttr(attr)) = ops.get(attr_idx) else {
        unreachable!()
    };
    // Bright red maps to VGA 0xC; the background inherits the captured
    // original nibble (0 for the fake's 0x0007 default).
    assert_eq!(attr & 0xF, 0xC);
    assert_eq!((attr >> 4) & 0xF, 0x0);

    assert_eq!(
        ops[attr_idx - 1],
        ConsoleOp::SetCursorPos(Coord::new(0, 0)),
        "the run is positioned before the attribute is set"
    );
    assert_eq!(ops[attr_idx + 1], ConsoleOp::Write("A".to_string()));
}

// ── Scenario: VT coalescing ─────────────────────────────────────────────

#[test]
fn vt_coalesces_a_same_style_run_into_one_write() {
    let (screen, console) = vt_screen(80, 25);

    let style = Style::default().fg(Color::Rgb(255, 0, 0));
    for (i, ch) in "ABCD".chars().enumerate() {
        screen.set_content(i, 0, ch, &[], style.clone());
    }
    screen.show();

    let runs: Vec<String> = write_ops(&console)
        .into_iter()
        .filter(|w| w.contains("ABCD"))
        .collect();
    assert_eq!(runs.len(), 1, "exactly one write carries the run");
    assert_eq!(
        runs[0],
        "\u{1b}[1;1H\u{1b}[0m\u{1b}[38;2;255;0;0m\u{1b}]8;;\u{1b}\\ABCD"
    );

    // And no other write re-positions or re-styles for these cells.
    let styled_writes = write_ops(&console)
        .into_iter()
        .filter(|w| w.contains("\u{1b}[38;2;255;0;0m"))
        .count();
    assert_eq!(styled_writes, 1);
}

// ── Scenario: mixed styles break the run ────────────────────────────────

#[test]
fn style_change_splits_runs() {
    let (screen, console) = vt_screen(80, 25);

    let alpha = Style::default().fg(Color::Palette(2));
    let beta = Style::default().fg(Color::Palette(5));
    screen.set_content(0, 0, 'A', &[], alpha.clone());
    screen.set_content(1, 0, 'B', &[], beta);
    screen.set_content(2, 0, 'C', &[], alpha);
    screen.show();

    let bursts: Vec<String> = write_ops(&console)
        .into_iter()
        .filter(|w| w.starts_with("\u{1b}[1;") && w.contains('m'))
        .collect();
    assert_eq!(bursts.len(), 3, "one positioned burst per style run");
    assert!(bursts[0].starts_with("\u{1b}[1;1H") && bursts[0].ends_with('A'));
    assert!(bursts[1].starts_with("\u{1b}[1;2H") && bursts[1].ends_with('B'));
    assert!(bursts[2].starts_with("\u{1b}[1;3H") && bursts[2].ends_with('C'));
}

// ── Scenario: wide glyph at the right edge ──────────────────────────────

#[test]
fn wide_glyph_at_edge_renders_as_space() {
    let (screen, console) = vt_screen(4, 2);

    screen.set_content(3, 0, '世', &[], Style::default());
    screen.show();

    let written = console.written();
    assert!(!written.contains('世'), "the wide rune must not be emitted");
    let edge = write_ops(&console)
        .into_iter()
        .find(|w| w.starts_with("\u{1b}[1;4H"))
        .expect("the edge cell is emitted");
    assert!(edge.ends_with(' '));

    // The stored cell is untouched.
    let (ch, _, _, width) = screen.get_content(3, 0);
    assert_eq!(ch, '世');
    assert_eq!(width, 2);
}

#[test]
fn wide_glyph_clears_dirty_for_both_columns() {
    let (screen, console) = vt_screen(8, 2);

    screen.set_content(2, 0, '世', &[], Style::default());
    screen.show();
    console.clear_ops();

    // Nothing left dirty: a second show emits no writes beyond cursor
    // handling.
    screen.show();
    assert!(
        write_ops(&console)
            .iter()
            .all(|w| !w.contains('世') && !w.contains("\u{1b}[0m")),
        "no cell writes on a clean grid"
    );
}

// ── Incremental vs full redraw ──────────────────────────────────────────

#[test]
fn show_emits_nothing_for_a_clean_grid() {
    let (screen, console) = legacy_screen(6, 3);
    screen.show();
    assert!(
        console
            .ops()
            .iter()
            .all(|op| !matches!(op, ConsoleOp::Write(_))),
        "clean grid, no writes"
    );
}

#[test]
fn sync_re_emits_every_cell() {
    let (screen, console) = legacy_screen(6, 3);

    screen.show();
    console.clear_ops();

    screen.sync();
    let emitted: usize = write_ops(&console).iter().map(|w| w.chars().count()).sum();
    assert_eq!(emitted, 6 * 3, "every cell re-emitted regardless of dirt");
}

#[test]
fn default_styled_cells_inherit_the_screen_style() {
    let (screen, console) = vt_screen(8, 2);

    screen.set_style(Style::default().fg(Color::Palette(3)));
    screen.set_content(0, 0, 'Z', &[], Style::default());
    screen.show();

    let run = write_ops(&console)
        .into_iter()
        .find(|w| w.ends_with('Z'))
        .expect("cell emitted");
    assert!(run.contains("\u{1b}[38;5;3m"));
}

// ── Cursor policy ───────────────────────────────────────────────────────

#[test]
fn cursor_hidden_when_out_of_range_shown_when_placed() {
    let (screen, console) = vt_screen(10, 4);

    screen.show_cursor(3, 2);
    let written = console.written();
    assert!(written.contains("\u{1b}[3;4H"));
    assert!(written.ends_with("\u{1b}[?25h\u{1b}[0 q"));

    console.clear_ops();
    screen.hide_cursor();
    assert_eq!(console.written(), "\u{1b}[?25l");

    console.clear_ops();
    screen.show_cursor(50, 50);
    assert_eq!(console.written(), "\u{1b}[?25l", "out of range hides");
}

#[test]
fn cursor_style_and_color_are_emitted_on_show() {
    let (screen, console) = vt_screen(10, 4);

    screen.set_cursor(congrid::CursorStyle::SteadyBar, Color::Rgb(0, 255, 0));
    screen.show_cursor(0, 0);

    let written = console.written();
    assert!(written.contains("\u{1b}[6 q"));
    assert!(written.contains("\u{1b}]12;#00ff00\u{7}"));
}

#[test]
fn legacy_cursor_uses_cursor_info_calls() {
    let (screen, console) = legacy_screen(10, 4);

    screen.show_cursor(1, 1);
    let ops = console.ops();
    assert!(ops.contains(&ConsoleOp::SetCursorPos(Coord::new(1, 1))));
    assert!(ops.contains(&ConsoleOp::SetCursorInfo(CursorInfo {
        size: 100,
        visible: true
    })));
}

// ── VT negotiation ──────────────────────────────────────────────────────

#[test]
fn vt_rejection_downgrades_to_legacy() {
    let console = FakeConsole::new(80, 25);
    console.reject_vt(true);
    let screen = ConsoleScreen::new(console.clone(), DriverOptions::default());
    screen.init().expect("init succeeds");

    assert_eq!(screen.colors(), 16);
    assert!(!screen.truecolor());

    // The mode was requested with the VT bit, then cleared after read-back.
    let requested = console
        .ops()
        .iter()
        .filter_map(|op| match op {
            ConsoleOp::SetOutputMode(mode) => Some(*mode),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert!(requested.iter().any(|m| m.contains(OutputMode::VT_PROCESSING)));
    assert!(requested.iter().any(|m| m.is_empty()));
}

#[test]
fn vt_acceptance_reports_truecolor() {
    let (screen, _console) = vt_screen(80, 25);
    assert_eq!(screen.colors(), 1 << 24);
    assert!(screen.truecolor());
}

#[test]
fn forced_legacy_never_requests_vt() {
    let (_screen, console) = {
        let console = FakeConsole::new(80, 25);
        let screen = ConsoleScreen::new(
            console.clone(),
            DriverOptions {
                try_vt: false,
                ..DriverOptions::default()
            },
        );
        screen.init().expect("init succeeds");
        (screen, console)
    };
    assert!(
        console
            .ops()
            .iter()
            .all(|op| !matches!(op, ConsoleOp::SetOutputMode(m) if m.contains(OutputMode::VT_PROCESSING)))
    );
}

// ── Alternate screen and title ──────────────────────────────────────────

#[test]
fn engage_enters_alt_screen_and_fini_leaves_it() {
    let console = FakeConsole::new(80, 25);
    let screen = ConsoleScreen::new(console.clone(), DriverOptions::default());
    screen.init().expect("init succeeds");

    let written = console.written();
    assert!(written.contains("\u{1b}[22;2t"));
    assert!(written.contains("\u{1b}[?1049h\u{1b}[22;0;0t"));
    assert!(written.contains("\u{1b}[?7l"));

    console.clear_ops();
    screen.fini();
    let written = console.written();
    assert!(written.contains("\u{1b}[0 q"));
    assert!(written.contains("\u{1b}]112\u{7}"));
    assert!(written.contains("\u{1b}[?7h"));
    assert!(written.contains("\u{1b}[23;2t"));
    assert!(written.contains("\u{1b}[?1049l\u{1b}[23;0;0t"));
}

#[test]
fn disabled_alt_screen_is_never_entered() {
    let console = FakeConsole::new(80, 25);
    let screen = ConsoleScreen::new(
        console.clone(),
        DriverOptions {
            alt_screen: false,
            ..DriverOptions::default()
        },
    );
    screen.init().expect("init succeeds");
    assert!(!console.written().contains("\u{1b}[?1049h"));

    console.clear_ops();
    screen.fini();
    assert!(!console.written().contains("\u{1b}[?1049l"));
}

#[test]
fn title_is_emitted_and_reapplied_on_resume() {
    let (screen, console) = vt_screen(80, 25);

    screen.set_title("status");
    assert!(console.written().contains("\u{1b}]2;status\u{1b}\\"));

    screen.suspend();
    console.clear_ops();
    screen.resume().expect("resume succeeds");
    assert!(console.written().contains("\u{1b}]2;status\u{1b}\\"));
}

// ── Mode restore on teardown ────────────────────────────────────────────

#[test]
fn fini_restores_original_console_state() {
    let console = FakeConsole::new(80, 25);
    console.set_attrs(0x0017);
    let screen = ConsoleScreen::new(console.clone(), DriverOptions::default());
    screen.init().expect("init succeeds");
    screen.enable_mouse();

    console.clear_ops();
    screen.fini();

    let ops = console.ops();
    assert!(ops.contains(&ConsoleOp::SetCursorInfo(CursorInfo {
        size: 25,
        visible: true
    })));
    assert!(ops.contains(&ConsoleOp::SetBufferSize(Coord::new(80, 25))));
    // The fake's modes were empty before init.
    assert_eq!(
        ops.iter().rev().find_map(|op| match op {
            ConsoleOp::SetInputMode(mode) => Some(*mode),
            _ => None,
        }),
        Some(InputMode::empty())
    );
    assert_eq!(
        ops.iter().rev().find_map(|op| match op {
            ConsoleOp::SetOutputMode(mode) => Some(*mode),
            _ => None,
        }),
        Some(OutputMode::empty())
    );
    // The default text attribute is re-applied from the captured word.
    assert_eq!(
        ops.iter().rev().find_map(|op| match op {
            ConsoleOp::SetTextAttr(attr) => Some(*attr),
            _ => None,
        }),
        Some(0x0017)
    );
}

#[test]
fn fini_is_idempotent() {
    let (screen, console) = vt_screen(80, 25);
    screen.fini();
    let ops_after_first = console.ops().len();
    screen.fini();
    assert_eq!(console.ops().len(), ops_after_first);
}

#[test]
fn mutating_calls_after_fini_are_no_ops() {
    let (screen, console) = vt_screen(80, 25);
    screen.fini();
    console.clear_ops();

    screen.set_content(0, 0, 'X', &[], Style::default());
    screen.show();
    screen.sync();
    screen.show_cursor(1, 1);
    screen.set_title("late");
    screen.set_size(10, 10);
    assert!(console.ops().is_empty());
}

#[test]
fn resume_while_running_is_a_misuse_error() {
    let (screen, _console) = vt_screen(80, 25);
    assert!(matches!(screen.resume(), Err(ScreenError::AlreadyEngaged)));
}

#[test]
fn suspend_then_resume_round_trips() {
    let (screen, console) = vt_screen(80, 25);

    screen.suspend();
    assert!(console.written().contains("\u{1b}[?1049l"));

    console.clear_ops();
    screen.resume().expect("resume succeeds");
    assert!(console.written().contains("\u{1b}[?1049h"));
}

#[test]
fn failed_open_aborts_init() {
    let console = FakeConsole::new(80, 25);
    console.fail_open(true);
    let screen = ConsoleScreen::new(console.clone(), DriverOptions::default());
    assert!(matches!(screen.init(), Err(ScreenError::Io(_))));
}

// ── Geometry ────────────────────────────────────────────────────────────

#[test]
fn viewport_change_resizes_and_posts_event() {
    let (screen, console) = vt_screen(80, 25);
    let events = screen.events();

    console.set_viewport(40, 12);
    screen.show();

    assert_eq!(screen.size(), (40, 12));
    let resize = events
        .try_iter()
        .find(|e| matches!(e, congrid::Event::Resize { .. }));
    assert_eq!(
        resize,
        Some(congrid::Event::Resize {
            width: 40,
            height: 12
        })
    );
}

#[test]
fn set_size_is_suppressed_on_modern_hosts() {
    let (screen, console) = legacy_screen(80, 25);
    console.set_largest_window(Coord::new(600, 200));
    console.clear_ops();

    screen.set_size(100, 30);
    assert!(console.ops().is_empty());
    assert_eq!(screen.size(), (80, 25));
}

#[test]
fn set_size_applies_requested_dimensions() {
    let (screen, console) = legacy_screen(80, 25);
    console.set_largest_window(Coord::new(200, 100));
    console.clear_ops();

    screen.set_size(100, 30);
    assert_eq!(screen.size(), (100, 30));
    let ops = console.ops();
    assert!(ops.contains(&ConsoleOp::SetBufferSize(Coord::new(100, 30))));
    assert!(ops.contains(&ConsoleOp::SetWindowRect(WindowRect {
        left: 0,
        top: 0,
        right: 99,
        bottom: 29
    })));
}

#[test]
fn set_size_with_zero_largest_window_is_a_no_op() {
    let (screen, console) = legacy_screen(80, 25);
    console.set_largest_window(Coord::new(0, 0));
    console.clear_ops();

    screen.set_size(100, 30);
    assert!(console.ops().is_empty());
}

// ── Small capability surface ────────────────────────────────────────────

#[test]
fn capability_queries() {
    let (screen, console) = vt_screen(80, 25);
    assert!(screen.has_mouse());
    assert!(screen.can_display('世', true));
    assert_eq!(screen.character_set(), "UTF-16LE");
    assert!(screen.has_key(congrid::Key::F(5)));
    assert!(!screen.has_key(congrid::Key::F(13)));
    assert!(screen.has_key(congrid::Key::Char('q')));
    assert!(!screen.has_key(congrid::Key::Help));

    screen.beep().expect("beep succeeds");
    assert!(console.ops().contains(&ConsoleOp::Beep));
}

#[test]
fn paste_and_clipboard_are_no_ops() {
    let (screen, console) = vt_screen(80, 25);
    console.clear_ops();
    screen.enable_paste();
    screen.disable_paste();
    screen.set_clipboard(b"data");
    screen.get_clipboard();
    screen.register_rune_fallback('x', "y");
    screen.unregister_rune_fallback('x');
    assert!(console.ops().is_empty());
}
