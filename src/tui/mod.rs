//! TUI setup, teardown, and main event loop.

pub mod autocomplete;
pub mod editor;
pub mod messages;
pub mod statusbar;
pub mod ui;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::info;

use crate::app::{App, FocusPane};
use crate::config::{Config, SourceKind};
use crate::controller::Controller;
use crate::error::Result;
use crate::source;

/// How long one loop iteration waits for terminal input.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Run the TUI application.
pub async fn run(config: &Config) -> Result<()> {
    let widget = Controller::builder(config.widget.clone())
        .boxed_data_source(source::from_config(&config.source)?)
        .build()?;
    let mut app = App::new(widget, source_label(config));
    info!(source = %app.source_label, "starting composer");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Status bar description of the configured source.
pub fn source_label(config: &Config) -> String {
    let kind = match config.source.kind {
        SourceKind::Local => "local",
        SourceKind::Lazy => "lazy",
        SourceKind::PerQuery => "per-query",
    };
    match &config.source.path {
        Some(path) => format!("{kind}: {}", path.display()),
        None => format!("{kind}: built-in"),
    }
}

/// The main TUI event loop.
fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a timeout so widget events keep flowing
        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(key, app),
                Event::Mouse(mouse) => handle_mouse(mouse, app),
                _ => {}
            }
        }

        app.widget.process_pending()?;

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Handle a key event.
pub fn handle_key(key: KeyEvent, app: &mut App) {
    // Global keys
    match (key.modifiers, key.code) {
        // Ctrl+Q: quit
        (KeyModifiers::CONTROL, KeyCode::Char('q')) => {
            app.should_quit = true;
            return;
        }
        // F1: toggle help
        (_, KeyCode::F(1)) => {
            app.show_help = !app.show_help;
            return;
        }
        // Ctrl+L: clear the message
        (KeyModifiers::CONTROL, KeyCode::Char('l')) => {
            app.clear_field();
            return;
        }
        // Ctrl+Enter or F5: send
        (KeyModifiers::CONTROL, KeyCode::Enter) | (_, KeyCode::F(5)) => {
            app.send();
            return;
        }
        _ => {}
    }

    // Pane-specific keys
    match app.focus() {
        FocusPane::Field => {
            // An open popup gets first pick of navigation keys
            if app.widget.handle_key(&key, &mut app.field) {
                return;
            }
            if key.code == KeyCode::Tab && key.modifiers == KeyModifiers::NONE {
                app.cycle_focus();
                return;
            }
            if app.field.input(key) || is_cursor_key(key.code) {
                app.widget.on_change(&app.field);
            }
        }
        FocusPane::Messages => match key.code {
            KeyCode::Up => app.scroll_messages_up(),
            KeyCode::Down => app.scroll_messages_down(),
            KeyCode::Tab => app.cycle_focus(),
            _ => {}
        },
    }
}

/// Keys that move the cursor without editing; the query under it may change.
fn is_cursor_key(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Left
            | KeyCode::Right
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Home
            | KeyCode::End
    )
}

/// Handle a mouse event.
pub fn handle_mouse(mouse: MouseEvent, app: &mut App) {
    if app.widget.handle_mouse(&mouse, &mut app.field) {
        return;
    }

    let position = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.field_area.contains(position) {
                app.focus_field();
            } else {
                app.blur_field();
            }
        }
        MouseEventKind::ScrollUp if app.messages_area.contains(position) => {
            app.scroll_messages_up();
        }
        MouseEventKind::ScrollDown if app.messages_area.contains(position) => {
            app.scroll_messages_down();
        }
        _ => {}
    }
}
