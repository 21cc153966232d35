//! Main UI layout and rendering.

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::{editor, messages, statusbar};

/// Rows taken by the field pane, borders included.
const FIELD_HEIGHT: u16 = 5;

/// Draw the entire TUI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    // Main layout: title bar, content, status bar, keybindings
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title bar
            Constraint::Min(5),    // content
            Constraint::Length(1), // status bar
            Constraint::Length(1), // key bindings
        ])
        .split(size);

    // Title bar
    let title = Paragraph::new(format!(
        " mentions | type {} to mention someone",
        app.widget.settings().start_delimiter
    ))
    .style(Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 46)));
    frame.render_widget(title, chunks[0]);

    // Content area: field above, message log below
    let content = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FIELD_HEIGHT), // field
            Constraint::Min(3),               // messages
        ])
        .split(chunks[1]);

    editor::draw(frame, app, content[0]);
    messages::draw(frame, app, content[1]);

    // Status bar
    statusbar::draw(frame, app, chunks[2]);

    // Key bindings bar
    let keys_text = if app.widget.is_open() {
        " ↑/↓: Choose │ Enter/Tab: Insert │ Esc: Dismiss │ Ctrl+Q: Quit"
    } else {
        " Ctrl+Enter: Send │ Tab: Switch Pane │ Ctrl+L: Clear │ Ctrl+Q: Quit │ F1: Help"
    };
    let keys = Paragraph::new(keys_text).style(
        Style::default()
            .fg(Color::DarkGray)
            .bg(Color::Rgb(30, 30, 46)),
    );
    frame.render_widget(keys, chunks[3]);

    // Suggestion popup hangs below the field
    let field_area = app.field_area;
    app.widget.draw(frame, field_area);

    // Help overlay
    if app.show_help {
        draw_help_overlay(frame, size);
    }
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, help_area);

    let help_text = vec![
        "mentions: Key Bindings",
        "",
        "  Ctrl+Enter / F5    Send message",
        "  Tab                Switch pane (Message ↔ Log)",
        "  Ctrl+L             Clear message",
        "  Ctrl+Q             Quit",
        "  F1                 Toggle this help",
        "",
        "  Suggestion popup:",
        "    ↑/↓              Move highlight (wraps)",
        "    Enter / Tab      Insert highlighted item",
        "    Esc              Dismiss",
        "    Mouse            Hover to highlight, click to insert",
        "",
        "  Message log:",
        "    ↑/↓              Scroll",
        "",
        "  Press F1 to close",
    ];

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 46)))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, help_area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::controller::Controller;
    use crate::field::Field;
    use crate::item::sample_items;
    use crate::source::LocalDataSource;
    use ratatui::backend::TestBackend;

    fn app(text: &str) -> App {
        let widget = Controller::builder(Settings::default())
            .data_source(LocalDataSource::new(sample_items()))
            .build()
            .unwrap();
        let mut app = App::new(widget, "local: built-in");
        app.field = Field::new(text);
        app.widget.on_change(&app.field);
        app.widget.process_pending().unwrap();
        app
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_draw_records_field_area() {
        let mut app = app("");
        screen(&mut app);
        assert_eq!(app.field_area, Rect::new(0, 1, 60, FIELD_HEIGHT));
    }

    #[test]
    fn test_popup_drawn_below_field() {
        let mut app = app("@gr");
        let text = screen(&mut app);
        let popup_row = text.lines().nth(usize::from(1 + FIELD_HEIGHT + 1)).unwrap();
        assert!(popup_row.contains("grace"), "{text}");
    }

    #[test]
    fn test_help_overlay() {
        let mut app = app("");
        app.show_help = true;
        let text = screen(&mut app);
        assert!(text.contains("Key Bindings"));
    }
}
