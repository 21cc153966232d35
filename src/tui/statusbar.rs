//! Status bar showing the data source and the widget state.

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the status bar.
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let left = format!(" {} | {} sent ", app.source_label, app.messages.len());
    let right = status_text(app);

    // Pad middle
    let total_width = area.width as usize;
    let padding = total_width.saturating_sub(left.chars().count() + right.chars().count());
    let status = format!("{}{}{}", left, " ".repeat(padding), right);

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(Color::White).bg(Color::Rgb(49, 50, 68)));
    frame.render_widget(paragraph, area);
}

/// Right-hand side: the active query and how many suggestions it has.
fn status_text(app: &App) -> String {
    let delimiter = &app.widget.settings().start_delimiter;
    match app.widget.last_query() {
        Some(query) if app.widget.is_open() => format!(
            " {delimiter}{query} | {} suggestions ",
            app.widget.suggestions().len()
        ),
        Some(query) => format!(" {delimiter}{query} "),
        None => String::new(),
    }
}
