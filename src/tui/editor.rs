//! Message field pane.

use crate::app::{App, FocusPane};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders};

/// Draw the field pane and remember where it went.
pub fn draw(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.focus() == FocusPane::Field;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let delimiter = &app.widget.settings().start_delimiter;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Message ({delimiter} to mention) "))
        .border_style(border_style);

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(app.field.widget(), inner);
    app.field_area = area;
}
