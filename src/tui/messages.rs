//! Sent-messages log with scrolling.

use crate::app::{App, FocusPane};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

/// Draw the message log.
pub fn draw(frame: &mut Frame, app: &mut App, area: Rect) {
    app.messages_area = area;
    let focused = app.focus() == FocusPane::Messages;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = if app.messages.is_empty() {
        " Messages ".to_string()
    } else {
        format!(" Messages: {} ", app.messages.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style);

    if app.messages.is_empty() {
        let paragraph = Paragraph::new("Nothing sent yet. Press Ctrl+Enter to send.")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
    }

    let delimiter = app.widget.settings().start_delimiter.clone();
    let items: Vec<ListItem> = app
        .messages
        .iter()
        .enumerate()
        .skip(app.message_scroll)
        .map(|(i, text)| {
            let mut lines = Vec::new();
            for (row, line) in text.split('\n').enumerate() {
                let prefix = if row == 0 {
                    Span::styled(format!("{:>3} ", i + 1), Style::default().fg(Color::DarkGray))
                } else {
                    Span::raw("    ")
                };
                let mut spans = vec![prefix];
                spans.extend(highlight_mentions(line, &delimiter));
                lines.push(Line::from(spans));
            }
            ListItem::new(lines)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Split a line into plain words and highlighted `@mentions`.
fn highlight_mentions(line: &str, delimiter: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, word) in line.split(' ').enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        if word.len() > delimiter.len() && word.starts_with(delimiter) {
            spans.push(Span::styled(
                word.to_string(),
                Style::default().fg(Color::Cyan).bold(),
            ));
        } else {
            spans.push(Span::raw(word.to_string()));
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_mentions() {
        let spans = highlight_mentions("ping @bob now", "@");
        let styled: Vec<&str> = spans
            .iter()
            .filter(|s| s.style.fg == Some(Color::Cyan))
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(styled, vec!["@bob"]);
    }

    #[test]
    fn test_bare_delimiter_is_plain() {
        let spans = highlight_mentions("@ alone", "@");
        assert!(spans.iter().all(|s| s.style.fg.is_none()));
    }
}
