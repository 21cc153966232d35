//! The text field the widget is attached to.

use crossterm::event::KeyEvent;
use ratatui::style::{Color, Style};
use tui_textarea::{CursorMove, TextArea};

/// A multi-line text field with a flat char cursor and a focus flag.
pub struct Field {
    area: TextArea<'static>,
    focused: bool,
}

impl Default for Field {
    fn default() -> Self {
        Self::new("")
    }
}

impl Field {
    /// Create a focused field holding `text` with the cursor at its end.
    pub fn new(text: &str) -> Self {
        let mut field = Self {
            area: styled(TextArea::default()),
            focused: true,
        };
        let end = text.chars().count();
        field.set_value(text, end);
        field
    }

    /// Field contents, lines joined with `\n`.
    pub fn text(&self) -> String {
        self.area.lines().join("\n")
    }

    /// Cursor as a char offset into [`Field::text`].
    pub fn cursor(&self) -> usize {
        let (row, col) = self.area.cursor();
        self.area.lines()[..row]
            .iter()
            .map(|line| line.chars().count() + 1)
            .sum::<usize>()
            + col
    }

    /// Replace the contents and put the cursor at char offset `cursor`.
    pub fn set_value(&mut self, text: &str, cursor: usize) {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let (row, col) = row_col(&lines, cursor);
        self.area = styled(TextArea::new(lines));
        self.area.move_cursor(CursorMove::Jump(
            u16::try_from(row).unwrap_or(u16::MAX),
            u16::try_from(col).unwrap_or(u16::MAX),
        ));
    }

    /// Move the cursor without touching the text.
    pub fn set_cursor(&mut self, cursor: usize) {
        let (row, col) = row_col(self.area.lines(), cursor);
        self.area.move_cursor(CursorMove::Jump(
            u16::try_from(row).unwrap_or(u16::MAX),
            u16::try_from(col).unwrap_or(u16::MAX),
        ));
    }

    /// Empty the field.
    pub fn clear(&mut self) {
        self.set_value("", 0);
    }

    /// Feed a key to the text area. Returns whether the text changed.
    pub fn input(&mut self, key: KeyEvent) -> bool {
        self.area.input(key)
    }

    /// Give the field keyboard focus.
    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Take keyboard focus away.
    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Whether the field has keyboard focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The underlying widget, for drawing.
    pub fn widget(&self) -> &TextArea<'static> {
        &self.area
    }
}

fn styled(mut area: TextArea<'static>) -> TextArea<'static> {
    area.set_cursor_line_style(Style::default());
    area.set_line_number_style(Style::default().fg(Color::DarkGray));
    area
}

/// Convert a flat char offset into (row, col), clamping past the end.
fn row_col(lines: &[String], cursor: usize) -> (usize, usize) {
    let mut remaining = cursor;
    for (row, line) in lines.iter().enumerate() {
        let len = line.chars().count();
        if remaining <= len {
            return (row, remaining);
        }
        remaining -= len + 1;
    }
    let last = lines.len().saturating_sub(1);
    (last, lines.last().map_or(0, |l| l.chars().count()))
}
