//! Suggestion popup state and rendering.
//!
//! The popup is either closed or open. While open it owns the navigation
//! keys (Up, Down, Enter, Tab, Escape) and mouse events over its rows; every
//! other input passes through to the field.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::item::Item;
use crate::template::Template;

/// Narrowest popup, borders included.
const MIN_WIDTH: u16 = 12;

/// What the renderer did with an input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Not for the popup; let the field have it.
    Ignored,
    /// Consumed by the popup.
    Handled,
    /// Consumed, and this item was confirmed.
    Selected(Item),
}

/// Owns the popup list: its items, selection and visibility.
pub trait SuggestionRenderer {
    /// Replace the candidate list and reset the selection.
    fn set(&mut self, items: Vec<Item>);
    /// Show the popup.
    fn open(&mut self);
    /// Hide the popup and reset the selection.
    fn close(&mut self);
    /// Whether the popup is shown.
    fn is_open(&self) -> bool;
    /// The candidate list.
    fn items(&self) -> &[Item];
    /// Route a key press; a no-op while closed.
    fn handle_key(&mut self, key: &KeyEvent) -> Outcome;
    /// Route a mouse event; a no-op while closed.
    fn handle_mouse(&mut self, mouse: &MouseEvent) -> Outcome;
    /// Draw the popup directly below `field_area`.
    fn draw(&mut self, frame: &mut Frame, field_area: Rect);
}

/// Popup list rendered with a [`Template`].
#[derive(Debug, Clone)]
pub struct PopupRenderer {
    template: Template,
    items: Vec<Item>,
    current_index: usize,
    open: bool,
    /// Rows shown at once; `0` means no limit.
    max_visible: usize,
    /// First visible item.
    scroll: usize,
    /// Where the popup was last drawn, for mouse hit testing.
    area: Option<Rect>,
}

impl PopupRenderer {
    /// Closed popup with no items.
    pub fn new(template: Template, max_visible: usize) -> Self {
        Self {
            template,
            items: Vec::new(),
            current_index: 0,
            open: false,
            max_visible,
            scroll: 0,
            area: None,
        }
    }

    /// Currently selected position.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// First visible position.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// The highlighted item, if any.
    pub fn current_item(&self) -> Option<&Item> {
        self.items.get(self.current_index)
    }

    /// Move the highlight to `index` without closing.
    pub fn hover(&mut self, index: usize) {
        if index < self.items.len() {
            self.current_index = index;
        }
    }

    /// Confirm `index` directly.
    pub fn click(&mut self, index: usize) -> Outcome {
        self.hover(index);
        self.select_current()
    }

    fn move_down(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.current_index = (self.current_index + 1) % self.items.len();
        self.scroll_into_view();
    }

    fn move_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.current_index = self
            .current_index
            .checked_sub(1)
            .unwrap_or(self.items.len() - 1);
        self.scroll_into_view();
    }

    fn select_current(&mut self) -> Outcome {
        let outcome = match self.current_item() {
            Some(item) => Outcome::Selected(item.clone()),
            None => Outcome::Handled,
        };
        self.close();
        outcome
    }

    fn scroll_into_view(&mut self) {
        if self.max_visible == 0 {
            return;
        }
        if self.current_index < self.scroll {
            self.scroll = self.current_index;
        } else if self.current_index >= self.scroll + self.max_visible {
            self.scroll = self.current_index + 1 - self.max_visible;
        }
    }

    fn visible_rows(&self) -> usize {
        match self.max_visible {
            0 => self.items.len(),
            max => self.items.len().min(max),
        }
    }

    /// Item under a terminal cell, if the popup covers it.
    fn item_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.area?;
        let inside_x = column > area.x && column < area.right().saturating_sub(1);
        let inside_y = row > area.y && row < area.bottom().saturating_sub(1);
        if !inside_x || !inside_y {
            return None;
        }
        let index = self.scroll + usize::from(row - area.y - 1);
        (index < self.items.len()).then_some(index)
    }
}

impl SuggestionRenderer for PopupRenderer {
    fn set(&mut self, items: Vec<Item>) {
        self.items = items;
        self.current_index = 0;
        self.scroll = 0;
    }

    fn open(&mut self) {
        self.open = true;
    }

    fn close(&mut self) {
        self.open = false;
        self.current_index = 0;
        self.scroll = 0;
        self.area = None;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn items(&self) -> &[Item] {
        &self.items
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Outcome {
        if !self.open {
            return Outcome::Ignored;
        }
        match key.code {
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Esc => self.close(),
            KeyCode::Enter | KeyCode::Tab => return self.select_current(),
            _ => return Outcome::Ignored,
        }
        Outcome::Handled
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> Outcome {
        if !self.open {
            return Outcome::Ignored;
        }
        let Some(index) = self.item_at(mouse.column, mouse.row) else {
            return Outcome::Ignored;
        };
        match mouse.kind {
            MouseEventKind::Moved => {
                self.hover(index);
                Outcome::Handled
            }
            MouseEventKind::Down(MouseButton::Left) => self.click(index),
            _ => Outcome::Handled,
        }
    }

    fn draw(&mut self, frame: &mut Frame, field_area: Rect) {
        let screen = frame.area();
        let rows = self.visible_rows();
        if !self.open || rows == 0 {
            self.area = None;
            return;
        }

        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(rows)
            .map(|(i, item)| {
                let line = self.template.render(item);
                if i == self.current_index {
                    line.style(Style::default().fg(Color::Black).bg(Color::Cyan))
                } else {
                    line.style(Style::default().fg(Color::White))
                }
            })
            .collect();

        let content_width = lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref().width())
                    .sum::<usize>()
            })
            .max()
            .unwrap_or(0);
        let width = (u16::try_from(content_width).unwrap_or(u16::MAX))
            .saturating_add(2)
            .max(MIN_WIDTH)
            .min(screen.width.saturating_sub(field_area.x));
        let height = (rows as u16 + 2).min(screen.height);

        let x = field_area.x;
        let y = field_area
            .bottom()
            .min(screen.height.saturating_sub(height));
        let area = Rect::new(x, y, width, height);

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .style(Style::default().bg(Color::Rgb(40, 40, 60)));
        if rows < self.items.len() {
            block = block.title(format!(" {}/{} ", self.current_index + 1, self.items.len()));
        }

        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
        self.area = Some(area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn popup(ids: &[&str], max_visible: usize) -> PopupRenderer {
        let mut popup = PopupRenderer::new(Template::preset("basic").unwrap(), max_visible);
        popup.set(ids.iter().map(|id| Item::new(*id)).collect());
        popup
    }

    fn screen_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn test_starts_closed_and_ignores_keys() {
        let mut popup = popup(&["a", "b"], 0);
        assert!(!popup.is_open());
        assert_eq!(popup.handle_key(&key(KeyCode::Down)), Outcome::Ignored);
        assert_eq!(popup.handle_key(&key(KeyCode::Enter)), Outcome::Ignored);
        assert_eq!(popup.current_index(), 0);
    }

    #[test]
    fn test_down_wraps_around() {
        let mut popup = popup(&["a", "b", "c"], 0);
        popup.open();
        for _ in 0..3 {
            assert_eq!(popup.handle_key(&key(KeyCode::Down)), Outcome::Handled);
        }
        assert_eq!(popup.current_index(), 0);
    }

    #[test]
    fn test_up_wraps_to_last() {
        let mut popup = popup(&["a", "b", "c"], 0);
        popup.open();
        popup.handle_key(&key(KeyCode::Up));
        assert_eq!(popup.current_index(), 2);
        popup.handle_key(&key(KeyCode::Up));
        assert_eq!(popup.current_index(), 1);
    }

    #[test]
    fn test_enter_and_tab_select_and_close() {
        for code in [KeyCode::Enter, KeyCode::Tab] {
            let mut popup = popup(&["a", "b"], 0);
            popup.open();
            popup.handle_key(&key(KeyCode::Down));
            assert_eq!(popup.handle_key(&key(code)), Outcome::Selected(Item::new("b")));
            assert!(!popup.is_open());
            assert_eq!(popup.current_index(), 0);
        }
    }

    #[test]
    fn test_escape_closes_without_selecting() {
        let mut popup = popup(&["a", "b"], 0);
        popup.open();
        popup.handle_key(&key(KeyCode::Down));
        assert_eq!(popup.handle_key(&key(KeyCode::Esc)), Outcome::Handled);
        assert!(!popup.is_open());
        assert_eq!(popup.current_index(), 0);
    }

    #[test]
    fn test_other_keys_pass_through() {
        let mut popup = popup(&["a"], 0);
        popup.open();
        assert_eq!(popup.handle_key(&key(KeyCode::Char('x'))), Outcome::Ignored);
        assert_eq!(popup.handle_key(&key(KeyCode::Left)), Outcome::Ignored);
        assert!(popup.is_open());
    }

    #[test]
    fn test_select_with_no_items() {
        let mut popup = popup(&[], 0);
        popup.open();
        assert_eq!(popup.handle_key(&key(KeyCode::Down)), Outcome::Handled);
        assert_eq!(popup.handle_key(&key(KeyCode::Enter)), Outcome::Handled);
        assert!(!popup.is_open());
    }

    #[test]
    fn test_set_resets_selection_but_not_visibility() {
        let mut popup = popup(&["a", "b"], 0);
        popup.open();
        popup.handle_key(&key(KeyCode::Down));
        popup.set(vec![Item::new("c")]);
        assert_eq!(popup.current_index(), 0);
        assert!(popup.is_open());
    }

    #[test]
    fn test_scrolls_active_item_into_view() {
        let mut popup = popup(&["a", "b", "c", "d", "e"], 2);
        popup.open();
        popup.handle_key(&key(KeyCode::Down));
        assert_eq!(popup.scroll(), 0);
        popup.handle_key(&key(KeyCode::Down));
        assert_eq!((popup.current_index(), popup.scroll()), (2, 1));
        popup.handle_key(&key(KeyCode::Up));
        popup.handle_key(&key(KeyCode::Up));
        assert_eq!((popup.current_index(), popup.scroll()), (0, 0));
        popup.handle_key(&key(KeyCode::Up));
        assert_eq!((popup.current_index(), popup.scroll()), (4, 3));
    }

    #[test]
    fn test_unbounded_never_scrolls() {
        let mut popup = popup(&["a", "b", "c"], 0);
        popup.open();
        popup.handle_key(&key(KeyCode::Up));
        assert_eq!(popup.scroll(), 0);
    }

    #[test]
    fn test_draw_below_field_and_mouse() {
        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        let mut popup = popup(&["alice", "albert"], 0);
        popup.open();
        let field_area = Rect::new(2, 0, 20, 3);
        terminal
            .draw(|frame| popup.draw(frame, field_area))
            .unwrap();

        let rows = screen_rows(&terminal);
        assert!(rows[4].contains("alice"));
        assert!(rows[5].contains("albert"));
        assert!(rows[2].trim().is_empty());

        let hover = MouseEvent {
            kind: MouseEventKind::Moved,
            column: 4,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(popup.handle_mouse(&hover), Outcome::Handled);
        assert_eq!(popup.current_index(), 1);
        assert!(popup.is_open());

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(popup.handle_mouse(&click), Outcome::Selected(Item::new("alice")));
        assert!(!popup.is_open());
    }

    #[test]
    fn test_mouse_outside_is_ignored() {
        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        let mut popup = popup(&["alice"], 0);
        popup.open();
        terminal
            .draw(|frame| popup.draw(frame, Rect::new(0, 0, 20, 3)))
            .unwrap();
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 25,
            row: 9,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(popup.handle_mouse(&click), Outcome::Ignored);
        assert!(popup.is_open());
    }

    #[test]
    fn test_closed_popup_draws_nothing() {
        let mut terminal = Terminal::new(TestBackend::new(20, 6)).unwrap();
        let mut popup = popup(&["alice"], 0);
        terminal
            .draw(|frame| popup.draw(frame, Rect::new(0, 0, 20, 2)))
            .unwrap();
        assert!(screen_rows(&terminal).iter().all(|row| row.trim().is_empty()));
    }
}
