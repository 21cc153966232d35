//! Application state for the demo composer.

use ratatui::layout::Rect;

use crate::controller::Controller;
use crate::field::Field;

/// Which pane currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    /// The text field the mention widget is attached to.
    Field,
    /// The sent-messages log.
    Messages,
}

/// The main application state.
pub struct App {
    /// The message being composed.
    pub field: Field,
    /// Mention widget attached to `field`.
    pub widget: Controller,
    /// Messages sent so far, oldest first.
    pub messages: Vec<String>,
    /// Scroll offset in the message log (rows).
    pub message_scroll: usize,
    /// Data source description for the status bar.
    pub source_label: String,
    /// Show help overlay.
    pub show_help: bool,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Where the field was last drawn; the popup hangs below it.
    pub field_area: Rect,
    /// Where the message log was last drawn.
    pub messages_area: Rect,
}

impl App {
    /// Create a new App around a registered widget.
    pub fn new(widget: Controller, source_label: impl Into<String>) -> Self {
        Self {
            field: Field::default(),
            widget,
            messages: Vec::new(),
            message_scroll: 0,
            source_label: source_label.into(),
            show_help: false,
            should_quit: false,
            field_area: Rect::default(),
            messages_area: Rect::default(),
        }
    }

    /// The field owns focus unless it was blurred.
    pub fn focus(&self) -> FocusPane {
        if self.field.is_focused() {
            FocusPane::Field
        } else {
            FocusPane::Messages
        }
    }

    /// Give focus back to the field.
    pub fn focus_field(&mut self) {
        self.field.focus();
    }

    /// Move focus away from the field and let the widget know.
    pub fn blur_field(&mut self) {
        if self.field.is_focused() {
            self.field.blur();
            self.widget.on_blur();
        }
    }

    /// Cycle focus to the next pane.
    pub fn cycle_focus(&mut self) {
        match self.focus() {
            FocusPane::Field => self.blur_field(),
            FocusPane::Messages => self.focus_field(),
        }
    }

    /// Append the field text to the log and start a new message.
    pub fn send(&mut self) {
        let text = self.field.text();
        if text.trim().is_empty() {
            return;
        }
        tracing::info!(chars = text.chars().count(), "message sent");
        self.messages.push(text);
        self.message_scroll = self.messages.len().saturating_sub(1);
        self.clear_field();
    }

    /// Empty the field; the widget sees the change like any other edit.
    pub fn clear_field(&mut self) {
        self.field.clear();
        self.widget.on_change(&self.field);
    }

    /// Scroll the log down.
    pub fn scroll_messages_down(&mut self) {
        if self.message_scroll + 1 < self.messages.len() {
            self.message_scroll += 1;
        }
    }

    /// Scroll the log up.
    pub fn scroll_messages_up(&mut self) {
        self.message_scroll = self.message_scroll.saturating_sub(1);
    }
}
