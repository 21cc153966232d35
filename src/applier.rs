//! Splicing a chosen suggestion back into the field.

use tracing::{debug, warn};

use crate::extract::{QueryExtractor, TextQueryExtractor};
use crate::field::Field;
use crate::item::Item;

/// Applies a confirmed suggestion to the field.
pub trait SuggestionApplier {
    /// Insert `item` at the active query.
    fn apply(&self, field: &mut Field, item: &Item);
}

/// Replaces `delimiter + query` with `delimiter + item[insert_key]`.
#[derive(Debug, Clone)]
pub struct TextFieldApplier {
    extractor: TextQueryExtractor,
    insert_key: String,
}

impl TextFieldApplier {
    /// Bind to an extractor (for its delimiter) and the inserted field.
    pub fn new(extractor: TextQueryExtractor, insert_key: impl Into<String>) -> Self {
        Self {
            extractor,
            insert_key: insert_key.into(),
        }
    }

    fn value_of(&self, item: &Item) -> String {
        match item.get(&self.insert_key) {
            Some(value) => value,
            None => {
                warn!(key = %self.insert_key, id = ?item.id(), "item lacks insert key, using id");
                item.id().unwrap_or_default().to_string()
            }
        }
    }
}

impl SuggestionApplier for TextFieldApplier {
    fn apply(&self, field: &mut Field, item: &Item) {
        // The text may have moved on since the suggestions were computed.
        let state = self.extractor.state(&field.text(), field.cursor());
        if state.query.is_none() {
            debug!("no active query at cursor, nothing to apply");
            field.focus();
            return;
        }

        let chars: Vec<char> = state.text.chars().collect();
        let before: String = chars[..state.query_start_position].iter().collect();
        let after: String = chars[state.query_end_position..].iter().collect();
        let inserted = format!("{}{}", self.extractor.delimiter(), self.value_of(item));
        let cursor = before.chars().count() + inserted.chars().count();

        field.set_value(&format!("{before}{inserted}{after}"), cursor);
        field.focus();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn applier(delimiter: &str, key: &str) -> TextFieldApplier {
        TextFieldApplier::new(TextQueryExtractor::new(delimiter).unwrap(), key)
    }

    #[test]
    fn test_apply_at_end() {
        let mut field = Field::new("hi @bo");
        applier("@", "id").apply(&mut field, &Item::new("bob"));
        assert_eq!(field.text(), "hi @bob");
        assert_eq!(field.cursor(), 7);
    }

    #[test]
    fn test_apply_keeps_text_after_cursor() {
        let mut field = Field::new("@gr and more");
        field.set_cursor(3);
        applier("@", "id").apply(&mut field, &Item::new("grace"));
        assert_eq!(field.text(), "@grace and more");
        assert_eq!(field.cursor(), 6);
    }

    #[test]
    fn test_apply_uses_insert_key() {
        let mut field = Field::new("#ru");
        let item = Item::new("1").with_field("slug", "rust");
        applier("#", "slug").apply(&mut field, &item);
        assert_eq!(field.text(), "#rust");
    }

    #[test]
    fn test_missing_insert_key_falls_back_to_id() {
        let mut field = Field::new("@k");
        applier("@", "handle").apply(&mut field, &Item::new("ken"));
        assert_eq!(field.text(), "@ken");
    }

    #[test]
    fn test_no_query_leaves_text() {
        let mut field = Field::new("hello there");
        field.blur();
        applier("@", "id").apply(&mut field, &Item::new("bob"));
        assert_eq!(field.text(), "hello there");
        assert!(field.is_focused());
    }

    #[test]
    fn test_apply_restores_focus() {
        let mut field = Field::new("@a");
        field.blur();
        applier("@", "id").apply(&mut field, &Item::new("alice"));
        assert!(field.is_focused());
    }

    #[test]
    fn test_apply_second_line() {
        let mut field = Field::new("first\nping @li");
        applier("@", "id").apply(&mut field, &Item::new("linus"));
        assert_eq!(field.text(), "first\nping @linus");
        assert_eq!(field.widget().cursor(), (1, 11));
    }
}
