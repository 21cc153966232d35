//! Cursor-relative query extraction.
//!
//! Scans backward from the cursor for the trigger character. All positions
//! are char offsets, never byte offsets.

use crate::error::{Error, Result};

/// Characters that end the backward scan without finding a query.
pub const STOP_CHARS: &[char] = &[' ', ',', '?', '!'];

/// Snapshot of the field relative to the active query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// Full field contents.
    pub text: String,
    /// Cursor position (chars).
    pub cursor_position: usize,
    /// Position of the delimiter when a query is active.
    pub query_start_position: usize,
    /// Always the cursor position.
    pub query_end_position: usize,
    /// `None` when no trigger is open at the cursor, `Some("")` for a bare trigger.
    pub query: Option<String>,
}

/// Validate that a configured delimiter is exactly one character.
pub fn parse_delimiter(delimiter: &str) -> Result<char> {
    let mut chars = delimiter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::config(format!(
            "only single-character delimiters are supported, not: {delimiter:?}"
        ))),
    }
}

/// Compute the query state for `text` with the cursor at `cursor`.
pub fn query_state(text: &str, cursor: usize, start_delimiter: &str) -> Result<QueryState> {
    let delimiter = parse_delimiter(start_delimiter)?;
    Ok(scan(text, cursor, delimiter))
}

fn scan(text: &str, cursor: usize, delimiter: char) -> QueryState {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());

    let mut start = None;
    for idx in (0..cursor).rev() {
        let ch = chars[idx];
        if STOP_CHARS.contains(&ch) {
            break;
        }
        if ch == delimiter {
            start = Some(idx);
            break;
        }
    }

    let query = start.map(|start| {
        chars[start + 1..cursor]
            .iter()
            .take_while(|ch| !ch.is_whitespace() && !matches!(ch, ',' | '!' | '?'))
            .collect::<String>()
    });

    QueryState {
        text: text.to_string(),
        cursor_position: cursor,
        query_start_position: start.unwrap_or(cursor),
        query_end_position: cursor,
        query,
    }
}

/// Produces the query state of a field.
pub trait QueryExtractor {
    /// Query state for the given contents and cursor.
    fn state(&self, text: &str, cursor: usize) -> QueryState;

    /// Just the query.
    fn query(&self, text: &str, cursor: usize) -> Option<String> {
        self.state(text, cursor).query
    }
}

/// The default extractor, bound to one validated delimiter.
#[derive(Debug, Clone, Copy)]
pub struct TextQueryExtractor {
    delimiter: char,
}

impl TextQueryExtractor {
    /// Fails with [`Error::InvalidConfiguration`] unless `delimiter` is one char.
    pub fn new(delimiter: &str) -> Result<Self> {
        Ok(Self {
            delimiter: parse_delimiter(delimiter)?,
        })
    }

    /// The trigger character.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }
}

impl QueryExtractor for TextQueryExtractor {
    fn state(&self, text: &str, cursor: usize) -> QueryState {
        scan(text, cursor, self.delimiter)
    }
}
