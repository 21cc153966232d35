//! Suggestion templates.

use std::fmt;
use std::sync::Arc;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::item::Item;

/// Custom line renderer.
pub type RenderFn = Arc<dyn Fn(&Item) -> Line<'static> + Send + Sync>;

/// How each suggestion is turned into a popup line.
#[derive(Clone)]
pub enum Template {
    /// Text with `%field%` placeholders.
    Markup(String),
    /// Bold name followed by a dimmed `@id`.
    Users,
    /// Caller-supplied renderer.
    Custom(RenderFn),
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markup(markup) => f.debug_tuple("Markup").field(markup).finish(),
            Self::Users => f.write_str("Users"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Template {
    /// Resolve a preset name.
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "basic" => Ok(Self::Markup("%id%".to_string())),
            "tags" => Ok(Self::Markup("#%id%".to_string())),
            "users" => Ok(Self::Users),
            other => Err(Error::config(format!("unknown suggestions template: {other}"))),
        }
    }

    /// Markup from settings wins over the preset name.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        match &settings.template_markup {
            Some(markup) => Ok(Self::Markup(markup.clone())),
            None => Self::preset(&settings.template),
        }
    }

    /// Wrap a closure.
    pub fn custom<F>(render: F) -> Self
    where
        F: Fn(&Item) -> Line<'static> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(render))
    }

    /// Render one item.
    pub fn render(&self, item: &Item) -> Line<'static> {
        match self {
            Self::Markup(markup) => Line::from(substitute(markup, item)),
            Self::Users => {
                let name = item.get("name").unwrap_or_default();
                let id = item.get("id").unwrap_or_default();
                Line::from(vec![
                    Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(" "),
                    Span::styled(format!("@{id}"), Style::default().add_modifier(Modifier::DIM)),
                ])
            }
            Self::Custom(render) => render(item),
        }
    }
}

/// Replace each `%key%` with the item's field; unknown keys render empty.
///
/// A lone `%` without a closing partner is kept literally.
pub fn substitute(markup: &str, item: &Item) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(open) = rest.find('%') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('%') {
            Some(close) if close > 0 => {
                out.push_str(&item.get(&after[..close]).unwrap_or_default());
                rest = &after[close + 1..];
            }
            Some(_) => {
                // `%%` is a literal percent sign.
                out.push('%');
                rest = &after[1..];
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
