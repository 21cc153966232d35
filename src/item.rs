//! Suggestion items.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A suggestion record.
///
/// `id` is required by the widget but optional here so that a data layer
/// returning an item without one can be reported instead of rejected at parse
/// time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier, also the implicit last keyword.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Extra strings the item can be matched by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Display fields consumed by templates (`name`, `image`, ...).
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Item {
    /// Create an item with just an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Builder-style keyword list.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style display field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The item's id, if it has one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Keywords followed by the id, without duplicates.
    pub fn effective_keywords(&self) -> impl Iterator<Item = &str> {
        let id = self
            .id()
            .filter(|id| !self.keywords.iter().any(|kw| kw == id));
        self.keywords.iter().map(String::as_str).chain(id)
    }

    /// Look up a field by key as display text.
    ///
    /// `id` and `keywords` resolve to the dedicated fields; strings render
    /// as-is and any other JSON value renders as JSON text.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "id" => self.id.clone(),
            "keywords" if !self.keywords.is_empty() => Some(self.keywords.join(",")),
            _ => self.fields.get(key).map(|value| match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            }),
        }
    }
}

/// Read a JSON array of items from disk.
pub fn load_items(path: &Path) -> Result<Vec<Item>> {
    let raw = std::fs::read_to_string(path)?;
    let items: Vec<Item> = serde_json::from_str(&raw)?;
    Ok(items)
}

/// Async variant of [`load_items`] for loaders running inside tokio tasks.
pub async fn load_items_async(path: &Path) -> Result<Vec<Item>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let items: Vec<Item> = serde_json::from_str(&raw)?;
    Ok(items)
}

/// Built-in people directory used when no items file is configured.
pub fn sample_items() -> Vec<Item> {
    const PEOPLE: &[(&str, &str, &[&str])] = &[
        ("alice", "Alice Liddell", &["wonderland"]),
        ("albert", "Albert Hofmann", &["chemist"]),
        ("bob", "Bob Kahn", &["tcp", "internet"]),
        ("bobby", "Bobby Fischer", &["chess"]),
        ("carol", "Carol Shaw", &["games", "atari"]),
        ("dennis", "Dennis Ritchie", &["c", "unix"]),
        ("edsger", "Edsger Dijkstra", &["goto", "paths"]),
        ("grace", "Grace Hopper", &["cobol", "admiral"]),
        ("ken", "Ken Thompson", &["unix", "go"]),
        ("linus", "Linus Torvalds", &["linux", "git"]),
        ("margaret", "Margaret Hamilton", &["apollo"]),
        ("radia", "Radia Perlman", &["spanning-tree"]),
    ];

    PEOPLE
        .iter()
        .map(|(id, name, keywords)| {
            Item::new(*id)
                .with_keywords(keywords.iter().copied())
                .with_field("name", *name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_effective_keywords_appends_id() {
        let item = Item::new("bob").with_keywords(["tcp"]);
        assert_eq!(item.effective_keywords().collect::<Vec<_>>(), vec!["tcp", "bob"]);
    }

    #[test]
    fn test_effective_keywords_dedups_id() {
        let item = Item::new("bob").with_keywords(["bob", "tcp"]);
        assert_eq!(item.effective_keywords().collect::<Vec<_>>(), vec!["bob", "tcp"]);
        // The item itself is untouched.
        assert_eq!(item.keywords, vec!["bob", "tcp"]);
    }

    #[test]
    fn test_get_fields() {
        let item = Item::new("ken")
            .with_field("name", "Ken Thompson")
            .with_field("age", 81);
        assert_eq!(item.get("id").as_deref(), Some("ken"));
        assert_eq!(item.get("name").as_deref(), Some("Ken Thompson"));
        assert_eq!(item.get("age").as_deref(), Some("81"));
        assert_eq!(item.get("missing"), None);
    }

    #[test]
    fn test_deserialize_without_id() {
        let items: Vec<Item> =
            serde_json::from_str(r#"[{"id": "a", "name": "A"}, {"name": "nameless"}]"#).unwrap();
        assert_eq!(items[0].id(), Some("a"));
        assert_eq!(items[1].id(), None);
        assert_eq!(items[1].get("name").as_deref(), Some("nameless"));
    }

    #[test]
    fn test_load_items_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.json");
        std::fs::write(&path, r#"[{"id": "grace", "keywords": ["cobol"]}]"#).unwrap();
        let items = load_items(&path).unwrap();
        assert_eq!(items, vec![Item::new("grace").with_keywords(["cobol"])]);
    }
}
