//! Configuration loading.
//!
//! Settings come from an optional TOML file with `[widget]`, `[source]` and
//! `[log]` tables. Missing keys fall back to the documented defaults and
//! command-line flags are applied on top by the caller.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::extract::parse_delimiter;

/// Default trigger character.
pub const DEFAULT_DELIMITER: &str = "@";

/// Default delay before a blur closes the popup, in milliseconds.
pub const DEFAULT_BLUR_GRACE_MS: u64 = 1000;

/// Default number of popup rows before the list scrolls.
pub const DEFAULT_MAX_VISIBLE: usize = 8;

/// Widget options, resolved once at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Single character marking where a query starts.
    pub start_delimiter: String,
    /// Item field inserted into the text on selection.
    pub insert_key: String,
    /// Whether a bare delimiter (e.g. `@`) already asks for suggestions.
    pub allow_empty_queries: bool,
    /// Close the popup when the only suggestion's id equals the query.
    pub auto_close_on_single_exact_match: bool,
    /// Debounce before the data source is asked, in milliseconds.
    #[serde(alias = "bufferring_interval")]
    pub buffering_interval_ms: u64,
    /// Delay between a blur and closing the popup, in milliseconds.
    pub blur_grace_ms: u64,
    /// Popup viewport height in rows; `0` shows every item.
    pub max_visible: usize,
    /// Template preset: `basic`, `tags` or `users`.
    pub template: String,
    /// Custom template with `%field%` placeholders; wins over `template`.
    pub template_markup: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_delimiter: DEFAULT_DELIMITER.to_string(),
            insert_key: "id".to_string(),
            allow_empty_queries: false,
            auto_close_on_single_exact_match: true,
            buffering_interval_ms: 0,
            blur_grace_ms: DEFAULT_BLUR_GRACE_MS,
            max_visible: DEFAULT_MAX_VISIBLE,
            template: "basic".to_string(),
            template_markup: None,
        }
    }
}

impl Settings {
    /// Check the values that cannot be represented by the types alone.
    pub fn validate(&self) -> Result<()> {
        parse_delimiter(&self.start_delimiter)?;
        if self.insert_key.is_empty() {
            return Err(Error::config("insert_key must not be empty"));
        }
        Ok(())
    }
}

/// Which data source variant the application builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Items loaded up front and filtered in memory.
    #[default]
    Local,
    /// Items loaded on first use.
    Lazy,
    /// Loader asked once per distinct query.
    PerQuery,
}

impl std::str::FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "lazy" => Ok(Self::Lazy),
            "per-query" | "per_query" | "perquery" => Ok(Self::PerQuery),
            other => Err(Error::config(format!("unknown data source kind: {other}"))),
        }
    }
}

/// Where suggestions come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Data source variant.
    pub kind: SourceKind,
    /// JSON file with an array of items; the built-in list when absent.
    pub path: Option<PathBuf>,
    /// Maximum number of suggestions (local and lazy sources).
    pub limit: Option<usize>,
    /// Artificial loader latency in milliseconds (lazy and per-query sources).
    pub latency_ms: u64,
}

/// Logging options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Whether logging is enabled.
    pub enabled: bool,
    /// Level filter (trace, debug, info, warn, error); `RUST_LOG` wins.
    pub level: String,
    /// Directory for the TUI log file.
    pub directory: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Widget settings.
    pub widget: Settings,
    /// Data source selection.
    pub source: SourceConfig,
    /// Logging.
    pub log: LogSettings,
}

impl Config {
    /// Parse a TOML document.
    pub fn parse(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw)?;
        config.widget.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from the default location if it exists, or defaults.
    ///
    /// An explicit path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };
        let raw = std::fs::read_to_string(&path)?;
        Self::parse(&raw)
    }
}

/// `$CONFIG_DIR/mentions/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mentions").join("config.toml"))
}
