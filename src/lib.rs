//! # mentions
//!
//! An `@`-mention autocomplete widget for terminal text fields. Type the
//! trigger character followed by a query and the widget asks a pluggable
//! [`DataSource`](source::DataSource) for matches, shows them in a popup under
//! the field, and splices the chosen one back into the text.
//!
//! ```ignore
//! let mut widget = Controller::builder(Settings::default())
//!     .data_source(LocalDataSource::new(item::sample_items()))
//!     .build()?;
//! widget.on_change(&field);
//! widget.process_pending()?;
//! ```

pub mod app;
pub mod applier;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod field;
pub mod item;
pub mod logging;
pub mod matcher;
pub mod source;
pub mod template;
pub mod tui;

pub use config::Settings;
pub use controller::{Controller, ControllerBuilder, WidgetEvent};
pub use error::{Error, Result};
pub use field::Field;
pub use item::Item;

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, SourceKind};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "mentions",
    version,
    about = "@-mention autocomplete for terminal text fields"
)]
pub struct Args {
    /// Configuration file (default: $CONFIG_DIR/mentions/config.toml)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Data source kind: local, lazy, per-query
    #[arg(short = 's', long = "source")]
    pub source: Option<String>,

    /// JSON file with an array of items
    #[arg(short = 'i', long = "items")]
    pub items: Option<PathBuf>,

    /// Trigger character
    #[arg(short = 'd', long = "delimiter")]
    pub delimiter: Option<String>,

    /// Template preset (basic, tags, users) or markup containing `%`
    #[arg(short = 't', long = "template")]
    pub template: Option<String>,

    /// Non-interactive CLI mode
    #[arg(long = "cli")]
    pub cli_mode: bool,

    /// Complete this text instead of reading stdin
    #[arg(long = "text")]
    pub text: Option<String>,

    /// Cursor position (chars) within each input; defaults to the end
    #[arg(long = "cursor")]
    pub cursor: Option<usize>,

    /// Apply the N-th suggestion (1-based) and print the result
    #[arg(long = "select")]
    pub select: Option<usize>,

    /// Output format: table, json
    #[arg(long = "format", default_value = "table")]
    pub format: String,
}

impl Args {
    /// Load the configuration file and apply command-line overrides.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply(&mut config)?;
        Ok(config)
    }

    /// Apply command-line overrides on top of `config`.
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(kind) = &self.source {
            config.source.kind = kind.parse::<SourceKind>()?;
        }
        if let Some(path) = &self.items {
            config.source.path = Some(path.clone());
        }
        if let Some(delimiter) = &self.delimiter {
            config.widget.start_delimiter = delimiter.clone();
        }
        if let Some(template) = &self.template {
            if template.contains('%') {
                config.widget.template_markup = Some(template.clone());
            } else {
                config.widget.template = template.clone();
                config.widget.template_markup = None;
            }
        }
        config.widget.validate()
    }

    /// Whether to run without the TUI.
    pub fn wants_cli(&self, stdin_piped: bool) -> bool {
        self.cli_mode || stdin_piped || self.text.is_some()
    }
}
