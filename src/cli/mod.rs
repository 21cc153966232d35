//! Non-interactive CLI mode for scripting and piped input.
//!
//! Each input line is treated as field text with the cursor at its end (or
//! at `--cursor`). The active query is extracted, the configured data source
//! is asked for suggestions, and the answer is printed as a table or as one
//! JSON object per line.

use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::Args;
use crate::applier::{SuggestionApplier, TextFieldApplier};
use crate::config::{Config, Settings};
use crate::error::{Error, Result};
use crate::extract::{QueryExtractor, TextQueryExtractor};
use crate::field::Field;
use crate::item::Item;
use crate::source::{self, DataSource};
use crate::template::Template;

/// Upper bound on waiting for a data source, on top of its configured latency.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Aligned text table.
    Table,
    /// One JSON object per input line.
    Json,
}

impl std::str::FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(Error::config(format!("unknown output format: {other}"))),
        }
    }
}

/// What one input line resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    /// Input text.
    pub text: String,
    /// Cursor used, as a char offset.
    pub cursor: usize,
    /// Query at the cursor, without the delimiter.
    pub query: Option<String>,
    /// Suggestions from the data source.
    pub suggestions: Vec<Item>,
    /// Text after inserting the `--select`ed suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<String>,
}

/// Everything needed to answer lines.
pub struct Completer {
    settings: Settings,
    extractor: TextQueryExtractor,
    source: Box<dyn DataSource>,
    template: Template,
    timeout: Duration,
}

impl Completer {
    /// Build from a loaded configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_source(config, source::from_config(&config.source)?)
    }

    /// Build around an explicit data source.
    pub fn with_source(config: &Config, source: Box<dyn DataSource>) -> Result<Self> {
        config.widget.validate()?;
        Ok(Self {
            settings: config.widget.clone(),
            extractor: TextQueryExtractor::new(&config.widget.start_delimiter)?,
            source,
            template: Template::from_settings(&config.widget)?,
            timeout: LOOKUP_TIMEOUT + Duration::from_millis(config.source.latency_ms),
        })
    }

    /// Resolve one line. `select` is 1-based.
    pub async fn complete(
        &self,
        text: &str,
        cursor: Option<usize>,
        select: Option<usize>,
    ) -> Result<Completion> {
        let cursor = cursor
            .unwrap_or_else(|| text.chars().count())
            .min(text.chars().count());
        let query = self.extractor.query(text, cursor);

        let suggestions = match &query {
            Some(q) if !q.is_empty() || self.settings.allow_empty_queries => {
                self.lookup(q).await?
            }
            _ => Vec::new(),
        };

        let applied = match select {
            Some(n) => match n.checked_sub(1).and_then(|i| suggestions.get(i)) {
                Some(item) => {
                    let mut field = Field::new(text);
                    field.set_cursor(cursor);
                    TextFieldApplier::new(self.extractor, &self.settings.insert_key)
                        .apply(&mut field, item);
                    Some(field.text())
                }
                None => {
                    warn!(select = n, count = suggestions.len(), "no such suggestion");
                    None
                }
            },
            None => None,
        };

        Ok(Completion {
            text: text.to_string(),
            cursor,
            query,
            suggestions,
            applied,
        })
    }

    async fn lookup(&self, query: &str) -> Result<Vec<Item>> {
        let (tx, rx) = oneshot::channel();
        self.source.suggest(
            query,
            Box::new(move |items: Vec<Item>| {
                let _ = tx.send(items);
            }),
        );
        let items = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(items)) => items,
            Ok(Err(_)) => {
                debug!(query, "data source dropped the request");
                Vec::new()
            }
            Err(_) => {
                warn!(query, "data source timed out");
                Vec::new()
            }
        };
        crate::controller::validate_items(&items)?;
        Ok(items)
    }

    /// Plain-text rendering of an item through the configured template.
    pub fn label(&self, item: &Item) -> String {
        self.template
            .render(item)
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect()
    }
}

/// Run in CLI mode.
pub async fn run(args: &Args, config: &Config) -> Result<()> {
    let format: Format = args.format.parse()?;
    let completer = Completer::new(config)?;
    let mut stdout = io::BufWriter::new(io::stdout());

    if let Some(text) = &args.text {
        let completion = completer.complete(text, args.cursor, args.select).await?;
        print_completion(&mut stdout, &completer, &completion, format)?;
        stdout.flush()?;
        return Ok(());
    }

    if io::stdin().is_terminal() {
        return run_interactive(&completer, args, format).await;
    }

    // Piped stdin: one completion per line
    let lines: Vec<String> = io::stdin().lock().lines().collect::<io::Result<_>>()?;
    for line in lines {
        let completion = completer.complete(&line, args.cursor, args.select).await?;
        print_completion(&mut stdout, &completer, &completion, format)?;
    }
    stdout.flush()?;
    Ok(())
}

/// Line-by-line REPL.
async fn run_interactive(completer: &Completer, args: &Args, format: Format) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("mentions> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let line = line.trim_end_matches(['\r', '\n']);
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        let completion = completer.complete(line, None, args.select).await?;
        print_completion(&mut stdout, completer, &completion, format)?;
    }

    Ok(())
}

/// Write one completion in `format`.
pub fn print_completion(
    writer: &mut dyn Write,
    completer: &Completer,
    completion: &Completion,
    format: Format,
) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer(&mut *writer, completion)?;
            writeln!(writer)?;
        }
        Format::Table => print_table(writer, completer, completion)?,
    }
    Ok(())
}

/// Print suggestions as an aligned table.
fn print_table(writer: &mut dyn Write, completer: &Completer, completion: &Completion) -> Result<()> {
    let delimiter = completer.extractor.delimiter();
    match &completion.query {
        Some(query) => writeln!(writer, "query: {delimiter}{query}")?,
        None => {
            writeln!(writer, "(no query at cursor {})", completion.cursor)?;
            return Ok(());
        }
    }

    let columns = ["#", "id", "label"];
    let rows: Vec<[String; 3]> = completion
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, item)| {
            [
                (i + 1).to_string(),
                item.id().unwrap_or_default().to_string(),
                completer.label(item),
            ]
        })
        .collect();

    if !rows.is_empty() {
        // Calculate column widths
        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let max_data = rows
                    .iter()
                    .map(|r| r[i].chars().count())
                    .max()
                    .unwrap_or(0);
                col.len().max(max_data)
            })
            .collect();

        // Header
        let header: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = w))
            .collect();
        writeln!(writer, "{}", header.join(" | ").trim_end())?;

        // Separator
        let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(writer, "{}", sep.join("-+-"))?;

        // Data rows
        for row in &rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(val, w)| format!("{:<width$}", val, width = w))
                .collect();
            writeln!(writer, "{}", cells.join(" | ").trim_end())?;
        }
    }

    writeln!(writer, "({} suggestions)", rows.len())?;
    if let Some(applied) = &completion.applied {
        writeln!(writer, "=> {applied}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::sample_items;
    use crate::source::LocalDataSource;
    use pretty_assertions::assert_eq;

    fn completer(config: Config) -> Completer {
        Completer::with_source(&config, Box::new(LocalDataSource::new(sample_items()))).unwrap()
    }

    fn ids(completion: &Completion) -> Vec<&str> {
        completion
            .suggestions
            .iter()
            .filter_map(Item::id)
            .collect()
    }

    #[tokio::test]
    async fn test_complete_at_end() {
        let completion = completer(Config::default())
            .complete("hi @bo", None, None)
            .await
            .unwrap();
        assert_eq!(completion.query.as_deref(), Some("bo"));
        assert_eq!(ids(&completion), vec!["bob", "bobby"]);
        assert_eq!(completion.cursor, 6);
    }

    #[tokio::test]
    async fn test_explicit_cursor() {
        let completion = completer(Config::default())
            .complete("@ken and @li", Some(3), None)
            .await
            .unwrap();
        assert_eq!(completion.query.as_deref(), Some("ke"));
        assert_eq!(ids(&completion), vec!["ken"]);
    }

    #[tokio::test]
    async fn test_select_applies_suggestion() {
        let completion = completer(Config::default())
            .complete("hi @bo", None, Some(2))
            .await
            .unwrap();
        assert_eq!(completion.applied.as_deref(), Some("hi @bobby"));
    }

    #[tokio::test]
    async fn test_select_out_of_range() {
        let completion = completer(Config::default())
            .complete("hi @bo", None, Some(9))
            .await
            .unwrap();
        assert_eq!(completion.applied, None);
    }

    #[tokio::test]
    async fn test_empty_query_respects_setting() {
        let completion = completer(Config::default())
            .complete("@", None, None)
            .await
            .unwrap();
        assert_eq!(completion.query.as_deref(), Some(""));
        assert!(completion.suggestions.is_empty());

        let mut config = Config::default();
        config.widget.allow_empty_queries = true;
        let completion = completer(config).complete("@", None, None).await.unwrap();
        assert_eq!(completion.suggestions.len(), sample_items().len());
    }

    #[tokio::test]
    async fn test_table_output() {
        let c = completer(Config::default());
        let completion = c.complete("hi @bo", None, Some(1)).await.unwrap();
        let mut out = Vec::new();
        print_completion(&mut out, &c, &completion, Format::Table).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("query: @bo\n"));
        assert!(out.contains("| bobby"));
        assert!(out.contains("(2 suggestions)"));
        assert!(out.ends_with("=> hi @bob\n"));
    }

    #[tokio::test]
    async fn test_table_without_query() {
        let c = completer(Config::default());
        let completion = c.complete("plain", None, None).await.unwrap();
        let mut out = Vec::new();
        print_completion(&mut out, &c, &completion, Format::Table).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(no query at cursor 5)\n");
    }

    #[tokio::test]
    async fn test_json_output() {
        let c = completer(Config::default());
        let completion = c.complete("@gr", None, None).await.unwrap();
        let mut out = Vec::new();
        print_completion(&mut out, &c, &completion, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["query"], "gr");
        assert_eq!(value["suggestions"][0]["id"], "grace");
        assert!(value.get("applied").is_none());
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert!("csv".parse::<Format>().is_err());
    }
}
