//! Wires the field, the data source and the popup together.
//!
//! Field changes are debounced, turned into data-source requests, and the
//! answers drive the popup. Timer firings and data-source answers arrive as
//! [`WidgetEvent`]s on a channel that the host event loop drains and hands
//! back to [`Controller::handle_event`], so every handler runs on the UI
//! thread, one at a time.

use std::time::Duration;

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::applier::{SuggestionApplier, TextFieldApplier};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::extract::{QueryExtractor, TextQueryExtractor};
use crate::field::Field;
use crate::item::Item;
use crate::source::DataSource;
use crate::template::Template;
use crate::tui::autocomplete::{Outcome, PopupRenderer, SuggestionRenderer};

/// Work delivered back to the controller by timers and data sources.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// The debounce delay for `query` elapsed.
    Dispatch {
        /// Timer generation, stale when a newer change cancelled it.
        generation: u64,
        /// Query to ask the data source for.
        query: String,
    },
    /// A data source answered.
    Suggestions {
        /// Query the answer belongs to.
        query: String,
        /// The suggested items.
        items: Vec<Item>,
    },
    /// The grace delay after a blur elapsed.
    BlurElapsed {
        /// Timer generation.
        generation: u64,
    },
}

/// Single-slot cancellable timer.
#[derive(Debug, Default)]
struct Timer {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl Timer {
    /// Cancel any pending firing and schedule a new one.
    ///
    /// A zero delay sends straight away without spawning.
    fn schedule<F>(&mut self, delay: Duration, tx: &UnboundedSender<WidgetEvent>, event: F)
    where
        F: FnOnce(u64) -> WidgetEvent,
    {
        self.cancel();
        let event = event(self.generation);
        if delay.is_zero() {
            let _ = tx.send(event);
            return;
        }
        let tx = tx.clone();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        }));
    }

    /// Abort the pending firing, if any.
    fn cancel(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether a firing of `generation` is still wanted.
    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// One mention widget attached to one field.
pub struct Controller {
    settings: Settings,
    extractor: Box<dyn QueryExtractor>,
    source: Box<dyn DataSource>,
    renderer: Box<dyn SuggestionRenderer>,
    applier: Box<dyn SuggestionApplier>,
    last_query: Option<String>,
    debounce: Timer,
    blur: Timer,
    tx: UnboundedSender<WidgetEvent>,
    rx: UnboundedReceiver<WidgetEvent>,
}

impl Controller {
    /// Start registering a widget with `settings`.
    pub fn builder(settings: Settings) -> ControllerBuilder {
        ControllerBuilder {
            settings,
            extractor: None,
            source: None,
            renderer: None,
            applier: None,
            template: None,
        }
    }

    /// Settings the widget was registered with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether the popup is shown.
    pub fn is_open(&self) -> bool {
        self.renderer.is_open()
    }

    /// Items currently held by the popup.
    pub fn suggestions(&self) -> &[Item] {
        self.renderer.items()
    }

    /// The last query handed to the data source.
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// React to a change of the field's text or cursor.
    pub fn on_change(&mut self, field: &Field) {
        self.debounce.cancel();

        let query = self.extractor.query(&field.text(), field.cursor());
        trace!(?query, "field changed");
        let Some(query) = query else {
            self.last_query = None;
            self.renderer.close();
            return;
        };

        if query.is_empty() && !self.settings.allow_empty_queries {
            self.last_query = Some(query);
            self.renderer.close();
            return;
        }

        if self.last_query.as_deref() == Some(query.as_str()) {
            return;
        }

        let delay = Duration::from_millis(self.settings.buffering_interval_ms);
        self.debounce
            .schedule(delay, &self.tx, |generation| WidgetEvent::Dispatch {
                generation,
                query,
            });
    }

    /// The field lost focus: close the popup after the grace delay.
    pub fn on_blur(&mut self) {
        let delay = Duration::from_millis(self.settings.blur_grace_ms);
        self.blur.schedule(delay, &self.tx, |generation| {
            WidgetEvent::BlurElapsed { generation }
        });
    }

    /// Route a key press. Returns whether the popup consumed it.
    pub fn handle_key(&mut self, key: &KeyEvent, field: &mut Field) -> bool {
        let outcome = self.renderer.handle_key(key);
        self.finish(outcome, field)
    }

    /// Route a mouse event. Returns whether the popup consumed it.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent, field: &mut Field) -> bool {
        let outcome = self.renderer.handle_mouse(mouse);
        self.finish(outcome, field)
    }

    fn finish(&mut self, outcome: Outcome, field: &mut Field) -> bool {
        match outcome {
            Outcome::Ignored => false,
            Outcome::Handled => true,
            Outcome::Selected(item) => {
                debug!(id = ?item.id(), "suggestion selected");
                self.applier.apply(field, &item);
                // The inserted value is a fresh query of its own.
                self.on_change(field);
                true
            }
        }
    }

    /// Next pending event, waiting for one.
    pub async fn next_event(&mut self) -> Option<WidgetEvent> {
        self.rx.recv().await
    }

    /// Next pending event, if one is ready.
    pub fn try_next_event(&mut self) -> Option<WidgetEvent> {
        self.rx.try_recv().ok()
    }

    /// Process one event from [`Controller::next_event`].
    pub fn handle_event(&mut self, event: WidgetEvent) -> Result<()> {
        match event {
            WidgetEvent::Dispatch { generation, query } => {
                if !self.debounce.is_current(generation) {
                    trace!(query, "discarding cancelled dispatch");
                    return Ok(());
                }
                debug!(query, "asking data source");
                self.last_query = Some(query.clone());
                let tx = self.tx.clone();
                let owned = query.clone();
                self.source.suggest(
                    &query,
                    Box::new(move |items: Vec<Item>| {
                        let _ = tx.send(WidgetEvent::Suggestions {
                            query: owned,
                            items,
                        });
                    }),
                );
            }
            WidgetEvent::Suggestions { query, items } => self.show(&query, items)?,
            WidgetEvent::BlurElapsed { generation } => {
                if self.blur.is_current(generation) {
                    self.renderer.close();
                }
            }
        }
        Ok(())
    }

    /// Drain and process every event that is already waiting.
    pub fn process_pending(&mut self) -> Result<()> {
        while let Some(event) = self.try_next_event() {
            self.handle_event(event)?;
        }
        Ok(())
    }

    fn show(&mut self, query: &str, items: Vec<Item>) -> Result<()> {
        validate_items(&items)?;
        debug!(query, count = items.len(), "suggestions received");

        let single_exact = items.len() == 1 && items[0].id() == Some(query);
        if items.is_empty() || (single_exact && self.settings.auto_close_on_single_exact_match) {
            self.renderer.close();
        } else {
            self.renderer.set(items);
            self.renderer.open();
        }
        Ok(())
    }

    /// Draw the popup under the field.
    pub fn draw(&mut self, frame: &mut Frame, field_area: Rect) {
        self.renderer.draw(frame, field_area);
    }
}

/// Every suggestion must carry an id.
pub fn validate_items(items: &[Item]) -> Result<()> {
    match items.iter().position(|item| item.id().is_none()) {
        Some(index) => Err(Error::InvalidItem { index }),
        None => Ok(()),
    }
}

/// Registration of a [`Controller`]; unset parts get the default implementations.
pub struct ControllerBuilder {
    settings: Settings,
    extractor: Option<Box<dyn QueryExtractor>>,
    source: Option<Box<dyn DataSource>>,
    renderer: Option<Box<dyn SuggestionRenderer>>,
    applier: Option<Box<dyn SuggestionApplier>>,
    template: Option<Template>,
}

impl ControllerBuilder {
    /// Where suggestions come from. Required.
    pub fn data_source(mut self, source: impl DataSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Already-boxed data source.
    pub fn boxed_data_source(mut self, source: Box<dyn DataSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the query extractor.
    pub fn query_extractor(mut self, extractor: impl QueryExtractor + 'static) -> Self {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Replace the popup renderer.
    pub fn renderer(mut self, renderer: impl SuggestionRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Replace the suggestion applier.
    pub fn applier(mut self, applier: impl SuggestionApplier + 'static) -> Self {
        self.applier = Some(Box::new(applier));
        self
    }

    /// Template for the default renderer; overrides the settings' choice.
    pub fn template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }

    /// Validate everything and create the controller.
    pub fn build(self) -> Result<Controller> {
        let settings = self.settings;
        settings.validate()?;
        let source = self
            .source
            .ok_or_else(|| Error::config("at least the data source needs to be specified"))?;
        let text_extractor = TextQueryExtractor::new(&settings.start_delimiter)?;

        let renderer: Box<dyn SuggestionRenderer> = match self.renderer {
            Some(renderer) => renderer,
            None => {
                let template = match self.template {
                    Some(template) => template,
                    None => Template::from_settings(&settings)?,
                };
                Box::new(PopupRenderer::new(template, settings.max_visible))
            }
        };
        let applier = self.applier.unwrap_or_else(|| {
            Box::new(TextFieldApplier::new(
                text_extractor,
                settings.insert_key.clone(),
            ))
        });
        let extractor = self
            .extractor
            .unwrap_or_else(|| Box::new(text_extractor));

        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Controller {
            settings,
            extractor,
            source,
            renderer,
            applier,
            last_query: None,
            debounce: Timer::default(),
            blur: Timer::default(),
            tx,
            rx,
        })
    }
}
