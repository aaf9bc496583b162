use crate::cache::FetchSource;
use crate::catalog::cached_client::CachedCatalogClient;
use crate::catalog::types::{Resource, Track};
use crate::commands::{self, Command};
use crate::config::Config;
use crate::event::{CatalogEvent, Event, EventHandler};
use crate::filter::{self, QueryField, QueryState};
use crate::prefs::PrefStore;
use crate::ui;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc;

/// Shown in place of the result count when the catalog cannot be loaded.
pub const LOAD_FAILED: &str = "Failed to load resources. Check your connection or refresh.";

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
  Search,
}

/// Main application state: the catalog, the active query, and everything the
/// draw pass reads. Each event is handled to completion before the next one
/// is dequeued, so filtering and rendering are atomic per event.
pub struct App {
  config: Config,

  /// Catalog client routed through the offline cache
  client: CachedCatalogClient,

  /// Persisted preferences
  prefs: PrefStore,

  /// Full catalog as loaded
  catalog: Vec<Resource>,

  /// Currently displayed subset, recomputed from the full catalog on every
  /// query change
  filtered: Vec<Resource>,

  /// Current filter constraints
  query: QueryState,

  /// Track shortcuts published by the server
  tracks: Vec<Track>,

  /// Name of the applied track, if the current view came from one
  active_track: Option<String>,

  /// Load failure message, shown instead of the result count
  load_error: Option<String>,

  /// When the shown catalog is an offline copy, its storage time
  offline_since: Option<DateTime<Utc>>,

  loading: bool,
  low_data: bool,

  /// Current input mode
  mode: Mode,

  /// Command input buffer (after pressing :)
  command_input: String,

  /// Selected autocomplete suggestion index
  selected_suggestion: usize,

  /// Selected card in the result list
  selected: usize,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let client = CachedCatalogClient::new(&config)?;
    let prefs = PrefStore::open()?;
    let low_data = prefs.get_low_data().unwrap_or_else(|e| {
      tracing::warn!(error = %e, "failed to read low-data preference");
      false
    });
    let (tx, _rx) = mpsc::unbounded_channel();

    Ok(Self {
      config,
      client,
      prefs,
      catalog: Vec::new(),
      filtered: Vec::new(),
      query: QueryState::default(),
      tracks: Vec::new(),
      active_track: None,
      load_error: None,
      offline_since: None,
      loading: true,
      low_data,
      mode: Mode::Normal,
      command_input: String::new(),
      selected_suggestion: 0,
      selected: 0,
      event_tx: tx,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    // Initial data load
    self.load_catalog(false);

    // Main loop
    while !self.should_quit {
      // Draw UI
      terminal.draw(|frame| ui::draw(frame, self))?;

      // Handle events
      if let Some(event) = events.next().await {
        self.handle_event(event)?;
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  /// Bootstrap the offline cache and load the catalog in the background,
  /// reporting progress as events. With `purge_first`, all cache
  /// generations are dropped up front (manual refresh).
  fn load_catalog(&self, purge_first: bool) {
    let client = self.client.clone();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let _ = tx.send(Event::Catalog(CatalogEvent::Loading));

      if purge_first {
        if let Err(e) = client.refresh() {
          tracing::warn!(error = %e, "cache purge failed");
        }
      }

      // Install/activate failures don't block the load; network-first
      // works without a populated generation
      if let Err(e) = client.bootstrap().await {
        tracing::warn!(error = %e, "offline cache bootstrap failed");
      }

      match client.load().await {
        Ok(loaded) => {
          let _ = tx.send(Event::Catalog(CatalogEvent::Loaded(loaded)));
        }
        Err(e) => {
          let _ = tx.send(Event::Catalog(CatalogEvent::Failed(e.to_string())));
        }
      }

      match client.tracks().await {
        Ok(tracks) => {
          let _ = tx.send(Event::Catalog(CatalogEvent::TracksLoaded(tracks)));
        }
        Err(e) => {
          tracing::warn!(error = %e, "failed to load track shortcuts");
        }
      }
    });
  }

  fn handle_event(&mut self, event: Event) -> Result<()> {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {} // UI refresh happens automatically
      Event::Catalog(catalog_event) => self.handle_catalog_event(catalog_event),
    }
    Ok(())
  }

  fn handle_catalog_event(&mut self, event: CatalogEvent) {
    match event {
      CatalogEvent::Loading => {
        self.loading = true;
      }
      CatalogEvent::Loaded(loaded) => {
        self.loading = false;
        self.load_error = None;
        self.offline_since = match loaded.source {
          FetchSource::Network => None,
          FetchSource::Cache { stored_at } => Some(stored_at),
        };
        self.catalog = loaded.resources;
        // A fresh load shows the full set; the query is only reapplied on
        // the next change event
        self.filtered = self.catalog.clone();
        self.active_track = None;
        self.selected = 0;
      }
      CatalogEvent::Failed(message) => {
        tracing::warn!(error = %message, "catalog load failed");
        self.loading = false;
        self.catalog.clear();
        self.filtered.clear();
        self.selected = 0;
        self.load_error = Some(LOAD_FAILED.to_string());
      }
      CatalogEvent::TracksLoaded(tracks) => {
        // Number keys 1-9 are the shortcut surface
        self.tracks = tracks.into_iter().take(9).collect();
      }
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Command => self.handle_command_mode_key(key),
      Mode::Search => self.handle_search_mode_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: KeyEvent) {
    match key.code {
      // Quit
      KeyCode::Char('q') => {
        self.should_quit = true;
      }
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }

      // Navigation
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),

      // Mode switches
      KeyCode::Char(':') => {
        self.mode = Mode::Command;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Char('/') => {
        // Search edits the existing text constraint in place
        self.mode = Mode::Search;
      }

      // Selector cycling
      KeyCode::Char('c') => self.cycle_field(QueryField::Category),
      KeyCode::Char('l') => self.cycle_field(QueryField::Level),
      KeyCode::Char('f') => self.cycle_field(QueryField::Format),

      // Preferences and refresh
      KeyCode::Char('d') => self.toggle_low_data(),
      KeyCode::Char('r') => self.load_catalog(true),

      // Track shortcuts
      KeyCode::Char(c @ '1'..='9') => {
        let index = c as usize - '1' as usize;
        self.apply_track(index);
      }

      _ => {}
    }
  }

  fn handle_command_mode_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command();
        self.mode = Mode::Normal;
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = (self.selected_suggestion + 1) % suggestions.len();
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = if self.selected_suggestion == 0 {
            suggestions.len() - 1
          } else {
            self.selected_suggestion - 1
          };
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0;
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0;
      }
      _ => {}
    }
  }

  fn handle_search_mode_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        // Cancel drops the text constraint
        self.mode = Mode::Normal;
        self.query.text.clear();
        self.apply_query();
      }
      KeyCode::Enter => {
        // Keep the filter and return to normal mode
        self.mode = Mode::Normal;
      }
      KeyCode::Backspace => {
        self.query.text.pop();
        self.apply_query();
      }
      KeyCode::Char(c) => {
        self.query.text.push(c);
        self.apply_query();
      }
      _ => {}
    }
  }

  fn execute_command(&mut self) {
    // Execute the selected suggestion, or the raw input if nothing matches
    let suggestions = commands::get_suggestions(&self.command_input);
    let cmd = if !suggestions.is_empty() && self.selected_suggestion < suggestions.len() {
      suggestions[self.selected_suggestion].name.to_string()
    } else {
      self.command_input.trim().to_lowercase()
    };

    match cmd.as_str() {
      "resources" => {
        self.query.reset();
        self.apply_query();
      }
      "install" => {
        let client = self.client.clone();
        tokio::spawn(async move {
          if let Err(e) = client.bootstrap().await {
            tracing::warn!(error = %e, "offline cache install failed");
          }
        });
      }
      "refresh" => {
        self.load_catalog(true);
      }
      "lowdata" => {
        self.toggle_low_data();
      }
      "quit" => {
        self.should_quit = true;
      }
      _ => {
        // Unknown command
      }
    }
    self.command_input.clear();
  }

  /// Recompute the filtered view from the current query. Any query change
  /// supersedes an applied track.
  fn apply_query(&mut self) {
    self.active_track = None;
    self.filtered = filter::filter(&self.catalog, &self.query);
    self.selected = 0;
  }

  fn cycle_field(&mut self, field: QueryField) {
    let values = filter::field_values(&self.catalog, field);
    let current = match field {
      QueryField::Category => &mut self.query.category,
      QueryField::Level => &mut self.query.level,
      QueryField::Format => &mut self.query.format,
    };
    *current = filter::cycle_value(current, &values);
    self.apply_query();
  }

  /// Apply a track shortcut: reset the query, then select by tags alone.
  fn apply_track(&mut self, index: usize) {
    let Some(track) = self.tracks.get(index) else {
      return;
    };

    let name = track.name.clone();
    let tags = track.tag_list();

    self.query.reset();
    self.filtered = filter::filter_by_tags(&self.catalog, &tags);
    self.active_track = Some(name);
    self.selected = 0;
  }

  fn toggle_low_data(&mut self) {
    self.low_data = !self.low_data;
    if let Err(e) = self.prefs.set_low_data(self.low_data) {
      tracing::warn!(error = %e, "failed to persist low-data preference");
    }
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.filtered.len();
    if len > 0 {
      self.selected = (self.selected as i32 + delta).rem_euclid(len as i32) as usize;
    }
  }

  // Accessors for UI rendering
  pub fn filtered(&self) -> &[Resource] {
    &self.filtered
  }

  pub fn query(&self) -> &QueryState {
    &self.query
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn command_input(&self) -> &str {
    &self.command_input
  }

  pub fn title(&self) -> &str {
    self.config.title.as_deref().unwrap_or("SkillSprout")
  }

  pub fn tracks(&self) -> &[Track] {
    &self.tracks
  }

  pub fn active_track(&self) -> Option<&str> {
    self.active_track.as_deref()
  }

  pub fn load_error(&self) -> Option<&str> {
    self.load_error.as_deref()
  }

  pub fn offline_since(&self) -> Option<DateTime<Utc>> {
    self.offline_since
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn low_data(&self) -> bool {
    self.low_data
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  pub fn autocomplete_suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(&self.command_input)
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }
}
