mod cards;

use crate::app::{App, Mode};
use crate::filter::ALL;
use crate::render;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Title
      Constraint::Length(1), // Result count / diagnostics
      Constraint::Length(1), // Filter line
      Constraint::Min(1),    // Cards
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  let output = render::project(app.filtered());

  draw_title(frame, chunks[0], app);
  draw_summary(frame, chunks[1], app, &output.summary);
  draw_filter_line(frame, chunks[2], app);
  cards::draw_cards(frame, chunks[3], &output, app.selected(), app.low_data());
  draw_status_bar(frame, chunks[4], app);
}

fn draw_title(frame: &mut Frame, area: Rect, app: &App) {
  let mut spans = vec![Span::styled(
    app.title().to_string(),
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  )];

  if let Some(stored_at) = app.offline_since() {
    spans.push(Span::styled(
      format!("  offline copy from {}", stored_at.format("%Y-%m-%d %H:%M")),
      Style::default().fg(Color::Yellow),
    ));
  }

  if app.low_data() {
    spans.push(Span::styled(
      "  [low-data]",
      Style::default().fg(Color::DarkGray),
    ));
  }

  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_summary(frame: &mut Frame, area: Rect, app: &App, summary: &str) {
  let (content, style) = if app.is_loading() {
    (
      "Loading resources...".to_string(),
      Style::default().fg(Color::DarkGray),
    )
  } else if let Some(error) = app.load_error() {
    (error.to_string(), Style::default().fg(Color::Red))
  } else {
    (summary.to_string(), Style::default().fg(Color::Gray))
  };

  frame.render_widget(Paragraph::new(content).style(style), area);
}

fn draw_filter_line(frame: &mut Frame, area: Rect, app: &App) {
  let query = app.query();
  let mut spans = Vec::new();

  if !query.text.trim().is_empty() || *app.mode() == Mode::Search {
    spans.push(Span::styled(
      format!("/{} ", query.text),
      Style::default().fg(Color::Cyan),
    ));
  }

  for (label, value) in [
    ("category", &query.category),
    ("level", &query.level),
    ("format", &query.format),
  ] {
    let style = if value == ALL {
      Style::default().fg(Color::DarkGray)
    } else {
      Style::default().fg(Color::Yellow)
    };
    spans.push(Span::styled(format!("{}:{} ", label, value), style));
  }

  if let Some(track) = app.active_track() {
    spans.push(Span::styled(
      format!("track:{} ", render::sanitize(track)),
      Style::default().fg(Color::Green),
    ));
  }

  for (i, track) in app.tracks().iter().enumerate() {
    spans.push(Span::styled(
      format!(" {}:{}", i + 1, render::sanitize(&track.name)),
      Style::default().fg(Color::DarkGray),
    ));
  }

  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let line = match app.mode() {
    Mode::Normal => {
      let hint =
        " :command  /search  c/l/f:filters  1-9:tracks  d:low-data  r:refresh  j/k:nav  q:quit";
      Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    }
    Mode::Command => {
      let mut spans = vec![Span::styled(
        format!(":{}", app.command_input()),
        Style::default().fg(Color::Yellow),
      )];

      for (i, cmd) in app.autocomplete_suggestions().iter().enumerate() {
        let style = if i == app.selected_suggestion() {
          Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
          Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(cmd.name, style));
      }

      Line::from(spans)
    }
    Mode::Search => Line::from(Span::styled(
      format!("/{}", app.query().text),
      Style::default().fg(Color::Cyan),
    )),
  };

  frame.render_widget(Paragraph::new(line), area);
}
