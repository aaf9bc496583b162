//! Maps projected cards onto ratatui widgets.

use crate::render::{Badge, BadgeTone, Card, RenderOutput};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

pub fn draw_cards(
  frame: &mut Frame,
  area: Rect,
  output: &RenderOutput,
  selected: usize,
  low_data: bool,
) {
  let block = Block::default()
    .title(" Resources ")
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if output.cards.is_empty() {
    let paragraph = Paragraph::new(output.summary.clone())
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = output
    .cards
    .iter()
    .map(|card| card_item(card, low_data))
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut state = ListState::default().with_selected(Some(selected));
  frame.render_stateful_widget(list, area, &mut state);
}

fn card_item(card: &Card, low_data: bool) -> ListItem<'static> {
  // Low-data mode collapses each card to a single line
  if low_data {
    return ListItem::new(Line::from(vec![
      Span::raw(format!("{} ", card.icon)),
      Span::styled(card.title.clone(), Style::default().fg(Color::Cyan)),
      Span::styled(
        format!("  by {}", card.provider),
        Style::default().fg(Color::DarkGray),
      ),
    ]));
  }

  let mut badge_spans: Vec<Span> = Vec::new();
  for badge in &card.badges {
    badge_spans.push(badge_span(badge));
    badge_spans.push(Span::raw(" "));
  }

  let lines = vec![
    Line::from(vec![
      Span::raw(format!("{} ", card.icon)),
      Span::styled(
        card.title.clone(),
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      ),
    ]),
    Line::from(badge_spans),
    Line::from(Span::raw(card.description.clone())),
    Line::from(vec![
      Span::styled(
        format!("By {}", card.provider),
        Style::default().fg(Color::DarkGray),
      ),
      Span::raw("  "),
      Span::styled(card.tags.join(" "), Style::default().fg(Color::Green)),
    ]),
    Line::from(Span::styled(
      card.url.clone(),
      Style::default()
        .fg(Color::Blue)
        .add_modifier(Modifier::UNDERLINED),
    )),
    Line::from(""),
  ];

  ListItem::new(lines)
}

fn badge_span(badge: &Badge) -> Span<'static> {
  let style = match badge.tone {
    BadgeTone::Neutral => Style::default().fg(Color::Gray),
    BadgeTone::Ok => Style::default().fg(Color::Green),
    BadgeTone::Warn => Style::default().fg(Color::Yellow),
  };

  Span::styled(format!("[{}]", badge.label), style)
}
