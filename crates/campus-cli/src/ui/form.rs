//! Feedback form pane and its selection popup.

use campus_core::Rating;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::{
  app::{App, Focus, Picker},
  client::Datastore,
};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the form into `area`.
pub fn draw<B: Datastore>(f: &mut Frame, area: Rect, app: &App<B>) {
  let block = Block::default()
    .title(" Submit Feedback ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(3), // subject
      Constraint::Length(3), // faculty
      Constraint::Min(5),    // text
      Constraint::Length(3), // rating
      Constraint::Length(3), // submit
    ])
    .split(inner);

  let form = &app.form;

  let subject = form
    .subject_id
    .and_then(|id| app.reference.subjects.iter().find(|s| s.id == id))
    .map(|s| s.label());
  draw_select(f, rows[0], app, Focus::Subject, "Subject", subject, "Select a subject");

  let faculty = form
    .faculty_id
    .and_then(|id| app.reference.faculty.iter().find(|m| m.id == id))
    .map(|m| m.display_name().to_string());
  draw_select(f, rows[1], app, Focus::Faculty, "Faculty", faculty, "Select a faculty member");

  draw_text(f, rows[2], app);
  draw_rating(f, rows[3], app);
  draw_submit(f, rows[4], app);

  if let Some(picker) = app.picker {
    draw_picker(f, area, app, picker);
  }
}

// ─── Fields ───────────────────────────────────────────────────────────────────

fn field_block<B: Datastore>(app: &App<B>, field: Focus, title: &str) -> Block<'static> {
  let colour = if app.focus == field && app.picker.is_none() {
    Color::Cyan
  } else {
    Color::DarkGray
  };
  Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(colour))
}

fn draw_select<B: Datastore>(
  f: &mut Frame,
  area: Rect,
  app: &App<B>,
  field: Focus,
  title: &str,
  value: Option<String>,
  placeholder: &str,
) {
  let para = match value {
    Some(v) => Paragraph::new(v),
    None => Paragraph::new(placeholder.to_string()).style(Style::default().fg(Color::DarkGray)),
  };
  f.render_widget(para.block(field_block(app, field, title)), area);
}

fn draw_text<B: Datastore>(f: &mut Frame, area: Rect, app: &App<B>) {
  let block = field_block(app, Focus::Text, "Feedback");
  let para = if app.form.text.is_empty() {
    Paragraph::new("Write your feedback here…").style(Style::default().fg(Color::DarkGray))
  } else {
    let mut text = app.form.text.clone();
    if app.focus == Focus::Text && !app.form.is_submitting() {
      text.push('▏');
    }
    Paragraph::new(text)
  };
  f.render_widget(para.wrap(Wrap { trim: false }).block(block), area);
}

fn draw_rating<B: Datastore>(f: &mut Frame, area: Rect, app: &App<B>) {
  let rating = app.form.rating;
  let mut spans: Vec<Span> = (1..=Rating::MAX)
    .map(|p| {
      if rating.is_filled(p) {
        Span::styled("★ ", Style::default().fg(Color::Yellow))
      } else {
        Span::styled("☆ ", Style::default().fg(Color::DarkGray))
      }
    })
    .collect();
  spans.push(Span::styled(format!(" {rating}"), Style::default().fg(Color::Gray)));

  f.render_widget(
    Paragraph::new(Line::from(spans)).block(field_block(app, Focus::Rating, "Rating")),
    area,
  );
}

fn draw_submit<B: Datastore>(f: &mut Frame, area: Rect, app: &App<B>) {
  let label = if app.form.is_submitting() { "Submitting…" } else { "Submit Feedback" };
  let mut style = Style::default().add_modifier(Modifier::BOLD);
  if app.form.is_submitting() {
    style = style.fg(Color::DarkGray);
  } else if app.focus == Focus::Submit {
    style = style.fg(Color::Black).bg(Color::Cyan);
  }
  f.render_widget(
    Paragraph::new(Span::styled(format!(" {label} "), style))
      .centered()
      .block(field_block(app, Focus::Submit, "")),
    area,
  );
}

// ─── Picker popup ─────────────────────────────────────────────────────────────

fn draw_picker<B: Datastore>(f: &mut Frame, area: Rect, app: &App<B>, picker: Picker) {
  let (title, labels): (&str, Vec<String>) = match picker.field {
    Focus::Subject => (
      " Select a subject ",
      app.reference.subjects.iter().map(|s| s.label()).collect(),
    ),
    _ => (
      " Select a faculty member ",
      app
        .reference
        .faculty
        .iter()
        .map(|m| m.display_name().to_string())
        .collect(),
    ),
  };

  let popup = centered(area, 60, 60);
  f.render_widget(Clear, popup);

  let items: Vec<ListItem> = labels.into_iter().map(ListItem::new).collect();
  let list = List::new(items)
    .block(
      Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan)),
    )
    .highlight_style(
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▶ ");

  let mut state = ListState::default();
  state.select(Some(picker.cursor));
  f.render_stateful_widget(list, popup, &mut state);
}

/// A rectangle `pct_x`% by `pct_y`% of `area`, centred within it.
fn centered(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
  let vert = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Percentage((100 - pct_y) / 2),
      Constraint::Percentage(pct_y),
      Constraint::Percentage((100 - pct_y) / 2),
    ])
    .split(area);
  Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Percentage((100 - pct_x) / 2),
      Constraint::Percentage(pct_x),
      Constraint::Percentage((100 - pct_x) / 2),
    ])
    .split(vert[1])[1]
}
