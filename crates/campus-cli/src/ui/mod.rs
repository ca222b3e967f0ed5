//! TUI rendering: header, body and status bar.

pub mod form;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::{
  app::{App, Focus},
  client::Datastore,
  form::ToastKind,
};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<B: Datastore>(f: &mut Frame, app: &App<B>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  if app.loading {
    draw_loading(f, rows[1], app);
  } else {
    form::draw(f, rows[1], app);
  }
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<B: Datastore>(f: &mut Frame, area: Rect, app: &App<B>) {
  let left = Span::styled(
    " campus  Submit Feedback",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );

  let who = app
    .user
    .as_ref()
    .map(|u| u.name.clone().unwrap_or_else(|| u.email.clone()))
    .unwrap_or_else(|| "not signed in".to_string());
  let date = Local::now().format("%Y-%m-%d");
  let right = Span::styled(
    format!("{who}  {date} "),
    Style::default().fg(Color::Gray),
  );

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Loading ──────────────────────────────────────────────────────────────────

fn draw_loading<B: Datastore>(f: &mut Frame, area: Rect, app: &App<B>) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let message = if app.user.is_some() {
    "Loading…"
  } else {
    "Not signed in. Check --email and --password."
  };
  f.render_widget(
    Paragraph::new(message)
      .style(Style::default().fg(Color::DarkGray))
      .centered(),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<B: Datastore>(f: &mut Frame, area: Rect, app: &App<B>) {
  if let Some(active) = &app.toast {
    let toast = &active.toast;
    let colour = match toast.kind {
      ToastKind::Default => Color::Green,
      ToastKind::Destructive => Color::Red,
    };
    let line = Line::from(vec![
      Span::styled(
        format!(" {} ", toast.title),
        Style::default()
          .fg(Color::Black)
          .bg(colour)
          .add_modifier(Modifier::BOLD),
      ),
      Span::styled(format!("  {}", toast.description), Style::default().fg(colour)),
    ]);
    f.render_widget(
      Paragraph::new(line).style(Style::default().bg(Color::Black)),
      area,
    );
    return;
  }

  let (mode_label, hints) = match (app.loading, app.picker, app.focus) {
    (true, ..) => ("LOADING", "q quit"),
    (false, Some(_), _) => ("SELECT", "↑↓/jk move  Enter choose  Esc cancel"),
    (false, None, Focus::Text) => ("TEXT", "Type feedback  Tab/Esc next field  Ctrl-S submit"),
    (false, None, Focus::Rating) => ("RATING", "1-5 or ←→ rate  Tab next field  Ctrl-S submit"),
    (false, None, _) => ("FORM", "Tab/↑↓ move  Enter select  Ctrl-S submit  q quit"),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {hints}"), Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}
