//! Application state machine and event dispatcher.
//!
//! Datastore calls run as tasks in a [`JoinSet`] owned by the [`App`]; their
//! results come back as [`Outcome`]s over a channel and are applied by the
//! event loop. Dropping the `App` aborts whatever is still in flight, so a
//! late result can never touch a torn-down view.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use campus_core::{
  Rating,
  model::{Feedback, User},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::{sync::mpsc, task::JoinSet};

use crate::{
  client::Datastore,
  form::{FeedbackForm, Toast},
  loader::{self, ReferenceData},
};

/// How long a notification stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(5);

// ─── Focus ────────────────────────────────────────────────────────────────────

/// The form control that receives key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Subject,
  Faculty,
  Text,
  Rating,
  Submit,
}

impl Focus {
  const ORDER: [Focus; 5] =
    [Focus::Subject, Focus::Faculty, Focus::Text, Focus::Rating, Focus::Submit];

  fn index(self) -> usize {
    Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
  }

  pub fn next(self) -> Self { Self::ORDER[(self.index() + 1) % Self::ORDER.len()] }

  pub fn prev(self) -> Self {
    Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
  }
}

/// An open selection menu for the subject or faculty field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Picker {
  pub field:  Focus,
  pub cursor: usize,
}

// ─── Outcomes ─────────────────────────────────────────────────────────────────

/// Completion of a background datastore task.
#[derive(Debug)]
pub enum Outcome {
  Loaded(ReferenceData),
  Settled(Result<Feedback, String>),
}

#[derive(Debug, Clone)]
pub struct ActiveToast {
  pub toast:    Toast,
  pub shown_at: Instant,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<B: Datastore> {
  /// True until reference data has been applied. Flips exactly once.
  pub loading: bool,

  /// The signed-in user, if credentials resolved to one.
  pub user: Option<User>,

  /// Student id and selection lists.
  pub reference: ReferenceData,

  pub form: FeedbackForm,

  pub focus: Focus,

  pub picker: Option<Picker>,

  /// Current notification, if any.
  pub toast: Option<ActiveToast>,

  backend:     Arc<B>,
  tasks:       JoinSet<()>,
  outcomes_tx: mpsc::UnboundedSender<Outcome>,
  outcomes_rx: mpsc::UnboundedReceiver<Outcome>,
  started:     bool,
}

impl<B: Datastore> App<B> {
  pub fn new(backend: Arc<B>) -> Self {
    let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
    Self {
      loading: true,
      user: None,
      reference: ReferenceData::default(),
      form: FeedbackForm::default(),
      focus: Focus::Subject,
      picker: None,
      toast: None,
      backend,
      tasks: JoinSet::new(),
      outcomes_tx,
      outcomes_rx,
      started: false,
    }
  }

  // ── Background work ───────────────────────────────────────────────────────

  /// Start loading reference data for `user`. Without a user nothing
  /// happens and the view stays in its loading state.
  pub fn start(&mut self, user: Option<User>) {
    let Some(user) = user else {
      tracing::info!("no signed-in user; staying idle");
      return;
    };
    if self.started {
      return;
    }
    self.started = true;
    tracing::debug!(user_id = %user.id, "loading reference data");
    self.user = Some(user);

    let backend = Arc::clone(&self.backend);
    let tx = self.outcomes_tx.clone();
    self.tasks.spawn(async move {
      let data = loader::load(backend.as_ref()).await;
      let _ = tx.send(Outcome::Loaded(data));
    });
  }

  /// Handle a submit request from the user.
  pub fn submit(&mut self) {
    let input = match self.form.begin_submit(self.reference.student_id) {
      Ok(input) => input,
      Err(rejection) => {
        tracing::debug!(?rejection, "submit rejected");
        if let Some(toast) = rejection.toast() {
          self.show(toast);
        }
        return;
      }
    };

    tracing::debug!(submission_id = %input.submission_id, "submitting feedback");
    let backend = Arc::clone(&self.backend);
    let tx = self.outcomes_tx.clone();
    self.tasks.spawn(async move {
      let result = backend
        .insert_feedback(input)
        .await
        .map_err(|e| format!("{e:#}"));
      let _ = tx.send(Outcome::Settled(result));
    });
  }

  /// Apply one completed task to the view state.
  pub fn apply(&mut self, outcome: Outcome) {
    match outcome {
      Outcome::Loaded(data) => {
        if self.loading {
          self.reference = data;
          self.loading = false;
        }
      }
      Outcome::Settled(result) => {
        if !self.form.is_submitting() {
          return;
        }
        match &result {
          Ok(fb) => tracing::info!(feedback_id = %fb.id, "feedback submitted"),
          Err(e) => tracing::warn!(error = %e, "feedback submission failed"),
        }
        let toast = self.form.settle(result);
        self.show(toast);
      }
    }
  }

  /// Apply every outcome that has already arrived, reap finished tasks and
  /// expire the notification. Called once per event-loop iteration.
  pub fn poll(&mut self) {
    while let Ok(outcome) = self.outcomes_rx.try_recv() {
      self.apply(outcome);
    }
    while self.tasks.try_join_next().is_some() {}
    if self
      .toast
      .as_ref()
      .is_some_and(|t| t.shown_at.elapsed() >= TOAST_TTL)
    {
      self.toast = None;
    }
  }

  /// Wait for the next outcome and apply it.
  #[cfg(test)]
  pub async fn wait(&mut self) {
    if let Some(outcome) = self.outcomes_rx.recv().await {
      self.apply(outcome);
    }
  }

  /// Number of background tasks not yet reaped.
  #[cfg(test)]
  pub fn in_flight(&self) -> usize { self.tasks.len() }

  fn show(&mut self, toast: Toast) {
    self.toast = Some(ActiveToast { toast, shown_at: Instant::now() });
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
      return false;
    }
    if self.loading {
      return !matches!(key.code, KeyCode::Char('q') | KeyCode::Esc);
    }
    if ctrl && key.code == KeyCode::Char('s') {
      self.submit();
      return true;
    }
    if let Some(picker) = self.picker {
      self.handle_picker_key(picker, key);
      return true;
    }

    match key.code {
      KeyCode::Esc if self.focus == Focus::Text => self.focus = self.focus.next(),
      KeyCode::Esc => return false,
      KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
      KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
      _ if self.focus == Focus::Text => self.handle_text_key(key),
      KeyCode::Char('q') => return false,
      KeyCode::Char('j') => self.focus = self.focus.next(),
      KeyCode::Char('k') => self.focus = self.focus.prev(),
      _ => self.handle_control_key(key),
    }
    true
  }

  fn handle_text_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Enter => self.form.push_char('\n'),
      KeyCode::Backspace => self.form.pop_char(),
      KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.form.push_char(c)
      }
      _ => {}
    }
  }

  fn handle_control_key(&mut self, key: KeyEvent) {
    match (self.focus, key.code) {
      (Focus::Subject | Focus::Faculty, KeyCode::Enter | KeyCode::Char(' ')) => {
        self.open_picker(self.focus);
      }
      (Focus::Rating, KeyCode::Char(c @ '1'..='5')) => {
        if let Some(k) = c.to_digit(10).and_then(|d| Rating::new(d as u8)) {
          self.form.set_rating(k);
        }
      }
      (Focus::Rating, KeyCode::Left | KeyCode::Char('h')) => {
        if let Some(k) = Rating::new(self.form.rating.get().saturating_sub(1)) {
          self.form.set_rating(k);
        }
      }
      (Focus::Rating, KeyCode::Right | KeyCode::Char('l')) => {
        if let Some(k) = Rating::new(self.form.rating.get() + 1) {
          self.form.set_rating(k);
        }
      }
      (Focus::Submit, KeyCode::Enter | KeyCode::Char(' ')) => self.submit(),
      _ => {}
    }
  }

  // ── Selection menus ───────────────────────────────────────────────────────

  /// Number of options the picker for `field` offers.
  pub fn option_count(&self, field: Focus) -> usize {
    match field {
      Focus::Subject => self.reference.subjects.len(),
      Focus::Faculty => self.reference.faculty.len(),
      _ => 0,
    }
  }

  fn open_picker(&mut self, field: Focus) {
    if self.form.is_submitting() || self.option_count(field) == 0 {
      return;
    }
    let cursor = match field {
      Focus::Subject => self
        .form
        .subject_id
        .and_then(|id| self.reference.subjects.iter().position(|s| s.id == id)),
      _ => self
        .form
        .faculty_id
        .and_then(|id| self.reference.faculty.iter().position(|f| f.id == id)),
    }
    .unwrap_or(0);
    self.picker = Some(Picker { field, cursor });
  }

  fn handle_picker_key(&mut self, picker: Picker, key: KeyEvent) {
    let len = self.option_count(picker.field);
    match key.code {
      KeyCode::Esc => self.picker = None,
      KeyCode::Down | KeyCode::Char('j') => {
        if picker.cursor + 1 < len {
          self.picker = Some(Picker { cursor: picker.cursor + 1, ..picker });
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        if picker.cursor > 0 {
          self.picker = Some(Picker { cursor: picker.cursor - 1, ..picker });
        }
      }
      KeyCode::Enter | KeyCode::Char(' ') => {
        match picker.field {
          Focus::Subject => {
            if let Some(id) = self.reference.subjects.get(picker.cursor).map(|s| s.id) {
              self.form.select_subject(id);
            }
          }
          _ => {
            if let Some(id) = self.reference.faculty.get(picker.cursor).map(|f| f.id) {
              self.form.select_faculty(id);
            }
          }
        }
        self.picker = None;
      }
      _ => {}
    }
  }
}
