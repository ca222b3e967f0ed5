//! The feedback form: field state, submit preconditions and settlement.
//!
//! Kept free of I/O. [`App`](crate::app::App) drives it: it calls
//! [`FeedbackForm::begin_submit`], sends the returned record to the
//! datastore, and hands the result back to [`FeedbackForm::settle`].

use campus_core::{
  Rating,
  model::{Feedback, NewFeedback},
};
use uuid::Uuid;

// ─── Notifications ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
  Default,
  Destructive,
}

/// A transient notification shown after a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
  pub title:       String,
  pub description: String,
  pub kind:        ToastKind,
}

impl Toast {
  fn success(title: &str, description: &str) -> Self {
    Self { title: title.into(), description: description.into(), kind: ToastKind::Default }
  }

  fn error(title: &str, description: &str) -> Self {
    Self { title: title.into(), description: description.into(), kind: ToastKind::Destructive }
  }
}

// ─── Rejections ───────────────────────────────────────────────────────────────

/// Why a submit request did not reach the datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
  /// The signed-in user has no student profile.
  NoStudent,
  /// Subject, faculty or text is empty.
  MissingFields,
  /// A submission is already in flight.
  InFlight,
}

impl Rejection {
  /// The notification for this rejection. A repeated submit while one is in
  /// flight is ignored silently.
  pub fn toast(self) -> Option<Toast> {
    match self {
      Rejection::NoStudent => Some(Toast::error("Error", "Student profile not found")),
      Rejection::MissingFields => {
        Some(Toast::error("Missing fields", "Please fill in all required fields"))
      }
      Rejection::InFlight => None,
    }
  }
}

// ─── Form ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Editing,
  Submitting,
}

/// Controlled form state for one feedback record.
#[derive(Debug, Clone)]
pub struct FeedbackForm {
  pub subject_id: Option<Uuid>,
  pub faculty_id: Option<Uuid>,
  pub text:       String,
  pub rating:     Rating,
  phase:          Phase,
  /// Dedup token for the current content. Cleared on every edit so a
  /// retry of unchanged content reuses it and edited content gets a new one.
  submission_id:  Option<Uuid>,
}

impl Default for FeedbackForm {
  fn default() -> Self {
    Self {
      subject_id:    None,
      faculty_id:    None,
      text:          String::new(),
      rating:        Rating::default(),
      phase:         Phase::Editing,
      submission_id: None,
    }
  }
}

impl FeedbackForm {
  #[cfg(test)]
  pub fn phase(&self) -> Phase { self.phase }

  pub fn is_submitting(&self) -> bool { self.phase == Phase::Submitting }

  #[cfg(test)]
  pub fn submission_id(&self) -> Option<Uuid> { self.submission_id }

  // ── Edits (ignored while submitting) ──────────────────────────────────────

  pub fn select_subject(&mut self, id: Uuid) {
    self.edit(|f| f.subject_id = Some(id));
  }

  pub fn select_faculty(&mut self, id: Uuid) {
    self.edit(|f| f.faculty_id = Some(id));
  }

  pub fn push_char(&mut self, c: char) { self.edit(|f| f.text.push(c)); }

  pub fn pop_char(&mut self) {
    self.edit(|f| {
      f.text.pop();
    });
  }

  #[cfg(test)]
  pub fn set_text(&mut self, text: impl Into<String>) {
    let text = text.into();
    self.edit(|f| f.text = text);
  }

  /// Select star `k`. Absolute: the rating becomes exactly `k`.
  pub fn set_rating(&mut self, k: Rating) { self.edit(|f| f.rating = k); }

  fn edit(&mut self, apply: impl FnOnce(&mut Self)) {
    if self.is_submitting() {
      return;
    }
    apply(self);
    self.submission_id = None;
  }

  // ── Submission ────────────────────────────────────────────────────────────

  /// Check preconditions in order and, if they pass, enter `Submitting` and
  /// return the record to insert.
  pub fn begin_submit(&mut self, student_id: Option<Uuid>) -> Result<NewFeedback, Rejection> {
    if self.is_submitting() {
      return Err(Rejection::InFlight);
    }
    let student_id = student_id.ok_or(Rejection::NoStudent)?;
    let (Some(subject_id), Some(faculty_id)) = (self.subject_id, self.faculty_id) else {
      return Err(Rejection::MissingFields);
    };
    if self.text.trim().is_empty() {
      return Err(Rejection::MissingFields);
    }

    let submission_id = *self.submission_id.get_or_insert_with(Uuid::new_v4);
    self.phase = Phase::Submitting;

    Ok(NewFeedback {
      submission_id,
      student_id,
      faculty_id,
      subject_id,
      text: self.text.clone(),
      rating: self.rating,
    })
  }

  /// Apply the datastore result and return to `Editing`.
  ///
  /// Success resets every field to its default; failure keeps them so the
  /// user can retry.
  pub fn settle(&mut self, outcome: Result<Feedback, String>) -> Toast {
    match outcome {
      Ok(_) => {
        *self = FeedbackForm::default();
        Toast::success("Feedback submitted", "Thank you for your feedback!")
      }
      Err(message) => {
        self.phase = Phase::Editing;
        Toast::error("Error submitting feedback", &message)
      }
    }
  }
}
