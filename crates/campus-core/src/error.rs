//! Error types for `campus-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("rating must be between 1 and 5, got {0}")]
  InvalidRating(i64),

  #[error("feedback text must not be empty")]
  EmptyText,

  #[error("student not found: {0}")]
  StudentNotFound(Uuid),

  #[error("faculty not found: {0}")]
  FacultyNotFound(Uuid),

  #[error("subject not found: {0}")]
  SubjectNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  /// The acting user does not own the student profile named in the request.
  #[error("student {student_id} does not belong to the current user")]
  NotOwner { student_id: Uuid },

  /// A submission id was reused for different feedback content.
  #[error("submission {submission_id} was already stored with different content")]
  SubmissionConflict { submission_id: Uuid },

  #[error("email already registered: {0}")]
  DuplicateEmail(String),

  #[error("unknown {column} value: {value:?}")]
  UnknownVariant { column: &'static str, value: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// True for errors caused by the caller's input rather than the backend.
  pub fn is_client_error(&self) -> bool {
    matches!(
      self,
      Error::InvalidRating(_)
        | Error::EmptyText
        | Error::StudentNotFound(_)
        | Error::FacultyNotFound(_)
        | Error::SubjectNotFound(_)
        | Error::DuplicateEmail(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
