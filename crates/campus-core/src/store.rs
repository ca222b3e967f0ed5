//! The `CampusStore` trait.
//!
//! Implemented by storage backends (e.g. `campus-store-sqlite`). The API
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::model::{
  FacultyMember, Feedback, NewFeedback, Student, Subject, User, UserCredentials,
};

/// Errors returned by a store, with access to the core classification.
///
/// `core()` returns `Some` when the failure is one of the domain errors in
/// [`crate::Error`], which the HTTP layer maps to 4xx statuses.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn core(&self) -> Option<&crate::Error>;
}

impl StoreError for std::convert::Infallible {
  fn core(&self) -> Option<&crate::Error> { None }
}

/// Abstraction over the datastore backing the feedback service.
///
/// Reference data is read-only here. Feedback is append-only.
pub trait CampusStore: Send + Sync {
  type Error: StoreError;

  // ── Identity ──────────────────────────────────────────────────────────

  /// Look up a user and their password hash by email (case-insensitive).
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<UserCredentials>, Self::Error>> + Send + 'a;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// The student profile owned by `user_id`, if any.
  fn find_student_by_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  // ── Reference data ────────────────────────────────────────────────────

  /// All subjects, ascending by name.
  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// All faculty with their display name, ascending by name.
  fn list_faculty(
    &self,
  ) -> impl Future<Output = Result<Vec<FacultyMember>, Self::Error>> + Send + '_;

  // ── Feedback ──────────────────────────────────────────────────────────

  /// Insert one feedback record on behalf of `actor` (a user id).
  ///
  /// Fails with [`crate::Error::NotOwner`] unless the student named in
  /// `input` belongs to `actor`. A repeated `submission_id` returns the row
  /// stored the first time.
  fn add_feedback(
    &self,
    actor: Uuid,
    input: NewFeedback,
  ) -> impl Future<Output = Result<Feedback, Self::Error>> + Send + '_;
}
