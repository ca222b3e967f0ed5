//! Reference data for the form: the current student and the two selection
//! lists.
//!
//! Read failures are logged and degrade to "no data". The form is never
//! blocked on them; it refuses submission if the student is unresolved.

use campus_core::model::{FacultyMember, Subject, sort_faculty, sort_subjects};
use uuid::Uuid;

use crate::client::Datastore;

/// Everything the form needs from the datastore before the user starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
  pub student_id: Option<Uuid>,
  /// Ascending by name.
  pub subjects:   Vec<Subject>,
  /// Ascending by display name, unnamed last.
  pub faculty:    Vec<FacultyMember>,
}

/// Resolve the student, then load both lists concurrently.
///
/// The lists are only fetched once a student is resolved. Each failed read
/// is logged at `warn` and yields an empty result.
pub async fn load<B: Datastore>(backend: &B) -> ReferenceData {
  let student = match backend.current_student().await {
    Ok(student) => student,
    Err(e) => {
      tracing::warn!(error = %format!("{e:#}"), "student lookup failed");
      None
    }
  };

  let Some(student) = student else {
    tracing::info!("no student profile for the signed-in user");
    return ReferenceData::default();
  };

  let (subjects, faculty) = tokio::join!(backend.list_subjects(), backend.list_faculty());

  let mut subjects = subjects.unwrap_or_else(|e| {
    tracing::warn!(error = %format!("{e:#}"), "loading subjects failed");
    Vec::new()
  });
  let mut faculty = faculty.unwrap_or_else(|e| {
    tracing::warn!(error = %format!("{e:#}"), "loading faculty failed");
    Vec::new()
  });
  sort_subjects(&mut subjects);
  sort_faculty(&mut faculty);

  tracing::info!(
    student_id = %student.id,
    subjects = subjects.len(),
    faculty = faculty.len(),
    "reference data loaded"
  );

  ReferenceData { student_id: Some(student.id), subjects, faculty }
}
