//! Row shapes for the tables the feedback service reads and writes.
//!
//! Users, students, faculty and subjects are provisioned outside the
//! feedback flow; this service only reads them. Feedback is the one table
//! it writes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Rating, Result};

// ─── Users ────────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
  Student,
  Faculty,
  Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         Uuid,
  pub email:      String,
  pub name:       Option<String>,
  pub role:       UserRole,
  pub created_at: DateTime<Utc>,
}

/// Insert shape for [`User`]. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub email: String,
  #[serde(default)]
  pub name:  Option<String>,
  pub role:  UserRole,
}

/// A user together with the stored password hash. Never serialised.
#[derive(Debug, Clone)]
pub struct UserCredentials {
  pub user:          User,
  /// PHC string produced by argon2.
  pub password_hash: String,
}

// ─── Students ─────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum StudentCategory {
  Explorer,
  Doer,
  Achiever,
}

/// Skill name → score.
pub type Skills = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
  pub id:         Uuid,
  pub user_id:    Uuid,
  pub department: Option<String>,
  pub year:       Option<i32>,
  pub skills:     Option<Skills>,
  pub category:   Option<StudentCategory>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
  pub user_id:    Uuid,
  #[serde(default)]
  pub department: Option<String>,
  #[serde(default)]
  pub year:       Option<i32>,
  #[serde(default)]
  pub skills:     Option<Skills>,
  #[serde(default)]
  pub category:   Option<StudentCategory>,
}

// ─── Faculty ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
  pub id:         Uuid,
  pub user_id:    Uuid,
  pub created_at: DateTime<Utc>,
}

/// The part of a faculty member's user row shown in selection menus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyUser {
  pub id:   Uuid,
  pub name: Option<String>,
}

/// Faculty row joined with its user's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyMember {
  pub id:   Uuid,
  pub user: FacultyUser,
}

impl FacultyMember {
  pub fn display_name(&self) -> &str { self.user.name.as_deref().unwrap_or("—") }
}

/// Sort faculty ascending by display name; members without a name go last.
pub fn sort_faculty(faculty: &mut [FacultyMember]) {
  faculty.sort_by(|a, b| match (&a.user.name, &b.user.name) {
    (Some(x), Some(y)) => x.cmp(y),
    (Some(_), None) => std::cmp::Ordering::Less,
    (None, Some(_)) => std::cmp::Ordering::Greater,
    (None, None) => std::cmp::Ordering::Equal,
  });
}

// ─── Subjects ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:   Uuid,
  pub name: String,
  pub code: String,
}

impl Subject {
  /// `"Algorithms (CS301)"`
  pub fn label(&self) -> String { format!("{} ({})", self.name, self.code) }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubject {
  pub name: String,
  pub code: String,
}

pub fn sort_subjects(subjects: &mut [Subject]) {
  subjects.sort_by(|a, b| a.name.cmp(&b.name));
}

// ─── Feedback ─────────────────────────────────────────────────────────────────

/// A stored feedback record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
  pub id:            Uuid,
  pub submission_id: Uuid,
  pub student_id:    Uuid,
  pub faculty_id:    Uuid,
  pub subject_id:    Uuid,
  pub text:          String,
  pub rating:        Rating,
  pub created_at:    DateTime<Utc>,
}

/// Insert shape for [`Feedback`].
///
/// `submission_id` identifies one submission attempt. Sending the same
/// value twice yields the same stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFeedback {
  pub submission_id: Uuid,
  pub student_id:    Uuid,
  pub faculty_id:    Uuid,
  pub subject_id:    Uuid,
  pub text:          String,
  pub rating:        Rating,
}

impl NewFeedback {
  /// Checks that do not need the database. Ids are checked by the store.
  pub fn validate(&self) -> Result<()> {
    if self.text.trim().is_empty() {
      return Err(Error::EmptyText);
    }
    Ok(())
  }
}
