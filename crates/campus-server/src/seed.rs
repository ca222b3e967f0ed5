//! Provisioning from a JSON seed file.
//!
//! Accounts, student and faculty profiles and subjects are created outside
//! the feedback flow. The seed file is the operator's way to do that:
//!
//! ```json
//! {
//!   "users": [
//!     { "email": "stu@example.edu", "name": "Sam", "role": "student",
//!       "password": "…", "student": { "department": "CS", "year": 3 } },
//!     { "email": "lee@example.edu", "name": "Dr. Lee", "role": "faculty",
//!       "password": "…", "faculty": true }
//!   ],
//!   "subjects": [ { "name": "Algorithms", "code": "CS301" } ]
//! }
//! ```

use campus_core::model::{NewStudent, NewSubject, NewUser, Skills, StudentCategory};
use campus_store_sqlite::SqliteStore;
use serde::Deserialize;

use crate::auth::hash_password;

#[derive(Debug, Deserialize, Default)]
pub struct SeedFile {
  #[serde(default)]
  pub users:    Vec<SeedUser>,
  #[serde(default)]
  pub subjects: Vec<NewSubject>,
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
  #[serde(flatten)]
  pub user:     NewUser,
  pub password: String,
  #[serde(default)]
  pub student:  Option<SeedStudent>,
  #[serde(default)]
  pub faculty:  bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct SeedStudent {
  #[serde(default)]
  pub department: Option<String>,
  #[serde(default)]
  pub year:       Option<i32>,
  #[serde(default)]
  pub skills:     Option<Skills>,
  #[serde(default)]
  pub category:   Option<StudentCategory>,
}

/// Counts of rows created by [`apply`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
  pub users:    usize,
  pub students: usize,
  pub faculty:  usize,
  pub subjects: usize,
}

/// Insert everything in `seed` into `store`.
///
/// Stops at the first failure; rows inserted before it are kept.
pub async fn apply(store: &SqliteStore, seed: SeedFile) -> anyhow::Result<SeedReport> {
  let mut report = SeedReport::default();

  for entry in seed.users {
    let email = entry.user.email.clone();
    let hash = hash_password(&entry.password)?;
    let user = store.add_user(entry.user, hash).await?;
    report.users += 1;
    tracing::info!(user_id = %user.id, %email, role = %user.role, "user created");

    if let Some(profile) = entry.student {
      let student = store
        .add_student(NewStudent {
          user_id:    user.id,
          department: profile.department,
          year:       profile.year,
          skills:     profile.skills,
          category:   profile.category,
        })
        .await?;
      report.students += 1;
      tracing::info!(student_id = %student.id, %email, "student profile created");
    }

    if entry.faculty {
      let faculty = store.add_faculty(user.id).await?;
      report.faculty += 1;
      tracing::info!(faculty_id = %faculty.id, %email, "faculty profile created");
    }
  }

  for subject in seed.subjects {
    let subject = store.add_subject(subject).await?;
    report.subjects += 1;
    tracing::info!(subject_id = %subject.id, code = %subject.code, "subject created");
  }

  Ok(report)
}

#[cfg(test)]
mod tests {
  use campus_core::store::CampusStore;

  use super::*;

  #[tokio::test]
  async fn applies_seed_file() {
    let raw = r#"{
      "users": [
        { "email": "stu@example.edu", "name": "Sam", "role": "student",
          "password": "pw", "student": { "department": "CS", "category": "Explorer" } },
        { "email": "lee@example.edu", "name": "Dr. Lee", "role": "faculty",
          "password": "pw", "faculty": true }
      ],
      "subjects": [ { "name": "Algorithms", "code": "CS301" } ]
    }"#;
    let seed: SeedFile = serde_json::from_str(raw).unwrap();
    let store = SqliteStore::open_in_memory().await.unwrap();

    let report = apply(&store, seed).await.unwrap();
    assert_eq!(report, SeedReport { users: 2, students: 1, faculty: 1, subjects: 1 });

    let stu = store.find_user_by_email("stu@example.edu").await.unwrap().unwrap();
    let student = store.find_student_by_user(stu.user.id).await.unwrap().unwrap();
    assert_eq!(student.category, Some(StudentCategory::Explorer));

    let faculty = store.list_faculty().await.unwrap();
    assert_eq!(faculty[0].display_name(), "Dr. Lee");
  }
}
