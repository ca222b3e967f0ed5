//! [`SqliteStore`], the SQLite implementation of [`CampusStore`].

use std::path::Path;

use campus_core::{
  model::{
    Faculty, FacultyMember, Feedback, NewFeedback, NewStudent, NewSubject, NewUser, Student,
    Subject, User, UserCredentials,
  },
  store::CampusStore,
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    FEEDBACK_COLUMNS, RawFacultyMember, RawFeedback, RawStudent, RawSubject, RawUser,
    STUDENT_COLUMNS, USER_COLUMNS, encode_dt, encode_skills, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A campus store backed by a single SQLite file.
///
/// Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Result of the feedback insert transaction, decided on the connection
/// thread and turned into a `Result` afterwards.
enum AddFeedback {
  Inserted(RawFeedback),
  Existing(RawFeedback),
  Rejected(campus_core::Error),
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store. Used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Provisioning ──────────────────────────────────────────────────────────
  //
  // Accounts and reference data are created outside the feedback flow. These
  // inserts back the server's `seed` command and the tests.

  /// Create a user with an argon2 `password_hash`.
  pub async fn add_user(&self, input: NewUser, password_hash: String) -> Result<User> {
    let user = User {
      id:         Uuid::new_v4(),
      email:      input.email,
      name:       input.name,
      role:       input.role,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(user.id);
    let email    = user.email.clone();
    let name     = user.name.clone();
    let role_str = user.role.as_ref().to_owned();
    let at_str   = encode_dt(user.created_at);

    let taken = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row("SELECT 1 FROM users WHERE email = ?1", rusqlite::params![email], |_| {
            Ok(true)
          })
          .optional()?
          .unwrap_or(false);
        if !taken {
          tx.execute(
            "INSERT INTO users (id, email, name, role, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![id_str, email, name, role_str, password_hash, at_str],
          )?;
          tx.commit()?;
        }
        Ok(taken)
      })
      .await?;

    if taken {
      return Err(campus_core::Error::DuplicateEmail(user.email).into());
    }
    Ok(user)
  }

  /// Create the student profile for an existing user.
  pub async fn add_student(&self, input: NewStudent) -> Result<Student> {
    self.require_user(input.user_id).await?;

    let student = Student {
      id:         Uuid::new_v4(),
      user_id:    input.user_id,
      department: input.department,
      year:       input.year,
      skills:     input.skills,
      category:   input.category,
      created_at: Utc::now(),
    };

    let id_str       = encode_uuid(student.id);
    let user_id_str  = encode_uuid(student.user_id);
    let department   = student.department.clone();
    let year         = student.year;
    let skills_str   = encode_skills(student.skills.as_ref())?;
    let category_str = student.category.map(|c| c.as_ref().to_owned());
    let at_str       = encode_dt(student.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO students (id, user_id, department, year, skills, category, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            user_id_str,
            department,
            year,
            skills_str,
            category_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(student)
  }

  /// Create the faculty profile for an existing user.
  pub async fn add_faculty(&self, user_id: Uuid) -> Result<Faculty> {
    self.require_user(user_id).await?;

    let faculty = Faculty { id: Uuid::new_v4(), user_id, created_at: Utc::now() };

    let id_str      = encode_uuid(faculty.id);
    let user_id_str = encode_uuid(user_id);
    let at_str      = encode_dt(faculty.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO faculty (id, user_id, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, user_id_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(faculty)
  }

  pub async fn add_subject(&self, input: NewSubject) -> Result<Subject> {
    let subject = Subject { id: Uuid::new_v4(), name: input.name, code: input.code };

    let id_str = encode_uuid(subject.id);
    let name   = subject.name.clone();
    let code   = subject.code.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (id, name, code) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, code],
        )?;
        Ok(())
      })
      .await?;

    Ok(subject)
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn require_user(&self, user_id: Uuid) -> Result<()> {
    if self.get_user(user_id).await?.is_none() {
      return Err(campus_core::Error::UserNotFound(user_id).into());
    }
    Ok(())
  }
}

// ─── CampusStore impl ────────────────────────────────────────────────────────

impl CampusStore for SqliteStore {
  type Error = Error;

  // ── Identity ──────────────────────────────────────────────────────────────

  async fn find_user_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
    let email = email.trim().to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            rusqlite::params![email],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_credentials).transpose()
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            rusqlite::params![id_str],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_student_by_user(&self, user_id: Uuid) -> Result<Option<Student>> {
    let user_id_str = encode_uuid(user_id);

    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE user_id = ?1"),
            rusqlite::params![user_id_str],
            RawStudent::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  // ── Reference data ────────────────────────────────────────────────────────

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let raws: Vec<RawSubject> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name, code FROM subjects ORDER BY name ASC")?;
        let rows = stmt
          .query_map([], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn list_faculty(&self) -> Result<Vec<FacultyMember>> {
    let raws: Vec<RawFacultyMember> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT f.id, u.id, u.name
           FROM faculty f
           JOIN users u ON u.id = f.user_id
           ORDER BY u.name IS NULL, u.name ASC",
        )?;
        let rows = stmt
          .query_map([], RawFacultyMember::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFacultyMember::into_member).collect()
  }

  // ── Feedback ──────────────────────────────────────────────────────────────

  async fn add_feedback(&self, actor: Uuid, input: NewFeedback) -> Result<Feedback> {
    input.validate()?;

    let id            = Uuid::new_v4();
    let created_at    = Utc::now();
    let id_str        = encode_uuid(id);
    let actor_str     = encode_uuid(actor);
    let submission    = encode_uuid(input.submission_id);
    let student_str   = encode_uuid(input.student_id);
    let faculty_str   = encode_uuid(input.faculty_id);
    let subject_str   = encode_uuid(input.subject_id);
    let at_str        = encode_dt(created_at);
    let rating        = i64::from(input.rating.get());
    let text          = input.text.clone();
    let submission_id = input.submission_id;
    let (student_id, faculty_id, subject_id) =
      (input.student_id, input.faculty_id, input.subject_id);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Row-level policy: the student must belong to the acting user.
        let owner: Option<String> = tx
          .query_row(
            "SELECT user_id FROM students WHERE id = ?1",
            rusqlite::params![student_str],
            |r| r.get(0),
          )
          .optional()?;
        match owner {
          None => {
            return Ok(AddFeedback::Rejected(campus_core::Error::StudentNotFound(student_id)));
          }
          Some(owner) if owner != actor_str => {
            return Ok(AddFeedback::Rejected(campus_core::Error::NotOwner { student_id }));
          }
          Some(_) => {}
        }

        let existing = tx
          .query_row(
            &format!("SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE submission_id = ?1"),
            rusqlite::params![submission],
            RawFeedback::from_row,
          )
          .optional()?;
        if let Some(existing) = existing {
          if existing.student_id != student_str {
            return Ok(AddFeedback::Rejected(campus_core::Error::NotOwner { student_id }));
          }
          let same_content = existing.faculty_id == faculty_str
            && existing.subject_id == subject_str
            && existing.text == text
            && existing.rating == rating;
          if !same_content {
            return Ok(AddFeedback::Rejected(campus_core::Error::SubmissionConflict {
              submission_id,
            }));
          }
          return Ok(AddFeedback::Existing(existing));
        }

        let exists = |sql: &str, id: &str| -> rusqlite::Result<bool> {
          Ok(tx.query_row(sql, rusqlite::params![id], |_| Ok(true)).optional()?.is_some())
        };
        if !exists("SELECT 1 FROM faculty WHERE id = ?1", &faculty_str)? {
          return Ok(AddFeedback::Rejected(campus_core::Error::FacultyNotFound(faculty_id)));
        }
        if !exists("SELECT 1 FROM subjects WHERE id = ?1", &subject_str)? {
          return Ok(AddFeedback::Rejected(campus_core::Error::SubjectNotFound(subject_id)));
        }

        let raw = RawFeedback {
          id: id_str,
          submission_id: submission,
          student_id: student_str,
          faculty_id: faculty_str,
          subject_id: subject_str,
          text,
          rating,
          created_at: at_str,
        };
        tx.execute(
          "INSERT INTO feedback (
             id, submission_id, student_id, faculty_id, subject_id, text, rating, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            raw.id,
            raw.submission_id,
            raw.student_id,
            raw.faculty_id,
            raw.subject_id,
            raw.text,
            raw.rating,
            raw.created_at,
          ],
        )?;
        tx.commit()?;
        Ok(AddFeedback::Inserted(raw))
      })
      .await?;

    match outcome {
      AddFeedback::Inserted(raw) => raw.into_feedback(),
      AddFeedback::Existing(raw) => {
        tracing::debug!(submission_id = %input.submission_id, "duplicate submission, returning stored row");
        raw.into_feedback()
      }
      AddFeedback::Rejected(e) => Err(e.into()),
    }
  }
}
