//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs are hyphenated lowercase strings,
//! enums use their wire names and the skills map is compact JSON.

use std::str::FromStr;

use campus_core::{
  Rating,
  model::{
    FacultyMember, FacultyUser, Feedback, Skills, Student, StudentCategory, Subject, User,
    UserCredentials, UserRole,
  },
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ──────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| {
    Error::Core(campus_core::Error::UnknownVariant { column, value: s.to_owned() })
  })
}

pub fn encode_skills(skills: Option<&Skills>) -> Result<Option<String>> {
  skills.map(serde_json::to_string).transpose().map_err(Error::from)
}

// ─── Raw rows ─────────────────────────────────────────────────────────────────
//
// Rows are read into these all-`String` shapes inside the connection thread
// and decoded afterwards, so decode errors never cross the rusqlite boundary.

pub struct RawUser {
  pub id:            String,
  pub email:         String,
  pub name:          Option<String>,
  pub role:          String,
  pub password_hash: String,
  pub created_at:    String,
}

pub const USER_COLUMNS: &str = "id, email, name, role, password_hash, created_at";

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawUser {
      id:            row.get(0)?,
      email:         row.get(1)?,
      name:          row.get(2)?,
      role:          row.get(3)?,
      password_hash: row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_credentials(self) -> Result<UserCredentials> {
    Ok(UserCredentials {
      user:          User {
        id:         decode_uuid(&self.id)?,
        email:      self.email,
        name:       self.name,
        role:       decode_enum::<UserRole>("role", &self.role)?,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }

  pub fn into_user(self) -> Result<User> { Ok(self.into_credentials()?.user) }
}

pub struct RawStudent {
  pub id:         String,
  pub user_id:    String,
  pub department: Option<String>,
  pub year:       Option<i32>,
  pub skills:     Option<String>,
  pub category:   Option<String>,
  pub created_at: String,
}

pub const STUDENT_COLUMNS: &str =
  "id, user_id, department, year, skills, category, created_at";

impl RawStudent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawStudent {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      department: row.get(2)?,
      year:       row.get(3)?,
      skills:     row.get(4)?,
      category:   row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      id:         decode_uuid(&self.id)?,
      user_id:    decode_uuid(&self.user_id)?,
      department: self.department,
      year:       self.year,
      skills:     self.skills.as_deref().map(serde_json::from_str).transpose()?,
      category:   self
        .category
        .as_deref()
        .map(|c| decode_enum::<StudentCategory>("category", c))
        .transpose()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawSubject {
  pub id:   String,
  pub name: String,
  pub code: String,
}

impl RawSubject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawSubject { id: row.get(0)?, name: row.get(1)?, code: row.get(2)? })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject { id: decode_uuid(&self.id)?, name: self.name, code: self.code })
  }
}

pub struct RawFacultyMember {
  pub id:        String,
  pub user_id:   String,
  pub user_name: Option<String>,
}

impl RawFacultyMember {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawFacultyMember { id: row.get(0)?, user_id: row.get(1)?, user_name: row.get(2)? })
  }

  pub fn into_member(self) -> Result<FacultyMember> {
    Ok(FacultyMember {
      id:   decode_uuid(&self.id)?,
      user: FacultyUser { id: decode_uuid(&self.user_id)?, name: self.user_name },
    })
  }
}

pub struct RawFeedback {
  pub id:            String,
  pub submission_id: String,
  pub student_id:    String,
  pub faculty_id:    String,
  pub subject_id:    String,
  pub text:          String,
  pub rating:        i64,
  pub created_at:    String,
}

pub const FEEDBACK_COLUMNS: &str =
  "id, submission_id, student_id, faculty_id, subject_id, text, rating, created_at";

impl RawFeedback {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawFeedback {
      id:            row.get(0)?,
      submission_id: row.get(1)?,
      student_id:    row.get(2)?,
      faculty_id:    row.get(3)?,
      subject_id:    row.get(4)?,
      text:          row.get(5)?,
      rating:        row.get(6)?,
      created_at:    row.get(7)?,
    })
  }

  pub fn into_feedback(self) -> Result<Feedback> {
    Ok(Feedback {
      id:            decode_uuid(&self.id)?,
      submission_id: decode_uuid(&self.submission_id)?,
      student_id:    decode_uuid(&self.student_id)?,
      faculty_id:    decode_uuid(&self.faculty_id)?,
      subject_id:    decode_uuid(&self.subject_id)?,
      text:          self.text,
      rating:        Rating::try_from(self.rating)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
