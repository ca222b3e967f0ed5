//! Integration tests for `SqliteStore` against an in-memory database.

use campus_core::{
  Rating,
  model::{NewFeedback, NewStudent, NewSubject, NewUser, Student, StudentCategory, UserRole},
  store::{CampusStore, StoreError},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, email: &str, name: Option<&str>, role: UserRole) -> Uuid {
  s.add_user(
    NewUser { email: email.into(), name: name.map(str::to_owned), role },
    "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
  )
  .await
  .unwrap()
  .id
}

async fn student(s: &SqliteStore, email: &str) -> (Uuid, Student) {
  let user_id = user(s, email, Some("Stu Dent"), UserRole::Student).await;
  let student = s
    .add_student(NewStudent {
      user_id,
      department: Some("CS".into()),
      year: Some(3),
      skills: Some([("rust".to_owned(), 4.5)].into_iter().collect()),
      category: Some(StudentCategory::Doer),
    })
    .await
    .unwrap();
  (user_id, student)
}

struct Fixture {
  store:      SqliteStore,
  user_id:    Uuid,
  student_id: Uuid,
  faculty_id: Uuid,
  subject_id: Uuid,
}

async fn fixture() -> Fixture {
  let s = store().await;
  let (user_id, st) = student(&s, "stu@example.edu").await;
  let lee = user(&s, "lee@example.edu", Some("Dr. Lee"), UserRole::Faculty).await;
  let faculty = s.add_faculty(lee).await.unwrap();
  let subject = s
    .add_subject(NewSubject { name: "Algorithms".into(), code: "CS301".into() })
    .await
    .unwrap();
  Fixture {
    store: s,
    user_id,
    student_id: st.id,
    faculty_id: faculty.id,
    subject_id: subject.id,
  }
}

fn feedback(f: &Fixture) -> NewFeedback {
  NewFeedback {
    submission_id: Uuid::new_v4(),
    student_id:    f.student_id,
    faculty_id:    f.faculty_id,
    subject_id:    f.subject_id,
    text:          "Great course".into(),
    rating:        Rating::default(),
  }
}

fn core_error(e: &Error) -> &campus_core::Error {
  e.core().expect("core error")
}

// ─── Identity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_user_by_email_is_case_insensitive() {
  let s = store().await;
  let id = user(&s, "Alice@Example.edu", Some("Alice"), UserRole::Student).await;

  let creds = s.find_user_by_email("alice@example.edu").await.unwrap().unwrap();
  assert_eq!(creds.user.id, id);
  assert_eq!(creds.user.role, UserRole::Student);
  assert!(creds.password_hash.starts_with("$argon2id$"));

  assert!(s.find_user_by_email("nobody@example.edu").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  user(&s, "a@example.edu", None, UserRole::Admin).await;
  let err = s
    .add_user(
      NewUser { email: "A@example.edu".into(), name: None, role: UserRole::Admin },
      "hash".into(),
    )
    .await
    .unwrap_err();
  assert!(matches!(core_error(&err), campus_core::Error::DuplicateEmail(_)));
}

#[tokio::test]
async fn student_lookup_by_user() {
  let s = store().await;
  let (user_id, st) = student(&s, "stu@example.edu").await;

  let found = s.find_student_by_user(user_id).await.unwrap().unwrap();
  assert_eq!(found, st);
  assert_eq!(found.skills.unwrap().get("rust"), Some(&4.5));

  let lonely = user(&s, "lonely@example.edu", None, UserRole::Student).await;
  assert!(s.find_student_by_user(lonely).await.unwrap().is_none());
}

#[tokio::test]
async fn student_for_missing_user_fails() {
  let s = store().await;
  let err = s
    .add_student(NewStudent {
      user_id:    Uuid::new_v4(),
      department: None,
      year:       None,
      skills:     None,
      category:   None,
    })
    .await
    .unwrap_err();
  assert!(matches!(core_error(&err), campus_core::Error::UserNotFound(_)));
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn subjects_ordered_by_name() {
  let s = store().await;
  for (name, code) in [("Databases", "CS340"), ("Algorithms", "CS301"), ("Compilers", "CS420")] {
    s.add_subject(NewSubject { name: name.into(), code: code.into() }).await.unwrap();
  }

  let names: Vec<_> = s.list_subjects().await.unwrap().into_iter().map(|s| s.name).collect();
  assert_eq!(names, vec!["Algorithms", "Compilers", "Databases"]);

  let again: Vec<_> = s.list_subjects().await.unwrap().into_iter().map(|s| s.name).collect();
  assert_eq!(names, again);
}

#[tokio::test]
async fn faculty_ordered_by_display_name() {
  let s = store().await;
  for (email, name) in [
    ("z@example.edu", Some("Dr. Zhou")),
    ("n@example.edu", None),
    ("a@example.edu", Some("Dr. Adams")),
  ] {
    let id = user(&s, email, name, UserRole::Faculty).await;
    s.add_faculty(id).await.unwrap();
  }

  let faculty = s.list_faculty().await.unwrap();
  let names: Vec<_> = faculty.iter().map(|f| f.user.name.clone()).collect();
  assert_eq!(names, vec![Some("Dr. Adams".into()), Some("Dr. Zhou".into()), None]);
}

// ─── Feedback ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_feedback_stores_form_values() {
  let f = fixture().await;
  let input = feedback(&f);

  let stored = f.store.add_feedback(f.user_id, input.clone()).await.unwrap();
  assert_eq!(stored.student_id, f.student_id);
  assert_eq!(stored.faculty_id, f.faculty_id);
  assert_eq!(stored.subject_id, f.subject_id);
  assert_eq!(stored.text, "Great course");
  assert_eq!(stored.rating.get(), 5);
  assert_eq!(stored.submission_id, input.submission_id);
}

#[tokio::test]
async fn repeated_submission_id_stores_one_row() {
  let f = fixture().await;
  let input = feedback(&f);

  let first = f.store.add_feedback(f.user_id, input.clone()).await.unwrap();
  let second = f.store.add_feedback(f.user_id, input).await.unwrap();
  assert_eq!(first, second);

  let count: i64 = f
    .store
    .conn_for_tests()
    .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM feedback", [], |r| r.get(0))?))
    .await
    .unwrap();
  assert_eq!(count, 1);
}

#[tokio::test]
async fn reused_submission_id_with_new_content_conflicts() {
  let f = fixture().await;
  let input = feedback(&f);
  f.store.add_feedback(f.user_id, input.clone()).await.unwrap();

  let mut changed = input.clone();
  changed.text = "Completely different feedback".into();
  changed.rating = Rating::new(1).unwrap();
  let err = f.store.add_feedback(f.user_id, changed).await.unwrap_err();
  assert!(matches!(
    core_error(&err),
    campus_core::Error::SubmissionConflict { submission_id } if *submission_id == input.submission_id
  ));

  let (text, rating): (String, i64) = f
    .store
    .conn_for_tests()
    .call(|conn| {
      Ok(conn.query_row("SELECT text, rating FROM feedback", [], |r| {
        Ok((r.get(0)?, r.get(1)?))
      })?)
    })
    .await
    .unwrap();
  assert_eq!(text, "Great course");
  assert_eq!(rating, 5);
}

#[tokio::test]
async fn feedback_under_another_users_student_is_rejected() {
  let f = fixture().await;
  let (intruder, _) = student(&f.store, "other@example.edu").await;

  let err = f.store.add_feedback(intruder, feedback(&f)).await.unwrap_err();
  assert!(matches!(core_error(&err), campus_core::Error::NotOwner { .. }));
}

#[tokio::test]
async fn unknown_faculty_or_subject_is_rejected() {
  let f = fixture().await;

  let mut input = feedback(&f);
  input.faculty_id = Uuid::new_v4();
  let err = f.store.add_feedback(f.user_id, input).await.unwrap_err();
  assert!(matches!(core_error(&err), campus_core::Error::FacultyNotFound(_)));

  let mut input = feedback(&f);
  input.subject_id = Uuid::new_v4();
  let err = f.store.add_feedback(f.user_id, input).await.unwrap_err();
  assert!(matches!(core_error(&err), campus_core::Error::SubjectNotFound(_)));
}

#[tokio::test]
async fn blank_text_is_rejected() {
  let f = fixture().await;
  let mut input = feedback(&f);
  input.text = "  ".into();
  let err = f.store.add_feedback(f.user_id, input).await.unwrap_err();
  assert!(matches!(core_error(&err), campus_core::Error::EmptyText));
}
