//! App and loader tests against an in-memory datastore.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicUsize, Ordering},
};

use anyhow::{Result, bail};
use campus_core::{
  Rating,
  model::{
    FacultyMember, FacultyUser, Feedback, NewFeedback, Student, Subject, User, UserRole,
  },
};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::{
  app::{App, Focus},
  client::Datastore,
  form::ToastKind,
  loader,
};

// ─── Test double ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Mock {
  student:       Option<Student>,
  subjects:      Vec<Subject>,
  faculty:       Vec<FacultyMember>,
  fail_student:  bool,
  fail_subjects: bool,
  fail_faculty:  bool,
  /// Error returned by the next insert, then cleared.
  insert_error:  Mutex<Option<String>>,
  /// When set, inserts wait for a notification before completing.
  gate:          Option<Arc<Notify>>,
  inserts:       Mutex<Vec<NewFeedback>>,
  list_calls:    AtomicUsize,
}

impl Datastore for Mock {
  async fn current_student(&self) -> Result<Option<Student>> {
    if self.fail_student {
      bail!("student lookup refused");
    }
    Ok(self.student.clone())
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_subjects {
      bail!("subjects unavailable");
    }
    Ok(self.subjects.clone())
  }

  async fn list_faculty(&self) -> Result<Vec<FacultyMember>> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_faculty {
      bail!("faculty unavailable");
    }
    Ok(self.faculty.clone())
  }

  async fn insert_feedback(&self, input: NewFeedback) -> Result<Feedback> {
    if let Some(gate) = &self.gate {
      gate.notified().await;
    }
    let failure = self.insert_error.lock().unwrap().take();
    if let Some(message) = failure {
      bail!(message);
    }
    self.inserts.lock().unwrap().push(input.clone());
    Ok(Feedback {
      id:            Uuid::new_v4(),
      submission_id: input.submission_id,
      student_id:    input.student_id,
      faculty_id:    input.faculty_id,
      subject_id:    input.subject_id,
      text:          input.text,
      rating:        input.rating,
      created_at:    Utc::now(),
    })
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn user() -> User {
  User {
    id:         Uuid::new_v4(),
    email:      "sam@example.edu".into(),
    name:       Some("Sam".into()),
    role:       UserRole::Student,
    created_at: Utc::now(),
  }
}

fn student() -> Student {
  Student {
    id:         Uuid::new_v4(),
    user_id:    Uuid::new_v4(),
    department: Some("CS".into()),
    year:       Some(2),
    skills:     None,
    category:   None,
    created_at: Utc::now(),
  }
}

fn subject(name: &str, code: &str) -> Subject {
  Subject { id: Uuid::new_v4(), name: name.into(), code: code.into() }
}

fn member(name: Option<&str>) -> FacultyMember {
  FacultyMember {
    id:   Uuid::new_v4(),
    user: FacultyUser { id: Uuid::new_v4(), name: name.map(str::to_owned) },
  }
}

fn populated() -> Mock {
  Mock {
    student: Some(student()),
    subjects: vec![subject("Algorithms", "CS301")],
    faculty: vec![member(Some("Dr. Lee"))],
    ..Mock::default()
  }
}

/// An app that has finished loading.
async fn loaded(mock: Mock) -> (Arc<Mock>, App<Mock>) {
  let mock = Arc::new(mock);
  let mut app = App::new(Arc::clone(&mock));
  app.start(Some(user()));
  app.wait().await;
  assert!(!app.loading);
  (mock, app)
}

fn fill(app: &mut App<Mock>) {
  let subject_id = app.reference.subjects[0].id;
  let faculty_id = app.reference.faculty[0].id;
  app.form.select_subject(subject_id);
  app.form.select_faculty(faculty_id);
  app.form.set_text("Great course");
}

fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

fn ctrl(c: char) -> KeyEvent { KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL) }

// ─── Submission flow ─────────────────────────────────────────────────────────

#[tokio::test]
async fn successful_submission_resets_form() {
  let (mock, mut app) = loaded(populated()).await;
  let student_id = app.reference.student_id.unwrap();
  fill(&mut app);

  app.submit();
  assert!(app.form.is_submitting());
  app.wait().await;

  let inserts = mock.inserts.lock().unwrap().clone();
  assert_eq!(inserts.len(), 1);
  assert_eq!(inserts[0].student_id, student_id);
  assert_eq!(inserts[0].subject_id, app.reference.subjects[0].id);
  assert_eq!(inserts[0].faculty_id, app.reference.faculty[0].id);
  assert_eq!(inserts[0].text, "Great course");
  assert_eq!(inserts[0].rating.get(), 5);

  let toast = &app.toast.as_ref().unwrap().toast;
  assert_eq!(toast.title, "Feedback submitted");
  assert_eq!(toast.description, "Thank you for your feedback!");
  assert_eq!(toast.kind, ToastKind::Default);

  assert_eq!(app.form.subject_id, None);
  assert_eq!(app.form.faculty_id, None);
  assert_eq!(app.form.text, "");
  assert_eq!(app.form.rating.get(), 5);
  assert!(!app.form.is_submitting());
}

#[tokio::test]
async fn missing_text_never_reaches_datastore() {
  let (mock, mut app) = loaded(populated()).await;
  fill(&mut app);
  app.form.set_text("");

  app.submit();
  tokio::task::yield_now().await;

  assert!(!app.form.is_submitting());
  assert!(mock.inserts.lock().unwrap().is_empty());
  let toast = &app.toast.as_ref().unwrap().toast;
  assert_eq!(toast.title, "Missing fields");
  assert_eq!(toast.description, "Please fill in all required fields");
  assert_eq!(toast.kind, ToastKind::Destructive);
}

#[tokio::test]
async fn whitespace_only_text_counts_as_missing() {
  let (mock, mut app) = loaded(populated()).await;
  fill(&mut app);
  app.form.set_text(" ");

  app.submit();
  tokio::task::yield_now().await;

  assert!(!app.form.is_submitting());
  assert!(mock.inserts.lock().unwrap().is_empty());
  assert_eq!(app.toast.as_ref().unwrap().toast.title, "Missing fields");
}

#[tokio::test]
async fn failed_insert_keeps_fields_for_retry() {
  let mock = populated();
  *mock.insert_error.lock().unwrap() = Some("network error".into());
  let (mock, mut app) = loaded(mock).await;
  fill(&mut app);
  app.form.set_rating(Rating::new(3).unwrap());

  app.submit();
  app.wait().await;

  let toast = &app.toast.as_ref().unwrap().toast;
  assert_eq!(toast.title, "Error submitting feedback");
  assert_eq!(toast.description, "network error");
  assert_eq!(toast.kind, ToastKind::Destructive);
  assert_eq!(app.form.text, "Great course");
  assert_eq!(app.form.rating.get(), 3);
  assert!(!app.form.is_submitting());
  assert!(mock.inserts.lock().unwrap().is_empty());

  // An unchanged retry carries the same submission id.
  let token = app.form.submission_id().unwrap();
  app.submit();
  app.wait().await;
  let inserts = mock.inserts.lock().unwrap().clone();
  assert_eq!(inserts.len(), 1);
  assert_eq!(inserts[0].submission_id, token);
}

#[tokio::test]
async fn no_student_profile_blocks_submission() {
  let (mock, mut app) = loaded(Mock { student: None, ..populated() }).await;
  assert_eq!(app.reference.student_id, None);
  assert!(app.reference.subjects.is_empty());
  assert_eq!(mock.list_calls.load(Ordering::SeqCst), 0);

  app.form.select_subject(Uuid::new_v4());
  app.form.select_faculty(Uuid::new_v4());
  app.form.set_text("Great course");
  app.submit();

  let toast = &app.toast.as_ref().unwrap().toast;
  assert_eq!(toast.title, "Error");
  assert_eq!(toast.description, "Student profile not found");
  assert!(!app.form.is_submitting());
  assert!(mock.inserts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn repeated_submit_while_in_flight_inserts_once() {
  let gate = Arc::new(Notify::new());
  let (mock, mut app) = loaded(Mock { gate: Some(Arc::clone(&gate)), ..populated() }).await;
  fill(&mut app);

  assert!(app.handle_key(ctrl('s')));
  assert!(app.handle_key(ctrl('s')));
  app.submit();
  assert!(app.form.is_submitting());
  assert!(app.toast.is_none());

  gate.notify_one();
  app.wait().await;
  tokio::task::yield_now().await;

  assert_eq!(mock.inserts.lock().unwrap().len(), 1);
  assert_eq!(app.toast.as_ref().unwrap().toast.title, "Feedback submitted");
}

// ─── Loading ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn without_a_user_nothing_loads() {
  let mock = Arc::new(populated());
  let mut app = App::new(Arc::clone(&mock));
  app.start(None);
  tokio::task::yield_now().await;
  app.poll();

  assert!(app.loading);
  assert_eq!(app.in_flight(), 0);
  assert_eq!(mock.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn list_failures_degrade_to_empty() {
  let (_mock, app) =
    loaded(Mock { fail_subjects: true, fail_faculty: true, ..populated() }).await;
  assert!(app.reference.student_id.is_some());
  assert!(app.reference.subjects.is_empty());
  assert!(app.reference.faculty.is_empty());
}

#[tokio::test]
async fn student_lookup_failure_means_no_student() {
  let (mock, app) = loaded(Mock { fail_student: true, ..populated() }).await;
  assert_eq!(app.reference, loader::ReferenceData::default());
  assert_eq!(mock.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn lists_are_sorted_and_loading_is_idempotent() {
  let mock = Mock {
    student: Some(student()),
    subjects: vec![subject("Zoology", "BI200"), subject("Algebra", "MA101")],
    faculty: vec![member(None), member(Some("Dr. Zed")), member(Some("Dr. Adams"))],
    ..Mock::default()
  };

  let first = loader::load(&mock).await;
  let names: Vec<_> = first.subjects.iter().map(|s| s.name.as_str()).collect();
  assert_eq!(names, ["Algebra", "Zoology"]);
  let faculty: Vec<_> = first.faculty.iter().map(|m| m.display_name()).collect();
  assert_eq!(faculty, ["Dr. Adams", "Dr. Zed", "—"]);

  let second = loader::load(&mock).await;
  assert_eq!(first, second);
}

// ─── Keys ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rating_keys_select_absolute_values() {
  let (_mock, mut app) = loaded(populated()).await;
  while app.focus != Focus::Rating {
    app.handle_key(key(KeyCode::Tab));
  }

  app.handle_key(key(KeyCode::Char('2')));
  assert_eq!(app.form.rating.get(), 2);
  app.handle_key(key(KeyCode::Left));
  app.handle_key(key(KeyCode::Left));
  assert_eq!(app.form.rating.get(), 1);
  for _ in 0..6 {
    app.handle_key(key(KeyCode::Right));
  }
  assert_eq!(app.form.rating.get(), 5);
}

#[tokio::test]
async fn picker_selects_from_loaded_list() {
  let mock = Mock {
    subjects: vec![subject("Algorithms", "CS301"), subject("Databases", "CS310")],
    ..populated()
  };
  let (_mock, mut app) = loaded(mock).await;
  assert_eq!(app.focus, Focus::Subject);

  app.handle_key(key(KeyCode::Enter));
  assert!(app.picker.is_some());
  app.handle_key(key(KeyCode::Down));
  app.handle_key(key(KeyCode::Enter));

  assert!(app.picker.is_none());
  assert_eq!(app.form.subject_id, Some(app.reference.subjects[1].id));
}

#[tokio::test]
async fn typing_in_text_field_does_not_quit() {
  let (_mock, mut app) = loaded(populated()).await;
  app.focus = Focus::Text;
  for c in "quit".chars() {
    assert!(app.handle_key(key(KeyCode::Char(c))));
  }
  app.handle_key(key(KeyCode::Backspace));
  assert_eq!(app.form.text, "qui");
  assert!(!app.handle_key(ctrl('c')));
}

#[tokio::test]
async fn escape_in_text_field_leaves_the_field_without_quitting() {
  let (_mock, mut app) = loaded(populated()).await;
  app.focus = Focus::Text;
  for c in "Great".chars() {
    app.handle_key(key(KeyCode::Char(c)));
  }

  assert!(app.handle_key(key(KeyCode::Esc)));
  assert_eq!(app.focus, Focus::Rating);
  assert_eq!(app.form.text, "Great");

  // Outside the text field Esc still quits.
  assert!(!app.handle_key(key(KeyCode::Esc)));
}

// ─── Teardown ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dropping_the_app_aborts_in_flight_work() {
  let gate = Arc::new(Notify::new());
  let (mock, mut app) = loaded(Mock { gate: Some(gate), ..populated() }).await;
  fill(&mut app);
  app.submit();
  tokio::task::yield_now().await;
  assert!(Arc::strong_count(&mock) > 2);

  drop(app);
  for _ in 0..10 {
    if Arc::strong_count(&mock) == 1 {
      break;
    }
    tokio::task::yield_now().await;
  }
  assert_eq!(Arc::strong_count(&mock), 1);
  assert!(mock.inserts.lock().unwrap().is_empty());
}
