//! SQL schema for the campus SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    name          TEXT,
    role          TEXT NOT NULL CHECK (role IN ('student', 'faculty', 'admin')),
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL UNIQUE REFERENCES users(id),
    department TEXT,
    year       INTEGER,
    skills     TEXT,            -- JSON object: skill name -> score
    category   TEXT CHECK (category IN ('Explorer', 'Doer', 'Achiever')),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS faculty (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL UNIQUE REFERENCES users(id),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subjects (
    id   TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    code TEXT NOT NULL UNIQUE
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS feedback (
    id            TEXT PRIMARY KEY,
    submission_id TEXT NOT NULL UNIQUE,
    student_id    TEXT NOT NULL REFERENCES students(id),
    faculty_id    TEXT NOT NULL REFERENCES faculty(id),
    subject_id    TEXT NOT NULL REFERENCES subjects(id),
    text          TEXT NOT NULL,
    rating        INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS subjects_name_idx     ON subjects(name);
CREATE INDEX IF NOT EXISTS feedback_student_idx  ON feedback(student_id);

PRAGMA user_version = 1;
";
