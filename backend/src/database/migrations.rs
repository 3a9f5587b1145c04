//! Schema migrations for the platform database.
//!
//! The schema version lives in SQLite's `user_version` pragma. `upgrade` walks
//! the database forward one version at a time until it reaches
//! `REQUIRED_VERSION`, so every open brings an older file up to date.

use rusqlite::Connection;
use thiserror::Error;
use tracing::info;

pub type DbVersion = u32;

pub const REQUIRED_VERSION: DbVersion = 2;
const PRAGMA_USER_VERSION: &str = "user_version";

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("cannot read or write the schema version: {0}")]
    Version(#[source] rusqlite::Error),

    #[error("no migration known from schema version {0}")]
    UnknownVersion(DbVersion),

    #[error("migration statement failed: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// Brings the connection up to `REQUIRED_VERSION`. Each step runs in its own
/// transaction together with the version bump.
pub fn upgrade(conn: &mut Connection) -> Result<DbVersion, MigrationError> {
    loop {
        let current = read_version(conn)?;
        if current >= REQUIRED_VERSION {
            return Ok(current);
        }

        let tx = conn.transaction()?;
        migrate_up_from(&tx, current)?;
        write_version(&tx, current + 1)?;
        tx.commit()?;
        info!(from = current, to = current + 1, "migrated database schema");
    }
}

fn migrate_up_from(conn: &Connection, version: DbVersion) -> Result<(), MigrationError> {
    match version {
        0 => conn.execute_batch(VERSION_001)?,
        1 => conn.execute_batch(VERSION_002)?,
        _ => return Err(MigrationError::UnknownVersion(version)),
    }
    Ok(())
}

pub fn read_version(conn: &Connection) -> Result<DbVersion, MigrationError> {
    conn.pragma_query_value(None, PRAGMA_USER_VERSION, |row| row.get(0))
        .map_err(MigrationError::Version)
}

pub fn write_version(conn: &Connection, version: DbVersion) -> Result<(), MigrationError> {
    conn.pragma_update(None, PRAGMA_USER_VERSION, version)
        .map_err(MigrationError::Version)
}

// Core tables for the four domains. Ids are UUID strings, timestamps are
// chrono's TEXT encoding, string lists are JSON arrays.
const VERSION_001: &str = "
CREATE TABLE users(
    id              TEXT PRIMARY KEY NOT NULL,
    email           TEXT NOT NULL UNIQUE,
    password_hash   TEXT NOT NULL,
    role            TEXT NOT NULL DEFAULT 'STUDENT',
    display_name    TEXT,
    department      TEXT,
    avatar_url      TEXT,
    is_active       INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE grievances(
    id              TEXT PRIMARY KEY NOT NULL,
    submitter_id    TEXT REFERENCES users(id) ON DELETE SET NULL,
    category        TEXT NOT NULL,
    priority        TEXT NOT NULL,
    location        TEXT NOT NULL,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'SUBMITTED',
    is_anonymous    INTEGER NOT NULL DEFAULT 0,
    photos          TEXT NOT NULL DEFAULT '[]',
    assigned_to     TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
CREATE INDEX grievances_created_at ON grievances(created_at);

CREATE TABLE grievance_updates(
    id              TEXT PRIMARY KEY NOT NULL,
    grievance_id    TEXT NOT NULL REFERENCES grievances(id) ON DELETE CASCADE,
    updated_by      TEXT NOT NULL,
    status          TEXT NOT NULL,
    remark          TEXT NOT NULL,
    created_at      TEXT NOT NULL
);
CREATE INDEX grievance_updates_grievance ON grievance_updates(grievance_id);

CREATE TABLE courses(
    id              TEXT PRIMARY KEY NOT NULL,
    code            TEXT NOT NULL UNIQUE,
    name            TEXT NOT NULL,
    credits         INTEGER NOT NULL,
    semester        TEXT NOT NULL,
    professor_id    TEXT REFERENCES users(id) ON DELETE SET NULL,
    department      TEXT NOT NULL,
    description     TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE enrollments(
    id                  TEXT PRIMARY KEY NOT NULL,
    student_id          TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    course_id           TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    semester            TEXT NOT NULL,
    attendance_count    INTEGER NOT NULL DEFAULT 0,
    total_classes       INTEGER NOT NULL DEFAULT 0,
    enrolled_at         TEXT NOT NULL,
    UNIQUE(student_id, course_id)
);

CREATE TABLE resources(
    id              TEXT PRIMARY KEY NOT NULL,
    course_id       TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    uploader_id     TEXT NOT NULL,
    type            TEXT NOT NULL,
    title           TEXT NOT NULL,
    year            INTEGER,
    exam_type       TEXT,
    file_path       TEXT,
    tags            TEXT NOT NULL DEFAULT '[]',
    downloads       INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE TABLE calendar_events(
    id              TEXT PRIMARY KEY NOT NULL,
    course_id       TEXT REFERENCES courses(id) ON DELETE CASCADE,
    title           TEXT NOT NULL,
    description     TEXT,
    event_type      TEXT NOT NULL,
    start_date      TEXT NOT NULL,
    end_date        TEXT,
    created_by      TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE TABLE opportunities(
    id              TEXT PRIMARY KEY NOT NULL,
    faculty_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL,
    type            TEXT NOT NULL DEFAULT 'RESEARCH',
    skills          TEXT NOT NULL DEFAULT '[]',
    duration        TEXT NOT NULL,
    stipend         TEXT,
    deadline        TEXT NOT NULL,
    is_open         INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE applications(
    id              TEXT PRIMARY KEY NOT NULL,
    opportunity_id  TEXT NOT NULL REFERENCES opportunities(id) ON DELETE CASCADE,
    student_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    status          TEXT NOT NULL DEFAULT 'SUBMITTED',
    resume_path     TEXT,
    cover_letter    TEXT NOT NULL,
    applied_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE(opportunity_id, student_id)
);

CREATE TABLE tasks(
    id              TEXT PRIMARY KEY NOT NULL,
    student_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title           TEXT NOT NULL,
    description     TEXT,
    category        TEXT NOT NULL,
    deadline        TEXT,
    status          TEXT NOT NULL DEFAULT 'PENDING',
    progress        INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
";

// Refresh tokens revoked by logout or rotation, kept until they would have
// expired anyway.
const VERSION_002: &str = "
CREATE TABLE revoked_tokens(
    jti             TEXT PRIMARY KEY NOT NULL,
    expires_at      INTEGER NOT NULL
);
";
