//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from SQLite. Note that these may differ from API-specific models: the
//! response types in `api::*::models` are assembled from these rows.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a string-backed enum stored as TEXT, serialized by its upper-case
/// name on the wire and in the database.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Comma separated list of every accepted value, for error messages.
            pub fn variants() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("'{}' is not a valid {}", other, stringify!($name))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|err: String| FromSqlError::Other(err.into()))
            }
        }
    };
}

text_enum!(UserRole {
    Student => "STUDENT",
    Faculty => "FACULTY",
    Authority => "AUTHORITY",
    Admin => "ADMIN",
});

text_enum!(GrievanceCategory {
    Infrastructure => "INFRASTRUCTURE",
    Academics => "ACADEMICS",
    Hostel => "HOSTEL",
    Food => "FOOD",
    Other => "OTHER",
});

text_enum!(Priority {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
    Urgent => "URGENT",
});

text_enum!(GrievanceStatus {
    Submitted => "SUBMITTED",
    UnderReview => "UNDER_REVIEW",
    InProgress => "IN_PROGRESS",
    Resolved => "RESOLVED",
});

text_enum!(ResourceType {
    Paper => "PAPER",
    Notes => "NOTES",
    Other => "OTHER",
});

text_enum!(OpportunityType {
    Research => "RESEARCH",
    Internship => "INTERNSHIP",
});

text_enum!(ApplicationStatus {
    Submitted => "SUBMITTED",
    UnderReview => "UNDER_REVIEW",
    Shortlisted => "SHORTLISTED",
    Accepted => "ACCEPTED",
    Rejected => "REJECTED",
});

text_enum!(TaskStatus {
    Pending => "PENDING",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
});

/// Reads a TEXT column holding a JSON array of strings.
fn string_list(row: &Row<'_>, column: &str) -> rusqlite::Result<Vec<String>> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text).map_err(|err| {
        let index = row.as_ref().column_index(column).unwrap_or_default();
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
    })
}

/// Encodes a string list for a JSON TEXT column.
pub fn encode_list(items: &[String]) -> String {
    serde_json::Value::from(items.to_vec()).to_string()
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub display_name: Option<String>,
    pub department: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            email: row.get("email")?,
            password_hash: row.get("password_hash")?,
            role: row.get("role")?,
            display_name: row.get("display_name")?,
            department: row.get("department")?,
            avatar_url: row.get("avatar_url")?,
            is_active: row.get("is_active")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Name shown to other users: display name, falling back to the email.
    pub fn public_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }
}

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: UserRole,
    pub display_name: Option<&'a str>,
    pub department: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct Grievance {
    pub id: String,
    pub submitter_id: Option<String>,
    pub category: GrievanceCategory,
    pub priority: Priority,
    pub location: String,
    pub title: String,
    pub description: String,
    pub status: GrievanceStatus,
    pub is_anonymous: bool,
    pub photos: Vec<String>,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Joined from `users`, present only when the submitter still exists.
    pub submitter_name: Option<String>,
}

impl Grievance {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            submitter_id: row.get("submitter_id")?,
            category: row.get("category")?,
            priority: row.get("priority")?,
            location: row.get("location")?,
            title: row.get("title")?,
            description: row.get("description")?,
            status: row.get("status")?,
            is_anonymous: row.get("is_anonymous")?,
            photos: string_list(row, "photos")?,
            assigned_to: row.get("assigned_to")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            submitter_name: row.get("submitter_name")?,
        })
    }
}

pub struct NewGrievance<'a> {
    pub submitter_id: Option<&'a str>,
    pub category: GrievanceCategory,
    pub priority: Priority,
    pub location: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub is_anonymous: bool,
}

#[derive(Debug, Clone)]
pub struct GrievanceUpdate {
    pub id: String,
    pub grievance_id: String,
    pub updated_by: String,
    pub status: GrievanceStatus,
    pub remark: String,
    pub created_at: DateTime<Utc>,
    pub updater_name: Option<String>,
}

impl GrievanceUpdate {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            grievance_id: row.get("grievance_id")?,
            updated_by: row.get("updated_by")?,
            status: row.get("status")?,
            remark: row.get("remark")?,
            created_at: row.get("created_at")?,
            updater_name: row.get("updater_name")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    pub credits: i64,
    pub semester: String,
    pub professor_id: Option<String>,
    pub department: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub professor_name: Option<String>,
    pub enrollment_count: i64,
}

impl Course {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            code: row.get("code")?,
            name: row.get("name")?,
            credits: row.get("credits")?,
            semester: row.get("semester")?,
            professor_id: row.get("professor_id")?,
            department: row.get("department")?,
            description: row.get("description")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            professor_name: row.get("professor_name")?,
            enrollment_count: row.get("enrollment_count")?,
        })
    }
}

pub struct NewCourse<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub credits: i64,
    pub semester: &'a str,
    pub professor_id: Option<&'a str>,
    pub department: &'a str,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct Enrollment {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub semester: String,
    pub attendance_count: i64,
    pub total_classes: i64,
    pub enrolled_at: DateTime<Utc>,
    pub course_name: String,
    pub course_code: String,
}

impl Enrollment {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            student_id: row.get("student_id")?,
            course_id: row.get("course_id")?,
            semester: row.get("semester")?,
            attendance_count: row.get("attendance_count")?,
            total_classes: row.get("total_classes")?,
            enrolled_at: row.get("enrolled_at")?,
            course_name: row.get("course_name")?,
            course_code: row.get("course_code")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Resource {
    pub id: String,
    pub course_id: String,
    pub uploader_id: String,
    pub resource_type: ResourceType,
    pub title: String,
    pub year: Option<i64>,
    pub exam_type: Option<String>,
    pub file_path: Option<String>,
    pub tags: Vec<String>,
    pub downloads: i64,
    pub created_at: DateTime<Utc>,
    pub uploader_name: Option<String>,
}

impl Resource {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            course_id: row.get("course_id")?,
            uploader_id: row.get("uploader_id")?,
            resource_type: row.get("type")?,
            title: row.get("title")?,
            year: row.get("year")?,
            exam_type: row.get("exam_type")?,
            file_path: row.get("file_path")?,
            tags: string_list(row, "tags")?,
            downloads: row.get("downloads")?,
            created_at: row.get("created_at")?,
            uploader_name: row.get("uploader_name")?,
        })
    }
}

pub struct NewResource<'a> {
    pub course_id: &'a str,
    pub uploader_id: &'a str,
    pub resource_type: ResourceType,
    pub title: &'a str,
    pub year: Option<i64>,
    pub exam_type: Option<&'a str>,
    pub file_path: Option<&'a str>,
    pub tags: &'a [String],
}

#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub id: String,
    pub course_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl CalendarEvent {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            course_id: row.get("course_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            event_type: row.get("event_type")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            created_by: row.get("created_by")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct NewCalendarEvent<'a> {
    pub course_id: Option<&'a str>,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub event_type: &'a str,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_by: &'a str,
}

#[derive(Debug, Clone)]
pub struct Opportunity {
    pub id: String,
    pub faculty_id: String,
    pub title: String,
    pub description: String,
    pub opportunity_type: OpportunityType,
    pub skills: Vec<String>,
    pub duration: String,
    pub stipend: Option<String>,
    pub deadline: NaiveDate,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub faculty_name: Option<String>,
}

impl Opportunity {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            faculty_id: row.get("faculty_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            opportunity_type: row.get("type")?,
            skills: string_list(row, "skills")?,
            duration: row.get("duration")?,
            stipend: row.get("stipend")?,
            deadline: row.get("deadline")?,
            is_open: row.get("is_open")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            faculty_name: row.get("faculty_name")?,
        })
    }

    /// True when any of `wanted` appears in the skill list, ignoring case.
    pub fn matches_any_skill(&self, wanted: &[String]) -> bool {
        wanted.is_empty()
            || wanted.iter().any(|w| {
                self.skills
                    .iter()
                    .any(|skill| skill.trim().eq_ignore_ascii_case(w.trim()))
            })
    }
}

pub struct NewOpportunity<'a> {
    pub faculty_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub opportunity_type: OpportunityType,
    pub skills: &'a [String],
    pub duration: &'a str,
    pub stipend: Option<&'a str>,
    pub deadline: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct Application {
    pub id: String,
    pub opportunity_id: String,
    pub student_id: String,
    pub status: ApplicationStatus,
    pub resume_path: Option<String>,
    pub cover_letter: String,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub opportunity_title: String,
    pub opportunity_owner_id: String,
    pub student_name: Option<String>,
}

impl Application {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            opportunity_id: row.get("opportunity_id")?,
            student_id: row.get("student_id")?,
            status: row.get("status")?,
            resume_path: row.get("resume_path")?,
            cover_letter: row.get("cover_letter")?,
            applied_at: row.get("applied_at")?,
            updated_at: row.get("updated_at")?,
            opportunity_title: row.get("opportunity_title")?,
            opportunity_owner_id: row.get("opportunity_owner_id")?,
            student_name: row.get("student_name")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub student_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub deadline: Option<NaiveDate>,
    pub status: TaskStatus,
    pub progress: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            student_id: row.get("student_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            category: row.get("category")?,
            deadline: row.get("deadline")?,
            status: row.get("status")?,
            progress: row.get("progress")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct NewTask<'a> {
    pub student_id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub category: &'a str,
    pub deadline: Option<NaiveDate>,
}

/// Partial update of a task; `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub progress: Option<i64>,
}
