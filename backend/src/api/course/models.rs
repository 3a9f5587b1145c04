use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::{CalendarEvent, Course, Enrollment, Resource, ResourceType};

#[derive(Debug, Deserialize)]
pub struct CourseCreate {
    pub code: String,
    pub name: String,
    pub credits: i64,
    pub semester: String,
    pub department: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CourseQuery {
    pub department: Option<String>,
    pub semester: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub credits: i64,
    pub semester: String,
    pub department: String,
    pub description: Option<String>,
    pub professor_id: Option<String>,
    pub professor_name: Option<String>,
    pub enrollment_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            code: course.code,
            name: course.name,
            credits: course.credits,
            semester: course.semester,
            department: course.department,
            description: course.description,
            professor_id: course.professor_id,
            professor_name: course.professor_name,
            enrollment_count: course.enrollment_count,
            created_at: course.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    pub id: String,
    pub course_id: String,
    pub course_name: String,
    pub course_code: String,
    pub semester: String,
    pub attendance_count: i64,
    pub total_classes: i64,
    pub enrolled_at: DateTime<Utc>,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id,
            course_id: enrollment.course_id,
            course_name: enrollment.course_name,
            course_code: enrollment.course_code,
            semester: enrollment.semester,
            attendance_count: enrollment.attendance_count,
            total_classes: enrollment.total_classes,
            enrolled_at: enrollment.enrolled_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResourceCreate {
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub year: Option<i64>,
    pub exam_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub resource_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub id: String,
    pub course_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub year: Option<i64>,
    pub exam_type: Option<String>,
    pub file_path: Option<String>,
    pub tags: Vec<String>,
    pub downloads: i64,
    pub uploader_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Resource> for ResourceResponse {
    fn from(resource: Resource) -> Self {
        Self {
            id: resource.id,
            course_id: resource.course_id,
            title: resource.title,
            resource_type: resource.resource_type,
            year: resource.year,
            exam_type: resource.exam_type,
            file_path: resource.file_path,
            tags: resource.tags,
            downloads: resource.downloads,
            uploader_name: resource.uploader_name.unwrap_or_else(|| "Unknown".to_string()),
            created_at: resource.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CalendarEventCreate {
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CalendarEventResponse {
    pub id: String,
    pub course_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_by: String,
}

impl From<CalendarEvent> for CalendarEventResponse {
    fn from(event: CalendarEvent) -> Self {
        Self {
            id: event.id,
            course_id: event.course_id,
            title: event.title,
            description: event.description,
            event_type: event.event_type,
            start_date: event.start_date,
            end_date: event.end_date,
            created_by: event.created_by,
        }
    }
}
