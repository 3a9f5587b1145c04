use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::{new_id, now, Page};
use crate::database::models::{
    encode_list, CalendarEvent, Course, Enrollment, NewCalendarEvent, NewCourse, NewResource,
    Resource, ResourceType,
};

const COURSE_SELECT: &str = "
    SELECT c.*,
           p.display_name AS professor_name,
           (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS enrollment_count
    FROM courses c
    LEFT JOIN users p ON p.id = c.professor_id";

const RESOURCE_SELECT: &str = "
    SELECT r.*, u.display_name AS uploader_name
    FROM resources r
    LEFT JOIN users u ON u.id = r.uploader_id";

const ENROLLMENT_SELECT: &str = "
    SELECT e.*, c.name AS course_name, c.code AS course_code
    FROM enrollments e
    JOIN courses c ON c.id = e.course_id";

#[derive(Debug, Default, Clone)]
pub struct CourseFilter<'a> {
    pub department: Option<&'a str>,
    pub semester: Option<&'a str>,
    pub page: Page,
}

pub fn insert_course(conn: &Connection, new: &NewCourse<'_>) -> rusqlite::Result<Course> {
    let id = new_id();
    let created_at = now();
    conn.execute(
        "INSERT INTO courses(id, code, name, credits, semester, professor_id, department,
                             description, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            id,
            new.code,
            new.name,
            new.credits,
            new.semester,
            new.professor_id,
            new.department,
            new.description,
            created_at
        ],
    )?;
    find_course(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn find_course(conn: &Connection, id: &str) -> rusqlite::Result<Option<Course>> {
    conn.query_row(
        &format!("{COURSE_SELECT} WHERE c.id = ?1"),
        [id],
        Course::from_row,
    )
    .optional()
}

pub fn course_code_exists(conn: &Connection, code: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM courses WHERE code = ?1)",
        [code],
        |row| row.get(0),
    )
}

pub fn list_courses(conn: &Connection, filter: &CourseFilter<'_>) -> rusqlite::Result<Vec<Course>> {
    let mut clauses = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(department) = filter.department {
        values.push(Value::Text(department.to_string()));
        clauses.push(format!("c.department = ?{}", values.len()));
    }
    if let Some(semester) = filter.semester {
        values.push(Value::Text(semester.to_string()));
        clauses.push(format!("c.semester = ?{}", values.len()));
    }

    let mut sql = COURSE_SELECT.to_string();
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    values.push(Value::Integer(filter.page.limit));
    values.push(Value::Integer(filter.page.skip));
    sql.push_str(&format!(
        " ORDER BY c.code LIMIT ?{} OFFSET ?{}",
        values.len() - 1,
        values.len()
    ));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), Course::from_row)?;
    rows.collect()
}

pub fn is_enrolled(conn: &Connection, student_id: &str, course_id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = ?1 AND course_id = ?2)",
        [student_id, course_id],
        |row| row.get(0),
    )
}

/// Enrolls the student for the course's current semester.
pub fn insert_enrollment(
    conn: &Connection,
    student_id: &str,
    course: &Course,
) -> rusqlite::Result<Enrollment> {
    let id = new_id();
    conn.execute(
        "INSERT INTO enrollments(id, student_id, course_id, semester, attendance_count,
                                 total_classes, enrolled_at)
         VALUES (?1, ?2, ?3, ?4, 0, 0, ?5)",
        params![id, student_id, course.id, course.semester, now()],
    )?;
    conn.query_row(
        &format!("{ENROLLMENT_SELECT} WHERE e.id = ?1"),
        [&id],
        Enrollment::from_row,
    )
}

pub fn record_attendance(
    conn: &Connection,
    enrollment_id: &str,
    attended: i64,
    total: i64,
) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE enrollments SET attendance_count = ?2, total_classes = ?3 WHERE id = ?1",
        params![enrollment_id, attended, total],
    )?;
    Ok(changed > 0)
}

pub fn enrollments_for_student(
    conn: &Connection,
    student_id: &str,
) -> rusqlite::Result<Vec<Enrollment>> {
    let mut stmt = conn.prepare(&format!(
        "{ENROLLMENT_SELECT} WHERE e.student_id = ?1 ORDER BY e.enrolled_at, e.rowid"
    ))?;
    let rows = stmt.query_map([student_id], Enrollment::from_row)?;
    rows.collect()
}

pub fn insert_resource(conn: &Connection, new: &NewResource<'_>) -> rusqlite::Result<Resource> {
    let id = new_id();
    conn.execute(
        "INSERT INTO resources(id, course_id, uploader_id, type, title, year, exam_type,
                               file_path, tags, downloads, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10)",
        params![
            id,
            new.course_id,
            new.uploader_id,
            new.resource_type,
            new.title,
            new.year,
            new.exam_type,
            new.file_path,
            encode_list(new.tags),
            now()
        ],
    )?;
    conn.query_row(
        &format!("{RESOURCE_SELECT} WHERE r.id = ?1"),
        [&id],
        Resource::from_row,
    )
}

/// Newest first, optionally restricted to one resource type.
pub fn list_resources(
    conn: &Connection,
    course_id: &str,
    resource_type: Option<ResourceType>,
) -> rusqlite::Result<Vec<Resource>> {
    let mut stmt = conn.prepare(&format!(
        "{RESOURCE_SELECT}
         WHERE r.course_id = ?1 AND (?2 IS NULL OR r.type = ?2)
         ORDER BY r.created_at DESC, r.rowid DESC"
    ))?;
    let rows = stmt.query_map(params![course_id, resource_type], Resource::from_row)?;
    rows.collect()
}

pub fn insert_calendar_event(
    conn: &Connection,
    new: &NewCalendarEvent<'_>,
) -> rusqlite::Result<CalendarEvent> {
    let id = new_id();
    conn.execute(
        "INSERT INTO calendar_events(id, course_id, title, description, event_type, start_date,
                                     end_date, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            new.course_id,
            new.title,
            new.description,
            new.event_type,
            new.start_date,
            new.end_date,
            new.created_by,
            now()
        ],
    )?;
    conn.query_row(
        "SELECT * FROM calendar_events WHERE id = ?1",
        [&id],
        CalendarEvent::from_row,
    )
}

/// Ordered by start date.
pub fn list_calendar_events(
    conn: &Connection,
    course_id: &str,
) -> rusqlite::Result<Vec<CalendarEvent>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM calendar_events WHERE course_id = ?1 ORDER BY start_date, rowid",
    )?;
    let rows = stmt.query_map([course_id], CalendarEvent::from_row)?;
    rows.collect()
}
