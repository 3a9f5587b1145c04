use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::{new_id, now, Page};
use crate::database::models::{
    encode_list, Application, ApplicationStatus, NewOpportunity, NewTask, Opportunity, Task,
    TaskChanges, TaskStatus,
};

const OPPORTUNITY_SELECT: &str = "
    SELECT o.*, u.display_name AS faculty_name
    FROM opportunities o
    LEFT JOIN users u ON u.id = o.faculty_id";

const APPLICATION_SELECT: &str = "
    SELECT a.*,
           o.title AS opportunity_title,
           o.faculty_id AS opportunity_owner_id,
           s.display_name AS student_name
    FROM applications a
    JOIN opportunities o ON o.id = a.opportunity_id
    LEFT JOIN users s ON s.id = a.student_id";

#[derive(Debug, Clone)]
pub struct OpportunityFilter {
    pub is_open: Option<bool>,
    /// Only opportunities whose deadline is on or after this day.
    pub deadline_from: NaiveDate,
    /// Any-of match on skills; empty means no restriction.
    pub skills: Vec<String>,
    pub page: Page,
}

pub fn insert_opportunity(
    conn: &Connection,
    new: &NewOpportunity<'_>,
) -> rusqlite::Result<Opportunity> {
    let id = new_id();
    let created_at = now();
    conn.execute(
        "INSERT INTO opportunities(id, faculty_id, title, description, type, skills, duration,
                                   stipend, deadline, is_open, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?10)",
        params![
            id,
            new.faculty_id,
            new.title,
            new.description,
            new.opportunity_type,
            encode_list(new.skills),
            new.duration,
            new.stipend,
            new.deadline,
            created_at
        ],
    )?;
    find_opportunity(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn find_opportunity(conn: &Connection, id: &str) -> rusqlite::Result<Option<Opportunity>> {
    conn.query_row(
        &format!("{OPPORTUNITY_SELECT} WHERE o.id = ?1"),
        [id],
        Opportunity::from_row,
    )
    .optional()
}

/// Newest first. Skills live in a JSON column, so that filter and the page
/// window are applied after loading.
pub fn list_opportunities(
    conn: &Connection,
    filter: &OpportunityFilter,
) -> rusqlite::Result<Vec<Opportunity>> {
    let mut stmt = conn.prepare(&format!(
        "{OPPORTUNITY_SELECT}
         WHERE (?1 IS NULL OR o.is_open = ?1) AND o.deadline >= ?2
         ORDER BY o.created_at DESC, o.rowid DESC"
    ))?;
    let rows = stmt.query_map(
        params![filter.is_open, filter.deadline_from],
        Opportunity::from_row,
    )?;
    let matching = rows
        .filter(|row| match row {
            Ok(opportunity) => opportunity.matches_any_skill(&filter.skills),
            Err(_) => true,
        })
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(filter.page.apply(matching))
}

pub fn close_opportunity(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE opportunities SET is_open = 0, updated_at = ?2 WHERE id = ?1",
        params![id, now()],
    )?;
    Ok(changed > 0)
}

pub fn has_applied(
    conn: &Connection,
    opportunity_id: &str,
    student_id: &str,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM applications WHERE opportunity_id = ?1 AND student_id = ?2)",
        [opportunity_id, student_id],
        |row| row.get(0),
    )
}

pub fn insert_application(
    conn: &Connection,
    opportunity_id: &str,
    student_id: &str,
    cover_letter: &str,
) -> rusqlite::Result<Application> {
    let id = new_id();
    let applied_at = now();
    conn.execute(
        "INSERT INTO applications(id, opportunity_id, student_id, status, cover_letter,
                                  applied_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            id,
            opportunity_id,
            student_id,
            ApplicationStatus::Submitted,
            cover_letter,
            applied_at
        ],
    )?;
    find_application(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn find_application(conn: &Connection, id: &str) -> rusqlite::Result<Option<Application>> {
    conn.query_row(
        &format!("{APPLICATION_SELECT} WHERE a.id = ?1"),
        [id],
        Application::from_row,
    )
    .optional()
}

pub fn applications_for_opportunity(
    conn: &Connection,
    opportunity_id: &str,
) -> rusqlite::Result<Vec<Application>> {
    let mut stmt = conn.prepare(&format!(
        "{APPLICATION_SELECT} WHERE a.opportunity_id = ?1 ORDER BY a.applied_at DESC, a.rowid DESC"
    ))?;
    let rows = stmt.query_map([opportunity_id], Application::from_row)?;
    rows.collect()
}

pub fn applications_for_student(
    conn: &Connection,
    student_id: &str,
) -> rusqlite::Result<Vec<Application>> {
    let mut stmt = conn.prepare(&format!(
        "{APPLICATION_SELECT} WHERE a.student_id = ?1 ORDER BY a.applied_at DESC, a.rowid DESC"
    ))?;
    let rows = stmt.query_map([student_id], Application::from_row)?;
    rows.collect()
}

pub fn set_application_status(
    conn: &Connection,
    id: &str,
    status: ApplicationStatus,
) -> rusqlite::Result<Option<Application>> {
    let changed = conn.execute(
        "UPDATE applications SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, status, now()],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    find_application(conn, id)
}

pub fn set_resume_path(conn: &Connection, id: &str, path: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE applications SET resume_path = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, path, now()],
    )?;
    Ok(changed > 0)
}

pub fn insert_task(conn: &Connection, new: &NewTask<'_>) -> rusqlite::Result<Task> {
    let id = new_id();
    let created_at = now();
    conn.execute(
        "INSERT INTO tasks(id, student_id, title, description, category, deadline, status,
                           progress, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)",
        params![
            id,
            new.student_id,
            new.title,
            new.description,
            new.category,
            new.deadline,
            TaskStatus::Pending,
            created_at
        ],
    )?;
    find_task(conn, &id, new.student_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

/// Tasks are private: lookups always include the owner.
pub fn find_task(conn: &Connection, id: &str, student_id: &str) -> rusqlite::Result<Option<Task>> {
    conn.query_row(
        "SELECT * FROM tasks WHERE id = ?1 AND student_id = ?2",
        [id, student_id],
        Task::from_row,
    )
    .optional()
}

/// Newest first.
pub fn list_tasks(
    conn: &Connection,
    student_id: &str,
    status: Option<TaskStatus>,
) -> rusqlite::Result<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM tasks
         WHERE student_id = ?1 AND (?2 IS NULL OR status = ?2)
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map(params![student_id, status], Task::from_row)?;
    rows.collect()
}

pub fn update_task(
    conn: &Connection,
    id: &str,
    student_id: &str,
    changes: &TaskChanges,
) -> rusqlite::Result<Option<Task>> {
    let changed = conn.execute(
        "UPDATE tasks SET
             title = COALESCE(?3, title),
             description = COALESCE(?4, description),
             status = COALESCE(?5, status),
             progress = COALESCE(?6, progress),
             updated_at = ?7
         WHERE id = ?1 AND student_id = ?2",
        params![
            id,
            student_id,
            changes.title,
            changes.description,
            changes.status,
            changes.progress,
            now()
        ],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    find_task(conn, id, student_id)
}

pub fn delete_task(conn: &Connection, id: &str, student_id: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "DELETE FROM tasks WHERE id = ?1 AND student_id = ?2",
        [id, student_id],
    )?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{open, user};
    use super::*;
    use crate::database::models::{OpportunityType, UserRole};
    use chrono::{Duration, Utc};

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn post(conn: &Connection, faculty: &str, title: &str, skills: &[String], deadline: NaiveDate) -> Opportunity {
        insert_opportunity(
            conn,
            &NewOpportunity {
                faculty_id: faculty,
                title,
                description: "Work on things",
                opportunity_type: OpportunityType::Research,
                skills,
                duration: "8 weeks",
                stipend: None,
                deadline,
            },
        )
        .unwrap()
    }

    fn filter(skills: Vec<String>) -> OpportunityFilter {
        OpportunityFilter {
            is_open: Some(true),
            deadline_from: today(),
            skills,
            page: Page::default(),
        }
    }

    #[test]
    fn listing_hides_closed_and_expired() {
        let conn = open();
        let f = user(&conn, "f@iitmandi.ac.in", UserRole::Faculty);
        let open_one = post(&conn, &f.id, "open", &[], today() + Duration::days(10));
        let closed = post(&conn, &f.id, "closed", &[], today() + Duration::days(10));
        post(&conn, &f.id, "expired", &[], today() - Duration::days(1));
        post(&conn, &f.id, "due today", &[], today());
        close_opportunity(&conn, &closed.id).unwrap();

        let listed = list_opportunities(&conn, &filter(vec![])).unwrap();
        let titles: Vec<_> = listed.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["due today", "open"]);
        assert_eq!(listed[1].id, open_one.id);

        let any_state = OpportunityFilter {
            is_open: None,
            ..filter(vec![])
        };
        assert_eq!(list_opportunities(&conn, &any_state).unwrap().len(), 3);
    }

    #[test]
    fn listing_filters_by_skill() {
        let conn = open();
        let f = user(&conn, "f@iitmandi.ac.in", UserRole::Faculty);
        let deadline = today() + Duration::days(5);
        post(&conn, &f.id, "ml", &["Python".to_string(), "PyTorch".to_string()], deadline);
        post(&conn, &f.id, "systems", &["Rust".to_string()], deadline);

        let listed = list_opportunities(&conn, &filter(vec!["rust".to_string()])).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "systems");
    }

    #[test]
    fn applications_flow() {
        let conn = open();
        let f = user(&conn, "f@iitmandi.ac.in", UserRole::Faculty);
        let s = user(&conn, "s@students.iitmandi.ac.in", UserRole::Student);
        let opportunity = post(&conn, &f.id, "ml", &[], today() + Duration::days(5));

        assert!(!has_applied(&conn, &opportunity.id, &s.id).unwrap());
        let application = insert_application(&conn, &opportunity.id, &s.id, "Hire me").unwrap();
        assert!(has_applied(&conn, &opportunity.id, &s.id).unwrap());
        assert_eq!(application.status, ApplicationStatus::Submitted);
        assert_eq!(application.opportunity_title, "ml");
        assert_eq!(application.opportunity_owner_id, f.id);

        assert!(insert_application(&conn, &opportunity.id, &s.id, "again").is_err());

        let updated = set_application_status(&conn, &application.id, ApplicationStatus::Shortlisted)
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Shortlisted);
        assert!(set_resume_path(&conn, &application.id, "/uploads/opportunities/x.pdf").unwrap());

        assert_eq!(applications_for_opportunity(&conn, &opportunity.id).unwrap().len(), 1);
        let mine = applications_for_student(&conn, &s.id).unwrap();
        assert_eq!(mine[0].resume_path.as_deref(), Some("/uploads/opportunities/x.pdf"));
    }

    #[test]
    fn tasks_are_scoped_to_owner() {
        let conn = open();
        let a = user(&conn, "a@students.iitmandi.ac.in", UserRole::Student);
        let b = user(&conn, "b@students.iitmandi.ac.in", UserRole::Student);
        let task = insert_task(
            &conn,
            &NewTask {
                student_id: &a.id,
                title: "Read paper",
                description: None,
                category: "Research",
                deadline: None,
            },
        )
        .unwrap();
        assert_eq!(task.status, TaskStatus::Pending);

        assert!(find_task(&conn, &task.id, &b.id).unwrap().is_none());
        assert!(update_task(&conn, &task.id, &b.id, &TaskChanges::default())
            .unwrap()
            .is_none());
        assert!(!delete_task(&conn, &task.id, &b.id).unwrap());

        let updated = update_task(
            &conn,
            &task.id,
            &a.id,
            &TaskChanges {
                status: Some(TaskStatus::InProgress),
                progress: Some(40),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.progress, 40);
        assert_eq!(updated.title, "Read paper");

        assert_eq!(list_tasks(&conn, &a.id, Some(TaskStatus::Pending)).unwrap().len(), 0);
        assert_eq!(list_tasks(&conn, &a.id, None).unwrap().len(), 1);
        assert!(delete_task(&conn, &task.id, &a.id).unwrap());
    }
}
