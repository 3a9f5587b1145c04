use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::{new_id, now, Page};
use crate::database::models::{
    Grievance, GrievanceCategory, GrievanceStatus, GrievanceUpdate, NewGrievance,
};

const GRIEVANCE_SELECT: &str = "
    SELECT g.*, COALESCE(NULLIF(u.display_name, ''), u.email) AS submitter_name
    FROM grievances g
    LEFT JOIN users u ON u.id = g.submitter_id";

pub const INITIAL_REMARK: &str = "Grievance submitted";

#[derive(Debug, Default, Clone)]
pub struct GrievanceFilter<'a> {
    pub status: Option<GrievanceStatus>,
    pub category: Option<GrievanceCategory>,
    /// Restricts the list to grievances submitted by this user plus every
    /// anonymous grievance.
    pub visible_to: Option<&'a str>,
    pub page: Page,
}

/// Creates the grievance together with its initial SUBMITTED update, recorded
/// as made by `created_by` even when the grievance itself is anonymous.
/// Writes two rows; callers run it inside a transaction.
pub fn insert_grievance(
    conn: &Connection,
    new: &NewGrievance<'_>,
    created_by: &str,
) -> rusqlite::Result<String> {
    let id = new_id();
    let created_at = now();
    conn.execute(
        "INSERT INTO grievances(id, submitter_id, category, priority, location, title,
                                description, status, is_anonymous, photos, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, '[]', ?10, ?10)",
        params![
            id,
            new.submitter_id,
            new.category,
            new.priority,
            new.location,
            new.title,
            new.description,
            GrievanceStatus::Submitted,
            new.is_anonymous,
            created_at
        ],
    )?;
    conn.execute(
        "INSERT INTO grievance_updates(id, grievance_id, updated_by, status, remark, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new_id(),
            id,
            created_by,
            GrievanceStatus::Submitted,
            INITIAL_REMARK,
            created_at
        ],
    )?;
    Ok(id)
}

pub fn find_grievance(conn: &Connection, id: &str) -> rusqlite::Result<Option<Grievance>> {
    conn.query_row(
        &format!("{GRIEVANCE_SELECT} WHERE g.id = ?1"),
        [id],
        Grievance::from_row,
    )
    .optional()
}

/// Newest first.
pub fn list_grievances(
    conn: &Connection,
    filter: &GrievanceFilter<'_>,
) -> rusqlite::Result<Vec<Grievance>> {
    let mut clauses = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(status) = filter.status {
        values.push(Value::Text(status.as_str().to_string()));
        clauses.push(format!("g.status = ?{}", values.len()));
    }
    if let Some(category) = filter.category {
        values.push(Value::Text(category.as_str().to_string()));
        clauses.push(format!("g.category = ?{}", values.len()));
    }
    if let Some(user_id) = filter.visible_to {
        values.push(Value::Text(user_id.to_string()));
        clauses.push(format!(
            "(g.submitter_id = ?{} OR g.is_anonymous = 1)",
            values.len()
        ));
    }

    let mut sql = GRIEVANCE_SELECT.to_string();
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    values.push(Value::Integer(filter.page.limit));
    values.push(Value::Integer(filter.page.skip));
    sql.push_str(&format!(
        " ORDER BY g.created_at DESC, g.rowid DESC LIMIT ?{} OFFSET ?{}",
        values.len() - 1,
        values.len()
    ));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), Grievance::from_row)?;
    rows.collect()
}

/// Oldest first, so the list reads as a timeline.
pub fn grievance_updates(
    conn: &Connection,
    grievance_id: &str,
) -> rusqlite::Result<Vec<GrievanceUpdate>> {
    let mut stmt = conn.prepare(
        "SELECT gu.*, COALESCE(NULLIF(u.display_name, ''), u.email) AS updater_name
         FROM grievance_updates gu
         LEFT JOIN users u ON u.id = gu.updated_by
         WHERE gu.grievance_id = ?1
         ORDER BY gu.created_at, gu.rowid",
    )?;
    let rows = stmt.query_map([grievance_id], GrievanceUpdate::from_row)?;
    rows.collect()
}

/// Records a status change and moves the grievance to that status. The first
/// person to post an update becomes the assignee. Callers run it inside a
/// transaction.
pub fn add_grievance_update(
    conn: &Connection,
    grievance_id: &str,
    updated_by: &str,
    status: GrievanceStatus,
    remark: &str,
) -> rusqlite::Result<bool> {
    let at = now();
    let changed = conn.execute(
        "UPDATE grievances SET status = ?2, assigned_to = COALESCE(assigned_to, ?3), updated_at = ?4
         WHERE id = ?1",
        params![grievance_id, status, updated_by, at],
    )?;
    if changed == 0 {
        return Ok(false);
    }
    conn.execute(
        "INSERT INTO grievance_updates(id, grievance_id, updated_by, status, remark, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![new_id(), grievance_id, updated_by, status, remark, at],
    )?;
    Ok(true)
}

pub fn add_grievance_photo(conn: &Connection, grievance_id: &str, url: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE grievances SET photos = json_insert(photos, '$[#]', ?2), updated_at = ?3
         WHERE id = ?1",
        params![grievance_id, url, now()],
    )?;
    Ok(changed > 0)
}
