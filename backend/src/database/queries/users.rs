use rusqlite::{params, Connection, OptionalExtension};

use super::{new_id, now, Page};
use crate::database::models::{NewUser, User, UserRole};

pub fn insert_user(conn: &Connection, new: &NewUser<'_>) -> rusqlite::Result<User> {
    let id = new_id();
    let created_at = now();
    conn.execute(
        "INSERT INTO users(id, email, password_hash, role, display_name, department,
                           avatar_url, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
        params![
            id,
            new.email,
            new.password_hash,
            new.role,
            new.display_name,
            new.department,
            new.avatar_url,
            created_at
        ],
    )?;

    Ok(User {
        id,
        email: new.email.to_string(),
        password_hash: new.password_hash.to_string(),
        role: new.role,
        display_name: new.display_name.map(str::to_string),
        department: new.department.map(str::to_string),
        avatar_url: new.avatar_url.map(str::to_string),
        is_active: true,
        created_at,
        updated_at: created_at,
    })
}

pub fn find_user(conn: &Connection, id: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row("SELECT * FROM users WHERE id = ?1", [id], User::from_row)
        .optional()
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT * FROM users WHERE email = ?1",
        [email],
        User::from_row,
    )
    .optional()
}

pub fn list_users(conn: &Connection, page: Page) -> rusqlite::Result<Vec<User>> {
    let mut stmt =
        conn.prepare("SELECT * FROM users ORDER BY created_at, rowid LIMIT ?1 OFFSET ?2")?;
    let rows = stmt.query_map(params![page.limit, page.skip], User::from_row)?;
    rows.collect()
}

/// Overwrites the profile fields that are `Some`, returning the fresh row.
pub fn update_profile(
    conn: &Connection,
    id: &str,
    display_name: Option<&str>,
    department: Option<&str>,
    avatar_url: Option<&str>,
) -> rusqlite::Result<Option<User>> {
    let changed = conn.execute(
        "UPDATE users SET
             display_name = COALESCE(?2, display_name),
             department = COALESCE(?3, department),
             avatar_url = COALESCE(?4, avatar_url),
             updated_at = ?5
         WHERE id = ?1",
        params![id, display_name, department, avatar_url, now()],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    find_user(conn, id)
}

pub fn update_password(conn: &Connection, id: &str, password_hash: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE users SET password_hash = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, password_hash, now()],
    )?;
    Ok(changed > 0)
}

pub fn update_role(conn: &Connection, id: &str, role: UserRole) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE users SET role = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, role, now()],
    )?;
    Ok(changed > 0)
}

pub fn set_user_active(conn: &Connection, id: &str, is_active: bool) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE users SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, is_active, now()],
    )?;
    Ok(changed > 0)
}
