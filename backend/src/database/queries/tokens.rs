use rusqlite::{params, Connection};

/// Marks a refresh token id as unusable until `expires_at` (unix seconds).
/// Returns false when the id was already revoked.
pub fn revoke_token(conn: &Connection, jti: &str, expires_at: i64) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO revoked_tokens(jti, expires_at) VALUES (?1, ?2)",
        params![jti, expires_at],
    )?;
    Ok(inserted == 1)
}

pub fn is_token_revoked(conn: &Connection, jti: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = ?1)",
        [jti],
        |row| row.get(0),
    )
}

/// Drops revocations whose tokens have expired on their own.
pub fn purge_expired_revocations(conn: &Connection, now: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM revoked_tokens WHERE expires_at < ?1", [now])
}

#[cfg(test)]
mod tests {
    use super::super::test_support::open;
    use super::*;

    #[test]
    fn revoke_and_purge() {
        let conn = open();
        assert!(revoke_token(&conn, "a", 100).unwrap());
        assert!(!revoke_token(&conn, "a", 100).unwrap());
        assert!(revoke_token(&conn, "b", 300).unwrap());
        assert!(is_token_revoked(&conn, "a").unwrap());
        assert!(!is_token_revoked(&conn, "c").unwrap());

        assert_eq!(purge_expired_revocations(&conn, 200).unwrap(), 1);
        assert!(!is_token_revoked(&conn, "a").unwrap());
        assert!(is_token_revoked(&conn, "b").unwrap());
    }
}
