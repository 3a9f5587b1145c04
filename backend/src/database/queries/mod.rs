//! Database query functions (Data Access Objects).
//!
//! This module centralizes all direct database operations, providing reusable
//! functions for interacting with the database and abstracting the query logic
//! from the API handlers and the seeder. Every function takes a plain
//! `rusqlite::Connection`; callers wrap multi-statement writes in a transaction.

mod courses;
mod grievances;
mod opportunities;
mod tokens;
mod users;

pub use courses::*;
pub use grievances::*;
pub use opportunities::*;
pub use tokens::*;
pub use users::*;

use chrono::{DateTime, Utc};

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Offset/limit pair shared by the list endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
        }
    }
}

impl Page {
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Self {
        let default = Self::default();
        Self {
            skip: skip.unwrap_or(default.skip).max(0),
            limit: limit.unwrap_or(default.limit).clamp(0, 1000),
        }
    }

    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip as usize)
            .take(self.limit as usize)
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_clamps_negative_values() {
        let page = Page::new(Some(-3), Some(-1));
        assert_eq!(page.skip, 0);
        assert_eq!(page.limit, 0);
    }

    #[test]
    fn page_applies_offset_and_limit() {
        let page = Page::new(Some(1), Some(2));
        assert_eq!(page.apply(vec![1, 2, 3, 4]), vec![2, 3]);
        assert_eq!(Page::default().apply(vec![1, 2]), vec![1, 2]);
    }
}
