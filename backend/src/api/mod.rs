//! Central module for organizing the application's main API endpoints.
//!
//! This module acts as a top-level container for the API domains (user
//! profiles, grievances, academics, opportunities and file uploads), excluding
//! core authentication routes which are handled by `crate::auth`.

pub mod course;
pub mod file;
pub mod grievance;
pub mod opportunity;
pub mod user;

use serde::Deserialize;

use crate::database::queries::Page;

/// `?skip=&limit=` query parameters shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn page(&self) -> Page {
        Page::new(self.skip, self.limit)
    }
}

/// Parses an optional filter value, treating unknown values as no filter.
pub(crate) fn lenient<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}
