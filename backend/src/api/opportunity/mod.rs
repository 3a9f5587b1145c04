//! Module for the opportunities API: research and internship postings,
//! student applications and their review, and the personal task ledger.

pub mod handlers;
pub mod models;
pub mod routes;
