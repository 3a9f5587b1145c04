//! Module for the grievance (complaint) API.
//!
//! Grievances are submitted by any authenticated user, optionally anonymously,
//! and progressed by authority staff through status updates with remarks.

pub mod handlers;
pub mod models;
pub mod routes;
