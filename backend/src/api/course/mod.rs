//! Module for the academics API: course catalogue, enrollment, course
//! resources and the course calendar.

pub mod handlers;
pub mod models;
pub mod routes;
