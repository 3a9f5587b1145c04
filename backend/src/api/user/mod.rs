//! Module for user profile and management API endpoints.
//!
//! This module handles functionalities related to user information that is
//! distinct from the core authentication process: the caller's own profile,
//! password changes, and admin-only account management.

pub mod handlers;
pub mod models;
pub mod routes;
