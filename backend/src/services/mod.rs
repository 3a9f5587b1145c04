//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business operations
//! spanning several parts of the application. Authentication has its own
//! service in `crate::auth::service`; what lives here is the demo-data seeder
//! used by the `aegis seed` command.

pub mod seeder;
