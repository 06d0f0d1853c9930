//! Core roster logic: the `Student` entity, its SQLite mapping, and the
//! walkthrough script that exercises it.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sandbox;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::student::{Student, StudentId, StudentValidationError, EMAIL_MAX_CHARS};
pub use repo::query::{Assignment, Column, Condition, SortDirection, StudentQuery};
pub use repo::student_repo::{RepoError, RepoResult, SqliteStudentRepository, StudentRepository};
pub use sandbox::{run_sandbox, sample_students, SandboxError, SandboxReport, SandboxResult};
pub use service::roster_service::{NameBirthday, NameGrade, RosterService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
