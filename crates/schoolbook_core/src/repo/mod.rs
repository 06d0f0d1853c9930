//! Repository layer for the roster database.
//!
//! # Responsibility
//! - Define the student data access contract and its SQLite implementation.
//! - Isolate SQL text from service and script orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Student::validate()` before persistence.
//! - Query values are always bound, never interpolated.

pub mod query;
pub mod student_repo;
